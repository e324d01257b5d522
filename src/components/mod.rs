//! UI Components
//!
//! Reusable Leptos components.

mod announcements_popover;
mod notifications_popover;
mod ticket_row;
mod chat_menu;
mod user_form;
mod volume_slider;
mod theme_switch;
mod toast_tray;

pub use announcements_popover::AnnouncementsPopover;
pub use notifications_popover::NotificationsPopover;
pub use ticket_row::TicketRow;
pub use chat_menu::ChatMenu;
pub use user_form::UserForm;
pub use volume_slider::VolumeSlider;
pub use theme_switch::ThemeSwitch;
pub use toast_tray::ToastTray;
