//! Desktop Notifications
//!
//! Policy for when a new-message event deserves a platform notification,
//! the dispatcher that issues and tracks them by ticket tag so they can be
//! closed when the unread state clears, and the tab-title unread badge.

use std::cell::RefCell;
use std::rc::Rc;

use send_wrapper::SendWrapper;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Notification, NotificationOptions, NotificationPermission};

use crate::models::{clock_label, MessageArrival};

pub const APP_NAME: &str = "Atende";

const ALERT_SOUND_URL: &str = "/assets/sound.mp3";

/// Enclosed-digit glyphs for tab-title unread counts up to twenty
const COUNT_GLYPHS: &str = "⓿➊➋➌➍➎➏➐➑➒➓⓫⓬⓭⓮⓯⓰⓱⓲⓳⓴";

/// Everything the suppression decision reads, sampled at event arrival
#[derive(Clone, Copy, Debug)]
pub struct AlertContext {
    pub session_user_id: u32,
    pub open_ticket_id: Option<u32>,
    pub page_visible: bool,
}

/// A notification is suppressed when the ticket is already on screen, is
/// assigned to somebody else, or belongs to a group conversation.
pub fn should_suppress(arrival: &MessageArrival, ctx: AlertContext) -> bool {
    if ctx.open_ticket_id == Some(arrival.ticket.id) && ctx.page_visible {
        return true;
    }
    if arrival
        .ticket
        .user_id
        .is_some_and(|owner| owner != ctx.session_user_id)
    {
        return true;
    }
    arrival.ticket.is_group
}

/// Whether the event belongs in this user's notification feed at all:
/// unread, and either assigned to the session user or unassigned.
pub fn concerns_session(arrival: &MessageArrival, session_user_id: u32) -> bool {
    !arrival.message.read
        && arrival
            .ticket
            .user_id
            .map_or(true, |owner| owner == session_user_id)
}

/// Tab title with the unread count folded in
pub fn tab_title(unreads: usize, app_name: &str) -> String {
    if unreads == 0 {
        return app_name.to_string();
    }
    match COUNT_GLYPHS.chars().nth(unreads) {
        Some(glyph) => format!("{} - {}", glyph, app_name),
        None => format!("({}){}", unreads, app_name),
    }
}

pub fn set_tab_title(unreads: usize) {
    if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
        doc.set_title(&tab_title(unreads, APP_NAME));
    }
}

/// Sampled at event arrival for the suppression decision
pub fn page_visible() -> bool {
    web_sys::window()
        .and_then(|win| win.document())
        .map(|doc| doc.visibility_state() == web_sys::VisibilityState::Visible)
        .unwrap_or(true)
}

/// Issued notifications, keyed by ticket id through the platform tag.
/// Travels inside the app context, whose storage is thread-safe, so the
/// handle list rides in a single-thread `SendWrapper`.
#[derive(Clone)]
pub struct DesktopAlerts {
    issued: SendWrapper<Rc<RefCell<Vec<(u32, Notification)>>>>,
}

impl Default for DesktopAlerts {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopAlerts {
    pub fn new() -> Self {
        Self {
            issued: SendWrapper::new(Rc::default()),
        }
    }

    /// Ask once; the browser remembers the answer across sessions
    pub fn request_permission() {
        if Notification::permission() == NotificationPermission::Default {
            let _ = Notification::request_permission();
        }
    }

    /// Issue the notification for a ticket, replacing a previous one with
    /// the same tag, and play the alert sound at the session volume.
    pub fn issue(&self, arrival: &MessageArrival, volume: f64, on_click: impl Fn(u32) + 'static) {
        let now = js_sys::Date::new_0();
        let options = NotificationOptions::new();
        options.set_body(&format!(
            "{} - {}",
            arrival.message.body,
            clock_label(now.get_hours(), now.get_minutes())
        ));
        if let Some(icon) = &arrival.contact.profile_pic_url {
            options.set_icon(icon);
        }
        options.set_tag(&arrival.ticket.id.to_string());

        let title = format!("Message from {}", arrival.contact.name);
        let notification = match Notification::new_with_options(&title, &options) {
            Ok(notification) => notification,
            Err(e) => {
                web_sys::console::warn_1(&format!("[notify] dispatch failed: {:?}", e).into());
                return;
            }
        };

        let ticket_id = arrival.ticket.id;
        let click = Closure::<dyn FnMut()>::new(move || {
            if let Some(win) = web_sys::window() {
                let _ = win.focus();
            }
            on_click(ticket_id);
        });
        notification.set_onclick(Some(click.as_ref().unchecked_ref()));
        click.forget();

        self.dismiss(ticket_id);
        self.issued.borrow_mut().push((ticket_id, notification));
        play_alert(volume);
    }

    /// Close and forget the alert for a ticket, if one is showing
    pub fn dismiss(&self, ticket_id: u32) {
        self.issued.borrow_mut().retain(|(id, notification)| {
            if *id == ticket_id {
                notification.close();
                false
            } else {
                true
            }
        });
    }

    pub fn pending(&self) -> usize {
        self.issued.borrow().len()
    }
}

fn play_alert(volume: f64) {
    match web_sys::HtmlAudioElement::new_with_src(ALERT_SOUND_URL) {
        Ok(audio) => {
            audio.set_volume(volume.clamp(0.0, 1.0));
            let _ = audio.play();
        }
        Err(e) => {
            web_sys::console::warn_1(&format!("[notify] alert sound failed: {:?}", e).into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, Message, Ticket};
    use serde_json::json;

    fn arrival(ticket_id: u32, assigned: Option<u32>, is_group: bool) -> MessageArrival {
        let ticket: Ticket = serde_json::from_value(json!({
            "id": ticket_id,
            "userId": assigned,
            "isGroup": is_group,
        }))
        .unwrap();
        let message: Message = serde_json::from_value(json!({
            "id": 1, "body": "hello", "read": false, "ticketId": ticket_id,
        }))
        .unwrap();
        MessageArrival {
            message,
            ticket,
            contact: Contact::default(),
        }
    }

    fn ctx(open: Option<u32>, visible: bool) -> AlertContext {
        AlertContext {
            session_user_id: 1,
            open_ticket_id: open,
            page_visible: visible,
        }
    }

    #[test]
    fn test_suppressed_when_ticket_open_and_page_visible() {
        let event = arrival(3, Some(1), false);
        assert!(should_suppress(&event, ctx(Some(3), true)));
    }

    #[test]
    fn test_not_suppressed_when_page_hidden() {
        let event = arrival(3, Some(1), false);
        assert!(!should_suppress(&event, ctx(Some(3), false)));
    }

    #[test]
    fn test_not_suppressed_for_a_different_open_ticket() {
        let event = arrival(3, Some(1), false);
        assert!(!should_suppress(&event, ctx(Some(4), true)));
    }

    #[test]
    fn test_suppressed_for_another_users_ticket() {
        let event = arrival(3, Some(2), false);
        assert!(should_suppress(&event, ctx(None, false)));
    }

    #[test]
    fn test_suppressed_for_group_conversations() {
        let event = arrival(3, None, true);
        assert!(should_suppress(&event, ctx(None, false)));
    }

    #[test]
    fn test_unassigned_ticket_alerts() {
        let event = arrival(3, None, false);
        assert!(!should_suppress(&event, ctx(None, true)));
    }

    #[test]
    fn test_concerns_session_checks_read_and_assignment() {
        assert!(concerns_session(&arrival(1, None, false), 1));
        assert!(concerns_session(&arrival(1, Some(1), false), 1));
        assert!(!concerns_session(&arrival(1, Some(2), false), 1));

        let mut read = arrival(1, None, false);
        read.message.read = true;
        assert!(!concerns_session(&read, 1));
    }

    #[test]
    fn test_tab_title_uses_glyphs_up_to_twenty() {
        assert_eq!(tab_title(0, "Atende"), "Atende");
        assert_eq!(tab_title(1, "Atende"), "➊ - Atende");
        assert_eq!(tab_title(20, "Atende"), "⓴ - Atende");
        assert_eq!(tab_title(21, "Atende"), "(21)Atende");
    }
}
