//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;

use crate::notifier::DesktopAlerts;

/// App-wide signals provided via context
#[derive(Clone)]
pub struct AppContext {
    /// Ticket currently open in the main pane - read
    pub open_ticket: ReadSignal<Option<u32>>,
    set_open_ticket: WriteSignal<Option<u32>>,
    /// Issued desktop notifications, shared so feed events can close them
    pub alerts: DesktopAlerts,
}

impl AppContext {
    pub fn new(
        open_ticket: (ReadSignal<Option<u32>>, WriteSignal<Option<u32>>),
        alerts: DesktopAlerts,
    ) -> Self {
        Self {
            open_ticket: open_ticket.0,
            set_open_ticket: open_ticket.1,
            alerts,
        }
    }

    /// Bring a ticket into the main pane
    pub fn show_ticket(&self, ticket_id: u32) {
        self.set_open_ticket.set(Some(ticket_id));
    }

    pub fn clear_ticket(&self) {
        self.set_open_ticket.set(None);
    }
}

/// Get the app context from context
pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
