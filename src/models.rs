//! Wire Models
//!
//! Data structures matching the backend's JSON (camelCase on the wire),
//! plus the parsers for push-channel payloads.

use live_feed::Key;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub records: Vec<T>,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: u32,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub media_path: Option<String>,
    #[serde(default)]
    pub media_name: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub users: Vec<ChatUser>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Per-participant unread counter inside a chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatUser {
    pub user_id: u32,
    #[serde(default)]
    pub unreads: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: u32,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub unread_messages: u32,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub user_id: Option<u32>,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u32,
    pub body: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub ticket_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub queues: Vec<Queue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    pub id: u32,
    pub name: String,
}

/// Outbound body for user create/update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub profile: String,
    pub queue_ids: Vec<u32>,
}

impl Key for Announcement {
    type Id = u32;

    fn key(&self) -> u32 {
        self.id
    }
}

impl Key for Chat {
    type Id = u32;

    fn key(&self) -> u32 {
        self.id
    }
}

impl Key for Ticket {
    type Id = u32;

    fn key(&self) -> u32 {
        self.id
    }
}

// ========================
// Push payload parsing
// ========================

/// Change to the announcements feed carried by `company-announcement`
#[derive(Debug, Clone, PartialEq)]
pub enum AnnouncementChange {
    Upsert(Announcement),
    Delete(u32),
}

/// A new message delivered on `company-<id>-appMessage`
#[derive(Debug, Clone, PartialEq)]
pub struct MessageArrival {
    pub message: Message,
    pub ticket: Ticket,
    pub contact: Contact,
}

/// Ids arrive as JSON numbers or numeric strings depending on the emitter
fn numeric_id(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub fn parse_announcement_event(data: &Value) -> Option<AnnouncementChange> {
    match data.get("action")?.as_str()? {
        "create" | "update" => {
            let record = serde_json::from_value(data.get("record")?.clone()).ok()?;
            Some(AnnouncementChange::Upsert(record))
        }
        "delete" => numeric_id(data.get("id")?).map(AnnouncementChange::Delete),
        _ => None,
    }
}

/// `updateUnread` and `delete` both clear a ticket from the notification
/// feed; returns the ticket id to drop.
pub fn parse_ticket_clear(data: &Value) -> Option<u32> {
    match data.get("action")?.as_str()? {
        "updateUnread" | "delete" => numeric_id(data.get("ticketId")?),
        _ => None,
    }
}

pub fn parse_message_event(data: &Value) -> Option<MessageArrival> {
    if data.get("action")?.as_str()? != "create" {
        return None;
    }
    Some(MessageArrival {
        message: serde_json::from_value(data.get("message")?.clone()).ok()?,
        ticket: serde_json::from_value(data.get("ticket")?.clone()).ok()?,
        contact: serde_json::from_value(data.get("contact")?.clone()).ok()?,
    })
}

pub fn parse_chat_event(data: &Value) -> Option<Chat> {
    match data.get("action")?.as_str()? {
        "new-message" | "update" => serde_json::from_value(data.get("chat")?.clone()).ok(),
        _ => None,
    }
}

/// `company-<id>-auth` announces a session takeover; returns the user id it
/// concerns.
pub fn parse_auth_kick(data: &Value) -> Option<u32> {
    numeric_id(data.get("user")?.get("id")?)
}

// ========================
// Pure view helpers
// ========================

/// Whether the ticket still waits in the pending queue. Pending tickets
/// are taken through the accept action; the row click does not open them.
pub fn is_pending(ticket: &Ticket) -> bool {
    ticket.status == "pending"
}

/// Sum of the session user's unread counters across all chats
pub fn chat_unreads(chats: &[Chat], user_id: u32) -> u32 {
    chats
        .iter()
        .map(|chat| member_unreads(chat, user_id))
        .sum()
}

/// The session user's unread counter inside one chat
pub fn member_unreads(chat: &Chat, user_id: u32) -> u32 {
    chat.users
        .iter()
        .find(|member| member.user_id == user_id)
        .map_or(0, |member| member.unreads)
}

/// `DD/MM/YYYY` out of an ISO-8601 timestamp; unparseable input is shown
/// as-is.
pub fn short_date(iso: &str) -> String {
    match (iso.get(0..4), iso.get(5..7), iso.get(8..10)) {
        (Some(y), Some(m), Some(d)) => format!("{}/{}/{}", d, m, y),
        _ => iso.to_string(),
    }
}

pub fn clock_label(hours: u32, minutes: u32) -> String {
    format!("{:02}:{:02}", hours, minutes)
}
