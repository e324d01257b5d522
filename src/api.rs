//! HTTP Client
//!
//! Thin wrappers over the backend REST endpoints. Failures funnel into
//! [`ApiError`]; call sites surface them through the toast tray and keep
//! their last-known-good state.

use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::models::{Announcement, Chat, Page, Ticket, User, UserPayload};

/// Client-side view of a failed call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never completed
    Network(String),
    /// The server answered with a non-success status
    Status(u16),
    /// The body was not the JSON we expect
    Decode(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Status(code) => write!(f, "Request failed with status {}", code),
            ApiError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

fn transport(e: gloo_net::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

async fn get_json<T: DeserializeOwned>(path: &str, query: &[(&str, &str)]) -> ApiResult<T> {
    let resp = Request::get(path)
        .query(query.iter().copied())
        .send()
        .await
        .map_err(transport)?;
    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

pub async fn fetch_announcements(search: &str, page: u32) -> ApiResult<Page<Announcement>> {
    let page = page.to_string();
    get_json(
        "/announcements/",
        &[("searchParam", search), ("pageNumber", page.as_str())],
    )
    .await
}

pub async fn fetch_chats(search: &str, page: u32) -> ApiResult<Page<Chat>> {
    let page = page.to_string();
    get_json(
        "/chats/",
        &[("searchParam", search), ("pageNumber", page.as_str())],
    )
    .await
}

/// Tickets carrying unread messages, for the notifications feed
pub async fn fetch_unread_tickets(page: u32) -> ApiResult<Page<Ticket>> {
    let page = page.to_string();
    get_json(
        "/tickets/",
        &[("withUnreadMessages", "true"), ("pageNumber", page.as_str())],
    )
    .await
}

pub async fn fetch_user(id: u32) -> ApiResult<User> {
    get_json(&format!("/users/{}", id), &[]).await
}

pub async fn create_user(payload: &UserPayload) -> ApiResult<User> {
    let resp = Request::post("/users")
        .json(payload)
        .map_err(transport)?
        .send()
        .await
        .map_err(transport)?;
    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }
    resp.json::<User>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

pub async fn update_user(id: u32, payload: &UserPayload) -> ApiResult<User> {
    let resp = Request::put(&format!("/users/{}", id))
        .json(payload)
        .map_err(transport)?
        .send()
        .await
        .map_err(transport)?;
    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }
    resp.json::<User>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Take a pending ticket: status moves to `open`, assigned to `user_id`
pub async fn accept_ticket(ticket_id: u32, user_id: u32) -> ApiResult<()> {
    let resp = Request::put(&format!("/tickets/{}", ticket_id))
        .json(&json!({ "status": "open", "userId": user_id }))
        .map_err(transport)?
        .send()
        .await
        .map_err(transport)?;
    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }
    Ok(())
}
