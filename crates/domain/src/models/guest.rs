//! Guest invitation models and the links handed to guests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An invited guest. The magic token is the guest's only credential and is
/// never serialized; hosts receive it embedded in [`GuestLinks`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Guest {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing, default)]
    pub magic_token: String,
    pub has_responded: bool,
    pub has_submitted_feedback: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for inviting a guest.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InviteGuestRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,
}

/// Menu and feedback links for one guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestLinks {
    pub menu_url: String,
    pub feedback_url: String,
}

impl GuestLinks {
    pub fn build(base_url: &str, event_id: Uuid, magic_token: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            menu_url: format!("{}/guest/{}?token={}", base, event_id, magic_token),
            feedback_url: format!("{}/guest/{}/feedback?token={}", base, event_id, magic_token),
        }
    }
}

/// Host-facing guest row with copyable links.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HostGuestView {
    #[serde(flatten)]
    pub guest: Guest,
    pub links: GuestLinks,
}

impl HostGuestView {
    pub fn new(guest: Guest, base_url: &str) -> Self {
        let links = GuestLinks::build(base_url, guest.event_id, &guest.magic_token);
        Self { guest, links }
    }
}

/// Ready-to-send thank-you email asking a guest for feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FeedbackEmail {
    pub subject: String,
    pub body: String,
}

impl FeedbackEmail {
    pub fn compose(event_title: &str, guest_name: Option<&str>, feedback_url: &str) -> Self {
        let greeting = guest_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Guest");

        let body = format!(
            "Dear {greeting},\n\n\
             Thank you so much for joining us at {title}! We hope you had a wonderful time and enjoyed the food.\n\n\
             We would love to hear your thoughts on the dishes we served. Your feedback helps us create even better dining experiences in the future.\n\n\
             Please take a moment to share your feedback:\n\
             {url}\n\n\
             It only takes a minute, and we truly appreciate your input!\n\n\
             Warm regards,\n\
             Your Host",
            greeting = greeting,
            title = event_title,
            url = feedback_url,
        );

        Self {
            subject: format!("Thank you for attending {}!", event_title),
            body,
        }
    }
}

/// Response for a guest's links endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestLinksResponse {
    pub guest_id: Uuid,
    pub links: GuestLinks,
    pub feedback_email: FeedbackEmail,
}
