/// Booking-list lookup for an authenticated user.

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::Endpoints;
use crate::http::VendorTransport;

#[derive(Debug, Clone, Serialize)]
pub struct BookingsOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

pub struct BookingsClient<T: VendorTransport> {
    transport: T,
    url: String,
}

impl<T: VendorTransport> BookingsClient<T> {
    pub fn new(transport: T, endpoints: &Endpoints) -> Self {
        Self {
            transport,
            url: endpoints.bookings_search_url.clone(),
        }
    }

    /// Fetch all bookings for the logged-in user. The vendor wants the
    /// account auth token in the body and the email in an `auth`
    /// header, alongside its fixed agent credentials.
    pub async fn fetch_bookings(&self, auth: &str, email: &str, ip: &str) -> BookingsOutcome {
        let payload = json!({
            "Auth": auth,
            "EmailId": email,
            "Password": "android",
            "ProcessType": 45,
            "Authentication": {
                "AgentCode": 1003,
                "UserName": "android",
                "Password": "android",
                "IPAddress": ip,
            },
        });

        let headers = vec![("auth".to_string(), email.to_string())];

        match self
            .transport
            .post_with_headers(&self.url, &payload, &headers)
            .await
        {
            Ok(data) => BookingsOutcome {
                success: true,
                data: Some(data),
                error: None,
                raw: None,
            },
            Err(e) => {
                tracing::error!("bookings fetch failed: {e:#}");
                BookingsOutcome {
                    success: false,
                    data: None,
                    error: Some("INVALID_RESPONSE".to_string()),
                    raw: Some(e.to_string()),
                }
            }
        }
    }
}
