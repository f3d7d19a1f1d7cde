/// Shared test transport: scripted responses keyed by URL substring,
/// with a full request log for call-pattern assertions.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use serde_json::Value;

use emt_client::config::Endpoints;
use emt_client::http::VendorTransport;

pub struct MockTransport {
    calls: Mutex<Vec<(String, Value)>>,
    stubs: Mutex<HashMap<String, Value>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            stubs: Mutex::new(HashMap::new()),
        }
    }

    /// Register (or replace) the response for any URL containing `marker`.
    pub fn stub(&self, marker: &str, response: Value) {
        self.stubs
            .lock()
            .unwrap()
            .insert(marker.to_string(), response);
    }

    pub fn count_calls(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.contains(marker))
            .count()
    }

    pub fn last_payload(&self, marker: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(url, _)| url.contains(marker))
            .map(|(_, payload)| payload.clone())
    }

    fn respond(&self, url: &str, payload: &Value) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        let stubs = self.stubs.lock().unwrap();
        stubs
            .iter()
            .find(|(marker, _)| url.contains(marker.as_str()))
            .map(|(_, response)| response.clone())
            .ok_or_else(|| anyhow!("{url} returned HTTP 500"))
    }
}

impl VendorTransport for &MockTransport {
    async fn post(&self, url: &str, payload: &Value) -> Result<Value> {
        self.respond(url, payload)
    }

    async fn post_with_headers(
        &self,
        url: &str,
        payload: &Value,
        _headers: &[(String, String)],
    ) -> Result<Value> {
        self.respond(url, payload)
    }

    async fn post_text(
        &self,
        url: &str,
        payload: &Value,
        _headers: &[(String, String)],
    ) -> Result<String> {
        let value = self.respond(url, payload)?;
        Ok(match value {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }
}

pub fn endpoints() -> Endpoints {
    Endpoints {
        mybookings_base_url: "https://mybookings.test".to_string(),
        flight_details_url: "https://flights.test/GetFlightDetails".to_string(),
        flight_otp_url: "https://flights.test/SendOtpOnCancellation".to_string(),
        flight_cancel_url: "https://flights.test/FlightCancellation".to_string(),
        bookings_search_url: "https://products.test/search-product".to_string(),
        login_send_otp_url: "https://login.test/VerifyUserLogin".to_string(),
        login_authenticate_url: "https://login.test/AuthenticateLoginUser".to_string(),
        pnr_status_url: "https://rail.test/PnrchkStatus".to_string(),
        train_route_url: "https://rail.test/TrainScheduleEnquiry".to_string(),
    }
}
