/// Endpoint and payload layer for the booking-management APIs.
///
/// Builds the per-step request bodies, including the vendor's literal
/// quirks, and delegates to the cookie-retaining transport. The flight
/// endpoints live on separate hosts and carry an `auth: <email>`
/// header.

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use super::TransactionKind;
use crate::config::Endpoints;
use crate::http::VendorTransport;

pub struct MyBookingsClient<T: VendorTransport> {
    transport: T,
    endpoints: Endpoints,
}

impl<T: VendorTransport> MyBookingsClient<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoints.mybookings_base_url, path)
    }

    fn flight_headers(email: &str) -> Vec<(String, String)> {
        if email.is_empty() {
            Vec::new()
        } else {
            vec![("auth".to_string(), email.to_string())]
        }
    }

    /// Step 1: guest login with booking id + contact email.
    pub async fn guest_login(&self, booking_id: &str, email: &str) -> Result<Value> {
        let payload = json!({
            "BetId": booking_id,
            "Emailid": email,
        });
        self.transport
            .post(&self.url("/Mybooking/LoginGuestUser?app=null"), &payload)
            .await
    }

    /// Step 1b: verify the guest-login OTP.
    pub async fn verify_guest_login_otp(
        &self,
        bid: &str,
        otp: &str,
        transaction_type: &str,
    ) -> Result<Value> {
        let payload = json!({
            "BetId": bid,
            "otp": otp,
            "transactionType": transaction_type,
        });
        self.transport
            .post(&self.url("/Mybooking/VerifyGuestLoginOtp"), &payload)
            .await
    }

    /// Step 2: booking details for the kind's details endpoint.
    pub async fn fetch_details(&self, kind: TransactionKind, bid: &str) -> Result<Value> {
        let path = kind
            .details_path()
            .ok_or_else(|| anyhow!("flight details use fetch_flight_booking_details"))?;
        let payload = match kind {
            TransactionKind::Hotel => json!({ "bid": bid, "whiteListedCode": "EMT" }),
            _ => json!({ "bid": bid }),
        };
        self.transport.post(&self.url(path), &payload).await
    }

    /// Step 3: cancellation OTP. The vendor names the parameter
    /// `EmtScreenID` even though the value is the login `bid` for
    /// hotel and bus flows.
    pub async fn send_cancellation_otp(
        &self,
        kind: TransactionKind,
        screen_id: &str,
    ) -> Result<Value> {
        let path = kind
            .otp_path()
            .ok_or_else(|| anyhow!("flight OTP uses send_flight_cancellation_otp"))?;
        let payload = json!({ "EmtScreenID": screen_id });
        tracing::info!("{} OTP request payload: {payload}", kind.label());
        self.transport.post(&self.url(path), &payload).await
    }

    /// Step 4, hotel: submit the cancellation.
    #[allow(clippy::too_many_arguments)]
    pub async fn request_cancellation(
        &self,
        bid: &str,
        otp: &str,
        transaction_id: &str,
        is_pay_at_hotel: bool,
        payment_url: &str,
        reason: &str,
        remark: &str,
    ) -> Result<Value> {
        let payload = json!({
            "Remark": remark,
            "Reason": if reason.is_empty() { "Change of plans" } else { reason },
            "OTP": otp,
            // The API expects the literal string "undefined" for RoomId.
            "RoomId": "undefined",
            "TransactionId": transaction_id,
            "IsPayHotel": if is_pay_at_hotel { "true" } else { "false" },
            "PaymentUrl": payment_url,
            "ApplicationType": "false",
            "Bid": bid,
        });
        tracing::info!("cancellation payload: {payload}");
        self.transport
            .post(&self.url("/Hotels/RequestCancellation"), &payload)
            .await
    }

    /// Step 4, train: per-passenger inclusion is encoded as a parallel
    /// Y/N array aligned to the FULL passenger id list, not just the
    /// selected ids.
    pub async fn cancel_train(
        &self,
        bid: &str,
        otp: &str,
        reservation_id: &str,
        pax_ids: &[String],
        all_pax_ids: &[String],
        pnr_number: &str,
    ) -> Result<Value> {
        let checked: Vec<&str> = all_pax_ids
            .iter()
            .map(|pid| if pax_ids.contains(pid) { "Y" } else { "N" })
            .collect();
        let payload = json!({
            "ArycheckedValue": checked,
            "id": "",
            "_reservationId": reservation_id,
            "_PaxID": pax_ids,
            "totalPassenger": all_pax_ids.len(),
            "PnrNumber": pnr_number,
            "OTP": otp,
            "bid": bid,
        });
        tracing::info!("train cancellation payload: {payload}");
        self.transport.post(&self.url("/Train/CancelTrain"), &payload).await
    }

    /// Step 4, bus.
    pub async fn cancel_bus(
        &self,
        bid: &str,
        otp: &str,
        seats: &str,
        transaction_id: &str,
        reason: &str,
        remark: &str,
    ) -> Result<Value> {
        let payload = json!({
            "Remark": remark,
            "Reason": reason,
            "OTP": otp,
            "Seats": seats,
            "TransactionId": transaction_id,
            "Bid": bid,
        });
        tracing::info!("bus cancellation payload: {payload}");
        self.transport
            .post(&self.url("/bus/RequestCancellation/"), &payload)
            .await
    }

    /// Flight booking details (separate host, email auth header).
    pub async fn fetch_flight_booking_details(
        &self,
        bid: &str,
        transaction_screen_id: &str,
        email: &str,
    ) -> Result<Value> {
        let payload = json!({
            "emailId": email,
            "authentication": { "userName": "EMT", "password": "123" },
            "bid": bid,
            "transactionScreenId": transaction_screen_id,
        });
        self.transport
            .post_with_headers(
                &self.endpoints.flight_details_url,
                &payload,
                &Self::flight_headers(email),
            )
            .await
    }

    /// Flight cancellation OTP (legacy .svc host).
    pub async fn send_flight_cancellation_otp(
        &self,
        transaction_id: &str,
        transaction_screen_id: &str,
        email: &str,
    ) -> Result<Value> {
        let payload = json!({
            "Authentication": { "Password": "123", "UserName": "emt" },
            "TransctionId": transaction_id,
            "TransctionScreenId": transaction_screen_id,
            "EmailID": email,
        });
        self.transport
            .post_with_headers(
                &self.endpoints.flight_otp_url,
                &payload,
                &Self::flight_headers(email),
            )
            .await
    }

    /// Flight cancellation submit.
    #[allow(clippy::too_many_arguments)]
    pub async fn cancel_flight(
        &self,
        transaction_screen_id: &str,
        email: &str,
        otp: &str,
        outbound_pax_ids: &str,
        inbound_pax_ids: &str,
        mode: &str,
        is_partial_cancel: &str,
    ) -> Result<Value> {
        let payload = json!({
            "Authentication": {
                "IpAddress": "::1",
                "Password": "123",
                "UserName": "EMT",
            },
            "TransactionScreenId": transaction_screen_id,
            "mode": mode,
            "EmailId": email,
            "VerfyOTP": otp,
            "inBoundPaxIds": inbound_pax_ids,
            "isPartialCancel": is_partial_cancel,
            "outBoundPaxIds": outbound_pax_ids,
        });
        tracing::info!("flight cancellation payload: {payload}");
        self.transport
            .post_with_headers(
                &self.endpoints.flight_cancel_url,
                &payload,
                &Self::flight_headers(email),
            )
            .await
    }
}
