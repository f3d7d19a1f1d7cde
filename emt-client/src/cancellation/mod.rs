/// Guest cancellation flow.
///
/// Drives the vendor's 4-step protocol (login → details → OTP →
/// cancel) for every transaction kind while hiding the cookie/session
/// mechanics. The vendor couples the `bid` returned by guest login to
/// the cookie jar of the client that performed the login; the two are
/// only ever refreshed together, and a step called with credentials
/// that no longer match the cached `bid` transparently re-establishes
/// both before proceeding.
///
/// One service instance belongs to one in-flight cancellation attempt.
/// Step methods take `&mut self`, so an instance cannot be shared
/// across concurrent callers.

mod bus;
mod client;
mod flight;
mod hotel;
mod kind;
mod outcome;
mod train;

pub use client::MyBookingsClient;
pub use kind::TransactionKind;
pub use outcome::{
    BusDetailsOutcome, BusInfo, BusPassenger, BusPriceInfo, CancelOutcome, FlightDetailsOutcome,
    FlightPassenger, FlightPnr, FlightPolicyItem, FlightPolicySector, FlightPriceInfo,
    FlightSegment, Guest, HotelDetailsOutcome, HotelInfo, LoginIds, LoginOutcome, OtpOutcome,
    RefundInfo, Room, TrainCancelPriceInfo, TrainDetailsOutcome, TrainInfo, TrainPassenger,
    TrainPriceInfo, VerifyOutcome,
};

use anyhow::{anyhow, bail, Result};
use serde_json::Value;

use crate::config::Endpoints;
use crate::fields::{self, pick_string, truthy};
use crate::http::{HttpTransport, VendorTransport};

/// Per-attempt mutable state. `bid` is only valid in combination with
/// the transport's current cookie jar; the staleness check below keeps
/// them synchronized.
#[derive(Debug, Default, Clone)]
pub struct FlowState {
    bid: Option<String>,
    transaction_screen_id: Option<String>,
    booking_id: Option<String>,
    email: Option<String>,
    kind: Option<TransactionKind>,
    // Train: ID field from the first PaxList record.
    emt_screen_id: Option<String>,
    // Flight: numeric id (e.g. "162759795") and screen id ("EMT162759795").
    flight_transaction_id: Option<String>,
    flight_transaction_screen_id: Option<String>,
    total_cancellable: usize,
}

impl FlowState {
    pub fn bid(&self) -> Option<&str> {
        self.bid.as_deref()
    }

    pub fn transaction_screen_id(&self) -> Option<&str> {
        self.transaction_screen_id.as_deref()
    }

    pub fn booking_id(&self) -> Option<&str> {
        self.booking_id.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn kind(&self) -> Option<TransactionKind> {
        self.kind
    }

    pub fn emt_screen_id(&self) -> Option<&str> {
        self.emt_screen_id.as_deref()
    }
}

pub struct CancellationService<T: VendorTransport> {
    client: MyBookingsClient<T>,
    state: FlowState,
}

impl CancellationService<HttpTransport> {
    /// Service with its own persistent HTTP session. One instance per
    /// cancellation attempt.
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        Ok(Self::with_client(MyBookingsClient::new(
            HttpTransport::new()?,
            endpoints,
        )))
    }
}

fn short(token: &str) -> &str {
    &token[..token.len().min(10)]
}

/// Success heuristic for OTP dispatch: the vendor sometimes omits
/// `isStatus` on genuine successes, so a false/missing status only
/// counts as failure when an explicit error signal is present.
fn otp_heuristic(response: &Value, status_keys: &[&str]) -> (bool, String) {
    let is_status = status_keys.iter().any(|key| truthy(response.get(key)));
    let msg = pick_string(response, &["Msg", "Message"]).unwrap_or_default();
    let lower = msg.to_lowercase();
    let has_error = truthy(response.get("Error"))
        || truthy(response.get("error"))
        || (!msg.is_empty()
            && (lower.contains("error") || lower.contains("fail") || lower.contains("expired")));
    let success = is_status || (!has_error && msg != "Failed");
    (success, msg)
}

/// Shared hotel/train cancellation response handling. The vendor may
/// answer with a plain string instead of an object; success is then
/// inferred from substring matching (best effort, inherited as-is).
fn cancel_outcome_from(response: Value, default_fail: &str) -> CancelOutcome {
    if let Value::String(text) = &response {
        let lower = text.to_lowercase();
        let success = lower.contains("success") || lower.contains("cancel");
        let message = if text.is_empty() {
            default_fail.to_string()
        } else {
            text.clone()
        };
        return CancelOutcome {
            success,
            message,
            refund_info: None,
            error: if success {
                None
            } else {
                Some("CANCELLATION_FAILED".to_string())
            },
            raw_response: response,
        };
    }

    let success = truthy(response.get("Status")) || truthy(response.get("isStatus"));
    let mut message = pick_string(&response, &["LogMessage", "Message", "Msg"]).unwrap_or_default();

    let data = response.get("Data").filter(|d| d.is_object());
    if let Some(text) = data.and_then(|d| fields::opt_str(d, "Text")) {
        message = if message.is_empty() {
            text
        } else {
            format!("{message} - {text}")
        };
    }

    let refund_info = if truthy(response.get("RefundAmount"))
        || truthy(response.get("CancellationCharges"))
    {
        Some(RefundInfo {
            refund_amount: fields::opt_value(&response, "RefundAmount"),
            cancellation_charges: fields::opt_value(&response, "CancellationCharges"),
            refund_mode: fields::opt_value(&response, "RefundMode"),
            request_id: None,
        })
    } else if let Some(d) = data.filter(|d| truthy(d.get("charge")) || truthy(d.get("currency"))) {
        Some(RefundInfo {
            refund_amount: None,
            cancellation_charges: fields::opt_value(d, "charge"),
            refund_mode: fields::opt_value(d, "currency"),
            request_id: None,
        })
    } else {
        None
    };

    let message = if success || !message.is_empty() {
        message
    } else {
        default_fail.to_string()
    };

    CancelOutcome {
        success,
        message,
        refund_info,
        error: if success {
            None
        } else {
            Some("CANCELLATION_FAILED".to_string())
        },
        raw_response: response,
    }
}

impl<T: VendorTransport> CancellationService<T> {
    pub fn with_client(client: MyBookingsClient<T>) -> Self {
        Self {
            client,
            state: FlowState::default(),
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Drop all cached identifiers before reusing the instance for a
    /// second attempt.
    pub fn reset(&mut self) {
        self.state = FlowState::default();
    }

    /// Step 1: authenticate the guest with booking id + contact email.
    /// On success the returned ids anchor every subsequent step.
    pub async fn guest_login(&mut self, booking_id: &str, email: &str) -> LoginOutcome {
        let response = match self.client.guest_login(booking_id, email).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("guest login failed: {e:#}");
                return LoginOutcome::failed(
                    e.to_string(),
                    "Guest login failed due to an unexpected error",
                );
            }
        };

        let ids = match response.get("Ids") {
            Some(v) if truthy(Some(v)) => v,
            _ => &response,
        };

        let transaction_screen_id = pick_string(ids, fields::SCREEN_ID_KEYS);
        if transaction_screen_id.is_none() {
            tracing::warn!("screen id not found in login response");
        }

        let Some(bid) = pick_string(ids, fields::BID_KEYS) else {
            return LoginOutcome::failed(
                "LOGIN_FAILED",
                fields::opt_str(ids, "Message")
                    .unwrap_or_else(|| "Guest login failed - no bid token returned".to_string()),
            );
        };

        let transaction_type = fields::opt_str(ids, "TransactionType");

        self.state.bid = Some(bid.clone());
        self.state.transaction_screen_id = transaction_screen_id.clone();
        self.state.booking_id = Some(booking_id.to_string());
        self.state.email = Some(email.to_string());
        self.state.kind = transaction_type
            .as_deref()
            .and_then(TransactionKind::from_label);

        LoginOutcome {
            success: true,
            ids: Some(LoginIds {
                bid,
                transaction_id: fields::opt_value(ids, "TransactionId"),
                transaction_screen_id,
                transaction_type,
                is_otp_send: fields::opt_value(ids, "IsOtpSend"),
                message: fields::opt_str(ids, "Message"),
            }),
            error: None,
            message: "Guest login successful".to_string(),
        }
    }

    /// Step 1b: verify the guest-login OTP using the cached bid.
    pub async fn verify_otp(&mut self, otp: &str) -> VerifyOutcome {
        let Some(bid) = self.state.bid.clone() else {
            return VerifyOutcome {
                success: false,
                message: "No active session. Please start the cancellation flow first."
                    .to_string(),
                error: Some("NO_SESSION".to_string()),
            };
        };

        let label = self.state.kind.map(|k| k.label()).unwrap_or("Hotel");
        match self.client.verify_guest_login_otp(&bid, otp, label).await {
            Ok(response) => {
                let verified = fields::loose_bool(response.get("isVerify"));
                let msg = pick_string(&response, &["Message", "Msg"]).unwrap_or_default();
                VerifyOutcome {
                    success: verified,
                    message: if !msg.is_empty() {
                        msg
                    } else if verified {
                        "OTP verified successfully".to_string()
                    } else {
                        "Invalid OTP".to_string()
                    },
                    error: if verified {
                        None
                    } else {
                        Some("OTP_INVALID".to_string())
                    },
                }
            }
            Err(e) => {
                tracing::error!("OTP verification failed: {e:#}");
                VerifyOutcome {
                    success: false,
                    message: "OTP verification failed due to an unexpected error".to_string(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Step 2 (hotel): room and booking details for the bid token.
    pub async fn fetch_booking_details(&mut self, bid: &str) -> HotelDetailsOutcome {
        match self.client.fetch_details(TransactionKind::Hotel, bid).await {
            Ok(response) => hotel::parse_details(response),
            Err(e) => {
                tracing::error!("fetch booking details failed: {e:#}");
                HotelDetailsOutcome::failed(e.to_string())
            }
        }
    }

    /// Step 2 (train). Also caches the EMT screen id needed by the
    /// train OTP/cancel calls.
    pub async fn fetch_train_booking_details(&mut self, bid: &str) -> TrainDetailsOutcome {
        match self.client.fetch_details(TransactionKind::Train, bid).await {
            Ok(response) => {
                let details = train::parse_details(response);
                if details.emt_screen_id.is_some() {
                    self.state.emt_screen_id = details.emt_screen_id.clone();
                }
                details
            }
            Err(e) => {
                tracing::error!("fetch train booking details failed: {e:#}");
                TrainDetailsOutcome::failed(e.to_string())
            }
        }
    }

    /// Step 2 (bus).
    pub async fn fetch_bus_booking_details(&mut self, bid: &str) -> BusDetailsOutcome {
        match self.client.fetch_details(TransactionKind::Bus, bid).await {
            Ok(response) => bus::parse_details(response),
            Err(e) => {
                tracing::error!("fetch bus booking details failed: {e:#}");
                BusDetailsOutcome::failed(e.to_string())
            }
        }
    }

    /// Step 2 (flight). Caches the flight transaction ids needed by the
    /// flight OTP/cancel calls.
    pub async fn fetch_flight_booking_details(&mut self, bid: &str) -> FlightDetailsOutcome {
        let screen_id = self.state.booking_id.clone().unwrap_or_default();
        let email = self.state.email.clone().unwrap_or_default();
        match self
            .client
            .fetch_flight_booking_details(bid, &screen_id, &email)
            .await
        {
            Ok(response) => {
                let details = flight::parse_details(response, &screen_id);
                self.state.flight_transaction_id = details.transaction_id.clone();
                self.state.flight_transaction_screen_id = details.transaction_screen_id.clone();
                self.state.total_cancellable = details.total_cancellable;
                details
            }
            Err(e) => {
                tracing::error!("fetch flight booking details failed: {e:#}");
                FlightDetailsOutcome::failed(e.to_string())
            }
        }
    }

    /// Re-login and re-fetch details so the vendor's server-side
    /// session advances to the right state; the details response is
    /// discarded, only the side effect matters. Routes to the kind's
    /// own details endpoint to avoid triggering cross-module OTP sends.
    async fn refresh_session(&mut self, booking_id: &str, email: &str) -> Result<String> {
        let login = self.guest_login(booking_id, email).await;
        if !login.success {
            bail!("session refresh login failed: {}", login.message);
        }
        let bid = login
            .ids
            .map(|ids| ids.bid)
            .ok_or_else(|| anyhow!("session refresh login returned no ids"))?;

        let kind = self.state.kind.unwrap_or(TransactionKind::Hotel);
        if self.state.kind.is_none() {
            tracing::warn!("unknown transaction type, defaulting to hotel endpoint");
        }
        tracing::info!("refreshing session for {} booking", kind.label());

        match kind {
            TransactionKind::Flight => {
                let screen_id = self
                    .state
                    .booking_id
                    .clone()
                    .unwrap_or_else(|| booking_id.to_string());
                self.client
                    .fetch_flight_booking_details(&bid, &screen_id, email)
                    .await?;
            }
            other => {
                self.client.fetch_details(other, &bid).await?;
            }
        }

        Ok(bid)
    }

    /// Reuse the cached bid when the caller's credentials still match
    /// the ones that produced it; refresh otherwise.
    async fn ensure_fresh_bid(&mut self, booking_id: &str, email: &str) -> Result<String> {
        let stale = self.state.bid.is_none()
            || self.state.booking_id.as_deref() != Some(booking_id)
            || self.state.email.as_deref() != Some(email);

        if stale {
            tracing::info!("no stored session or credentials changed, refreshing session");
            self.refresh_session(booking_id, email).await
        } else {
            tracing::info!("using stored session from login");
            Ok(self.state.bid.clone().unwrap_or_default())
        }
    }

    /// Step 3 (hotel): request the cancellation OTP on the existing
    /// session, refreshing it first if stale.
    pub async fn send_cancellation_otp(&mut self, booking_id: &str, email: &str) -> OtpOutcome {
        if let Some(kind) = self.state.kind {
            if kind != TransactionKind::Hotel {
                tracing::warn!(
                    "send_cancellation_otp called for a {} booking; use the kind-specific step",
                    kind.label()
                );
            }
        }

        let bid = match self.ensure_fresh_bid(booking_id, email).await {
            Ok(bid) => bid,
            Err(e) => {
                tracing::error!("send cancellation OTP failed: {e:#}");
                return OtpOutcome::failed(
                    e.to_string(),
                    format!("Failed to send cancellation OTP: {e}"),
                );
            }
        };

        // The bid doubles as the EmtScreenID here; the cached
        // transaction_screen_id serves an unrelated purpose.
        tracing::info!(
            "sending cancellation OTP with bid as EmtScreenID: {}...",
            short(&bid)
        );
        match self
            .client
            .send_cancellation_otp(TransactionKind::Hotel, &bid)
            .await
        {
            Ok(response) => {
                let (success, msg) = otp_heuristic(&response, &["isStatus"]);
                if !success {
                    tracing::error!("OTP send failed: {response}");
                }
                OtpOutcome {
                    success,
                    message: if !msg.is_empty() {
                        msg
                    } else if success {
                        "OTP sent successfully".to_string()
                    } else {
                        "Failed to send OTP".to_string()
                    },
                    error: if success {
                        None
                    } else {
                        Some("OTP_SEND_FAILED".to_string())
                    },
                    bid: Some(bid),
                    transaction_screen_id: self.state.transaction_screen_id.clone(),
                    raw_response: response,
                }
            }
            Err(e) => {
                tracing::error!("send cancellation OTP failed: {e:#}");
                OtpOutcome::failed(
                    e.to_string(),
                    format!("Failed to send cancellation OTP: {e}"),
                )
            }
        }
    }

    /// Step 4 (hotel): submit the cancellation on the existing session,
    /// refreshing it first if stale. `room_id` is accepted for the
    /// caller's bookkeeping; the vendor API takes the literal
    /// "undefined" in its place.
    #[allow(clippy::too_many_arguments)]
    pub async fn request_cancellation(
        &mut self,
        booking_id: &str,
        email: &str,
        otp: &str,
        room_id: &str,
        transaction_id: &str,
        is_pay_at_hotel: bool,
        payment_url: &str,
        reason: Option<&str>,
        remark: Option<&str>,
    ) -> CancelOutcome {
        let bid = match self.ensure_fresh_bid(booking_id, email).await {
            Ok(bid) => bid,
            Err(e) => {
                tracing::error!("request cancellation failed: {e:#}");
                return CancelOutcome::failed(e.to_string(), "Cancellation request failed");
            }
        };

        tracing::debug!("submitting cancellation for room {room_id}");
        match self
            .client
            .request_cancellation(
                &bid,
                otp,
                transaction_id,
                is_pay_at_hotel,
                payment_url,
                reason.unwrap_or("Change of plans"),
                remark.unwrap_or(""),
            )
            .await
        {
            Ok(response) => {
                tracing::info!("cancellation response: {response}");
                cancel_outcome_from(response, "Cancellation request failed")
            }
            Err(e) => {
                tracing::error!("request cancellation failed: {e:#}");
                CancelOutcome::failed(e.to_string(), "Cancellation request failed")
            }
        }
    }

    /// Train OTP: uses the EMT screen id captured from booking details,
    /// not the bid.
    pub async fn send_train_cancellation_otp(&mut self) -> OtpOutcome {
        let Some(screen_id) = self.state.emt_screen_id.clone() else {
            return OtpOutcome::failed(
                "NO_SCREEN_ID",
                "No EMT Screen ID found. Please fetch booking details first.",
            );
        };

        tracing::info!(
            "sending train cancellation OTP with EmtScreenID: {}...",
            short(&screen_id)
        );
        match self
            .client
            .send_cancellation_otp(TransactionKind::Train, &screen_id)
            .await
        {
            Ok(response) => {
                let (success, msg) = otp_heuristic(&response, &["isStatus"]);
                if !success {
                    tracing::error!("train OTP send failed: {response}");
                }
                OtpOutcome {
                    success,
                    message: if !msg.is_empty() {
                        msg
                    } else if success {
                        "OTP sent successfully".to_string()
                    } else {
                        "Failed to send OTP".to_string()
                    },
                    error: if success {
                        None
                    } else {
                        Some("OTP_SEND_FAILED".to_string())
                    },
                    bid: self.state.bid.clone(),
                    transaction_screen_id: Some(screen_id),
                    raw_response: response,
                }
            }
            Err(e) => {
                tracing::error!("send train cancellation OTP failed: {e:#}");
                OtpOutcome::failed(
                    e.to_string(),
                    format!("Failed to send cancellation OTP: {e}"),
                )
            }
        }
    }

    /// Train cancel: per-passenger selection against the full id list.
    pub async fn request_train_cancellation(
        &mut self,
        otp: &str,
        pax_ids: &[String],
        all_pax_ids: &[String],
        reservation_id: &str,
        pnr_number: &str,
    ) -> CancelOutcome {
        let Some(screen_id) = self.state.emt_screen_id.clone() else {
            return CancelOutcome::failed(
                "NO_SCREEN_ID",
                "No EMT Screen ID found. Please fetch booking details first.",
            );
        };

        match self
            .client
            .cancel_train(&screen_id, otp, reservation_id, pax_ids, all_pax_ids, pnr_number)
            .await
        {
            Ok(response) => {
                tracing::info!("train cancellation response: {response}");
                cancel_outcome_from(response, "Train cancellation request failed")
            }
            Err(e) => {
                tracing::error!("train cancellation failed: {e:#}");
                CancelOutcome::failed(e.to_string(), "Train cancellation request failed")
            }
        }
    }

    /// Bus OTP: the bid doubles as the EmtScreenID, same as hotel, but
    /// the vendor's bus endpoint reports failure reliably so no
    /// permissive fallback applies.
    pub async fn send_bus_cancellation_otp(&mut self) -> OtpOutcome {
        let Some(bid) = self.state.bid.clone() else {
            return OtpOutcome::failed("NO_BID", "No bid found. Please login first.");
        };

        match self
            .client
            .send_cancellation_otp(TransactionKind::Bus, &bid)
            .await
        {
            Ok(response) => {
                let success = truthy(response.get("isStatus"));
                let msg = pick_string(&response, &["Msg", "Message"]).unwrap_or_default();
                OtpOutcome {
                    success,
                    message: msg,
                    error: if success {
                        None
                    } else {
                        Some("OTP_FAILED".to_string())
                    },
                    bid: Some(bid),
                    transaction_screen_id: self.state.transaction_screen_id.clone(),
                    raw_response: response,
                }
            }
            Err(e) => {
                tracing::error!("bus OTP send failed: {e:#}");
                OtpOutcome::failed(e.to_string(), "Failed to send bus cancellation OTP")
            }
        }
    }

    /// Bus cancel: seats are passed as the vendor's comma string.
    pub async fn request_bus_cancellation(
        &mut self,
        otp: &str,
        seats: &str,
        transaction_id: &str,
        reason: &str,
        remark: &str,
    ) -> CancelOutcome {
        let Some(bid) = self.state.bid.clone() else {
            return CancelOutcome::failed("NO_BID", "No bid found. Please login first.");
        };

        match self
            .client
            .cancel_bus(&bid, otp, seats, transaction_id, reason, remark)
            .await
        {
            Ok(response) => {
                tracing::info!("bus cancellation response: {response}");
                if let Value::String(_) = &response {
                    return cancel_outcome_from(response, "Bus cancellation request failed");
                }

                let success = truthy(response.get("Status")) || truthy(response.get("isStatus"));
                let message = {
                    let msg = pick_string(&response, &["Message", "Msg"]).unwrap_or_default();
                    if success || !msg.is_empty() {
                        msg
                    } else {
                        "Bus cancellation request failed".to_string()
                    }
                };
                let refund_info = response
                    .get("Data")
                    .filter(|d| d.is_object() && truthy(Some(d)))
                    .map(|d| RefundInfo {
                        refund_amount: fields::opt_value(d, "refundAmount"),
                        cancellation_charges: fields::opt_value(d, "cancellationCharges"),
                        refund_mode: None,
                        request_id: None,
                    });

                CancelOutcome {
                    success,
                    message,
                    refund_info,
                    error: if success {
                        None
                    } else {
                        Some("CANCELLATION_FAILED".to_string())
                    },
                    raw_response: response,
                }
            }
            Err(e) => {
                tracing::error!("bus cancellation failed: {e:#}");
                CancelOutcome::failed(e.to_string(), "Bus cancellation request failed")
            }
        }
    }

    /// Flight OTP: needs the transaction ids captured from flight
    /// booking details.
    pub async fn send_flight_cancellation_otp(&mut self, email: &str) -> OtpOutcome {
        let (Some(transaction_id), Some(screen_id)) = (
            self.state.flight_transaction_id.clone(),
            self.state.flight_transaction_screen_id.clone(),
        ) else {
            return OtpOutcome::failed(
                "NO_TRANSACTION_ID",
                "No flight transaction ID found. Please fetch booking details first.",
            );
        };

        tracing::info!(
            "sending flight cancellation OTP for transaction {transaction_id}, screen {screen_id}"
        );
        match self
            .client
            .send_flight_cancellation_otp(&transaction_id, &screen_id, email)
            .await
        {
            Ok(response) => {
                let (success, msg) = otp_heuristic(&response, &["IsStatus", "isStatus"]);
                if !success {
                    tracing::error!("flight OTP send failed: {response}");
                }
                OtpOutcome {
                    success,
                    message: if !msg.is_empty() {
                        msg
                    } else if success {
                        "OTP sent successfully".to_string()
                    } else {
                        "Failed to send OTP".to_string()
                    },
                    error: if success {
                        None
                    } else {
                        Some("OTP_SEND_FAILED".to_string())
                    },
                    bid: self.state.bid.clone(),
                    transaction_screen_id: Some(screen_id),
                    raw_response: response,
                }
            }
            Err(e) => {
                tracing::error!("send flight cancellation OTP failed: {e:#}");
                OtpOutcome::failed(
                    e.to_string(),
                    format!("Failed to send cancellation OTP: {e}"),
                )
            }
        }
    }

    /// Flight cancel: pax id lists arrive comma-separated and are sent
    /// dash-separated; the partial-cancel flag compares the selection
    /// against the cancellable pax count from booking details.
    pub async fn request_flight_cancellation(
        &mut self,
        email: &str,
        otp: &str,
        outbound_pax_ids: &str,
        inbound_pax_ids: &str,
        mode: &str,
    ) -> CancelOutcome {
        let Some(screen_id) = self.state.flight_transaction_screen_id.clone() else {
            return CancelOutcome::failed(
                "NO_TRANSACTION_ID",
                "No flight transaction screen ID found. Please fetch booking details first.",
            );
        };

        let selected: std::collections::HashSet<&str> = outbound_pax_ids
            .split(',')
            .chain(inbound_pax_ids.split(','))
            .filter(|id| !id.is_empty())
            .collect();
        let is_partial = if selected.len() < self.state.total_cancellable {
            "true"
        } else {
            "false"
        };

        let outbound = outbound_pax_ids.replace(',', "-");
        let inbound = inbound_pax_ids.replace(',', "-");

        match self
            .client
            .cancel_flight(
                &screen_id,
                email,
                otp,
                &outbound,
                &inbound,
                if mode.is_empty() { "1" } else { mode },
                is_partial,
            )
            .await
        {
            Ok(response) => {
                tracing::info!("flight cancellation response: {response}");
                if let Value::String(_) = &response {
                    return cancel_outcome_from(response, "Flight cancellation request failed");
                }

                let success = truthy(response.get("isRequested"))
                    || truthy(response.get("isCancelled"))
                    || truthy(response.get("isValidOTP"));
                let mut message =
                    pick_string(&response, &["msg", "Message", "Msg"]).unwrap_or_default();
                let request_id = fields::opt_value(&response, "RequestId");
                if message.is_empty() {
                    if let Some(id) = &request_id {
                        message = format!(
                            "Cancellation request submitted (Request ID: {})",
                            fields::value_to_string(id)
                        );
                    }
                }

                let refund_info = if truthy(response.get("RefundAmount"))
                    || truthy(response.get("CancellationCharges"))
                {
                    Some(RefundInfo {
                        refund_amount: fields::opt_value(&response, "RefundAmount"),
                        cancellation_charges: fields::opt_value(&response, "CancellationCharges"),
                        refund_mode: fields::opt_value(&response, "RefundMode"),
                        request_id: request_id.clone(),
                    })
                } else {
                    None
                };

                let message = if success || !message.is_empty() {
                    message
                } else {
                    "Flight cancellation request failed".to_string()
                };

                CancelOutcome {
                    success,
                    message,
                    refund_info,
                    error: if success {
                        None
                    } else {
                        Some("CANCELLATION_FAILED".to_string())
                    },
                    raw_response: response,
                }
            }
            Err(e) => {
                tracing::error!("flight cancellation failed: {e:#}");
                CancelOutcome::failed(e.to_string(), "Flight cancellation request failed")
            }
        }
    }
}
