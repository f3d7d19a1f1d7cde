/// PNR status lookup against the railways service.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};

use crate::codec::PnrCipher;
use crate::config::Endpoints;
use crate::fields::{coerce_list, opt_str, opt_value};
use crate::http::VendorTransport;

static PNR_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-]").unwrap());

#[derive(Debug, Clone, Serialize)]
pub struct PassengerStatus {
    pub serial_number: usize,
    pub booking_status: String,
    pub current_status: String,
    pub coach: Option<String>,
    pub berth_number: Option<Value>,
    pub berth_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PnrInfo {
    pub pnr_number: String,
    pub train_number: String,
    pub train_name: String,
    pub date_of_journey: String,
    pub source_station: String,
    pub source_station_name: String,
    pub destination_station: String,
    pub destination_station_name: String,
    pub boarding_point: Option<String>,
    pub boarding_point_name: Option<String>,
    pub reservation_upto: Option<String>,
    pub reservation_upto_name: Option<String>,
    pub journey_class: String,
    pub class_name: Option<String>,
    pub quota: String,
    pub quota_name: Option<String>,
    pub booking_status: Option<String>,
    pub chart_status: String,
    pub booking_fare: Option<Value>,
    pub ticket_fare: Option<Value>,
    pub passengers: Vec<PassengerStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PnrOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnr_info: Option<PnrInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub struct PnrStatusService<T: VendorTransport, C: PnrCipher> {
    transport: T,
    cipher: C,
    url: String,
}

impl<T: VendorTransport, C: PnrCipher> PnrStatusService<T, C> {
    pub fn new(transport: T, cipher: C, endpoints: &Endpoints) -> Self {
        Self {
            transport,
            cipher,
            url: endpoints.pnr_status_url.clone(),
        }
    }

    pub async fn check_pnr_status(&self, pnr_number: &str) -> PnrOutcome {
        let result: Result<Value> = async {
            let cleaned = PNR_SEPARATORS.replace_all(pnr_number, "").to_string();
            let encrypted = self.cipher.encrypt_pnr(&cleaned)?;
            self.transport
                .post(&self.url, &json!({ "pnrNumber": encrypted }))
                .await
        }
        .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("PNR status request failed: {e:#}");
                return PnrOutcome {
                    success: false,
                    pnr_info: None,
                    error: Some("REQUEST_ERROR".to_string()),
                    message: Some(e.to_string()),
                };
            }
        };

        if let Some(error_msg) = opt_str(&response, "errorMessage") {
            let error_type = if error_msg.contains("Invalid PNR")
                || error_msg.contains("Flushed PNR")
                || error_msg.contains("PNR not yet generated")
            {
                "INVALID_PNR"
            } else {
                "API_ERROR"
            };
            return PnrOutcome {
                success: false,
                pnr_info: None,
                error: Some(error_type.to_string()),
                message: Some(error_msg),
            };
        }

        if opt_str(&response, "pnrNumber").is_none() {
            return PnrOutcome {
                success: false,
                pnr_info: None,
                error: Some("INVALID_PNR".to_string()),
                message: Some("Invalid PNR or PNR not found".to_string()),
            };
        }

        PnrOutcome {
            success: true,
            pnr_info: Some(process_response(pnr_number, &response)),
            error: None,
            message: None,
        }
    }
}

fn process_response(pnr_number: &str, response: &Value) -> PnrInfo {
    let mut passengers = Vec::new();
    for p in coerce_list(response.get("passengerList")) {
        // Serial numbers arrive as strings; fall back to the position.
        let serial_number = opt_str(&p, "passengerSerialNumber")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(passengers.len() + 1);
        passengers.push(PassengerStatus {
            serial_number,
            booking_status: opt_str(&p, "bookingStatus").unwrap_or_else(|| "N/A".to_string()),
            current_status: opt_str(&p, "currentStatus").unwrap_or_else(|| "N/A".to_string()),
            coach: opt_str(&p, "bookingCoachId").or_else(|| opt_str(&p, "currentCoachId")),
            berth_number: opt_value(&p, "bookingBerthNo").or_else(|| opt_value(&p, "currentBerthNo")),
            berth_type: opt_str(&p, "bookingBerthCode"),
        });
    }

    PnrInfo {
        pnr_number: opt_str(response, "pnrNumber").unwrap_or_else(|| pnr_number.to_string()),
        train_number: opt_str(response, "trainNumber").unwrap_or_default(),
        train_name: opt_str(response, "trainName").unwrap_or_default(),
        date_of_journey: opt_str(response, "dateOfJourney").unwrap_or_default(),
        source_station: opt_str(response, "sourceStation").unwrap_or_default(),
        source_station_name: opt_str(response, "SrcStnName").unwrap_or_default(),
        destination_station: opt_str(response, "destinationStation").unwrap_or_default(),
        destination_station_name: opt_str(response, "DestStnName").unwrap_or_default(),
        boarding_point: opt_str(response, "boardingPoint"),
        boarding_point_name: opt_str(response, "BrdPointName"),
        reservation_upto: opt_str(response, "reservationUpto"),
        reservation_upto_name: opt_str(response, "reservationUptoName"),
        journey_class: opt_str(response, "journeyClass").unwrap_or_default(),
        class_name: opt_str(response, "className"),
        quota: opt_str(response, "quota").unwrap_or_else(|| "GN".to_string()),
        quota_name: opt_str(response, "quotaName"),
        booking_status: opt_str(response, "bookingStatus"),
        chart_status: opt_str(response, "chartStatus")
            .unwrap_or_else(|| "Chart Not Prepared".to_string()),
        booking_fare: opt_value(response, "bookingFare"),
        ticket_fare: opt_value(response, "ticketFare"),
        passengers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passenger_serials_fall_back_to_position() {
        let response = json!({
            "pnrNumber": "8524163970",
            "trainNumber": "12302",
            "trainName": "Howrah Rajdhani",
            "passengerList": [
                {"passengerSerialNumber": "1", "bookingStatus": "CNF", "currentStatus": "CNF"},
                {"passengerSerialNumber": "oops", "bookingStatus": "WL", "currentStatus": "WL/4"},
            ],
        });
        let info = process_response("8524163970", &response);
        assert_eq!(info.passengers[0].serial_number, 1);
        assert_eq!(info.passengers[1].serial_number, 2);
        assert_eq!(info.quota, "GN");
        assert_eq!(info.chart_status, "Chart Not Prepared");
    }

    #[test]
    fn coach_prefers_booking_then_current() {
        let response = json!({
            "pnrNumber": "X",
            "passengerList": [
                {"currentCoachId": "B2", "currentBerthNo": 22},
            ],
        });
        let info = process_response("X", &response);
        assert_eq!(info.passengers[0].coach.as_deref(), Some("B2"));
        assert_eq!(info.passengers[0].berth_number, Some(json!(22)));
    }
}
