/// Train route / schedule lookup.

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::Endpoints;
use crate::fields::{coerce_list, opt_str};
use crate::http::VendorTransport;

#[derive(Debug, Clone, Serialize)]
pub struct StationStop {
    pub station_code: String,
    pub station_name: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub halt_time: String,
    pub day_count: String,
    pub distance: String,
    pub route_number: String,
    pub stn_serial_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainRouteInfo {
    pub train_no: String,
    pub train_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_info: Option<TrainRouteInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_to: Option<String>,
    pub station_list: Vec<StationStop>,
    pub running_days: Vec<String>,
    pub total_stops: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RouteOutcome {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            train_info: None,
            station_from: None,
            station_to: None,
            station_list: Vec::new(),
            running_days: Vec::new(),
            total_stops: 0,
            error: Some(error.into()),
        }
    }
}

pub struct TrainRouteService<T: VendorTransport> {
    transport: T,
    url: String,
}

impl<T: VendorTransport> TrainRouteService<T> {
    pub fn new(transport: T, endpoints: &Endpoints) -> Self {
        Self {
            transport,
            url: endpoints.train_route_url.clone(),
        }
    }

    pub async fn check_route(
        &self,
        train_no: &str,
        from_station_code: &str,
        to_station_code: &str,
    ) -> RouteOutcome {
        let payload = json!({
            "trainNo": train_no,
            "fromStationCode": from_station_code,
            "toStationCode": to_station_code,
        });

        let response = match self.transport.post(&self.url, &payload).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("error checking route for train {train_no}: {e:#}");
                return RouteOutcome::failed(format!(
                    "Could not fetch route for train {train_no}. Please try again."
                ));
            }
        };

        if let Some(error_msg) = opt_str(&response, "errorMessage") {
            return RouteOutcome::failed(error_msg);
        }

        let station_list = parse_station_list(&response);
        if station_list.is_empty() {
            return RouteOutcome::failed(format!(
                "No route information found for train {train_no}."
            ));
        }

        let running_days = extract_running_days(&response);
        let total_stops = station_list.len();

        RouteOutcome {
            success: true,
            train_info: Some(TrainRouteInfo {
                train_no: opt_str(&response, "trainNumber")
                    .unwrap_or_else(|| train_no.to_string()),
                train_name: opt_str(&response, "trainName")
                    .unwrap_or_else(|| format!("Train {train_no}")),
            }),
            station_from: Some(
                opt_str(&response, "stationFrom").unwrap_or_else(|| from_station_code.to_string()),
            ),
            station_to: Some(
                opt_str(&response, "stationTo").unwrap_or_else(|| to_station_code.to_string()),
            ),
            station_list,
            running_days,
            total_stops,
            error: None,
        }
    }
}

fn stop_field(station: &Value, key: &str, default: &str) -> String {
    opt_str(station, key).unwrap_or_else(|| default.to_string())
}

fn parse_station_list(response: &Value) -> Vec<StationStop> {
    coerce_list(response.get("stationList"))
        .iter()
        .map(|station| StationStop {
            station_code: stop_field(station, "stationCode", ""),
            station_name: stop_field(station, "stationName", ""),
            arrival_time: stop_field(station, "arrivalTime", "--"),
            departure_time: stop_field(station, "departureTime", "--"),
            halt_time: stop_field(station, "haltTime", "--"),
            day_count: stop_field(station, "dayCount", "1"),
            distance: stop_field(station, "distance", "0"),
            route_number: stop_field(station, "routeNumber", "1"),
            stn_serial_number: stop_field(station, "stnSerialNumber", ""),
        })
        .collect()
}

fn extract_running_days(response: &Value) -> Vec<String> {
    const DAY_FLAGS: &[(&str, &str)] = &[
        ("trainRunsOnMon", "Mon"),
        ("trainRunsOnTue", "Tue"),
        ("trainRunsOnWed", "Wed"),
        ("trainRunsOnThu", "Thu"),
        ("trainRunsOnFri", "Fri"),
        ("trainRunsOnSat", "Sat"),
        ("trainRunsOnSun", "Sun"),
    ];
    DAY_FLAGS
        .iter()
        .filter(|(key, _)| opt_str(response, key).as_deref() == Some("Y"))
        .map(|(_, day)| day.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_days_are_extracted_from_flags() {
        let response = json!({
            "trainRunsOnMon": "Y",
            "trainRunsOnTue": "N",
            "trainRunsOnWed": "Y",
            "trainRunsOnSun": "Y",
        });
        assert_eq!(extract_running_days(&response), vec!["Mon", "Wed", "Sun"]);
    }

    #[test]
    fn stops_get_placeholder_defaults() {
        let response = json!({
            "stationList": [
                {"stationCode": "NDLS", "stationName": "New Delhi", "departureTime": "16:55"},
            ],
        });
        let stops = parse_station_list(&response);
        assert_eq!(stops[0].arrival_time, "--");
        assert_eq!(stops[0].departure_time, "16:55");
        assert_eq!(stops[0].day_count, "1");
        assert_eq!(stops[0].distance, "0");
    }
}
