/// Flight booking-details parsing.
///
/// The flight detail endpoint nests passengers under several layouts
/// depending on trip type; extraction falls back through the known
/// variants the way the other parsers fall back through key casings.

use serde_json::Value;

use super::outcome::{
    FlightDetailsOutcome, FlightPassenger, FlightPnr, FlightPolicyItem, FlightPolicySector,
    FlightPriceInfo, FlightSegment,
};
use crate::fields::{coerce_list, loose_bool, opt_str, opt_value, pick_string};

const CANCELLED_STATUSES: &[&str] = &["cancelled", "cancel"];

fn parse_segment(seg: &Value) -> FlightSegment {
    FlightSegment {
        airline_name: opt_str(seg, "AirLineName"),
        airline_code: pick_string(seg, &["AirlineCode", "AirLineCode"]),
        flight_number: opt_value(seg, "FlightNumber"),
        origin: pick_string(seg, &["DepartureCityCode", "Origin"]),
        origin_city: opt_str(seg, "DepartureCity"),
        origin_airport: pick_string(seg, &["DepartureName", "OriginAirportName"]),
        destination: pick_string(seg, &["ArrivalCityCode", "Destination"]),
        destination_city: opt_str(seg, "ArrivalCity"),
        destination_airport: pick_string(seg, &["ArrivalName", "DestinationAirportName"]),
        departure_date: opt_str(seg, "DepartureDate"),
        departure_time: opt_str(seg, "DepartureTime"),
        arrival_date: opt_str(seg, "ArrivalDate"),
        arrival_time: opt_str(seg, "ArrivalTime"),
        origin_terminal: opt_value(seg, "SourceTerminal").or_else(|| opt_value(seg, "OriginTerminal")),
        destination_terminal: opt_value(seg, "DestinationalTerminal")
            .or_else(|| opt_value(seg, "DestinationTerminal")),
        duration: opt_value(seg, "FlightDuration").or_else(|| opt_value(seg, "Duration")),
        cabin_class: pick_string(seg, &["ClassType", "CabinClass"]),
        cabin_baggage: opt_value(seg, "CabinBag").or_else(|| opt_value(seg, "CabinBaggage")),
        check_in_baggage: opt_value(seg, "BaggageWeight")
            .or_else(|| opt_value(seg, "CheckInBaggage")),
        bound_type: opt_str(seg, "BoundType"),
        stops: opt_value(seg, "FlightStops").or_else(|| opt_value(seg, "Stops")),
    }
}

fn parse_passenger(pax: &Value) -> FlightPassenger {
    let is_cancellable = loose_bool(pax.get("isCancellable"));
    let status = pick_string(pax, &["paxstatus", "Status", "status"]).unwrap_or_default();
    let is_cancelled = CANCELLED_STATUSES.contains(&status.to_ascii_lowercase().as_str());
    FlightPassenger {
        pax_id: opt_value(pax, "paxId"),
        title: opt_str(pax, "title"),
        first_name: pick_string(pax, &["FirstName", "firstName"]),
        last_name: opt_str(pax, "lastName"),
        pax_type: opt_str(pax, "paxType"),
        ticket_number: opt_value(pax, "ticketNumber"),
        status,
        is_cancellable,
        is_cancelled,
        cancellation_charge: opt_value(pax, "cancellationCharge"),
        bound_type: pick_string(pax, &["tripType", "boundType"]),
        possible_mode: opt_value(pax, "possiblemode").or_else(|| opt_value(pax, "possibleMode")),
    }
}

/// Group-list fallback: `lstOutbond` / `lstInbound` wrap passengers in
/// groups each holding a `bookedPaxs` list. Tried on several containers
/// because the vendor has moved the field between releases.
fn grouped_pax_fallback(sources: &[&Value], list_key: &str) -> Vec<Value> {
    for src in sources {
        let groups = coerce_list(src.get(list_key));
        if !groups.is_empty() {
            return groups
                .iter()
                .flat_map(|grp| coerce_list(grp.get("bookedPaxs")))
                .collect();
        }
    }
    Vec::new()
}

pub(crate) fn parse_details(response: Value, fallback_screen_id: &str) -> FlightDetailsOutcome {
    let passenger_details = response.get("PassengerDetails").cloned().unwrap_or_default();
    let booked_passanger = response.get("bookedPassanger").cloned().unwrap_or_default();
    let flt_details = passenger_details.get("fltDetails").cloned().unwrap_or_default();

    // TransactionId lives in FlightPriceDetails, not at the root.
    let price_details = passenger_details
        .get("FlightPriceDetails")
        .cloned()
        .unwrap_or_default();
    let transaction_id = opt_str(&price_details, "TransactionId")
        .or_else(|| opt_str(&response, "TransactionId"));
    let transaction_screen_id = opt_str(&flt_details, "transactionScreenId")
        .or_else(|| opt_str(&response, "TransactionScreenId"))
        .or_else(|| {
            if fallback_screen_id.is_empty() {
                None
            } else {
                Some(fallback_screen_id.to_string())
            }
        });

    let trip_status = opt_str(&response, "TripStatus").unwrap_or_default();

    let flight_segments: Vec<FlightSegment> = coerce_list(passenger_details.get("FlightDetail"))
        .iter()
        .map(parse_segment)
        .collect();

    let fallback_sources = [&flt_details, &passenger_details, &response];

    let mut outbound_raw = coerce_list(
        booked_passanger
            .get("outbond")
            .and_then(|o| o.get("outBondTypePass")),
    );
    if outbound_raw.is_empty() {
        outbound_raw = grouped_pax_fallback(&fallback_sources, "lstOutbond");
    }
    let outbound_passengers: Vec<FlightPassenger> =
        outbound_raw.iter().map(parse_passenger).collect();

    let mut inbound_raw = coerce_list(
        booked_passanger
            .get("inbound")
            .and_then(|i| i.get("bookedPaxs")),
    );
    if inbound_raw.is_empty() {
        inbound_raw = grouped_pax_fallback(&fallback_sources, "lstInbound");
    }
    let inbound_passengers: Vec<FlightPassenger> =
        inbound_raw.iter().map(parse_passenger).collect();

    let price_info = FlightPriceInfo {
        total_fare: opt_value(&price_details, "TotalFare"),
        total_base_fare: opt_value(&price_details, "TotalBaseFare"),
        total_tax: opt_value(&price_details, "TotalTax"),
        currency: opt_str(&price_details, "Currency"),
    };

    // PNRList is a single object, not a list.
    let mut pnr_info = Vec::new();
    if let Some(pnr) = passenger_details.get("PNRList").filter(|v| v.is_object()) {
        pnr_info.push(FlightPnr {
            airline_pnr: opt_value(pnr, "Airlinepnr"),
            gds_pnr: opt_value(pnr, "Gdspnr"),
        });
    }

    let mut cancellation_policy = Vec::new();
    if let Some(policy_data) = response.get("FlightCancellationPolicy") {
        for sector in coerce_list(policy_data.get("Sectors")) {
            let policies_raw = coerce_list(
                sector
                    .get("CancellationPolicies")
                    .or_else(|| sector.get("Policies")),
            );
            let policies = policies_raw
                .iter()
                .map(|pol| FlightPolicyItem {
                    charge_type: opt_str(pol, "ChargeType"),
                    charge_value: opt_value(pol, "ChargeValue").or_else(|| opt_value(pol, "Charge")),
                    from_date: opt_str(pol, "FromDate"),
                    to_date: opt_str(pol, "ToDate"),
                    policy_text: pick_string(pol, &["PolicyText", "Time"]),
                    is_refundable: opt_value(pol, "Refundable"),
                    is_cancellation: opt_value(pol, "IsCancellation"),
                    policy_detail: pick_string(pol, &["policydtl", "PolicyDetail", "Description"]),
                })
                .collect();
            cancellation_policy.push(FlightPolicySector {
                sector_name: pick_string(&sector, &["SectorName", "Sector"]),
                bound_type: opt_str(&sector, "Boundtype"),
                departure_date: opt_str(&sector, "DepartureDate"),
                flight_image: opt_str(&sector, "FlightImage"),
                policies,
            });
        }
    }

    let pax_statuses = coerce_list(response.get("PaxStatus").and_then(|p| p.get("Pax")));

    let total_cancellable = outbound_passengers
        .iter()
        .chain(inbound_passengers.iter())
        .filter(|p| p.is_cancellable)
        .count();
    let total_pax = outbound_passengers.len() + inbound_passengers.len();
    let all_cancelled = total_pax > 0
        && outbound_passengers
            .iter()
            .chain(inbound_passengers.iter())
            .all(|p| p.is_cancelled);

    FlightDetailsOutcome {
        success: true,
        flight_segments,
        outbound_passengers,
        inbound_passengers,
        price_info,
        pnr_info,
        cancellation_policy,
        pax_statuses,
        trip_status,
        transaction_id,
        transaction_screen_id,
        all_cancelled,
        total_cancellable,
        error: None,
        raw_response: response,
    }
}
