/// Train booking-details parsing.

use serde_json::Value;

use super::outcome::{
    TrainCancelPriceInfo, TrainDetailsOutcome, TrainInfo, TrainPassenger, TrainPriceInfo,
};
use crate::fields::{coerce_list, opt_str, opt_value};

/// Statuses the vendor uses for an already-cancelled train passenger.
const CANCELLED_STATUSES: &[&str] = &["cancelled", "can", "refunded"];

pub(crate) fn parse_details(response: Value) -> TrainDetailsOutcome {
    let pax_list = coerce_list(response.get("PaxList"));
    let train_details = response.get("TrainDetails").cloned().unwrap_or_default();
    let price_details = response
        .get("TrainPriceDetails")
        .cloned()
        .unwrap_or_default();
    let cancel_price = response
        .get("TrainCancelPriceDetails")
        .cloned()
        .unwrap_or_default();

    // The EMT screen id for OTP/cancel calls is the ID field of the
    // first passenger record (same value on all of them).
    let emt_screen_id = pax_list.first().and_then(|pax| opt_str(pax, "ID"));

    let mut passengers = Vec::new();
    for pax in &pax_list {
        let current_status = opt_str(pax, "TicketCurrentStatus").unwrap_or_default();
        let is_cancelled = CANCELLED_STATUSES
            .contains(&current_status.trim().to_ascii_lowercase().as_str());
        passengers.push(TrainPassenger {
            pax_id: opt_value(pax, "PaxId"),
            title: opt_str(pax, "PaxTitle"),
            name: opt_str(pax, "FirstName"),
            age: opt_value(pax, "Age"),
            gender: opt_str(pax, "Gender"),
            pax_type: opt_str(pax, "PaxType"),
            seat_no: opt_value(pax, "SeatNo"),
            seat_type: opt_str(pax, "SeatType"),
            coach_number: opt_value(pax, "CoachNumber"),
            booking_status: opt_str(pax, "BookingStatus"),
            current_status,
            is_cancelled,
            pnr_number: opt_value(pax, "PnrNumber"),
            transaction_id: opt_value(pax, "TransactionId"),
            cancel_request: opt_value(pax, "CancelRequest"),
        });
    }

    let train_info = TrainInfo {
        train_name: opt_str(&train_details, "TrainName"),
        train_number: opt_value(&train_details, "TrainNumber"),
        from_station: opt_str(&train_details, "FromStation"),
        from_station_name: opt_str(&train_details, "FromStationName"),
        to_station: opt_str(&train_details, "ToStation"),
        to_station_name: opt_str(&train_details, "ToStationName"),
        departure_date: opt_str(&train_details, "DepartureDate"),
        departure_time: opt_str(&train_details, "DepartureTime"),
        arrival_date: opt_str(&train_details, "ArrivalDate"),
        arrival_time: opt_str(&train_details, "ArrivalTime"),
        boarding_station: opt_str(&train_details, "BoardingStation"),
        boarding_date: opt_str(&train_details, "BoardingDate"),
        boarding_time: opt_str(&train_details, "BoardingTime"),
        duration: opt_value(&train_details, "Duration"),
        travel_class: opt_str(&train_details, "Class"),
        quota: opt_str(&train_details, "Quota"),
        distance: opt_value(&train_details, "Distance"),
        num_adults: opt_value(&train_details, "NumberOfAdult"),
        num_children: opt_value(&train_details, "NumberOfChild"),
        num_infants: opt_value(&train_details, "NumberOfInfant"),
        reservation_id: opt_value(&train_details, "ReservationId"),
        booking_date: opt_str(&train_details, "BookingDate"),
    };

    let price_info = TrainPriceInfo {
        base_fare: opt_value(&price_details, "BaseFare"),
        tax: opt_value(&price_details, "Tax"),
        total_fare: opt_value(&price_details, "TotalFare"),
        insurance_charges: opt_value(&price_details, "InsuranceCharges"),
        is_free_cancellation: opt_value(&price_details, "IsFreeCancellation"),
        free_cancellation_amount: opt_value(&price_details, "FreeCancellationAmount"),
    };

    let cancel_price_info = TrainCancelPriceInfo {
        total_amount_paid: opt_value(&cancel_price, "TotalAmountPaid"),
        total_fare: opt_value(&cancel_price, "TotalFare"),
        base_fare: opt_value(&cancel_price, "BaseFare"),
        irctc_charges: opt_value(&cancel_price, "IRCTCCharges"),
        irctc_convenience_fee: opt_value(&cancel_price, "IRCTCConvenienceFee"),
        agent_service_charge: opt_value(&cancel_price, "AgentServiceCharge"),
        reservation_charge: opt_value(&cancel_price, "ReservationCharge"),
        superfast_charge: opt_value(&cancel_price, "SuperfastCharge"),
        free_cancellation_amount: opt_value(&cancel_price, "FreeCancellationAmount"),
    };

    let pnr_number = pax_list.first().and_then(|pax| opt_value(pax, "PnrNumber"));
    let reservation_id = opt_value(&train_details, "ReservationId");
    let all_cancelled = !passengers.is_empty() && passengers.iter().all(|p| p.is_cancelled);

    TrainDetailsOutcome {
        success: true,
        passengers,
        train_info,
        price_info,
        cancel_price_info,
        reservation_id,
        pnr_number,
        emt_screen_id,
        bet_id: opt_value(&response, "BetId"),
        all_cancelled,
        error: None,
        raw_response: response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emt_screen_id_comes_from_first_pax() {
        let response = json!({
            "PaxList": [
                {"ID": "EMT-SCREEN-1", "PaxId": 1, "TicketCurrentStatus": "CNF"},
                {"ID": "EMT-SCREEN-1", "PaxId": 2, "TicketCurrentStatus": "CNF"},
            ],
        });
        let details = parse_details(response);
        assert_eq!(details.emt_screen_id.as_deref(), Some("EMT-SCREEN-1"));
        assert!(!details.all_cancelled);
    }

    #[test]
    fn cancelled_status_set_is_matched_case_insensitively() {
        let response = json!({
            "PaxList": [
                {"ID": "S", "PaxId": 1, "TicketCurrentStatus": "Cancelled"},
                {"ID": "S", "PaxId": 2, "TicketCurrentStatus": " CAN "},
                {"ID": "S", "PaxId": 3, "TicketCurrentStatus": "Refunded"},
            ],
        });
        let details = parse_details(response);
        assert!(details.passengers.iter().all(|p| p.is_cancelled));
        assert!(details.all_cancelled);
    }

    #[test]
    fn confirmed_pax_is_not_cancelled() {
        let response = json!({
            "PaxList": [{"ID": "S", "PaxId": 1, "TicketCurrentStatus": "CNF/B2/22"}],
            "TrainDetails": {"TrainName": "Rajdhani Express", "ReservationId": "RSV1"},
        });
        let details = parse_details(response);
        assert!(!details.passengers[0].is_cancelled);
        assert_eq!(
            details.train_info.train_name.as_deref(),
            Some("Rajdhani Express")
        );
        assert_eq!(details.reservation_id, Some(json!("RSV1")));
    }
}
