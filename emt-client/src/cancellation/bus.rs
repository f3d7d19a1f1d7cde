/// Bus booking-details parsing.

use serde_json::Value;

use super::outcome::{BusDetailsOutcome, BusInfo, BusPassenger, BusPriceInfo};
use crate::fields::{coerce_list, opt_str, opt_value, truthy};
use crate::html::strip_html_tags;

const CANCELLED_STATUSES: &[&str] = &["cancelled", "cancel"];

pub(crate) fn parse_details(response: Value) -> BusDetailsOutcome {
    let bus_detail = response
        .get("BusbookingDetail")
        .cloned()
        .unwrap_or_default();
    let pax_list = coerce_list(response.get("BuspaxDetail"));

    let mut passengers = Vec::new();
    for pax in &pax_list {
        let status = opt_str(pax, "Status").unwrap_or_default();
        let is_cancelled =
            CANCELLED_STATUSES.contains(&status.trim().to_ascii_lowercase().as_str());
        passengers.push(BusPassenger {
            title: opt_str(pax, "Title"),
            first_name: opt_str(pax, "FirstName"),
            last_name: opt_str(pax, "LastName"),
            gender: opt_str(pax, "Gender"),
            age: opt_value(pax, "Age"),
            seat_no: opt_value(pax, "SeatNo"),
            fare: opt_value(pax, "Fare"),
            status,
            is_cancelled,
            is_cancel_req: truthy(pax.get("IsCancelReq")),
            journey_status: opt_str(pax, "JourneyStatus"),
            refund_amount: opt_value(pax, "RefundAmount"),
            cancellation_charge: opt_value(pax, "CancellationCharge"),
            total_fare: opt_value(pax, "Totalfare"),
            base_fare: opt_value(pax, "BaseFare"),
        });
    }

    let cancellation_policy_html = opt_str(&bus_detail, "BusCancellationPolicy").unwrap_or_default();
    let cancellation_policy = strip_html_tags(&cancellation_policy_html);

    let bus_info = BusInfo {
        transaction_id: opt_value(&bus_detail, "TransactionId"),
        ticket_no: opt_value(&bus_detail, "TicketNo"),
        ticket_status: opt_str(&bus_detail, "TicketStatus"),
        source: opt_str(&bus_detail, "Source"),
        destination: opt_str(&bus_detail, "Destination"),
        departure_time: opt_str(&bus_detail, "DepartureTime"),
        date_of_journey: opt_str(&bus_detail, "DateOfJourney"),
        bus_type: opt_str(&bus_detail, "BusType"),
        num_passengers: opt_value(&bus_detail, "NoOfPassenger"),
        travels_operator: opt_str(&bus_detail, "TravelsOperator"),
        bp_location: opt_str(&bus_detail, "BPLocation"),
        bp_time: opt_str(&bus_detail, "BPTime"),
        bus_duration: opt_value(&bus_detail, "BusDuration"),
        arrival_time: opt_str(&bus_detail, "ArrivalTime"),
        arrival_date: opt_str(&bus_detail, "ArrivalDate"),
        total_fare: opt_value(&bus_detail, "TotalFare"),
        total_base_fare: opt_value(&bus_detail, "TotalBaseFare"),
        total_tax: opt_value(&bus_detail, "TotalTax"),
        refund_amount: opt_value(&bus_detail, "RefundAmount"),
        cancellation_charge: opt_value(&bus_detail, "CancellationCharge"),
        cancellation_policy,
        cancellation_policy_html,
        booking_date: opt_str(&bus_detail, "Bookingdate"),
    };

    let price_info = BusPriceInfo {
        total_fare: opt_value(&bus_detail, "TotalFare"),
        base_fare: opt_value(&bus_detail, "TotalBaseFare"),
        tax: opt_value(&bus_detail, "TotalTax"),
        refund_amount: opt_value(&bus_detail, "RefundAmount"),
        card_discount: opt_value(&bus_detail, "CardDiscount"),
    };

    let all_cancelled = !passengers.is_empty() && passengers.iter().all(|p| p.is_cancelled);

    BusDetailsOutcome {
        success: true,
        passengers,
        ticket_no: opt_value(&bus_detail, "TicketNo"),
        bus_info,
        price_info,
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
    fn seat_statuses_drive_cancellation_flags() {
        let response = json!({
            "BusbookingDetail": {"TicketNo": "TKT9", "Source": "Pune", "Destination": "Mumbai"},
            "BuspaxDetail": [
                {"FirstName": "Ravi", "SeatNo": "A1", "Status": "Cancelled"},
                {"FirstName": "Asha", "SeatNo": "A2", "Status": "Booked"},
            ],
        });
        let details = parse_details(response);
        assert!(details.passengers[0].is_cancelled);
        assert!(!details.passengers[1].is_cancelled);
        assert!(!details.all_cancelled);
        assert_eq!(details.ticket_no, Some(json!("TKT9")));
    }

    #[test]
    fn policy_keeps_both_raw_and_clean_forms() {
        let response = json!({
            "BusbookingDetail": {
                "BusCancellationPolicy": "<ul><li>Free before departure</li></ul>",
            },
            "BuspaxDetail": [{"Status": "cancel", "SeatNo": "B1"}],
        });
        let details = parse_details(response);
        assert_eq!(details.bus_info.cancellation_policy, "• Free before departure");
        assert!(details.bus_info.cancellation_policy_html.contains("<ul>"));
        assert!(details.all_cancelled);
    }
}
