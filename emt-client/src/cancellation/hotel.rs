/// Hotel booking-details parsing.

use std::collections::HashSet;

use serde_json::Value;

use super::outcome::{Guest, HotelDetailsOutcome, HotelInfo, Room};
use crate::fields::{
    coerce_list, first_truthy, opt_str, opt_value, pick_string, truthy, PAYMENT_ROOM_ID_KEYS,
    ROOM_ID_KEYS,
};
use crate::html::strip_html_tags;

/// A room counts as cancelled when any payment-detail entry for its id
/// carries a "cancelled" status.
fn cancelled_room_ids(response: &Value) -> HashSet<String> {
    let mut cancelled = HashSet::new();
    for pd in coerce_list(response.get("PaymentDetails")) {
        let status = opt_str(&pd, "Status").unwrap_or_default();
        if status.trim().eq_ignore_ascii_case("cancelled") {
            if let Some(room_id) = pick_string(&pd, PAYMENT_ROOM_ID_KEYS) {
                cancelled.insert(room_id);
            }
        }
    }
    cancelled
}

pub(crate) fn parse_details(response: Value) -> HotelDetailsOutcome {
    let rooms_raw = coerce_list(first_truthy(&response, &["Room", "Rooms"]));
    let cancelled = cancelled_room_ids(&response);

    // Hotel-level info is repeated on every room; read it off the first.
    let hotel_info = rooms_raw
        .first()
        .map(|first| HotelInfo {
            hotel_name: opt_str(first, "name"),
            address: opt_str(first, "Address_Description"),
            check_in: opt_str(first, "CheckIn"),
            check_out: opt_str(first, "checkOut"),
            duration: opt_value(first, "Duration"),
            total_fare: opt_value(first, "TotalFare"),
            number_of_rooms: opt_value(first, "NumberOfRoomsBooked"),
        })
        .unwrap_or_default();

    // The vendor repeats guest rows per room; dedup on name + title.
    let mut guest_info = Vec::new();
    let mut seen_guests = HashSet::new();
    for pax in coerce_list(response.get("PaxDetails")) {
        let key = (
            opt_str(&pax, "FirstName"),
            opt_str(&pax, "LastName"),
            opt_str(&pax, "Title"),
        );
        if seen_guests.insert(key) {
            guest_info.push(Guest {
                title: opt_str(&pax, "Title"),
                first_name: opt_str(&pax, "FirstName"),
                last_name: opt_str(&pax, "LastName"),
                pax_type: opt_str(&pax, "PaxType"),
                mobile: opt_str(&pax, "CustomerMobile"),
            });
        }
    }

    let mut rooms = Vec::new();
    for r in &rooms_raw {
        let room_id = pick_string(r, ROOM_ID_KEYS);
        if room_id.is_none() {
            tracing::warn!("room id not found in booking details entry");
        }

        let cancellation_policy = opt_str(r, "CancellationPolicy")
            .map(|policy| strip_html_tags(&policy))
            .filter(|policy| !policy.is_empty());

        let is_cancelled = room_id
            .as_ref()
            .map(|id| cancelled.contains(id))
            .unwrap_or(false);

        rooms.push(Room {
            room_id,
            room_type: opt_str(r, "RoomType"),
            room_no: opt_value(r, "RoomNo"),
            transaction_id: opt_value(r, "TransactionId"),
            cancellation_policy,
            is_pay_at_hotel: truthy(r.get("isPayAtHotel")),
            total_adults: opt_value(r, "TotalAdult"),
            check_in: opt_str(r, "CheckIn"),
            check_out: opt_str(r, "checkOut"),
            hotel_name: opt_str(r, "name"),
            amount: opt_value(r, "TotalFare"),
            meal_type: opt_str(r, "mealtype"),
            confirmation_no: opt_value(r, "ConfirmationNo"),
            payment_due_date: opt_str(r, "PaymentDueDate"),
            payment_remaining_days: opt_value(r, "PaymentRemainingDays"),
            is_cancelled,
        });
    }

    let all_cancelled = !rooms.is_empty() && rooms.iter().all(|r| r.is_cancelled);

    HotelDetailsOutcome {
        success: true,
        rooms,
        hotel_info,
        guest_info,
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
    fn single_room_object_is_coerced_to_list() {
        let response = json!({
            "Room": {"RoomID": "R1", "RoomType": "Deluxe", "name": "Grand Inn"},
        });
        let details = parse_details(response);
        assert_eq!(details.rooms.len(), 1);
        assert_eq!(details.rooms[0].room_id.as_deref(), Some("R1"));
        assert_eq!(details.hotel_info.hotel_name.as_deref(), Some("Grand Inn"));
    }

    #[test]
    fn cancelled_room_derived_from_payment_details() {
        let response = json!({
            "Rooms": [{"RoomID": "R1"}, {"RoomId": "R2"}],
            "PaymentDetails": [
                {"RoomID": "R1", "Status": "Cancelled"},
                {"RoomID": "R2", "Status": "Confirmed"},
            ],
        });
        let details = parse_details(response);
        assert!(details.rooms[0].is_cancelled);
        assert!(!details.rooms[1].is_cancelled);
        assert!(!details.all_cancelled);
    }

    #[test]
    fn all_cancelled_requires_every_room() {
        let response = json!({
            "Room": [{"RoomID": "R1"}],
            "PaymentDetails": {"RoomID": "R1", "Status": " cancelled "},
        });
        let details = parse_details(response);
        assert!(details.rooms[0].is_cancelled);
        assert!(details.all_cancelled);
    }

    #[test]
    fn empty_room_list_is_never_all_cancelled() {
        let details = parse_details(json!({"Room": []}));
        assert!(details.rooms.is_empty());
        assert!(!details.all_cancelled);
    }

    #[test]
    fn guests_are_deduplicated_by_name_and_title() {
        let response = json!({
            "Room": [{"RoomID": "R1"}, {"RoomID": "R2"}],
            "PaxDetails": [
                {"Title": "Mr", "FirstName": "Ravi", "LastName": "Kumar", "PaxType": "Adult"},
                {"Title": "Mr", "FirstName": "Ravi", "LastName": "Kumar", "PaxType": "Adult"},
                {"Title": "Ms", "FirstName": "Asha", "LastName": "Kumar", "PaxType": "Adult"},
            ],
        });
        let details = parse_details(response);
        assert_eq!(details.guest_info.len(), 2);
    }

    #[test]
    fn policy_html_is_cleaned() {
        let response = json!({
            "Room": [{
                "RoomID": "R1",
                "CancellationPolicy": "<ul><li>Free until 01-Jan</li><li>50% after</li></ul>",
            }],
        });
        let details = parse_details(response);
        assert_eq!(
            details.rooms[0].cancellation_policy.as_deref(),
            Some("• Free until 01-Jan\n• 50% after")
        );
    }
}
