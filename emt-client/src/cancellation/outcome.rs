/// Step result types for the cancellation flow.
///
/// Every public step returns one of these instead of erroring: the tool
/// layer needs a uniform `success`/`error`/`message` contract, with the
/// raw vendor response attached where callers render from it.

use serde::Serialize;
use serde_json::Value;

use crate::fields;

/// Identifier bundle returned by guest login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginIds {
    pub bid: String,
    pub transaction_id: Option<Value>,
    pub transaction_screen_id: Option<String>,
    pub transaction_type: Option<String>,
    pub is_otp_send: Option<Value>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub success: bool,
    pub ids: Option<LoginIds>,
    pub error: Option<String>,
    pub message: String,
}

impl LoginOutcome {
    pub(crate) fn failed(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            ids: None,
            error: Some(error.into()),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOutcome {
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpOutcome {
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
    pub bid: Option<String>,
    pub transaction_screen_id: Option<String>,
    pub raw_response: Value,
}

impl OtpOutcome {
    pub(crate) fn failed(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(error.into()),
            bid: None,
            transaction_screen_id: None,
            raw_response: fields::empty_object(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundInfo {
    pub refund_amount: Option<Value>,
    pub cancellation_charges: Option<Value>,
    pub refund_mode: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelOutcome {
    pub success: bool,
    pub message: String,
    pub refund_info: Option<RefundInfo>,
    pub error: Option<String>,
    pub raw_response: Value,
}

impl CancelOutcome {
    pub(crate) fn failed(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            refund_info: None,
            error: Some(error.into()),
            raw_response: fields::empty_object(),
        }
    }
}

// ---------------------------------------------------------------- hotel

#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub room_id: Option<String>,
    pub room_type: Option<String>,
    pub room_no: Option<Value>,
    pub transaction_id: Option<Value>,
    pub cancellation_policy: Option<String>,
    pub is_pay_at_hotel: bool,
    pub total_adults: Option<Value>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub hotel_name: Option<String>,
    pub amount: Option<Value>,
    pub meal_type: Option<String>,
    pub confirmation_no: Option<Value>,
    pub payment_due_date: Option<String>,
    pub payment_remaining_days: Option<Value>,
    pub is_cancelled: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HotelInfo {
    pub hotel_name: Option<String>,
    pub address: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub duration: Option<Value>,
    pub total_fare: Option<Value>,
    pub number_of_rooms: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Guest {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub pax_type: Option<String>,
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HotelDetailsOutcome {
    pub success: bool,
    pub rooms: Vec<Room>,
    pub hotel_info: HotelInfo,
    pub guest_info: Vec<Guest>,
    pub all_cancelled: bool,
    pub error: Option<String>,
    pub raw_response: Value,
}

impl HotelDetailsOutcome {
    pub(crate) fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            rooms: Vec::new(),
            hotel_info: HotelInfo::default(),
            guest_info: Vec::new(),
            all_cancelled: false,
            error: Some(error.into()),
            raw_response: fields::empty_object(),
        }
    }
}

// ---------------------------------------------------------------- train

#[derive(Debug, Clone, Serialize)]
pub struct TrainPassenger {
    pub pax_id: Option<Value>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub age: Option<Value>,
    pub gender: Option<String>,
    pub pax_type: Option<String>,
    pub seat_no: Option<Value>,
    pub seat_type: Option<String>,
    pub coach_number: Option<Value>,
    pub booking_status: Option<String>,
    pub current_status: String,
    pub is_cancelled: bool,
    pub pnr_number: Option<Value>,
    pub transaction_id: Option<Value>,
    pub cancel_request: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainInfo {
    pub train_name: Option<String>,
    pub train_number: Option<Value>,
    pub from_station: Option<String>,
    pub from_station_name: Option<String>,
    pub to_station: Option<String>,
    pub to_station_name: Option<String>,
    pub departure_date: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_date: Option<String>,
    pub arrival_time: Option<String>,
    pub boarding_station: Option<String>,
    pub boarding_date: Option<String>,
    pub boarding_time: Option<String>,
    pub duration: Option<Value>,
    pub travel_class: Option<String>,
    pub quota: Option<String>,
    pub distance: Option<Value>,
    pub num_adults: Option<Value>,
    pub num_children: Option<Value>,
    pub num_infants: Option<Value>,
    pub reservation_id: Option<Value>,
    pub booking_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainPriceInfo {
    pub base_fare: Option<Value>,
    pub tax: Option<Value>,
    pub total_fare: Option<Value>,
    pub insurance_charges: Option<Value>,
    pub is_free_cancellation: Option<Value>,
    pub free_cancellation_amount: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainCancelPriceInfo {
    pub total_amount_paid: Option<Value>,
    pub total_fare: Option<Value>,
    pub base_fare: Option<Value>,
    pub irctc_charges: Option<Value>,
    pub irctc_convenience_fee: Option<Value>,
    pub agent_service_charge: Option<Value>,
    pub reservation_charge: Option<Value>,
    pub superfast_charge: Option<Value>,
    pub free_cancellation_amount: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainDetailsOutcome {
    pub success: bool,
    pub passengers: Vec<TrainPassenger>,
    pub train_info: TrainInfo,
    pub price_info: TrainPriceInfo,
    pub cancel_price_info: TrainCancelPriceInfo,
    pub reservation_id: Option<Value>,
    pub pnr_number: Option<Value>,
    pub emt_screen_id: Option<String>,
    pub bet_id: Option<Value>,
    pub all_cancelled: bool,
    pub error: Option<String>,
    pub raw_response: Value,
}

impl TrainDetailsOutcome {
    pub(crate) fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            passengers: Vec::new(),
            train_info: TrainInfo::default(),
            price_info: TrainPriceInfo::default(),
            cancel_price_info: TrainCancelPriceInfo::default(),
            reservation_id: None,
            pnr_number: None,
            emt_screen_id: None,
            bet_id: None,
            all_cancelled: false,
            error: Some(error.into()),
            raw_response: fields::empty_object(),
        }
    }
}

// ------------------------------------------------------------------ bus

#[derive(Debug, Clone, Serialize)]
pub struct BusPassenger {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<Value>,
    pub seat_no: Option<Value>,
    pub fare: Option<Value>,
    pub status: String,
    pub is_cancelled: bool,
    pub is_cancel_req: bool,
    pub journey_status: Option<String>,
    pub refund_amount: Option<Value>,
    pub cancellation_charge: Option<Value>,
    pub total_fare: Option<Value>,
    pub base_fare: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BusInfo {
    pub transaction_id: Option<Value>,
    pub ticket_no: Option<Value>,
    pub ticket_status: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub departure_time: Option<String>,
    pub date_of_journey: Option<String>,
    pub bus_type: Option<String>,
    pub num_passengers: Option<Value>,
    pub travels_operator: Option<String>,
    pub bp_location: Option<String>,
    pub bp_time: Option<String>,
    pub bus_duration: Option<Value>,
    pub arrival_time: Option<String>,
    pub arrival_date: Option<String>,
    pub total_fare: Option<Value>,
    pub total_base_fare: Option<Value>,
    pub total_tax: Option<Value>,
    pub refund_amount: Option<Value>,
    pub cancellation_charge: Option<Value>,
    pub cancellation_policy: String,
    pub cancellation_policy_html: String,
    pub booking_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BusPriceInfo {
    pub total_fare: Option<Value>,
    pub base_fare: Option<Value>,
    pub tax: Option<Value>,
    pub refund_amount: Option<Value>,
    pub card_discount: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BusDetailsOutcome {
    pub success: bool,
    pub passengers: Vec<BusPassenger>,
    pub bus_info: BusInfo,
    pub price_info: BusPriceInfo,
    pub ticket_no: Option<Value>,
    pub all_cancelled: bool,
    pub error: Option<String>,
    pub raw_response: Value,
}

impl BusDetailsOutcome {
    pub(crate) fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            passengers: Vec::new(),
            bus_info: BusInfo::default(),
            price_info: BusPriceInfo::default(),
            ticket_no: None,
            all_cancelled: false,
            error: Some(error.into()),
            raw_response: fields::empty_object(),
        }
    }
}

// --------------------------------------------------------------- flight

#[derive(Debug, Clone, Serialize)]
pub struct FlightSegment {
    pub airline_name: Option<String>,
    pub airline_code: Option<String>,
    pub flight_number: Option<Value>,
    pub origin: Option<String>,
    pub origin_city: Option<String>,
    pub origin_airport: Option<String>,
    pub destination: Option<String>,
    pub destination_city: Option<String>,
    pub destination_airport: Option<String>,
    pub departure_date: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_date: Option<String>,
    pub arrival_time: Option<String>,
    pub origin_terminal: Option<Value>,
    pub destination_terminal: Option<Value>,
    pub duration: Option<Value>,
    pub cabin_class: Option<String>,
    pub cabin_baggage: Option<Value>,
    pub check_in_baggage: Option<Value>,
    pub bound_type: Option<String>,
    pub stops: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightPassenger {
    pub pax_id: Option<Value>,
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub pax_type: Option<String>,
    pub ticket_number: Option<Value>,
    pub status: String,
    pub is_cancellable: bool,
    pub is_cancelled: bool,
    pub cancellation_charge: Option<Value>,
    pub bound_type: Option<String>,
    pub possible_mode: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FlightPriceInfo {
    pub total_fare: Option<Value>,
    pub total_base_fare: Option<Value>,
    pub total_tax: Option<Value>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightPnr {
    pub airline_pnr: Option<Value>,
    pub gds_pnr: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightPolicyItem {
    pub charge_type: Option<String>,
    pub charge_value: Option<Value>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub policy_text: Option<String>,
    pub is_refundable: Option<Value>,
    pub is_cancellation: Option<Value>,
    pub policy_detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightPolicySector {
    pub sector_name: Option<String>,
    pub bound_type: Option<String>,
    pub departure_date: Option<String>,
    pub flight_image: Option<String>,
    pub policies: Vec<FlightPolicyItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightDetailsOutcome {
    pub success: bool,
    pub flight_segments: Vec<FlightSegment>,
    pub outbound_passengers: Vec<FlightPassenger>,
    pub inbound_passengers: Vec<FlightPassenger>,
    pub price_info: FlightPriceInfo,
    pub pnr_info: Vec<FlightPnr>,
    pub cancellation_policy: Vec<FlightPolicySector>,
    pub pax_statuses: Vec<Value>,
    pub trip_status: String,
    pub transaction_id: Option<String>,
    pub transaction_screen_id: Option<String>,
    pub all_cancelled: bool,
    pub total_cancellable: usize,
    pub error: Option<String>,
    pub raw_response: Value,
}

impl FlightDetailsOutcome {
    pub(crate) fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            flight_segments: Vec::new(),
            outbound_passengers: Vec::new(),
            inbound_passengers: Vec::new(),
            price_info: FlightPriceInfo::default(),
            pnr_info: Vec::new(),
            cancellation_policy: Vec::new(),
            pax_statuses: Vec::new(),
            trip_status: String::new(),
            transaction_id: None,
            transaction_screen_id: None,
            all_cancelled: false,
            total_cancellable: 0,
            error: Some(error.into()),
            raw_response: fields::empty_object(),
        }
    }
}
