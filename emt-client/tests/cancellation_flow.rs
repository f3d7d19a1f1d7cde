/// End-to-end cancellation flow tests against a scripted transport.
///
/// The mock records every request so tests can assert on which
/// endpoints were hit and with which payloads — in particular the
/// session-refresh behavior, which is only observable as an extra
/// login call.

mod common;

use serde_json::{json, Value};

use common::{endpoints, MockTransport};
use emt_client::cancellation::{CancellationService, MyBookingsClient, TransactionKind};

fn service(transport: &MockTransport) -> CancellationService<&MockTransport> {
    CancellationService::with_client(MyBookingsClient::new(transport, endpoints()))
}

fn hotel_login_response(bid: &str) -> Value {
    json!({
        "Ids": {
            "bid": bid,
            "TransactionScreenId": "SCREEN-1",
            "TransactionId": 5551,
            "TransactionType": "Hotel",
            "IsOtpSend": false,
        },
    })
}

#[tokio::test]
async fn guest_login_caches_ids_and_details_report_not_cancelled() {
    let transport = MockTransport::new();
    transport.stub("LoginGuestUser", json!({"Ids": {"bid": "XYZ", "TransactionType": "Hotel"}}));
    transport.stub(
        "Hotels/BookingDetails",
        json!({"Room": [{"RoomID": "R1", "RoomType": "Deluxe Double Room"}]}),
    );

    let mut svc = service(&transport);
    let login = svc.guest_login("EMT1624718", "a@b.com").await;
    assert!(login.success);
    assert_eq!(svc.state().bid(), Some("XYZ"));
    assert_eq!(svc.state().kind(), Some(TransactionKind::Hotel));

    let details = svc.fetch_booking_details("XYZ").await;
    assert!(details.success);
    assert_eq!(details.rooms.len(), 1);
    assert!(!details.all_cancelled);
}

#[tokio::test]
async fn login_without_bid_reports_login_failed() {
    let transport = MockTransport::new();
    transport.stub(
        "LoginGuestUser",
        json!({"Ids": {"Message": "Booking not found"}}),
    );

    let mut svc = service(&transport);
    let login = svc.guest_login("BAD", "a@b.com").await;
    assert!(!login.success);
    assert_eq!(login.error.as_deref(), Some("LOGIN_FAILED"));
    assert_eq!(login.message, "Booking not found");
    assert!(svc.state().bid().is_none());
}

#[tokio::test]
async fn bid_casing_variants_are_accepted() {
    let transport = MockTransport::new();
    transport.stub("LoginGuestUser", json!({"Ids": {"BID": "UPPER"}}));

    let mut svc = service(&transport);
    assert!(svc.guest_login("EMT1", "a@b.com").await.success);
    assert_eq!(svc.state().bid(), Some("UPPER"));
}

#[tokio::test]
async fn transport_failure_is_folded_into_result() {
    let transport = MockTransport::new();
    // No stubs: every call fails at the transport level.
    let mut svc = service(&transport);
    let login = svc.guest_login("EMT1", "a@b.com").await;
    assert!(!login.success);
    assert!(login.error.is_some());
    assert_eq!(login.message, "Guest login failed due to an unexpected error");
}

#[tokio::test]
async fn verify_otp_without_session_makes_no_network_call() {
    let transport = MockTransport::new();
    let mut svc = service(&transport);

    let verify = svc.verify_otp("123456").await;
    assert!(!verify.success);
    assert_eq!(verify.error.as_deref(), Some("NO_SESSION"));
    assert_eq!(transport.count_calls(""), 0);
}

#[tokio::test]
async fn verify_otp_tolerates_string_booleans() {
    let transport = MockTransport::new();
    transport.stub("LoginGuestUser", hotel_login_response("BID-1"));
    transport.stub("VerifyGuestLoginOtp", json!({"isVerify": "True"}));

    let mut svc = service(&transport);
    svc.guest_login("EMT1", "a@b.com").await;
    let verify = svc.verify_otp("123456").await;
    assert!(verify.success);

    let payload = transport.last_payload("VerifyGuestLoginOtp").unwrap();
    assert_eq!(payload["BetId"], "BID-1");
    assert_eq!(payload["transactionType"], "Hotel");
}

#[tokio::test]
async fn cached_bid_is_reused_without_second_login() {
    let transport = MockTransport::new();
    transport.stub("LoginGuestUser", hotel_login_response("BID-1"));
    transport.stub("Hotels/CancellationOtp", json!({"isStatus": true, "Msg": "OTP sent"}));

    let mut svc = service(&transport);
    svc.guest_login("EMT1", "a@b.com").await;
    assert_eq!(transport.count_calls("LoginGuestUser"), 1);

    let first = svc.send_cancellation_otp("EMT1", "a@b.com").await;
    let second = svc.send_cancellation_otp("EMT1", "a@b.com").await;
    assert!(first.success && second.success);

    // Matching credentials: the cached bid is reused, no further logins.
    assert_eq!(transport.count_calls("LoginGuestUser"), 1);
    assert_eq!(transport.count_calls("Hotels/BookingDetails"), 0);
}

#[tokio::test]
async fn changed_credentials_trigger_refresh_before_otp() {
    let transport = MockTransport::new();
    transport.stub("LoginGuestUser", hotel_login_response("BID-1"));
    transport.stub("Hotels/BookingDetails", json!({"Room": []}));
    transport.stub("Hotels/CancellationOtp", json!({"isStatus": true}));

    let mut svc = service(&transport);
    svc.guest_login("EMT1", "a@b.com").await;

    // Different booking id: the cached bid is stale. The service must
    // re-login and advance the server-side session with a details
    // fetch before requesting the OTP.
    transport.stub("LoginGuestUser", hotel_login_response("BID-2"));
    let otp = svc.send_cancellation_otp("EMT2", "other@b.com").await;
    assert!(otp.success);

    assert_eq!(transport.count_calls("LoginGuestUser"), 2);
    assert_eq!(transport.count_calls("Hotels/BookingDetails"), 1);
    let payload = transport.last_payload("Hotels/CancellationOtp").unwrap();
    assert_eq!(payload["EmtScreenID"], "BID-2");
}

#[tokio::test]
async fn otp_request_uses_bid_not_transaction_screen_id() {
    let transport = MockTransport::new();
    transport.stub("LoginGuestUser", hotel_login_response("BID-1"));
    transport.stub("Hotels/CancellationOtp", json!({"isStatus": true}));

    let mut svc = service(&transport);
    svc.guest_login("EMT1", "a@b.com").await;
    let otp = svc.send_cancellation_otp("EMT1", "a@b.com").await;

    assert!(otp.success);
    let payload = transport.last_payload("Hotels/CancellationOtp").unwrap();
    // The login response carried TransactionScreenId "SCREEN-1"; the
    // OTP call must still use the bid.
    assert_eq!(payload["EmtScreenID"], "BID-1");
    assert_eq!(otp.transaction_screen_id.as_deref(), Some("SCREEN-1"));
}

#[tokio::test]
async fn otp_send_is_lenient_when_no_error_signal_present() {
    let transport = MockTransport::new();
    transport.stub("LoginGuestUser", hotel_login_response("BID-1"));
    transport.stub("Hotels/CancellationOtp", json!({"isStatus": false, "Msg": null}));

    let mut svc = service(&transport);
    svc.guest_login("EMT1", "a@b.com").await;
    let otp = svc.send_cancellation_otp("EMT1", "a@b.com").await;
    assert!(otp.success, "missing isStatus without an error signal is a success");

    transport.stub(
        "Hotels/CancellationOtp",
        json!({"isStatus": false, "Msg": "OTP expired"}),
    );
    let otp = svc.send_cancellation_otp("EMT1", "a@b.com").await;
    assert!(!otp.success);
    assert_eq!(otp.error.as_deref(), Some("OTP_SEND_FAILED"));
}

#[tokio::test]
async fn hotel_confirm_sends_vendor_quirk_payload() {
    let transport = MockTransport::new();
    transport.stub("LoginGuestUser", hotel_login_response("BID-1"));
    transport.stub(
        "Hotels/RequestCancellation",
        json!({"Status": true, "LogMessage": "Cancellation accepted"}),
    );

    let mut svc = service(&transport);
    svc.guest_login("EMT1", "a@b.com").await;
    let cancel = svc
        .request_cancellation(
            "EMT1",
            "a@b.com",
            "654321",
            "R001",
            "TXN_H001",
            false,
            "https://pay.test/checkout",
            None,
            None,
        )
        .await;

    assert!(cancel.success);
    assert_eq!(cancel.message, "Cancellation accepted");

    let payload = transport.last_payload("Hotels/RequestCancellation").unwrap();
    assert_eq!(payload["RoomId"], "undefined");
    assert_eq!(payload["ApplicationType"], "false");
    assert_eq!(payload["IsPayHotel"], "false");
    assert_eq!(payload["Reason"], "Change of plans");
    assert_eq!(payload["Bid"], "BID-1");
}

#[tokio::test]
async fn plain_string_cancellation_response_is_handled() {
    let transport = MockTransport::new();
    transport.stub("LoginGuestUser", hotel_login_response("BID-1"));
    transport.stub(
        "Hotels/RequestCancellation",
        json!("Request processed: booking cancelled"),
    );

    let mut svc = service(&transport);
    svc.guest_login("EMT1", "a@b.com").await;
    let cancel = svc
        .request_cancellation("EMT1", "a@b.com", "1", "R1", "T1", false, "", None, None)
        .await;

    assert!(cancel.success);
    assert_eq!(cancel.message, "Request processed: booking cancelled");
}

#[tokio::test]
async fn train_flow_uses_pax_screen_id_and_parallel_selection_array() {
    let transport = MockTransport::new();
    transport.stub(
        "LoginGuestUser",
        json!({"Ids": {"bid": "TR-BID", "TransactionType": "Train"}}),
    );
    transport.stub(
        "Train/BookingDetail",
        json!({
            "PaxList": [
                {"ID": "EMT-SCREEN-9", "PaxId": "1", "TicketCurrentStatus": "CNF"},
                {"ID": "EMT-SCREEN-9", "PaxId": "2", "TicketCurrentStatus": "CNF"},
                {"ID": "EMT-SCREEN-9", "PaxId": "3", "TicketCurrentStatus": "CNF"},
            ],
            "TrainDetails": {"ReservationId": "RSV7"},
        }),
    );
    transport.stub("Train/CancellationOtp", json!({"isStatus": true}));
    transport.stub("Train/CancelTrain", json!({"Status": true, "LogMessage": "Done"}));

    let mut svc = service(&transport);
    svc.guest_login("EMT9", "a@b.com").await;
    let details = svc.fetch_train_booking_details("TR-BID").await;
    assert_eq!(details.emt_screen_id.as_deref(), Some("EMT-SCREEN-9"));

    let otp = svc.send_train_cancellation_otp().await;
    assert!(otp.success);
    let payload = transport.last_payload("Train/CancellationOtp").unwrap();
    assert_eq!(payload["EmtScreenID"], "EMT-SCREEN-9");

    let selected = vec!["1".to_string(), "3".to_string()];
    let all = vec!["1".to_string(), "2".to_string(), "3".to_string()];
    let cancel = svc
        .request_train_cancellation("42", &selected, &all, "RSV7", "PNR123")
        .await;
    assert!(cancel.success);

    let payload = transport.last_payload("Train/CancelTrain").unwrap();
    assert_eq!(payload["ArycheckedValue"], json!(["Y", "N", "Y"]));
    assert_eq!(payload["totalPassenger"], 3);
    assert_eq!(payload["_PaxID"], json!(["1", "3"]));
    assert_eq!(payload["bid"], "EMT-SCREEN-9");
    assert_eq!(payload["PnrNumber"], "PNR123");
}

#[tokio::test]
async fn train_otp_without_details_reports_no_screen_id() {
    let transport = MockTransport::new();
    let mut svc = service(&transport);
    let otp = svc.send_train_cancellation_otp().await;
    assert!(!otp.success);
    assert_eq!(otp.error.as_deref(), Some("NO_SCREEN_ID"));
    assert_eq!(transport.count_calls(""), 0);
}

#[tokio::test]
async fn flight_partial_cancel_flag_tracks_selection() {
    let transport = MockTransport::new();
    transport.stub(
        "LoginGuestUser",
        json!({"Ids": {"bid": "FL-BID", "TransactionType": "Flight"}}),
    );
    transport.stub(
        "GetFlightDetails",
        json!({
            "PassengerDetails": {
                "FlightPriceDetails": {"TransactionId": "162759795"},
                "fltDetails": {"transactionScreenId": "EMT162759795"},
            },
            "bookedPassanger": {
                "outbond": {
                    "outBondTypePass": [
                        {"paxId": "1", "isCancellable": "true", "paxstatus": "Confirmed"},
                        {"paxId": "2", "isCancellable": "true", "paxstatus": "Confirmed"},
                    ],
                },
            },
        }),
    );
    transport.stub("SendOtpOnCancellation", json!({"IsStatus": true}));
    transport.stub("FlightCancellation", json!({"isRequested": true, "RequestId": "RQ1"}));

    let mut svc = service(&transport);
    svc.guest_login("EMT162759795", "a@b.com").await;
    let details = svc.fetch_flight_booking_details("FL-BID").await;
    assert_eq!(details.total_cancellable, 2);

    let otp = svc.send_flight_cancellation_otp("a@b.com").await;
    assert!(otp.success);
    let payload = transport.last_payload("SendOtpOnCancellation").unwrap();
    assert_eq!(payload["TransctionId"], "162759795");
    assert_eq!(payload["TransctionScreenId"], "EMT162759795");

    // One of two cancellable passengers: a partial cancellation.
    let cancel = svc
        .request_flight_cancellation("a@b.com", "99", "1", "", "1")
        .await;
    assert!(cancel.success);
    assert_eq!(
        cancel.message,
        "Cancellation request submitted (Request ID: RQ1)"
    );
    let payload = transport.last_payload("FlightCancellation").unwrap();
    assert_eq!(payload["isPartialCancel"], "true");
    assert_eq!(payload["outBoundPaxIds"], "1");

    // Both passengers: full cancellation, ids dash-joined.
    svc.request_flight_cancellation("a@b.com", "99", "1,2", "", "1")
        .await;
    let payload = transport.last_payload("FlightCancellation").unwrap();
    assert_eq!(payload["isPartialCancel"], "false");
    assert_eq!(payload["outBoundPaxIds"], "1-2");
}

#[tokio::test]
async fn refresh_routes_to_kind_specific_details_endpoint() {
    let transport = MockTransport::new();
    transport.stub(
        "LoginGuestUser",
        json!({"Ids": {"bid": "TR-BID", "TransactionType": "Train"}}),
    );
    transport.stub("Train/BookingDetail", json!({"PaxList": []}));
    transport.stub("Hotels/CancellationOtp", json!({"isStatus": true}));

    let mut svc = service(&transport);
    svc.guest_login("EMT9", "a@b.com").await;

    // Stale credentials on a train booking: the refresh must fetch
    // train details, not hotel details, to avoid cross-module OTP sends.
    svc.send_cancellation_otp("EMT-OTHER", "a@b.com").await;
    assert_eq!(transport.count_calls("Train/BookingDetail"), 1);
    assert_eq!(transport.count_calls("Hotels/BookingDetails"), 0);
}

#[tokio::test]
async fn bus_flow_requires_login_bid() {
    let transport = MockTransport::new();
    let mut svc = service(&transport);

    let otp = svc.send_bus_cancellation_otp().await;
    assert!(!otp.success);
    assert_eq!(otp.error.as_deref(), Some("NO_BID"));

    transport.stub(
        "LoginGuestUser",
        json!({"Ids": {"bid": "BUS-BID", "TransactionType": "Bus"}}),
    );
    transport.stub("Bus/CancellationOtp", json!({"isStatus": true, "Msg": "sent"}));
    transport.stub(
        "bus/RequestCancellation",
        json!({
            "Status": true,
            "Message": "Seat cancelled",
            "Data": {"refundAmount": 450, "cancellationCharges": 50},
        }),
    );

    svc.guest_login("EMT5", "a@b.com").await;
    let otp = svc.send_bus_cancellation_otp().await;
    assert!(otp.success);
    let payload = transport.last_payload("Bus/CancellationOtp").unwrap();
    assert_eq!(payload["EmtScreenID"], "BUS-BID");

    let cancel = svc
        .request_bus_cancellation("11", "A1,A2", "TXN", "", "")
        .await;
    assert!(cancel.success);
    let refund = cancel.refund_info.unwrap();
    assert_eq!(refund.refund_amount, Some(json!(450)));
    let payload = transport.last_payload("bus/RequestCancellation").unwrap();
    assert_eq!(payload["Seats"], "A1,A2");
    assert_eq!(payload["Bid"], "BUS-BID");
}
