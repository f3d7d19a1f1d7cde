/// Vendor endpoint configuration.
///
/// Every base URL can be overridden from the environment (or a .env
/// file) so staging hosts can be swapped in without rebuilding.

use std::env;

/// Connection establishment should fail fast.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Cancellation confirmations can be slow on the vendor side.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Idle sessions are dropped after this many minutes.
pub const SESSION_TIMEOUT_MINUTES: u64 = 30;

/// The vendor expects this literal client IP in several payloads.
pub const DEFAULT_CLIENT_IP: &str = "49.249.40.58";

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Resolved vendor endpoints.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Booking-management host (guest login, hotel/train/bus cancellation).
    pub mybookings_base_url: String,
    /// Flight post-booking detail endpoint (separate host).
    pub flight_details_url: String,
    /// Flight cancellation OTP endpoint (legacy .svc host).
    pub flight_otp_url: String,
    /// Flight cancellation endpoint.
    pub flight_cancel_url: String,
    /// Product search endpoint used for the "my bookings" list.
    pub bookings_search_url: String,
    /// OTP login step 1: send OTP.
    pub login_send_otp_url: String,
    /// OTP login step 2: authenticate OTP.
    pub login_authenticate_url: String,
    /// Railways PNR status endpoint.
    pub pnr_status_url: String,
    /// Railways train schedule enquiry endpoint.
    pub train_route_url: String,
}

impl Endpoints {
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        Self {
            mybookings_base_url: env_or(
                "MYBOOKINGS_BASE_URL",
                "https://mybookings.easemytrip.com",
            ),
            flight_details_url: env_or(
                "FLIGHT_DETAILS_URL",
                "https://emtservice-ln.easemytrip.com/api/Flight/GetFlightDetails",
            ),
            flight_otp_url: env_or(
                "FLIGHT_OTP_URL",
                "http://emtservice.easemytrip.com/emtapp.svc/SendOtpOnCancellation",
            ),
            flight_cancel_url: env_or(
                "FLIGHT_CANCEL_URL",
                "https://emtservice-ln.easemytrip.com/api/Flight/FlightCancellation",
            ),
            bookings_search_url: env_or(
                "BOOKINGS_SEARCH_URL",
                "https://emtservice-ln.easemytrip.com/api/Product/search-product",
            ),
            login_send_otp_url: env_or(
                "LOGIN_SEND_OTP_URL",
                "https://loginuser.easemytrip.com/api/Login/VerifyUserLogin",
            ),
            login_authenticate_url: env_or(
                "LOGIN_AUTHENTICATE_URL",
                "https://loginuser.easemytrip.com/api/Login/AuthenticateLoginUser",
            ),
            pnr_status_url: env_or(
                "PNR_STATUS_URL",
                "https://railways.easemytrip.com/Train/PnrchkStatus",
            ),
            train_route_url: env_or(
                "TRAIN_ROUTE_URL",
                "https://railways.easemytrip.com/Train/TrainScheduleEnquiry",
            ),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_env()
    }
}
