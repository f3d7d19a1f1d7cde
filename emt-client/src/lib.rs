/// Vendor API client library for the travel-assistant backend.
///
/// Wraps the travel agency's internal REST APIs behind typed services:
/// guest cancellation flows (hotel / train / bus / flight), per-user
/// session management, booking lookup, OTP login, PNR status and train
/// route checks. All vendor calls go through a cookie-retaining
/// transport so the vendor's server-side session survives across the
/// multi-step flows.
pub mod bookings;
pub mod cancellation;
pub mod codec;
pub mod config;
pub mod fields;
pub mod html;
pub mod http;
pub mod login;
pub mod pnr;
pub mod route;
pub mod session;

pub use cancellation::{CancellationService, MyBookingsClient, TransactionKind};
pub use codec::{PassthroughCodec, PayloadCipher, PnrCipher};
pub use config::Endpoints;
pub use http::{HttpTransport, VendorTransport};
pub use session::{AuthContext, SessionManager};
