/// Travel Tools Server - Booking & Cancellation Service
///
/// Exposes the vendor-facing services as tools over HTTP API
/// - POST /tools/<name> - Invoke a tool
/// - GET /tools - List all tools
/// - GET /health - Health check

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Extension, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use emt_client::bookings::BookingsClient;
use emt_client::cancellation::{CancellationService, TransactionKind};
use emt_client::codec::PassthroughCodec;
use emt_client::login::OtpLoginService;
use emt_client::pnr::PnrStatusService;
use emt_client::route::TrainRouteService;
use emt_client::{Endpoints, HttpTransport, SessionManager};

/// Shared server state. Cancellation flows are keyed by session id —
/// one service instance (and one vendor cookie jar) per in-flight
/// attempt, never shared across sessions.
struct AppState {
    sessions: SessionManager,
    flows: Mutex<HashMap<String, Arc<Mutex<CancellationService<HttpTransport>>>>>,
    endpoints: Endpoints,
}

type SharedState = Arc<AppState>;

/// Standard Tool Response
#[derive(Debug, serde::Serialize)]
struct ToolResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ToolResponse {
    fn ok(data: Value) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }

    fn from_outcome<T: serde::Serialize>(outcome: T) -> Json<Self> {
        let data = serde_json::to_value(&outcome).unwrap_or_else(|_| json!({}));
        let success = data
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Json(Self {
            success,
            data: Some(data),
            error: None,
        })
    }

    fn err(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(message.into()),
        })
    }
}

async fn flow_for(
    state: &AppState,
    session_id: &str,
) -> Result<Arc<Mutex<CancellationService<HttpTransport>>>> {
    let mut flows = state.flows.lock().await;
    if let Some(flow) = flows.get(session_id) {
        return Ok(Arc::clone(flow));
    }
    let service = CancellationService::new(state.endpoints.clone())?;
    let flow = Arc::new(Mutex::new(service));
    flows.insert(session_id.to_string(), Arc::clone(&flow));
    Ok(flow)
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

/// List all available tools
async fn list_tools() -> Json<Value> {
    tracing::info!("[LIST TOOLS] Received request to list available tools");
    Json(json!({
        "tools": [
            {
                "name": "create-session",
                "description": "Create or resume an isolated user session",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "session_id": {"type": "string", "description": "Existing session id to resume (optional)"}
                    }
                }
            },
            {
                "name": "cancellation-login",
                "description": "Guest login with booking id and email to start a cancellation",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "session_id": {"type": "string"},
                        "booking_id": {"type": "string", "description": "Booking reference (e.g., EMT1624718)"},
                        "email": {"type": "string", "description": "Email used for the booking"}
                    },
                    "required": ["session_id", "booking_id", "email"]
                }
            },
            {
                "name": "cancellation-details",
                "description": "Fetch booking details for the logged-in cancellation flow",
                "inputSchema": {
                    "type": "object",
                    "properties": {"session_id": {"type": "string"}},
                    "required": ["session_id"]
                }
            },
            {
                "name": "cancellation-send-otp",
                "description": "Send the cancellation OTP for the current booking",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "session_id": {"type": "string"},
                        "booking_id": {"type": "string"},
                        "email": {"type": "string"}
                    },
                    "required": ["session_id", "booking_id", "email"]
                }
            },
            {
                "name": "cancellation-confirm",
                "description": "Submit the cancellation with the received OTP",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "session_id": {"type": "string"},
                        "booking_id": {"type": "string"},
                        "email": {"type": "string"},
                        "otp": {"type": "string"},
                        "room_id": {"type": "string"},
                        "transaction_id": {"type": "string"},
                        "is_pay_at_hotel": {"type": "boolean"},
                        "payment_url": {"type": "string"},
                        "reason": {"type": "string"},
                        "remark": {"type": "string"},
                        "pax_ids": {"type": "array", "items": {"type": "string"}},
                        "all_pax_ids": {"type": "array", "items": {"type": "string"}},
                        "reservation_id": {"type": "string"},
                        "pnr_number": {"type": "string"},
                        "seats": {"type": "string"},
                        "outbound_pax_ids": {"type": "string"},
                        "inbound_pax_ids": {"type": "string"},
                        "mode": {"type": "string"}
                    },
                    "required": ["session_id", "otp"]
                }
            },
            {
                "name": "my-bookings",
                "description": "Fetch all bookings for the authenticated user",
                "inputSchema": {
                    "type": "object",
                    "properties": {"session_id": {"type": "string"}},
                    "required": ["session_id"]
                }
            },
            {
                "name": "login-send-otp",
                "description": "Send a login OTP to a phone number or email",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "session_id": {"type": "string"},
                        "phone_or_email": {"type": "string"}
                    },
                    "required": ["phone_or_email"]
                }
            },
            {
                "name": "login-verify-otp",
                "description": "Verify the login OTP and authenticate the session",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "session_id": {"type": "string"},
                        "otp": {"type": "string"}
                    },
                    "required": ["session_id", "otp"]
                }
            },
            {
                "name": "pnr-status",
                "description": "Check the status of a 10-digit train PNR",
                "inputSchema": {
                    "type": "object",
                    "properties": {"pnr_number": {"type": "string"}},
                    "required": ["pnr_number"]
                }
            },
            {
                "name": "train-route",
                "description": "Fetch the route and schedule of a train",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "train_no": {"type": "string"},
                        "from_station_code": {"type": "string"},
                        "to_station_code": {"type": "string"}
                    },
                    "required": ["train_no", "from_station_code", "to_station_code"]
                }
            }
        ]
    }))
}

#[derive(Debug, Deserialize)]
struct SessionRequest {
    #[serde(default)]
    session_id: Option<String>,
}

async fn create_session(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<SessionRequest>,
) -> Json<ToolResponse> {
    let (session_id, _) = state.sessions.get_or_create_session(payload.session_id);
    ToolResponse::ok(json!({ "session_id": session_id }))
}

#[derive(Debug, Deserialize)]
struct SessionIdRequest {
    session_id: String,
}

async fn logout(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<SessionIdRequest>,
) -> Json<ToolResponse> {
    let removed = state.sessions.remove_session(&payload.session_id);
    state.flows.lock().await.remove(&payload.session_id);
    ToolResponse::ok(json!({ "removed": removed }))
}

async fn session_info(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<SessionIdRequest>,
) -> Json<ToolResponse> {
    match state.sessions.get_session_info(&payload.session_id) {
        Some(info) => ToolResponse::ok(info),
        None => ToolResponse::err("Session not found"),
    }
}

async fn cleanup_sessions(Extension(state): Extension<SharedState>) -> Json<ToolResponse> {
    let removed = state.sessions.cleanup_expired_sessions();
    ToolResponse::ok(json!({ "removed": removed }))
}

#[derive(Debug, Deserialize)]
struct CancellationLoginRequest {
    session_id: String,
    booking_id: String,
    email: String,
}

async fn cancellation_login(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<CancellationLoginRequest>,
) -> Json<ToolResponse> {
    let (session_id, _) = state
        .sessions
        .get_or_create_session(Some(payload.session_id));
    let flow = match flow_for(&state, &session_id).await {
        Ok(flow) => flow,
        Err(e) => return ToolResponse::err(format!("Failed to start cancellation flow: {e}")),
    };

    let outcome = flow
        .lock()
        .await
        .guest_login(&payload.booking_id, &payload.email)
        .await;
    ToolResponse::from_outcome(outcome)
}

#[derive(Debug, Deserialize)]
struct VerifyOtpRequest {
    session_id: String,
    otp: String,
}

async fn cancellation_verify_otp(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Json<ToolResponse> {
    let flow = match flow_for(&state, &payload.session_id).await {
        Ok(flow) => flow,
        Err(e) => return ToolResponse::err(format!("Failed to resume cancellation flow: {e}")),
    };
    let outcome = flow.lock().await.verify_otp(&payload.otp).await;
    ToolResponse::from_outcome(outcome)
}

/// Booking details, routed by the transaction kind learned at login.
async fn cancellation_details(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<SessionIdRequest>,
) -> Json<ToolResponse> {
    let flow = match flow_for(&state, &payload.session_id).await {
        Ok(flow) => flow,
        Err(e) => return ToolResponse::err(format!("Failed to resume cancellation flow: {e}")),
    };
    let mut service = flow.lock().await;

    let Some(bid) = service.state().bid().map(str::to_string) else {
        return ToolResponse::err("No active cancellation session. Please login first.");
    };
    let kind = service.state().kind().unwrap_or(TransactionKind::Hotel);

    match kind {
        TransactionKind::Hotel => {
            ToolResponse::from_outcome(service.fetch_booking_details(&bid).await)
        }
        TransactionKind::Train => {
            ToolResponse::from_outcome(service.fetch_train_booking_details(&bid).await)
        }
        TransactionKind::Bus => {
            ToolResponse::from_outcome(service.fetch_bus_booking_details(&bid).await)
        }
        TransactionKind::Flight => {
            ToolResponse::from_outcome(service.fetch_flight_booking_details(&bid).await)
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendOtpRequest {
    session_id: String,
    booking_id: String,
    email: String,
}

async fn cancellation_send_otp(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<SendOtpRequest>,
) -> Json<ToolResponse> {
    let flow = match flow_for(&state, &payload.session_id).await {
        Ok(flow) => flow,
        Err(e) => return ToolResponse::err(format!("Failed to resume cancellation flow: {e}")),
    };
    let mut service = flow.lock().await;

    let kind = service.state().kind().unwrap_or(TransactionKind::Hotel);
    let outcome = match kind {
        TransactionKind::Train => service.send_train_cancellation_otp().await,
        TransactionKind::Bus => service.send_bus_cancellation_otp().await,
        TransactionKind::Flight => service.send_flight_cancellation_otp(&payload.email).await,
        TransactionKind::Hotel => {
            service
                .send_cancellation_otp(&payload.booking_id, &payload.email)
                .await
        }
    };
    ToolResponse::from_outcome(outcome)
}

#[derive(Debug, Deserialize, Default)]
struct ConfirmRequest {
    session_id: String,
    #[serde(default)]
    booking_id: String,
    #[serde(default)]
    email: String,
    otp: String,
    // Hotel
    #[serde(default)]
    room_id: String,
    #[serde(default)]
    transaction_id: String,
    #[serde(default)]
    is_pay_at_hotel: bool,
    #[serde(default)]
    payment_url: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    remark: Option<String>,
    // Train
    #[serde(default)]
    pax_ids: Vec<String>,
    #[serde(default)]
    all_pax_ids: Vec<String>,
    #[serde(default)]
    reservation_id: String,
    #[serde(default)]
    pnr_number: String,
    // Bus
    #[serde(default)]
    seats: String,
    // Flight
    #[serde(default)]
    outbound_pax_ids: String,
    #[serde(default)]
    inbound_pax_ids: String,
    #[serde(default)]
    mode: String,
}

async fn cancellation_confirm(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<ConfirmRequest>,
) -> Json<ToolResponse> {
    let flow = match flow_for(&state, &payload.session_id).await {
        Ok(flow) => flow,
        Err(e) => return ToolResponse::err(format!("Failed to resume cancellation flow: {e}")),
    };
    let mut service = flow.lock().await;

    let kind = service.state().kind().unwrap_or(TransactionKind::Hotel);
    let outcome = match kind {
        TransactionKind::Train => {
            service
                .request_train_cancellation(
                    &payload.otp,
                    &payload.pax_ids,
                    &payload.all_pax_ids,
                    &payload.reservation_id,
                    &payload.pnr_number,
                )
                .await
        }
        TransactionKind::Bus => {
            service
                .request_bus_cancellation(
                    &payload.otp,
                    &payload.seats,
                    &payload.transaction_id,
                    payload.reason.as_deref().unwrap_or(""),
                    payload.remark.as_deref().unwrap_or(""),
                )
                .await
        }
        TransactionKind::Flight => {
            service
                .request_flight_cancellation(
                    &payload.email,
                    &payload.otp,
                    &payload.outbound_pax_ids,
                    &payload.inbound_pax_ids,
                    &payload.mode,
                )
                .await
        }
        TransactionKind::Hotel => {
            service
                .request_cancellation(
                    &payload.booking_id,
                    &payload.email,
                    &payload.otp,
                    &payload.room_id,
                    &payload.transaction_id,
                    payload.is_pay_at_hotel,
                    &payload.payment_url,
                    payload.reason.as_deref(),
                    payload.remark.as_deref(),
                )
                .await
        }
    };
    ToolResponse::from_outcome(outcome)
}

async fn my_bookings(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<SessionIdRequest>,
) -> Json<ToolResponse> {
    let Some(context) = state.sessions.get_session(&payload.session_id) else {
        return ToolResponse::err("Session not found or expired");
    };

    let (auth, email, ip) = {
        let ctx = context.lock().unwrap();
        if !ctx.is_authenticated() {
            return ToolResponse::err("Not logged in. Please authenticate first.");
        }
        (
            ctx.auth().unwrap_or_default().to_string(),
            ctx.email().or(ctx.uid()).unwrap_or_default().to_string(),
            ctx.ip().to_string(),
        )
    };

    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(e) => return ToolResponse::err(format!("HTTP client error: {e}")),
    };
    let client = BookingsClient::new(transport, &state.endpoints);
    ToolResponse::from_outcome(client.fetch_bookings(&auth, &email, &ip).await)
}

#[derive(Debug, Deserialize)]
struct LoginSendOtpRequest {
    #[serde(default)]
    session_id: Option<String>,
    phone_or_email: String,
}

async fn login_send_otp(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<LoginSendOtpRequest>,
) -> Json<ToolResponse> {
    let (session_id, context) = state.sessions.get_or_create_session(payload.session_id);

    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(e) => return ToolResponse::err(format!("HTTP client error: {e}")),
    };
    let service = OtpLoginService::new(transport, PassthroughCodec, &state.endpoints);
    let outcome = service.send_otp(&context, &payload.phone_or_email).await;

    let mut data = serde_json::to_value(&outcome).unwrap_or_else(|_| json!({}));
    if let Some(obj) = data.as_object_mut() {
        obj.insert("session_id".to_string(), json!(session_id));
    }
    Json(ToolResponse {
        success: outcome.success,
        data: Some(data),
        error: None,
    })
}

async fn login_verify_otp(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Json<ToolResponse> {
    let Some(context) = state.sessions.get_session(&payload.session_id) else {
        return ToolResponse::err("Session not found or expired");
    };

    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(e) => return ToolResponse::err(format!("HTTP client error: {e}")),
    };
    let service = OtpLoginService::new(transport, PassthroughCodec, &state.endpoints);
    ToolResponse::from_outcome(service.verify_otp(&context, &payload.otp).await)
}

#[derive(Debug, Deserialize)]
struct PnrRequest {
    pnr_number: String,
}

async fn pnr_status(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<PnrRequest>,
) -> Json<ToolResponse> {
    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(e) => return ToolResponse::err(format!("HTTP client error: {e}")),
    };
    let service = PnrStatusService::new(transport, PassthroughCodec, &state.endpoints);
    ToolResponse::from_outcome(service.check_pnr_status(&payload.pnr_number).await)
}

#[derive(Debug, Deserialize)]
struct RouteRequest {
    train_no: String,
    from_station_code: String,
    to_station_code: String,
}

async fn train_route(
    Extension(state): Extension<SharedState>,
    Json(payload): Json<RouteRequest>,
) -> Json<ToolResponse> {
    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(e) => return ToolResponse::err(format!("HTTP client error: {e}")),
    };
    let service = TrainRouteService::new(transport, &state.endpoints);
    ToolResponse::from_outcome(
        service
            .check_route(
                &payload.train_no,
                &payload.from_station_code,
                &payload.to_station_code,
            )
            .await,
    )
}

#[tokio::main]
async fn main() {
    // Load .env file
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║        Travel Tools Server - Booking & Cancellation        ║");
    println!("║        With Per-Session Vendor Flow Management             ║");
    println!("╚════════════════════════════════════════════════════════════╝\n");

    let port = std::env::var("MCP_SERVER_PORT")
        .unwrap_or_else(|_| "8002".to_string())
        .parse::<u16>()
        .unwrap_or(8002);

    let endpoints = Endpoints::from_env();
    println!("[INIT] Server configuration:");
    println!("  Port: {}", port);
    println!("  Booking host: {}", endpoints.mybookings_base_url);

    let state: SharedState = Arc::new(AppState {
        sessions: SessionManager::new(),
        flows: Mutex::new(HashMap::new()),
        endpoints,
    });
    tracing::info!("session manager initialized");

    // Periodic sweep so idle sessions don't accumulate between accesses.
    let sweeper = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            let removed = sweeper.sessions.cleanup_expired_sessions();
            if removed > 0 {
                let mut flows = sweeper.flows.lock().await;
                let live: Vec<String> = sweeper.sessions.list_sessions();
                flows.retain(|id, _| live.contains(id));
            }
        }
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/create-session", post(create_session))
        .route("/tools/logout", post(logout))
        .route("/tools/session-info", post(session_info))
        .route("/tools/cleanup-sessions", post(cleanup_sessions))
        .route("/tools/cancellation-login", post(cancellation_login))
        .route("/tools/cancellation-verify-otp", post(cancellation_verify_otp))
        .route("/tools/cancellation-details", post(cancellation_details))
        .route("/tools/cancellation-send-otp", post(cancellation_send_otp))
        .route("/tools/cancellation-confirm", post(cancellation_confirm))
        .route("/tools/my-bookings", post(my_bookings))
        .route("/tools/login-send-otp", post(login_send_otp))
        .route("/tools/login-verify-otp", post(login_verify_otp))
        .route("/tools/pnr-status", post(pnr_status))
        .route("/tools/train-route", post(train_route))
        .layer(CorsLayer::permissive())
        .layer(Extension(state));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind listener");

    println!("[STARTUP] ✓ Travel Tools Server running on http://0.0.0.0:{}", port);
    println!("  GET  /tools    — List available tools");
    println!("  POST /tools/*  — Invoke a tool");
    println!("  GET  /health   — Check server health\n");

    if let Err(e) = axum::serve(listener, app).await {
        println!("[FATAL] Server failed: {}", e);
    }
}
