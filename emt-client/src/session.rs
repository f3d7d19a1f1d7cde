/// Per-user session management.
///
/// Maintains one isolated `AuthContext` per opaque session id so
/// concurrent users of the login/booking tools never share mutable
/// state. Expiry is discovered lazily on access; an external scheduler
/// may additionally call `cleanup_expired_sessions` for an active sweep.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config;

/// Authentication state for one user session.
///
/// `authenticated` implies the auth token is present; `clear` resets
/// every field to the unauthenticated state. The client IP is a fixed
/// literal the vendor expects, not a real geolocated address.
#[derive(Debug, Clone)]
pub struct AuthContext {
    logged_in: bool,
    auth: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    uid: Option<String>,
    name: Option<String>,
    ip: String,
    // OTP intermediate state (between send_otp and verify_otp)
    otp_token: Option<String>,
    otp_phone_or_email: Option<String>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthContext {
    pub fn new() -> Self {
        Self {
            logged_in: false,
            auth: None,
            email: None,
            phone: None,
            uid: None,
            name: None,
            ip: config::DEFAULT_CLIENT_IP.to_string(),
            otp_token: None,
            otp_phone_or_email: None,
        }
    }

    pub fn set_auth_token(
        &mut self,
        auth_token: &str,
        email: Option<&str>,
        phone: Option<&str>,
        uid: Option<&str>,
        name: Option<&str>,
    ) {
        self.logged_in = true;
        self.auth = Some(auth_token.to_string());
        self.email = email.map(str::to_string);
        self.phone = phone.map(str::to_string);
        self.uid = uid.map(str::to_string);
        self.name = name.map(str::to_string);
        self.ip = config::DEFAULT_CLIENT_IP.to_string();
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn is_authenticated(&self) -> bool {
        self.logged_in && self.auth.is_some()
    }

    pub fn auth(&self) -> Option<&str> {
        self.auth.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// Store the intermediate token from OTP step 1 until step 2 runs.
    pub fn set_otp_pending(&mut self, otp_token: &str, phone_or_email: &str) {
        self.otp_token = Some(otp_token.to_string());
        self.otp_phone_or_email = Some(phone_or_email.to_string());
    }

    pub fn otp_token(&self) -> Option<&str> {
        self.otp_token.as_deref()
    }

    pub fn otp_phone_or_email(&self) -> Option<&str> {
        self.otp_phone_or_email.as_deref()
    }

    pub fn clear_otp_pending(&mut self) {
        self.otp_token = None;
        self.otp_phone_or_email = None;
    }

    /// Safe projection for diagnostics; never exposes the token itself.
    pub fn user_info(&self) -> Value {
        json!({
            "email": self.email,
            "phone": self.phone,
            "uid": self.uid,
            "name": self.name,
            "ip": self.ip,
            "has_token": self.auth.is_some(),
        })
    }
}

struct SessionEntry {
    context: Arc<Mutex<AuthContext>>,
    created_at: DateTime<Utc>,
    last_accessed: Instant,
    last_accessed_at: DateTime<Utc>,
}

/// Maps opaque session ids to isolated auth contexts.
///
/// One coarse lock guards the whole map plus metadata, so the
/// lookup-expire-touch sequence is atomic with respect to concurrent
/// callers.
pub struct SessionManager {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    timeout: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

fn short(id: &str) -> &str {
    &id[..id.len().min(8)]
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(config::SESSION_TIMEOUT_MINUTES * 60))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    pub fn generate_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Create a session with a fresh context. Always succeeds; the
    /// returned id is authoritative.
    pub fn create_session(&self, session_id: Option<String>) -> (String, Arc<Mutex<AuthContext>>) {
        let mut sessions = self.sessions.lock().unwrap();
        let session_id = session_id.unwrap_or_else(Self::generate_session_id);

        let context = Arc::new(Mutex::new(AuthContext::new()));
        sessions.insert(
            session_id.clone(),
            SessionEntry {
                context: Arc::clone(&context),
                created_at: Utc::now(),
                last_accessed: Instant::now(),
                last_accessed_at: Utc::now(),
            },
        );

        tracing::info!("created new session: {}...", short(&session_id));
        (session_id, context)
    }

    /// Fetch a live session, touching its last-accessed time. Unknown
    /// and expired ids both return `None`; an expired entry is removed
    /// as a side effect.
    pub fn get_session(&self, session_id: &str) -> Option<Arc<Mutex<AuthContext>>> {
        let mut sessions = self.sessions.lock().unwrap();

        let expired = match sessions.get(session_id) {
            None => {
                tracing::debug!("session not found: {}...", short(session_id));
                return None;
            }
            Some(entry) => entry.last_accessed.elapsed() > self.timeout,
        };

        if expired {
            tracing::info!("session expired: {}...", short(session_id));
            Self::remove_entry(&mut sessions, session_id);
            return None;
        }

        let entry = sessions.get_mut(session_id)?;
        entry.last_accessed = Instant::now();
        entry.last_accessed_at = Utc::now();
        Some(Arc::clone(&entry.context))
    }

    /// Resume a valid session or create a new one. If the supplied id
    /// is unknown or expired, a fresh context is created under that id.
    pub fn get_or_create_session(
        &self,
        session_id: Option<String>,
    ) -> (String, Arc<Mutex<AuthContext>>) {
        if let Some(id) = &session_id {
            if let Some(context) = self.get_session(id) {
                return (id.clone(), context);
            }
        }
        self.create_session(session_id)
    }

    /// Explicit logout. Clears the context before dropping the mapping.
    pub fn remove_session(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        Self::remove_entry(&mut sessions, session_id)
    }

    fn remove_entry(sessions: &mut HashMap<String, SessionEntry>, session_id: &str) -> bool {
        match sessions.remove(session_id) {
            Some(entry) => {
                entry.context.lock().unwrap().clear();
                tracing::info!("removed session: {}...", short(session_id));
                true
            }
            None => false,
        }
    }

    pub fn list_sessions(&self) -> Vec<String> {
        self.sessions.lock().unwrap().keys().cloned().collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Active sweep for an external scheduler. Returns how many
    /// sessions were removed.
    pub fn cleanup_expired_sessions(&self) -> usize {
        let mut sessions = self.sessions.lock().unwrap();

        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, entry)| entry.last_accessed.elapsed() > self.timeout)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            Self::remove_entry(&mut sessions, id);
        }

        if !expired.is_empty() {
            tracing::info!("cleaned up {} expired sessions", expired.len());
        }
        expired.len()
    }

    /// Read-only snapshot for diagnostics. Does not touch the
    /// last-accessed time.
    pub fn get_session_info(&self, session_id: &str) -> Option<Value> {
        let sessions = self.sessions.lock().unwrap();
        let entry = sessions.get(session_id)?;
        let context = entry.context.lock().unwrap();
        let authenticated = context.is_authenticated();

        Some(json!({
            "session_id": session_id,
            "created_at": entry.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            "last_accessed": entry.last_accessed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            "is_authenticated": authenticated,
            "user_info": if authenticated { Some(context.user_info()) } else { None },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_are_isolated() {
        let manager = SessionManager::new();
        let (id_a, ctx_a) = manager.create_session(None);
        let (id_b, ctx_b) = manager.create_session(None);
        assert_ne!(id_a, id_b);

        ctx_a
            .lock()
            .unwrap()
            .set_auth_token("token-a", Some("a@x.com"), None, None, None);

        assert!(!ctx_b.lock().unwrap().is_authenticated());
        assert!(manager
            .get_session(&id_a)
            .unwrap()
            .lock()
            .unwrap()
            .is_authenticated());
        assert!(!manager
            .get_session(&id_b)
            .unwrap()
            .lock()
            .unwrap()
            .is_authenticated());
    }

    #[test]
    fn access_before_expiry_keeps_session_alive() {
        let manager = SessionManager::with_timeout(Duration::from_millis(80));
        let (id, _) = manager.create_session(None);

        for _ in 0..3 {
            std::thread::sleep(Duration::from_millis(50));
            assert!(manager.get_session(&id).is_some(), "touch should reset the clock");
        }
    }

    #[test]
    fn expired_session_is_removed_on_access() {
        let manager = SessionManager::with_timeout(Duration::from_millis(20));
        let (id, _) = manager.create_session(None);

        std::thread::sleep(Duration::from_millis(40));
        assert!(manager.get_session(&id).is_none());
        assert_eq!(manager.session_count(), 0);
    }

    #[test]
    fn get_or_create_falls_back_on_invalid_id() {
        let manager = SessionManager::new();
        let (id, _) = manager.get_or_create_session(Some("caller-chosen".to_string()));
        assert_eq!(id, "caller-chosen");

        // Resuming the same id returns the existing context.
        let (again, ctx) = manager.get_or_create_session(Some("caller-chosen".to_string()));
        assert_eq!(again, "caller-chosen");
        ctx.lock()
            .unwrap()
            .set_auth_token("tok", None, None, None, None);
        let (_, ctx2) = manager.get_or_create_session(Some("caller-chosen".to_string()));
        assert!(ctx2.lock().unwrap().is_authenticated());
    }

    #[test]
    fn remove_session_clears_context() {
        let manager = SessionManager::new();
        let (id, ctx) = manager.create_session(None);
        ctx.lock()
            .unwrap()
            .set_auth_token("tok", Some("a@x.com"), None, None, None);

        assert!(manager.remove_session(&id));
        assert!(!manager.remove_session(&id));
        // The caller's handle sees the cleared state.
        assert!(!ctx.lock().unwrap().is_authenticated());
        assert_eq!(ctx.lock().unwrap().ip(), config::DEFAULT_CLIENT_IP);
    }

    #[test]
    fn cleanup_sweeps_only_expired_sessions() {
        let manager = SessionManager::with_timeout(Duration::from_millis(30));
        let (old, _) = manager.create_session(None);
        std::thread::sleep(Duration::from_millis(50));
        let (fresh, _) = manager.create_session(None);

        assert_eq!(manager.cleanup_expired_sessions(), 1);
        assert!(manager.get_session(&fresh).is_some());
        assert!(manager.list_sessions().iter().all(|id| id != &old));
    }

    #[test]
    fn session_info_reports_auth_state() {
        let manager = SessionManager::new();
        let (id, ctx) = manager.create_session(None);

        let info = manager.get_session_info(&id).unwrap();
        assert_eq!(info["is_authenticated"], false);
        assert!(info["user_info"].is_null());

        ctx.lock()
            .unwrap()
            .set_auth_token("tok", Some("a@x.com"), Some("99"), None, Some("A"));
        let info = manager.get_session_info(&id).unwrap();
        assert_eq!(info["is_authenticated"], true);
        assert_eq!(info["user_info"]["email"], "a@x.com");
        assert_eq!(info["user_info"]["has_token"], true);

        assert!(manager.get_session_info("unknown").is_none());
    }
}
