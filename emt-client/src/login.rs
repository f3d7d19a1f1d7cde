/// Two-step OTP login.
///
/// Step 1 sends an OTP to the user's phone/email and stashes the
/// vendor's intermediate token in the session context; step 2 verifies
/// the OTP and writes the full auth credentials into the context. All
/// payload encryption goes through the injected [`PayloadCipher`].

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};

use crate::codec::PayloadCipher;
use crate::config::Endpoints;
use crate::fields::opt_str;
use crate::http::VendorTransport;
use crate::session::AuthContext;

/// "Email" when the identifier looks like an address, "Mobile" otherwise.
pub fn detect_uty(identifier: &str) -> &'static str {
    if identifier.contains('@') {
        "Email"
    } else {
        "Mobile"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpSendOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_or_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpVerifyOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

pub struct OtpLoginService<T: VendorTransport, C: PayloadCipher> {
    transport: T,
    cipher: C,
    send_url: String,
    authenticate_url: String,
}

impl<T: VendorTransport, C: PayloadCipher> OtpLoginService<T, C> {
    pub fn new(transport: T, cipher: C, endpoints: &Endpoints) -> Self {
        Self {
            transport,
            cipher,
            send_url: endpoints.login_send_otp_url.clone(),
            authenticate_url: endpoints.login_authenticate_url.clone(),
        }
    }

    /// Every request carries the encrypted `identifier|ip|type` triple
    /// as a `useridentity` header.
    fn identity_header(&self, phone_or_email: &str, ip: &str) -> Result<(String, String)> {
        let uty = detect_uty(phone_or_email);
        let identity = self
            .cipher
            .encrypt_field(&format!("{phone_or_email}|{ip}|{uty}"))?;
        Ok(("useridentity".to_string(), identity))
    }

    async fn post_encrypted(
        &self,
        url: &str,
        payload: Value,
        header: (String, String),
    ) -> Result<Value> {
        let encrypted = self.cipher.encrypt_payload(&payload.to_string())?;
        let body = json!({ "request": encrypted });

        let raw = self.transport.post_text(url, &body, &[header]).await?;
        let decrypted = self.cipher.decrypt_response(&raw)?;
        serde_json::from_str(&decrypted).context("decrypted login response was not valid JSON")
    }

    /// Step 1: dispatch the OTP and remember the intermediate token.
    pub async fn send_otp(
        &self,
        context: &Arc<Mutex<AuthContext>>,
        phone_or_email: &str,
    ) -> OtpSendOutcome {
        let ip = context.lock().unwrap().ip().to_string();
        tracing::info!("sending OTP to: {phone_or_email}");

        let result: Result<Value> = async {
            let uty = detect_uty(phone_or_email);
            let payload = json!({
                "UID": self.cipher.encrypt_field(phone_or_email)?,
                "CC": "+91",
                "ATY": "Resend",
                "UTY": self.cipher.encrypt_field(uty)?,
                "IP": self.cipher.encrypt_field(&ip)?,
                "VerifyToken": "",
            });
            let header = self.identity_header(phone_or_email, &ip)?;
            self.post_encrypted(&self.send_url, payload, header).await
        }
        .await;

        let data = match result {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("error sending OTP: {e:#}");
                return OtpSendOutcome {
                    success: false,
                    message: "An unexpected error occurred while sending OTP".to_string(),
                    error: Some(e.to_string()),
                    phone_or_email: None,
                };
            }
        };

        let message = opt_str(&data, "Message").unwrap_or_default();
        let Some(token) = opt_str(&data, "Token") else {
            return OtpSendOutcome {
                success: false,
                message: if message.is_empty() {
                    "OTP send failed: no token received".to_string()
                } else {
                    message
                },
                error: Some("NO_TOKEN_IN_RESPONSE".to_string()),
                phone_or_email: None,
            };
        };

        context
            .lock()
            .unwrap()
            .set_otp_pending(&token, phone_or_email);

        tracing::info!("OTP sent successfully to: {phone_or_email}");
        OtpSendOutcome {
            success: true,
            message: if message.is_empty() {
                "OTP sent successfully".to_string()
            } else {
                message
            },
            error: None,
            phone_or_email: Some(phone_or_email.to_string()),
        }
    }

    /// Step 2: verify the OTP against the stored intermediate token and
    /// persist the auth credentials on success.
    pub async fn verify_otp(
        &self,
        context: &Arc<Mutex<AuthContext>>,
        otp_code: &str,
    ) -> OtpVerifyOutcome {
        let (otp_token, phone_or_email, ip) = {
            let ctx = context.lock().unwrap();
            (
                ctx.otp_token().map(str::to_string),
                ctx.otp_phone_or_email().map(str::to_string),
                ctx.ip().to_string(),
            )
        };

        let (Some(otp_token), Some(phone_or_email)) = (otp_token, phone_or_email) else {
            return OtpVerifyOutcome {
                success: false,
                message: "No pending OTP found. Please send OTP first.".to_string(),
                error: Some("NO_PENDING_OTP".to_string()),
                user: None,
            };
        };

        tracing::info!("verifying OTP for: {phone_or_email}");
        let result: Result<Value> = async {
            let uty = detect_uty(&phone_or_email);
            let payload = json!({
                "UID": self.cipher.encrypt_field(&phone_or_email)?,
                "CC": "+91",
                "TKN": self.cipher.encrypt_field(&otp_token)?,
                "ATY": "Login",
                "UTY": self.cipher.encrypt_field(uty)?,
                "Pass": self.cipher.encrypt_field(otp_code)?,
                "PTY": "O",
                "UA": "",
                "RefCd": "",
                "RefLnk": "",
                "IP": self.cipher.encrypt_field(&ip)?,
                "VerifyToken": "",
                "Token": "",
            });
            let header = self.identity_header(&phone_or_email, &ip)?;
            self.post_encrypted(&self.authenticate_url, payload, header)
                .await
        }
        .await;

        let data = match result {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("error verifying OTP: {e:#}");
                return OtpVerifyOutcome {
                    success: false,
                    message: "An unexpected error occurred during OTP verification".to_string(),
                    error: Some(e.to_string()),
                    user: None,
                };
            }
        };

        let message = opt_str(&data, "Message").unwrap_or_default();
        let Some(auth_token) = opt_str(&data, "Auth") else {
            return OtpVerifyOutcome {
                success: false,
                message: if message.is_empty() {
                    "OTP verification failed: auth token missing".to_string()
                } else {
                    message
                },
                error: Some("AUTH_TOKEN_MISSING".to_string()),
                user: None,
            };
        };

        let name = opt_str(&data, "Name");
        let uid = opt_str(&data, "UID").unwrap_or_else(|| phone_or_email.clone());
        let customer_id = data.get("CustomerId").cloned();
        let is_email = phone_or_email.contains('@');

        {
            let mut ctx = context.lock().unwrap();
            ctx.clear_otp_pending();
            ctx.set_auth_token(
                &auth_token,
                is_email.then_some(phone_or_email.as_str()),
                (!is_email).then_some(phone_or_email.as_str()),
                Some(&uid),
                name.as_deref(),
            );
        }

        tracing::info!("OTP login successful for: {phone_or_email}");
        OtpVerifyOutcome {
            success: true,
            message: if message.is_empty() {
                "Login successful".to_string()
            } else {
                message
            },
            error: None,
            user: Some(json!({
                "name": name.unwrap_or_else(|| "N/A".to_string()),
                "email": if is_email { phone_or_email.as_str() } else { "N/A" },
                "phone": if is_email { "N/A" } else { phone_or_email.as_str() },
                "uid": uid,
                "customer_id": customer_id,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uty_detection() {
        assert_eq!(detect_uty("user@example.com"), "Email");
        assert_eq!(detect_uty("9876543210"), "Mobile");
    }
}
