use serde::{Deserialize, Serialize};

use super::{ApiClient, FetchResult};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const VERIFY_OTP_PATH: &str = "/api/auth/verify-login-otp";

/// `email` also carries an employee ID; the server resolves either.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginReply {
    /// Required: a reply without it does not advance the sign-in
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Canonical email the OTP was sent to
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerifyOtpReply {
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl ApiClient {
    pub async fn login(&self, identifier: &str, password: &str) -> FetchResult {
        let body = LoginRequest {
            email: identifier,
            password,
        };
        self.post(LOGIN_PATH, None, &body).await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> FetchResult {
        self.post(VERIFY_OTP_PATH, None, &VerifyOtpRequest { email, otp }).await
    }

    /// There is no dedicated endpoint: a second login issues a fresh OTP.
    pub async fn resend_otp(&self, identifier: &str, password: &str) -> FetchResult {
        self.login(identifier, password).await
    }
}
