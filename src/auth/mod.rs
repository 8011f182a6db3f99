//! Two-step sign-in: password check, then OTP verification.
//!
//! [`AuthFlow`] starts in [`Stage::Login`]. Accepted credentials move it to
//! [`Stage::OtpPending`]; a verified OTP stores the issued token in the
//! [`SessionStore`] and yields [`FlowCommand::NavigateTo`] for the shell to
//! act on. Every other outcome leaves the stage unchanged and yields a
//! [`Notice`] to display.
//!
//! Only one request is in flight per flow. A call made while another is
//! pending fails with [`FlowError::Busy`] without touching the network.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::api::auth::{LoginReply, VerifyOtpReply};
use crate::api::{ApiClient, FetchResult};
use crate::error::ApiFailure;
use crate::session::{SessionError, SessionStore};
use crate::validation::FieldErrors;

pub const OTP_SENT: &str = "OTP sent to your email";
pub const OTP_RESENT: &str = "OTP resent to your email";
pub const LOGIN_FAILED: &str = "Login failed";
pub const OTP_FAILED: &str = "OTP verification failed";
pub const RESEND_FAILED: &str = "Failed to resend OTP";

/// Endpoints the flow drives.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, identifier: &str, password: &str) -> FetchResult;

    async fn verify_otp(&self, email: &str, otp: &str) -> FetchResult;

    async fn resend_otp(&self, identifier: &str, password: &str) -> FetchResult {
        self.login(identifier, password).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, identifier: &str, password: &str) -> FetchResult {
        ApiClient::login(self, identifier, password).await
    }

    async fn verify_otp(&self, email: &str, otp: &str) -> FetchResult {
        ApiClient::verify_otp(self, email, otp).await
    }

    async fn resend_otp(&self, identifier: &str, password: &str) -> FetchResult {
        ApiClient::resend_otp(self, identifier, password).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Login,
    OtpPending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// What the hosting shell should do after a flow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FlowCommand {
    Show(Notice),
    NavigateTo(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("a request is already in progress")]
    Busy,

    #[error("not allowed while {actual:?}; expected {expected:?}")]
    WrongStage { expected: Stage, actual: Stage },

    #[error("{0}")]
    Invalid(FieldErrors),

    #[error("failed to store session token: {0}")]
    Session(#[from] SessionError),
}

/// Credentials are kept only while an OTP is pending, for resend.
#[derive(Clone)]
struct Challenge {
    identifier: String,
    password: String,
    resolved_email: Option<String>,
}

impl Challenge {
    fn email(&self) -> &str {
        self.resolved_email.as_deref().unwrap_or(&self.identifier)
    }
}

enum State {
    Login,
    OtpPending(Challenge),
}

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, FlowError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(flag))
            .map_err(|_| FlowError::Busy)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct AuthFlow<A> {
    api: A,
    session: SessionStore,
    landing_path: String,
    state: Mutex<State>,
    busy: AtomicBool,
}

impl<A: AuthApi> AuthFlow<A> {
    pub fn new(api: A, session: SessionStore, landing_path: impl Into<String>) -> Self {
        Self {
            api,
            session,
            landing_path: landing_path.into(),
            state: Mutex::new(State::Login),
            busy: AtomicBool::new(false),
        }
    }

    pub fn stage(&self) -> Stage {
        match &*self.lock_state() {
            State::Login => Stage::Login,
            State::OtpPending(_) => Stage::OtpPending,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Address the OTP will be verified against, once one is pending.
    pub fn otp_email(&self) -> Option<String> {
        match &*self.lock_state() {
            State::OtpPending(challenge) => Some(challenge.email().to_string()),
            State::Login => None,
        }
    }

    /// Abandon a pending OTP and return to the login stage.
    pub fn reset(&self) {
        *self.lock_state() = State::Login;
    }

    pub async fn submit_credentials(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<FlowCommand, FlowError> {
        let mut errors = FieldErrors::new();
        errors.require("identifier", Some(identifier), "Email or Employee ID is required");
        errors.require("password", Some(password), "Password is required");
        errors.into_result().map_err(FlowError::Invalid)?;

        let _busy = BusyGuard::acquire(&self.busy)?;
        self.expect_stage(Stage::Login)?;

        let identifier = identifier.trim();
        let result = self.api.login(identifier, password).await;

        match result.outcome::<LoginReply>() {
            Ok(reply) if reply.status => {
                tracing::info!(identifier, "credentials accepted, OTP issued");
                *self.lock_state() = State::OtpPending(Challenge {
                    identifier: identifier.to_string(),
                    password: password.to_string(),
                    resolved_email: reply.email.filter(|e| !e.is_empty()),
                });
                let message = non_empty(reply.message).unwrap_or_else(|| OTP_SENT.to_string());
                Ok(FlowCommand::Show(Notice::Info(message)))
            }
            outcome => {
                let failure = unconfirmed(outcome);
                tracing::warn!(identifier, %failure, "login failed");
                Ok(FlowCommand::Show(Notice::Error(failure.user_message(LOGIN_FAILED))))
            }
        }
    }

    pub async fn submit_otp(&self, otp: &str) -> Result<FlowCommand, FlowError> {
        let mut errors = FieldErrors::new();
        errors.require("otp", Some(otp), "OTP is required");
        errors.into_result().map_err(FlowError::Invalid)?;

        let _busy = BusyGuard::acquire(&self.busy)?;
        let challenge = self.pending_challenge()?;

        let result = self.api.verify_otp(challenge.email(), otp.trim()).await;

        match result.outcome::<VerifyOtpReply>() {
            Ok(reply) if reply.status => {
                match non_empty(reply.token) {
                    Some(token) => self.session.set_token(Some(token))?,
                    None => tracing::warn!("OTP verified but no token was issued"),
                }
                *self.lock_state() = State::Login;
                tracing::info!(email = challenge.email(), "signed in");
                Ok(FlowCommand::NavigateTo(self.landing_path.clone()))
            }
            outcome => {
                let failure = unconfirmed(outcome);
                tracing::warn!(email = challenge.email(), %failure, "OTP verification failed");
                Ok(FlowCommand::Show(Notice::Error(failure.user_message(OTP_FAILED))))
            }
        }
    }

    pub async fn resend(&self) -> Result<FlowCommand, FlowError> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        let challenge = self.pending_challenge()?;

        let result = self
            .api
            .resend_otp(&challenge.identifier, &challenge.password)
            .await;

        match result.outcome::<LoginReply>() {
            Ok(reply) if reply.status => {
                if let Some(email) = reply.email.filter(|e| !e.is_empty()) {
                    if let State::OtpPending(current) = &mut *self.lock_state() {
                        current.resolved_email = Some(email);
                    }
                }
                Ok(FlowCommand::Show(Notice::Info(OTP_RESENT.to_string())))
            }
            outcome => {
                let failure = unconfirmed(outcome);
                tracing::warn!(identifier = %challenge.identifier, %failure, "OTP resend failed");
                Ok(FlowCommand::Show(Notice::Error(failure.user_message(RESEND_FAILED))))
            }
        }
    }

    fn expect_stage(&self, expected: Stage) -> Result<(), FlowError> {
        let actual = self.stage();
        if actual == expected {
            Ok(())
        } else {
            Err(FlowError::WrongStage { expected, actual })
        }
    }

    fn pending_challenge(&self) -> Result<Challenge, FlowError> {
        match &*self.lock_state() {
            State::OtpPending(challenge) => Ok(challenge.clone()),
            State::Login => Err(FlowError::WrongStage {
                expected: Stage::OtpPending,
                actual: Stage::Login,
            }),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        // State updates never panic midway, so a poisoned lock still holds
        // a consistent value.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Sign-in steps advance only on an explicit `status: true`; anything else
/// that got past classification is a rejection without a message.
fn unconfirmed<T>(outcome: Result<T, ApiFailure>) -> ApiFailure {
    match outcome {
        Err(failure) => failure,
        Ok(_) => ApiFailure::rejected(None),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
