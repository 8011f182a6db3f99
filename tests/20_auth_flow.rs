mod common;

use anyhow::Result;
use axum::http::Method;
use serde_json::json;

use org_console::auth::{FlowCommand, Notice, Stage, LOGIN_FAILED, OTP_FAILED, OTP_SENT};
use org_console::session::SessionStore;

const LOGIN: &str = "/api/auth/login";
const VERIFY: &str = "/api/auth/verify-login-otp";

#[tokio::test]
async fn login_then_otp_stores_token_and_navigates() -> Result<()> {
    let mock = common::MockApi::start().await?;
    mock.on(Method::POST, LOGIN, 200, json!({"status": true, "email": "a@b.com"}));
    mock.on(Method::POST, VERIFY, 200, json!({"status": true, "token": "JWT1"}));

    let console = mock.console(None);
    let flow = console.auth_flow();

    let shown = flow.submit_credentials("EMP123", "pw").await?;
    assert_eq!(shown, FlowCommand::Show(Notice::Info(OTP_SENT.to_string())));
    assert_eq!(flow.stage(), Stage::OtpPending);

    let next = flow.submit_otp("123456").await?;
    assert_eq!(next, FlowCommand::NavigateTo("/authenticated/dashboard".to_string()));
    assert_eq!(console.session().token().as_deref(), Some("JWT1"));
    assert_eq!(flow.stage(), Stage::Login);

    let login = &mock.requests_to(Method::POST, LOGIN)[0];
    assert_eq!(login.body, json!({"email": "EMP123", "password": "pw"}));
    assert_eq!(login.authorization, None);

    // The OTP is verified against the resolved email, not the employee id
    let verify = &mock.requests_to(Method::POST, VERIFY)[0];
    assert_eq!(verify.body, json!({"email": "a@b.com", "otp": "123456"}));
    Ok(())
}

#[tokio::test]
async fn rejected_otp_keeps_otp_stage_and_shows_server_message() -> Result<()> {
    let mock = common::MockApi::start().await?;
    mock.on(Method::POST, LOGIN, 200, json!({"status": true}));
    mock.on(Method::POST, VERIFY, 200, json!({"status": false, "message": "Invalid OTP"}));

    let console = mock.console(None);
    let flow = console.auth_flow();
    flow.submit_credentials("a@b.com", "pw").await?;

    let shown = flow.submit_otp("000000").await?;
    assert_eq!(shown, FlowCommand::Show(Notice::Error("Invalid OTP".to_string())));
    assert_eq!(flow.stage(), Stage::OtpPending);
    assert!(!console.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn failed_login_stays_on_login_stage() -> Result<()> {
    let mock = common::MockApi::start().await?;
    mock.on(Method::POST, LOGIN, 401, json!({"message": "Invalid credentials"}));

    let flow = mock.console(None).auth_flow();
    let shown = flow.submit_credentials("a@b.com", "wrong").await?;

    assert_eq!(shown, FlowCommand::Show(Notice::Error("Invalid credentials".to_string())));
    assert_eq!(flow.stage(), Stage::Login);
    assert!(mock.requests_to(Method::POST, VERIFY).is_empty());
    Ok(())
}

#[tokio::test]
async fn resend_repeats_the_login_call() -> Result<()> {
    let mock = common::MockApi::start().await?;
    mock.on(Method::POST, LOGIN, 200, json!({"status": true}));

    let flow = mock.console(None).auth_flow();
    flow.submit_credentials("a@b.com", "pw").await?;
    let shown = flow.resend().await?;

    assert!(matches!(shown, FlowCommand::Show(Notice::Info(_))));
    assert_eq!(flow.stage(), Stage::OtpPending);

    let logins = mock.requests_to(Method::POST, LOGIN);
    assert_eq!(logins.len(), 2);
    assert_eq!(logins[1].body, logins[0].body);
    Ok(())
}

#[tokio::test]
async fn token_change_is_visible_to_subscribers() -> Result<()> {
    let mock = common::MockApi::start().await?;
    mock.on(Method::POST, LOGIN, 200, json!({"status": true}));
    mock.on(Method::POST, VERIFY, 200, json!({"status": true, "token": "JWT2"}));

    let session = SessionStore::in_memory();
    let mut tokens = session.subscribe();
    let console = org_console::console::Console::new(
        mock.client(),
        session,
        org_console::guard::RouteGuard::default(),
    );

    let flow = console.auth_flow();
    flow.submit_credentials("a@b.com", "pw").await?;
    flow.submit_otp("111111").await?;

    tokens.changed().await?;
    assert_eq!(tokens.borrow().as_deref(), Some("JWT2"));
    assert_eq!(console.enter("/authenticated/role"), Ok("JWT2".to_string()));
    Ok(())
}

#[tokio::test]
async fn html_login_reply_does_not_reach_otp_stage() -> Result<()> {
    let mock = common::MockApi::start().await?;
    mock.on_text(Method::POST, LOGIN, 200, "<html>captive portal</html>");

    let flow = mock.console(None).auth_flow();
    let shown = flow.submit_credentials("a@b.com", "pw").await?;

    assert_eq!(shown, FlowCommand::Show(Notice::Error(LOGIN_FAILED.to_string())));
    assert_eq!(flow.stage(), Stage::Login);
    Ok(())
}

#[tokio::test]
async fn verify_reply_without_status_does_not_sign_in() -> Result<()> {
    let mock = common::MockApi::start().await?;
    mock.on(Method::POST, LOGIN, 200, json!({"status": true}));
    mock.on(Method::POST, VERIFY, 200, json!({}));

    let console = mock.console(None);
    let flow = console.auth_flow();
    flow.submit_credentials("a@b.com", "pw").await?;

    let shown = flow.submit_otp("123456").await?;
    assert_eq!(shown, FlowCommand::Show(Notice::Error(OTP_FAILED.to_string())));
    assert_eq!(flow.stage(), Stage::OtpPending);
    assert!(!console.session().is_authenticated());
    Ok(())
}
