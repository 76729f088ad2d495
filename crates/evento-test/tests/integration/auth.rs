#![allow(clippy::expect_used)]
//! Registration, login, logout and session handling.

use salvo::http::StatusCode;
use serde_json::json;

use evento_core::constants::{ATTENDEES_GROUP, ORGANIZERS_GROUP};
use evento_db::db::store::AccountStore;

use super::helpers::*;

fn registration(username: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "first_name": "Dana",
        "last_name": "Scully",
        "password": PASSWORD,
        "password2": PASSWORD,
    })
}

#[test_log::test(tokio::test)]
async fn registration_joins_attendees_and_allows_login() {
    let app = TestApp::new().await;

    let _ = TestRequest::post("/register")
        .json(&registration("dana"))
        .send(&app.service)
        .await
        .assert_redirect("/login");

    let user = app
        .store
        .find_user_by_username("dana")
        .await
        .expect("lookup")
        .expect("registered");
    assert!(!user.is_staff);
    assert!(!user.is_superuser);
    assert_eq!(
        app.store.groups_for_user(user.id).await.expect("groups"),
        [ATTENDEES_GROUP]
    );

    let cookie = app.login("dana").await;
    let whoami = TestRequest::get("/app/whoami")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(whoami["username"], "dana");
    assert_eq!(whoami["permissions"], json!([]));
}

#[test_log::test(tokio::test)]
async fn registration_reports_field_errors() {
    let app = TestApp::new().await;
    app.user("taken", &[]).await;

    let mut mismatched = registration("newcomer");
    mismatched["password2"] = json!("something else");
    mismatched["email"] = json!("not-an-email");
    let body = TestRequest::post("/register")
        .json(&mismatched)
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert!(body["errors"]["password2"].is_array());
    assert!(body["errors"]["email"].is_array());

    let body = TestRequest::post("/register")
        .json(&registration("taken"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert!(body["errors"]["username"].is_array());

    assert!(
        app.store
            .find_user_by_username("newcomer")
            .await
            .expect("lookup")
            .is_none()
    );
}

#[test_log::test(tokio::test)]
async fn bad_credentials_are_a_form_error() {
    let app = TestApp::new().await;
    app.user("erin", &[]).await;

    for (username, password) in [("erin", "wrong password"), ("nobody", PASSWORD)] {
        let body = TestRequest::post("/login")
            .json(&json!({ "username": username, "password": password }))
            .send(&app.service)
            .await
            .assert_status(StatusCode::BAD_REQUEST)
            .json();
        assert_eq!(
            body["errors"]["__all__"][0],
            "Incorrect username or password."
        );
    }
    assert_eq!(app.store.session_count(), 0);
}

#[test_log::test(tokio::test)]
async fn login_returns_to_a_local_next_only() {
    let app = TestApp::new().await;
    app.user("frank", &[]).await;
    let credentials = json!({ "username": "frank", "password": PASSWORD });

    let cases = [
        ("/login?next=%2Fevents%2Fabc", "/events/abc"),
        ("/login?next=%2F%2Fevil.example", "/"),
        ("/login?next=https%3A%2F%2Fevil.example%2F", "/"),
        ("/login?next=%2F%09%2Fevil.example", "/"),
        ("/login?next=%2F%0A%2Fevil.example", "/"),
        ("/login", "/"),
    ];
    for (path, expected) in cases {
        let _ = TestRequest::post(path)
            .json(&credentials)
            .send(&app.service)
            .await
            .assert_redirect(expected);
    }

    let form = TestRequest::get("/login?next=%2Fdashboard")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(form["next"], "/dashboard");
}

#[test_log::test(tokio::test)]
async fn logout_ends_the_session() {
    let app = TestApp::new().await;
    app.user("gina", &[]).await;
    let cookie = app.login("gina").await;
    assert_eq!(app.store.session_count(), 1);

    let _ = TestRequest::post("/logout")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_redirect("/login");
    assert_eq!(app.store.session_count(), 0);

    let _ = TestRequest::get("/")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_redirect("/login?next=%2F");
}

#[test_log::test(tokio::test)]
async fn expired_sessions_and_inactive_users_are_anonymous() {
    let app = TestApp::new().await;
    let hank = app.user("hank", &[]).await;
    let ivy = app.user("ivy", &[]).await;

    let hank_cookie = app.login("hank").await;
    app.store.expire_sessions(hank.id);
    let whoami = TestRequest::get("/app/whoami")
        .session(&hank_cookie)
        .send(&app.service)
        .await
        .json();
    assert_eq!(whoami["status"], "anonymous");

    let ivy_cookie = app.login("ivy").await;
    app.store.deactivate(ivy.id);
    let _ = TestRequest::get("/dashboard")
        .session(&ivy_cookie)
        .send(&app.service)
        .await
        .assert_redirect("/login?next=%2Fdashboard");

    let _ = TestRequest::get("/app/whoami")
        .session("evento_session=forged-token")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn logging_in_sweeps_expired_sessions() {
    let app = TestApp::new().await;
    let kate = app.user("kate", &[]).await;
    app.user("liam", &[]).await;

    app.login("kate").await;
    app.login("kate").await;
    app.store.expire_sessions(kate.id);
    assert_eq!(app.store.session_count(), 2);

    app.login("liam").await;
    assert_eq!(app.store.session_count(), 1);
}

#[test_log::test(tokio::test)]
async fn overflowing_session_lifetime_fails_the_login_cleanly() {
    let mut settings = test_config();
    settings.auth.session_ttl_hours = u32::MAX;
    let app = TestApp::with_settings(settings).await;
    app.user("max", &[]).await;

    let _ = TestRequest::post("/login")
        .json(&json!({ "username": "max", "password": PASSWORD }))
        .send(&app.service)
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.store.session_count(), 0);
}

#[test_log::test(tokio::test)]
async fn group_grants_show_up_as_permissions() {
    let app = TestApp::new().await;
    app.user("jules", &[ORGANIZERS_GROUP]).await;
    let cookie = app.login("jules").await;

    let whoami = TestRequest::get("/app/whoami")
        .session(&cookie)
        .send(&app.service)
        .await
        .json();
    assert_eq!(whoami["permissions"], json!(["events.organize"]));
}

#[test_log::test(tokio::test)]
async fn access_denied_page_explains_the_reason() {
    let app = TestApp::new().await;

    let body = TestRequest::get("/access-denied?reason=delete")
        .send(&app.service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .json();
    assert_eq!(body["action"], "delete");
    assert_eq!(body["message"], "Only administrators can delete events.");

    let body = TestRequest::get("/access-denied?reason=bogus")
        .send(&app.service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .json();
    assert_eq!(body["action"], serde_json::Value::Null);
}

#[test_log::test(tokio::test)]
async fn healthcheck_needs_no_session() {
    let app = TestApp::new().await;
    let response = TestRequest::get("/app/healthcheck")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.body_string(), "OK");
}
