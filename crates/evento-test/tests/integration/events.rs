#![allow(clippy::expect_used)]
//! Event pages: listing scope, detail, create, edit and delete.

use salvo::http::StatusCode;
use serde_json::json;

use evento_core::constants::{MANAGERS_GROUP, ORGANIZERS_GROUP};
use evento_db::db::store::EventStore;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn organizer_attendee_and_stranger_walkthrough() {
    let app = TestApp::new().await;
    let alice = app.user("alice", &[ORGANIZERS_GROUP]).await;
    let bob = app.user("bob", &[]).await;
    let _carol = app.user("carol", &[]).await;
    let root = app.superuser("root").await;

    let alice_cookie = app.login("alice").await;
    let bob_cookie = app.login("bob").await;
    let carol_cookie = app.login("carol").await;
    let root_cookie = app.login("root").await;

    let _ = TestRequest::post("/events")
        .session(&alice_cookie)
        .json(&event_form("Private Gig", true, &[&bob]))
        .send(&app.service)
        .await
        .assert_redirect("/");

    let events = app.store.list_all().await.expect("list");
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event.organizer_id, alice.id);
    assert!(event.attendees.contains(&bob.id));
    let path = format!("/events/{}", event.id());

    // The attendee sees it, the stranger does not.
    let detail = TestRequest::get(&path)
        .session(&bob_cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(detail["title"], "Private Gig");

    let _ = TestRequest::get(&path)
        .session(&carol_cookie)
        .send(&app.service)
        .await
        .assert_denied("view");

    let listing = TestRequest::get("/")
        .session(&carol_cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(listed_titles(&listing).is_empty());

    // Only the organizer edits; nobody but an administrator deletes.
    let _ = TestRequest::get(&format!("{path}/edit"))
        .session(&alice_cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    let _ = TestRequest::post(&format!("{path}/edit"))
        .session(&bob_cookie)
        .json(&event_form("Hijacked", false, &[]))
        .send(&app.service)
        .await
        .assert_denied("edit");

    let _ = TestRequest::post(&format!("{path}/delete"))
        .session(&alice_cookie)
        .send(&app.service)
        .await
        .assert_denied("delete");

    let _ = TestRequest::get(&format!("{path}/delete"))
        .session(&root_cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    let _ = TestRequest::post(&format!("{path}/delete"))
        .session(&root_cookie)
        .send(&app.service)
        .await
        .assert_redirect("/");

    assert!(app.store.list_all().await.expect("list").is_empty());
    assert_ne!(root.id, alice.id);
}

#[test_log::test(tokio::test)]
async fn organizer_cannot_be_spoofed() {
    let app = TestApp::new().await;
    let alice = app.user("alice", &[ORGANIZERS_GROUP]).await;
    let mallory = app.user("mallory", &[]).await;
    let cookie = app.login("alice").await;

    let mut form = event_form("Launch Party", false, &[]);
    form["organizer"] = json!(mallory.id.to_string());
    form["organizer_id"] = json!(mallory.id.to_string());

    let _ = TestRequest::post("/events")
        .session(&cookie)
        .json(&form)
        .send(&app.service)
        .await
        .assert_redirect("/");

    let event = app.store.list_all().await.expect("list").remove(0);
    assert_eq!(event.event.organizer_id, alice.id);

    let mut edit = event_form("Launch Party, updated", false, &[]);
    edit["organizer"] = json!(mallory.id.to_string());
    let _ = TestRequest::post(&format!("/events/{}/edit", event.id()))
        .session(&cookie)
        .json(&edit)
        .send(&app.service)
        .await
        .assert_redirect("/");

    let stored = app
        .store
        .find_by_id(event.id())
        .await
        .expect("find")
        .expect("still there");
    assert_eq!(stored.event.title, "Launch Party, updated");
    assert_eq!(stored.event.organizer_id, alice.id);
}

#[test_log::test(tokio::test)]
async fn listing_covers_public_own_and_attended_events() {
    let app = TestApp::new().await;
    let viewer = app.user("viewer", &[]).await;
    let other = app.user("other", &[ORGANIZERS_GROUP]).await;
    let _manager = app.user("manager", &[MANAGERS_GROUP]).await;

    app.seed_event("Public Talk", &other, false, &[]).await;
    app.seed_event("Secret Meeting", &other, true, &[]).await;
    app.seed_event("Invited Dinner", &other, true, &[&viewer]).await;
    app.seed_event("My Own Private", &viewer, true, &[]).await;

    let viewer_cookie = app.login("viewer").await;
    let mut titles = listed_titles(
        &TestRequest::get("/")
            .session(&viewer_cookie)
            .send(&app.service)
            .await
            .assert_status(StatusCode::OK)
            .json(),
    );
    titles.sort();
    assert_eq!(titles, ["Invited Dinner", "My Own Private", "Public Talk"]);

    let manager_cookie = app.login("manager").await;
    let listing = TestRequest::get("/")
        .session(&manager_cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listing["total"], 4);
}

#[test_log::test(tokio::test)]
async fn listing_is_paged() {
    let app = TestApp::new().await;
    let owner = app.user("owner", &[]).await;
    for n in 0..12 {
        app.seed_event(&format!("Show {n}"), &owner, false, &[]).await;
    }
    let cookie = app.login("owner").await;

    let second = TestRequest::get("/?page=2")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed_titles(&second).len(), 2);
    assert_eq!(second["num_pages"], 2);
    assert_eq!(second["has_previous"], true);
    assert_eq!(second["has_next"], false);

    for page in ["3", "0", "abc"] {
        let _ = TestRequest::get(&format!("/?page={page}"))
            .session(&cookie)
            .send(&app.service)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

#[test_log::test(tokio::test)]
async fn anonymous_requests_go_to_login_with_next() {
    let app = TestApp::new().await;
    let owner = app.user("owner", &[]).await;
    let event = app.seed_event("Open Air", &owner, false, &[]).await;

    let _ = TestRequest::get("/")
        .send(&app.service)
        .await
        .assert_redirect("/login?next=%2F");

    let _ = TestRequest::get(&format!("/events/{}/edit", event.id()))
        .send(&app.service)
        .await
        .assert_redirect(&format!("/login?next=%2Fevents%2F{}%2Fedit", event.id()));
}

#[test_log::test(tokio::test)]
async fn create_requires_the_organize_permission_before_validation() {
    let app = TestApp::new().await;
    app.user("plain", &[]).await;
    app.user("organizer", &[ORGANIZERS_GROUP]).await;

    let plain = app.login("plain").await;
    let _ = TestRequest::post("/events")
        .session(&plain)
        .json(&json!({}))
        .send(&app.service)
        .await
        .assert_denied("create");

    let organizer = app.login("organizer").await;
    let errors = TestRequest::post("/events")
        .session(&organizer)
        .json(&json!({ "category": "party" }))
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(errors["error"], "validation");
    for field in ["title", "category", "scheduled_at", "location"] {
        assert!(
            errors["errors"][field].is_array(),
            "expected an error for {field}: {errors}"
        );
    }
    assert!(app.store.list_all().await.expect("list").is_empty());
}

#[test_log::test(tokio::test)]
async fn unknown_attendees_are_a_field_error() {
    let app = TestApp::new().await;
    app.user("organizer", &[ORGANIZERS_GROUP]).await;
    let cookie = app.login("organizer").await;

    let mut form = event_form("Ghost Party", false, &[]);
    form["attendees"] = json!([uuid::Uuid::now_v7().to_string()]);

    let errors = TestRequest::post("/events")
        .session(&cookie)
        .json(&form)
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert!(errors["errors"]["attendees"].is_array());
}

#[test_log::test(tokio::test)]
async fn missing_events_look_denied_unless_configured_otherwise() {
    let missing = format!("/events/{}", uuid::Uuid::now_v7());

    let app = TestApp::new().await;
    app.user("viewer", &[]).await;
    let cookie = app.login("viewer").await;
    let _ = TestRequest::get(&missing)
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_denied("view");

    let mut settings = test_config();
    settings.app.conceal_missing_events = false;
    let app = TestApp::with_settings(settings).await;
    app.user("viewer", &[]).await;
    let cookie = app.login("viewer").await;
    let _ = TestRequest::get(&missing)
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let _ = TestRequest::get("/events/not-a-uuid")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn dashboard_splits_organized_and_attending() {
    let app = TestApp::new().await;
    let alice = app.user("alice", &[ORGANIZERS_GROUP]).await;
    let bob = app.user("bob", &[]).await;
    app.seed_event("Alice Hosts", &alice, true, &[&bob]).await;
    app.seed_event("Someone Else", &bob, false, &[]).await;

    let cookie = app.login("alice").await;
    let dashboard = TestRequest::get("/dashboard")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(dashboard["is_organizer"], true);
    assert_eq!(dashboard["is_admin"], false);
    assert_eq!(dashboard["organized"].as_array().map(Vec::len), Some(1));
    assert_eq!(dashboard["attending"].as_array().map(Vec::len), Some(0));

    let cookie = app.login("bob").await;
    let dashboard = TestRequest::get("/dashboard")
        .session(&cookie)
        .send(&app.service)
        .await
        .json();
    assert_eq!(dashboard["attending"][0]["title"], "Alice Hosts");
}
