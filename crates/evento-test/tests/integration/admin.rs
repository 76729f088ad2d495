#![allow(clippy::expect_used)]
//! The admin panel: scoped listing, filters, changes and role management.

use salvo::http::StatusCode;
use serde_json::json;

use evento_core::constants::{MANAGERS_GROUP, ORGANIZERS_GROUP};
use evento_db::db::store::{AccountStore, EventStore};

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn panel_requires_staff_status() {
    let app = TestApp::new().await;
    app.user("organizer", &[ORGANIZERS_GROUP]).await;
    let cookie = app.login("organizer").await;

    let _ = TestRequest::get("/admin/events")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_denied("admin");

    let _ = TestRequest::get("/admin/events")
        .send(&app.service)
        .await
        .assert_redirect("/login?next=%2Fadmin%2Fevents");
}

#[test_log::test(tokio::test)]
async fn staff_organizers_see_only_their_own_events() {
    let app = TestApp::new().await;
    let kim = app.staff("kim", &[ORGANIZERS_GROUP]).await;
    let lee = app.user("lee", &[ORGANIZERS_GROUP]).await;
    app.seed_event("Kim's Recital", &kim, false, &[]).await;
    let foreign = app.seed_event("Lee's Festival", &lee, false, &[]).await;

    let cookie = app.login("kim").await;
    let listing = TestRequest::get("/admin/events")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed_titles(&listing), ["Kim's Recital"]);

    // Outside the admin scope an event is reported as missing.
    let _ = TestRequest::get(&format!("/admin/events/{}", foreign.id()))
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_denied("view");

    let _ = TestRequest::delete(&format!("/admin/events/{}", foreign.id()))
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_denied("view");
    assert!(
        app.store
            .find_by_id(foreign.id())
            .await
            .expect("find")
            .is_some()
    );
}

#[test_log::test(tokio::test)]
async fn staff_without_grants_see_nothing() {
    let app = TestApp::new().await;
    let owner = app.user("owner", &[]).await;
    app.seed_event("Anything", &owner, false, &[]).await;
    app.staff("clerk", &[]).await;

    let cookie = app.login("clerk").await;
    let listing = TestRequest::get("/admin/events")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listing["total"], 0);
}

#[test_log::test(tokio::test)]
async fn managers_filter_across_all_events() {
    let app = TestApp::new().await;
    let owner = app.user("owner", &[ORGANIZERS_GROUP]).await;
    app.staff("mona", &[MANAGERS_GROUP]).await;

    app.seed_event("Jazz Night", &owner, false, &[]).await;
    app.seed_event("Closed Board Meeting", &owner, true, &[]).await;

    let cookie = app.login("mona").await;
    let all = TestRequest::get("/admin/events")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(all["total"], 2);

    let cases = [
        ("is_private=true", vec!["Closed Board Meeting"]),
        ("q=JAZZ", vec!["Jazz Night"]),
        ("category=concert&year=2025&month=3", vec!["Jazz Night", "Closed Board Meeting"]),
        ("year=2024", vec![]),
    ];
    for (query, expected) in cases {
        let mut titles = listed_titles(
            &TestRequest::get(&format!("/admin/events?{query}"))
                .session(&cookie)
                .send(&app.service)
                .await
                .assert_status(StatusCode::OK)
                .json(),
        );
        titles.sort();
        let mut expected = expected;
        expected.sort_unstable();
        assert_eq!(titles, expected, "filter {query}");
    }

    let _ = TestRequest::get("/admin/events?category=party")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let _ = TestRequest::get("/admin/events?q=jazz&page=1")
        .session(&cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
    for page in ["0", "abc", "2", "-1"] {
        let _ = TestRequest::get(&format!("/admin/events?page={page}"))
            .session(&cookie)
            .send(&app.service)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

#[test_log::test(tokio::test)]
async fn admin_changes_follow_the_policy() {
    let app = TestApp::new().await;
    let nina = app.staff("nina", &[ORGANIZERS_GROUP]).await;
    app.staff("otto", &[MANAGERS_GROUP]).await;

    let nina_cookie = app.login("nina").await;
    let created = TestRequest::post("/admin/events")
        .session(&nina_cookie)
        .json(&event_form("Poetry Slam", false, &[]))
        .send(&app.service)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(created["organizer_id"], nina.id.to_string());
    let path = format!(
        "/admin/events/{}",
        created["id"].as_str().expect("id in body")
    );

    let updated = TestRequest::post(&path)
        .session(&nina_cookie)
        .json(&event_form("Poetry Slam, Round Two", false, &[]))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(updated["title"], "Poetry Slam, Round Two");

    let _ = TestRequest::delete(&path)
        .session(&nina_cookie)
        .send(&app.service)
        .await
        .assert_denied("delete");

    let otto_cookie = app.login("otto").await;
    let _ = TestRequest::post("/admin/events")
        .session(&otto_cookie)
        .json(&event_form("Manager Event", false, &[]))
        .send(&app.service)
        .await
        .assert_denied("create");

    let _ = TestRequest::delete(&path)
        .session(&otto_cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert!(app.store.list_all().await.expect("list").is_empty());
}

#[test_log::test(tokio::test)]
async fn superusers_manage_groups_and_staff() {
    let app = TestApp::new().await;
    app.superuser("root").await;
    let pat = app.user("pat", &[]).await;
    app.staff("quinn", &[MANAGERS_GROUP]).await;

    let root = app.login("root").await;
    let groups_path = format!("/admin/users/{}/groups/{ORGANIZERS_GROUP}", pat.id);
    let staff_path = format!("/admin/users/{}/staff", pat.id);

    let _ = TestRequest::put(&groups_path)
        .session(&root)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let pat_cookie = app.login("pat").await;
    let whoami = TestRequest::get("/app/whoami")
        .session(&pat_cookie)
        .send(&app.service)
        .await
        .json();
    assert_eq!(whoami["permissions"], json!(["events.organize"]));

    let user = TestRequest::put(&staff_path)
        .session(&root)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(user["is_staff"], true);
    let _ = TestRequest::get("/admin/events")
        .session(&pat_cookie)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    let removed = TestRequest::delete(&groups_path)
        .session(&root)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(removed["removed"], true);
    let removed = TestRequest::delete(&groups_path)
        .session(&root)
        .send(&app.service)
        .await
        .json();
    assert_eq!(removed["removed"], false);

    let _ = TestRequest::delete(&staff_path)
        .session(&root)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
    let stored = app
        .store
        .find_user_by_id(pat.id)
        .await
        .expect("lookup")
        .expect("exists");
    assert!(!stored.is_staff);

    // Managing events does not extend to managing accounts.
    let quinn = app.login("quinn").await;
    let _ = TestRequest::put(&groups_path)
        .session(&quinn)
        .send(&app.service)
        .await
        .assert_denied("manage-accounts");

    let _ = TestRequest::put(&format!("/admin/users/{}/groups/bad%20name", pat.id))
        .session(&root)
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let _ = TestRequest::put(&format!("/admin/users/{}/staff", uuid::Uuid::now_v7()))
        .session(&root)
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
