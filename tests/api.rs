use std::sync::Arc;

use actix_web::{test, web::Data, App};
use serde_json::{json, Value};

use prometeo_backend::api::backend::LocalBackend;
use prometeo_backend::app::{configure_app, AppState};
use prometeo_backend::auth::User;
use prometeo_backend::store::incidents::IncidentStore;
use prometeo_backend::store::sessions::SessionStore;
use prometeo_backend::utils::fresh_id;

fn test_state(seed_demo: bool) -> Data<AppState> {
    let incidents = Arc::new(IncidentStore::new());
    if seed_demo {
        incidents.seed_demo();
    }
    let backend = Box::new(LocalBackend::new(incidents.clone()));
    let sessions = SessionStore::restore(
        std::env::temp_dir().join(format!("prometeo-it-{}.json", fresh_id())),
    );
    Data::new(AppState {
        incidents,
        sessions,
        backend,
    })
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(App::new().configure(configure_app).app_data($state)).await
    };
}

macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": $email, "password": $password }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["token"].as_str().expect("login token").to_string()
    }};
}

#[actix_web::test]
async fn created_incident_upvoted_twice_counts_once() {
    let app = test_app!(test_state(false));
    let token = login!(app, "citizen@prometeo.com", "user123");

    let req = test::TestRequest::post()
        .uri("/api/incidents")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "type": "Fire",
            "severity": "Critical",
            "description": "test"
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["status"], "Unverified");
    assert_eq!(created["upvotes"], 0);
    let id = created["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri(&format!("/api/incidents/{id}/upvote"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let voted: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(voted["upvotes"], 1);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/incidents/{id}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["upvotes"], 1);
    assert_eq!(fetched["upvotedBy"], json!(["cit-001"]));
}

#[actix_web::test]
async fn invalid_credentials_leave_no_session() {
    let app = test_app!(test_state(false));

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "citizen@prometeo.com", "password": "wrong" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 401);

    // No session means the gated report route stays closed.
    let req = test::TestRequest::post()
        .uri("/api/incidents")
        .set_json(json!({
            "type": "Other",
            "severity": "Low",
            "description": "should not land"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 401);
}

#[actix_web::test]
async fn responder_login_unlocks_the_dashboard() {
    let app = test_app!(test_state(true));
    let token = login!(app, "admin@prometeo.com", "admin123");

    let req = test::TestRequest::get()
        .uri("/api/stats")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["active"], 2);
    assert_eq!(stats["critical"], 1);
}

#[actix_web::test]
async fn citizen_is_denied_the_dashboard() {
    let app = test_app!(test_state(true));
    let token = login!(app, "citizen@prometeo.com", "user123");

    let req = test::TestRequest::get()
        .uri("/api/stats")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 401, "stats should be responder-only");

    let req = test::TestRequest::post()
        .uri("/api/incidents/demofire1/notes")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "content": "nope" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 401, "notes should be responder-only");
}

#[actix_web::test]
async fn feed_filters_are_conjunctive() {
    let app = test_app!(test_state(true));

    let req = test::TestRequest::get().uri("/api/incidents").to_request();
    let all: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let req = test::TestRequest::get()
        .uri("/api/incidents?type=Fire")
        .to_request();
    let fires: Value = test::call_and_read_body_json(&app, req).await;
    let fires = fires.as_array().unwrap();
    assert_eq!(fires.len(), 1);
    assert_eq!(fires[0]["type"], "Fire");

    let req = test::TestRequest::get()
        .uri("/api/incidents?type=Fire&severity=Low")
        .to_request();
    let none: Value = test::call_and_read_body_json(&app, req).await;
    assert!(none.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn responder_can_triage_and_annotate() {
    let app = test_app!(test_state(true));
    let token = login!(app, "admin@prometeo.com", "admin123");

    let req = test::TestRequest::put()
        .uri("/api/incidents/demomed01/status")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "status": "Verified" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/incidents/demomed01/notes")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "content": "Ambulance en route" }))
        .to_request();
    let note: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(note["content"], "Ambulance en route");
    assert_eq!(note["author"], "Chief Sarah Connor");

    let req = test::TestRequest::get()
        .uri("/api/incidents/demomed01")
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["status"], "Verified");
    assert_eq!(fetched["notes"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn mutating_an_unknown_id_is_not_found() {
    let app = test_app!(test_state(false));
    let token = login!(app, "admin@prometeo.com", "admin123");

    let req = test::TestRequest::put()
        .uri("/api/incidents/missing01/status")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "status": "Resolved" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 404);
}

#[actix_web::test]
async fn logout_revokes_the_token() {
    let app = test_app!(test_state(false));
    let token = login!(app, "citizen@prometeo.com", "user123");

    let req = test::TestRequest::get()
        .uri("/api/session")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let session: User = test::call_and_read_body_json(&app, req).await;
    assert_eq!(session.email, "citizen@prometeo.com");

    let req = test::TestRequest::post()
        .uri("/api/logout")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/session")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 401);
}

#[actix_web::test]
async fn uploaded_evidence_feeds_the_image_field() {
    let app = test_app!(test_state(false));
    let token = login!(app, "citizen@prometeo.com", "user123");

    let req = test::TestRequest::post()
        .uri("/api/evidence")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_payload(vec![0xffu8, 0xd8, 0xff, 0xe0])
        .to_request();
    let uploaded: Value = test::call_and_read_body_json(&app, req).await;
    let url = uploaded["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("local://incident-evidence/"));

    let req = test::TestRequest::post()
        .uri("/api/incidents")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "type": "Hazard",
            "severity": "Medium",
            "description": "Oil spill across both lanes",
            "imageUrl": url
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["imageUrl"], json!(url));
}

#[actix_web::test]
async fn empty_evidence_uploads_are_rejected() {
    let app = test_app!(test_state(false));
    let token = login!(app, "citizen@prometeo.com", "user123");

    let req = test::TestRequest::post()
        .uri("/api/evidence")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 400);
}

#[actix_web::test]
async fn empty_descriptions_are_rejected() {
    let app = test_app!(test_state(false));
    let token = login!(app, "citizen@prometeo.com", "user123");

    let req = test::TestRequest::post()
        .uri("/api/incidents")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "type": "Hazard",
            "severity": "Medium",
            "description": "   "
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 400);
}
