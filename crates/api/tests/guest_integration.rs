//! Integration tests for the guest portal: magic-link authorization,
//! selections, dessert votes, feedback and the host summaries built on them.
//!
//! Prerequisites:
//! - Running PostgreSQL instance
//! - TEST_DATABASE_URL environment variable set

mod common;

use axum::http::{Method, StatusCode};
use axum::Router;
use common::{
    create_dinner, create_test_pool, get, get_with_auth, invite, json_request, json_with_auth,
    send, sign_in, test_config, unique_email, Host, InvitedGuest,
};
use dinner_host_api::app::create_app;
use serde_json::{json, Value};

async fn setup() -> (Router, Host) {
    let pool = create_test_pool().await;
    let email = unique_email();
    let app = create_app(test_config(&[&email]), pool);
    let host = sign_in(&app, &email, "Robin").await;
    (app, host)
}

async fn select(
    app: &Router,
    event_id: &str,
    guest: &InvitedGuest,
    main: Option<&str>,
    dessert: Option<&str>,
) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            &format!("/api/v1/guest/events/{}/selection", event_id),
            json!({
                "guest_id": guest.id,
                "token": guest.token,
                "selected_main_id": main,
                "selected_dessert_id": dessert,
            }),
        ),
    )
    .await
}

async fn summary(app: &Router, host: &Host, event_id: &str) -> Value {
    let (status, body) = send(
        app,
        get_with_auth(&format!("/api/v1/events/{}/summary", event_id), &host.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

fn counts(entries: &Value) -> Vec<u64> {
    entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["count"].as_u64().unwrap())
        .collect()
}

fn quantity(summary: &Value, ingredient: &str) -> Option<u64> {
    summary["shopping_list"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["ingredient"] == ingredient)
        .map(|item| item["quantity"].as_u64().unwrap())
}

#[tokio::test]
async fn test_link_without_token_is_invalid() {
    let (app, host) = setup().await;
    let dinner = create_dinner(&app, &host).await;

    let uri = format!("/api/v1/guest/events/{}", dinner.event_id);
    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_link");

    let (status, body) = send(
        &app,
        get(&format!("/api/v1/guest/events/{}/feedback?token=", dinner.event_id)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_link");
}

#[tokio::test]
async fn test_token_is_scoped_to_its_event() {
    let (app, host) = setup().await;
    let first = create_dinner(&app, &host).await;
    let second = create_dinner(&app, &host).await;
    let guest = invite(&app, &host, &first.event_id, &unique_email()).await;

    let (status, _) = send(
        &app,
        get(&format!("/api/v1/guest/events/{}?token={}", first.event_id, guest.token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Same token, other event
    let (status, _) = send(
        &app,
        get(&format!("/api/v1/guest/events/{}?token={}", second.event_id, guest.token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Tokens are case-sensitive
    let (status, _) = send(
        &app,
        get(&format!(
            "/api/v1/guest/events/{}?token={}",
            first.event_id,
            guest.token.to_uppercase()
        )),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nothing is written for a submission against the wrong event
    let dessert = second.desserts[0].as_str();
    let (status, _) = select(&app, &second.event_id, &guest, None, Some(dessert)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body = summary(&app, &host, &second.event_id).await;
    assert_eq!(counts(&body["dessert_votes"]), vec![0, 0]);
}

#[tokio::test]
async fn test_guest_menu_hides_recipes() {
    let (app, host) = setup().await;
    let dinner = create_dinner(&app, &host).await;
    let guest = invite(&app, &host, &dinner.event_id, &unique_email()).await;

    let (status, body) = send(
        &app,
        get(&format!("/api/v1/guest/events/{}?token={}", dinner.event_id, guest.token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["title"], "Harvest Supper");
    assert_eq!(body["guest"]["has_responded"], false);
    assert_eq!(body["menu"]["mains"].as_array().unwrap().len(), 2);
    assert!(body["menu"]["mains"][0].get("recipe").is_none());
    assert!(body["selected_main_id"].is_null());
}

#[tokio::test]
async fn test_selection_is_idempotent_and_feeds_summary() {
    let (app, host) = setup().await;
    let dinner = create_dinner(&app, &host).await;
    let g1 = invite(&app, &host, &dinner.event_id, &unique_email()).await;
    let g2 = invite(&app, &host, &dinner.event_id, &unique_email()).await;
    let g3 = invite(&app, &host, &dinner.event_id, &unique_email()).await;
    let (m0, m1) = (dinner.mains[0].as_str(), dinner.mains[1].as_str());
    let (d0, d1) = (dinner.desserts[0].as_str(), dinner.desserts[1].as_str());

    for _ in 0..2 {
        let (status, body) = select(&app, &dinner.event_id, &g1, Some(m0), Some(d0)).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["saved"], true);
    }
    select(&app, &dinner.event_id, &g2, Some(m1), Some(d0)).await;
    select(&app, &dinner.event_id, &g3, Some(m0), Some(d1)).await;

    let body = summary(&app, &host, &dinner.event_id).await;
    assert_eq!(body["total_guests"], 3);
    assert_eq!(body["responded_guests"], 3);
    assert_eq!(counts(&body["appetizers"]), vec![3]);
    assert_eq!(counts(&body["mains"]), vec![2, 1]);
    assert_eq!(counts(&body["dessert_votes"]), vec![2, 1]);
    assert_eq!(body["winning_dessert_id"], d0);

    // Appetizer (3) plus one lasagne
    assert_eq!(quantity(&body, "tomato"), Some(4));
    assert_eq!(quantity(&body, "rice"), Some(2));
    // Only the winning dessert is shopped for, for every guest
    assert_eq!(quantity(&body, "mascarpone"), Some(3));
    assert_eq!(quantity(&body, "cream"), None);

    let (_, menu) = send(
        &app,
        get(&format!("/api/v1/guest/events/{}?token={}", dinner.event_id, g1.token)),
    )
    .await;
    assert_eq!(menu["guest"]["has_responded"], true);
    assert_eq!(menu["selected_main_id"], m0);
    assert_eq!(menu["selected_dessert_id"], d0);
}

#[tokio::test]
async fn test_resubmission_replaces_and_retracts_vote() {
    let (app, host) = setup().await;
    let dinner = create_dinner(&app, &host).await;
    let guest = invite(&app, &host, &dinner.event_id, &unique_email()).await;
    let (m0, m1) = (dinner.mains[0].as_str(), dinner.mains[1].as_str());

    let dessert = dinner.desserts[1].as_str();
    select(&app, &dinner.event_id, &guest, Some(m0), Some(dessert)).await;
    let (status, _) = select(&app, &dinner.event_id, &guest, Some(m1), None).await;
    assert_eq!(status, StatusCode::OK);

    let body = summary(&app, &host, &dinner.event_id).await;
    assert_eq!(counts(&body["mains"]), vec![0, 1]);
    assert_eq!(counts(&body["dessert_votes"]), vec![0, 0]);
    // With no votes the first configured dessert is served
    assert_eq!(body["winning_dessert_id"], dinner.desserts[0]);
}

#[tokio::test]
async fn test_selection_rejects_dish_off_menu() {
    let (app, host) = setup().await;
    let dinner = create_dinner(&app, &host).await;
    let guest = invite(&app, &host, &dinner.event_id, &unique_email()).await;

    // A dessert offered as the main course
    let (status, body) =
        select(&app, &dinner.event_id, &guest, Some(dinner.desserts[0].as_str()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let body = summary(&app, &host, &dinner.event_id).await;
    assert_eq!(body["responded_guests"], 0);
}

#[tokio::test]
async fn test_closed_event_rejects_selection_but_accepts_feedback() {
    let (app, host) = setup().await;
    let dinner = create_dinner(&app, &host).await;
    let guest = invite(&app, &host, &dinner.event_id, &unique_email()).await;

    let (status, _) = send(
        &app,
        json_with_auth(
            Method::PUT,
            &format!("/api/v1/events/{}/status", dinner.event_id),
            json!({ "status": "closed" }),
            &host.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let main = dinner.mains[0].as_str();
    let (status, _) = select(&app, &dinner.event_id, &guest, Some(main), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/v1/guest/events/{}/feedback", dinner.event_id),
            json!({
                "guest_id": guest.id,
                "token": guest.token,
                "dish_feedback": [{ "dish_id": dinner.mains[0], "rating": "up" }],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_feedback_round_trip_and_host_table() {
    let (app, host) = setup().await;
    let dinner = create_dinner(&app, &host).await;
    let guest = invite(&app, &host, &dinner.event_id, &unique_email()).await;
    let silent = invite(&app, &host, &dinner.event_id, &unique_email()).await;
    let feedback_uri = format!("/api/v1/guest/events/{}/feedback", dinner.event_id);

    let submission = json!({
        "guest_id": guest.id,
        "token": guest.token,
        "dish_feedback": [
            { "dish_id": dinner.appetizer, "rating": "up", "comment": "  Crisp!  " },
            { "dish_id": dinner.mains[0], "rating": "down" },
            // Unrated rows are ignored
            { "dish_id": dinner.mains[1], "comment": "Did not try it" },
        ],
        "event_comment": "Lovely evening",
    });
    for _ in 0..2 {
        let (status, body) =
            send(&app, json_request(Method::POST, &feedback_uri, submission.clone())).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    let (status, view) = send(&app, get(&format!("{}?token={}", feedback_uri, guest.token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["guest"]["has_submitted_feedback"], true);
    assert_eq!(view["dish_feedback"].as_array().unwrap().len(), 2);
    assert_eq!(view["event_feedback"]["comment"], "Lovely evening");

    let (status, table) = send(
        &app,
        get_with_auth(
            &format!("/api/v1/events/{}/feedback", dinner.event_id),
            &host.token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(table["total_guests"], 2);
    assert_eq!(table["responded_guests"], 1);

    let appetizer = &table["dishes"][0];
    assert_eq!(appetizer["dish_id"], dinner.appetizer);
    assert_eq!(appetizer["ups"], 1);
    assert_eq!(appetizer["total"], 1);
    assert_eq!(table["dishes"][1]["downs"], 1);
    assert_eq!(table["dishes"][2]["total"], 0);

    let row = &table["guests"][0];
    assert_eq!(row["guest_id"], guest.id);
    assert_eq!(row["event_comment"], "Lovely evening");
    let comments: Vec<&Value> = row["dish_feedback"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| &f["comment"])
        .collect();
    assert!(comments.contains(&&json!("Crisp!")));

    // The guest who never answered is not in the table.
    assert!(table["guests"]
        .as_array()
        .unwrap()
        .iter()
        .all(|g| g["guest_id"] != silent.id.as_str()));
}

#[tokio::test]
async fn test_feedback_rejects_other_guests_token() {
    let (app, host) = setup().await;
    let dinner = create_dinner(&app, &host).await;
    let alice = invite(&app, &host, &dinner.event_id, &unique_email()).await;
    let bob = invite(&app, &host, &dinner.event_id, &unique_email()).await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/v1/guest/events/{}/feedback", dinner.event_id),
            json!({
                "guest_id": alice.id,
                "token": bob.token,
                "event_comment": "Impersonation",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
