//! HTTP-level tests against the in-memory repository.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, SecondsFormat, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use travel_pricing::pricing::PolicyBook;
use travel_pricing::{build_router, AppState};

fn app() -> Router {
    build_router(AppState::in_memory(PolicyBook::default()))
}

fn rfc3339(hours_from_now: i64) -> String {
    (Utc::now() + Duration::hours(hours_from_now)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn car_item(hours_ahead: i64, days: i64, rate: &str, drivers: u32) -> Value {
    json!({
        "listing_id": "car-economy-1",
        "start_at": rfc3339(hours_ahead),
        "end_at": rfc3339(hours_ahead + days * 24),
        "unit_rate": rate,
        "traveler_count": drivers,
    })
}

/// Money fields are serialized as strings; compare them numerically
fn money(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    caller: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, tier)) = caller {
        builder = builder.header("X-Caller-Id", id).header("X-Caller-Tier", tier);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

const ALICE: Option<(&str, &str)> = Some(("alice", "individual"));
const ACME: Option<(&str, &str)> = Some(("acme", "corporate"));

#[tokio::test]
async fn health_check_works() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn individual_car_quote_matches_example() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/car/user/quote",
        ALICE,
        Some(car_item(72, 3, "50", 1)),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["tier"], "individual");
    assert_eq!(money(&body["pricing"]["base_price"]), dec!(150));
    assert_eq!(money(&body["pricing"]["taxes"]), dec!(18));
    assert_eq!(money(&body["pricing"]["fees"]), dec!(25));
    assert_eq!(money(&body["pricing"]["total_price"]), dec!(193));
}

#[tokio::test]
async fn missing_caller_is_unauthorized() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/car/user/quote",
        None,
        Some(car_item(72, 3, "50", 1)),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_kind"], "unauthorized");
}

#[tokio::test]
async fn individual_cannot_use_business_endpoints() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/hotel/business/quote",
        ALICE,
        Some(car_item(72, 3, "50", 1)),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_kind"], "forbidden");
}

#[tokio::test]
async fn inverted_dates_are_a_validation_error() {
    let app = app();
    let mut item = car_item(72, 3, "50", 1);
    item["end_at"] = json!(rfc3339(10));

    let (status, body) = send(&app, "POST", "/car/user/quote", ALICE, Some(item)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_kind"], "validation_error");
}

#[tokio::test]
async fn schema_violations_are_rejected() {
    let app = app();
    let mut item = car_item(72, 3, "50", 1);
    item["listing_id"] = json!("");

    let (status, body) = send(&app, "POST", "/car/user/quote", ALICE, Some(item)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_kind"], "validation_error");

    let (status, body) = send(
        &app,
        "POST",
        "/car/user/quote",
        ALICE,
        Some(json!({ "listing_id": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_kind"], "validation_error");
}

#[tokio::test]
async fn individual_driver_cap_is_enforced() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/car/user/bookings",
        ALICE,
        Some(car_item(72, 3, "50", 3)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_kind"], "limit_exceeded");
}

#[tokio::test]
async fn corporate_quote_stacks_discounts() {
    let app = app();
    let item = json!({
        "listing_id": "hotel-grand",
        "start_at": rfc3339(72),
        "end_at": rfc3339(72 + 10 * 24),
        "unit_rate": "1500",
        "traveler_count": 12,
    });

    let (status, body) = send(&app, "POST", "/hotel/business/quote", ACME, Some(item)).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(money(&body["pricing"]["discount_percent"]), dec!(40));
    assert_eq!(money(&body["pricing"]["discount_amount"]), dec!(6000.00));
}

#[tokio::test]
async fn booking_lifecycle_with_refund() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/car/user/bookings",
        ALICE,
        Some(car_item(30, 3, "50", 1)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["booking"]["status"], "pending");
    let id = body["booking"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", &format!("/bookings/{}", id), ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["booking"]["pricing"]["total_price"]), dec!(193));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/bookings/{}/confirm", id),
        ALICE,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "confirmed");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/bookings/{}/refund-quote", id),
        ALICE,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["refund"]["refund_percent"]), dec!(75));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/bookings/{}/cancel", id),
        ALICE,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(money(&body["refund"]["refund_amount"]), dec!(144.75));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/bookings/{}/cancel", id),
        ALICE,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_kind"], "conflict");
}

#[tokio::test]
async fn other_callers_cannot_see_a_booking() {
    let app = app();
    let (_, body) = send(
        &app,
        "POST",
        "/car/user/bookings",
        ALICE,
        Some(car_item(72, 3, "50", 1)),
    )
    .await;
    let id = body["booking"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/bookings/{}", id),
        Some(("bob", "individual")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_kind"], "forbidden");
}

#[tokio::test]
async fn unknown_booking_is_not_found() {
    let app = app();
    let (status, body) = send(
        &app,
        "GET",
        "/bookings/6f1c1a8e-52a1-4a8c-9e55-0d5b8f3f0c11",
        ALICE,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_kind"], "not_found");

    let (status, _) = send(&app, "GET", "/bookings/not-a-uuid", ALICE, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bulk_booking_over_cap_is_rejected_wholesale() {
    let app = app();
    let items: Vec<Value> = (0..21).map(|_| car_item(72, 2, "40", 1)).collect();

    let (status, body) = send(
        &app,
        "POST",
        "/car/business/bulk",
        ACME,
        Some(json!({ "items": items })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_kind"], "limit_exceeded");

    let (_, body) = send(&app, "GET", "/bookings", ACME, None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn bulk_booking_creates_every_item() {
    let app = app();
    let items = vec![car_item(72, 3, "50", 1), car_item(96, 7, "80", 2)];

    let (status, body) = send(
        &app,
        "POST",
        "/car/business/bulk",
        ACME,
        Some(json!({ "items": items })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["totals"]["item_count"], 2);

    let (_, body) = send(&app, "GET", "/bookings", ACME, None).await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn bulk_quote_sums_items() {
    let app = app();
    let items = vec![car_item(72, 3, "50", 1), car_item(72, 3, "50", 1)];

    let (status, body) = send(
        &app,
        "POST",
        "/car/business/quote/bulk",
        ACME,
        Some(json!({ "items": items })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    // each: base 150 less 20% = 120, taxes 18, fee 25 -> 163
    assert_eq!(money(&body["totals"]["total_price"]), dec!(326.00));
}

#[tokio::test]
async fn unstorable_rates_are_validation_errors() {
    let app = app();

    for rate in ["70000000000000000000000000000", "10000000000", "49.999"] {
        let (status, body) = send(
            &app,
            "POST",
            "/hotel/business/quote",
            ACME,
            Some(car_item(72, 3, rate, 1)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}: {}", rate, body);
        assert_eq!(body["error_kind"], "validation_error");
    }
}

#[tokio::test]
async fn oversized_subtotal_is_a_validation_error() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/hotel/business/bookings",
        ACME,
        Some(car_item(72, 200, "9999999999.99", 1)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["error_kind"], "validation_error");

    let (_, body) = send(&app, "GET", "/bookings", ACME, None).await;
    assert_eq!(body["count"], 0);
}
