// Integration tests for Konamon Finder

use actix_web::{http::StatusCode, test, web, App};
use chrono::FixedOffset;
use konamon_finder::core::ShopRanker;
use konamon_finder::routes::{configure_routes, json_config, query_config, AppState};
use konamon_finder::services::{CatalogClient, ShopCache};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn app_state(catalog_url: String) -> AppState {
    AppState {
        catalog: Arc::new(CatalogClient::new(catalog_url, Duration::from_secs(5)).unwrap()),
        cache: Arc::new(ShopCache::new(100, 60)),
        ranker: ShopRanker::new(20, 100),
        utc_offset: FixedOffset::east_opt(9 * 3600).unwrap(),
        default_radius_km: 1.0,
    }
}

/// Four shops around Osaka, the same fixtures the mobile page shipped with
fn osaka_shops() -> Value {
    json!([
        {
            "place_id": "place1",
            "name": "本場のたこ焼き屋 A",
            "address": "大阪府大阪市中央区道頓堀1-1-1",
            "latitude": 34.6687,
            "longitude": 135.5026,
            "Maps_url": "https://maps.app.goo.gl/dummy-takoyaki-A",
            "rating": 4.2,
            "opening_hours_periods": [
                {"close": {"day": 0, "time": "1400"}, "open": {"day": 0, "time": "1130"}},
                {"close": {"day": 1, "time": "0300"}, "open": {"day": 0, "time": "1700"}},
                {"close": {"day": 1, "time": "2200"}, "open": {"day": 1, "time": "1100"}}
            ],
            "food_type": "たこ焼き"
        },
        {
            "place_id": "place2",
            "name": "絶品お好み焼き B",
            "address": "大阪府大阪市北区梅田3-1-1",
            "latitude": 34.7022,
            "longitude": 135.4958,
            "opening_hours_periods": [
                {"close": {"day": 1, "time": "2200"}, "open": {"day": 1, "time": "1000"}}
            ],
            "food_type": "お好み焼き"
        },
        {
            "place_id": "place3",
            "name": "秘伝のたこ焼き C",
            "address": "大阪府大阪市淀川区宮原1-1-1",
            "latitude": 34.7335,
            "longitude": 135.5005,
            "opening_hours_periods": [],
            "food_type": "たこ焼き"
        }
    ])
}

// Namba, Sunday 2024-06-02 18:00 JST
fn namba_request(extra: Value) -> Value {
    let mut body = json!({
        "latitude": 34.6660,
        "longitude": 135.5009,
        "at": "2024-06-02T18:00:00+09:00"
    });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }
    body
}

#[actix_web::test]
async fn test_health() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state("http://127.0.0.1:9".into())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_nearby_with_inline_shops() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state("http://127.0.0.1:9".into())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/shops/nearby")
        .set_json(namba_request(json!({ "foodType": "たこ焼き", "shops": osaka_shops() })))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let shops = body["shops"].as_array().unwrap();

    assert_eq!(body["totalCandidates"], 3);
    assert_eq!(shops.len(), 2);
    assert_eq!(shops[0]["place_id"], "place1");
    assert_eq!(shops[1]["place_id"], "place3");

    assert_eq!(shops[0]["displayDistance"], "0.3 km");
    assert_eq!(shops[0]["displayOpeningHours"], "今日 (日): 11:30〜14:00 / 17:00〜翌月03:00");
    assert_eq!(shops[0]["isOpenNow"], true);
    assert_eq!(shops[0]["maps_url"], "https://maps.app.goo.gl/dummy-takoyaki-A");
    assert_eq!(shops[1]["displayOpeningHours"], "営業時間不明");
    assert!(shops[0]["distanceKm"].as_f64().unwrap() < shops[1]["distanceKm"].as_f64().unwrap());
}

#[actix_web::test]
async fn test_nearby_open_now_and_radius() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state("http://127.0.0.1:9".into())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/shops/nearby")
        .set_json(namba_request(json!({ "openNow": true, "radiusKm": 10.0, "shops": osaka_shops() })))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    // Only A has a Sunday evening slot
    let ids: Vec<&str> = body["shops"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["place_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["place1"]);
}

#[actix_web::test]
async fn test_nearby_rejects_bad_latitude() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state("http://127.0.0.1:9".into())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/shops/nearby")
        .set_json(json!({ "latitude": 134.0, "longitude": 135.5, "shops": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_malformed_payloads_use_error_shape() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state("http://127.0.0.1:9".into())))
            .app_data(json_config())
            .app_data(query_config())
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/shops/nearby")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"latitude\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
    assert_eq!(body["status_code"], 400);

    let req = test::TestRequest::get()
        .uri("/api/v1/shops/place1/hours?at=yesterday")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_query");
}

#[actix_web::test]
async fn test_nearby_rejects_bad_shop_coordinate() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state("http://127.0.0.1:9".into())))
            .configure(configure_routes),
    )
    .await;

    let shops = json!([{ "place_id": "x", "name": "x", "latitude": 95.0, "longitude": 135.0 }]);
    let req = test::TestRequest::post()
        .uri("/api/v1/shops/nearby")
        .set_json(namba_request(json!({ "shops": shops })))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_nearby_from_catalog_is_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/nearby")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(osaka_shops().to_string())
        .expect(1)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(server.url())))
            .configure(configure_routes),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/shops/nearby")
            .set_json(namba_request(json!({ "foodType": "お好み焼き" })))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let shops = body["shops"].as_array().unwrap();
        assert_eq!(shops.len(), 1);
        assert_eq!(shops[0]["place_id"], "place2");
        assert_eq!(shops[0]["displayOpeningHours"], "今日 (日): 本日定休日 / 営業時間不明");
    }

    mock.assert_async().await;
}

#[actix_web::test]
async fn test_nearby_catalog_failure_is_bad_gateway() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/nearby")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(server.url())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/shops/nearby")
        .set_json(namba_request(json!({ "foodType": "たこ焼き" })))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn test_nearby_catalog_search_requires_food_type() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/nearby")
        .match_query(mockito::Matcher::Any)
        .with_status(400)
        .expect(0)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(server.url())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/shops/nearby")
        .set_json(namba_request(json!({})))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Validation failed");
    assert!(body["message"].as_str().unwrap().contains("foodType"));

    // Inline shops need no food type
    let req = test::TestRequest::post()
        .uri("/api/v1/shops/nearby")
        .set_json(namba_request(json!({ "shops": osaka_shops() })))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    mock.assert_async().await;
}

#[actix_web::test]
async fn test_shop_hours_week_table() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/shops/place2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "place_id": "place2",
                "name": "絶品お好み焼き B",
                "address": "大阪府大阪市北区梅田3-1-1",
                "opening_hours": [
                    "月曜日: 10:00-22:00",
                    "火曜日: 10:00-22:00",
                    "水曜日: 定休日"
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(server.url())))
            .configure(configure_routes),
    )
    .await;

    // Monday 12:00 JST, given in UTC
    let req = test::TestRequest::get()
        .uri("/api/v1/shops/place2/hours?at=2024-06-03T03:00:00Z")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["placeId"], "place2");
    assert_eq!(body["today"], "今日 (月): 10:00-22:00");

    let week = body["week"].as_array().unwrap();
    assert_eq!(week.len(), 7);
    assert_eq!(week[0]["hours"], "定休日、または営業時間不明");
    assert_eq!(week[1]["isToday"], true);
    assert_eq!(week[3]["hours"], "定休日");
}

#[actix_web::test]
async fn test_shop_hours_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/shops/nope")
        .with_status(404)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(server.url())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/shops/nope/hours").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
