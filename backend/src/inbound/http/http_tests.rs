//! End-to-end tests for the REST endpoints.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use crate::domain::{Gender, Location, Store, User, Visit};
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::AppState;

fn test_app(
    store: Arc<Store>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(AppState::new(store)))
        .app_data(web::Data::new(HealthState::new()))
        .configure(crate::server::routes)
}

fn seeded_store() -> Arc<Store> {
    let store = Store::new();
    store.load_user(User {
        id: 10,
        email: "a@x.com".to_owned(),
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        gender: Gender::Male,
        birth_date: -1_720_915_200,
    });
    store.load_location(Location {
        id: 1,
        place: "museum".to_owned(),
        country: "RU".to_owned(),
        city: "Moscow".to_owned(),
        distance: 100,
    });
    store.load_visit(Visit {
        id: 1,
        location: 1,
        user: 10,
        visited_at: 1_000_000_000,
        mark: 4,
    });
    Arc::new(store)
}

#[actix_web::test]
async fn get_user_returns_the_stored_record() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    let req = actix_test::TestRequest::get().uri("/users/10").to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], 10);
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["gender"], "m");
    assert_eq!(body["birth_date"], -1_720_915_200_i64);
}

#[actix_web::test]
async fn lookups_of_unknown_or_garbage_ids_are_404() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    for uri in [
        "/users/99",
        "/users/abc",
        "/locations/99",
        "/visits/99",
        "/users/99/visits",
        "/locations/99/avg",
        // An unknown id outranks a bad filter value.
        "/users/99/visits?fromDate=tomorrow",
        "/locations/99/avg?gender=x",
    ] {
        let req = actix_test::TestRequest::get().uri(uri).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn insert_acknowledges_with_an_empty_object_and_round_trips() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    let req = actix_test::TestRequest::post()
        .uri("/users/new")
        .set_json(json!({
            "id": 11,
            "email": "b@x.com",
            "first_name": "Grace",
            "last_name": "Hopper",
            "gender": "f",
            "birth_date": 0,
        }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let ack: Value = actix_test::read_body_json(res).await;
    assert_eq!(ack, json!({}));

    let req = actix_test::TestRequest::get().uri("/users/11").to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["first_name"], "Grace");
}

#[actix_web::test]
async fn insert_with_a_claimed_email_is_400() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    let req = actix_test::TestRequest::post()
        .uri("/users/new")
        .set_json(json!({
            "id": 11,
            "email": "a@x.com",
            "first_name": "Grace",
            "last_name": "Hopper",
            "gender": "f",
            "birth_date": 0,
        }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Store unchanged: the failed insert left no record behind.
    let req = actix_test::TestRequest::get().uri("/users/11").to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn incomplete_insert_and_bad_types_are_400() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    let bodies = [
        json!({"id": 12, "email": "c@x.com"}),
        json!({"id": 12, "email": 7, "first_name": "G", "last_name": "H", "gender": "f", "birth_date": 0}),
        json!({"id": 12, "email": "c@x.com", "first_name": "G", "last_name": "H", "gender": "f", "birth_date": null}),
        json!([1, 2, 3]),
    ];
    for body in bodies {
        let req = actix_test::TestRequest::post()
            .uri("/users/new")
            .set_json(&body)
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[actix_web::test]
async fn update_of_an_unknown_id_is_404_even_with_a_bad_body() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    let req = actix_test::TestRequest::post()
        .uri("/users/99")
        .insert_header(("content-type", "application/json"))
        .set_payload("not json")
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn update_merges_only_the_supplied_fields() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    let req = actix_test::TestRequest::post()
        .uri("/users/10")
        .set_json(json!({"last_name": "Byron", "id": 999}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    // The body id is ignored; the path id stays authoritative.
    let req = actix_test::TestRequest::get().uri("/users/10").to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], 10);
    assert_eq!(body["last_name"], "Byron");
    assert_eq!(body["email"], "a@x.com");
}

#[actix_web::test]
async fn visit_listing_filters_and_sorts() {
    let store = seeded_store();
    store.load_location(Location {
        id: 2,
        place: "park".to_owned(),
        country: "DE".to_owned(),
        city: "Berlin".to_owned(),
        distance: 10,
    });
    store.load_visit(Visit {
        id: 2,
        location: 2,
        user: 10,
        visited_at: 999_000_000,
        mark: 5,
    });
    let app = actix_test::init_service(test_app(store)).await;

    let req = actix_test::TestRequest::get()
        .uri("/users/10/visits")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!({"visits": [
            {"mark": 5, "place": "park", "visited_at": 999_000_000},
            {"mark": 4, "place": "museum", "visited_at": 1_000_000_000},
        ]})
    );

    let req = actix_test::TestRequest::get()
        .uri("/users/10/visits?country=RU&toDistance=101")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["visits"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["visits"][0]["place"], "museum");

    // Exclusive bound: a visit exactly on fromDate is dropped.
    let req = actix_test::TestRequest::get()
        .uri("/users/10/visits?fromDate=1000000000")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["visits"], json!([]));
}

#[actix_web::test]
async fn unparsable_filters_are_400() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    for uri in [
        "/users/10/visits?fromDate=tomorrow",
        "/users/10/visits?toDistance=far",
        "/locations/1/avg?toAge=old",
        "/locations/1/avg?gender=x",
    ] {
        let req = actix_test::TestRequest::get().uri(uri).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[actix_web::test]
async fn average_reflects_the_seeded_visit() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    let req = actix_test::TestRequest::get()
        .uri("/locations/1/avg")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"avg": 4.0}));
}

#[actix_web::test]
async fn average_with_no_matching_visits_is_zero() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    let req = actix_test::TestRequest::get()
        .uri("/locations/1/avg?fromAge=200&toAge=300")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"avg": 0.0}));
}

#[actix_web::test]
async fn visit_reassignment_shows_up_in_listings() {
    let store = seeded_store();
    store.load_location(Location {
        id: 2,
        place: "park".to_owned(),
        country: "DE".to_owned(),
        city: "Berlin".to_owned(),
        distance: 10,
    });
    let app = actix_test::init_service(test_app(Arc::clone(&store))).await;

    let req = actix_test::TestRequest::post()
        .uri("/visits/1")
        .set_json(json!({"location": 2}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = actix_test::TestRequest::get()
        .uri("/locations/2/avg")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"avg": 4.0}));

    let req = actix_test::TestRequest::get()
        .uri("/locations/1/avg")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"avg": 0.0}));
}

#[actix_web::test]
async fn visit_insert_with_unknown_reference_is_400() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    let req = actix_test::TestRequest::post()
        .uri("/visits/new")
        .set_json(json!({
            "id": 2,
            "location": 42,
            "user": 10,
            "visited_at": 1_000_000_000,
            "mark": 3,
        }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn probes_report_liveness_and_readiness() {
    let app = actix_test::init_service(test_app(seeded_store())).await;
    let req = actix_test::TestRequest::get()
        .uri("/health/live")
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    // The test harness never marks the state ready.
    let req = actix_test::TestRequest::get()
        .uri("/health/ready")
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}
