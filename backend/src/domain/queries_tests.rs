//! Tests for the visit listing and average-mark queries.

use chrono::TimeZone;
use rstest::rstest;

use super::*;
use crate::domain::entities::{Location, User, Visit};
use crate::domain::store::Store;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 8, 1, 0, 0, 0).unwrap()
}

/// A user whose age at [`now`] is exactly `age` years (birthday two weeks
/// past).
fn user_aged(id: u32, age: i32, gender: Gender) -> User {
    let birthday = Utc
        .with_ymd_and_hms(2017 - age, 7, 15, 0, 0, 0)
        .unwrap()
        .timestamp();
    User {
        id,
        email: format!("user-{id}@x.com"),
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        gender,
        birth_date: birthday,
    }
}

fn location(id: u32, country: &str, distance: i64) -> Location {
    Location {
        id,
        place: format!("place-{id}"),
        country: country.to_owned(),
        city: "Moscow".to_owned(),
        distance,
    }
}

fn visit(id: u32, user: u32, location: u32, visited_at: i64, mark: u8) -> Visit {
    Visit {
        id,
        location,
        user,
        visited_at,
        mark,
    }
}

fn seeded_store() -> Store {
    let store = Store::new();
    store.load_user(user_aged(10, 35, Gender::Male));
    store.load_location(location(1, "RU", 100));
    store.load_visit(visit(1, 10, 1, 1_000_000_000, 4));
    store
}

#[test]
fn single_visit_round_trips_through_the_listing() {
    let store = seeded_store();
    let rows = store
        .list_visits(10, &VisitFilter::default())
        .expect("user exists");
    assert_eq!(
        rows,
        vec![VisitSummary {
            mark: 4,
            place: "place-1".to_owned(),
            visited_at: 1_000_000_000,
        }]
    );
}

#[test]
fn listing_an_unknown_user_is_not_found() {
    let store = seeded_store();
    let err = store
        .list_visits(99, &VisitFilter::default())
        .expect_err("user 99 does not exist");
    assert_eq!(err.code(), crate::domain::ErrorCode::NotFound);
}

#[rstest]
#[case::on_from_date_excluded(Some(1_000_000_000), None, 0)]
#[case::just_before_from_date_included(Some(999_999_999), None, 1)]
#[case::on_to_date_excluded(None, Some(1_000_000_000), 0)]
#[case::just_after_to_date_included(None, Some(1_000_000_001), 1)]
fn date_bounds_are_strictly_exclusive(
    #[case] from_date: Option<i64>,
    #[case] to_date: Option<i64>,
    #[case] expected: usize,
) {
    let store = seeded_store();
    let filter = VisitFilter {
        from_date,
        to_date,
        ..VisitFilter::default()
    };
    let rows = store.list_visits(10, &filter).expect("user exists");
    assert_eq!(rows.len(), expected);
}

#[test]
fn distance_bound_is_strictly_exclusive() {
    let store = seeded_store();
    let at_bound = VisitFilter {
        to_distance: Some(100),
        ..VisitFilter::default()
    };
    assert!(store.list_visits(10, &at_bound).expect("user exists").is_empty());

    let above_bound = VisitFilter {
        to_distance: Some(101),
        ..VisitFilter::default()
    };
    assert_eq!(store.list_visits(10, &above_bound).expect("user exists").len(), 1);
}

#[test]
fn country_filter_joins_against_the_location() {
    let store = seeded_store();
    store.load_location(location(2, "DE", 10));
    store.load_visit(visit(2, 10, 2, 1_100_000_000, 5));

    let filter = VisitFilter {
        country: Some("DE".to_owned()),
        ..VisitFilter::default()
    };
    let rows = store.list_visits(10, &filter).expect("user exists");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].place, "place-2");
}

#[test]
fn listing_is_sorted_ascending_by_visit_instant() {
    let store = seeded_store();
    store.load_visit(visit(2, 10, 1, 999_000_000, 1));
    store.load_visit(visit(3, 10, 1, 1_100_000_000, 2));
    store.load_visit(visit(4, 10, 1, 999_500_000, 3));

    let rows = store
        .list_visits(10, &VisitFilter::default())
        .expect("user exists");
    let instants: Vec<i64> = rows.iter().map(|row| row.visited_at).collect();
    let mut sorted = instants.clone();
    sorted.sort_unstable();
    assert_eq!(instants, sorted);
    assert_eq!(rows.len(), 4);
}

#[test]
fn equal_instants_keep_their_bucket_order() {
    let store = seeded_store();
    store.load_location(location(2, "DE", 10));
    store.load_visit(visit(5, 10, 2, 1_000_000_000, 5));
    store.load_visit(visit(3, 10, 2, 1_000_000_000, 3));

    let rows = store
        .list_visits(10, &VisitFilter::default())
        .expect("user exists");
    // Bucket order is visit-id order, so the tie resolves 1, 3, 5.
    let marks: Vec<u8> = rows.iter().map(|row| row.mark).collect();
    assert_eq!(marks, vec![4, 3, 5]);
}

#[test]
fn average_of_the_seeded_visit_is_its_mark() {
    let store = seeded_store();
    let avg = store
        .average_mark(1, &MarkFilter::default(), now())
        .expect("location exists");
    assert!((avg - 4.0).abs() < f64::EPSILON);
}

#[test]
fn average_for_an_unknown_location_is_not_found() {
    let store = seeded_store();
    let err = store
        .average_mark(99, &MarkFilter::default(), now())
        .expect_err("location 99 does not exist");
    assert_eq!(err.code(), crate::domain::ErrorCode::NotFound);
}

#[test]
fn empty_candidate_set_yields_zero_not_an_error() {
    let store = seeded_store();
    let filter = MarkFilter {
        from_age: Some(30),
        to_age: Some(40),
        gender: Some(Gender::Female),
        ..MarkFilter::default()
    };
    let avg = store.average_mark(1, &filter, now()).expect("location exists");
    assert!((avg - 0.0).abs() < f64::EPSILON);
}

#[rstest]
#[case::from_age_is_inclusive(Some(35), None, 1)]
#[case::above_from_age_excluded(Some(36), None, 0)]
#[case::to_age_is_exclusive(None, Some(35), 0)]
#[case::below_to_age_included(None, Some(36), 1)]
fn age_bounds_are_inclusive_below_exclusive_above(
    #[case] from_age: Option<i64>,
    #[case] to_age: Option<i64>,
    #[case] expected_count: usize,
) {
    let store = seeded_store();
    let filter = MarkFilter {
        from_age,
        to_age,
        ..MarkFilter::default()
    };
    let avg = store.average_mark(1, &filter, now()).expect("location exists");
    let expected = if expected_count == 0 { 0.0 } else { 4.0 };
    assert!((avg - expected).abs() < f64::EPSILON);
}

#[test]
fn gender_filter_joins_against_the_user() {
    let store = seeded_store();
    store.load_user(user_aged(11, 20, Gender::Female));
    store.load_visit(visit(2, 11, 1, 1_000_000_500, 1));

    let women_only = MarkFilter {
        gender: Some(Gender::Female),
        ..MarkFilter::default()
    };
    let avg = store
        .average_mark(1, &women_only, now())
        .expect("location exists");
    assert!((avg - 1.0).abs() < f64::EPSILON);
}

#[test]
fn mean_is_rounded_to_five_decimals() {
    let store = seeded_store();
    store.load_user(user_aged(11, 20, Gender::Female));
    store.load_user(user_aged(12, 40, Gender::Female));
    store.load_visit(visit(2, 11, 1, 1_000_000_500, 5));
    store.load_visit(visit(3, 12, 1, 1_000_001_000, 5));

    // (4 + 5 + 5) / 3 = 4.666666... -> 4.66667
    let avg = store
        .average_mark(1, &MarkFilter::default(), now())
        .expect("location exists");
    assert!((avg - 4.66667).abs() < 1e-9);
}

#[test]
fn date_bounds_apply_to_the_average_too() {
    let store = seeded_store();
    let filter = MarkFilter {
        from_date: Some(1_000_000_000),
        ..MarkFilter::default()
    };
    let avg = store.average_mark(1, &filter, now()).expect("location exists");
    assert!((avg - 0.0).abs() < f64::EPSILON);
}
