//! Read operations over the indexed store.
//!
//! Both operations draw their candidate set from a secondary index, join
//! each candidate against the related entity, and apply the filters with
//! strictly exclusive date bounds: a visit exactly on `from_date` or
//! `to_date` is dropped. Distance and upper-age bounds are exclusive as
//! well; the lower age bound is inclusive.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::age::age_in_years;
use super::entities::Gender;
use super::error::Error;
use super::store::Store;

/// Filters accepted by [`Store::list_visits`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitFilter {
    /// Keep visits strictly after this instant.
    pub from_date: Option<i64>,
    /// Keep visits strictly before this instant.
    pub to_date: Option<i64>,
    /// Keep visits whose location is in this country.
    pub country: Option<String>,
    /// Keep visits whose location is strictly nearer than this.
    pub to_distance: Option<i64>,
}

/// Filters accepted by [`Store::average_mark`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkFilter {
    /// Keep visits strictly after this instant.
    pub from_date: Option<i64>,
    /// Keep visits strictly before this instant.
    pub to_date: Option<i64>,
    /// Keep visitors at least this old.
    pub from_age: Option<i64>,
    /// Keep visitors strictly younger than this.
    pub to_age: Option<i64>,
    /// Keep visitors of this gender.
    pub gender: Option<Gender>,
}

/// One row of a visit listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct VisitSummary {
    /// The visit's mark.
    pub mark: u8,
    /// The visited location's place description.
    pub place: String,
    /// The visit instant, seconds since the epoch.
    pub visited_at: i64,
}

impl Store {
    /// List a user's visits, filtered and sorted ascending by visit instant.
    ///
    /// Fails with `NotFound` when the user does not exist. The sort is
    /// stable, so equal instants keep their bucket order.
    pub fn list_visits(
        &self,
        user_id: u32,
        filter: &VisitFilter,
    ) -> Result<Vec<VisitSummary>, Error> {
        let inner = self.read();
        if !inner.users.contains_key(&user_id) {
            return Err(Error::not_found(format!("user {user_id} does not exist")));
        }

        let mut rows = Vec::new();
        if let Some(bucket) = inner.visits_by_user.get(&user_id) {
            for visit_id in bucket {
                let Some(visit) = inner.visits.get(visit_id) else {
                    continue;
                };
                if filter.from_date.is_some_and(|from| visit.visited_at <= from) {
                    continue;
                }
                if filter.to_date.is_some_and(|to| visit.visited_at >= to) {
                    continue;
                }
                let Some(location) = inner.locations.get(&visit.location) else {
                    continue;
                };
                if filter
                    .country
                    .as_deref()
                    .is_some_and(|country| location.country != country)
                {
                    continue;
                }
                if filter
                    .to_distance
                    .is_some_and(|cap| location.distance >= cap)
                {
                    continue;
                }
                rows.push(VisitSummary {
                    mark: visit.mark,
                    place: location.place.clone(),
                    visited_at: visit.visited_at,
                });
            }
        }
        rows.sort_by_key(|row| row.visited_at);
        Ok(rows)
    }

    /// Mean mark of a location's visits under the given filters, rounded to
    /// five decimals.
    ///
    /// Visitor ages are taken against `now`. Fails with `NotFound` when the
    /// location does not exist; an empty candidate set yields `0`.
    pub fn average_mark(
        &self,
        location_id: u32,
        filter: &MarkFilter,
        now: DateTime<Utc>,
    ) -> Result<f64, Error> {
        let inner = self.read();
        if !inner.locations.contains_key(&location_id) {
            return Err(Error::not_found(format!(
                "location {location_id} does not exist"
            )));
        }

        let mut count: u64 = 0;
        let mut sum: u64 = 0;
        if let Some(bucket) = inner.visits_by_location.get(&location_id) {
            for visit_id in bucket {
                let Some(visit) = inner.visits.get(visit_id) else {
                    continue;
                };
                if filter.from_date.is_some_and(|from| visit.visited_at <= from) {
                    continue;
                }
                if filter.to_date.is_some_and(|to| visit.visited_at >= to) {
                    continue;
                }
                let Some(user) = inner.users.get(&visit.user) else {
                    continue;
                };
                if filter.gender.is_some_and(|gender| user.gender != gender) {
                    continue;
                }
                let Some(birth) = DateTime::from_timestamp(user.birth_date, 0) else {
                    continue;
                };
                let age = age_in_years(birth, now);
                if filter.from_age.is_some_and(|from| age < from) {
                    continue;
                }
                if filter.to_age.is_some_and(|to| age >= to) {
                    continue;
                }
                count += 1;
                sum += u64::from(visit.mark);
            }
        }

        if count == 0 {
            return Ok(0.0);
        }
        #[allow(clippy::cast_precision_loss, reason = "marks and counts are small")]
        let mean = sum as f64 / count as f64;
        Ok(round_to_5_decimals(mean))
    }
}

fn round_to_5_decimals(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

#[cfg(test)]
#[path = "queries_tests.rs"]
mod tests;
