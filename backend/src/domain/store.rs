//! In-memory primary store and secondary visit indexes.
//!
//! The store owns every entity record, the set of claimed user emails, and
//! two derived groupings of visit ids (by user and by location). All of it
//! sits behind a single reader/writer lock: a visit mutation (record write
//! plus index maintenance) and the email check-then-set each run under one
//! write guard, so readers observe them fully-before or fully-after, never
//! half-applied. Nothing under the lock performs I/O.
//!
//! Mutations come in two flavours. `create_*`/`update_*` are the validated
//! request paths: they complete or merge a patch, enforce email uniqueness
//! and visit referential integrity, and keep the indexes consistent.
//! `load_*` are the bootstrap puts used by the bundle loader before traffic
//! starts; bundle records are trusted, so they skip those checks while still
//! maintaining the email set and the indexes.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::entities::{Location, User, Visit};
use super::error::Error;
use super::validation::{LocationPatch, UserPatch, VisitPatch};

/// Thread-safe indexed entity store.
#[derive(Default)]
pub struct Store {
    inner: RwLock<Inner>,
}

#[derive(Default)]
pub(crate) struct Inner {
    pub(crate) users: HashMap<u32, User>,
    pub(crate) locations: HashMap<u32, Location>,
    pub(crate) visits: HashMap<u32, Visit>,
    claimed_emails: HashSet<String>,
    pub(crate) visits_by_user: HashMap<u32, BTreeSet<u32>>,
    pub(crate) visits_by_location: HashMap<u32, BTreeSet<u32>>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch a user by id.
    pub fn user(&self, id: u32) -> Option<User> {
        self.read().users.get(&id).cloned()
    }

    /// Fetch a location by id.
    pub fn location(&self, id: u32) -> Option<Location> {
        self.read().locations.get(&id).cloned()
    }

    /// Fetch a visit by id.
    pub fn visit(&self, id: u32) -> Option<Visit> {
        self.read().visits.get(&id).cloned()
    }

    /// Insert a user from a complete patch.
    pub fn create_user(&self, id: u32, patch: UserPatch) -> Result<(), Error> {
        let user = patch.into_user(id)?;
        self.write().put_user(user)
    }

    /// Merge a patch over an existing user.
    pub fn update_user(&self, id: u32, patch: UserPatch) -> Result<(), Error> {
        let mut inner = self.write();
        let mut user = inner
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("user {id} does not exist")))?;
        patch.apply(&mut user);
        inner.put_user(user)
    }

    /// Insert a location from a complete patch.
    pub fn create_location(&self, id: u32, patch: LocationPatch) -> Result<(), Error> {
        let location = patch.into_location(id)?;
        self.write().locations.insert(location.id, location);
        Ok(())
    }

    /// Merge a patch over an existing location.
    pub fn update_location(&self, id: u32, patch: LocationPatch) -> Result<(), Error> {
        let mut inner = self.write();
        let mut location = inner
            .locations
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("location {id} does not exist")))?;
        patch.apply(&mut location);
        inner.locations.insert(location.id, location);
        Ok(())
    }

    /// Insert a visit from a complete patch, checking its references.
    pub fn create_visit(&self, id: u32, patch: VisitPatch) -> Result<(), Error> {
        let visit = patch.into_visit(id)?;
        self.write().put_visit(visit)
    }

    /// Merge a patch over an existing visit, checking the merged references.
    pub fn update_visit(&self, id: u32, patch: VisitPatch) -> Result<(), Error> {
        let mut inner = self.write();
        let mut visit = inner
            .visits
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("visit {id} does not exist")))?;
        patch.apply(&mut visit);
        inner.put_visit(visit)
    }

    /// Bootstrap put of a trusted bundle user.
    pub fn load_user(&self, user: User) {
        let mut inner = self.write();
        inner.claimed_emails.insert(user.email.clone());
        inner.users.insert(user.id, user);
    }

    /// Bootstrap put of a trusted bundle location.
    pub fn load_location(&self, location: Location) {
        self.write().locations.insert(location.id, location);
    }

    /// Bootstrap put of a trusted bundle visit; indexes are maintained.
    pub fn load_visit(&self, visit: Visit) {
        let mut inner = self.write();
        let previous = inner.visits.insert(visit.id, visit.clone());
        inner.index_visit(previous.as_ref(), &visit);
    }
}

impl Inner {
    /// Write a user record, keeping the claimed-email set exact.
    ///
    /// A changed (or fresh) email is rejected while another user holds it;
    /// otherwise the previous claim is released and the new one taken in the
    /// same step.
    fn put_user(&mut self, user: User) -> Result<(), Error> {
        let previous_email = self.users.get(&user.id).map(|held| held.email.clone());
        if previous_email.as_deref() != Some(user.email.as_str()) {
            if self.claimed_emails.contains(&user.email) {
                return Err(Error::invalid_request("email is already claimed"));
            }
            if let Some(old) = previous_email {
                self.claimed_emails.remove(&old);
            }
            self.claimed_emails.insert(user.email.clone());
        }
        self.users.insert(user.id, user);
        Ok(())
    }

    /// Write a visit record and bring both indexes up to date.
    ///
    /// The referenced location and user must exist, whether the write is an
    /// insert or carries a reassignment.
    fn put_visit(&mut self, visit: Visit) -> Result<(), Error> {
        if !self.locations.contains_key(&visit.location) {
            return Err(Error::invalid_request(format!(
                "visit references unknown location {}",
                visit.location
            )));
        }
        if !self.users.contains_key(&visit.user) {
            return Err(Error::invalid_request(format!(
                "visit references unknown user {}",
                visit.user
            )));
        }
        let previous = self.visits.insert(visit.id, visit.clone());
        self.index_visit(previous.as_ref(), &visit);
        Ok(())
    }

    /// Re-bucket a visit after a write, dropping stale entries left under a
    /// previous user or location.
    fn index_visit(&mut self, old: Option<&Visit>, new: &Visit) {
        self.visits_by_user.entry(new.user).or_default().insert(new.id);
        self.visits_by_location
            .entry(new.location)
            .or_default()
            .insert(new.id);
        if let Some(old) = old {
            if old.user != new.user
                && let Some(bucket) = self.visits_by_user.get_mut(&old.user)
            {
                bucket.remove(&old.id);
            }
            if old.location != new.location
                && let Some(bucket) = self.visits_by_location.get_mut(&old.location)
            {
                bucket.remove(&old.id);
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
