//! Per-run cache bundle.
//!
//! A fresh bundle is built for every report run and dropped with it; nothing
//! here is shared between concurrent runs.

use std::collections::HashMap;
use std::hash::Hash;

use crate::ids::{
    BusinessUnitId, CareerId, ClientId, CompanyId, PersonId, ScheduleId, SituationId, WorkplaceId,
};
use crate::model::{BusinessUnit, Career, Client, Company, Person, Schedule, Situation, Workplace};

/// Bulk-loaded reference snapshots, keyed by id. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCaches {
    pub persons: HashMap<PersonId, Person>,
    pub workplaces: HashMap<WorkplaceId, Workplace>,
    pub companies: HashMap<CompanyId, Company>,
    pub clients: HashMap<ClientId, Client>,
    pub careers: HashMap<CareerId, Career>,
    pub schedules: HashMap<ScheduleId, Schedule>,
}

impl ReferenceCaches {
    pub fn workplace(&self, id: Option<WorkplaceId>) -> Option<&Workplace> {
        id.and_then(|id| self.workplaces.get(&id))
    }

    pub fn company(&self, id: Option<CompanyId>) -> Option<&Company> {
        id.and_then(|id| self.companies.get(&id))
    }

    pub fn client(&self, id: Option<ClientId>) -> Option<&Client> {
        id.and_then(|id| self.clients.get(&id))
    }

    pub fn career(&self, id: Option<CareerId>) -> Option<&Career> {
        id.and_then(|id| self.careers.get(&id))
    }

    pub fn schedule(&self, id: Option<ScheduleId>) -> Option<&Schedule> {
        id.and_then(|id| self.schedules.get(&id))
    }
}

/// Memo of single-entity lookups, including failed ones.
///
/// A failed lookup is stored as `T::default()` (the empty entity) so the same
/// id is never fetched twice in a run.
#[derive(Debug, Clone)]
pub struct DetailCache<K, T> {
    entries: HashMap<K, T>,
}

impl<K, T> Default for DetailCache<K, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K, T> DetailCache<K, T>
where
    K: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: K) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: K) -> bool {
        self.entries.contains_key(&id)
    }

    /// First write wins; later writes for the same id are ignored.
    pub fn insert(&mut self, id: K, value: T) -> &T {
        self.entries.entry(id).or_insert(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lazily filled detail caches for one run.
#[derive(Debug, Clone, Default)]
pub struct DetailCaches {
    pub situations: DetailCache<SituationId, Situation>,
    pub business_units: DetailCache<BusinessUnitId, BusinessUnit>,
}
