//! Historical override extractor.
//!
//! Reduces the transfer-event streams of a window to one value per person:
//! where that person's workplace / rotation stood at the end of the window.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::ids::{PersonId, WorkplaceId};
use crate::loader::drain_pages;
use crate::model::{RotationCode, ScheduleTransfer, WorkplaceTransfer};
use crate::upstream::{TransferKind, UpstreamApi, UpstreamSession};
use crate::window::ReportWindow;

/// Last-write-wins projections of the transfer streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideMaps {
    pub workplaces: HashMap<PersonId, WorkplaceId>,
    pub schedules: HashMap<PersonId, RotationCode>,
}

impl OverrideMaps {
    pub fn is_empty(&self) -> bool {
        self.workplaces.is_empty() && self.schedules.is_empty()
    }

    pub fn workplace_for(&self, person: PersonId) -> Option<WorkplaceId> {
        self.workplaces.get(&person).copied()
    }

    pub fn rotation_for(&self, person: PersonId) -> Option<&RotationCode> {
        self.schedules.get(&person)
    }

    /// Whether the person appears in either map.
    pub fn touches(&self, person: PersonId) -> bool {
        self.workplaces.contains_key(&person) || self.schedules.contains_key(&person)
    }

    /// Fold workplace transfers, ordered by event timestamp.
    ///
    /// Pages are not chronological, so events are stably sorted before the
    /// fold. Events without a readable timestamp sort first, by raw text.
    pub fn apply_workplace_transfers(&mut self, mut transfers: Vec<WorkplaceTransfer>) {
        transfers.sort_by(|a, b| a.chronology().cmp(&b.chronology()));
        for transfer in transfers {
            if let (Some(person), Some(workplace)) = (transfer.person_id, transfer.workplace_id) {
                self.workplaces.insert(person, workplace);
            }
        }
    }

    /// Fold schedule transfers in arrival order.
    pub fn apply_schedule_transfers(&mut self, transfers: Vec<ScheduleTransfer>) {
        for transfer in transfers {
            if let (Some(person), Some(code)) = (transfer.person_id, transfer.rotation_code) {
                self.schedules.insert(person, code);
            }
        }
    }
}

fn decode_events<T: serde::de::DeserializeOwned>(kind: TransferKind, items: Vec<JsonValue>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::warn!(stream = kind.path(), error = %err, "skipping undecodable transfer");
                None
            }
        })
        .collect()
}

async fn drain_stream<T, U>(
    session: &UpstreamSession<'_, U>,
    kind: TransferKind,
    window: &ReportWindow,
) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
    U: UpstreamApi + ?Sized,
{
    let drained = drain_pages(session.first_page(), move |req| {
        session.transfer_page(kind, window, req)
    })
    .await;

    if let Some(err) = &drained.interrupted_by {
        tracing::warn!(
            stream = kind.path(),
            pages = drained.pages,
            events = drained.items.len(),
            error = %err,
            "transfer stream interrupted; using events gathered so far"
        );
    }
    decode_events(kind, drained.items)
}

/// Scan both transfer streams inside `window`.
///
/// Each stream degrades independently: a failed page truncates that stream and
/// never fails the extraction.
pub async fn extract_overrides<U>(session: &UpstreamSession<'_, U>, window: &ReportWindow) -> OverrideMaps
where
    U: UpstreamApi + ?Sized,
{
    let mut overrides = OverrideMaps::default();

    let workplace_events = drain_stream(session, TransferKind::Workplace, window).await;
    overrides.apply_workplace_transfers(workplace_events);
    tracing::info!(
        persons = overrides.workplaces.len(),
        "workplace history found"
    );

    let schedule_events = drain_stream(session, TransferKind::Schedule, window).await;
    overrides.apply_schedule_transfers(schedule_events);
    tracing::info!(persons = overrides.schedules.len(), "schedule history found");

    overrides
}
