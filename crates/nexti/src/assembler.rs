//! Report assembler: active-person selection, composition, reordering.

use std::collections::HashMap;

use crate::composer::{EmployeeRecord, RecordComposer};
use crate::ids::{PersonId, SituationId};
use crate::model::Person;
use crate::overrides::OverrideMaps;
use crate::upstream::UpstreamApi;

/// Situation ids that put a person in the report.
///
/// The default `{1, 2}` is an opaque allow-list inherited from the panel; no
/// meaning beyond the numeric codes is assumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSituations(Vec<SituationId>);

impl ActiveSituations {
    pub fn new(ids: impl IntoIterator<Item = SituationId>) -> Self {
        Self(ids.into_iter().collect())
    }

    pub fn allows(&self, situation: Option<SituationId>) -> bool {
        situation.is_some_and(|s| self.0.contains(&s))
    }

    pub fn ids(&self) -> &[SituationId] {
        &self.0
    }
}

impl Default for ActiveSituations {
    fn default() -> Self {
        Self::new([SituationId::new(1), SituationId::new(2)])
    }
}

/// Active persons in ascending id order.
pub fn select_active<'p>(
    persons: &'p HashMap<PersonId, Person>,
    active: &ActiveSituations,
) -> Vec<&'p Person> {
    let mut selected: Vec<&Person> = persons
        .values()
        .filter(|p| active.allows(p.situation_id))
        .collect();
    selected.sort_by_key(|p| p.id);
    selected
}

/// Stable partition: rows of persons with historical data first.
///
/// Relative order inside each partition is the composition order.
pub fn prioritize_overridden(mut records: Vec<EmployeeRecord>, overrides: &OverrideMaps) -> Vec<EmployeeRecord> {
    if overrides.is_empty() {
        return records;
    }
    records.sort_by_key(|r| !overrides.touches(r.person_id));
    records
}

/// Compose every person in order, then reorder.
pub async fn assemble_report<U>(
    composer: &mut RecordComposer<'_, '_, U>,
    persons: &[&Person],
    overrides: &OverrideMaps,
) -> Vec<EmployeeRecord>
where
    U: UpstreamApi + ?Sized,
{
    let mut records = Vec::with_capacity(persons.len());
    for person in persons {
        records.push(composer.compose(person, overrides).await);
    }

    if !overrides.is_empty() {
        tracing::info!(
            overridden = records.iter().filter(|r| overrides.touches(r.person_id)).count(),
            "moving persons with historical data to the top"
        );
    }
    prioritize_overridden(records, overrides)
}

/// Current-state variant: no overrides, composition order kept.
pub async fn assemble_current_report<U>(
    composer: &mut RecordComposer<'_, '_, U>,
    persons: &[&Person],
) -> Vec<EmployeeRecord>
where
    U: UpstreamApi + ?Sized,
{
    assemble_report(composer, persons, &OverrideMaps::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ReferenceCaches;
    use crate::ids::WorkplaceId;
    use crate::model::{RotationCode, Workplace};
    use crate::upstream::{AccessToken, InMemoryUpstream, UpstreamSession};
    use proptest::prelude::*;

    fn person(id: i64, situation: i64) -> Person {
        Person {
            situation_id: Some(SituationId::new(situation)),
            workplace_id: Some(WorkplaceId::new(1)),
            ..Person::with_id(PersonId::new(id))
        }
    }

    fn row(id: i64) -> EmployeeRecord {
        EmployeeRecord {
            enrolment: None,
            name: None,
            cpf: None,
            admission_date: None,
            demission_date: None,
            workplace: None,
            company: None,
            client: None,
            business_unit: None,
            career: None,
            situation: None,
            cronograma: String::new(),
            horario: "N/A".into(),
            turno: "N/A".into(),
            person_id: PersonId::new(id),
        }
    }

    #[test]
    fn only_allowed_situations_are_selected() {
        let mut persons: HashMap<_, _> = [person(3, 1), person(1, 2), person(2, 5)]
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let mut no_situation = person(4, 1);
        no_situation.situation_id = None;
        persons.insert(no_situation.id, no_situation);

        let ids: Vec<_> = select_active(&persons, &ActiveSituations::default())
            .iter()
            .map(|p| p.id.get())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn overridden_rows_move_to_top_stably() {
        let mut overrides = OverrideMaps::default();
        overrides.workplaces.insert(PersonId::new(4), WorkplaceId::new(1));
        overrides.schedules.insert(PersonId::new(2), RotationCode::new("1"));

        let ordered: Vec<_> = prioritize_overridden((1..=5).map(row).collect(), &overrides)
            .iter()
            .map(|r| r.person_id.get())
            .collect();
        assert_eq!(ordered, vec![2, 4, 1, 3, 5]);
    }

    #[tokio::test]
    async fn no_override_rows_match_current_state_rows() {
        let api = InMemoryUpstream::new("t");
        let session = UpstreamSession::with_token(&api, AccessToken::new("t"), 10);
        let mut caches = ReferenceCaches::default();
        caches.workplaces.insert(
            WorkplaceId::new(1),
            Workplace {
                id: WorkplaceId::new(1),
                name: Some("Centro".into()),
                business_unit_id: None,
                client_id: None,
            },
        );
        let people = [person(1, 1), person(2, 1)];
        let refs: Vec<&Person> = people.iter().collect();

        let mut composer = RecordComposer::new(&session, &caches);
        let current = assemble_current_report(&mut composer, &refs).await;

        let mut overrides = OverrideMaps::default();
        overrides.workplaces.insert(PersonId::new(2), WorkplaceId::new(77));
        let windowed = assemble_report(&mut composer, &refs, &overrides).await;

        assert_eq!(windowed[0].person_id, PersonId::new(2));
        assert_eq!(windowed[0].workplace, None);
        let untouched = windowed.iter().find(|r| r.person_id == PersonId::new(1)).unwrap();
        assert_eq!(untouched, &current[0]);
        assert_eq!(
            serde_json::to_string(untouched).unwrap(),
            serde_json::to_string(&current[0]).unwrap()
        );
    }

    proptest! {
        /// Every overridden row precedes every other row, and both partitions
        /// keep their input order.
        #[test]
        fn partition_is_stable(flags in proptest::collection::vec(any::<bool>(), 0..40)) {
            let mut overrides = OverrideMaps::default();
            let records: Vec<_> = flags.iter().enumerate().map(|(i, _)| row(i as i64)).collect();
            for (i, flagged) in flags.iter().enumerate() {
                if *flagged {
                    overrides.workplaces.insert(PersonId::new(i as i64), WorkplaceId::new(1));
                }
            }

            let ordered = prioritize_overridden(records, &overrides);
            let split = ordered.iter().take_while(|r| overrides.touches(r.person_id)).count();
            prop_assert!(ordered[split..].iter().all(|r| !overrides.touches(r.person_id)));
            prop_assert!(ordered[..split].windows(2).all(|w| w[0].person_id < w[1].person_id));
            prop_assert!(ordered[split..].windows(2).all(|w| w[0].person_id < w[1].person_id));
        }
    }
}
