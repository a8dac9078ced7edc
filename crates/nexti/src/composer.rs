//! Record composer: one flat, display-ready row per person.

use serde::Serialize;

use crate::cache::{DetailCaches, ReferenceCaches};
use crate::ids::PersonId;
use crate::model::{BusinessUnit, Career, Client, Company, Person, RotationCode, Schedule, Situation, Workplace};
use crate::overrides::OverrideMaps;
use crate::resolver::resolve;
use crate::upstream::{Resource, UpstreamApi, UpstreamSession};

/// Placeholder shown when a schedule carries no time range or shift.
pub const NOT_AVAILABLE: &str = "N/A";

/// Flattened employee row, serialised with the panel's column names.
///
/// Absent values serialise as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeRecord {
    #[serde(rename = "Matricula")]
    pub enrolment: Option<String>,
    #[serde(rename = "Nome Colaborador")]
    pub name: Option<String>,
    #[serde(rename = "CPF")]
    pub cpf: Option<String>,
    #[serde(rename = "Data Admissao")]
    pub admission_date: Option<String>,
    #[serde(rename = "Data Demissao")]
    pub demission_date: Option<String>,
    #[serde(rename = "Nome Posto de Trabalho")]
    pub workplace: Option<String>,
    #[serde(rename = "Razao Social Empresa")]
    pub company: Option<String>,
    #[serde(rename = "Cliente")]
    pub client: Option<String>,
    #[serde(rename = "Unidade de Negocio")]
    pub business_unit: Option<String>,
    #[serde(rename = "Descricao Cargo")]
    pub career: Option<String>,
    #[serde(rename = "Descricao Situacao")]
    pub situation: Option<String>,
    #[serde(rename = "Cronograma")]
    pub cronograma: String,
    #[serde(rename = "Horario")]
    pub horario: String,
    #[serde(rename = "Turno")]
    pub turno: String,
    #[serde(rename = "ID Colaborador")]
    pub person_id: PersonId,
}

/// The three positional parts of a schedule description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleParts {
    pub cronograma: String,
    pub horario: String,
    pub turno_base: String,
}

impl ScheduleParts {
    /// Split `"cronograma, horario[, turno]"`.
    ///
    /// Without a comma the whole text is the cronograma and horario is
    /// `"N/A"`. Parts are trimmed only when the text was split.
    pub fn parse(description: &str) -> Self {
        if !description.contains(',') {
            return Self {
                cronograma: description.to_string(),
                horario: NOT_AVAILABLE.to_string(),
                turno_base: String::new(),
            };
        }

        let mut parts = description.split(',').map(str::trim);
        Self {
            cronograma: parts.next().unwrap_or_default().to_string(),
            horario: parts.next().unwrap_or_default().to_string(),
            turno_base: parts.next().unwrap_or_default().to_string(),
        }
    }

    /// Shift label: the base shift tagged with the rotation code, if any.
    pub fn turno(&self, rotation: Option<&RotationCode>) -> String {
        match (self.turno_base.is_empty(), rotation) {
            (false, Some(code)) => format!("{} - T:{}", self.turno_base, code),
            (true, Some(code)) => format!("T:{code}"),
            (false, None) => self.turno_base.clone(),
            (true, None) => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Everything a person row links to, already resolved.
#[derive(Debug, Clone, Copy)]
pub struct RecordLinks<'a> {
    pub workplace: Option<&'a Workplace>,
    pub client: Option<&'a Client>,
    pub company: Option<&'a Company>,
    pub career: Option<&'a Career>,
    pub schedule: Option<&'a Schedule>,
    pub situation: &'a Situation,
    pub business_unit: &'a BusinessUnit,
}

/// Build the row from a person and its resolved links. Pure.
pub fn build_record(person: &Person, links: RecordLinks<'_>, rotation: Option<&RotationCode>) -> EmployeeRecord {
    let description = links.schedule.and_then(|s| s.name.as_deref()).unwrap_or_default();
    let parts = ScheduleParts::parse(description);
    let turno = parts.turno(rotation);

    EmployeeRecord {
        enrolment: person.enrolment.clone(),
        name: person.name.clone(),
        cpf: person.cpf.clone(),
        admission_date: person.admission_date.clone(),
        demission_date: person.demission_date.clone(),
        workplace: links
            .workplace
            .and_then(|w| w.name.as_deref())
            .filter(|name| !name.is_empty())
            .map(|name| format!("Posto - {name}")),
        company: links.company.and_then(|c| c.company_name.clone()),
        client: links.client.and_then(|c| c.name.clone()),
        business_unit: links.business_unit.name.clone(),
        career: links.career.and_then(|c| c.name.clone()),
        situation: links.situation.description.clone(),
        cronograma: parts.cronograma,
        horario: parts.horario,
        turno,
        person_id: person.id,
    }
}

/// Composes rows for one run, owning that run's detail caches.
pub struct RecordComposer<'r, 'a, U: ?Sized> {
    session: &'r UpstreamSession<'a, U>,
    caches: &'r ReferenceCaches,
    details: DetailCaches,
}

impl<'r, 'a, U> RecordComposer<'r, 'a, U>
where
    U: UpstreamApi + ?Sized,
{
    pub fn new(session: &'r UpstreamSession<'a, U>, caches: &'r ReferenceCaches) -> Self {
        Self {
            session,
            caches,
            details: DetailCaches::default(),
        }
    }

    pub fn details(&self) -> &DetailCaches {
        &self.details
    }

    /// Compose the row for `person`, preferring override values.
    ///
    /// Only the workplace and rotation code are overridable; company, career
    /// and schedule come from the person's own keys.
    pub async fn compose(&mut self, person: &Person, overrides: &OverrideMaps) -> EmployeeRecord {
        let workplace_id = overrides.workplace_for(person.id).or(person.workplace_id);
        let rotation = overrides
            .rotation_for(person.id)
            .or(person.rotation_code.as_ref());

        let caches = self.caches;
        let workplace = caches.workplace(workplace_id);

        let situation = resolve(
            self.session,
            Resource::PersonSituations,
            &mut self.details.situations,
            person.situation_id,
        )
        .await;
        let business_unit = resolve(
            self.session,
            Resource::BusinessUnits,
            &mut self.details.business_units,
            workplace.and_then(|w| w.business_unit_id),
        )
        .await;

        let links = RecordLinks {
            workplace,
            client: caches.client(workplace.and_then(|w| w.client_id)),
            company: caches.company(person.company_id),
            career: caches.career(person.career_id),
            schedule: caches.schedule(person.schedule_id),
            situation: &situation,
            business_unit: &business_unit,
        };
        build_record(person, links, rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{
        BusinessUnitId, CareerId, ClientId, CompanyId, ScheduleId, SituationId, WorkplaceId,
    };
    use crate::upstream::{AccessToken, InMemoryUpstream};
    use proptest::prelude::*;
    use serde_json::json;

    fn code(c: &str) -> RotationCode {
        RotationCode::new(c)
    }

    fn caches() -> ReferenceCaches {
        let mut caches = ReferenceCaches::default();
        caches.workplaces.insert(
            WorkplaceId::new(10),
            Workplace {
                id: WorkplaceId::new(10),
                name: Some("Centro".into()),
                business_unit_id: Some(BusinessUnitId::new(5)),
                client_id: Some(ClientId::new(3)),
            },
        );
        caches.clients.insert(
            ClientId::new(3),
            Client {
                id: ClientId::new(3),
                name: Some("Banco Azul".into()),
            },
        );
        caches.companies.insert(
            CompanyId::new(1),
            Company {
                id: CompanyId::new(1),
                company_name: Some("Tel Aviv Servicos LTDA".into()),
            },
        );
        caches.careers.insert(
            CareerId::new(4),
            Career {
                id: CareerId::new(4),
                name: Some("Vigilante".into()),
            },
        );
        caches.schedules.insert(
            ScheduleId::new(2),
            Schedule {
                id: ScheduleId::new(2),
                name: Some("A, 08:00-17:00, Manhã".into()),
            },
        );
        caches
    }

    fn person() -> Person {
        Person {
            enrolment: Some("0042".into()),
            name: Some("Ana Lima".into()),
            cpf: Some("11122233344".into()),
            situation_id: Some(SituationId::new(1)),
            workplace_id: Some(WorkplaceId::new(10)),
            schedule_id: Some(ScheduleId::new(2)),
            company_id: Some(CompanyId::new(1)),
            career_id: Some(CareerId::new(4)),
            ..Person::with_id(PersonId::new(42))
        }
    }

    fn upstream() -> InMemoryUpstream {
        InMemoryUpstream::new("t")
            .with_entity(Resource::PersonSituations, 1, json!({"id": 1, "description": "Trabalhando"}))
            .with_entity(Resource::BusinessUnits, 5, json!({"id": 5, "name": "Regional Sul"}))
    }

    #[test]
    fn schedule_with_three_parts() {
        let parts = ScheduleParts::parse("A, 08:00-17:00, Manhã");
        assert_eq!(parts.cronograma, "A");
        assert_eq!(parts.horario, "08:00-17:00");
        assert_eq!(parts.turno(None), "Manhã");
        assert_eq!(parts.turno(Some(&code("3"))), "Manhã - T:3");
    }

    #[test]
    fn schedule_without_comma_keeps_whole_text() {
        let parts = ScheduleParts::parse("12x36");
        assert_eq!(parts.cronograma, "12x36");
        assert_eq!(parts.horario, "N/A");
        assert_eq!(parts.turno_base, "");
    }

    #[test]
    fn turno_fallbacks() {
        let empty = ScheduleParts::parse("");
        assert_eq!(empty.turno(Some(&code("3"))), "T:3");
        assert_eq!(empty.turno(None), "N/A");

        let two = ScheduleParts::parse("B, 19:00-07:00");
        assert_eq!(two.horario, "19:00-07:00");
        assert_eq!(two.turno(None), "N/A");
    }

    #[tokio::test]
    async fn composes_full_record_from_current_state() {
        let api = upstream();
        let session = UpstreamSession::with_token(&api, AccessToken::new("t"), 10);
        let caches = caches();
        let mut composer = RecordComposer::new(&session, &caches);

        let record = composer.compose(&person(), &OverrideMaps::default()).await;

        assert_eq!(record.workplace.as_deref(), Some("Posto - Centro"));
        assert_eq!(record.client.as_deref(), Some("Banco Azul"));
        assert_eq!(record.company.as_deref(), Some("Tel Aviv Servicos LTDA"));
        assert_eq!(record.business_unit.as_deref(), Some("Regional Sul"));
        assert_eq!(record.career.as_deref(), Some("Vigilante"));
        assert_eq!(record.situation.as_deref(), Some("Trabalhando"));
        assert_eq!(record.cronograma, "A");
        assert_eq!(record.turno, "Manhã");
        assert_eq!(record.person_id, PersonId::new(42));
    }

    #[tokio::test]
    async fn workplace_override_replaces_current_workplace() {
        let api = upstream();
        let session = UpstreamSession::with_token(&api, AccessToken::new("t"), 10);
        let mut caches = caches();
        let mut overrides = OverrideMaps::default();
        overrides.workplaces.insert(PersonId::new(42), WorkplaceId::new(99));

        let record = RecordComposer::new(&session, &caches)
            .compose(&person(), &overrides)
            .await;
        assert_eq!(record.workplace, None);
        assert_eq!(record.client, None);
        assert_eq!(record.business_unit, None);

        caches.workplaces.insert(
            WorkplaceId::new(99),
            Workplace {
                id: WorkplaceId::new(99),
                name: Some("Sede".into()),
                business_unit_id: None,
                client_id: None,
            },
        );
        let record = RecordComposer::new(&session, &caches)
            .compose(&person(), &overrides)
            .await;
        assert_eq!(record.workplace.as_deref(), Some("Posto - Sede"));
    }

    #[tokio::test]
    async fn rotation_override_tags_the_shift() {
        let api = upstream();
        let session = UpstreamSession::with_token(&api, AccessToken::new("t"), 10);
        let caches = caches();
        let mut overrides = OverrideMaps::default();
        overrides.schedules.insert(PersonId::new(42), code("3"));
        let current = Person {
            rotation_code: Some(code("1")),
            ..person()
        };

        let record = RecordComposer::new(&session, &caches)
            .compose(&current, &overrides)
            .await;
        assert_eq!(record.turno, "Manhã - T:3");
    }

    #[tokio::test]
    async fn missing_links_never_fail() {
        let api = InMemoryUpstream::new("t");
        let session = UpstreamSession::with_token(&api, AccessToken::new("t"), 10);
        let caches = ReferenceCaches::default();

        let record = RecordComposer::new(&session, &caches)
            .compose(&person(), &OverrideMaps::default())
            .await;

        assert_eq!(record.workplace, None);
        assert_eq!(record.situation, None);
        assert_eq!(record.cronograma, "");
        assert_eq!(record.horario, "N/A");
        assert_eq!(record.turno, "N/A");
    }

    #[tokio::test]
    async fn composing_twice_is_idempotent() {
        let api = upstream();
        let session = UpstreamSession::with_token(&api, AccessToken::new("t"), 10);
        let caches = caches();
        let mut composer = RecordComposer::new(&session, &caches);

        let first = composer.compose(&person(), &OverrideMaps::default()).await;
        let second = composer.compose(&person(), &OverrideMaps::default()).await;

        assert_eq!(first, second);
        assert_eq!(composer.details().situations.len(), 1);
    }

    #[test]
    fn record_serialises_with_panel_columns() {
        let parts = ScheduleParts::parse("");
        let record = EmployeeRecord {
            enrolment: None,
            name: Some("Ana".into()),
            cpf: None,
            admission_date: None,
            demission_date: None,
            workplace: None,
            company: None,
            client: None,
            business_unit: None,
            career: None,
            situation: None,
            cronograma: parts.cronograma,
            horario: parts.horario,
            turno: "N/A".into(),
            person_id: PersonId::new(1),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Nome Colaborador"], "Ana");
        assert_eq!(value["Nome Posto de Trabalho"], serde_json::Value::Null);
        assert_eq!(value["ID Colaborador"], 1);
        assert_eq!(value.as_object().unwrap().len(), 15);
    }

    proptest! {
        /// With three or more parts the third one is always the base shift.
        #[test]
        fn third_part_is_turno_base(
            a in "[A-Za-z0-9 ]{0,8}",
            b in "[A-Za-z0-9: -]{0,8}",
            c in "[A-Za-z0-9 ]{0,8}",
            extra in proptest::collection::vec("[A-Za-z0-9 ]{0,5}", 0..3),
        ) {
            let mut text = format!("{a},{b},{c}");
            for e in &extra {
                text.push(',');
                text.push_str(e);
            }
            let parts = ScheduleParts::parse(&text);
            prop_assert_eq!(parts.cronograma, a.trim());
            prop_assert_eq!(parts.horario, b.trim());
            prop_assert_eq!(parts.turno_base, c.trim());
        }

        /// Without a comma the description is carried over verbatim.
        #[test]
        fn no_comma_keeps_text(text in "[^,]{0,20}") {
            let parts = ScheduleParts::parse(&text);
            prop_assert_eq!(&parts.cronograma, &text);
            prop_assert_eq!(parts.horario, NOT_AVAILABLE);
            prop_assert_eq!(parts.turno_base, "");
        }
    }
}
