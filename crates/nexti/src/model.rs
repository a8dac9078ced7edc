//! Typed views of the Nexti payloads this crate consumes.
//!
//! Upstream entities are loosely shaped JSON; every field that may be missing
//! is an `Option`. Unknown fields are ignored.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use roster_core::Entity;

use crate::ids::{
    BusinessUnitId, CareerId, ClientId, CompanyId, PersonId, ScheduleId, SituationId, WorkplaceId,
};
use crate::lenient;

/// Shift rotation code ("turno").
///
/// Nexti sends it as a number on persons and sometimes as text on transfers,
/// so it is normalised to its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RotationCode(String);

impl RotationCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RotationCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RotationCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        lenient::string(deserializer).map(Self)
    }
}

/// Collaborator snapshot (`/persons/all`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub enrolment: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub cpf: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub admission_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub demission_date: Option<String>,
    #[serde(default, rename = "personSituationId")]
    pub situation_id: Option<SituationId>,
    #[serde(default)]
    pub workplace_id: Option<WorkplaceId>,
    #[serde(default)]
    pub schedule_id: Option<ScheduleId>,
    #[serde(default)]
    pub rotation_code: Option<RotationCode>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub career_id: Option<CareerId>,
}

impl Person {
    /// A person with only an id; handy as a base for struct-update syntax.
    pub fn with_id(id: PersonId) -> Self {
        Self {
            id,
            enrolment: None,
            name: None,
            cpf: None,
            admission_date: None,
            demission_date: None,
            situation_id: None,
            workplace_id: None,
            schedule_id: None,
            rotation_code: None,
            company_id: None,
            career_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workplace {
    pub id: WorkplaceId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub business_unit_id: Option<BusinessUnitId>,
    #[serde(default)]
    pub client_id: Option<ClientId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Career {
    pub id: CareerId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Work schedule. `name` is the composite "cronograma, horario, turno" text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Person situation, fetched one at a time from `/personSituations/{id}`.
///
/// `Default` is the empty entity cached for failed lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Situation {
    #[serde(default)]
    pub id: Option<SituationId>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Business unit, fetched one at a time from `/businessUnits/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessUnit {
    #[serde(default)]
    pub id: Option<BusinessUnitId>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A person moved to another workplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkplaceTransfer {
    #[serde(default)]
    pub person_id: Option<PersonId>,
    #[serde(default)]
    pub workplace_id: Option<WorkplaceId>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub transfer_date_time: Option<String>,
}

impl WorkplaceTransfer {
    /// Parsed transfer timestamp; `None` when absent or in an unknown format.
    pub fn occurred_at(&self) -> Option<NaiveDateTime> {
        let raw = self.transfer_date_time.as_deref()?.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.naive_utc());
        }
        if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Some(ts.naive_utc());
        }
        ["%d%m%Y%H%M%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }

    /// Ordering key: parsed timestamp first, raw text as tie-breaker.
    pub fn chronology(&self) -> (Option<NaiveDateTime>, Option<&str>) {
        (self.occurred_at(), self.transfer_date_time.as_deref())
    }
}

/// A person moved to another shift rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTransfer {
    #[serde(default)]
    pub person_id: Option<PersonId>,
    #[serde(default)]
    pub rotation_code: Option<RotationCode>,
}

macro_rules! impl_entity {
    ($t:ty, $id:ty) => {
        impl Entity for $t {
            type Id = $id;

            fn id(&self) -> Self::Id {
                self.id
            }
        }
    };
}

impl_entity!(Person, PersonId);
impl_entity!(Workplace, WorkplaceId);
impl_entity!(Company, CompanyId);
impl_entity!(Client, ClientId);
impl_entity!(Career, CareerId);
impl_entity!(Schedule, ScheduleId);
