//! Identifiers of upstream (Nexti) entities.
//!
//! Nexti uses numeric ids everywhere; the newtypes keep a workplace id from
//! being looked up in the company cache by accident.

use serde::{Deserialize, Serialize};

macro_rules! nexti_id {
    ($(#[$meta:meta])* $t:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $t(i64);

        impl $t {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

nexti_id!(
    /// Collaborator (employee) id.
    PersonId
);
nexti_id!(
    /// Workplace ("posto de trabalho") id.
    WorkplaceId
);
nexti_id!(CompanyId);
nexti_id!(ClientId);
nexti_id!(CareerId);
nexti_id!(ScheduleId);
nexti_id!(
    /// Person situation id (active, on leave, dismissed, ...).
    SituationId
);
nexti_id!(BusinessUnitId);
