//! `roster-nexti` - point-in-time employee reporting on top of the Nexti HR API.
//!
//! Nexti only exposes current state plus change-event logs. A report run:
//!
//! 1. bulk-loads reference snapshots into a per-run [`ReferenceCaches`] bundle,
//! 2. optionally reduces transfer events inside a [`ReportWindow`] to
//!    [`OverrideMaps`],
//! 3. composes one flat [`EmployeeRecord`] per active person,
//! 4. moves persons with historical data to the top.
//!
//! Everything network-facing goes through [`UpstreamApi`], so the pipeline can
//! run against [`InMemoryUpstream`] in tests and dev.

pub mod assembler;
pub mod cache;
pub mod composer;
pub mod ids;
pub mod loader;
pub mod model;
pub mod overrides;
pub mod report;
pub mod resolver;
pub mod upstream;
pub mod window;

mod lenient;

pub use assembler::{ActiveSituations, assemble_report, prioritize_overridden};
pub use cache::{DetailCache, DetailCaches, ReferenceCaches};
pub use composer::{EmployeeRecord, RecordComposer, ScheduleParts};
pub use ids::{
    BusinessUnitId, CareerId, ClientId, CompanyId, PersonId, ScheduleId, SituationId, WorkplaceId,
};
pub use model::{
    BusinessUnit, Career, Client, Company, Person, RotationCode, Schedule, ScheduleTransfer,
    Situation, Workplace, WorkplaceTransfer,
};
pub use overrides::{OverrideMaps, extract_overrides};
pub use report::{ReportError, ReportRequest, ReportService, ReportSettings};
pub use upstream::{
    AccessToken, InMemoryUpstream, NextiClient, NextiSettings, Page, PageRequest, Resource,
    TransferKind, UpstreamApi, UpstreamError, UpstreamSession,
};
pub use window::ReportWindow;
