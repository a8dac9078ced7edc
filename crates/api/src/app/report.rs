//! Employee report access for authenticated panel users.

use roster_auth::Principal;
use roster_nexti::{EmployeeRecord, ReportRequest, ReportService, UpstreamApi};

use crate::app::api_key::ApiKeyGuard;
use crate::app::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct ReportEndpoint<U> {
    service: ReportService<U>,
}

impl<U> ReportEndpoint<U>
where
    U: UpstreamApi,
{
    pub fn new(service: ReportService<U>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ReportService<U> {
        &self.service
    }

    pub async fn employees(
        &self,
        principal: &Principal,
        request: &ReportRequest,
    ) -> Result<Vec<EmployeeRecord>, ServiceError> {
        tracing::info!(
            actor = %principal.user_id,
            start = request.start.as_deref().unwrap_or_default(),
            finish = request.finish.as_deref().unwrap_or_default(),
            "employee report requested"
        );
        Ok(self.service.generate(request).await?)
    }
}

/// Current-state report for the spreadsheet sync, behind a shared key.
#[derive(Debug, Clone)]
pub struct SheetSyncEndpoint<U> {
    guard: ApiKeyGuard,
    service: ReportService<U>,
}

impl<U> SheetSyncEndpoint<U>
where
    U: UpstreamApi,
{
    pub fn new(guard: ApiKeyGuard, service: ReportService<U>) -> Self {
        Self { guard, service }
    }

    /// `api_key` is the raw `X-API-KEY` header value.
    pub async fn sync(&self, api_key: Option<&str>) -> Result<Vec<EmployeeRecord>, ServiceError> {
        self.guard.check(api_key)?;
        tracing::info!("sheet sync authorized");
        Ok(self.service.generate(&ReportRequest::current_state()).await?)
    }
}
