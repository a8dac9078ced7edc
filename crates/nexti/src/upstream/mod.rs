//! Upstream (Nexti) boundary.
//!
//! The report pipeline only talks to [`UpstreamApi`]; [`NextiClient`] is the
//! HTTP implementation and [`InMemoryUpstream`] the scripted one for tests/dev.

mod http;
mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::window::ReportWindow;

pub use http::{NextiClient, NextiSettings};
pub use in_memory::{InMemoryUpstream, UpstreamCall};

/// Default page size for list and event endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

/// Bearer token obtained from the client-credentials exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Upstream resources addressable by list or by id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Persons,
    Workplaces,
    Companies,
    Clients,
    Careers,
    Schedules,
    PersonSituations,
    BusinessUnits,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Persons => "persons",
            Resource::Workplaces => "workplaces",
            Resource::Companies => "companies",
            Resource::Clients => "clients",
            Resource::Careers => "careers",
            Resource::Schedules => "schedules",
            Resource::PersonSituations => "personSituations",
            Resource::BusinessUnits => "businessUnits",
        }
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path())
    }
}

/// Windowed change-event streams.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransferKind {
    Workplace,
    Schedule,
}

impl TransferKind {
    pub fn path(self) -> &'static str {
        match self {
            TransferKind::Workplace => "workplacetransfers",
            TransferKind::Schedule => "scheduletransfers",
        }
    }
}

/// Page/size/sort parameters of a paginated request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: &'static str,
}

impl PageRequest {
    pub fn first(size: u32) -> Self {
        Self {
            page: 0,
            size,
            sort: "id,asc",
        }
    }

    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}

/// One page of a Spring-style paginated response.
///
/// A missing `last` flag is read as "this is the last page".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default = "last_by_default")]
    pub last: bool,
}

fn last_by_default() -> bool {
    true
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, last: bool) -> Self {
        Self { content, last }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), true)
    }
}

/// Upstream call failure.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status}")]
    Status { status: u16 },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("token response did not contain an access token")]
    MissingToken,

    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

/// Narrow contract the report pipeline needs from Nexti.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// Client-credentials exchange. Never cached across report runs.
    async fn access_token(&self) -> Result<AccessToken, UpstreamError>;

    /// One page of `/{resource}/all`.
    async fn list_page(
        &self,
        token: &AccessToken,
        resource: Resource,
        request: PageRequest,
    ) -> Result<Page<JsonValue>, UpstreamError>;

    /// One page of transfer events inside `window`.
    async fn transfer_page(
        &self,
        token: &AccessToken,
        kind: TransferKind,
        window: &ReportWindow,
        request: PageRequest,
    ) -> Result<Page<JsonValue>, UpstreamError>;

    /// Single entity by id, already unwrapped from its `value` envelope.
    async fn fetch_entity(
        &self,
        token: &AccessToken,
        resource: Resource,
        id: i64,
    ) -> Result<JsonValue, UpstreamError>;
}

#[async_trait]
impl<S> UpstreamApi for Arc<S>
where
    S: UpstreamApi + ?Sized,
{
    async fn access_token(&self) -> Result<AccessToken, UpstreamError> {
        (**self).access_token().await
    }

    async fn list_page(
        &self,
        token: &AccessToken,
        resource: Resource,
        request: PageRequest,
    ) -> Result<Page<JsonValue>, UpstreamError> {
        (**self).list_page(token, resource, request).await
    }

    async fn transfer_page(
        &self,
        token: &AccessToken,
        kind: TransferKind,
        window: &ReportWindow,
        request: PageRequest,
    ) -> Result<Page<JsonValue>, UpstreamError> {
        (**self).transfer_page(token, kind, window, request).await
    }

    async fn fetch_entity(
        &self,
        token: &AccessToken,
        resource: Resource,
        id: i64,
    ) -> Result<JsonValue, UpstreamError> {
        (**self).fetch_entity(token, resource, id).await
    }
}

/// An authenticated view of the upstream for the duration of one report run.
pub struct UpstreamSession<'a, U: ?Sized> {
    api: &'a U,
    token: AccessToken,
    page_size: u32,
}

impl<'a, U> UpstreamSession<'a, U>
where
    U: UpstreamApi + ?Sized,
{
    /// Acquire a fresh token. Failure here is fatal to the run.
    pub async fn open(api: &'a U, page_size: u32) -> Result<Self, UpstreamError> {
        let token = api.access_token().await?;
        Ok(Self {
            api,
            token,
            page_size,
        })
    }

    pub fn with_token(api: &'a U, token: AccessToken, page_size: u32) -> Self {
        Self {
            api,
            token,
            page_size,
        }
    }

    pub fn first_page(&self) -> PageRequest {
        PageRequest::first(self.page_size)
    }

    pub async fn list_page(
        &self,
        resource: Resource,
        request: PageRequest,
    ) -> Result<Page<JsonValue>, UpstreamError> {
        self.api.list_page(&self.token, resource, request).await
    }

    pub async fn transfer_page(
        &self,
        kind: TransferKind,
        window: &ReportWindow,
        request: PageRequest,
    ) -> Result<Page<JsonValue>, UpstreamError> {
        self.api.transfer_page(&self.token, kind, window, request).await
    }

    pub async fn fetch_entity(&self, resource: Resource, id: i64) -> Result<JsonValue, UpstreamError> {
        self.api.fetch_entity(&self.token, resource, id).await
    }
}
