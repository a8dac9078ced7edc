//! Scripted in-memory upstream for tests/dev.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::{AccessToken, Page, PageRequest, Resource, TransferKind, UpstreamApi, UpstreamError};
use crate::window::ReportWindow;

/// A page that either answers with content or fails.
#[derive(Debug, Clone)]
enum ScriptedPage {
    Ok(Page<JsonValue>),
    Fail,
}

/// Record of a call made against [`InMemoryUpstream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamCall {
    Token,
    List { resource: Resource, page: u32 },
    Transfers { kind: TransferKind, page: u32, start: String, finish: String },
    Entity { resource: Resource, id: i64 },
}

/// In-memory [`UpstreamApi`] with scripted pages and a call log.
///
/// Pages past the scripted ones answer as empty last pages. Entity lookups for
/// unknown ids fail with a 404 status.
#[derive(Debug, Default)]
pub struct InMemoryUpstream {
    token: Option<String>,
    lists: HashMap<Resource, Vec<ScriptedPage>>,
    transfers: HashMap<TransferKind, Vec<ScriptedPage>>,
    entities: HashMap<(Resource, i64), JsonValue>,
    calls: Mutex<Vec<UpstreamCall>>,
}

impl InMemoryUpstream {
    /// An upstream that hands out `token` on authentication.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    /// An upstream whose credential exchange always fails.
    pub fn rejecting_credentials() -> Self {
        Self::default()
    }

    /// Append a page to a resource listing.
    pub fn with_list_page(mut self, resource: Resource, content: Vec<JsonValue>, last: bool) -> Self {
        self.lists
            .entry(resource)
            .or_default()
            .push(ScriptedPage::Ok(Page::new(content, last)));
        self
    }

    /// Convenience: the whole listing as a single last page.
    pub fn with_list(self, resource: Resource, content: Vec<JsonValue>) -> Self {
        self.with_list_page(resource, content, true)
    }

    /// Append a failing page to a resource listing.
    pub fn with_failing_list_page(mut self, resource: Resource) -> Self {
        self.lists.entry(resource).or_default().push(ScriptedPage::Fail);
        self
    }

    pub fn with_transfer_page(mut self, kind: TransferKind, content: Vec<JsonValue>, last: bool) -> Self {
        self.transfers
            .entry(kind)
            .or_default()
            .push(ScriptedPage::Ok(Page::new(content, last)));
        self
    }

    pub fn with_failing_transfer_page(mut self, kind: TransferKind) -> Self {
        self.transfers.entry(kind).or_default().push(ScriptedPage::Fail);
        self
    }

    /// Register a single entity (the unwrapped `value` payload).
    pub fn with_entity(mut self, resource: Resource, id: i64, value: JsonValue) -> Self {
        self.entities.insert((resource, id), value);
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<UpstreamCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, call: UpstreamCall) {
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
    }

    fn answer(pages: Option<&Vec<ScriptedPage>>, request: PageRequest) -> Result<Page<JsonValue>, UpstreamError> {
        match pages.and_then(|p| p.get(request.page as usize)) {
            Some(ScriptedPage::Ok(page)) => Ok(page.clone()),
            Some(ScriptedPage::Fail) => Err(UpstreamError::Unavailable(format!(
                "scripted failure on page {}",
                request.page
            ))),
            None => Ok(Page::empty()),
        }
    }
}

#[async_trait]
impl UpstreamApi for InMemoryUpstream {
    async fn access_token(&self) -> Result<AccessToken, UpstreamError> {
        self.record(UpstreamCall::Token);
        self.token
            .clone()
            .map(AccessToken::new)
            .ok_or(UpstreamError::Status { status: 401 })
    }

    async fn list_page(
        &self,
        _token: &AccessToken,
        resource: Resource,
        request: PageRequest,
    ) -> Result<Page<JsonValue>, UpstreamError> {
        self.record(UpstreamCall::List {
            resource,
            page: request.page,
        });
        Self::answer(self.lists.get(&resource), request)
    }

    async fn transfer_page(
        &self,
        _token: &AccessToken,
        kind: TransferKind,
        window: &ReportWindow,
        request: PageRequest,
    ) -> Result<Page<JsonValue>, UpstreamError> {
        self.record(UpstreamCall::Transfers {
            kind,
            page: request.page,
            start: window.start_stamp(),
            finish: window.finish_stamp(),
        });
        Self::answer(self.transfers.get(&kind), request)
    }

    async fn fetch_entity(
        &self,
        _token: &AccessToken,
        resource: Resource,
        id: i64,
    ) -> Result<JsonValue, UpstreamError> {
        self.record(UpstreamCall::Entity { resource, id });
        self.entities
            .get(&(resource, id))
            .cloned()
            .ok_or(UpstreamError::Status { status: 404 })
    }
}
