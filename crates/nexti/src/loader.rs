//! Reference cache loader: drains paginated upstream listings.

use std::collections::HashMap;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use roster_core::Entity;

use crate::cache::ReferenceCaches;
use crate::model::{Career, Client, Company, Person, Schedule, Workplace};
use crate::upstream::{Page, PageRequest, Resource, UpstreamApi, UpstreamError, UpstreamSession};

/// Items gathered from a paginated stream, plus how the stream ended.
#[derive(Debug)]
pub struct Drained {
    pub items: Vec<JsonValue>,
    pub pages: u32,
    /// `None` when the stream ended cleanly (empty page or `last`), otherwise
    /// the error that interrupted it.
    pub interrupted_by: Option<UpstreamError>,
}

impl Drained {
    pub fn exhausted_cleanly(&self) -> bool {
        self.interrupted_by.is_none()
    }
}

/// Fetch pages until an empty page, a `last` page, or the first failure.
///
/// Nothing is retried: a failure keeps everything gathered before it.
pub async fn drain_pages<F, Fut>(first: PageRequest, mut fetch: F) -> Drained
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<JsonValue>, UpstreamError>>,
{
    let mut items = Vec::new();
    let mut request = first;
    let mut pages = 0;

    loop {
        let page = match fetch(request).await {
            Ok(page) => page,
            Err(err) => {
                return Drained {
                    items,
                    pages,
                    interrupted_by: Some(err),
                };
            }
        };

        if page.content.is_empty() {
            break;
        }
        pages += 1;
        items.extend(page.content);
        if page.last {
            break;
        }
        request = request.next();
    }

    Drained {
        items,
        pages,
        interrupted_by: None,
    }
}

/// Decode items into `T`, keyed by id. Undecodable items are skipped.
fn index_by_id<T>(resource: Resource, items: Vec<JsonValue>) -> HashMap<T::Id, T>
where
    T: Entity + DeserializeOwned,
{
    let mut map = HashMap::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<T>(item) {
            Ok(entity) => {
                map.insert(entity.id(), entity);
            }
            Err(err) => {
                tracing::warn!(%resource, error = %err, "skipping undecodable item");
            }
        }
    }
    map
}

/// Load a whole listing, degrading to a partial snapshot on failure.
pub async fn load_all<T, U>(session: &UpstreamSession<'_, U>, resource: Resource) -> HashMap<T::Id, T>
where
    T: Entity + DeserializeOwned,
    U: UpstreamApi + ?Sized,
{
    let drained = drain_pages(session.first_page(), move |req| session.list_page(resource, req)).await;
    if let Some(err) = &drained.interrupted_by {
        tracing::warn!(
            %resource,
            pages = drained.pages,
            items = drained.items.len(),
            error = %err,
            "listing interrupted; keeping partial snapshot"
        );
    }

    let map = index_by_id::<T>(resource, drained.items);
    tracing::info!(%resource, entries = map.len(), "reference cache loaded");
    map
}

/// Load a whole listing; any page failure is returned as an error.
pub async fn load_all_strict<T, U>(
    session: &UpstreamSession<'_, U>,
    resource: Resource,
) -> Result<HashMap<T::Id, T>, UpstreamError>
where
    T: Entity + DeserializeOwned,
    U: UpstreamApi + ?Sized,
{
    let drained = drain_pages(session.first_page(), move |req| session.list_page(resource, req)).await;
    if let Some(err) = drained.interrupted_by {
        return Err(err);
    }

    let map = index_by_id::<T>(resource, drained.items);
    tracing::info!(%resource, entries = map.len(), "reference cache loaded");
    Ok(map)
}

/// Fill every bulk cache for one run.
///
/// Persons are the report universe, so their listing must succeed; every other
/// category degrades to whatever it managed to load.
pub async fn load_reference_caches<U>(
    session: &UpstreamSession<'_, U>,
) -> Result<ReferenceCaches, UpstreamError>
where
    U: UpstreamApi + ?Sized,
{
    let persons = load_all_strict::<Person, _>(session, Resource::Persons).await?;
    Ok(ReferenceCaches {
        persons,
        workplaces: load_all::<Workplace, _>(session, Resource::Workplaces).await,
        companies: load_all::<Company, _>(session, Resource::Companies).await,
        clients: load_all::<Client, _>(session, Resource::Clients).await,
        careers: load_all::<Career, _>(session, Resource::Careers).await,
        schedules: load_all::<Schedule, _>(session, Resource::Schedules).await,
    })
}
