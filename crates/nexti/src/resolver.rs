//! On-demand detail resolver for entities that are not bulk-loaded.

use std::hash::Hash;

use serde::de::DeserializeOwned;

use crate::cache::DetailCache;
use crate::upstream::{Resource, UpstreamApi, UpstreamSession};

/// Resolve `id` through `cache`, fetching it at most once per run.
///
/// - no id, or id `0`: empty entity, no call
/// - cached (including cached failures): cached value
/// - otherwise one fetch; success caches the payload, any failure caches the
///   empty entity
pub async fn resolve<K, T, U>(
    session: &UpstreamSession<'_, U>,
    resource: Resource,
    cache: &mut DetailCache<K, T>,
    id: Option<K>,
) -> T
where
    K: Copy + Eq + Hash + Into<i64>,
    T: DeserializeOwned + Default + Clone,
    U: UpstreamApi + ?Sized,
{
    let Some(id) = id.filter(|id| Into::<i64>::into(*id) != 0) else {
        return T::default();
    };
    if let Some(hit) = cache.get(id) {
        return hit.clone();
    }

    let raw_id: i64 = id.into();
    let value = match session.fetch_entity(resource, raw_id).await {
        Ok(payload) => serde_json::from_value::<T>(payload).unwrap_or_else(|err| {
            tracing::warn!(%resource, id = raw_id, error = %err, "undecodable detail payload");
            T::default()
        }),
        Err(err) => {
            tracing::debug!(%resource, id = raw_id, error = %err, "detail lookup failed");
            T::default()
        }
    };
    cache.insert(id, value).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SituationId;
    use crate::model::Situation;
    use crate::upstream::{AccessToken, InMemoryUpstream, UpstreamCall};
    use serde_json::json;

    fn entity_calls(api: &InMemoryUpstream) -> usize {
        api.calls()
            .iter()
            .filter(|c| matches!(c, UpstreamCall::Entity { .. }))
            .count()
    }

    #[tokio::test]
    async fn absent_id_makes_no_call() {
        let api = InMemoryUpstream::new("t");
        let session = UpstreamSession::with_token(&api, AccessToken::new("t"), 10);
        let mut cache: DetailCache<SituationId, Situation> = DetailCache::new();

        let situation = resolve(&session, Resource::PersonSituations, &mut cache, None).await;

        assert_eq!(situation, Situation::default());
        assert_eq!(entity_calls(&api), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn zero_id_is_treated_as_absent() {
        let api = InMemoryUpstream::new("t");
        let session = UpstreamSession::with_token(&api, AccessToken::new("t"), 10);
        let mut cache: DetailCache<SituationId, Situation> = DetailCache::new();

        let situation = resolve(
            &session,
            Resource::PersonSituations,
            &mut cache,
            Some(SituationId::new(0)),
        )
        .await;

        assert_eq!(situation, Situation::default());
        assert_eq!(entity_calls(&api), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn successful_lookup_is_fetched_once() {
        let api = InMemoryUpstream::new("t").with_entity(
            Resource::PersonSituations,
            1,
            json!({ "id": 1, "description": "Ativo" }),
        );
        let session = UpstreamSession::with_token(&api, AccessToken::new("t"), 10);
        let mut cache = DetailCache::new();

        for _ in 0..3 {
            let s: Situation =
                resolve(&session, Resource::PersonSituations, &mut cache, Some(SituationId::new(1))).await;
            assert_eq!(s.description.as_deref(), Some("Ativo"));
        }
        assert_eq!(entity_calls(&api), 1);
    }

    #[tokio::test]
    async fn failed_lookup_is_cached_as_empty() {
        let api = InMemoryUpstream::new("t");
        let session = UpstreamSession::with_token(&api, AccessToken::new("t"), 10);
        let mut cache = DetailCache::new();

        let first: Situation =
            resolve(&session, Resource::PersonSituations, &mut cache, Some(SituationId::new(7))).await;
        let second: Situation =
            resolve(&session, Resource::PersonSituations, &mut cache, Some(SituationId::new(7))).await;

        assert_eq!(first, Situation::default());
        assert_eq!(second, Situation::default());
        assert_eq!(entity_calls(&api), 1);
        assert!(cache.contains(SituationId::new(7)));
    }
}
