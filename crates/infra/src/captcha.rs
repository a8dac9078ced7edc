//! reCAPTCHA verification with a short-lived result cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

pub const RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// How long a verification outcome is reused for the same token.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("captcha verification request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Checks a client-supplied captcha token.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// `Ok(false)` means the provider rejected the token.
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError>;
}

#[async_trait]
impl<V> CaptchaVerifier for Arc<V>
where
    V: CaptchaVerifier + ?Sized,
{
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError> {
        (**self).verify(token).await
    }
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    #[serde(default)]
    success: bool,
}

/// Google reCAPTCHA `siteverify` client.
#[derive(Clone)]
pub struct RecaptchaClient {
    client: Client,
    secret: String,
    endpoint: String,
    timeout: Duration,
}

impl core::fmt::Debug for RecaptchaClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecaptchaClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RecaptchaClient {
    pub fn new(secret: impl Into<String>, timeout: Duration) -> Result<Self, CaptchaError> {
        Ok(Self {
            client: Client::builder().build()?,
            secret: secret.into(),
            endpoint: RECAPTCHA_VERIFY_URL.to_string(),
            timeout,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaClient {
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        let body: SiteVerifyResponse = response.json().await?;
        Ok(body.success)
    }
}

/// Reuses verification outcomes per token for a TTL. Errors are not cached.
pub struct CachedCaptcha<V> {
    inner: V,
    ttl: Duration,
    entries: Mutex<HashMap<String, (bool, Instant)>>,
}

impl<V> CachedCaptcha<V> {
    pub fn new(inner: V) -> Self {
        Self::with_ttl(inner, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(inner: V, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }

    fn cached(&self, token: &str, now: Instant) -> Option<bool> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(token) {
            Some((success, expires_at)) if now < *expires_at => Some(*success),
            Some(_) => {
                entries.remove(token);
                None
            }
            None => None,
        }
    }

    fn remember(&self, token: &str, success: bool, now: Instant) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, (_, expires_at)| now < *expires_at);
            entries.insert(token.to_string(), (success, now + self.ttl));
        }
    }
}

#[async_trait]
impl<V> CaptchaVerifier for CachedCaptcha<V>
where
    V: CaptchaVerifier,
{
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError> {
        if token.is_empty() {
            return Ok(false);
        }
        let now = Instant::now();
        if let Some(success) = self.cached(token, now) {
            tracing::debug!("captcha outcome served from cache");
            return Ok(success);
        }

        let success = self.inner.verify(token).await?;
        self.remember(token, success, now);
        Ok(success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingVerifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CaptchaVerifier for CountingVerifier {
        async fn verify(&self, token: &str) -> Result<bool, CaptchaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(token == "good")
        }
    }

    #[tokio::test]
    async fn repeated_tokens_hit_the_cache() {
        let captcha = CachedCaptcha::new(CountingVerifier::default());

        assert!(captcha.verify("good").await.unwrap());
        assert!(captcha.verify("good").await.unwrap());
        assert!(!captcha.verify("bad").await.unwrap());
        assert!(!captcha.verify("bad").await.unwrap());

        assert_eq!(captcha.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_outcomes_are_verified_again() {
        let captcha = CachedCaptcha::with_ttl(CountingVerifier::default(), Duration::ZERO);

        captcha.verify("good").await.unwrap();
        captcha.verify("good").await.unwrap();

        assert_eq!(captcha.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_token_is_rejected_without_a_call() {
        let captcha = CachedCaptcha::new(CountingVerifier::default());
        assert!(!captcha.verify("").await.unwrap());
        assert_eq!(captcha.inner().calls.load(Ordering::SeqCst), 0);
    }
}
