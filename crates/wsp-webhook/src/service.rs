//! Provider-agnostic wrapper around a [`WebhookProvider`].

use std::sync::Arc;

use crate::{Result, ServiceHealth, WebhookProvider, WebhookRequest, WebhookResponse};

/// Delivers webhooks through whichever [`WebhookProvider`] it was built from.
///
/// This type is cheap to clone and can be shared across threads; it is the
/// shape handed to route handlers and the background scheduler so that the
/// concrete delivery mechanism (reqwest today) stays an implementation detail.
#[derive(Clone)]
pub struct WebhookService {
    provider: Arc<dyn WebhookProvider>,
}

impl WebhookService {
    /// Wraps any [`WebhookProvider`] implementation.
    pub fn new(provider: impl WebhookProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Delivers a webhook request using the underlying provider.
    pub async fn deliver(&self, request: &WebhookRequest) -> Result<WebhookResponse> {
        self.provider.deliver(request).await
    }

    /// Checks whether the underlying provider is healthy.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.provider.health_check().await
    }
}

impl std::fmt::Debug for WebhookService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use url::Url;
    use uuid::Uuid;

    use super::*;
    use crate::{ServiceStatus, WebhookContext};

    struct StubProvider;

    #[async_trait]
    impl WebhookProvider for StubProvider {
        async fn deliver(&self, request: &WebhookRequest) -> Result<WebhookResponse> {
            Ok(WebhookResponse::new(
                request.request_id,
                200,
                jiff::Timestamp::now(),
            ))
        }

        async fn health_check(&self) -> Result<ServiceHealth> {
            Ok(ServiceHealth::healthy())
        }
    }

    #[tokio::test]
    async fn test_service_delegates_to_provider() {
        let service = WebhookService::new(StubProvider);
        let url = Url::parse("https://example.com/webhook").unwrap();
        let request = WebhookRequest::test(url, Uuid::now_v7(), Uuid::now_v7());

        let response = service.deliver(&request).await.unwrap();
        assert!(response.is_success());

        let health = service.health_check().await.unwrap();
        assert_eq!(health.status, ServiceStatus::Healthy);
    }
}
