//! # Adapter Registry
//!
//! Thread-safe lookup from destination identity to its adapter instance.
//! The orchestrator resolves adapters here at dispatch time, and the
//! validation gate treats a missing registration as a per-part problem.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::adapters::{AdapterCapabilities, DestinationAdapter};
use crate::events::{names, EventPublisher};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no adapter registered for destination '{0}'")]
    NotFound(String),

    #[error("adapter registered an empty destination id")]
    EmptyDestinationId,
}

/// Registration bookkeeping kept alongside each adapter.
#[derive(Clone)]
struct RegisteredAdapter {
    adapter: Arc<dyn DestinationAdapter>,
    registered_at: DateTime<Utc>,
}

/// Summary counts for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_adapters: usize,
    pub with_additional_files: usize,
    pub with_source_urls: usize,
}

/// Destination id → adapter lookup shared by the orchestrator and the
/// validation gate.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Arc<DashMap<String, RegisteredAdapter>>,
    event_publisher: Option<EventPublisher>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that announces registrations on the event channel.
    pub fn with_event_publisher(event_publisher: EventPublisher) -> Self {
        Self {
            adapters: Arc::new(DashMap::new()),
            event_publisher: Some(event_publisher),
        }
    }

    /// Register an adapter under its own destination id.
    ///
    /// Re-registering a destination replaces the previous adapter and warns;
    /// the last registration wins.
    pub async fn register(
        &self,
        adapter: Arc<dyn DestinationAdapter>,
    ) -> Result<(), RegistryError> {
        let destination_id = adapter.destination_id().to_string();
        if destination_id.trim().is_empty() {
            return Err(RegistryError::EmptyDestinationId);
        }

        let previous = self.adapters.insert(
            destination_id.clone(),
            RegisteredAdapter {
                adapter,
                registered_at: Utc::now(),
            },
        );

        if previous.is_some() {
            warn!(destination_id = %destination_id, "Replacing previously registered adapter");
        } else {
            info!(destination_id = %destination_id, "Registered destination adapter");
        }

        if let Some(publisher) = &self.event_publisher {
            let _ = publisher
                .emit(
                    names::ADAPTER_REGISTERED,
                    json!({ "destination_id": destination_id }),
                )
                .await;
        }

        Ok(())
    }

    pub fn get(&self, destination_id: &str) -> Option<Arc<dyn DestinationAdapter>> {
        self.adapters
            .get(destination_id)
            .map(|entry| entry.adapter.clone())
    }

    /// Like [`get`](Self::get) but with a typed error for call sites that
    /// must have an adapter.
    pub fn get_required(
        &self,
        destination_id: &str,
    ) -> Result<Arc<dyn DestinationAdapter>, RegistryError> {
        self.get(destination_id)
            .ok_or_else(|| RegistryError::NotFound(destination_id.to_string()))
    }

    pub fn contains(&self, destination_id: &str) -> bool {
        self.adapters.contains_key(destination_id)
    }

    pub fn capabilities_for(&self, destination_id: &str) -> Option<AdapterCapabilities> {
        self.get(destination_id).map(|a| a.capabilities())
    }

    pub fn destination_ids(&self) -> Vec<String> {
        self.adapters
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn registered_at(&self, destination_id: &str) -> Option<DateTime<Utc>> {
        self.adapters
            .get(destination_id)
            .map(|entry| entry.registered_at)
    }

    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats {
            total_adapters: 0,
            with_additional_files: 0,
            with_source_urls: 0,
        };
        for entry in self.adapters.iter() {
            stats.total_adapters += 1;
            let caps = entry.adapter.capabilities();
            if caps.accepts_additional_files {
                stats.with_additional_files += 1;
            }
            if caps.accepts_source_urls {
                stats.with_source_urls += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LoginStatus, PostData, PostResponse};
    use crate::cancellation::CancellationToken;
    use crate::orchestration::PostResult;
    use async_trait::async_trait;

    struct StubAdapter {
        id: &'static str,
        capabilities: AdapterCapabilities,
    }

    #[async_trait]
    impl DestinationAdapter for StubAdapter {
        fn destination_id(&self) -> &str {
            self.id
        }

        fn capabilities(&self) -> AdapterCapabilities {
            self.capabilities
        }

        async fn check_login_status(&self, account: &str) -> PostResult<LoginStatus> {
            Ok(LoginStatus {
                logged_in: true,
                username: Some(account.to_string()),
            })
        }

        async fn post(
            &self,
            _token: &CancellationToken,
            _data: &PostData,
        ) -> PostResult<PostResponse> {
            Ok(PostResponse {
                posted_to: format!("{}:1", self.id),
                destination_response: None,
            })
        }
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = AdapterRegistry::new();
        registry
            .register(Arc::new(StubAdapter {
                id: "artfort",
                capabilities: AdapterCapabilities::default(),
            }))
            .await
            .unwrap();

        assert!(registry.contains("artfort"));
        assert!(registry.get("artfort").is_some());
        assert!(registry.get("elsewhere").is_none());
        assert!(matches!(
            registry.get_required("elsewhere"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reregistration_replaces() {
        let registry = AdapterRegistry::new();
        for _ in 0..2 {
            registry
                .register(Arc::new(StubAdapter {
                    id: "artfort",
                    capabilities: AdapterCapabilities::default(),
                }))
                .await
                .unwrap();
        }
        assert_eq!(registry.stats().total_adapters, 1);
    }

    #[tokio::test]
    async fn test_stats_count_capabilities() {
        let registry = AdapterRegistry::new();
        registry
            .register(Arc::new(StubAdapter {
                id: "gallery",
                capabilities: AdapterCapabilities {
                    accepts_additional_files: true,
                    ..Default::default()
                },
            }))
            .await
            .unwrap();
        registry
            .register(Arc::new(StubAdapter {
                id: "microblog",
                capabilities: AdapterCapabilities {
                    accepts_source_urls: true,
                    ..Default::default()
                },
            }))
            .await
            .unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_adapters, 2);
        assert_eq!(stats.with_additional_files, 1);
        assert_eq!(stats.with_source_urls, 1);
    }

    #[tokio::test]
    async fn test_registration_event_emitted() {
        let publisher = EventPublisher::new(8);
        let mut rx = publisher.subscribe();
        let registry = AdapterRegistry::with_event_publisher(publisher);

        registry
            .register(Arc::new(StubAdapter {
                id: "artfort",
                capabilities: AdapterCapabilities::default(),
            }))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name, names::ADAPTER_REGISTERED);
        assert_eq!(event.context["destination_id"], "artfort");
    }
}
