use std::sync::Arc;

use crate::messaging::EventPublisher;
use crate::metrics::Metrics;
use crate::models::Company;
use crate::store::{CompanyRepository, StoreError};

use super::commands::{decode, CreateCompany, UpdateCompany};
use super::errors::CompanyError;
use super::events::CompanyEvent;
use super::value_objects::CompanyId;

// ============================================================================
// Company Command Handler
// ============================================================================
//
// Orchestrates: Decode → Identify → Validate → Exists/Unique → Persist → Publish
//
// Each stage aborts the request on failure; nothing is written before the
// persist stage. Publishing happens after the write has committed and its
// failure only downgrades the result to `EventDelivery::Degraded`.
//
// ============================================================================

/// What happened to the event that announces a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDelivery {
    HandedOff,
    Degraded,
}

impl EventDelivery {
    pub fn is_degraded(&self) -> bool {
        matches!(self, EventDelivery::Degraded)
    }
}

/// Result of a committed mutation.
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    pub delivery: EventDelivery,
}

pub struct CompanyCommandHandler {
    companies: Arc<dyn CompanyRepository>,
    publisher: Arc<dyn EventPublisher>,
    metrics: Arc<Metrics>,
}

impl CompanyCommandHandler {
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        publisher: Arc<dyn EventPublisher>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            companies,
            publisher,
            metrics,
        }
    }

    pub async fn create(&self, payload: &[u8]) -> Result<Mutation<Company>, CompanyError> {
        let result = self.handle_create(payload).await;
        self.observe("create", &result);
        result
    }

    pub async fn get(&self, raw_id: &str) -> Result<Company, CompanyError> {
        let result = self.handle_get(raw_id).await;
        self.observe("read", &result);
        result
    }

    pub async fn update(&self, raw_id: &str, payload: &[u8]) -> Result<Mutation<Company>, CompanyError> {
        let result = self.handle_update(raw_id, payload).await;
        self.observe("update", &result);
        result
    }

    pub async fn delete(&self, raw_id: &str) -> Result<Mutation<()>, CompanyError> {
        let result = self.handle_delete(raw_id).await;
        self.observe("delete", &result);
        result
    }

    async fn handle_create(&self, payload: &[u8]) -> Result<Mutation<Company>, CompanyError> {
        let request: CreateCompany = decode(payload)?;

        let id = CompanyId::generate();
        let candidate = request.into_new_company(id)?;

        let taken = self
            .companies
            .name_exists(&candidate.name)
            .await
            .map_err(|e| persistence("create", e))?;
        if taken {
            return Err(CompanyError::Conflict(candidate.name));
        }

        let name = candidate.name.clone();
        let company = self
            .companies
            .insert(candidate)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent create of the same name.
                StoreError::UniqueViolation(_) => CompanyError::Conflict(name),
                other => persistence("create", other),
            })?;

        tracing::info!(company_id = %company.id, name = %company.name, "Company created");

        let delivery = self.publish(CompanyEvent::created(company.clone())).await;
        Ok(Mutation { value: company, delivery })
    }

    async fn handle_get(&self, raw_id: &str) -> Result<Company, CompanyError> {
        let id = CompanyId::parse(raw_id)?;

        self.companies
            .find(id.as_uuid())
            .await
            .map_err(|e| persistence("read", e))?
            .ok_or(CompanyError::NotFound(id))
    }

    async fn handle_update(&self, raw_id: &str, payload: &[u8]) -> Result<Mutation<Company>, CompanyError> {
        let request: UpdateCompany = decode(payload)?;
        let id = CompanyId::parse(raw_id)?;
        let changes = request.into_changes()?;

        let exists = self
            .companies
            .exists(id.as_uuid())
            .await
            .map_err(|e| persistence("update", e))?;
        if !exists {
            return Err(CompanyError::NotFound(id));
        }

        let new_name = changes.name.clone();
        let company = self
            .companies
            .update(id.as_uuid(), &changes)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => CompanyError::NotFound(id),
                StoreError::UniqueViolation(_) => match new_name {
                    Some(name) => CompanyError::Conflict(name),
                    None => CompanyError::ConflictingChange,
                },
                other => persistence("update", other),
            })?;

        tracing::info!(company_id = %company.id, "Company updated");

        let delivery = self.publish(CompanyEvent::updated(company.clone())).await;
        Ok(Mutation { value: company, delivery })
    }

    async fn handle_delete(&self, raw_id: &str) -> Result<Mutation<()>, CompanyError> {
        let id = CompanyId::parse(raw_id)?;

        let exists = self
            .companies
            .exists(id.as_uuid())
            .await
            .map_err(|e| persistence("delete", e))?;
        if !exists {
            return Err(CompanyError::NotFound(id));
        }

        self.companies
            .soft_delete(id.as_uuid())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => CompanyError::NotFound(id),
                other => persistence("delete", other),
            })?;

        tracing::info!(company_id = %id, "Company deleted");

        let delivery = self.publish(CompanyEvent::deleted(id)).await;
        Ok(Mutation { value: (), delivery })
    }

    /// Hand the event to the publisher. Never fails the caller.
    async fn publish(&self, event: CompanyEvent) -> EventDelivery {
        let event_type = event.event_type.as_str();
        let key = event.key();

        match self.publisher.publish(event).await {
            Ok(()) => {
                self.metrics.record_event_published(event_type);
                EventDelivery::HandedOff
            }
            Err(e) => {
                self.metrics.record_publish_failure(event_type, e.stage());
                tracing::warn!(
                    event_type,
                    company_id = %key,
                    error = %e,
                    "Event publish failed; mutation kept"
                );
                EventDelivery::Degraded
            }
        }
    }

    fn observe<T>(&self, operation: &'static str, result: &Result<T, CompanyError>) {
        let outcome = match result {
            Ok(_) => "success",
            Err(e) => {
                match e {
                    CompanyError::PersistenceFailed { source, .. } => {
                        tracing::error!(operation, error = %e, cause = %source, "Company command failed");
                    }
                    _ => tracing::debug!(operation, kind = e.kind(), error = %e, "Company command rejected"),
                }
                e.kind()
            }
        };
        self.metrics.record_command(operation, outcome);
    }
}

fn persistence(operation: &'static str, source: StoreError) -> CompanyError {
    CompanyError::PersistenceFailed { operation, source }
}
