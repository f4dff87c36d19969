use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Company, CompanyChanges, NewCompany, User};
use super::{CompanyRepository, StoreError, UserRepository};

// ============================================================================
// In-Memory Store - test double for both repositories
// ============================================================================
//
// Uniqueness is checked under the same lock as the insert, mirroring the
// partial unique index of the Postgres adapter.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryStore {
    companies: Mutex<HashMap<Uuid, Company>>,
    users: Mutex<HashMap<String, User>>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a backend error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Raw lookup that also sees soft-deleted rows.
    pub async fn raw(&self, id: Uuid) -> Option<Company> {
        self.companies.lock().await.get(&id).cloned()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn is_live(company: &Company) -> bool {
    company.deleted_at.is_none()
}

#[async_trait]
impl CompanyRepository for InMemoryStore {
    async fn insert(&self, company: NewCompany) -> Result<Company, StoreError> {
        self.check_available()?;
        let mut companies = self.companies.lock().await;

        if companies.values().any(|c| is_live(c) && c.name == company.name) {
            return Err(StoreError::UniqueViolation("companies_live_name_idx".to_string()));
        }
        if companies.contains_key(&company.id) {
            return Err(StoreError::UniqueViolation("companies_pkey".to_string()));
        }

        let now = Utc::now();
        let stored = Company {
            id: company.id,
            name: company.name,
            description: company.description,
            employees: company.employees,
            registered: company.registered,
            company_type: company.company_type,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        companies.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Company>, StoreError> {
        self.check_available()?;
        let companies = self.companies.lock().await;
        Ok(companies.get(&id).filter(|c| is_live(c)).cloned())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.find(id).await?.is_some())
    }

    async fn name_exists(&self, name: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        let companies = self.companies.lock().await;
        Ok(companies.values().any(|c| is_live(c) && c.name == name))
    }

    async fn update(&self, id: Uuid, changes: &CompanyChanges) -> Result<Company, StoreError> {
        self.check_available()?;
        let mut companies = self.companies.lock().await;

        if let Some(ref name) = changes.name {
            let clash = companies
                .values()
                .any(|c| is_live(c) && c.id != id && &c.name == name);
            if clash {
                return Err(StoreError::UniqueViolation("companies_live_name_idx".to_string()));
            }
        }

        let company = companies
            .get_mut(&id)
            .filter(|c| is_live(c))
            .ok_or(StoreError::NotFound)?;

        changes.apply_to(company);
        // Keep updated_at strictly increasing even on coarse clocks.
        let now = Utc::now();
        company.updated_at = if now > company.updated_at {
            now
        } else {
            company.updated_at + Duration::microseconds(1)
        };
        Ok(company.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_available()?;
        let mut companies = self.companies.lock().await;
        let company = companies
            .get_mut(&id)
            .filter(|c| is_live(c))
            .ok_or(StoreError::NotFound)?;

        company.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        Ok(self.users.lock().await.get(username).cloned())
    }

    async fn create_if_absent(&self, user: User) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut users = self.users.lock().await;
        if users.contains_key(&user.username) {
            return Ok(false);
        }
        users.insert(user.username.clone(), user);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompanyType;

    fn new_company(name: &str) -> NewCompany {
        NewCompany {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            employees: 1,
            registered: true,
            company_type: CompanyType::Cooperative,
        }
    }

    #[tokio::test]
    async fn test_soft_deleted_records_are_invisible_and_free_their_name() {
        let store = InMemoryStore::new();
        let company = store.insert(new_company("Acme")).await.unwrap();

        store.soft_delete(company.id).await.unwrap();

        assert!(store.find(company.id).await.unwrap().is_none());
        assert!(!store.exists(company.id).await.unwrap());
        assert!(!store.name_exists("Acme").await.unwrap());
        assert!(store.raw(company.id).await.unwrap().deleted_at.is_some());
        assert!(store.insert(new_company("Acme")).await.is_ok());
        assert!(matches!(store.soft_delete(company.id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_duplicate_live_name_is_a_unique_violation() {
        let store = InMemoryStore::new();
        store.insert(new_company("Acme")).await.unwrap();

        let result = store.insert(new_company("Acme")).await;
        assert!(matches!(result, Err(StoreError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_unavailable_store_reports_backend_errors() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);

        assert!(matches!(store.find(Uuid::new_v4()).await, Err(StoreError::Database(_))));
        assert!(matches!(
            store.find_by_username("user2").await,
            Err(StoreError::Database(_))
        ));
    }
}
