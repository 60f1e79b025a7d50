use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{Owned, Role};
use crate::database::manager::DatabaseError;
use crate::database::models::{Service, User};
use crate::database::repository::{
    OwnedRepository, Page, Record, Repository, ServiceRepository, UserRepository,
};

/// In-process table used for tests and `memory://` development runs.
pub struct MemoryRepository<T> {
    rows: Arc<RwLock<Vec<T>>>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_unique<T: Record>(rows: &[T], record: &T) -> Result<(), DatabaseError> {
    rows.iter()
        .filter(|row| row.id() != record.id())
        .find_map(|row| record.clashes_with(row))
        .map_or(Ok(()), |clash| Err(DatabaseError::Conflict(clash)))
}

fn newest_first<T: Record>(rows: &mut [T]) {
    rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(a.id().cmp(&b.id())));
}

fn paginate<T: Record>(mut rows: Vec<T>, page: Page) -> Vec<T> {
    newest_first(&mut rows);
    rows.into_iter()
        .skip(page.skip as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn fetch_by_id(&self, id: Uuid) -> Result<T, DatabaseError> {
        let rows = self.rows.read().await;
        rows.iter()
            .find(|row| row.id() == id)
            .cloned()
            .ok_or_else(T::not_found)
    }

    async fn list(&self, page: Page) -> Result<Vec<T>, DatabaseError> {
        let rows = self.rows.read().await.clone();
        Ok(paginate(rows, page))
    }

    async fn insert(&self, record: &T) -> Result<(), DatabaseError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.id() == record.id()) {
            return Err(DatabaseError::Conflict(format!("{} {} already exists", T::LABEL, record.id())));
        }
        check_unique(&rows, record)?;
        rows.push(record.clone());
        Ok(())
    }

    async fn save(&self, record: &T) -> Result<(), DatabaseError> {
        let mut rows = self.rows.write().await;
        check_unique(&rows, record)?;
        let slot = rows
            .iter_mut()
            .find(|row| row.id() == record.id())
            .ok_or_else(T::not_found)?;
        *slot = record.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            return Err(T::not_found());
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.rows.read().await.len() as i64)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|row| row.created_at() >= since).count() as i64)
    }
}

#[async_trait]
impl<T: Record + Owned> OwnedRepository<T> for MemoryRepository<T> {
    async fn list_by_owner(&self, owner_id: Uuid, page: Page) -> Result<Vec<T>, DatabaseError> {
        let rows: Vec<T> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|row| row.owner_id() == owner_id)
            .cloned()
            .collect();
        Ok(paginate(rows, page))
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<u64, DatabaseError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.owner_id() != owner_id);
        Ok((before - rows.len()) as u64)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository<User> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let wanted = email.to_lowercase();
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|u| u.email.to_lowercase() == wanted).cloned())
    }

    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(Role::ALL
            .into_iter()
            .map(|role| (role, rows.iter().filter(|u| u.role == role).count() as i64))
            .filter(|(_, n)| *n > 0)
            .collect())
    }
}

#[async_trait]
impl ServiceRepository for MemoryRepository<Service> {
    async fn count_by_service_type(&self) -> Result<Vec<(String, i64)>, DatabaseError> {
        let rows = self.rows.read().await;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for service in rows.iter() {
            *counts.entry(service.service_type.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{RepairRequest, RepairRequestCreate, ServiceCreate, UserCreate};
    use chrono::Duration;

    fn account(email: &str) -> User {
        UserCreate {
            email: email.to_string(),
            password: "hunter22".to_string(),
            first_name: "Pat".to_string(),
            last_name: "Lee".to_string(),
            role: Role::User,
            service_type: None,
            experience: None,
            contact_info: None,
            company_name: None,
            team_size: None,
        }
        .into_user("hash".to_string())
    }

    fn request(owner: Uuid, title: &str, age_minutes: i64) -> RepairRequest {
        let mut record = RepairRequestCreate {
            title: title.to_string(),
            description: Some("details".to_string()),
            voice_file: None,
        }
        .into_record(owner);
        record.created_at = Utc::now() - Duration::minutes(age_minutes);
        record
    }

    #[tokio::test]
    async fn fetch_missing_is_not_found() {
        let repo = MemoryRepository::<RepairRequest>::new();
        let err = repo.fetch_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(ref msg) if msg == "Repair request not found"));
    }

    #[tokio::test]
    async fn lists_newest_first_with_paging() {
        let repo = MemoryRepository::<RepairRequest>::new();
        let owner = Uuid::new_v4();
        for (title, age) in [("old", 30), ("new", 1), ("mid", 10)] {
            repo.insert(&request(owner, title, age)).await.unwrap();
        }

        let titles: Vec<String> = repo
            .list(Page::first(10))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, ["new", "mid", "old"]);

        let second = repo.list(Page::new(1, 1)).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "mid");
    }

    #[tokio::test]
    async fn owner_scoped_listing_and_cascade() {
        let repo = MemoryRepository::<RepairRequest>::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        repo.insert(&request(alice, "a1", 2)).await.unwrap();
        repo.insert(&request(alice, "a2", 1)).await.unwrap();
        repo.insert(&request(bob, "b1", 1)).await.unwrap();

        assert_eq!(repo.list_by_owner(alice, Page::first(10)).await.unwrap().len(), 2);
        assert_eq!(repo.delete_by_owner(alice).await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn save_and_delete_require_existing_rows() {
        let repo = MemoryRepository::<RepairRequest>::new();
        let record = request(Uuid::new_v4(), "ghost", 0);
        assert!(matches!(repo.save(&record).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(repo.delete(record.id).await, Err(DatabaseError::NotFound(_))));

        repo.insert(&record).await.unwrap();
        assert!(matches!(repo.insert(&record).await, Err(DatabaseError::Conflict(_))));
        repo.delete(record.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn emails_are_unique_under_the_write_lock() {
        let repo = MemoryRepository::<User>::new();
        let first = account("pat@example.com");
        repo.insert(&first).await.unwrap();

        let err = repo.insert(&account("PAT@example.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(ref msg) if msg.contains("already registered")));

        let other = account("sam@example.com");
        repo.insert(&other).await.unwrap();

        // re-saving a row keeps its own email
        repo.save(&first).await.unwrap();

        let mut renamed = other.clone();
        renamed.email = "pat@example.com".to_string();
        assert!(matches!(repo.save(&renamed).await, Err(DatabaseError::Conflict(_))));
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn counts_recent_records() {
        let repo = MemoryRepository::<RepairRequest>::new();
        let owner = Uuid::new_v4();
        repo.insert(&request(owner, "recent", 60)).await.unwrap();
        repo.insert(&request(owner, "ancient", 60 * 24 * 45)).await.unwrap();

        let since = Utc::now() - Duration::days(30);
        assert_eq!(repo.count_since(since).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn groups_services_by_type() {
        let repo = MemoryRepository::<Service>::new();
        let provider = Uuid::new_v4();
        for kind in ["plumbing", "electrical", "plumbing"] {
            let service = ServiceCreate {
                name: format!("{kind} service"),
                service_type: kind.to_string(),
                description: "desc".to_string(),
                contact_info: "555-0100".to_string(),
            }
            .into_record(provider);
            repo.insert(&service).await.unwrap();
        }

        let counts = repo.count_by_service_type().await.unwrap();
        assert_eq!(
            counts,
            vec![("electrical".to_string(), 1), ("plumbing".to_string(), 2)]
        );
    }
}
