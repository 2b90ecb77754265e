// src/db/memory_repo.rs
//
// Armazenamento em memória: usado quando DATABASE_URL não está definida e
// nos testes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        case_repo::{CaseEvent, CaseStore, EVENT_CHANNEL_CAPACITY},
        office_repo::OfficeStore,
    },
    models::{
        appointment::Appointment,
        case::Case,
        office::{DocumentTemplate, OfficeUser},
        settings::SystemSettings,
    },
};

#[derive(Default)]
struct Inner {
    cases: BTreeMap<i64, Case>,
    appointments: HashMap<Uuid, Appointment>,
    users: HashMap<Uuid, OfficeUser>,
    templates: HashMap<Uuid, DocumentTemplate>,
    settings: SystemSettings,
}

#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    last_id: Arc<AtomicI64>,
    events: broadcast::Sender<CaseEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            last_id: Arc::new(AtomicI64::new(0)),
            events,
        }
    }

    fn bump_sequence(&self, id: i64) {
        self.last_id.fetch_max(id, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaseStore for MemoryStore {
    async fn get_cases(&self) -> Result<Vec<Case>, AppError> {
        Ok(self.inner.read().await.cases.values().cloned().collect())
    }

    async fn get_case(&self, id: i64) -> Result<Option<Case>, AppError> {
        Ok(self.inner.read().await.cases.get(&id).cloned())
    }

    async fn save_case(&self, case: &Case) -> Result<(), AppError> {
        self.inner.write().await.cases.insert(case.id, case.clone());
        self.bump_sequence(case.id);
        let _ = self.events.send(CaseEvent::Saved { case: Box::new(case.clone()) });
        Ok(())
    }

    async fn update_cases_bulk(&self, cases: &[Case]) -> Result<(), AppError> {
        {
            let mut inner = self.inner.write().await;
            for case in cases {
                inner.cases.insert(case.id, case.clone());
                self.bump_sequence(case.id);
            }
        }
        for case in cases {
            let _ = self.events.send(CaseEvent::Saved { case: Box::new(case.clone()) });
        }
        Ok(())
    }

    async fn delete_case(&self, id: i64) -> Result<bool, AppError> {
        let removed = self.inner.write().await.cases.remove(&id).is_some();
        if removed {
            let _ = self.events.send(CaseEvent::Deleted { id });
        }
        Ok(removed)
    }

    async fn next_case_id(&self) -> Result<i64, AppError> {
        Ok(self.last_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn subscribe(&self) -> broadcast::Receiver<CaseEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl OfficeStore for MemoryStore {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, AppError> {
        let mut list: Vec<Appointment> = self.inner.read().await.appointments.values().cloned().collect();
        list.sort_by_key(|a| a.date_time);
        Ok(list)
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, AppError> {
        Ok(self.inner.read().await.appointments.get(&id).cloned())
    }

    async fn save_appointment(&self, appointment: &Appointment) -> Result<(), AppError> {
        self.inner.write().await.appointments.insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<OfficeUser>, AppError> {
        let mut users: Vec<OfficeUser> = self.inner.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn save_user(&self, user: &OfficeUser) -> Result<(), AppError> {
        self.inner.write().await.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<DocumentTemplate>, AppError> {
        let mut templates: Vec<DocumentTemplate> = self.inner.read().await.templates.values().cloned().collect();
        templates.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(templates)
    }

    async fn save_template(&self, template: &DocumentTemplate) -> Result<(), AppError> {
        self.inner.write().await.templates.insert(template.id, template.clone());
        Ok(())
    }

    async fn get_settings(&self) -> Result<SystemSettings, AppError> {
        Ok(self.inner.read().await.settings.clone())
    }

    async fn save_settings(&self, settings: &SystemSettings) -> Result<(), AppError> {
        self.inner.write().await.settings = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workflow::ViewType;
    use chrono::Utc;

    #[tokio::test]
    async fn test_ids_follow_imported_cases() {
        let store = MemoryStore::new();
        assert_eq!(store.next_case_id().await.unwrap(), 1);

        let case = Case::new(40, "Maria", "52998224725", ViewType::Admin, "adm_triagem", Utc::now());
        store.update_cases_bulk(&[case]).await.unwrap();
        assert_eq!(store.next_case_id().await.unwrap(), 41);
    }

    #[tokio::test]
    async fn test_import_after_delete_does_not_reuse_ids() {
        let store = MemoryStore::new();
        let cases: Vec<Case> = (1..=50)
            .map(|id| Case::new(id, "Maria", "52998224725", ViewType::Admin, "adm_triagem", Utc::now()))
            .collect();
        store.update_cases_bulk(&cases).await.unwrap();
        for id in 41..=50 {
            store.delete_case(id).await.unwrap();
        }

        store.update_cases_bulk(&cases[..10]).await.unwrap();
        assert_eq!(store.next_case_id().await.unwrap(), 51);
    }

    #[tokio::test]
    async fn test_subscribers_receive_changes() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        let case = Case::new(1, "Maria", "52998224725", ViewType::Admin, "adm_triagem", Utc::now());
        store.save_case(&case).await.unwrap();
        store.delete_case(1).await.unwrap();

        match rx.recv().await.unwrap() {
            CaseEvent::Saved { case } => assert_eq!(case.id, 1),
            other => panic!("evento inesperado: {other:?}"),
        }
        assert!(matches!(rx.recv().await.unwrap(), CaseEvent::Deleted { id: 1 }));
        assert!(!store.delete_case(1).await.unwrap());
    }
}
