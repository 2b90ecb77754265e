// src/services/appointment_service.rs

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::OfficeStore,
    models::appointment::{Appointment, AppointmentStatus, CreateAppointmentPayload},
};

#[derive(Clone)]
pub struct AppointmentService {
    store: Arc<dyn OfficeStore>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn OfficeStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, payload: CreateAppointmentPayload) -> Result<Appointment, AppError> {
        payload.validate()?;

        let lawyer_active = self
            .store
            .list_users()
            .await?
            .iter()
            .any(|u| u.id == payload.lawyer_id && u.active);
        if !lawyer_active {
            return Err(AppError::UserNotFound(payload.lawyer_id));
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            case_id: payload.case_id,
            client_name: payload.client_name.trim().to_string(),
            lawyer_id: payload.lawyer_id,
            date_time: payload.date_time,
            kind: payload.kind,
            notes: payload.notes,
            status: AppointmentStatus::Scheduled,
            whatsapp_confirmed: false,
            created_at: Utc::now(),
        };
        self.store.save_appointment(&appointment).await?;
        tracing::info!("Agendamento {} criado para {}", appointment.id, appointment.date_time);
        Ok(appointment)
    }

    /// Filtros opcionais por dia e por advogado. Cancelados só com `include_cancelled`.
    pub async fn list(
        &self,
        day: Option<NaiveDate>,
        lawyer_id: Option<Uuid>,
        include_cancelled: bool,
    ) -> Result<Vec<Appointment>, AppError> {
        let mut list = self.store.list_appointments().await?;
        list.retain(|a| {
            day.is_none_or(|d| a.date_time.date() == d)
                && lawyer_id.is_none_or(|l| a.lawyer_id == l)
                && (include_cancelled || a.status == AppointmentStatus::Scheduled)
        });
        list.sort_by_key(|a| a.date_time);
        Ok(list)
    }

    /// Cancelamento lógico: o registro continua na agenda.
    pub async fn cancel(&self, id: Uuid) -> Result<Appointment, AppError> {
        let mut appointment = self.find(id).await?;
        if appointment.status == AppointmentStatus::Cancelled {
            return Ok(appointment);
        }
        appointment.status = AppointmentStatus::Cancelled;
        self.store.save_appointment(&appointment).await?;
        tracing::info!("Agendamento {} cancelado", id);
        Ok(appointment)
    }

    pub async fn confirm_whatsapp(&self, id: Uuid) -> Result<Appointment, AppError> {
        let mut appointment = self.find(id).await?;
        if appointment.status == AppointmentStatus::Cancelled {
            return Err(AppError::field("status", "cancelled", "Agendamento cancelado não pode ser confirmado"));
        }
        appointment.whatsapp_confirmed = true;
        self.store.save_appointment(&appointment).await?;
        Ok(appointment)
    }

    async fn find(&self, id: Uuid) -> Result<Appointment, AppError> {
        self.store.get_appointment(id).await?.ok_or(AppError::AppointmentNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{
        appointment::AppointmentType,
        office::{OfficeUser, UserRole},
    };

    async fn setup() -> (AppointmentService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let lawyer = OfficeUser {
            id: Uuid::new_v4(),
            name: "Dra. Ana".into(),
            email: None,
            role: UserRole::Lawyer,
            active: true,
        };
        store.save_user(&lawyer).await.unwrap();
        (AppointmentService::new(store), lawyer.id)
    }

    fn payload(lawyer_id: Uuid, day: u32) -> CreateAppointmentPayload {
        CreateAppointmentPayload {
            case_id: Some(1),
            client_name: "Maria".into(),
            lawyer_id,
            date_time: NaiveDate::from_ymd_opt(2024, 2, day).unwrap().and_hms_opt(14, 30, 0).unwrap(),
            kind: AppointmentType::InPerson,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_cancel_keeps_record() {
        let (svc, lawyer) = setup().await;
        let a = svc.create(payload(lawyer, 20)).await.unwrap();
        svc.create(payload(lawyer, 21)).await.unwrap();

        svc.cancel(a.id).await.unwrap();
        assert_eq!(svc.list(None, None, false).await.unwrap().len(), 1);
        let all = svc.list(None, None, true).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].status, AppointmentStatus::Cancelled);

        assert!(svc.confirm_whatsapp(a.id).await.is_err());
    }

    #[tokio::test]
    async fn test_filters_and_unknown_lawyer() {
        let (svc, lawyer) = setup().await;
        svc.create(payload(lawyer, 20)).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
        assert_eq!(svc.list(Some(day), Some(lawyer), false).await.unwrap().len(), 1);
        assert!(svc.list(Some(day), Some(Uuid::new_v4()), false).await.unwrap().is_empty());

        assert!(matches!(
            svc.create(payload(Uuid::new_v4(), 20)).await,
            Err(AppError::UserNotFound(_))
        ));
    }
}
