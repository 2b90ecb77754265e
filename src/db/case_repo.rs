// src/db/case_repo.rs

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{types::Json, PgPool};
use tokio::sync::broadcast;

use crate::{common::error::AppError, models::case::Case};

// Teto de escrita em lote do armazenamento original era 500; fica uma margem
pub const BULK_CHUNK_SIZE: usize = 450;
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

// Só avança: ids já entregues por nextval ou de casos apagados não voltam
const SYNC_CASE_SEQUENCE: &str = "SELECT setval('case_id_seq', GREATEST(\
    (SELECT COALESCE(MAX(id), 0) FROM cases), \
    (SELECT last_value FROM case_id_seq), 1))";

/// Mudança publicada para quem acompanha os casos em tempo real.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseEvent {
    Saved { case: Box<Case> },
    Deleted { id: i64 },
}

/// Persistência de casos. O motor de fluxo só conhece esta interface.
#[async_trait]
pub trait CaseStore: Send + Sync {
    async fn get_cases(&self) -> Result<Vec<Case>, AppError>;
    async fn get_case(&self, id: i64) -> Result<Option<Case>, AppError>;
    async fn save_case(&self, case: &Case) -> Result<(), AppError>;
    async fn update_cases_bulk(&self, cases: &[Case]) -> Result<(), AppError>;
    async fn delete_case(&self, id: i64) -> Result<bool, AppError>;
    async fn next_case_id(&self) -> Result<i64, AppError>;
    /// Assinatura de mudanças. Soltar o receiver cancela a assinatura.
    fn subscribe(&self) -> broadcast::Receiver<CaseEvent>;
}

// O repositório de casos em PostgreSQL: um documento JSONB por caso
#[derive(Clone)]
pub struct PgCaseRepository {
    pool: PgPool,
    events: broadcast::Sender<CaseEvent>,
}

impl PgCaseRepository {
    pub fn new(pool: PgPool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { pool, events }
    }

    fn publish(&self, event: CaseEvent) {
        // Sem assinantes o envio falha, o que é normal
        let _ = self.events.send(event);
    }
}

const UPSERT_CASE: &str = r#"
    INSERT INTO cases (id, view, column_id, data, updated_at)
    VALUES ($1, $2, $3, $4, NOW())
    ON CONFLICT (id)
    DO UPDATE SET
        view = EXCLUDED.view,
        column_id = EXCLUDED.column_id,
        data = EXCLUDED.data,
        updated_at = NOW()
"#;

#[async_trait]
impl CaseStore for PgCaseRepository {
    async fn get_cases(&self) -> Result<Vec<Case>, AppError> {
        let rows = sqlx::query_as::<_, (Json<Case>,)>("SELECT data FROM cases ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(Json(case),)| case).collect())
    }

    async fn get_case(&self, id: i64) -> Result<Option<Case>, AppError> {
        let row = sqlx::query_as::<_, (Json<Case>,)>("SELECT data FROM cases WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(case),)| case))
    }

    async fn save_case(&self, case: &Case) -> Result<(), AppError> {
        sqlx::query(UPSERT_CASE)
            .bind(case.id)
            .bind(case.view.as_str())
            .bind(&case.column_id)
            .bind(Json(case))
            .execute(&self.pool)
            .await?;
        self.publish(CaseEvent::Saved { case: Box::new(case.clone()) });
        Ok(())
    }

    async fn update_cases_bulk(&self, cases: &[Case]) -> Result<(), AppError> {
        for chunk in cases.chunks(BULK_CHUNK_SIZE) {
            let mut tx = self.pool.begin().await?;
            for case in chunk {
                sqlx::query(UPSERT_CASE)
                    .bind(case.id)
                    .bind(case.view.as_str())
                    .bind(&case.column_id)
                    .bind(Json(case))
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
            tracing::debug!("Lote de {} casos gravado", chunk.len());
        }

        // Importações trazem ids próprios; a sequência precisa andar junto
        sqlx::query(SYNC_CASE_SEQUENCE)
            .execute(&self.pool)
            .await?;

        for case in cases {
            self.publish(CaseEvent::Saved { case: Box::new(case.clone()) });
        }
        Ok(())
    }

    async fn delete_case(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            self.publish(CaseEvent::Deleted { id });
        }
        Ok(deleted)
    }

    async fn next_case_id(&self) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT nextval('case_id_seq')")
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    fn subscribe(&self) -> broadcast::Receiver<CaseEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_sync_never_goes_back() {
        assert!(SYNC_CASE_SEQUENCE.contains("last_value FROM case_id_seq"));
        assert!(SYNC_CASE_SEQUENCE.contains("MAX(id)"));
    }
}
