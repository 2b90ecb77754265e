// src/services/column_graph.rs

use crate::{
    common::error::AppError,
    models::workflow::{ColumnDefinition, ColumnKind, ViewType, WorkflowConfig},
};

/// Onde o caso vai parar depois de um drop, já com zonas resolvidas.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub view: ViewType,
    pub column_id: String,
    /// Zona usada como alvo do drop, se houver.
    pub zone_id: Option<String>,
    pub tasks_to_add: Vec<String>,
}

/// Colunas de uma visão: comuns (ordenadas) seguidas das zonas.
pub fn columns_for_view(config: &WorkflowConfig, view: ViewType) -> Vec<&ColumnDefinition> {
    config.columns_of(view)
}

/// Um caso só pode estar numa coluna comum da sua visão ou numa zona dela.
pub fn validate_position(config: &WorkflowConfig, view: ViewType, column_id: &str) -> Result<(), AppError> {
    match config.column(view, column_id) {
        Some(_) => Ok(()),
        None => Err(AppError::InvalidPosition { view, column: column_id.to_string() }),
    }
}

/// Próxima coluna comum da visão. `None` na última coluna, numa zona ou em
/// coluna desconhecida.
pub fn suggest_next_column<'a>(
    config: &'a WorkflowConfig,
    view: ViewType,
    column_id: &str,
) -> Option<&'a ColumnDefinition> {
    let columns = &config.view(view)?.columns;
    let index = columns.iter().position(|c| c.id == column_id)?;
    columns.get(index + 1)
}

/// Resolve o alvo de um movimento. Sem `target_view` o alvo é procurado na
/// visão atual; zonas são reescritas para (visão, coluna) de destino.
pub fn resolve_target(
    config: &WorkflowConfig,
    current_view: ViewType,
    target_view: Option<ViewType>,
    target_column: &str,
) -> Result<ResolvedTarget, AppError> {
    let view = target_view.unwrap_or(current_view);
    let column = config
        .column(view, target_column)
        .ok_or_else(|| AppError::InvalidPosition { view, column: target_column.to_string() })?;

    match &column.kind {
        ColumnKind::Standard => Ok(ResolvedTarget {
            view,
            column_id: column.id.clone(),
            zone_id: None,
            tasks_to_add: Vec::new(),
        }),
        ColumnKind::Zone { target_view, target_column, tasks_to_add, .. } => {
            // Zona que aponta para outra zona seria um ciclo; a config é conferida na carga
            validate_position(config, *target_view, target_column)?;
            Ok(ResolvedTarget {
                view: *target_view,
                column_id: target_column.clone(),
                zone_id: Some(column.id.clone()),
                tasks_to_add: tasks_to_add.clone(),
            })
        }
    }
}
