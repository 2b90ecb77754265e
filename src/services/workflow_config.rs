// src/services/workflow_config.rs
//
// Tabelas padrão do escritório: visões, colunas, regras de transição e ações
// sugeridas. Podem ser substituídas por um JSON (WORKFLOW_CONFIG_PATH).

use std::path::Path;

use anyhow::{bail, Context};

use crate::models::{
    case::Urgency,
    workflow::{
        ColumnDefinition, ColumnKind, SmartAction, SmartActionEntry, TransitionRule, TransitionType,
        ViewDefinition, ViewType, WorkflowConfig,
    },
};

pub const JUDICIAL_CHECKLIST: [&str; 4] = [
    "Coletar procuração judicial",
    "Coletar contrato de honorários",
    "Coletar comprovante de residência",
    "Obter cópia integral do processo administrativo",
];

fn judicial_zone() -> ColumnDefinition {
    ColumnDefinition {
        id: "zone_judicial".into(),
        title: "Judicializar".into(),
        color: "red".into(),
        kind: ColumnKind::Zone {
            target_view: ViewType::Judicial,
            target_column: "jud_triagem".into(),
            tasks_to_add: JUDICIAL_CHECKLIST.iter().map(|t| t.to_string()).collect(),
            is_archive: false,
        },
    }
}

fn archive_zone() -> ColumnDefinition {
    ColumnDefinition {
        id: "zone_arquivo".into(),
        title: "Arquivar".into(),
        color: "gray".into(),
        kind: ColumnKind::Zone {
            target_view: ViewType::MesaDecisao,
            target_column: "mesa_arquivado".into(),
            tasks_to_add: Vec::new(),
            is_archive: true,
        },
    }
}

fn decision_desk_zone() -> ColumnDefinition {
    ColumnDefinition::zone("zone_mesa", "Mesa de Decisão", "amber", ViewType::MesaDecisao, "mesa_analise")
}

fn appeal_zone() -> ColumnDefinition {
    let mut zone = ColumnDefinition::zone(
        "zone_recurso",
        "Recurso Administrativo",
        "purple",
        ViewType::RecursoAdm,
        "rec_elaboracao",
    );
    if let ColumnKind::Zone { tasks_to_add, .. } = &mut zone.kind {
        tasks_to_add.push("Redigir recurso ordinário".into());
    }
    zone
}

fn views() -> Vec<ViewDefinition> {
    use ColumnDefinition as C;
    vec![
        ViewDefinition {
            view: ViewType::Admin,
            title: "Administrativo".into(),
            columns: vec![
                C::standard("adm_triagem", "Triagem", "gray"),
                C::standard("adm_documentacao", "Coleta de Documentos", "blue"),
                C::standard("adm_pendencia", "Pendência Documental", "yellow"),
                C::standard("adm_protocolado", "Protocolado / Em Análise", "indigo"),
                C::standard("adm_exigencia", "Em Exigência", "orange"),
                C::standard("adm_pericia", "Perícia / Avaliação Social", "purple"),
                C::standard("adm_decisao", "Decisão", "green"),
            ],
            zones: vec![decision_desk_zone(), judicial_zone(), archive_zone()],
        },
        ViewDefinition {
            view: ViewType::AuxDoenca,
            title: "Auxílio-Doença".into(),
            columns: vec![
                C::standard("aux_chegada", "Chegada / Triagem", "gray"),
                C::standard("aux_pendencia", "Pendência Documental", "yellow"),
                C::standard("aux_pericia", "Perícia Agendada", "purple"),
                C::standard("aux_aguardando", "Aguardando Resultado", "blue"),
                C::standard("aux_exigencia", "Em Exigência", "orange"),
                C::standard("aux_ativo", "Benefício Ativo", "green"),
                C::standard("aux_prorrogacao", "Prorrogação (PP)", "teal"),
            ],
            zones: vec![decision_desk_zone(), judicial_zone(), archive_zone()],
        },
        ViewDefinition {
            view: ViewType::MesaDecisao,
            title: "Mesa de Decisão".into(),
            columns: vec![
                C::standard("mesa_analise", "Análise da Decisão", "amber"),
                C::standard("mesa_contato", "Contato com Cliente", "blue"),
                C::standard("mesa_aguardando", "Aguardando Definição", "gray"),
                C::standard("mesa_arquivado", "Arquivado", "slate"),
            ],
            zones: vec![appeal_zone(), judicial_zone(), archive_zone()],
        },
        ViewDefinition {
            view: ViewType::RecursoAdm,
            title: "Recurso Administrativo".into(),
            columns: vec![
                C::standard("rec_elaboracao", "Elaboração do Recurso", "gray"),
                C::standard("rec_ordinario", "Recurso Ordinário (1ª Instância)", "indigo"),
                C::standard("rec_diligencia", "Diligência / Exigência", "orange"),
                C::standard("rec_especial", "Recurso Especial (2ª Instância)", "purple"),
                C::standard("rec_julgado", "Julgado", "green"),
            ],
            zones: vec![judicial_zone(), decision_desk_zone(), archive_zone()],
        },
        ViewDefinition {
            view: ViewType::Judicial,
            title: "Judicial".into(),
            columns: vec![
                C::standard("jud_triagem", "Triagem Judicial", "gray"),
                C::standard("jud_documentos", "Documentação Judicial", "yellow"),
                C::standard("jud_ajuizado", "Ajuizado", "indigo"),
                C::standard("jud_pericia", "Perícia Judicial", "purple"),
                C::standard("jud_sentenca", "Sentença", "green"),
                C::standard("jud_cumprimento", "Cumprimento / RPV", "teal"),
            ],
            zones: vec![archive_zone()],
        },
    ]
}

fn rules() -> Vec<TransitionRule> {
    use TransitionType::*;
    vec![
        TransitionRule::any("adm_pendencia", Pendency),
        TransitionRule::any("adm_protocolado", ProtocolInss),
        TransitionRule::any("adm_exigencia", Deadline),
        TransitionRule::any("adm_pericia", ProtocolInss),
        TransitionRule::any("adm_decisao", ConclusionNb),
        TransitionRule::any("aux_pendencia", Pendency),
        TransitionRule::any("aux_pericia", ProtocolInss),
        TransitionRule::any("aux_exigencia", Deadline),
        TransitionRule::any("aux_ativo", ConclusionNb),
        TransitionRule::any("aux_prorrogacao", ProtocolInss),
        TransitionRule::any("rec_ordinario", ProtocolAppeal),
        TransitionRule::any("rec_diligencia", Deadline),
        TransitionRule::any("rec_especial", ProtocolAppeal),
        TransitionRule::any("rec_julgado", ConclusionNb),
        TransitionRule::any("jud_documentos", Pendency),
        TransitionRule::any("jud_sentenca", ConclusionNb),
    ]
}

fn action(label: &str, view: ViewType, column: &str, icon: &str, color: &str, urgency: Urgency, tasks: &[&str]) -> SmartAction {
    SmartAction {
        label: label.into(),
        target_view: view,
        target_column: column.into(),
        icon: icon.into(),
        color: color.into(),
        urgency,
        tasks: tasks.iter().map(|t| t.to_string()).collect(),
    }
}

fn entry(view: ViewType, column: &str, title: &str, description: &str, actions: Vec<SmartAction>) -> SmartActionEntry {
    SmartActionEntry {
        view,
        column_id: column.into(),
        title: title.into(),
        description: description.into(),
        actions,
    }
}

fn smart_actions() -> Vec<SmartActionEntry> {
    use Urgency::*;
    use ViewType::*;
    vec![
        entry(Admin, "adm_exigencia", "Exigência em aberto",
            "Cumpra a exigência dentro do prazo para evitar o indeferimento.",
            vec![action("Exigência cumprida", Admin, "adm_protocolado", "check", "green", High,
                &["Juntar documentos da exigência no Meu INSS"])]),
        entry(Admin, "adm_decisao", "Decisão publicada",
            "Encaminhe conforme o resultado da decisão.",
            vec![
                action("Indeferido: Mesa de Decisão", MesaDecisao, "mesa_analise", "gavel", "red", High,
                    &["Analisar carta de indeferimento"]),
                action("Concedido: Arquivar", MesaDecisao, "mesa_arquivado", "archive", "green", Normal,
                    &["Conferir cálculo da RMI", "Informar concessão ao cliente"]),
            ]),
        entry(AuxDoenca, "aux_aguardando", "Aguardando resultado da perícia",
            "Consulte o resultado no Meu INSS.",
            vec![action("Negado: Mesa de Decisão", MesaDecisao, "mesa_analise", "gavel", "red", High,
                &["Analisar laudo pericial"])]),
        entry(AuxDoenca, "aux_ativo", "Benefício ativo",
            "Acompanhe a DCB; a prorrogação deve ser pedida antes da cessação.",
            vec![action("Pedir prorrogação (PP)", AuxDoenca, "aux_prorrogacao", "refresh", "teal", High,
                &["Protocolar pedido de prorrogação antes da DCB", "Solicitar atestado médico atualizado"])]),
        entry(MesaDecisao, "mesa_analise", "Decidir o próximo passo",
            "Recurso administrativo, ação judicial ou arquivamento.",
            vec![
                action("Recorrer administrativamente", RecursoAdm, "rec_elaboracao", "file", "purple", High,
                    &["Redigir recurso ordinário"]),
                action("Ajuizar ação", Judicial, "jud_triagem", "scale", "red", High, &JUDICIAL_CHECKLIST),
                action("Arquivar", MesaDecisao, "mesa_arquivado", "archive", "gray", Normal, &[]),
            ]),
        entry(RecursoAdm, "rec_ordinario", "Recurso ordinário em andamento",
            "Após o acórdão da Junta, avalie o recurso especial.",
            vec![action("Recurso especial", RecursoAdm, "rec_especial", "file", "purple", Normal,
                &["Redigir recurso especial"])]),
        entry(RecursoAdm, "rec_julgado", "Recurso julgado",
            "Recurso negado pode ser levado ao Judiciário.",
            vec![action("Judicializar", Judicial, "jud_triagem", "scale", "red", Critical, &JUDICIAL_CHECKLIST)]),
        entry(Judicial, "jud_sentenca", "Sentença publicada",
            "Com sentença favorável, inicie o cumprimento.",
            vec![action("Iniciar cumprimento", Judicial, "jud_cumprimento", "money", "green", High,
                &["Conferir cálculos de liquidação"])]),
    ]
}

pub fn default_config() -> WorkflowConfig {
    WorkflowConfig {
        views: views(),
        rules: rules(),
        smart_actions: smart_actions(),
        exam_columns: vec!["adm_pericia".into(), "aux_pericia".into()],
        first_instance_columns: vec!["rec_ordinario".into(), "rec_diligencia".into()],
        second_instance_columns: vec!["rec_especial".into()],
        internal_analysis_columns: vec![
            "adm_triagem".into(),
            "aux_chegada".into(),
            "mesa_analise".into(),
            "rec_elaboracao".into(),
            "jud_triagem".into(),
        ],
        // 21 pensão por morte, 25 auxílio-reclusão, 31/91 auxílio-doença
        has_cessation_benefits: vec!["21".into(), "25".into(), "31".into(), "91".into()],
        pendency_suggestions: [
            "RG / CNH", "CPF", "Comprovante de residência", "CNIS", "CTPS",
            "Laudos médicos", "Atestados médicos", "Certidão de casamento / nascimento",
            "Procuração", "Declaração de hipossuficiência",
        ].iter().map(|s| s.to_string()).collect(),
        exigency_suggestions: [
            "Apresentar documentos originais", "Comprovar vínculo empregatício",
            "Autodeclaração do segurado especial", "Atualizar cadastro no CNIS",
        ].iter().map(|s| s.to_string()).collect(),
        default_deadline_days: 30,
        appeal_window_days: 30,
        default_normal_limit_days: 90,
    }
}

/// Carrega a configuração de um arquivo JSON, ou usa as tabelas padrão.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<WorkflowConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Falha ao ler {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Configuração de fluxo inválida em {}", path.display()))?
        }
        None => default_config(),
    };
    check_config(&config)?;
    Ok(config)
}

/// Confere referências cruzadas: regras, zonas e ações apontam para colunas existentes.
pub fn check_config(config: &WorkflowConfig) -> anyhow::Result<()> {
    for view in ViewType::ALL {
        if config.view(view).is_none_or(|v| v.columns.is_empty()) {
            bail!("A visão {} não possui colunas", view.as_str());
        }
    }
    let exists = |column: &str| {
        config.views.iter().any(|v| v.columns.iter().any(|c| c.id == column))
    };
    for rule in &config.rules {
        if !exists(&rule.to) {
            bail!("Regra aponta para coluna inexistente: {}", rule.to);
        }
    }
    for view in &config.views {
        for zone in &view.zones {
            match &zone.kind {
                ColumnKind::Zone { target_view, target_column, .. } => {
                    if !config.is_standard_column(*target_view, target_column) {
                        bail!("Zona {} aponta para {}/{} inexistente", zone.id, target_view.as_str(), target_column);
                    }
                }
                ColumnKind::Standard => bail!("Coluna {} listada como zona sem destino", zone.id),
            }
        }
    }
    for entry in &config.smart_actions {
        for action in &entry.actions {
            if !config.is_standard_column(action.target_view, &action.target_column) {
                bail!("Ação '{}' aponta para coluna inexistente: {}", action.label, action.target_column);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_consistent() {
        check_config(&default_config()).unwrap();
    }

    #[test]
    fn test_broken_rule_is_rejected() {
        let mut config = default_config();
        config.rules.push(TransitionRule::any("nao_existe", TransitionType::Deadline));
        assert!(check_config(&config).is_err());
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let json = serde_json::to_string(&default_config()).unwrap();
        let loaded: WorkflowConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.rules.len(), default_config().rules.len());
        assert!(loaded.rules.iter().any(|r| r.to == "adm_exigencia"));
        check_config(&loaded).unwrap();
    }
}
