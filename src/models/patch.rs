// src/models/patch.rs
//
// Atualização parcial de um caso. Cada campo tem três estados:
//   ausente no JSON  -> Patch::Keep  (não mexe)
//   `null`           -> Patch::Clear (apaga o valor)
//   valor            -> Patch::Set   (substitui)

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::case::{Case, DecisionOutcome, Sex, Urgency};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Aplica sobre um campo opcional.
    pub fn apply(self, target: &mut Option<T>) -> bool {
        match self {
            Patch::Keep => false,
            Patch::Clear => target.take().is_some(),
            Patch::Set(value) => {
                *target = Some(value);
                true
            }
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Só é chamado quando a chave existe; ausência cai no `#[serde(default)]`.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        })
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(value) => value.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }
}

mod patch_datetime {
    use super::Patch;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Patch<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Patch::Clear),
            Some(raw) => crate::common::dates::parse_local_datetime(&raw)
                .map(Patch::Set)
                .ok_or_else(|| serde::de::Error::custom(format!("data/hora inválida: {raw}"))),
        }
    }
}

/// Campos editáveis de um caso. Usado pelo PATCH de casos e pelo commit
/// das transições.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CasePatch {
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>)]
    pub client_name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>)]
    pub cpf: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Patch<NaiveDate>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<Sex>)]
    pub sex: Patch<Sex>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>)]
    pub marital_status: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>)]
    pub address: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>)]
    pub phone: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>)]
    pub email: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>)]
    pub benefit_type: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>)]
    pub benefit_number: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>)]
    pub protocol_number: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>, format = Date)]
    pub protocol_date: Patch<NaiveDate>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>)]
    pub appeal_protocol_number: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>, format = Date)]
    pub appeal_ordinary_date: Patch<NaiveDate>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>, format = Date)]
    pub appeal_special_date: Patch<NaiveDate>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<DecisionOutcome>)]
    pub decision_outcome: Patch<DecisionOutcome>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>, format = Date)]
    pub decision_date: Patch<NaiveDate>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>, format = Date)]
    pub dcb_date: Patch<NaiveDate>,
    #[serde(skip_serializing_if = "Patch::is_keep", deserialize_with = "patch_datetime::deserialize")]
    #[schema(value_type = Option<String>)]
    pub pericia_date: Patch<NaiveDateTime>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>, format = Date)]
    pub deadline_start: Patch<NaiveDate>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>, format = Date)]
    pub deadline_end: Patch<NaiveDate>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>, format = Date)]
    pub last_client_contact: Patch<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_docs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exigency_details: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<Uuid>)]
    pub responsible_id: Patch<Uuid>,
    /// Derivado de `responsibleId`; o valor enviado pelo cliente é ignorado.
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[schema(value_type = Option<String>)]
    pub responsible_name: Patch<String>,
}

macro_rules! apply_fields {
    ($patch:ident, $case:ident, $changed:ident; $($field:ident),* $(,)?) => {
        $(
            if $patch.$field.apply(&mut $case.$field) {
                $changed.push(stringify!($field));
            }
        )*
    };
}

impl CasePatch {
    /// Mescla o patch no caso e devolve os nomes dos campos alterados.
    /// Campos `Keep` nunca sobrescrevem o que já existe.
    pub fn apply_to(self, case: &mut Case) -> Vec<&'static str> {
        let mut changed = Vec::new();
        let patch = self;

        if let Patch::Set(name) = patch.client_name {
            case.client_name = name;
            changed.push("client_name");
        }
        if let Patch::Set(cpf) = patch.cpf {
            case.cpf = cpf;
            changed.push("cpf");
        }

        apply_fields!(patch, case, changed;
            birth_date, sex, marital_status, address, phone, email,
            benefit_type, benefit_number, protocol_number, protocol_date,
            appeal_protocol_number, appeal_ordinary_date, appeal_special_date,
            decision_outcome, decision_date, dcb_date, pericia_date,
            deadline_start, deadline_end, last_client_contact,
            responsible_id, responsible_name,
        );

        if let Some(urgency) = patch.urgency {
            case.urgency = urgency;
            changed.push("urgency");
        }
        if let Some(tags) = patch.tags {
            case.tags = tags;
            changed.push("tags");
        }
        if let Some(docs) = patch.missing_docs {
            case.missing_docs = docs;
            changed.push("missing_docs");
        }
        if let Some(details) = patch.exigency_details {
            case.exigency_details = details;
            changed.push("exigency_details");
        }
        changed
    }

    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_object().map(|o| o.is_empty()))
            .unwrap_or(true)
    }
}
