// src/models/settings.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Parâmetros de SLA do escritório. Nomes dos campos são os mesmos do backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SystemSettings {
    #[validate(range(min = 1, max = 3650))]
    #[schema(example = 7)]
    pub sla_internal_analysis: i64,

    #[validate(range(min = 1, max = 3650))]
    #[schema(example = 30)]
    pub sla_client_contact: i64,

    #[validate(range(min = 1, max = 3650))]
    #[schema(example = 45)]
    pub sla_stagnation: i64,

    #[validate(range(min = 1, max = 3650))]
    #[schema(example = 45)]
    pub sla_spider_web: i64,

    #[validate(range(min = 1, max = 3650))]
    #[schema(example = 120)]
    pub sla_mandado_seguranca: i64,

    #[validate(range(min = 0, max = 365))]
    #[schema(example = 15)]
    pub pp_alert_days: i64,

    pub show_probabilities: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            sla_internal_analysis: 7,
            sla_client_contact: 30,
            sla_stagnation: 45,
            sla_spider_web: 45,
            sla_mandado_seguranca: 120,
            pp_alert_days: 15,
            show_probabilities: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let settings: SystemSettings = serde_json::from_str(r#"{"sla_mandado_seguranca": 90}"#).unwrap();
        assert_eq!(settings.sla_mandado_seguranca, 90);
        assert_eq!(settings.sla_client_contact, 30);
        assert_eq!(settings.pp_alert_days, 15);
        assert!(settings.show_probabilities);
    }

    #[test]
    fn test_range_validation() {
        let settings = SystemSettings { sla_stagnation: 0, ..Default::default() };
        assert!(settings.validate().is_err());
        assert!(SystemSettings::default().validate().is_ok());
    }
}
