// src/common/dates.rs
//
// Datas do escritório são datas "de calendário" locais. Nada aqui converte
// para UTC: "2024-03-15" é 15 de março em qualquer fuso do servidor.

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Data local de hoje (fuso do servidor).
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Lê uma data armazenada como texto. Aceita `YYYY-MM-DD`, `DD/MM/YYYY` e
/// timestamps ISO (`2024-03-15T10:00`, `2024-03-15T10:00:00Z`), usando apenas
/// a parte de data como foi escrita.
pub fn parse_local_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Some(date);
    }
    let date_part = raw.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Lê data + hora local (formato de `<input type="datetime-local">`).
/// Sem hora, assume meia-noite.
pub fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    // Timestamps com fuso: mantém o relógio de parede escrito
    if raw.len() > 16 {
        if let Some(dt) = raw.get(..16).and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").ok()) {
            return Some(dt);
        }
    }
    parse_local_date(raw).map(|d| d.and_time(NaiveTime::MIN))
}

/// Dias de calendário de `today` até `target` (negativo se `target` já passou).
pub fn days_between(today: NaiveDate, target: NaiveDate) -> i64 {
    (target - today).num_days()
}

/// Versão textual: `get_days_diff("2024-03-15", 2024-03-10) == Some(5)`.
pub fn get_days_diff(target: &str, today: NaiveDate) -> Option<i64> {
    parse_local_date(target).map(|t| days_between(today, t))
}

/// Dias decorridos desde `anchor` (positivo para datas passadas).
pub fn days_since(anchor: NaiveDate, today: NaiveDate) -> i64 {
    (today - anchor).num_days()
}

pub fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MAX)
}

/// Idade em anos completos na data `today`.
pub fn calculate_age(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birth > today {
        return None;
    }
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

/// Janela de prazo a partir da ciência: `(inicio, fim)`.
pub fn deadline_window(start: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    (start, add_days(start, days))
}

/// Formato brasileiro `DD/MM/YYYY` usado em históricos e exportação.
pub fn format_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_br_datetime(dt: NaiveDateTime) -> String {
    dt.format("%d/%m/%Y %H:%M").to_string()
}

/// Desserializa `Option<NaiveDateTime>` aceitando o formato sem segundos.
pub mod opt_local_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => super::parse_local_datetime(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("data/hora inválida: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_days_diff_is_calendar_based() {
        assert_eq!(get_days_diff("2024-03-15", d(2024, 3, 10)), Some(5));
        // Timestamp em UTC no fim do dia continua sendo dia 15
        assert_eq!(get_days_diff("2024-03-15T23:30:00Z", d(2024, 3, 10)), Some(5));
        assert_eq!(get_days_diff("2024-03-15T00:30:00-03:00", d(2024, 3, 10)), Some(5));
        assert_eq!(get_days_diff("15/03/2024", d(2024, 3, 10)), Some(5));
        assert_eq!(get_days_diff("2024-03-01", d(2024, 3, 10)), Some(-9));
    }

    #[test]
    fn test_days_diff_invalid_input() {
        assert_eq!(get_days_diff("", d(2024, 3, 10)), None);
        assert_eq!(get_days_diff("ontem", d(2024, 3, 10)), None);
        assert_eq!(get_days_diff("2024-13-40", d(2024, 3, 10)), None);
    }

    #[test]
    fn test_parse_local_datetime() {
        let dt = parse_local_datetime("2024-02-20T09:00").unwrap();
        assert_eq!(dt.date(), d(2024, 2, 20));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(parse_local_datetime("2024-02-20T09:00:00.000Z").is_some());
        assert_eq!(parse_local_datetime("2024-02-20").unwrap().time(), NaiveTime::MIN);
        assert!(parse_local_datetime("amanhã").is_none());
    }

    #[test]
    fn test_age() {
        assert_eq!(calculate_age(d(1960, 5, 20), d(2024, 5, 19)), Some(63));
        assert_eq!(calculate_age(d(1960, 5, 20), d(2024, 5, 20)), Some(64));
        assert_eq!(calculate_age(d(2030, 1, 1), d(2024, 5, 20)), None);
    }

    #[test]
    fn test_deadline_window() {
        let (start, end) = deadline_window(d(2024, 1, 1), 30);
        assert_eq!(start, d(2024, 1, 1));
        assert_eq!(end, d(2024, 1, 31));
        assert_eq!(days_since(d(2024, 1, 1), d(2024, 1, 31)), 30);
        assert_eq!(format_br(end), "31/01/2024");
    }
}
