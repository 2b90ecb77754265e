// src/common/cpf.rs

use validator::ValidationError;

/// Valida um CPF pelos dígitos verificadores. Aceita com ou sem máscara.
pub fn validate_cpf(raw: &str) -> bool {
    let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || raw.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    // 000.000.000-00, 111.111.111-11, ... passam no cálculo mas não existem
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }
    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

fn check_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();
    let rest = (sum * 10) % 11;
    if rest == 10 { 0 } else { rest }
}

/// Apenas os dígitos, para armazenamento.
pub fn normalize_cpf(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `52998224725` -> `529.982.247-25`
pub fn format_cpf(raw: &str) -> String {
    let d = normalize_cpf(raw);
    if d.len() != 11 {
        return raw.to_string();
    }
    format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..])
}

// Usado pelo derive do `validator` nos payloads
pub fn validate_cpf_field(cpf: &str) -> Result<(), ValidationError> {
    if validate_cpf(cpf) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_cpf");
        err.message = Some("CPF inválido".into());
        Err(err)
    }
}
