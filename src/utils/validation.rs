//! Utilidades de validación
//!
//! Validadores custom para `validator` y helpers de normalización
//! de los datos que llegan desde el dashboard.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref STATUS_CODE_RE: Regex = Regex::new(r"^[a-z][a-z0-9_]{1,31}$").unwrap();
    static ref HEX_COLOR_RE: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// Normalizar un teléfono: sólo dígitos, conservando un `+` inicial
pub fn normalize_phone(value: &str) -> String {
    let trimmed = value.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if trimmed.starts_with('+') {
        format!("+{}", digits)
    } else {
        digits
    }
}

/// Validar formato de teléfono (8 a 15 dígitos)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let count = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !(8..=15).contains(&count) {
        let mut error = ValidationError::new("phone");
        error.message = Some("phone number must contain between 8 and 15 digits".into());
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar SIRET (14 dígitos)
pub fn validate_siret(value: &str) -> Result<(), ValidationError> {
    if value.len() != 14 || !value.chars().all(|c| c.is_ascii_digit()) {
        let mut error = ValidationError::new("siret");
        error.message = Some("SIRET must contain exactly 14 digits".into());
        return Err(error);
    }
    Ok(())
}

/// Validar código de estado en snake_case
pub fn validate_status_code(value: &str) -> Result<(), ValidationError> {
    if !STATUS_CODE_RE.is_match(value) {
        let mut error = ValidationError::new("status_code");
        error.message = Some("status code must be snake_case (2 to 32 chars)".into());
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar color `#rrggbb`
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    if !HEX_COLOR_RE.is_match(value) {
        let mut error = ValidationError::new("color");
        error.message = Some("color must be formatted as #rrggbb".into());
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Recortar un filtro de texto opcional, descartando cadenas vacías
pub fn clean_filter(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_normalization_keeps_leading_plus() {
        assert_eq!(normalize_phone(" +33 6 12-34-56-78 "), "+33612345678");
        assert_eq!(normalize_phone("06.12.34.56.78"), "0612345678");
    }

    #[test]
    fn phone_length_bounds() {
        assert!(validate_phone("06 12 34 56 78").is_ok());
        assert!(validate_phone("1234567").is_err());
        assert!(validate_phone("1234567890123456").is_err());
    }

    #[test]
    fn siret_requires_fourteen_digits() {
        assert!(validate_siret("12345678901234").is_ok());
        assert!(validate_siret("1234567890123").is_err());
        assert!(validate_siret("1234567890123A").is_err());
    }

    #[test]
    fn status_codes_are_snake_case() {
        assert!(validate_status_code("en_livraison").is_ok());
        assert!(validate_status_code("livre").is_ok());
        assert!(validate_status_code("En_livraison").is_err());
        assert!(validate_status_code("x").is_err());
        assert!(validate_status_code("9abc").is_err());
    }

    #[test]
    fn colors_are_hex() {
        assert!(validate_hex_color("#10b981").is_ok());
        assert!(validate_hex_color("#10B98F").is_ok());
        assert!(validate_hex_color("10b981").is_err());
        assert!(validate_hex_color("#10b98").is_err());
    }

    #[test]
    fn blank_filters_are_dropped() {
        assert_eq!(clean_filter(Some("  ")), None);
        assert_eq!(clean_filter(Some(" dupont ")), Some("dupont".to_string()));
        assert_eq!(clean_filter(None), None);
    }
}
