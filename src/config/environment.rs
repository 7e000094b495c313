//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno del servicio.
//! Los valores se leen una sola vez al arrancar.

use anyhow::{bail, Context, Result};
use std::env;

/// Secreto usado sólo en desarrollo cuando `JWT_SECRET` no está definido
const DEVELOPMENT_JWT_SECRET: &str = "development-only-secret-change-me";

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            jwt_expiration: 86_400,
            cors_origins: Vec::new(),
            default_page_size: 20,
            max_page_size: 100,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }
}

impl EnvironmentConfig {
    /// Construir la configuración a partir de las variables de entorno
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment == "development" => defaults.jwt_secret,
            _ => bail!("JWT_SECRET must be set outside development"),
        };

        let config = Self {
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            jwt_secret,
            jwt_expiration: parse_var("JWT_EXPIRATION", defaults.jwt_expiration)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
            default_page_size: parse_var("DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: parse_var("MAX_PAGE_SIZE", defaults.max_page_size)?,
            bootstrap_admin_email: env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
            bootstrap_admin_password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
            environment,
        };

        if config.max_page_size == 0 || config.default_page_size == 0 {
            bail!("page sizes must be greater than zero");
        }
        if config.default_page_size > config.max_page_size {
            bail!("DEFAULT_PAGE_SIZE cannot exceed MAX_PAGE_SIZE");
        }

        Ok(config)
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección de escucha del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        let origins = parse_origins(" http://localhost:5173 , ,https://admin.example.fr");
        assert_eq!(
            origins,
            vec!["http://localhost:5173".to_string(), "https://admin.example.fr".to_string()]
        );
    }

    #[test]
    fn defaults_are_consistent() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert!(config.default_page_size <= config.max_page_size);
        assert_eq!(config.server_url(), "0.0.0.0:3000");
    }
}
