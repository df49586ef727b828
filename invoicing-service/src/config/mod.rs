use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Service configuration, assembled from the common settings plus
/// service-specific environment variables in `load`.
#[derive(Debug, Clone)]
pub struct InvoicingConfig {
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub store: StoreBackend,
    pub billing: BillingConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// ISO 4217 code used when a document does not name its currency.
    pub default_currency: String,
}

impl InvoicingConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let store: StoreBackend = get_env("STORE_BACKEND", Some("mongo"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        // The in-memory store never dials MongoDB, so the URI is optional there.
        let uri_default = match store {
            StoreBackend::Mongo => None,
            StoreBackend::Memory => Some("mongodb://localhost:27017"),
        };

        let default_currency = get_env("BILLING_DEFAULT_CURRENCY", Some("EUR"), is_prod)?;
        if default_currency.len() != 3 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "BILLING_DEFAULT_CURRENCY must be a three-letter currency code, got {}",
                default_currency
            )));
        }

        Ok(InvoicingConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", uri_default, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("invoicing_db"), is_prod)?,
            },
            store,
            billing: BillingConfig {
                default_currency: default_currency.to_uppercase(),
            },
        })
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_parses_case_insensitively() {
        assert_eq!("Memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_eq!("mongodb".parse::<StoreBackend>(), Ok(StoreBackend::Mongo));
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn load_reads_billing_settings_from_env() {
        env::set_var("STORE_BACKEND", "memory");
        env::set_var("BILLING_DEFAULT_CURRENCY", "usd");
        let config = InvoicingConfig::load().unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.billing.default_currency, "USD");

        env::set_var("BILLING_DEFAULT_CURRENCY", "EURO");
        assert!(matches!(InvoicingConfig::load(), Err(AppError::ConfigError(_))));

        env::remove_var("BILLING_DEFAULT_CURRENCY");
        env::remove_var("STORE_BACKEND");
    }
}
