use crate::models::ClassLabels;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct HandSignConfig {
    pub common: core_config::Config,
    pub model: ModelConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// XGBoost JSON model written by `Booster.save_model("model.json")`.
    pub path: PathBuf,
    /// Label for each model output, in training order.
    pub classes: ClassLabels,
}

#[derive(Debug, Clone)]
pub struct StaticFilesConfig {
    pub dir: PathBuf,
}

impl HandSignConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(HandSignConfig {
            common: common_config,
            model: ModelConfig {
                path: get_env("MODEL_PATH", Some("model.json"), is_prod)?.into(),
                classes: get_env("MODEL_CLASSES", Some("left,up,down,right"), is_prod)?
                    .parse::<ClassLabels>()
                    .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?,
            },
            static_files: StaticFilesConfig {
                dir: get_env("STATIC_DIR", Some("static"), is_prod)?.into(),
            },
        })
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

    const UNSET: &str = "HAND_SIGN_SERVICE_TEST_NEVER_SET";

    #[test]
    fn unset_key_falls_back_to_default_outside_prod() {
        assert_eq!(get_env(UNSET, Some("model.json"), false).unwrap(), "model.json");
    }

    #[test]
    fn unset_key_is_an_error_in_prod() {
        let err = get_env(UNSET, Some("model.json"), true).unwrap_err();
        assert!(err.to_string().contains("required in production"));
    }

    #[test]
    fn unset_key_without_default_is_an_error() {
        assert!(matches!(
            get_env(UNSET, None, false),
            Err(AppError::ConfigError(_))
        ));
    }
}
