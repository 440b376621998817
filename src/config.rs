use crate::error::{Error, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub dates_dayfirst: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_path =
            env::var("GPANALYZER_DB").unwrap_or_else(|_| "gpanalyzer.db".to_string());

        let dates_dayfirst = match env::var("GPANALYZER_DATES_DAYFIRST") {
            Ok(v) => match v.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(Error::Config(format!(
                        "GPANALYZER_DATES_DAYFIRST must be true or false, got \"{}\"",
                        other
                    )))
                }
            },
            Err(_) => true,
        };

        Ok(Self {
            database_path,
            dates_dayfirst,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub dates_dayfirst: bool,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            dates_dayfirst: config.dates_dayfirst,
        }
    }
}
