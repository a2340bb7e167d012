use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::core::error::{CalError, Result};
use crate::models::config_model::InvertConfig;

pub const DEFAULT_CONFIG_FILE: &str = "calproc.json";

/// Loads the processing config.
///
/// An explicit path must exist. Without one, `calproc.json` in the working
/// directory is used when present, otherwise the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<InvertConfig> {
    let file_path = match path {
        Some(p) => p,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(InvertConfig::default());
            }
            fallback
        }
    };

    let data = fs::read_to_string(file_path).map_err(|e| {
        CalError::Config(format!("File read error: {e} {}", file_path.display()))
    })?;

    let config = parse_config(&data)?;
    info!("Config loaded from {}", file_path.display());
    Ok(config)
}

pub fn parse_config(data: &str) -> Result<InvertConfig> {
    let config: InvertConfig = serde_json::from_str(data)?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &InvertConfig) -> Result<()> {
    if !(config.delta.is_finite() && config.delta > 0.0) {
        return Err(CalError::Config(format!(
            "delta must be positive, got {}",
            config.delta
        )));
    }
    if config.nominal_begin > config.nominal_end {
        return Err(CalError::Config(format!(
            "nominal range {}..={} is empty",
            config.nominal_begin, config.nominal_end
        )));
    }
    if config.nominal_begin == 0 {
        return Err(CalError::Config(
            "nominal range must start above zero, row 0 is reserved".to_string(),
        ));
    }
    Ok(())
}
