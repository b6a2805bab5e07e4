//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use tracing::debug;

use crate::adapters::TomlConfigAdapter;
use crate::config::{Settings, SettingsLayer, SplitLayer};
use crate::domain::errors::ConfigError;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "VIDTASK_";

/// Resolve settings following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(
    settings_file: Option<&std::path::Path>,
    cli_overrides: SettingsLayer,
) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    if let Some(layer) = TomlConfigAdapter::load(settings_file)? {
        settings.apply(layer);
    }

    let env_layer = load_environment_variables(|key| std::env::var(key).ok())?;
    settings.apply(env_layer);

    settings.apply(cli_overrides);
    settings.validate()?;

    debug!(?settings, "Configuration resolved");
    Ok(settings)
}

/// Build the environment layer from `VIDTASK_*` variables.
///
/// `lookup` abstracts the environment so tests stay hermetic.
pub fn load_environment_variables<F>(lookup: F) -> Result<SettingsLayer, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

    let mut layer = SettingsLayer {
        ffmpeg_path: var("FFMPEG_PATH").map(PathBuf::from),
        ffprobe_path: var("FFPROBE_PATH").map(PathBuf::from),
        ..Default::default()
    };

    if let Some(value) = var("WORKERS") {
        layer.workers = Some(parse_env("WORKERS", &value)?);
    }
    if let Some(value) = var("FAIL_FAST") {
        layer.fail_fast = Some(parse_bool("FAIL_FAST", &value)?);
    }
    if let Some(value) = var("OVERWRITE") {
        layer.overwrite = Some(parse_bool("OVERWRITE", &value)?);
    }
    if let Some(value) = var("PROCESS_TIMEOUT_SECS") {
        layer.process_timeout_secs = Some(parse_env("PROCESS_TIMEOUT_SECS", &value)?);
    }
    if let Some(value) = var("LOG_LEVEL") {
        layer.log_level = Some(parse_env("LOG_LEVEL", &value)?);
    }
    if let Some(value) = var("LOG_FORMAT") {
        layer.log_format = Some(parse_env("LOG_FORMAT", &value)?);
    }

    let safety_factor = var("SPLIT_SAFETY_FACTOR")
        .map(|v| parse_env("SPLIT_SAFETY_FACTOR", &v))
        .transpose()?;
    let min_segment_seconds = var("SPLIT_MIN_SEGMENT_SECONDS")
        .map(|v| parse_env("SPLIT_MIN_SEGMENT_SECONDS", &v))
        .transpose()?;
    let max_rounds = var("SPLIT_MAX_ROUNDS")
        .map(|v| parse_env("SPLIT_MAX_ROUNDS", &v))
        .transpose()?;
    if safety_factor.is_some() || min_segment_seconds.is_some() || max_rounds.is_some() {
        layer.split = Some(SplitLayer {
            safety_factor,
            min_segment_seconds,
            max_rounds,
        });
    }

    Ok(layer)
}

fn parse_env<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidSetting {
            key: format!("{}{}", ENV_PREFIX, name),
            message: e.to_string(),
        })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidSetting {
            key: format!("{}{}", ENV_PREFIX, name),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}
