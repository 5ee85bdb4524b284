//! Settings persistence: a TOML file under the user configuration
//! directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use recall_core::StudyConfig;

pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("could not determine the configuration directory")?;
    Ok(dir.join("recall").join("config.toml"))
}

/// Load saved settings; defaults when no file exists yet.
pub fn load() -> Result<StudyConfig> {
    let path = config_path()?;

    if !path.exists() {
        tracing::debug!("no settings file at {}, using defaults", path.display());
        return Ok(StudyConfig::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("settings file {} is malformed", path.display()))
}

pub fn save(config: &StudyConfig) -> Result<()> {
    let path = config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(config).context("failed to render settings")?;
    fs::write(&path, content)
        .with_context(|| format!("failed to write settings to {}", path.display()))?;

    tracing::debug!("settings saved to {}", path.display());
    Ok(())
}

/// Apply `key = value` to the configuration, with type checking.
pub fn set(config: &mut StudyConfig, key: &str, value: &str) -> Result<()> {
    let numeric = || {
        value
            .parse::<u32>()
            .with_context(|| format!("\"{value}\" is not a number"))
    };
    let flag = || {
        value
            .parse::<bool>()
            .with_context(|| format!("\"{value}\" is not true or false"))
    };

    match key {
        "intro_limit" => config.intro_limit = numeric()? as usize,
        "lesson_counter_new" => config.lesson_counter_new = numeric()?,
        "lesson_counter_review" => config.lesson_counter_review = numeric()?,
        "seconds_timeout" => config.seconds_timeout = numeric()?,
        "mark_for_accents" => config.mark_for_accents = flag()?,
        "allow_mark_correct" => config.allow_mark_correct = flag()?,
        "ignore_bracketed" => config.ignore_bracketed = flag()?,
        "reverse_mode" => config.reverse_mode = flag()?,
        "timed_mode" => config.timed_mode = flag()?,
        "specific_clue_path" => config.specific_clue_path = flag()?,
        _ => bail!("unknown setting \"{key}\""),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_updates_numeric_and_flag_fields() {
        let mut config = StudyConfig::default();

        set(&mut config, "intro_limit", "25").unwrap();
        set(&mut config, "timed_mode", "true").unwrap();

        assert_eq!(config.intro_limit, 25);
        assert!(config.timed_mode);
    }

    #[test]
    fn set_rejects_bad_values_and_unknown_keys() {
        let mut config = StudyConfig::default();

        assert!(set(&mut config, "intro_limit", "lots").is_err());
        assert!(set(&mut config, "timed_mode", "maybe").is_err());
        assert!(set(&mut config, "no_such_key", "1").is_err());
        assert_eq!(config, StudyConfig::default());
    }
}
