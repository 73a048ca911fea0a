use std::{path::Path, str::FromStr};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::fractals::mandelbrot::MandelbrotParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read parameter file `{path}`: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("unable to parse parameter file `{path}`: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid value `{value}` for environment variable `{key}`")]
    InvalidValue { key: String, value: String },
    #[error("`{field}` must be positive")]
    NonPositive { field: &'static str },
    #[error("`color_step` must be a finite value in (0, {max}], got {value}")]
    InvalidColorStep { value: f64, max: f64 },
}

/// Largest accepted `color_step`; the same bound as a `u32` iteration count.
pub const MAX_COLOR_STEP: f64 = u32::MAX as f64;

pub fn read_params_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let display = || path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: display(),
        source,
    })
}

/**
 * Reads `key` through `lookup` and parses it; keeps `current` when the key is not set.
 */
fn override_from<T, L>(lookup: &L, key: &str, current: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    L: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(key) {
        *current = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_owned(),
            value,
        })?;
    }
    Ok(())
}

impl MandelbrotParams {
    /**
     * Overrides fields from environment variables (`COLORSTEP`, `XPOS`, `YPOS`,
     * `WIDTH`, `HEIGHT`, `MAXITERATION`, `ESCAPERADIUS`, `FILENAME`). The lookup
     * is injected so that callers can supply something other than the process
     * environment.
     */
    pub fn apply_env_overrides<L>(&mut self, lookup: L) -> Result<(), ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let spec = &mut self.image_specification;
        override_from(&lookup, "COLORSTEP", &mut self.color_map.color_step)?;
        override_from(&lookup, "XPOS", &mut spec.center_x)?;
        override_from(&lookup, "YPOS", &mut spec.center_y)?;
        override_from(&lookup, "WIDTH", &mut spec.width)?;
        override_from(&lookup, "HEIGHT", &mut spec.height)?;
        override_from(&lookup, "MAXITERATION", &mut spec.max_iteration)?;
        override_from(&lookup, "ESCAPERADIUS", &mut spec.escape_radius)?;
        if let Some(file_name) = lookup("FILENAME") {
            self.file_name = file_name;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let spec = &self.image_specification;
        for (field, value) in [
            ("width", spec.width),
            ("height", spec.height),
            ("max_iteration", spec.max_iteration),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositive { field });
            }
        }
        let color_step = self.color_map.color_step;
        if !(color_step.is_finite() && color_step > 0.0 && color_step <= MAX_COLOR_STEP) {
            return Err(ConfigError::InvalidColorStep {
                value: color_step,
                max: MAX_COLOR_STEP,
            });
        }
        if self.thread_count == Some(0) {
            return Err(ConfigError::NonPositive {
                field: "thread_count",
            });
        }
        Ok(())
    }

    /**
     * Builds the parameters used by a render: defaults, replaced by the contents of
     * the parameter file (if any), then overridden by the environment.
     */
    pub fn load<L>(params_path: Option<&Path>, lookup: L) -> Result<MandelbrotParams, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut params = match params_path {
            Some(path) => read_params_file(path)?,
            None => MandelbrotParams::default(),
        };
        params.apply_env_overrides(lookup)?;
        params.validate()?;
        Ok(params)
    }
}

/// Environment lookup backed by the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
