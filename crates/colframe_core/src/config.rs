//! Process-wide execution settings.

use std::collections::HashMap;
use std::sync::LazyLock;

use colframe_error::{FrameError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::scalar::ScalarValue;

pub const DEFAULT_PARALLEL_GATHER_MIN_ROWS: usize = 65_536;
pub const DEFAULT_DISPLAY_MAX_ROWS: usize = 10;
pub const DEFAULT_CSV_INFER_SAMPLE_ROWS: usize = 1000;

/// Environment variable prefix for overriding settings.
pub const ENV_PREFIX: &str = "COLFRAME_";

static GLOBAL_CONFIG: LazyLock<RwLock<ExecutionConfig>> =
    LazyLock::new(|| RwLock::new(ExecutionConfig::default()));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Row count at which multi-column gathers run per column in parallel.
    pub parallel_gather_min_rows: usize,
    /// Rows rendered when displaying a dataframe.
    pub display_max_rows: usize,
    /// Records examined when inferring CSV column types.
    pub csv_infer_sample_rows: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            parallel_gather_min_rows: DEFAULT_PARALLEL_GATHER_MIN_ROWS,
            display_max_rows: DEFAULT_DISPLAY_MAX_ROWS,
            csv_infer_sample_rows: DEFAULT_CSV_INFER_SAMPLE_ROWS,
        }
    }
}

impl ExecutionConfig {
    /// Snapshot of the process-wide config.
    pub fn global() -> ExecutionConfig {
        GLOBAL_CONFIG.read().clone()
    }

    /// Replace the process-wide config.
    pub fn set_global(config: ExecutionConfig) {
        *GLOBAL_CONFIG.write() = config;
    }

    /// Build a config from defaults, overriding any setting that has a
    /// corresponding `COLFRAME_<NAME>` environment variable.
    pub fn from_env() -> Result<Self> {
        let mut conf = ExecutionConfig::default();
        for name in Self::setting_names() {
            let var = format!("{ENV_PREFIX}{}", name.to_uppercase());
            if let Ok(val) = std::env::var(&var) {
                conf.set_from_str(name, &val)?;
            }
        }
        Ok(conf)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| FrameError::InvalidArgument(format!("Invalid config: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| FrameError::InvalidArgument(format!("Failed to serialize config: {e}")))
    }

    /// Names of all settings, sorted.
    pub fn setting_names() -> Vec<&'static str> {
        let mut names: Vec<_> = GET_SET_FUNCTIONS.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn set_from_scalar(&mut self, name: &str, value: ScalarValue) -> Result<()> {
        let func = get_functions(name)?;
        (func.set)(value, self)
    }

    /// Set a setting by parsing a string value.
    pub fn set_from_str(&mut self, name: &str, value: &str) -> Result<()> {
        let func = get_functions(name)?;
        let parsed: i64 = value.trim().parse().map_err(|_| {
            FrameError::InvalidArgument(format!(
                "Invalid value '{value}' for setting '{name}'"
            ))
        })?;
        (func.set)(ScalarValue::Int64(parsed), self)
    }

    pub fn get_as_scalar(&self, name: &str) -> Result<ScalarValue> {
        let func = get_functions(name)?;
        Ok((func.get)(self))
    }

    /// Reset a single setting to its default.
    pub fn reset(&mut self, name: &str) -> Result<()> {
        let def_conf = Self::default();
        let func = get_functions(name)?;
        let scalar = (func.get)(&def_conf);
        (func.set)(scalar, self)
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }
}

fn get_functions(name: &str) -> Result<&'static SettingFunctions> {
    GET_SET_FUNCTIONS
        .get(name)
        .ok_or_else(|| FrameError::InvalidArgument(format!("Missing setting for '{name}'")))
}

struct SettingFunctions {
    set: fn(scalar: ScalarValue, conf: &mut ExecutionConfig) -> Result<()>,
    get: fn(conf: &ExecutionConfig) -> ScalarValue,
}

impl SettingFunctions {
    const fn new<S: ExecutionSetting>() -> Self {
        SettingFunctions {
            set: S::set_from_scalar as _,
            get: S::get_as_scalar as _,
        }
    }
}

fn insert_setting<S: ExecutionSetting>(map: &mut HashMap<&'static str, SettingFunctions>) {
    if map.insert(S::NAME, SettingFunctions::new::<S>()).is_some() {
        panic!("Duplicate settings names: {}", S::NAME);
    }
}

static GET_SET_FUNCTIONS: LazyLock<HashMap<&'static str, SettingFunctions>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    insert_setting::<ParallelGatherMinRows>(&mut map);
    insert_setting::<DisplayMaxRows>(&mut map);
    insert_setting::<CsvInferSampleRows>(&mut map);

    map
});

pub trait ExecutionSetting: Sync + Send + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn set_from_scalar(scalar: ScalarValue, conf: &mut ExecutionConfig) -> Result<()>;
    fn get_as_scalar(conf: &ExecutionConfig) -> ScalarValue;
}

/// Convert a scalar into a usize no less than `min`.
fn scalar_as_usize(name: &str, scalar: &ScalarValue, min: usize) -> Result<usize> {
    let val = scalar
        .as_i128()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| {
            FrameError::InvalidArgument(format!(
                "Setting '{name}' expects a non-negative integer, got {scalar}"
            ))
        })?;

    if val < min {
        return Err(FrameError::InvalidArgument(format!(
            "Setting '{name}' cannot be less than {min}"
        )));
    }

    Ok(val)
}

pub struct ParallelGatherMinRows;

impl ExecutionSetting for ParallelGatherMinRows {
    const NAME: &'static str = "parallel_gather_min_rows";
    const DESCRIPTION: &'static str =
        "Minimum row count for gathering columns in parallel";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut ExecutionConfig) -> Result<()> {
        conf.parallel_gather_min_rows = scalar_as_usize(Self::NAME, &scalar, 1)?;
        Ok(())
    }

    fn get_as_scalar(conf: &ExecutionConfig) -> ScalarValue {
        (conf.parallel_gather_min_rows as u64).into()
    }
}

pub struct DisplayMaxRows;

impl ExecutionSetting for DisplayMaxRows {
    const NAME: &'static str = "display_max_rows";
    const DESCRIPTION: &'static str = "Maximum number of rows shown when displaying a dataframe";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut ExecutionConfig) -> Result<()> {
        conf.display_max_rows = scalar_as_usize(Self::NAME, &scalar, 0)?;
        Ok(())
    }

    fn get_as_scalar(conf: &ExecutionConfig) -> ScalarValue {
        (conf.display_max_rows as u64).into()
    }
}

pub struct CsvInferSampleRows;

impl ExecutionSetting for CsvInferSampleRows {
    const NAME: &'static str = "csv_infer_sample_rows";
    const DESCRIPTION: &'static str = "Number of CSV records to read when inferring column types";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut ExecutionConfig) -> Result<()> {
        conf.csv_infer_sample_rows = scalar_as_usize(Self::NAME, &scalar, 1)?;
        Ok(())
    }

    fn get_as_scalar(conf: &ExecutionConfig) -> ScalarValue {
        (conf.csv_infer_sample_rows as u64).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_reset() {
        let mut conf = ExecutionConfig::default();

        conf.set_from_scalar("display_max_rows", ScalarValue::Int32(4))
            .unwrap();
        assert_eq!(4, conf.display_max_rows);
        assert_eq!(
            ScalarValue::UInt64(4),
            conf.get_as_scalar("display_max_rows").unwrap()
        );

        conf.reset("display_max_rows").unwrap();
        assert_eq!(DEFAULT_DISPLAY_MAX_ROWS, conf.display_max_rows);
    }

    #[test]
    fn set_from_str() {
        let mut conf = ExecutionConfig::default();
        conf.set_from_str("parallel_gather_min_rows", " 128 ").unwrap();
        assert_eq!(128, conf.parallel_gather_min_rows);

        conf.set_from_str("parallel_gather_min_rows", "abc")
            .unwrap_err();
        conf.set_from_str("parallel_gather_min_rows", "0")
            .unwrap_err();
        conf.set_from_str("does_not_exist", "1").unwrap_err();
    }

    #[test]
    fn json_round_trip_with_defaults() {
        let conf = ExecutionConfig::from_json(r#"{"display_max_rows": 3}"#).unwrap();
        assert_eq!(3, conf.display_max_rows);
        assert_eq!(
            DEFAULT_CSV_INFER_SAMPLE_ROWS,
            conf.csv_infer_sample_rows
        );

        let s = conf.to_json().unwrap();
        assert_eq!(conf, ExecutionConfig::from_json(&s).unwrap());
    }

    #[test]
    fn setting_names_sorted() {
        assert_eq!(
            vec![
                "csv_infer_sample_rows",
                "display_max_rows",
                "parallel_gather_min_rows"
            ],
            ExecutionConfig::setting_names()
        );
    }
}
