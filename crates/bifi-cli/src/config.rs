//! Run configuration for `bifi perf`.
//!
//! ```toml
//! [array]
//! bifaciality_factor = 0.7
//! temp_air = 22.0            # scalar or one value per timestamp
//! mounting = "glass-glass"
//! mismatch_fit = "fit3"
//!
//! [module]                   # inline coefficients ...
//! alpha_sc = 0.004539
//! a_ref = 2.6373
//! I_L_ref = 5.114
//! I_o_ref = 8.196e-10
//! R_sh_ref = 381.68
//! R_s = 1.065
//! Adjust = 8.7
//!
//! [front_only_module]        # ... or a library lookup
//! library = "cec_modules.csv"
//! name = "Canadian Solar CS5P-220M"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Library paths are resolved against the directory holding the config file.

use anyhow::{Context, Result};
use bifi_algo::ArraySettings;
use bifi_core::CecModuleParams;
use bifi_io::load_cec_module;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfConfig {
    #[serde(default)]
    pub array: ArraySettings,
    /// Module used for `Pout`
    pub module: ModuleConfig,
    /// Module used for `Pout_Gfront`; defaults to `module`
    #[serde(default)]
    pub front_only_module: Option<ModuleConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Where a module's CEC coefficients come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleConfig {
    Library { library: PathBuf, name: String },
    Inline(BTreeMap<String, serde_json::Value>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    pub fn level(&self) -> Result<tracing::Level> {
        self.level
            .parse()
            .with_context(|| format!("invalid log level '{}'", self.level))
    }
}

impl ModuleConfig {
    pub fn resolve(&self, base_dir: &Path) -> Result<CecModuleParams> {
        match self {
            ModuleConfig::Library { library, name } => {
                let path = base_dir.join(library);
                load_cec_module(&path, name)
                    .with_context(|| format!("loading '{name}' from {}", path.display()))
            }
            ModuleConfig::Inline(fields) => {
                CecModuleParams::from_fields(fields).context("reading inline module coefficients")
            }
        }
    }
}

impl PerfConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config = Self::from_toml(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn module(&self) -> Result<CecModuleParams> {
        self.module.resolve(&self.base_dir)
    }

    pub fn front_only_module(&self) -> Result<Option<CecModuleParams>> {
        self.front_only_module
            .as_ref()
            .map(|m| m.resolve(&self.base_dir))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bifi_algo::{MismatchFit, Mounting, Profile};

    const INLINE: &str = r#"
[array]
bifaciality_factor = 0.7
temp_air = [20.0, 21.5]
mounting = "glass-glass"
mismatch_fit = "fit2"

[module]
alpha_sc = 0.004539
a_ref = 2.6373
I_L_ref = 5.114
I_o_ref = 8.196e-10
R_sh_ref = 381.68
R_s = 1.065
Adjust = "8.7"
"#;

    #[test]
    fn inline_module_and_array_settings() {
        let config = PerfConfig::from_toml(INLINE).unwrap();
        assert_eq!(config.array.bifaciality_factor, 0.7);
        assert_eq!(config.array.temp_air, Some(Profile::Series(vec![20.0, 21.5])));
        assert_eq!(config.array.mounting, Mounting::GlassGlass);
        assert_eq!(config.array.mismatch_fit, MismatchFit::Fit2);
        assert_eq!(config.array.wind_speed, Profile::Constant(1.0));

        let module = config.module().unwrap();
        assert!((module.adjust - 8.7).abs() < 1e-12);
        assert!(config.front_only_module().unwrap().is_none());
        assert_eq!(config.logging.level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn library_module_is_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lib.csv"),
            "Name,alpha_sc,a_ref,I_L_ref,I_o_ref,R_sh_ref,R_s,Adjust\n\
             Test Module,0.004539,2.6373,5.114,8.196e-10,381.68,1.065,8.7\n",
        )
        .unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            "[module]\nlibrary = \"lib.csv\"\nname = \"Test Module\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = PerfConfig::load(&path).unwrap();
        assert!(matches!(config.module, ModuleConfig::Library { .. }));
        assert!((config.module().unwrap().i_l_ref - 5.114).abs() < 1e-12);
        assert_eq!(config.array.bifaciality_factor, 1.0);
        assert_eq!(config.logging.level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn missing_coefficient_is_reported() {
        let config = PerfConfig::from_toml("[module]\nalpha_sc = 0.004\n").unwrap();
        let err = config.module().unwrap_err();
        assert!(format!("{err:#}").contains("missing required field"));
    }

    #[test]
    fn bad_log_level() {
        let logging = LoggingConfig {
            level: "loud".to_string(),
        };
        assert!(logging.level().is_err());
    }
}
