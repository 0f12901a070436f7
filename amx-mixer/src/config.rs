//! amx-mixer specific configuration

use amx_common::config::TomlConfig;
use amx_common::Result;
use std::path::PathBuf;

/// Settings the pipeline reads on every request
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Parent of per-request staging directories (OS temp dir if unset)
    pub temp_dir: Option<PathBuf>,
    /// Object key prefix for published mixes
    pub key_prefix: String,
    pub bitrate_kbps: u32,
    /// Upper bound on `voice_urls` per request
    pub max_voices: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&TomlConfig::default())
    }
}

impl From<&TomlConfig> for PipelineSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            temp_dir: config.temp_dir.clone(),
            key_prefix: config.storage.key_prefix.clone(),
            bitrate_kbps: config.encoding.bitrate_kbps,
            max_voices: config.fetch.max_voices,
        }
    }
}

/// Server bootstrap settings
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub toml: TomlConfig,
}

impl Config {
    /// Apply command-line overrides on top of the loaded TOML.
    pub fn new(toml: TomlConfig, port_override: Option<u16>) -> Result<Self> {
        toml.validate()?;
        Ok(Self {
            bind_addr: toml.bind_addr.clone(),
            port: port_override.unwrap_or(toml.port),
            toml,
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings::from(&self.toml)
    }

    /// Default `EnvFilter` directives when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> String {
        let level = &self.toml.logging.level;
        format!("amx_mixer={level},amx_common={level},tower_http={level}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_override() {
        let config = Config::new(TomlConfig::default(), Some(9999)).unwrap();
        assert_eq!(config.port, 9999);

        let config = Config::new(TomlConfig::default(), None).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_pipeline_settings_from_toml() {
        let toml = TomlConfig::from_toml_str(
            "temp_dir = \"/var/tmp/amx\"\n[storage]\nkey_prefix = \"mixes\"\n[fetch]\nmax_voices = 4\n[encoding]\nbitrate_kbps = 128",
        )
        .unwrap();
        let settings = PipelineSettings::from(&toml);
        assert_eq!(settings.key_prefix, "mixes");
        assert_eq!(settings.bitrate_kbps, 128);
        assert_eq!(settings.max_voices, 4);
        assert_eq!(settings.temp_dir, Some(PathBuf::from("/var/tmp/amx")));
    }

    #[test]
    fn test_log_filter() {
        let config = Config::new(TomlConfig::default(), None).unwrap();
        assert_eq!(
            config.default_log_filter(),
            "amx_mixer=info,amx_common=info,tower_http=info"
        );
    }

    #[test]
    fn test_invalid_toml_values_rejected() {
        let mut toml = TomlConfig::default();
        toml.encoding.bitrate_kbps = 0;
        assert!(Config::new(toml, None).is_err());
    }
}
