use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cygnuslib::types::ChainConfig;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing, into a daily rolling file under `log_dir` if given, otherwise stderr.
/// `RUST_LOG` overrides the default `info` level.
pub fn setup_tracing(log_dir: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match log_dir {
        Some(dir) => {
            let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "difftest.log");
            registry
                .with(fmt::layer().with_writer(file_appender).with_ansi(false))
                .try_init()?;
        }
        None => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
    }
    Ok(())
}

/// Load the fork schedule from a TOML file, or run Homestead from `homestead_block`.
pub fn load_config(path: Option<&PathBuf>, homestead_block: u64) -> Result<ChainConfig> {
    match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)
            .with_context(|| format!("Failed to read config file: {}", path.display())),
        None => Ok(ChainConfig::homestead(homestead_block)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_config_fills_missing_forks() {
        let config: ChainConfig =
            toml::from_str("homestead_block = 1150000\nbyzantium_block = 4370000\n").unwrap();
        assert_eq!(config.homestead_block, Some(1_150_000));
        assert_eq!(config.byzantium_block, Some(4_370_000));
        assert_eq!(config.london_block, None);
    }

    #[test]
    fn falls_back_to_homestead_block() {
        let config = load_config(None, 42).unwrap();
        assert_eq!(config, ChainConfig::homestead(42));
    }
}
