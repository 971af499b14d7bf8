//! Configuration file loader
//!
//! Loads the bridge configuration from a TOML file.
//! Falls back to the embedded defaults if the file is missing.

use std::fs;
use std::path::Path;

use heapless::String;
use heron_core::config::{BridgeConfig, MAX_PORT_LEN};

use crate::error::{Error, Result};

/// Embedded default configuration (compiled into the binary)
pub const EMBEDDED_CONFIG: &str = include_str!("../../heron.toml");

/// Values given on the command line that win over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<std::string::String>,
    pub baudrate: Option<u32>,
    pub period_ms: Option<u32>,
}

impl Overrides {
    /// Apply the overrides to a loaded configuration
    pub fn apply(&self, config: &mut BridgeConfig) -> Result<()> {
        if let Some(port) = &self.port {
            config.converter.port = String::<MAX_PORT_LEN>::try_from(port.as_str())
                .map_err(|_| Error::Other(format!("Serial port path too long: {}", port)))?;
        }
        if let Some(baudrate) = self.baudrate {
            config.converter.baudrate = baudrate;
        }
        if let Some(period_ms) = self.period_ms {
            config.period_ms = period_ms;
        }
        Ok(())
    }
}

/// Parse and validate a TOML configuration
pub fn parse_config(text: &str) -> Result<BridgeConfig> {
    let config: BridgeConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration from `path`, or the embedded one
///
/// Overrides are applied before validation so the command line can fix a
/// file that would otherwise be rejected.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<BridgeConfig> {
    let text = match path {
        Some(path) if path.exists() => {
            log::info!("Loading configuration from {}", path.display());
            fs::read_to_string(path)?
        }
        Some(path) => {
            log::warn!(
                "Config file {} not found, using embedded defaults",
                path.display()
            );
            EMBEDDED_CONFIG.to_string()
        }
        None => {
            log::info!("Using embedded configuration");
            EMBEDDED_CONFIG.to_string()
        }
    };

    let mut config: BridgeConfig = toml::from_str(&text)?;
    overrides.apply(&mut config)?;
    config.validate()?;

    log_config_summary(&config);
    Ok(config)
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &BridgeConfig) {
    log::info!(
        "Converter: {} @ {} baud ({:?} ids), period {} ms",
        config.converter.port,
        config.converter.baudrate,
        config.converter.address_width,
        config.period_ms
    );
    for node in &config.sensors {
        log::debug!("  node {:>2}: {} ({:?})", node.id, node.name, node.variant);
    }
    log::info!("{} sensor nodes registered", config.sensors.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::config::ConfigError;
    use heron_core::sensor::SensorVariant;
    use heron_protocol::AddressWidth;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = parse_config(EMBEDDED_CONFIG).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_config(
            r#"
            [[sensors]]
            id = 3
            name = "front"
            variant = "irus"
            "#,
        )
        .unwrap();

        assert_eq!(config.period_ms, 10);
        assert_eq!(config.converter.port, "/dev/ttyUSB0");
        assert_eq!(config.sensors.len(), 1);
        assert_eq!(config.sensors[0].variant, SensorVariant::InfraredUltrasonic);
    }

    #[test]
    fn test_extended_address_width() {
        let config = parse_config(
            r#"
            [converter]
            port = "/dev/ttyACM0"
            address_width = "extended"

            [[sensors]]
            id = 1
            name = "solo"
            "#,
        )
        .unwrap();

        assert_eq!(config.converter.address_width, AddressWidth::Extended);
        assert_eq!(config.sensors[0].variant, SensorVariant::Infrared);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = parse_config(
            r#"
            [[sensors]]
            id = 70
            name = "nowhere"
            "#,
        );
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::NodeIdOutOfRange(70)))
        ));

        assert!(matches!(
            parse_config("period_ms = \"fast\""),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let overrides = Overrides {
            port: Some("/dev/ttyS3".into()),
            baudrate: Some(1_228_800),
            period_ms: Some(50),
        };
        let config = load_config(None, &overrides).unwrap();
        assert_eq!(config.converter.port, "/dev/ttyS3");
        assert_eq!(config.converter.baudrate, 1_228_800);
        assert_eq!(config.period_ms, 50);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = load_config(
            Some(Path::new("/nonexistent/heron.toml")),
            &Overrides::default(),
        )
        .unwrap();
        assert_eq!(config, BridgeConfig::default());
    }
}
