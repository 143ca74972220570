//! # Recovery Configuration
//!
//! File names and defaults for a recovery run.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. --dir <DIR> (highest priority)                                     │
//! │     Base directory for every relative input and output path            │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     RECOVER_DIR=./exports                                              │
//! │     RECOVER_DEFAULT_SELLER_ID=7                                        │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <PATH>, else ./recover.toml when present                  │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     productos_rows.csv, ..., seller 1, customer 1, RECUPERADA          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # recover.toml
//! [input]
//! products = "productos_rows.csv"
//! invoices = "facturas_rows.csv"
//! operations = "operacion_stocks_rows.csv"
//!
//! [output]
//! invoices = "facturas_a_importar.csv"
//! lines = "detalle_facturas_a_importar.csv"
//!
//! [defaults]
//! seller_id = "1"
//! customer_id = "1"
//! number_prefix = "RECUPERADA"
//! timestamp_fallback = "now()"
//! ```

use std::path::{Path, PathBuf};

use recovery_core::{ReconcileDefaults, ValidationError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "recover.toml";

// =============================================================================
// Errors
// =============================================================================

/// Configuration and command line errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid default: {0}")]
    InvalidDefault(#[from] ValidationError),

    /// An output would overwrite an input or the other output.
    #[error("Output path {} is already used by another file", path.display())]
    PathConflict { path: PathBuf },

    #[error("Unknown argument: {0}")]
    UnknownArgument(String),

    #[error("Missing value for {0}")]
    MissingValue(String),
}

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Command Line
// =============================================================================

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub help: bool,
}

impl CliArgs {
    /// Parses arguments, excluding the program name.
    pub fn parse<I>(args: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let value = args.next().ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    parsed.config = Some(PathBuf::from(value));
                }
                "--dir" | "-d" => {
                    let value = args.next().ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    parsed.dir = Some(PathBuf::from(value));
                }
                "--help" | "-h" => parsed.help = true,
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        Ok(parsed)
    }
}

/// Usage text for `--help`.
pub const USAGE: &str = "\
Invoice Recovery

Usage: recover-invoices [OPTIONS]

Options:
  -c, --config <PATH>  TOML config file (default: ./recover.toml if present)
  -d, --dir <DIR>      Directory for relative input and output paths
  -h, --help           Show this help message

Environment:
  RECOVER_DIR                  Same as --dir
  RECOVER_DEFAULT_SELLER_ID    Seller for operations without vendedor_id
  RECOVER_DEFAULT_CUSTOMER_ID  Customer of every recovered invoice
  RECOVER_NUMBER_PREFIX        Prefix of numero_factura
  RUST_LOG                     Log filter (default: info)";

// =============================================================================
// File Settings
// =============================================================================

/// Export files read by a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InputFiles {
    #[serde(default = "default_products")]
    pub products: PathBuf,

    #[serde(default = "default_invoices")]
    pub invoices: PathBuf,

    #[serde(default = "default_operations")]
    pub operations: PathBuf,
}

fn default_products() -> PathBuf {
    PathBuf::from("productos_rows.csv")
}

fn default_invoices() -> PathBuf {
    PathBuf::from("facturas_rows.csv")
}

fn default_operations() -> PathBuf {
    PathBuf::from("operacion_stocks_rows.csv")
}

impl Default for InputFiles {
    fn default() -> Self {
        InputFiles {
            products: default_products(),
            invoices: default_invoices(),
            operations: default_operations(),
        }
    }
}

/// Import files written by a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputFiles {
    #[serde(default = "default_invoice_output")]
    pub invoices: PathBuf,

    #[serde(default = "default_line_output")]
    pub lines: PathBuf,
}

fn default_invoice_output() -> PathBuf {
    PathBuf::from("facturas_a_importar.csv")
}

fn default_line_output() -> PathBuf {
    PathBuf::from("detalle_facturas_a_importar.csv")
}

impl Default for OutputFiles {
    fn default() -> Self {
        OutputFiles {
            invoices: default_invoice_output(),
            lines: default_line_output(),
        }
    }
}

// =============================================================================
// Recovery Configuration
// =============================================================================

/// Complete configuration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecoveryConfig {
    #[serde(default)]
    pub input: InputFiles,

    #[serde(default)]
    pub output: OutputFiles,

    /// Values for fields the operations lack.
    #[serde(default)]
    pub defaults: ReconcileDefaults,

    /// Base directory for relative paths.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl RecoveryConfig {
    /// Loads configuration from file, environment, and command line.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else `recover.toml` when present)
    /// 3. Environment variables
    /// 4. `dir`
    pub fn load(config_path: Option<PathBuf>, dir: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path)),
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env_overrides();

        if let Some(dir) = dir {
            config.base_dir = Some(dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(path = %path.display(), "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.defaults.validate()?;

        let inputs = [
            self.products_path(),
            self.invoices_path(),
            self.operations_path(),
        ];
        let invoices_out = self.invoice_output_path();
        let lines_out = self.line_output_path();

        for output in [&invoices_out, &lines_out] {
            if inputs.contains(output) {
                return Err(ConfigError::PathConflict {
                    path: output.clone(),
                });
            }
        }
        if invoices_out == lines_out {
            return Err(ConfigError::PathConflict { path: lines_out });
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Base directory
        if let Some(dir) = lookup("RECOVER_DIR") {
            debug!(dir = %dir, "Overriding base directory from environment");
            self.base_dir = Some(PathBuf::from(dir));
        }

        // Defaults
        if let Some(id) = lookup("RECOVER_DEFAULT_SELLER_ID") {
            debug!(seller_id = %id, "Overriding default seller from environment");
            self.defaults.seller_id = id;
        }

        if let Some(id) = lookup("RECOVER_DEFAULT_CUSTOMER_ID") {
            debug!(customer_id = %id, "Overriding default customer from environment");
            self.defaults.customer_id = id;
        }

        if let Some(prefix) = lookup("RECOVER_NUMBER_PREFIX") {
            self.defaults.number_prefix = prefix;
        }
    }

    // =========================================================================
    // Resolved Paths
    // =========================================================================

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn products_path(&self) -> PathBuf {
        self.resolve(&self.input.products)
    }

    pub fn invoices_path(&self) -> PathBuf {
        self.resolve(&self.input.invoices)
    }

    pub fn operations_path(&self) -> PathBuf {
        self.resolve(&self.input.operations)
    }

    pub fn invoice_output_path(&self) -> PathBuf {
        self.resolve(&self.output.invoices)
    }

    pub fn line_output_path(&self) -> PathBuf {
        self.resolve(&self.output.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cli_parsing() {
        let parsed = CliArgs::parse(args(&["--dir", "exports", "-c", "alt.toml"])).unwrap();
        assert_eq!(parsed.dir, Some(PathBuf::from("exports")));
        assert_eq!(parsed.config, Some(PathBuf::from("alt.toml")));
        assert!(!parsed.help);

        assert!(CliArgs::parse(args(&["-h"])).unwrap().help);
        assert_eq!(CliArgs::parse(args(&[])).unwrap(), CliArgs::default());
    }

    #[test]
    fn test_cli_errors() {
        assert!(matches!(
            CliArgs::parse(args(&["--dir"])),
            Err(ConfigError::MissingValue(flag)) if flag == "--dir"
        ));
        assert!(matches!(
            CliArgs::parse(args(&["productos.csv"])),
            Err(ConfigError::UnknownArgument(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = RecoveryConfig::default();
        assert_eq!(config.products_path(), PathBuf::from("productos_rows.csv"));
        assert_eq!(config.operations_path(), PathBuf::from("operacion_stocks_rows.csv"));
        assert_eq!(config.line_output_path(), PathBuf::from("detalle_facturas_a_importar.csv"));
        assert_eq!(config.defaults.number_prefix, "RECUPERADA");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: RecoveryConfig = toml::from_str(
            r#"
            [input]
            products = "items.csv"

            [defaults]
            customer_id = "500"
            "#,
        )
        .unwrap();

        assert_eq!(config.input.products, PathBuf::from("items.csv"));
        assert_eq!(config.input.invoices, PathBuf::from("facturas_rows.csv"));
        assert_eq!(config.output, OutputFiles::default());
        assert_eq!(config.defaults.customer_id, "500");
        assert_eq!(config.defaults.seller_id, "1");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RECOVER_DIR", "/data/exports"),
            ("RECOVER_DEFAULT_SELLER_ID", "12"),
            ("RECOVER_NUMBER_PREFIX", "REC"),
        ]
        .into_iter()
        .collect();

        let mut config = RecoveryConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.defaults.seller_id, "12");
        assert_eq!(config.defaults.customer_id, "1");
        assert_eq!(config.defaults.number_prefix, "REC");
        assert_eq!(
            config.products_path(),
            PathBuf::from("/data/exports/productos_rows.csv")
        );
    }

    #[test]
    fn test_absolute_paths_ignore_base_dir() {
        let mut config = RecoveryConfig {
            base_dir: Some(PathBuf::from("exports")),
            ..Default::default()
        };
        config.input.invoices = PathBuf::from("/srv/facturas.csv");

        assert_eq!(config.invoices_path(), PathBuf::from("/srv/facturas.csv"));
        assert_eq!(config.products_path(), PathBuf::from("exports/productos_rows.csv"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = RecoveryConfig::default();
        config.defaults.seller_id = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDefault(_))));

        let mut config = RecoveryConfig::default();
        config.output.invoices = PathBuf::from("facturas_rows.csv");
        assert!(matches!(config.validate(), Err(ConfigError::PathConflict { .. })));

        let mut config = RecoveryConfig::default();
        config.output.lines = config.output.invoices.clone();
        assert!(matches!(config.validate(), Err(ConfigError::PathConflict { .. })));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let missing = std::env::temp_dir().join(format!("recover-{}.toml", uuid::Uuid::new_v4()));
        assert!(matches!(
            RecoveryConfig::load(Some(missing), None),
            Err(ConfigError::NotFound(_))
        ));
    }
}
