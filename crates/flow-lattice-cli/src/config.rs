//! Configuration handling

use anyhow::{bail, Context, Result};
use flow_lattice::{Lattice, Registry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Main configuration file
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where lattice specifications are loaded from
    #[serde(default)]
    pub lattices: LatticesConfig,

    /// State lattices attached to base lattices
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// `[lattices]` section
#[derive(Debug, Serialize, Deserialize)]
pub struct LatticesConfig {
    /// JSON files, each holding one lattice object or an array of them.
    /// Relative paths are resolved against the config file's directory.
    #[serde(default = "default_lattice_files")]
    pub files: Vec<String>,
}

impl Default for LatticesConfig {
    fn default() -> Self {
        Self {
            files: default_lattice_files(),
        }
    }
}

fn default_lattice_files() -> Vec<String> {
    vec!["lattices.json".to_string()]
}

/// `base × state` composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfig {
    /// Lattice receiving the state lattice
    pub base: String,
    /// Lattice used as the second component
    pub state: String,
}

impl Config {
    /// Load config from a file path
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path).to_string();
        let path = Path::new(&expanded);

        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the configured lattice files against `base_dir`.
    pub fn lattice_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.lattices
            .files
            .iter()
            .map(|file| {
                let path = PathBuf::from(shellexpand::tilde(file).into_owned());
                if path.is_relative() {
                    base_dir.join(path)
                } else {
                    path
                }
            })
            .collect()
    }

    /// Load every lattice file, attach the configured state lattices and
    /// build the registry policies are parsed against.
    pub fn load_registry(&self, base_dir: &Path) -> Result<Registry> {
        let mut lattices: BTreeMap<String, Lattice> = BTreeMap::new();
        for path in self.lattice_paths(base_dir) {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read lattice file {}", path.display()))?;
            let loaded = Lattice::many_from_json(&json)
                .with_context(|| format!("invalid lattice file {}", path.display()))?;
            for lattice in loaded {
                let name = lattice.name().to_string();
                if lattices.insert(name.clone(), lattice).is_some() {
                    bail!("lattice '{}' is defined twice (again in {})", name, path.display());
                }
            }
        }

        // States are taken as loaded, before any product is attached.
        let plain: BTreeMap<String, Arc<Lattice>> = lattices
            .iter()
            .map(|(name, lattice)| (name.clone(), Arc::new(lattice.clone())))
            .collect();
        for product in &self.products {
            let state = plain.get(&product.state).with_context(|| {
                format!("product state lattice '{}' is not loaded", product.state)
            })?;
            let base = lattices.get_mut(&product.base).with_context(|| {
                format!("product base lattice '{}' is not loaded", product.base)
            })?;
            base.product(Arc::clone(state));
        }

        info!(
            lattices = lattices.len(),
            products = self.products.len(),
            "loaded lattices"
        );
        Ok(Registry::new(lattices.into_values())?)
    }
}

/// Show configuration
pub fn show(config: &Config, config_path: &str) -> Result<()> {
    println!("flowlat configuration");
    println!("=====================");
    println!();
    println!("Config file: {}", config_path);
    println!();

    println!("[lattices]");
    let files: Vec<String> = config
        .lattices
        .files
        .iter()
        .map(|f| format!("\"{}\"", f))
        .collect();
    println!("  files = [{}]", files.join(", "));

    for product in &config.products {
        println!();
        println!("[[products]]");
        println!("  base = \"{}\"", product.base);
        println!("  state = \"{}\"", product.state);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DATA_TYPE: &str = r#"{ "name": "DataType",
        "edges": { "UniqueID": ["AccountID", "IPAddress"], "Location": ["IPAddress"] } }"#;

    const STATES: &str = r#"[
        { "name": "TypeState", "edges": { "Truncated": ["Redacted"], "Hashed": [] } },
        { "name": "Purpose", "edges": { "Sharing": [] } }
    ]"#;

    fn write_lattices(dir: &Path) {
        std::fs::write(dir.join("data_type.json"), DATA_TYPE).unwrap();
        std::fs::write(dir.join("states.json"), STATES).unwrap();
    }

    fn two_files() -> Config {
        Config {
            lattices: LatticesConfig {
                files: vec!["data_type.json".into(), "states.json".into()],
            },
            products: Vec::new(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.lattices.files, vec!["lattices.json"]);
        assert!(config.products.is_empty());
    }

    #[test]
    fn test_load_nonexistent_file_returns_default() {
        let config = Config::load("/nonexistent/path/flowlat.toml").unwrap();
        assert_eq!(config.lattices.files, vec!["lattices.json"]);
    }

    #[test]
    fn test_load_valid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[lattices]
files = ["data_type.json", "/etc/flowlat/states.json"]

[[products]]
base = "DataType"
state = "TypeState"
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(
            config.lattices.files,
            vec!["data_type.json", "/etc/flowlat/states.json"]
        );
        assert_eq!(
            config.products,
            vec![ProductConfig {
                base: "DataType".into(),
                state: "TypeState".into(),
            }]
        );
    }

    #[test]
    fn test_load_partial_toml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[lattices]").unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.lattices.files, vec!["lattices.json"]);
        assert!(config.products.is_empty());
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[[[not valid toml").unwrap();

        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_lattice_paths_resolve_relative_files() {
        let config = Config {
            lattices: LatticesConfig {
                files: vec!["a.json".into(), "/abs/b.json".into()],
            },
            products: Vec::new(),
        };
        let paths = config.lattice_paths(Path::new("/home/user/.config/flowlat"));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/home/user/.config/flowlat/a.json"),
                PathBuf::from("/abs/b.json"),
            ]
        );
    }

    #[test]
    fn test_load_registry_with_product() {
        let dir = tempfile::tempdir().unwrap();
        write_lattices(dir.path());
        let mut config = two_files();
        config.products.push(ProductConfig {
            base: "DataType".into(),
            state: "TypeState".into(),
        });

        let registry = config.load_registry(dir.path()).unwrap();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["DataType", "Purpose", "TypeState"]
        );
        let data_type = registry.get("DataType").unwrap();
        assert_eq!(data_type.state().map(Lattice::name), Some("TypeState"));
        assert!(registry.get("TypeState").unwrap().state().is_none());
    }

    #[test]
    fn test_load_registry_rejects_unknown_product() {
        let dir = tempfile::tempdir().unwrap();
        write_lattices(dir.path());
        let mut config = two_files();
        config.products.push(ProductConfig {
            base: "DataType".into(),
            state: "Retention".into(),
        });

        let err = config.load_registry(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Retention"));
    }

    #[test]
    fn test_load_registry_rejects_duplicate_lattices() {
        let dir = tempfile::tempdir().unwrap();
        write_lattices(dir.path());
        let mut config = two_files();
        config.lattices.files.push("data_type.json".into());

        let err = config.load_registry(dir.path()).unwrap_err();
        assert!(err.to_string().contains("defined twice"));
    }

    #[test]
    fn test_load_registry_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::default().load_registry(dir.path()).unwrap_err();
        assert!(err.to_string().contains("lattices.json"));
    }
}
