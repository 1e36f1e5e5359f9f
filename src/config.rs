//! Configuration loader - YAML manifest + .env environment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color::Rgb;
use crate::layout::LayoutConfig;
use crate::registry::{AllianceConfig, BlockSegment};
use crate::seat_colors::Palette;

/// Main configuration loaded from assembly.yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub palette: Palette,
    pub alliances: Vec<AllianceConfig>,
    /// Seats deliberately left outside every alliance block
    #[serde(default)]
    pub unallocated: Vec<BlockSegment>,
    /// Pinned seat order fingerprint; startup fails if the layout differs
    #[serde(default)]
    pub expected_order: Option<String>,
    /// Declared seat total, checked against the layout
    #[serde(default)]
    pub total_seats: Option<usize>,
}

/// Paths from the environment (.env or process)
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub timeline: PathBuf,
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise the built-in assembly
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading config from {:?}", path);
            Self::load(path)
        } else {
            tracing::warn!("Config file not found: {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn alliance(&self, id: &str) -> Option<&AllianceConfig> {
        self.alliances.iter().find(|a| a.id == id)
    }
}

impl Default for Config {
    /// The 243-seat assembly: INDIA on the left spokes, NDA on the right
    fn default() -> Self {
        let block = |spokes: &[&str]| -> Vec<BlockSegment> {
            spokes.iter().map(|s| BlockSegment::spoke(s)).collect()
        };
        Self {
            layout: LayoutConfig::default(),
            palette: Palette::default(),
            alliances: vec![
                AllianceConfig {
                    id: "NDA".to_string(),
                    name: "NDA".to_string(),
                    color: Rgb::new(0xff, 0xb3, 0x47),
                    block: block(&["C-R", "S5", "S6"]),
                },
                AllianceConfig {
                    id: "INDIA".to_string(),
                    name: "INDIA Bloc".to_string(),
                    color: Rgb::new(0x2e, 0xcc, 0x40),
                    block: block(&["S1", "S2", "C-L"]),
                },
                AllianceConfig {
                    id: "OTHERS".to_string(),
                    name: "Others".to_string(),
                    color: Rgb::new(0xb3, 0x9d, 0xff),
                    block: vec![],
                },
            ],
            unallocated: vec![],
            expected_order: None,
            total_seats: Some(243),
        }
    }
}

impl Environment {
    /// Load environment from .env file and process variables
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str, default: &str| {
            PathBuf::from(lookup(key).unwrap_or_else(|| default.to_string()))
        };
        Environment {
            timeline: path("ASSEMBLY_TIMELINE", "data/election_timeline.json"),
            output_dir: path("ASSEMBLY_OUTPUT_DIR", "./output"),
            log_dir: path("ASSEMBLY_LOG_DIR", "logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r##"
layout:
  walkway_outer: 2.5
  max_fanout_passes: 32
palette:
  undeclared: "#808080"
alliances:
  - id: LEFT
    name: Left Bench
    color: "#2ECC40"
    block:
      - spoke: S1
      - spoke: S2
      - spoke: C-L
  - id: RIGHT
    name: Right Bench
    color: "#FFB347"
    block:
      - spoke: C-R
      - start: 143
        len: 100
total_seats: 243
"##;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.layout.total_seats(), 243);
        assert_eq!(config.total_seats, Some(243));
        assert_eq!(config.alliances.len(), 3);
        assert!(config.alliance("OTHERS").unwrap().block.is_empty());
        assert_eq!(config.alliance("INDIA").unwrap().color.to_hex(), "#2ecc40");
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.layout.walkway_outer, 2.5);
        assert_eq!(config.layout.max_fanout_passes, 32);
        // Unspecified fields keep their defaults
        assert_eq!(config.layout.walkway_center, 1.6);
        assert_eq!(config.layout.spokes.len(), 6);
        assert_eq!(config.palette.undeclared, Rgb::new(0x80, 0x80, 0x80));
        assert_eq!(config.palette.lead_shade_factor, 0.45);
        assert_eq!(
            config.alliance("RIGHT").unwrap().block[1],
            BlockSegment::Range { start: 143, len: 100 }
        );
        assert_eq!(config.expected_order, None);
    }

    #[test]
    fn test_load_errors() {
        assert!(Config::load("/nonexistent/assembly.yaml").is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"alliances: [{ id: X, name: X, color: red }]").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("assembly.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_environment_defaults_and_overrides() {
        let env = Environment::from_lookup(|_| None);
        assert_eq!(env.timeline, PathBuf::from("data/election_timeline.json"));
        assert_eq!(env.output_dir, PathBuf::from("./output"));
        assert_eq!(env.log_dir, PathBuf::from("logs"));

        let env = Environment::from_lookup(|key| {
            (key == "ASSEMBLY_OUTPUT_DIR").then(|| "/tmp/out".to_string())
        });
        assert_eq!(env.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(env.log_dir, PathBuf::from("logs"));
    }
}
