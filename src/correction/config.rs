//! Correction batch configuration.
//!
//! A config file lists the cards to correct. It may be JSON or YAML, chosen
//! by extension:
//!
//! ```yaml
//! cards:
//!   - name: hillsborough-dem
//!     definition: defs/hillsborough-dem.xml
//!     detection: detections/hillsborough-dem.json
//!     output: out
//!     layout: party-columns
//! ```
//!
//! Relative paths resolve against the directory holding the config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AccuvoteError;
use crate::matching::BubbleLayout;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorrectionConfig {
    pub cards: Vec<CardConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardConfig {
    pub name: String,
    #[serde(rename = "definition")]
    pub definition_path: PathBuf,
    #[serde(rename = "detection")]
    pub detection_path: PathBuf,
    #[serde(rename = "output")]
    pub output_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<BubbleLayout>,
}

/// A card with every path made usable from the current directory.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedCard {
    pub name: String,
    pub definition_path: PathBuf,
    pub detection_path: PathBuf,
    pub output_dir: PathBuf,
    pub layout: Option<BubbleLayout>,
}

impl CorrectionConfig {
    /// Reads and validates the config at `path`.
    pub fn read(path: &Path) -> Result<Self, AccuvoteError> {
        let text = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let config: CorrectionConfig = match extension.as_deref() {
            Some("json") => serde_json::from_str(&text).map_err(|source| {
                AccuvoteError::ConfigParse {
                    path: path.to_path_buf(),
                    message: source.to_string(),
                }
            })?,
            Some("yaml" | "yml") => serde_yaml::from_str(&text).map_err(|source| {
                AccuvoteError::ConfigParse {
                    path: path.to_path_buf(),
                    message: source.to_string(),
                }
            })?,
            _ => {
                return Err(AccuvoteError::InvalidConfig {
                    path: path.to_path_buf(),
                    message: "config must be a .json, .yaml or .yml file".to_string(),
                })
            }
        };
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), AccuvoteError> {
        let invalid = |message: String| AccuvoteError::InvalidConfig {
            path: path.to_path_buf(),
            message,
        };
        if self.cards.is_empty() {
            return Err(invalid("no cards listed".to_string()));
        }
        for (index, card) in self.cards.iter().enumerate() {
            if card.name.trim().is_empty() {
                return Err(invalid(format!("card {index} has an empty name")));
            }
            let paths = [
                ("definition", &card.definition_path),
                ("detection", &card.detection_path),
                ("output", &card.output_dir),
            ];
            for (field, value) in paths {
                if value.as_os_str().is_empty() {
                    return Err(invalid(format!("card '{}' has an empty {field} path", card.name)));
                }
            }
        }
        Ok(())
    }

    /// Resolves every card's paths against the directory of `config_path`.
    pub fn resolve(&self, config_path: &Path) -> Vec<ResolvedCard> {
        let base = config_path.parent().unwrap_or_else(|| Path::new(""));
        self.cards
            .iter()
            .map(|card| ResolvedCard {
                name: card.name.clone(),
                definition_path: base.join(&card.definition_path),
                detection_path: base.join(&card.detection_path),
                output_dir: base.join(&card.output_dir),
                layout: card.layout,
            })
            .collect()
    }
}
