//! @ai:module:intent Load user extension -> template overrides from a JSON file
//! @ai:module:layer infrastructure
//! @ai:module:public_api ExtensionOverrides, load_overrides
//! @ai:module:depends_on template, error

use crate::error::{Error, Result};
use crate::template::TemplateTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// @ai:intent Extension -> template strings, e.g. {"toml": ["#LINT.?"]}
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ExtensionOverrides(pub BTreeMap<String, Vec<String>>);

impl ExtensionOverrides {
    /// @ai:intent Parse overrides from JSON text
    /// @ai:effects pure
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// @ai:intent Register every override on top of a table
    /// @ai:post defaults already in the table are kept
    /// @ai:effects pure
    pub fn apply(&self, mut table: TemplateTable) -> Result<TemplateTable> {
        for (extension, templates) in &self.0 {
            for template in templates {
                table = table.with(extension, template)?;
            }
        }
        Ok(table)
    }
}

/// @ai:intent Read and parse an overrides file
/// @ai:effects fs:read
pub fn load_overrides(path: &Path) -> Result<ExtensionOverrides> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    ExtensionOverrides::from_json(&content).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
