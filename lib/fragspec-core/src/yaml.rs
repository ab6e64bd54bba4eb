//! YAML serialization support using serde-saphyr.
//!
//! The YAML output is derived from the JSON output: the document is rendered as
//! JSON, parsed back into a [`serde_json::Value`] and that value is emitted as YAML.
//! Both renderings therefore always describe the same tree.
//!
//! This module is only available when the `yaml` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use fragspec_core::{SpecBuilder, ToYaml};
//!
//! let document = builder.generate().await?;
//! let yaml_string = document.to_yaml()?;
//!
//! std::fs::write("openapi.yml", yaml_string)?;
//! ```

use serde_json::Value;

use crate::render::{DEFAULT_JSON_INDENT, render_json};
use crate::{BuildError, Document};

/// Extension trait for serializing documents to YAML.
pub trait ToYaml {
    /// Serializes this value to a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Yaml`] if serialization fails.
    fn to_yaml(&self) -> Result<String, BuildError>;
}

impl ToYaml for Document {
    fn to_yaml(&self) -> Result<String, BuildError> {
        let json = render_json(self, DEFAULT_JSON_INDENT)?;
        let tree: Value = serde_json::from_str(&json)?;

        serde_saphyr::to_string(&tree).map_err(|err| BuildError::Yaml {
            message: format!("{err:#?}"),
        })
    }
}
