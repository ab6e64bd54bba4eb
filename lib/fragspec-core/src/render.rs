//! Rendering of the generated document.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tokio::fs;
use tracing::info;

use crate::{BuildError, Document, SpecBuilder};

/// Default indent width of the JSON output.
pub const DEFAULT_JSON_INDENT: usize = 2;

/// Renders a document as pretty JSON indented with `indent` spaces.
///
/// # Errors
///
/// Returns [`BuildError::Json`] if serialization fails.
pub fn render_json(document: &Document, indent: usize) -> Result<String, BuildError> {
    let indent = b" ".repeat(indent);
    let mut output = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut output, PrettyFormatter::with_indent(&indent));
    document.serialize(&mut serializer)?;

    String::from_utf8(output)
        .map_err(|err| BuildError::Json(<serde_json::Error as serde::ser::Error>::custom(err)))
}

impl SpecBuilder {
    /// Generates the document and renders it as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns the generation error, or [`BuildError::Json`].
    pub async fn to_json(&self, indent: usize) -> Result<String, BuildError> {
        render_json(self.generate().await?, indent)
    }

    /// Generates the document and renders it as YAML.
    ///
    /// # Errors
    ///
    /// Returns the generation error, or [`BuildError::Yaml`].
    #[cfg(feature = "yaml")]
    pub async fn to_yaml(&self) -> Result<String, BuildError> {
        use crate::ToYaml;

        self.generate().await?.to_yaml()
    }

    /// Generates the document and writes it to `path`.
    ///
    /// YAML is written for a `yml` or `yaml` extension, JSON otherwise. Parent
    /// directories are created.
    ///
    /// # Errors
    ///
    /// Returns the generation error, a rendering error or [`BuildError::Io`].
    pub async fn write_openapi(&self, path: impl AsRef<Path>) -> Result<(), BuildError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let ext = path.extension().unwrap_or_default();
        let contents = if ext == "yml" || ext == "yaml" {
            self.yaml_contents().await?
        } else {
            self.to_json(DEFAULT_JSON_INDENT).await?
        };

        fs::write(path, contents).await?;
        info!(path = %path.display(), "OpenAPI document written");
        Ok(())
    }

    #[cfg(feature = "yaml")]
    async fn yaml_contents(&self) -> Result<String, BuildError> {
        self.to_yaml().await
    }

    #[cfg(not(feature = "yaml"))]
    async fn yaml_contents(&self) -> Result<String, BuildError> {
        Err(BuildError::Yaml {
            message: "the `yaml` feature is disabled".to_string(),
        })
    }
}
