//! Error type for document assembly and rendering.

use std::path::PathBuf;

use crate::ComponentKind;

/// Errors that can occur while assembling, generating or rendering a document.
///
/// Every error is returned synchronously by the call that caused it.
/// A failed insertion leaves the previously accumulated fragments intact.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum BuildError {
    /// The document has already been generated and no longer accepts changes.
    #[display("Cannot modify the document after it has been generated")]
    #[from(skip)]
    FrozenDocument,

    /// A component fragment was added without a non-empty string `logicalName`.
    #[display("Cannot add {category} fragment without a 'logicalName' key")]
    #[from(skip)]
    MissingIdentity {
        /// The bucket the fragment was meant for.
        category: ComponentKind,
    },

    /// A category name outside the nine OpenAPI component categories.
    #[display("Invalid component category '{name}'")]
    #[from(skip)]
    InvalidCategory {
        /// The rejected name.
        name: String,
    },

    /// A path item was added without a string `location` key.
    #[display("Cannot add path item without a 'location' key")]
    #[from(skip)]
    InvalidLocation,

    /// A fragment source is not an existing directory.
    #[display("Provided source '{}' is not a directory", path.display())]
    #[from(skip)]
    NotADirectory {
        /// The rejected path.
        path: PathBuf,
    },

    /// I/O failure while discovering, reading or writing files.
    Io(std::io::Error),

    /// JSON rendering or parsing failure.
    Json(serde_json::Error),

    /// A fragment file could not be parsed.
    #[display("Failed to parse fragment '{}': {message}", path.display())]
    #[from(skip)]
    FragmentParse {
        /// The fragment file.
        path: PathBuf,
        /// The parser message.
        message: String,
    },

    /// YAML rendering failure.
    #[display("YAML serialization failed: {message}")]
    #[from(skip)]
    Yaml {
        /// The serializer message.
        message: String,
    },

    /// A fragment loading task panicked or was cancelled.
    #[display("Fragment loading task failed: {message}")]
    #[from(skip)]
    Task {
        /// The join error message.
        message: String,
    },
}
