//! # Fragspec Core
//!
//! Assemble an OpenAPI document out of reusable fragments, then fold every fragment
//! embedded by value into a `$ref` to its single definition under `components`.
//!
//! Fragments are plain JSON values. Component fragments carry their logical name in
//! a `logicalName` key; path items carry their path in a `location` key. Both keys are
//! bookkeeping and never appear in the generated document.
//!
//! ## Quick Start
//!
//! ```rust
//! use fragspec_core::{ComponentKind, Info, SpecBuilder};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), fragspec_core::BuildError> {
//! let pet = json!({
//!     "logicalName": "Pet",
//!     "type": "object",
//!     "properties": { "name": { "type": "string" } }
//! });
//! let pets = json!({ "logicalName": "Pets", "type": "array", "items": pet.clone() });
//!
//! let mut builder = SpecBuilder::new(Info::new("Swagger Petstore", "1.0.0"));
//! builder
//!     .add_server(json!({ "url": "http://petstore.swagger.io/v1" }))?
//!     .add_schema(pet)?
//!     .add_schema(pets)?;
//!
//! let document = builder.generate().await?;
//! let items = document
//!     .component(ComponentKind::Schemas, "Pets")
//!     .map(|pets| &pets["items"]);
//! assert_eq!(items, Some(&json!({ "$ref": "#/components/schemas/Pet" })));
//!
//! let json = builder.to_json(2).await?;
//! assert!(!json.contains("instanceTag"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Fragment directories
//!
//! Fragments can also live in files (`.json`, and `.yaml`/`.yml` with the `yaml`
//! feature), one value per file, discovered recursively:
//!
//! ```rust,no_run
//! use fragspec_core::{Info, SpecBuilder};
//!
//! # async fn example() -> Result<(), fragspec_core::BuildError> {
//! let mut builder = SpecBuilder::new(Info::new("Swagger Petstore", "1.0.0"));
//! builder
//!     .add_paths_dir("api/paths")?
//!     .add_components_dir("api/components")?;
//!
//! builder.write_openapi("target/openapi.yml").await?;
//! # Ok(())
//! # }
//! ```
//!
//! Once generated, the builder is frozen: every further addition fails with
//! [`BuildError::FrozenDocument`] and every rendering reuses the cached document.
//!
//! ## Lower-level passes
//!
//! [`fold_references`] and [`strip_bookkeeping`] are the two passes run by
//! [`SpecBuilder::generate`]; they can be applied to any [`Document`].

mod builder;
mod component;
mod document;
mod error;
mod fold;
mod render;
mod source;
mod strip;

#[cfg(feature = "yaml")]
mod yaml;

pub use self::builder::{BuildState, SpecBuilder};
pub use self::component::{ComponentKind, REF_KEY};
pub use self::document::{
    Bucket, DEFAULT_OPENAPI_VERSION, Document, INSTANCE_TAG_KEY, Info, LOCATION_KEY,
    LOGICAL_NAME_KEY,
};
pub use self::error::BuildError;
pub use self::fold::{FoldReport, fold_category, fold_references};
pub use self::render::{DEFAULT_JSON_INDENT, render_json};
pub use self::source::SourceKind;
pub use self::strip::strip_bookkeeping;

#[cfg(feature = "yaml")]
pub use self::yaml::ToYaml;
