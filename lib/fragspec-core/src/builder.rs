//! Accumulation of fragments and one-shot generation of the document.

use std::path::PathBuf;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::document::DEFAULT_OPENAPI_VERSION;
use crate::fold::fold_references;
use crate::source::{SourceKind, Sources};
use crate::strip::strip_bookkeeping;
use crate::{BuildError, ComponentKind, Document, Info};

/// Whether a [`SpecBuilder`] still accepts fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Fragments, path items and directories can be added.
    Building,
    /// The document has been generated; every mutation fails.
    Frozen,
}

/// Collects fragments and assembles them into an OpenAPI [`Document`].
///
/// Fragments are added directly with [`add_component`](Self::add_component) and its
/// aliases, or discovered in directories registered with
/// [`add_components_dir`](Self::add_components_dir) and friends.
///
/// Calling [`generate`](Self::generate) loads the directories, folds every embedded
/// copy of a component into a `$ref` and strips the bookkeeping keys. The result is
/// cached: the builder is then frozen and every later call returns the same document.
///
/// # Example
///
/// ```rust
/// use fragspec_core::{Info, SpecBuilder};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), fragspec_core::BuildError> {
/// let pet = json!({ "logicalName": "Pet", "type": "object" });
///
/// let mut builder = SpecBuilder::new(Info::new("Swagger Petstore", "1.0.0"));
/// builder
///     .add_schema(pet.clone())?
///     .add_path(json!({
///         "location": "/pets/{petId}",
///         "get": { "responses": { "200": { "content": { "application/json": { "schema": pet } } } } }
///     }))?;
///
/// let document = builder.generate().await?;
/// let schema = &document.paths["/pets/{petId}"]["get"]["responses"]["200"]["content"]["application/json"]["schema"];
/// assert_eq!(schema, &json!({ "$ref": "#/components/schemas/Pet" }));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SpecBuilder {
    document: Document,
    sources: Sources,
    generated: OnceCell<Document>,
}

impl SpecBuilder {
    /// Creates a builder for a document with the given metadata.
    #[must_use]
    pub fn new(info: Info) -> Self {
        Self {
            document: Document::new(info),
            sources: Sources::default(),
            generated: OnceCell::new(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> BuildState {
        if self.generated.initialized() {
            BuildState::Frozen
        } else {
            BuildState::Building
        }
    }

    fn ensure_building(&self) -> Result<(), BuildError> {
        match self.state() {
            BuildState::Building => Ok(()),
            BuildState::Frozen => Err(BuildError::FrozenDocument),
        }
    }

    /// Overrides the `openapi` field (default [`DEFAULT_OPENAPI_VERSION`]).
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::FrozenDocument`] once generated.
    pub fn with_openapi_version(
        &mut self,
        version: impl Into<String>,
    ) -> Result<&mut Self, BuildError> {
        self.ensure_building()?;
        self.document.openapi = version.into();
        Ok(self)
    }

    /// Adds a path item, stored under its `location` key.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::FrozenDocument`] once generated, and
    /// [`BuildError::InvalidLocation`] when `item` has no string `location`.
    pub fn add_path(&mut self, item: Value) -> Result<&mut Self, BuildError> {
        self.ensure_building()?;
        self.document.insert_path(item)?;
        Ok(self)
    }

    /// Adds a component fragment to its bucket, under its `logicalName`.
    ///
    /// A fragment with the same `logicalName` in the same bucket is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::FrozenDocument`] once generated, and
    /// [`BuildError::MissingIdentity`] when `item` has no non-empty string `logicalName`.
    pub fn add_component(
        &mut self,
        kind: ComponentKind,
        item: Value,
    ) -> Result<&mut Self, BuildError> {
        self.ensure_building()?;
        let name = self.document.insert_component(kind, item)?;
        debug!(%kind, %name, "component added");
        Ok(self)
    }

    /// Adds a schema fragment.
    ///
    /// # Errors
    ///
    /// See [`add_component`](Self::add_component).
    pub fn add_schema(&mut self, item: Value) -> Result<&mut Self, BuildError> {
        self.add_component(ComponentKind::Schemas, item)
    }

    /// Adds a response fragment.
    ///
    /// # Errors
    ///
    /// See [`add_component`](Self::add_component).
    pub fn add_response(&mut self, item: Value) -> Result<&mut Self, BuildError> {
        self.add_component(ComponentKind::Responses, item)
    }

    /// Adds a parameter fragment.
    ///
    /// # Errors
    ///
    /// See [`add_component`](Self::add_component).
    pub fn add_parameter(&mut self, item: Value) -> Result<&mut Self, BuildError> {
        self.add_component(ComponentKind::Parameters, item)
    }

    /// Adds an example fragment.
    ///
    /// # Errors
    ///
    /// See [`add_component`](Self::add_component).
    pub fn add_example(&mut self, item: Value) -> Result<&mut Self, BuildError> {
        self.add_component(ComponentKind::Examples, item)
    }

    /// Adds a request body fragment.
    ///
    /// # Errors
    ///
    /// See [`add_component`](Self::add_component).
    pub fn add_request_body(&mut self, item: Value) -> Result<&mut Self, BuildError> {
        self.add_component(ComponentKind::RequestBodies, item)
    }

    /// Adds a header fragment.
    ///
    /// # Errors
    ///
    /// See [`add_component`](Self::add_component).
    pub fn add_header(&mut self, item: Value) -> Result<&mut Self, BuildError> {
        self.add_component(ComponentKind::Headers, item)
    }

    /// Adds a security scheme fragment.
    ///
    /// # Errors
    ///
    /// See [`add_component`](Self::add_component).
    pub fn add_security_scheme(&mut self, item: Value) -> Result<&mut Self, BuildError> {
        self.add_component(ComponentKind::SecuritySchemes, item)
    }

    /// Adds a link fragment.
    ///
    /// # Errors
    ///
    /// See [`add_component`](Self::add_component).
    pub fn add_link(&mut self, item: Value) -> Result<&mut Self, BuildError> {
        self.add_component(ComponentKind::Links, item)
    }

    /// Adds a callback fragment.
    ///
    /// # Errors
    ///
    /// See [`add_component`](Self::add_component).
    pub fn add_callback(&mut self, item: Value) -> Result<&mut Self, BuildError> {
        self.add_component(ComponentKind::Callbacks, item)
    }

    /// Appends a server object.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::FrozenDocument`] once generated.
    pub fn add_server(&mut self, server: Value) -> Result<&mut Self, BuildError> {
        self.ensure_building()?;
        self.document.push_server(server);
        Ok(self)
    }

    /// Appends a tag object.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::FrozenDocument`] once generated.
    pub fn add_tag(&mut self, tag: Value) -> Result<&mut Self, BuildError> {
        self.ensure_building()?;
        self.document.push_tag(tag);
        Ok(self)
    }

    /// Appends a security requirement object.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::FrozenDocument`] once generated.
    pub fn add_security(&mut self, requirement: Value) -> Result<&mut Self, BuildError> {
        self.ensure_building()?;
        self.document.push_security(requirement);
        Ok(self)
    }

    /// Sets the external documentation object.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::FrozenDocument`] once generated.
    pub fn set_external_docs(&mut self, external_docs: Value) -> Result<&mut Self, BuildError> {
        self.ensure_building()?;
        self.document.external_docs = Some(external_docs);
        Ok(self)
    }

    /// Registers a directory of fragment files of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::FrozenDocument`] once generated, and
    /// [`BuildError::NotADirectory`] when `dir` is not a directory.
    pub fn add_dir(
        &mut self,
        kind: impl Into<SourceKind>,
        dir: impl Into<PathBuf>,
    ) -> Result<&mut Self, BuildError> {
        self.ensure_building()?;
        self.sources.add(kind.into(), dir.into())?;
        Ok(self)
    }

    /// Registers a directory of path item files.
    ///
    /// # Errors
    ///
    /// See [`add_dir`](Self::add_dir).
    pub fn add_paths_dir(&mut self, dir: impl Into<PathBuf>) -> Result<&mut Self, BuildError> {
        self.add_dir(SourceKind::Paths, dir)
    }

    /// Registers a directory of server files.
    ///
    /// # Errors
    ///
    /// See [`add_dir`](Self::add_dir).
    pub fn add_servers_dir(&mut self, dir: impl Into<PathBuf>) -> Result<&mut Self, BuildError> {
        self.add_dir(SourceKind::Servers, dir)
    }

    /// Registers a directory of tag files.
    ///
    /// # Errors
    ///
    /// See [`add_dir`](Self::add_dir).
    pub fn add_tags_dir(&mut self, dir: impl Into<PathBuf>) -> Result<&mut Self, BuildError> {
        self.add_dir(SourceKind::Tags, dir)
    }

    /// Registers a directory of security requirement files.
    ///
    /// # Errors
    ///
    /// See [`add_dir`](Self::add_dir).
    pub fn add_security_dir(&mut self, dir: impl Into<PathBuf>) -> Result<&mut Self, BuildError> {
        self.add_dir(SourceKind::Security, dir)
    }

    /// Registers a directory of component fragments of one category.
    ///
    /// # Errors
    ///
    /// See [`add_dir`](Self::add_dir).
    pub fn add_component_dir(
        &mut self,
        kind: ComponentKind,
        dir: impl Into<PathBuf>,
    ) -> Result<&mut Self, BuildError> {
        self.add_dir(kind, dir)
    }

    /// Registers the component sub-directories of `dir`.
    ///
    /// Each category is looked up under its names from
    /// [`ComponentKind::dir_aliases`]; missing sub-directories are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::FrozenDocument`] once generated, and
    /// [`BuildError::NotADirectory`] when `dir` is not a directory.
    pub fn add_components_dir(&mut self, dir: impl Into<PathBuf>) -> Result<&mut Self, BuildError> {
        self.ensure_building()?;
        let dir: PathBuf = dir.into();
        self.sources.add_components(&dir)?;
        Ok(self)
    }

    /// Generates the document, once.
    ///
    /// The first call loads the registered directories, folds the embedded copies
    /// and strips the bookkeeping keys; concurrent callers wait for it and every
    /// caller gets the same cached document. A failed generation leaves the builder
    /// in the [`BuildState::Building`] state.
    ///
    /// # Errors
    ///
    /// Returns the I/O, parse or insertion error met while loading fragment files.
    pub async fn generate(&self) -> Result<&Document, BuildError> {
        self.generated.get_or_try_init(|| self.assemble()).await
    }

    async fn assemble(&self) -> Result<Document, BuildError> {
        let mut document = self.document.clone();

        if !self.sources.is_empty() {
            for (kind, fragments) in self.sources.load().await? {
                for fragment in fragments {
                    kind.apply(&mut document, fragment)?;
                }
            }
        }

        let report = fold_references(&mut document);
        strip_bookkeeping(&mut document);

        info!(
            title = %document.info.title,
            paths = document.paths.len(),
            folded = report.total(),
            "document generated"
        );
        Ok(document)
    }
}
