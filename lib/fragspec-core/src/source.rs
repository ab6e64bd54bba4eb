//! Fragment files discovered in registered directories.
//!
//! Every registered directory is walked recursively and each fragment file holds a
//! single value: a path item, a server, a tag, a security requirement or a component
//! fragment, depending on the kind the directory was registered for.
//!
//! Directories are loaded in parallel, but the loaded values are handed back in a
//! fixed order (source kind, then registration order, then file path) so that the
//! last-write-wins rule of the buckets stays deterministic.

use std::collections::{BTreeMap, HashSet};
use std::fs as std_fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::{BuildError, ComponentKind, Document};

#[cfg(feature = "yaml")]
const FRAGMENT_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

#[cfg(not(feature = "yaml"))]
const FRAGMENT_EXTENSIONS: &[&str] = &["json"];

/// What the fragments of a directory are.
///
/// The ordering is the order in which loaded fragments are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    /// Path items, each with a `location` key.
    Paths,
    /// Server objects.
    Servers,
    /// Tag objects.
    Tags,
    /// Security requirement objects.
    Security,
    /// Component fragments, each with a `logicalName` key.
    Component(ComponentKind),
}

impl SourceKind {
    /// Inserts a loaded fragment into the document.
    pub(crate) fn apply(self, document: &mut Document, fragment: Value) -> Result<(), BuildError> {
        match self {
            Self::Paths => document.insert_path(fragment),
            Self::Servers => {
                document.push_server(fragment);
                Ok(())
            }
            Self::Tags => {
                document.push_tag(fragment);
                Ok(())
            }
            Self::Security => {
                document.push_security(fragment);
                Ok(())
            }
            Self::Component(kind) => document.insert_component(kind, fragment).map(drop),
        }
    }
}

impl From<ComponentKind> for SourceKind {
    fn from(kind: ComponentKind) -> Self {
        Self::Component(kind)
    }
}

/// Registered fragment directories.
#[derive(Debug, Clone, Default)]
pub(crate) struct Sources {
    dirs: BTreeMap<SourceKind, Vec<PathBuf>>,
}

impl Sources {
    /// Registers a directory.
    pub(crate) fn add(&mut self, kind: SourceKind, dir: PathBuf) -> Result<(), BuildError> {
        if !is_dir(&dir) {
            return Err(BuildError::NotADirectory { path: dir });
        }

        debug!(?kind, dir = %dir.display(), "fragment directory registered");
        self.dirs.entry(kind).or_default().push(dir);
        Ok(())
    }

    /// Registers every component sub-directory of `root` that exists.
    pub(crate) fn add_components(&mut self, root: &Path) -> Result<(), BuildError> {
        if !is_dir(root) {
            return Err(BuildError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        for kind in ComponentKind::ALL {
            for alias in kind.dir_aliases() {
                let dir = root.join(alias);
                if is_dir(&dir) {
                    self.add(kind.into(), dir)?;
                }
            }
        }
        Ok(())
    }

    /// Tells whether no directory was registered.
    pub(crate) fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Loads every registered directory, one task per directory.
    pub(crate) async fn load(&self) -> Result<Vec<(SourceKind, Vec<Value>)>, BuildError> {
        let mut tasks = JoinSet::new();
        let jobs = self
            .dirs
            .iter()
            .flat_map(|(kind, dirs)| dirs.iter().map(move |dir| (*kind, dir.clone())));
        for (index, (kind, dir)) in jobs.enumerate() {
            tasks.spawn(async move {
                let fragments = load_dir(&dir).await?;
                Ok::<_, BuildError>((index, kind, fragments))
            });
        }

        let mut loaded = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let result = joined.map_err(|err| BuildError::Task {
                message: err.to_string(),
            })?;
            loaded.push(result?);
        }

        loaded.sort_by_key(|(index, _, _)| *index);
        Ok(loaded
            .into_iter()
            .map(|(_, kind, fragments)| (kind, fragments))
            .collect())
    }
}

fn is_dir(path: &Path) -> bool {
    std_fs::metadata(path).is_ok_and(|meta| meta.is_dir())
}

fn is_fragment_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAGMENT_EXTENSIONS.contains(&ext))
}

/// Lists the fragment files below `root`, sorted.
///
/// Symbolic links are followed; a directory reached twice is walked once.
async fn discover(root: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut files = Vec::new();
    let mut visited = HashSet::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        if !visited.insert(fs::canonicalize(&dir).await?) {
            debug!(dir = %dir.display(), "directory already walked, skipping");
            continue;
        }

        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if fs::metadata(&path).await?.is_dir() {
                pending.push(path);
            } else if is_fragment_file(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

async fn load_dir(dir: &Path) -> Result<Vec<Value>, BuildError> {
    if !fs::metadata(dir).await.is_ok_and(|meta| meta.is_dir()) {
        warn!(dir = %dir.display(), "fragment directory disappeared, skipping");
        return Ok(Vec::new());
    }

    let files = discover(dir).await?;
    let mut fragments = Vec::with_capacity(files.len());
    for file in files {
        let contents = fs::read_to_string(&file).await?;
        match parse_fragment(&file, &contents)? {
            Value::Null => debug!(file = %file.display(), "empty fragment file skipped"),
            fragment => fragments.push(fragment),
        }
    }

    debug!(dir = %dir.display(), count = fragments.len(), "fragments loaded");
    Ok(fragments)
}

fn parse_fragment(path: &Path, contents: &str) -> Result<Value, BuildError> {
    let parse_error = |message: String| BuildError::FragmentParse {
        path: path.to_path_buf(),
        message,
    };

    match path.extension().and_then(|ext| ext.to_str()) {
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => {
            serde_saphyr::from_str(contents).map_err(|err| parse_error(err.to_string()))
        }
        _ => serde_json::from_str(contents).map_err(|err| parse_error(err.to_string())),
    }
}
