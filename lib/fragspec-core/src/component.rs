//! The closed set of OpenAPI component categories.

use std::fmt;
use std::str::FromStr;

use jsonptr::PointerBuf;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::BuildError;

/// Key of the reference marker written in place of a folded fragment.
pub const REF_KEY: &str = "$ref";

/// One of the nine `components` buckets of an OpenAPI document.
///
/// The declaration order is the order in which buckets are folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    /// `components.schemas`
    Schemas,
    /// `components.responses`
    Responses,
    /// `components.parameters`
    Parameters,
    /// `components.examples`
    Examples,
    /// `components.requestBodies`
    RequestBodies,
    /// `components.headers`
    Headers,
    /// `components.securitySchemes`
    SecuritySchemes,
    /// `components.links`
    Links,
    /// `components.callbacks`
    Callbacks,
}

impl ComponentKind {
    /// All categories, in fold order.
    pub const ALL: [Self; 9] = [
        Self::Schemas,
        Self::Responses,
        Self::Parameters,
        Self::Examples,
        Self::RequestBodies,
        Self::Headers,
        Self::SecuritySchemes,
        Self::Links,
        Self::Callbacks,
    ];

    /// The key of this bucket under `components`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schemas => "schemas",
            Self::Responses => "responses",
            Self::Parameters => "parameters",
            Self::Examples => "examples",
            Self::RequestBodies => "requestBodies",
            Self::Headers => "headers",
            Self::SecuritySchemes => "securitySchemes",
            Self::Links => "links",
            Self::Callbacks => "callbacks",
        }
    }

    /// Directory names recognised for this category below a components directory.
    #[must_use]
    pub fn dir_aliases(self) -> &'static [&'static str] {
        match self {
            Self::RequestBodies => &["requestBodies", "request-bodies"],
            Self::SecuritySchemes => &[
                "securitySchemes",
                "securitySchemas",
                "security-schemes",
                "security-schemas",
            ],
            Self::Schemas => &["schemas"],
            Self::Responses => &["responses"],
            Self::Parameters => &["parameters"],
            Self::Examples => &["examples"],
            Self::Headers => &["headers"],
            Self::Links => &["links"],
            Self::Callbacks => &["callbacks"],
        }
    }

    /// The local reference to the fragment `name` of this bucket.
    ///
    /// The fragment part is a JSON pointer, so `/` and `~` in `name` are escaped.
    #[must_use]
    pub fn ref_location(self, name: &str) -> String {
        let pointer = PointerBuf::from_tokens(["components", self.as_str(), name]);
        format!("#{pointer}")
    }

    /// Builds the reference marker `{ "$ref": "#/components/<kind>/<name>" }`.
    #[must_use]
    pub fn reference(self, name: &str) -> Value {
        let mut marker = Map::with_capacity(1);
        marker.insert(REF_KEY.to_string(), Value::String(self.ref_location(name)));
        Value::Object(marker)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = BuildError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| BuildError::InvalidCategory {
                name: name.to_string(),
            })
    }
}

/// Tells whether `value` is an object holding a `$ref` key.
///
/// Such objects are opaque to folding, whether they are bare reference markers or
/// carry sibling keys next to `$ref`.
pub(crate) fn is_reference(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.contains_key(REF_KEY))
}
