//! The OpenAPI document being assembled.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{BuildError, ComponentKind};

/// Key holding the logical name of a component fragment.
pub const LOGICAL_NAME_KEY: &str = "logicalName";

/// Key holding the instance tag stamped on a fragment when it enters a bucket.
pub const INSTANCE_TAG_KEY: &str = "instanceTag";

/// Key holding the path of a path item before it is stored.
pub const LOCATION_KEY: &str = "location";

/// Default value of the `openapi` field.
pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.3";

/// Fragments of one category, by logical name, in insertion order.
pub type Bucket = IndexMap<String, Value>;

/// The `info` object of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// Title of the API.
    pub title: String,
    /// Version of the API (not of the OpenAPI format).
    pub version: String,
    /// Description of the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL of the terms of service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    /// Contact object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Value>,
    /// License object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<Value>,
}

impl Info {
    /// Creates the info object with its two required fields.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the license object, e.g. `json!({ "name": "MIT" })`.
    #[must_use]
    pub fn with_license(mut self, license: Value) -> Self {
        self.license = Some(license);
        self
    }

    /// Sets the contact object.
    #[must_use]
    pub fn with_contact(mut self, contact: Value) -> Self {
        self.contact = Some(contact);
        self
    }
}

/// An OpenAPI 3.x document.
///
/// Fragments and path items are plain [`Value`] trees, so every fragment is an
/// owned deep copy and the tree cannot contain cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Version of the OpenAPI format.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Server objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Value>>,
    /// Path items by path.
    #[serde(default)]
    pub paths: IndexMap<String, Value>,
    /// Component buckets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<IndexMap<ComponentKind, Bucket>>,
    /// Security requirement objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<Value>>,
    /// Tag objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Value>>,
    /// External documentation object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new(info: Info) -> Self {
        Self {
            openapi: DEFAULT_OPENAPI_VERSION.to_string(),
            info,
            servers: None,
            paths: IndexMap::new(),
            components: None,
            security: None,
            tags: None,
            external_docs: None,
        }
    }

    /// Returns the bucket of a category, if any fragment was added to it.
    #[must_use]
    pub fn bucket(&self, kind: ComponentKind) -> Option<&Bucket> {
        self.components.as_ref()?.get(&kind)
    }

    /// Returns the fragment `name` of a category.
    #[must_use]
    pub fn component(&self, kind: ComponentKind, name: &str) -> Option<&Value> {
        self.bucket(kind)?.get(name)
    }

    /// Stores a path item under its `location`, without the `location` key.
    pub(crate) fn insert_path(&mut self, mut item: Value) -> Result<(), BuildError> {
        let Some(Value::String(location)) = item
            .as_object_mut()
            .and_then(|object| object.shift_remove(LOCATION_KEY))
        else {
            return Err(BuildError::InvalidLocation);
        };

        self.paths.insert(location, item);
        Ok(())
    }

    /// Stores a fragment under its logical name, stamped with a fresh instance tag.
    ///
    /// Returns the logical name.
    pub(crate) fn insert_component(
        &mut self,
        kind: ComponentKind,
        mut item: Value,
    ) -> Result<String, BuildError> {
        let Some(object) = item.as_object_mut() else {
            return Err(BuildError::MissingIdentity { category: kind });
        };
        let name = match object.get(LOGICAL_NAME_KEY) {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => return Err(BuildError::MissingIdentity { category: kind }),
        };
        object.insert(
            INSTANCE_TAG_KEY.to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );

        self.components
            .get_or_insert_with(IndexMap::new)
            .entry(kind)
            .or_default()
            .insert(name.clone(), item);

        Ok(name)
    }

    pub(crate) fn push_server(&mut self, server: Value) {
        self.servers.get_or_insert_with(Vec::new).push(server);
    }

    pub(crate) fn push_tag(&mut self, tag: Value) {
        self.tags.get_or_insert_with(Vec::new).push(tag);
    }

    pub(crate) fn push_security(&mut self, requirement: Value) {
        self.security.get_or_insert_with(Vec::new).push(requirement);
    }

    /// Calls `visit` on every top-level value that may hold fragments.
    ///
    /// Bucket entries are flagged as canonical slots. `info` is typed metadata and
    /// is not visited.
    pub(crate) fn visit_values_mut(&mut self, mut visit: impl FnMut(Slot, &mut Value)) {
        for server in self.servers.iter_mut().flatten() {
            visit(Slot::Embedded, server);
        }
        for item in self.paths.values_mut() {
            visit(Slot::Embedded, item);
        }
        for bucket in self.components.iter_mut().flat_map(|buckets| buckets.values_mut()) {
            for fragment in bucket.values_mut() {
                visit(Slot::Canonical, fragment);
            }
        }
        for requirement in self.security.iter_mut().flatten() {
            visit(Slot::Embedded, requirement);
        }
        for tag in self.tags.iter_mut().flatten() {
            visit(Slot::Embedded, tag);
        }
        if let Some(external_docs) = &mut self.external_docs {
            visit(Slot::Embedded, external_docs);
        }
    }
}

/// Where a top-level value lives in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A bucket entry: may be walked into, never replaced.
    Canonical,
    /// Anything else.
    Embedded,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn petstore() -> Document {
        Document::new(Info::new("Swagger Petstore", "1.0.0").with_license(json!({ "name": "MIT" })))
    }

    #[test]
    fn should_serialize_minimal_document() {
        let document = petstore();

        let json = serde_json::to_string_pretty(&document).expect("serializable");

        insta::assert_snapshot!(json, @r#"
        {
          "openapi": "3.0.3",
          "info": {
            "title": "Swagger Petstore",
            "version": "1.0.0",
            "license": {
              "name": "MIT"
            }
          },
          "paths": {}
        }
        "#);
    }

    #[test]
    fn should_store_path_without_location() {
        let mut document = petstore();

        document
            .insert_path(json!({ "location": "/pets", "get": { "operationId": "listPets" } }))
            .expect("valid path item");

        assert_eq!(
            document.paths.get("/pets"),
            Some(&json!({ "get": { "operationId": "listPets" } }))
        );
    }

    #[test]
    fn should_overwrite_duplicate_location() {
        let mut document = petstore();

        document
            .insert_path(json!({ "location": "/pets", "summary": "first" }))
            .expect("valid path item");
        document
            .insert_path(json!({ "location": "/pets", "summary": "second" }))
            .expect("valid path item");

        assert_eq!(document.paths.len(), 1);
        assert_eq!(document.paths.get("/pets"), Some(&json!({ "summary": "second" })));
    }

    #[test]
    fn should_reject_path_without_location() {
        let mut document = petstore();

        let missing = document.insert_path(json!({ "get": {} }));
        let not_a_string = document.insert_path(json!({ "location": 42 }));
        let not_an_object = document.insert_path(json!("/pets"));

        assert!(matches!(missing, Err(BuildError::InvalidLocation)));
        assert!(matches!(not_a_string, Err(BuildError::InvalidLocation)));
        assert!(matches!(not_an_object, Err(BuildError::InvalidLocation)));
        assert!(document.paths.is_empty());
    }

    #[test]
    fn should_stamp_component_with_instance_tag() {
        let mut document = petstore();

        let name = document
            .insert_component(
                ComponentKind::Schemas,
                json!({ "logicalName": "Pet", "type": "object" }),
            )
            .expect("valid fragment");

        assert_eq!(name, "Pet");
        let pet = document
            .component(ComponentKind::Schemas, "Pet")
            .expect("Pet should be stored");
        assert_eq!(pet[LOGICAL_NAME_KEY], json!("Pet"));
        assert_eq!(pet["type"], json!("object"));
        assert!(pet[INSTANCE_TAG_KEY].as_str().is_some_and(|tag| !tag.is_empty()));
    }

    #[test]
    fn should_generate_distinct_instance_tags() {
        let mut document = petstore();
        let fragment = json!({ "logicalName": "Error", "type": "object" });

        document
            .insert_component(ComponentKind::Schemas, fragment.clone())
            .expect("valid fragment");
        let first = document.component(ComponentKind::Schemas, "Error").cloned();
        document
            .insert_component(ComponentKind::Responses, fragment)
            .expect("valid fragment");
        let second = document.component(ComponentKind::Responses, "Error").cloned();

        let first_tag = first.as_ref().and_then(|it| it[INSTANCE_TAG_KEY].as_str());
        let second_tag = second.as_ref().and_then(|it| it[INSTANCE_TAG_KEY].as_str());
        assert!(first_tag.is_some());
        assert_ne!(first_tag, second_tag);
    }

    #[test]
    fn should_keep_last_fragment_with_same_name() {
        let mut document = petstore();

        document
            .insert_component(
                ComponentKind::Schemas,
                json!({ "logicalName": "Pet", "type": "string" }),
            )
            .expect("valid fragment");
        document
            .insert_component(
                ComponentKind::Schemas,
                json!({ "logicalName": "Pet", "type": "object" }),
            )
            .expect("valid fragment");

        let bucket = document.bucket(ComponentKind::Schemas).expect("schemas bucket");
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket["Pet"]["type"], json!("object"));
    }

    #[test]
    fn should_reject_component_without_identity() {
        let mut document = petstore();

        for fragment in [
            json!({ "type": "object" }),
            json!({ "logicalName": "" }),
            json!({ "logicalName": 7 }),
            json!(["logicalName"]),
        ] {
            let result = document.insert_component(ComponentKind::Parameters, fragment);
            assert!(matches!(
                result,
                Err(BuildError::MissingIdentity {
                    category: ComponentKind::Parameters
                })
            ));
        }
        assert!(document.components.is_none());
    }

    #[test]
    fn should_visit_bucket_entries_as_canonical() {
        let mut document = petstore();
        document.push_server(json!({ "url": "http://petstore.swagger.io/v1" }));
        document
            .insert_path(json!({ "location": "/pets" }))
            .expect("valid path item");
        document
            .insert_component(ComponentKind::Schemas, json!({ "logicalName": "Pet" }))
            .expect("valid fragment");
        document.external_docs = Some(json!({ "url": "https://example.com" }));

        let mut slots = Vec::new();
        document.visit_values_mut(|slot, _| slots.push(slot));

        assert_eq!(
            slots,
            vec![Slot::Embedded, Slot::Embedded, Slot::Canonical, Slot::Embedded]
        );
    }
}
