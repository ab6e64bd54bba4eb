//! Assembles the petstore fragments found under `tests/fixtures/petstore`.
#![cfg(feature = "yaml")]

use rstest::rstest;
use serde_json::{Value, json};

use fragspec_core::{BuildError, BuildState, ComponentKind, SpecBuilder};

mod common;
pub use self::common::*;

fn pointer<'a>(tree: &'a Value, path: &str) -> &'a Value {
    tree.pointer(path)
        .unwrap_or_else(|| panic!("missing {path} in {tree:#}"))
}

#[rstest]
#[tokio::test]
async fn should_fold_embedded_components_into_refs(petstore: SpecBuilder) -> anyhow::Result<()> {
    let json = petstore.to_json(2).await?;
    let tree: Value = serde_json::from_str(&json)?;

    let pet_ref = json!({ "$ref": "#/components/schemas/Pet" });
    let pets_ref = json!({ "$ref": "#/components/schemas/Pets" });
    let error_ref = json!({ "$ref": "#/components/schemas/Error" });

    assert_eq!(pointer(&tree, "/components/schemas/Pets/items"), &pet_ref);

    let list = "/paths/~1pets/get/responses";
    assert_eq!(
        pointer(&tree, &format!("{list}/200/content/application~1json/schema")),
        &pets_ref
    );
    assert_eq!(
        pointer(&tree, &format!("{list}/default/content/application~1json/schema")),
        &error_ref
    );

    let create = "/paths/~1pets/post";
    assert_eq!(
        pointer(
            &tree,
            &format!("{create}/requestBody/content/application~1json/schema")
        ),
        &pet_ref
    );

    let show = "/paths/~1pets~1{petId}/get/responses";
    assert_eq!(
        pointer(&tree, &format!("{show}/200/content/application~1json/schema")),
        &pet_ref
    );
    assert_eq!(
        pointer(&tree, &format!("{show}/default/content/application~1json/schema")),
        &error_ref
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_keep_canonical_definitions(petstore: SpecBuilder) -> anyhow::Result<()> {
    let document = petstore.generate().await?;

    let pet = document
        .component(ComponentKind::Schemas, "Pet")
        .expect("Pet schema");
    assert_eq!(
        pet,
        &json!({
            "type": "object",
            "required": ["id", "name"],
            "properties": {
                "id": { "type": "integer", "format": "int64" },
                "name": { "type": "string" },
                "tag": { "type": "string" }
            }
        })
    );

    let error = document
        .component(ComponentKind::Schemas, "Error")
        .expect("Error schema");
    assert_eq!(error["type"], json!("object"));

    let api_key = document
        .component(ComponentKind::SecuritySchemes, "ApiKey")
        .expect("security scheme");
    assert_eq!(api_key["in"], json!("header"));

    let schemas = document
        .bucket(ComponentKind::Schemas)
        .map(|bucket| bucket.keys().cloned().collect::<Vec<_>>());
    assert_eq!(
        schemas,
        Some(vec!["Error".to_string(), "Pet".to_string(), "Pets".to_string()])
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_strip_bookkeeping_keys(petstore: SpecBuilder) -> anyhow::Result<()> {
    let json = petstore.to_json(2).await?;
    let tree: Value = serde_json::from_str(&json)?;

    for key in ["logicalName", "instanceTag", "location"] {
        let mut found = Vec::new();
        string_values(&tree, key, &mut found);
        assert!(found.is_empty(), "unexpected `{key}` values: {found:?}");
    }

    // authored `id` properties are kept
    assert_eq!(
        pointer(&tree, "/components/schemas/Pet/properties/id"),
        &json!({ "type": "integer", "format": "int64" })
    );
    assert_eq!(pointer(&tree, "/paths/~1pets/get/operationId"), &json!("listPets"));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_render_the_same_document_each_time(petstore: SpecBuilder) -> anyhow::Result<()> {
    let first_json = petstore.to_json(2).await?;
    let first_yaml = petstore.to_yaml().await?;

    let second_json = petstore.to_json(2).await?;
    let second_yaml = petstore.to_yaml().await?;

    assert_eq!(first_json, second_json);
    assert_eq!(first_yaml, second_yaml);

    let from_yaml: Value = serde_saphyr::from_str(&first_yaml)?;
    let from_json: Value = serde_json::from_str(&first_json)?;
    assert_eq!(from_yaml, from_json);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_freeze_after_generation(mut petstore: SpecBuilder) -> anyhow::Result<()> {
    assert_eq!(petstore.state(), BuildState::Building);
    petstore.generate().await?;
    assert_eq!(petstore.state(), BuildState::Frozen);

    let result = petstore.add_schema(json!({ "logicalName": "Owner", "type": "object" }));
    assert!(matches!(result, Err(BuildError::FrozenDocument)));

    let result = petstore.add_paths_dir(fixtures_dir().join("paths"));
    assert!(matches!(result, Err(BuildError::FrozenDocument)));

    let document = petstore.generate().await?;
    assert!(document.component(ComponentKind::Schemas, "Owner").is_none());
    Ok(())
}

#[rstest]
fn should_reject_missing_fragment_directory(mut petstore: SpecBuilder) {
    let result = petstore.add_paths_dir(fixtures_dir().join("does-not-exist"));

    assert!(matches!(result, Err(BuildError::NotADirectory { .. })));
    assert_eq!(petstore.state(), BuildState::Building);
}

#[rstest]
#[tokio::test]
async fn should_write_openapi_files(petstore: SpecBuilder) -> anyhow::Result<()> {
    let out = tempfile::tempdir()?;
    let json_path = out.path().join("openapi.json");
    let yaml_path = out.path().join("openapi.yml");

    petstore.write_openapi(&json_path).await?;
    petstore.write_openapi(&yaml_path).await?;

    assert_eq!(std::fs::read_to_string(json_path)?, petstore.to_json(2).await?);
    assert_eq!(std::fs::read_to_string(yaml_path)?, petstore.to_yaml().await?);
    Ok(())
}
