//! End-to-end publication against a metadata repository checkout on disk

use chrono::{TimeZone, Utc};
use deepcode_core::builder::{DefaultGcmdKeyword, RequireGcmdKeyword};
use deepcode_core::models::{
    Coordinate, DataVariable, Dataset, DatasetConfig, DatasetStatus, StacDocument, WorkflowConfig,
    WorkflowProperties,
};
use deepcode_core::ports::{
    read_document_file, ChangeSubmitter, FileMap, LocalCatalogSource, PullRequestDraft,
};
use deepcode_core::publish::{PublishContext, PublishMode, PublishOutcome, Publisher};
use deepcode_core::storage::{DatasetOpener, StorageConfig};
use deepcode_core::{DeepCodeError, Result};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct FixedOpener(Dataset);

impl DatasetOpener for FixedOpener {
    fn open(&self, _dataset_id: &str, _config: &StorageConfig) -> Result<Dataset> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct RecordingSubmitter {
    submitted: RefCell<Vec<(PullRequestDraft, Vec<String>)>>,
}

impl ChangeSubmitter for RecordingSubmitter {
    fn submit(&self, request: &PullRequestDraft, files: &FileMap) -> Result<String> {
        self.submitted
            .borrow_mut()
            .push((request.clone(), files.keys().cloned().collect()));
        Ok("https://github.com/ESA-EarthCODE/open-science-catalog-metadata/pull/1".to_string())
    }
}

fn write_json(root: &Path, relative: &str, value: Value) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn base_catalog(id: &str) -> Value {
    json!({
        "type": "Catalog",
        "id": id,
        "stac_version": "1.0.0",
        "description": format!("{id} base catalog"),
        "links": [
            {"rel": "root", "href": "../catalog.json", "type": "application/json"}
        ]
    })
}

/// Minimal metadata repository with every base catalog present
fn metadata_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, id) in [
        ("products/catalog.json", "products"),
        ("variables/catalog.json", "variables"),
        ("experiments/catalog.json", "experiments"),
        ("workflows/catalog.json", "workflows"),
    ] {
        write_json(dir.path(), path, base_catalog(id));
    }
    write_json(
        dir.path(),
        "projects/deep-earth-system-data-lab/collection.json",
        json!({
            "type": "Collection",
            "id": "deep-earth-system-data-lab",
            "links": []
        }),
    );
    dir
}

fn cube() -> Dataset {
    Dataset::new()
        .with_attr("description", "Demo cube")
        .with_coord("lon", Coordinate::numeric(vec![0.0, 5.0, 10.0]))
        .with_coord("lat", Coordinate::numeric(vec![50.0, 55.0]))
        .with_coord(
            "time",
            Coordinate::numeric(vec![0.0, 1.0, 2.0]).with_attr("units", "days since 2024-01-01"),
        )
        .with_data_var(
            DataVariable::new("ndvi")
                .with_dims(&["time", "lat", "lon"])
                .with_attr("long_name", "Vegetation index")
                .with_attr("gcmd_keyword_url", "https://gcmd.example/ndvi"),
        )
        .with_data_var(DataVariable::new("Leaf_Area").with_dims(&["time", "lat", "lon"]))
        .with_data_var(DataVariable::new("crs"))
}

fn dataset_config() -> DatasetConfig {
    DatasetConfig {
        dataset_id: Some("d".to_string()),
        collection_id: Some("c".to_string()),
        dataset_status: Some(DatasetStatus::Completed),
        osc_themes: vec!["land".to_string()],
        ..Default::default()
    }
}

fn workflow_config() -> WorkflowConfig {
    WorkflowConfig {
        workflow_id: Some("Test WF".to_string()),
        properties: WorkflowProperties {
            title: Some("T".to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn publisher<'a>(
    source: &'a LocalCatalogSource,
    opener: &'a FixedOpener,
    resolver: &'a DefaultGcmdKeyword,
) -> Publisher<'a> {
    Publisher::new(
        dataset_config(),
        workflow_config(),
        PublishContext {
            source,
            opener,
            storage_configs: vec![StorageConfig::local("/unused")],
            resolver,
        },
    )
    .unwrap()
    .with_timestamp(Utc.with_ymd_and_hms(2025, 5, 6, 7, 8, 9).unwrap())
}

fn read(root: &Path, relative: &str) -> StacDocument {
    read_document_file(&root.join(relative), relative).unwrap()
}

#[test]
fn test_write_to_disk_produces_every_document() {
    let repo = metadata_repo();
    let output = TempDir::new().unwrap();
    let source = LocalCatalogSource::new(repo.path());
    let opener = FixedOpener(cube());
    let resolver = DefaultGcmdKeyword("https://gcmd.example/default".to_string());

    let outcome = publisher(&source, &opener, &resolver)
        .publish_all(PublishMode::WriteToDisk {
            output_dir: output.path().to_path_buf(),
        })
        .unwrap();

    let PublishOutcome::Written { paths } = outcome else {
        panic!("expected written outcome");
    };
    let mut relative: Vec<String> = paths
        .iter()
        .map(|p| p.strip_prefix(output.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    relative.sort();
    assert_eq!(
        relative,
        vec![
            "experiments/catalog.json",
            "experiments/test-wf/record.json",
            "products/c/collection.json",
            "products/catalog.json",
            "projects/deep-earth-system-data-lab/collection.json",
            "variables/catalog.json",
            "variables/leaf-area/catalog.json",
            "variables/ndvi/catalog.json",
            "workflows/catalog.json",
            "workflows/test-wf/record.json",
        ]
    );

    let product = read(output.path(), "products/c/collection.json");
    assert_eq!(product.fields["osc:type"], json!("product"));
    assert_eq!(product.fields["osc:status"], json!("completed"));
    assert_eq!(product.fields["osc:variables"], json!(["ndvi", "leaf-area"]));

    let leaf = read(output.path(), "variables/leaf-area/catalog.json");
    assert!(leaf
        .links
        .iter()
        .any(|l| l.rel == "via" && l.href == "https://gcmd.example/default"));

    // the checkout itself is left untouched
    let original = read(repo.path(), "products/catalog.json");
    assert_eq!(original.links.len(), 1);
}

#[test]
fn test_workflow_records_and_base_catalogs() {
    let repo = metadata_repo();
    let source = LocalCatalogSource::new(repo.path());
    let opener = FixedOpener(cube());
    let resolver = DefaultGcmdKeyword("https://gcmd.example/default".to_string());

    let files = publisher(&source, &opener, &resolver)
        .publish_workflow_experiment()
        .unwrap();

    let workflow = &files["workflows/test-wf/record.json"];
    let links = workflow["links"].as_array().unwrap();
    assert_eq!(links.first().unwrap()["rel"], "root");
    assert_eq!(links.last().unwrap()["rel"], "self");
    assert_eq!(workflow["properties"]["osc:project"], "deep-earth-system-data-lab");
    assert!(workflow["properties"].get("osc:workflow").is_none());
    assert!(workflow.get("jupyter_notebook_url").is_none());

    let experiment = &files["experiments/test-wf/record.json"];
    assert_eq!(experiment["properties"]["type"], "experiment");
    assert_eq!(experiment["properties"]["osc:workflow"], "test-wf");
    assert!(experiment["properties"].get("osc:project").is_none());
    assert!(experiment.get("collection_id").is_none());
    assert!(experiment["links"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l["rel"] == "child" && l["href"] == "../../products/c/collection.json"));

    let items: Vec<&Value> = files["workflows/catalog.json"]["links"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["rel"] == "item")
        .collect();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["href"], "./test-wf/record.json");
    assert_eq!(items[0]["title"], "T");
}

#[test]
fn test_pull_request_mode_submits_once() {
    let repo = metadata_repo();
    let source = LocalCatalogSource::new(repo.path());
    let opener = FixedOpener(cube());
    let resolver = DefaultGcmdKeyword("https://gcmd.example/default".to_string());
    let submitter = RecordingSubmitter::default();

    let outcome = publisher(&source, &opener, &resolver)
        .publish_all(PublishMode::PullRequest(&submitter))
        .unwrap();

    assert!(matches!(outcome, PublishOutcome::PullRequest { ref url, .. } if url.ends_with("/pull/1")));
    let submitted = submitter.submitted.borrow();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].0.branch_name, "add-new-collection-c-20250506070809");
    assert_eq!(
        submitted[0].0.title,
        "Add new dataset collection: c and workflow/experiment: Test WF"
    );
    assert_eq!(submitted[0].1.len(), 10);
}

#[test]
fn test_build_failure_submits_nothing() {
    let repo = metadata_repo();
    let source = LocalCatalogSource::new(repo.path());
    let opener = FixedOpener(Dataset::new().with_data_var(DataVariable::new("ndvi")));
    let resolver = DefaultGcmdKeyword("https://gcmd.example/default".to_string());
    let submitter = RecordingSubmitter::default();

    let result = publisher(&source, &opener, &resolver).publish_all(PublishMode::PullRequest(&submitter));

    assert!(matches!(result, Err(DeepCodeError::Extraction(_))));
    assert!(submitter.submitted.borrow().is_empty());
}

#[test]
fn test_missing_gcmd_url_fails_without_resolver_fallback() {
    let repo = metadata_repo();
    let source = LocalCatalogSource::new(repo.path());
    let opener = FixedOpener(cube());

    let publisher = Publisher::new(
        dataset_config(),
        workflow_config(),
        PublishContext {
            source: &source,
            opener: &opener,
            storage_configs: vec![StorageConfig::local("/unused")],
            resolver: &RequireGcmdKeyword,
        },
    )
    .unwrap();

    assert!(matches!(
        publisher.publish_dataset(),
        Err(DeepCodeError::MissingGcmdKeyword { variable_id }) if variable_id == "leaf-area"
    ));
}

#[test]
fn test_existing_variable_catalog_is_augmented() {
    let repo = metadata_repo();
    write_json(
        repo.path(),
        "variables/leaf-area/catalog.json",
        json!({
            "type": "Catalog",
            "id": "leaf-area",
            "description": "Existing description",
            "keywords": ["canopy"],
            "links": [
                {"rel": "child", "href": "../../products/other/collection.json", "type": "application/json"}
            ]
        }),
    );
    let source = LocalCatalogSource::new(repo.path());
    let opener = FixedOpener(cube());

    // no fallback needed: the catalog already exists
    let publisher = Publisher::new(
        dataset_config(),
        workflow_config(),
        PublishContext {
            source: &source,
            opener: &opener,
            storage_configs: vec![StorageConfig::local("/unused")],
            resolver: &RequireGcmdKeyword,
        },
    )
    .unwrap();
    let files = publisher.publish_dataset().unwrap();

    let catalog = &files["variables/leaf-area/catalog.json"];
    assert_eq!(catalog["description"], "Existing description");
    assert_eq!(catalog["keywords"], json!(["canopy"]));
    let children: Vec<&str> = catalog["links"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["rel"] == "child")
        .filter_map(|l| l["href"].as_str())
        .collect();
    assert_eq!(
        children,
        vec!["../../products/other/collection.json", "../../products/c/collection.json"]
    );
}

#[test]
fn test_republishing_does_not_duplicate_links() {
    let repo = metadata_repo();
    let source = LocalCatalogSource::new(repo.path());
    let opener = FixedOpener(cube());
    let resolver = DefaultGcmdKeyword("https://gcmd.example/default".to_string());

    for _ in 0..2 {
        publisher(&source, &opener, &resolver)
            .publish_all(PublishMode::WriteToDisk {
                output_dir: repo.path().to_path_buf(),
            })
            .unwrap();
    }

    for path in [
        "products/catalog.json",
        "variables/catalog.json",
        "variables/ndvi/catalog.json",
        "projects/deep-earth-system-data-lab/collection.json",
        "workflows/catalog.json",
    ] {
        let document = read(repo.path(), path);
        let mut targets: Vec<(String, String)> = document
            .links
            .iter()
            .map(|l| (l.rel.clone(), l.href.clone()))
            .collect();
        let total = targets.len();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), total, "duplicate links in {path}");
    }

    let variables = read(repo.path(), "variables/catalog.json");
    assert_eq!(variables.links.iter().filter(|l| l.rel == "child").count(), 2);
}

#[test]
fn test_variable_id_escaping_repository_is_rejected() {
    let repo = metadata_repo();
    let source = LocalCatalogSource::new(repo.path());
    let opener = FixedOpener(
        cube().with_data_var(
            DataVariable::new("sneaky")
                .with_dims(&["time", "lat", "lon"])
                .with_attr("standard_name", "../../escaped"),
        ),
    );
    let resolver = DefaultGcmdKeyword("https://gcmd.example/default".to_string());
    let submitter = RecordingSubmitter::default();
    let output = TempDir::new().unwrap();
    let output_dir = output.path().join("out");

    let publisher = publisher(&source, &opener, &resolver);
    let to_disk = publisher.publish_all(PublishMode::WriteToDisk {
        output_dir: output_dir.clone(),
    });
    let to_pull_request = publisher.publish_all(PublishMode::PullRequest(&submitter));

    assert!(matches!(to_disk, Err(DeepCodeError::ConfigInvalid { .. })));
    assert!(matches!(to_pull_request, Err(DeepCodeError::ConfigInvalid { .. })));
    assert!(!output_dir.exists());
    assert!(!output.path().join("escaped").exists());
    assert!(submitter.submitted.borrow().is_empty());
}
