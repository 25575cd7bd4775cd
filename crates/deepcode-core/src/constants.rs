//! Well-known identifiers of the Open Science Catalog metadata repository

pub const OSC_SCHEMA_URI: &str = "https://stac-extensions.github.io/osc/v1.0.0/schema.json";
pub const CF_SCHEMA_URI: &str = "https://stac-extensions.github.io/cf/v0.2.0/schema.json";
pub const THEMES_SCHEMA_URI: &str = "https://stac-extensions.github.io/themes/v1.0.0/schema.json";
pub const OSC_THEME_SCHEME: &str = "https://github.com/stac-extensions/osc#theme";

pub const OSC_REPO_OWNER: &str = "ESA-EarthCODE";
pub const OSC_REPO_NAME: &str = "open-science-catalog-metadata";
pub const OSC_BRANCH_NAME: &str = "add-new-collection";

pub const OGC_API_RECORD_SPEC: &str =
    "http://www.opengis.net/spec/ogcapi-records-1/1.0/req/record-core";

pub const BASE_URL_OSC: &str = "https://esa-earthcode.github.io/open-science-catalog-metadata";
pub const VARIABLE_BASE_CATALOG_SELF_HREF: &str =
    "https://esa-earthcode.github.io/open-science-catalog-metadata/variables/catalog.json";
pub const PRODUCT_BASE_CATALOG_SELF_HREF: &str =
    "https://esa-earthcode.github.io/open-science-catalog-metadata/products/catalog.json";
pub const DEEPESDL_COLLECTION_SELF_HREF: &str =
    "https://esa-earthcode.github.io/open-science-catalog-metadata/projects/deepesdl/collection.json";
pub const EXPERIMENT_BASE_CATALOG_SELF_HREF: &str =
    "https://esa-earthcode.github.io/open-science-catalog-metadata/experiments/catalog.json";
pub const WORKFLOW_BASE_CATALOG_SELF_HREF: &str =
    "https://esa-earthcode.github.io/open-science-catalog-metadata/workflows/catalog.json";

pub const PROJECT_COLLECTION_NAME: &str = "deep-earth-system-data-lab";
pub const PROJECT_LINK_TITLE: &str = "Project: DeepESDL";

pub const DEFAULT_STORAGE_ROOT: &str = "deep-esdl-public";
pub const DEFAULT_STORAGE_REGION: &str = "eu-central-1";

pub const MEDIA_TYPE_JSON: &str = "application/json";

/// Repository-relative paths of the documents touched by a publication.
pub mod paths {
    pub const PRODUCT_BASE_CATALOG: &str = "products/catalog.json";
    pub const VARIABLE_BASE_CATALOG: &str = "variables/catalog.json";
    pub const PROJECT_COLLECTION: &str = "projects/deep-earth-system-data-lab/collection.json";
    pub const EXPERIMENT_BASE_CATALOG: &str = "experiments/catalog.json";
    pub const WORKFLOW_BASE_CATALOG: &str = "workflows/catalog.json";

    pub fn product_collection(collection_id: &str) -> String {
        format!("products/{collection_id}/collection.json")
    }

    pub fn variable_catalog(variable_id: &str) -> String {
        format!("variables/{variable_id}/catalog.json")
    }

    pub fn workflow_record(workflow_id: &str) -> String {
        format!("workflows/{workflow_id}/record.json")
    }

    pub fn experiment_record(workflow_id: &str) -> String {
        format!("experiments/{workflow_id}/record.json")
    }
}
