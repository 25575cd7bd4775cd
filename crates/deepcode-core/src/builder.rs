//! STAC collection and variable catalogs for a published dataset

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::constants::{
    paths, BASE_URL_OSC, OSC_THEME_SCHEME, PROJECT_COLLECTION_NAME,
    PROJECT_LINK_TITLE, THEMES_SCHEMA_URI,
};
use crate::error::{DeepCodeError, Result};
use crate::extract::{self, VariableMetadata};
use crate::models::stac::Linkable;
use crate::models::{Catalog, Collection, DatasetConfig, DatasetStatus, Dataset, Extent, Link};
use crate::osc::{self, OscProductFields};

pub const DEFAULT_REGION: &str = "Global";

/// Supplies a GCMD keyword URL for a variable whose attributes lack one
pub trait GcmdKeywordResolver {
    fn resolve(&self, variable: &VariableMetadata) -> Result<String>;
}

/// Fails with `MissingGcmdKeyword`
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireGcmdKeyword;

impl GcmdKeywordResolver for RequireGcmdKeyword {
    fn resolve(&self, variable: &VariableMetadata) -> Result<String> {
        Err(DeepCodeError::MissingGcmdKeyword {
            variable_id: variable.variable_id.clone(),
        })
    }
}

/// Uses one fixed URL for every variable
#[derive(Debug, Clone)]
pub struct DefaultGcmdKeyword(pub String);

impl GcmdKeywordResolver for DefaultGcmdKeyword {
    fn resolve(&self, _variable: &VariableMetadata) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Product-level settings, with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ProductOptions {
    pub dataset_id: String,
    pub collection_id: String,
    pub access_link: String,
    pub documentation_link: Option<String>,
    pub status: DatasetStatus,
    pub region: String,
    pub themes: Vec<String>,
    pub missions: Vec<String>,
    pub cf_parameter: Vec<Value>,
}

impl ProductOptions {
    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        let dataset_id = config.dataset_id()?.to_string();
        let collection_id = config.collection_id()?.to_string();

        let access_link = config
            .access_link
            .clone()
            .filter(|link| !link.is_empty())
            .unwrap_or_else(|| format!("s3://deep-esdl-public/{dataset_id}"));
        let cf_parameter = match &config.cf_parameter {
            Some(params) if !params.is_empty() => params.clone(),
            _ => vec![json!({ "name": collection_id })],
        };

        Ok(Self {
            access_link,
            documentation_link: config.documentation_link.clone().filter(|l| !l.is_empty()),
            status: config.dataset_status.unwrap_or(DatasetStatus::Ongoing),
            region: config
                .osc_region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            themes: config.osc_themes.clone(),
            missions: config.osc_missions.clone(),
            cf_parameter,
            dataset_id,
            collection_id,
        })
    }
}

/// Related link from any repository document two levels deep to a theme catalog
pub fn theme_link(theme: &str) -> Link {
    Link::json("related", format!("../../themes/{theme}/catalog.json"))
        .with_title(format!("Theme: {}", osc::format_string(theme)))
}

pub fn root_link() -> Link {
    Link::json("root", "../../catalog.json").with_title("Open Science Catalog")
}

pub fn project_link() -> Link {
    Link::json(
        "related",
        format!("../../projects/{PROJECT_COLLECTION_NAME}/collection.json"),
    )
    .with_title(PROJECT_LINK_TITLE)
}

/// Child link from a variable catalog or project collection to a product
pub fn product_link(collection_id: &str) -> Link {
    Link::json("child", format!("../../products/{collection_id}/collection.json"))
        .with_title(collection_id)
}

pub fn variable_self_href(variable_id: &str) -> String {
    format!("{BASE_URL_OSC}/{}", paths::variable_catalog(variable_id))
}

/// Builds the product collection and variable catalogs of one opened dataset
#[derive(Debug, Clone)]
pub struct DatasetStacGenerator {
    options: ProductOptions,
    dataset: Dataset,
    variables: Vec<VariableMetadata>,
    generated_at: DateTime<Utc>,
}

impl DatasetStacGenerator {
    pub fn new(options: ProductOptions, dataset: Dataset) -> Self {
        let variables = extract::variables_metadata(&dataset);
        Self {
            options,
            dataset,
            variables,
            generated_at: Utc::now(),
        }
    }

    /// Stamp generated documents with a fixed instant
    pub fn with_timestamp(mut self, instant: DateTime<Utc>) -> Self {
        self.generated_at = instant;
        self
    }

    pub fn options(&self) -> &ProductOptions {
        &self.options
    }

    pub fn variable_ids(&self) -> Vec<String> {
        extract::variable_ids(&self.variables)
    }

    pub fn variable_metadata(&self, variable_id: &str) -> Option<&VariableMetadata> {
        self.variables.iter().find(|m| m.variable_id == variable_id)
    }

    pub fn build_dataset_collection(&self) -> Result<Collection> {
        let bbox = extract::spatial_extent(&self.dataset)?;
        let (start, end) = extract::temporal_extent(&self.dataset)?;
        let variables = self.variable_ids();
        let collection_id = &self.options.collection_id;

        let extent = Extent::new(
            bbox,
            extract::format_instant(&start),
            extract::format_instant(&end),
        );
        let mut collection = Collection::new(
            collection_id.clone(),
            extract::general_description(&self.dataset),
            extent,
        );

        osc::ensure_extensions(&mut collection.stac_extensions);
        collection.osc = OscProductFields {
            osc_type: Some("product".to_string()),
            osc_project: Some(PROJECT_COLLECTION_NAME.to_string()),
            osc_status: Some(self.options.status.to_string()),
            osc_name: None,
            osc_region: Some(self.options.region.clone()),
            osc_variables: variables.clone(),
            osc_missions: self.options.missions.clone(),
            cf_parameter: self.options.cf_parameter.clone(),
        };

        let now = osc::iso_timestamp(&self.generated_at);
        collection.created = now.clone();
        collection.updated = now;
        collection.title = Some(collection_id.clone());

        collection.upsert_link(root_link());
        collection
            .links
            .push(Link::new("via", &self.options.access_link).with_title("Access"));
        if let Some(documentation) = &self.options.documentation_link {
            collection
                .links
                .push(Link::new("via", documentation).with_title("Documentation"));
        }
        collection.upsert_link(Link::json("parent", "../catalog.json").with_title("Products"));

        for variable in &variables {
            collection.upsert_link(
                Link::json("related", format!("../../variables/{variable}/catalog.json"))
                    .with_title(format!("Variable: {}", osc::format_string(variable))),
            );
        }

        collection.set_self_href(&format!(
            "{BASE_URL_OSC}/{}",
            paths::product_collection(collection_id)
        ));

        if !self.options.themes.is_empty() {
            collection.themes = vec![osc::build_theme(&self.options.themes)];
            for theme in &self.options.themes {
                collection.upsert_link(theme_link(theme));
            }
        }

        collection.upsert_link(project_link());
        collection.osc.validate()?;

        tracing::debug!(
            "Built collection '{}' with {} variables",
            collection_id,
            variables.len()
        );
        Ok(collection)
    }

    /// Fresh catalog for a variable not yet present in the metadata repository
    pub fn build_variable_catalog(
        &self,
        variable: &VariableMetadata,
        resolver: &dyn GcmdKeywordResolver,
    ) -> Result<Catalog> {
        let variable_id = &variable.variable_id;
        let gcmd_keyword_url = match &variable.gcmd_keyword_url {
            Some(url) => url.clone(),
            None => resolver.resolve(variable)?,
        };

        let mut catalog = Catalog::new(
            variable_id.clone(),
            variable.description.clone().unwrap_or_default(),
        );
        catalog.title = Some(osc::format_string(variable_id));
        catalog.stac_extensions = vec![THEMES_SCHEMA_URI.to_string()];
        catalog
            .extra
            .insert("updated".to_string(), json!(osc::iso_timestamp(&self.generated_at)));
        catalog.extra.insert("keywords".to_string(), json!([]));
        catalog.extra.insert(
            "themes".to_string(),
            json!([{
                "scheme": OSC_THEME_SCHEME,
                "concepts": self
                    .options
                    .themes
                    .iter()
                    .map(|theme| json!({ "id": theme }))
                    .collect::<Vec<_>>(),
            }]),
        );

        catalog.upsert_link(root_link());
        catalog.upsert_link(product_link(&self.options.collection_id));
        catalog.upsert_link(Link::json("parent", "../catalog.json").with_title("Variables"));
        catalog.upsert_link(
            Link::new("via", &gcmd_keyword_url)
                .with_title("Description")
                .with_type("text/html"),
        );
        tracing::info!("Added GCMD link for {} catalog {}.", variable_id, gcmd_keyword_url);

        for theme in &self.options.themes {
            catalog.upsert_link(theme_link(theme));
        }
        catalog.set_self_href(&variable_self_href(variable_id));

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, DataVariable};
    use crate::constants::MEDIA_TYPE_JSON;
    use chrono::TimeZone;

    fn is_json_link(link: &Link) -> bool {
        link.media_type.as_deref() == Some(MEDIA_TYPE_JSON)
    }

    fn dataset() -> Dataset {
        Dataset::new()
            .with_attr("description", "Test cube")
            .with_coord("lon", Coordinate::numeric(vec![-10.0, 10.0]))
            .with_coord("lat", Coordinate::numeric(vec![35.0, 70.0]))
            .with_coord(
                "time",
                Coordinate::numeric(vec![0.0, 365.0]).with_attr("units", "days since 2020-01-01"),
            )
            .with_data_var(
                DataVariable::new("ndvi")
                    .with_attr("long_name", "Normalized difference vegetation index")
                    .with_attr("gcmd_keyword_url", "https://gcmd.example/ndvi"),
            )
            .with_data_var(DataVariable::new("crs"))
    }

    fn options(themes: &[&str]) -> ProductOptions {
        let config = DatasetConfig {
            dataset_id: Some("cube.zarr".to_string()),
            collection_id: Some("my-collection".to_string()),
            osc_themes: themes.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        ProductOptions::from_config(&config).unwrap()
    }

    fn generator(themes: &[&str]) -> DatasetStacGenerator {
        DatasetStacGenerator::new(options(themes), dataset())
            .with_timestamp(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_product_option_defaults() {
        let options = options(&[]);
        assert_eq!(options.access_link, "s3://deep-esdl-public/cube.zarr");
        assert_eq!(options.status, DatasetStatus::Ongoing);
        assert_eq!(options.region, "Global");
        assert_eq!(options.cf_parameter, vec![json!({"name": "my-collection"})]);
    }

    #[test]
    fn test_product_options_require_ids() {
        let config = DatasetConfig {
            dataset_id: Some("cube.zarr".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ProductOptions::from_config(&config),
            Err(DeepCodeError::ConfigMissing { key }) if key == "collection_id"
        ));
    }

    #[test]
    fn test_collection_fields() {
        let collection = generator(&["land"]).build_dataset_collection().unwrap();
        let value = serde_json::to_value(&collection).unwrap();

        assert_eq!(value["id"], "my-collection");
        assert_eq!(value["title"], "my-collection");
        assert_eq!(value["description"], "Test cube");
        assert_eq!(value["osc:type"], "product");
        assert_eq!(value["osc:project"], "deep-earth-system-data-lab");
        assert_eq!(value["osc:status"], "ongoing");
        assert_eq!(value["osc:variables"], json!(["ndvi"]));
        assert_eq!(value["extent"]["spatial"]["bbox"], json!([[-10.0, 35.0, 10.0, 70.0]]));
        assert_eq!(
            value["extent"]["temporal"]["interval"],
            json!([["2020-01-01T00:00:00Z", "2020-12-31T00:00:00Z"]])
        );
        assert_eq!(value["created"], value["updated"]);
        assert_eq!(value["themes"][0]["concepts"], json!([{"id": "land"}]));
    }

    #[test]
    fn test_collection_link_order() {
        let collection = generator(&["land"]).build_dataset_collection().unwrap();
        let rels: Vec<(&str, &str)> = collection
            .links
            .iter()
            .map(|l| (l.rel.as_str(), l.href.as_str()))
            .collect();

        assert_eq!(
            rels,
            vec![
                ("root", "../../catalog.json"),
                ("via", "s3://deep-esdl-public/cube.zarr"),
                ("parent", "../catalog.json"),
                ("related", "../../variables/ndvi/catalog.json"),
                (
                    "self",
                    "https://esa-earthcode.github.io/open-science-catalog-metadata/products/my-collection/collection.json"
                ),
                ("related", "../../themes/land/catalog.json"),
                ("related", "../../projects/deep-earth-system-data-lab/collection.json"),
            ]
        );
        assert_eq!(collection.links[3].title.as_deref(), Some("Variable: Ndvi"));
    }

    #[test]
    fn test_access_and_documentation_links_share_href() {
        let mut options = options(&[]);
        options.documentation_link = Some(options.access_link.clone());
        let collection = DatasetStacGenerator::new(options, dataset())
            .build_dataset_collection()
            .unwrap();

        let titles: Vec<_> = collection
            .links
            .iter()
            .filter(|l| l.rel == "via")
            .map(|l| l.title.as_deref())
            .collect();
        assert_eq!(titles, vec![Some("Access"), Some("Documentation")]);
    }

    #[test]
    fn test_collection_without_time_fails() {
        let dataset = Dataset::new()
            .with_coord("x", Coordinate::numeric(vec![0.0]))
            .with_coord("y", Coordinate::numeric(vec![0.0]));
        let generator = DatasetStacGenerator::new(options(&[]), dataset);

        assert!(matches!(
            generator.build_dataset_collection(),
            Err(DeepCodeError::Extraction(_))
        ));
    }

    #[test]
    fn test_variable_catalog() {
        let generator = generator(&["land"]);
        let metadata = generator.variable_metadata("ndvi").unwrap();
        let catalog = generator
            .build_variable_catalog(metadata, &RequireGcmdKeyword)
            .unwrap();

        assert_eq!(catalog.title.as_deref(), Some("Ndvi"));
        assert_eq!(catalog.description, "Normalized difference vegetation index");
        assert_eq!(catalog.extra["themes"][0]["concepts"], json!([{"id": "land"}]));

        let via = catalog.links.iter().find(|l| l.rel == "via").unwrap();
        assert_eq!(via.href, "https://gcmd.example/ndvi");
        assert_eq!(via.media_type.as_deref(), Some("text/html"));
        assert_eq!(
            catalog.self_href(),
            Some("https://esa-earthcode.github.io/open-science-catalog-metadata/variables/ndvi/catalog.json")
        );
    }

    #[test]
    fn test_missing_gcmd_url_uses_resolver() {
        let generator = generator(&[]);
        let metadata = VariableMetadata {
            variable_id: "lst".to_string(),
            description: None,
            gcmd_keyword_url: None,
        };

        assert!(matches!(
            generator.build_variable_catalog(&metadata, &RequireGcmdKeyword),
            Err(DeepCodeError::MissingGcmdKeyword { variable_id }) if variable_id == "lst"
        ));

        let fallback = DefaultGcmdKeyword("https://gcmd.example/default".to_string());
        let catalog = generator.build_variable_catalog(&metadata, &fallback).unwrap();
        assert!(catalog
            .links
            .iter()
            .any(|l| l.rel == "via" && l.href == "https://gcmd.example/default"));
        assert!(catalog.links.iter().filter(|l| l.rel != "via").all(is_json_link));
    }
}
