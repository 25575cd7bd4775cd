//! Links a new product, its variables and its records into the repository's base catalogs

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::builder::{product_link, theme_link, variable_self_href, DatasetStacGenerator, GcmdKeywordResolver};
use crate::constants::{
    paths, DEEPESDL_COLLECTION_SELF_HREF, PRODUCT_BASE_CATALOG_SELF_HREF,
    VARIABLE_BASE_CATALOG_SELF_HREF,
};
use crate::error::{DeepCodeError, Result};
use crate::models::stac::Linkable;
use crate::models::{Catalog, Link, StacDocument};
use crate::osc;
use crate::ports::CatalogSource;

/// A per-variable catalog, either newly built or an augmented existing one
#[derive(Debug, Clone)]
pub enum VariableCatalog {
    Created(Catalog),
    Augmented(StacDocument),
}

impl VariableCatalog {
    pub fn is_new(&self) -> bool {
        matches!(self, VariableCatalog::Created(_))
    }

    pub fn to_value(&self) -> Result<Value> {
        match self {
            VariableCatalog::Created(catalog) => serde_json::to_value(catalog)
                .map_err(|e| DeepCodeError::Serialization(e.to_string())),
            VariableCatalog::Augmented(document) => document.to_value(),
        }
    }
}

/// Patches base catalogs for one product collection
///
/// Links are upserted by relation and target, so linking the same product twice
/// leaves every catalog unchanged apart from timestamps.
#[derive(Debug, Clone)]
pub struct CatalogLinker {
    collection_id: String,
    themes: Vec<String>,
    generated_at: DateTime<Utc>,
}

impl CatalogLinker {
    pub fn new(collection_id: impl Into<String>, themes: &[String]) -> Self {
        Self {
            collection_id: collection_id.into(),
            themes: themes.to_vec(),
            generated_at: Utc::now(),
        }
    }

    pub fn with_timestamp(mut self, instant: DateTime<Utc>) -> Self {
        self.generated_at = instant;
        self
    }

    /// `products/catalog.json`: child link to the new collection
    pub fn link_product_base(&self, mut catalog: StacDocument) -> StacDocument {
        catalog.upsert_link(
            Link::json("child", format!("./{}/collection.json", self.collection_id))
                .with_title(&self.collection_id),
        );
        catalog.set_self_href(PRODUCT_BASE_CATALOG_SELF_HREF);
        catalog
    }

    /// `variables/catalog.json`: child link per variable
    pub fn link_variable_base(&self, mut catalog: StacDocument, variable_ids: &[String]) -> StacDocument {
        for variable_id in variable_ids {
            catalog.upsert_link(
                Link::json("child", format!("./{variable_id}/catalog.json"))
                    .with_title(osc::format_string(variable_id)),
            );
        }
        catalog.set_self_href(VARIABLE_BASE_CATALOG_SELF_HREF);
        catalog
    }

    /// Project collection: child link to the product plus theme links
    pub fn link_project_collection(&self, mut collection: StacDocument) -> StacDocument {
        collection.upsert_link(product_link(&self.collection_id));
        self.add_theme_links(&mut collection);
        collection.set_self_href(DEEPESDL_COLLECTION_SELF_HREF);
        collection
    }

    /// Existing variable catalog: refresh `updated`, link the product and themes
    pub fn augment_variable_catalog(&self, mut catalog: StacDocument, variable_id: &str) -> StacDocument {
        catalog.set("updated", osc::iso_timestamp(&self.generated_at));
        catalog.upsert_link(product_link(&self.collection_id));
        self.add_theme_links(&mut catalog);
        catalog.set_self_href(&variable_self_href(variable_id));
        catalog
    }

    /// Build the variable catalog when the repository lacks it, else augment the existing one
    pub fn variable_catalog(
        &self,
        source: &dyn CatalogSource,
        generator: &DatasetStacGenerator,
        variable_id: &str,
        resolver: &dyn GcmdKeywordResolver,
    ) -> Result<VariableCatalog> {
        let path = paths::variable_catalog(variable_id);
        if source.exists(&path) {
            tracing::info!(
                "Variable catalog already exists for {}, adding product link.",
                variable_id
            );
            let existing = source.read_document(&path)?;
            return Ok(VariableCatalog::Augmented(
                self.augment_variable_catalog(existing, variable_id),
            ));
        }

        tracing::info!("Variable catalog for {} does not exist. Creating...", variable_id);
        let metadata = generator
            .variable_metadata(variable_id)
            .ok_or_else(|| DeepCodeError::Extraction(format!("Unknown variable '{}'", variable_id)))?;
        Ok(VariableCatalog::Created(
            generator.build_variable_catalog(metadata, resolver)?,
        ))
    }

    /// Experiments or workflows base catalog: item link to the record
    pub fn link_record_base(
        mut catalog: StacDocument,
        workflow_id: &str,
        title: Option<&str>,
        self_href: &str,
    ) -> StacDocument {
        catalog.upsert_link(
            Link::json("item", format!("./{workflow_id}/record.json"))
                .with_title(title.unwrap_or_default()),
        );
        catalog.set_self_href(self_href);
        catalog
    }

    fn add_theme_links(&self, document: &mut StacDocument) {
        for theme in &self.themes {
            document.upsert_link(theme_link(theme));
        }
    }
}
