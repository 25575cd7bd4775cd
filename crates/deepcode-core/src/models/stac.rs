//! STAC documents: links, extents, catalogs and collections

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::Theme;
use crate::constants::MEDIA_TYPE_JSON;
use crate::error::{DeepCodeError, Result};
use crate::osc::OscProductFields;

pub const STAC_VERSION: &str = "1.0.0";

/// A typed relation from one document to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Any further link fields are kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            media_type: None,
            title: None,
            extra: Map::new(),
        }
    }

    pub fn json(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self::new(rel, href).with_type(MEDIA_TYPE_JSON)
    }

    pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Links are identified by relation and target
    pub fn same_target(&self, other: &Link) -> bool {
        self.rel == other.rel && self.href == other.href
    }
}

/// Documents that carry a link list
pub trait Linkable {
    fn links(&self) -> &[Link];

    fn links_mut(&mut self) -> &mut Vec<Link>;

    /// Insert a link, replacing an existing one with the same rel and href in place
    fn upsert_link(&mut self, link: Link) {
        let links = self.links_mut();
        match links.iter_mut().find(|existing| existing.same_target(&link)) {
            Some(existing) => *existing = link,
            None => links.push(link),
        }
    }

    fn remove_links(&mut self, rel: &str) {
        self.links_mut().retain(|link| link.rel != rel);
    }

    /// Replace every self link with a single canonical one
    fn set_self_href(&mut self, href: &str) {
        self.remove_links("self");
        self.links_mut().push(Link::json("self", href));
    }

    fn self_href(&self) -> Option<&str> {
        self.links()
            .iter()
            .find(|link| link.rel == "self")
            .map(|link| link.href.as_str())
    }

    fn links_with_rel<'a>(&'a self, rel: &'a str) -> Box<dyn Iterator<Item = &'a Link> + 'a> {
        Box::new(self.links().iter().filter(move |link| link.rel == rel))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<[f64; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<String>; 2]>,
}

/// Spatial and temporal coverage of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

impl Extent {
    pub fn new(bbox: [f64; 4], start: String, end: String) -> Self {
        Self {
            spatial: SpatialExtent { bbox: vec![bbox] },
            temporal: TemporalExtent {
                interval: vec![[Some(start), Some(end)]],
            },
        }
    }
}

/// A freshly built STAC catalog
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    #[serde(rename = "type")]
    pub doc_type: &'static str,
    pub id: String,
    pub stac_version: &'static str,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub stac_extensions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub links: Vec<Link>,
}

impl Catalog {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            doc_type: "Catalog",
            id: id.into(),
            stac_version: STAC_VERSION,
            description: description.into(),
            title: None,
            stac_extensions: Vec::new(),
            extra: Map::new(),
            links: Vec::new(),
        }
    }
}

impl Linkable for Catalog {
    fn links(&self) -> &[Link] {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Vec<Link> {
        &mut self.links
    }
}

/// A product collection carrying the OSC extension fields
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    #[serde(rename = "type")]
    pub doc_type: &'static str,
    pub id: String,
    pub stac_version: &'static str,
    pub stac_extensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    pub license: String,
    pub extent: Extent,
    #[serde(flatten)]
    pub osc: OscProductFields,
    pub created: String,
    pub updated: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<Theme>,
    pub links: Vec<Link>,
}

impl Collection {
    pub fn new(id: impl Into<String>, description: impl Into<String>, extent: Extent) -> Self {
        Self {
            doc_type: "Collection",
            id: id.into(),
            stac_version: STAC_VERSION,
            stac_extensions: Vec::new(),
            title: None,
            description: description.into(),
            license: "other".to_string(),
            extent,
            osc: OscProductFields::default(),
            created: String::new(),
            updated: String::new(),
            themes: Vec::new(),
            links: Vec::new(),
        }
    }
}

impl Linkable for Collection {
    fn links(&self) -> &[Link] {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Vec<Link> {
        &mut self.links
    }
}

/// Any STAC document loaded from the metadata repository
///
/// Only the link list is typed; every other field round-trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StacDocument {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl StacDocument {
    pub fn from_value(value: Value, path: &str) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| DeepCodeError::Catalog {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| DeepCodeError::Serialization(e.to_string()))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }
}

impl Linkable for StacDocument {
    fn links(&self) -> &[Link] {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Vec<Link> {
        &mut self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upsert_replaces_same_target_in_place() {
        let mut doc = StacDocument::default();
        doc.upsert_link(Link::json("child", "./a/collection.json"));
        doc.upsert_link(Link::json("child", "./b/collection.json"));
        doc.upsert_link(Link::json("child", "./a/collection.json").with_title("A"));

        assert_eq!(doc.links.len(), 2);
        assert_eq!(doc.links[0].title.as_deref(), Some("A"));
        assert_eq!(doc.links[1].href, "./b/collection.json");
    }

    #[test]
    fn test_set_self_href_keeps_single_self_link() {
        let mut doc = StacDocument::default();
        doc.links.push(Link::new("self", "https://old.example/catalog.json"));
        doc.links.push(Link::new("root", "../catalog.json"));

        doc.set_self_href("https://new.example/catalog.json");
        doc.set_self_href("https://new.example/catalog.json");

        assert_eq!(doc.links_with_rel("self").count(), 1);
        assert_eq!(doc.self_href(), Some("https://new.example/catalog.json"));
        assert_eq!(doc.links.last().map(|l| l.rel.as_str()), Some("self"));
    }

    #[test]
    fn test_document_round_trips_unknown_fields() {
        let value = json!({
            "type": "Catalog",
            "id": "products",
            "custom": {"nested": [1, 2]},
            "links": [{"rel": "root", "href": "../catalog.json", "foo": "bar"}]
        });

        let doc = StacDocument::from_value(value.clone(), "products/catalog.json").unwrap();
        assert_eq!(doc.get_str("id"), Some("products"));
        assert_eq!(doc.links[0].extra.get("foo"), Some(&json!("bar")));
        assert_eq!(doc.to_value().unwrap(), value);
    }

    #[test]
    fn test_invalid_links_are_reported_with_path() {
        let value = json!({"id": "x", "links": [{"rel": "child"}]});
        let err = StacDocument::from_value(value, "variables/x/catalog.json").unwrap_err();
        assert!(matches!(err, DeepCodeError::Catalog { path, .. } if path == "variables/x/catalog.json"));
    }
}
