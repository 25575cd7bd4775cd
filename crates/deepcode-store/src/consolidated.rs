//! Consolidated Zarr metadata (v2 `.zmetadata`, v3 inline `consolidated_metadata`)

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::error::{Result, StoreError};

pub const V2_CONSOLIDATED_KEY: &str = ".zmetadata";
pub const V3_ROOT_KEY: &str = "zarr.json";

/// xarray's attribute carrying dimension names in Zarr v2
const ARRAY_DIMENSIONS_ATTR: &str = "_ARRAY_DIMENSIONS";

/// One top-level array as described by consolidated metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayEntry {
    pub name: String,
    pub dims: Vec<String>,
    pub attrs: Map<String, Value>,
    /// Set when the array has axes but no dimension names were recorded
    pub unnamed_dims: bool,
}

/// Group attributes plus every top-level array, in name order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedMetadata {
    pub attrs: Map<String, Value>,
    pub arrays: Vec<ArrayEntry>,
}

impl ConsolidatedMetadata {
    /// Parse a Zarr v2 `.zmetadata` document
    pub fn from_v2(document: &Value) -> Result<Self> {
        let metadata = document
            .get("metadata")
            .and_then(Value::as_object)
            .ok_or_else(|| StoreError::invalid(V2_CONSOLIDATED_KEY, "missing 'metadata' object"))?;

        let attrs = metadata
            .get(".zattrs")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut arrays = Vec::new();
        for key in metadata.keys() {
            let Some(name) = key.strip_suffix("/.zarray") else {
                continue;
            };
            if name.contains('/') {
                continue;
            }
            let mut array_attrs = metadata
                .get(&format!("{name}/.zattrs"))
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let dims = take_array_dimensions(&mut array_attrs);
            let rank = metadata.get(key).map_or(0, array_rank);
            arrays.push(ArrayEntry {
                name: name.to_string(),
                unnamed_dims: dims.is_none() && rank > 0,
                dims: dims.unwrap_or_default(),
                attrs: array_attrs,
            });
        }
        arrays.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self { attrs, arrays })
    }

    /// Parse a Zarr v3 root group `zarr.json` carrying inline consolidated metadata
    pub fn from_v3(root: &Value) -> Result<Self> {
        let metadata = root
            .get("consolidated_metadata")
            .and_then(|c| c.get("metadata"))
            .and_then(Value::as_object)
            .ok_or(StoreError::MissingConsolidatedMetadata)?;

        let attrs = root
            .get("attributes")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut arrays = Vec::new();
        for (name, node) in metadata {
            let name = name.trim_start_matches('/');
            if name.contains('/') || node.get("node_type").and_then(Value::as_str) != Some("array") {
                continue;
            }

            let mut array_attrs = node
                .get("attributes")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let legacy_dims = take_array_dimensions(&mut array_attrs);
            let dims = match node.get("dimension_names").and_then(Value::as_array) {
                Some(names) if names.iter().all(Value::is_string) => Some(
                    names
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                ),
                _ => legacy_dims,
            };

            arrays.push(ArrayEntry {
                name: name.to_string(),
                unnamed_dims: dims.is_none() && array_rank(node) > 0,
                dims: dims.unwrap_or_default(),
                attrs: array_attrs,
            });
        }
        arrays.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self { attrs, arrays })
    }

    /// Arrays with axes whose dimension names were never recorded
    pub fn unnamed_dimension_arrays(&self) -> Vec<&str> {
        self.arrays
            .iter()
            .filter(|array| array.unnamed_dims)
            .map(|array| array.name.as_str())
            .collect()
    }

    /// Names of coordinate arrays
    ///
    /// An array is a coordinate when it is one-dimensional along a dimension of
    /// the same name, or when another array lists it in its `coordinates` attribute.
    pub fn coordinate_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self
            .arrays
            .iter()
            .filter(|array| array.dims.len() == 1 && array.dims[0] == array.name)
            .map(|array| array.name.clone())
            .collect();

        for array in &self.arrays {
            if let Some(listed) = array.attrs.get("coordinates").and_then(Value::as_str) {
                names.extend(
                    listed
                        .split_whitespace()
                        .filter(|name| self.array(name).is_some())
                        .map(str::to_string),
                );
            }
        }
        names
    }

    pub fn array(&self, name: &str) -> Option<&ArrayEntry> {
        self.arrays.iter().find(|array| array.name == name)
    }
}

fn take_array_dimensions(attrs: &mut Map<String, Value>) -> Option<Vec<String>> {
    match attrs.remove(ARRAY_DIMENSIONS_ATTR) {
        Some(Value::Array(names)) => Some(
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

fn array_rank(array_metadata: &Value) -> usize {
    array_metadata
        .get("shape")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}
