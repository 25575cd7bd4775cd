use thiserror::Error;

/// Failures while reading a Zarr store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Dataset not found at {0}")]
    NotFound(String),

    #[error("Consolidated metadata is missing; expected .zmetadata or zarr.json with consolidated_metadata")]
    MissingConsolidatedMetadata,

    #[error("Invalid metadata for {node}: {reason}")]
    InvalidMetadata { node: String, reason: String },

    #[error("Arrays {0} have no dimension names; expected _ARRAY_DIMENSIONS attributes (v2) or dimension_names (v3)")]
    MissingDimensionNames(String),

    #[error("Unsupported data type {data_type} for coordinate '{name}'")]
    UnsupportedDataType { name: String, data_type: String },

    #[error("Failed to read array '{name}': {reason}")]
    Read { name: String, reason: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn invalid(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            node: node.into(),
            reason: reason.into(),
        }
    }

    pub fn read(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Read {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
