//! Opening Zarr datasets into the in-memory `Dataset` model

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use zarrs::array::{Array, DataType, ElementOwned};
use zarrs::storage::ReadableStorageTraits;
use zarrs_filesystem::FilesystemStore;
use zarrs_storage::{ReadableStorage, StoreKey};

use deepcode_core::error::DeepCodeError;
use deepcode_core::models::{Coordinate, DataVariable, Dataset};
use deepcode_core::storage::{DatasetOpener, StorageConfig, StorageParams};

use crate::consolidated::{ConsolidatedMetadata, V2_CONSOLIDATED_KEY, V3_ROOT_KEY};
use crate::error::{Result, StoreError};
use crate::s3::{create_s3_storage, S3StoreConfig};

/// Opens datasets from local directories or S3 buckets
///
/// Owns the runtime that drives object-store requests, so it must be used
/// from synchronous code.
pub struct ZarrDatasetOpener {
    runtime: tokio::runtime::Runtime,
}

impl ZarrDatasetOpener {
    pub fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }

    fn open_storage(&self, dataset_id: &str, params: &StorageParams) -> Result<ReadableStorage> {
        match params {
            StorageParams::File { root } => open_local_storage(&root.join(dataset_id)),
            StorageParams::S3 {
                root,
                region,
                endpoint,
                anonymous,
                credentials,
            } => create_s3_storage(
                &S3StoreConfig {
                    bucket: root,
                    region,
                    endpoint: endpoint.as_deref(),
                    anonymous: *anonymous,
                    credentials: credentials.as_ref(),
                },
                dataset_id,
                self.runtime.handle().clone(),
            ),
        }
    }
}

impl DatasetOpener for ZarrDatasetOpener {
    fn open(&self, dataset_id: &str, config: &StorageConfig) -> deepcode_core::Result<Dataset> {
        let storage_error = |e: StoreError| DeepCodeError::StorageAccess {
            configuration: config.description.clone(),
            reason: e.to_string(),
        };

        let storage = self
            .open_storage(dataset_id, &config.params)
            .map_err(storage_error)?;
        read_dataset(storage).map_err(storage_error)
    }
}

/// Open a Zarr store rooted at a local directory
pub fn open_local_storage(path: &Path) -> Result<ReadableStorage> {
    if !path.is_dir() {
        return Err(StoreError::NotFound(path.display().to_string()));
    }
    let store = FilesystemStore::new(path).map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(Arc::new(store))
}

/// Read attributes and coordinate values of a consolidated Zarr store
pub fn read_dataset(storage: ReadableStorage) -> Result<Dataset> {
    let metadata = read_consolidated_metadata(&storage)?;
    let coordinate_names = metadata.coordinate_names();
    let unnamed = metadata.unnamed_dimension_arrays();
    if !unnamed.is_empty() {
        if coordinate_names.is_empty() {
            return Err(StoreError::MissingDimensionNames(unnamed.join(", ")));
        }
        warn!(arrays = %unnamed.join(", "), "Arrays without dimension names are treated as data variables");
    }

    let mut dataset = Dataset {
        attrs: metadata.attrs.clone(),
        ..Dataset::default()
    };

    for entry in &metadata.arrays {
        if !coordinate_names.contains(&entry.name) {
            dataset.data_vars.push(DataVariable {
                name: entry.name.clone(),
                dims: entry.dims.clone(),
                attrs: entry.attrs.clone(),
            });
            continue;
        }

        match read_coordinate_values(&storage, &entry.name, &entry.attrs) {
            Ok(values) => {
                let coordinate = Coordinate {
                    attrs: entry.attrs.clone(),
                    ..Coordinate::numeric(values)
                };
                dataset = dataset.with_coord(entry.name.clone(), coordinate);
            }
            Err(StoreError::UnsupportedDataType { name, data_type }) => {
                debug!(coordinate = %name, %data_type, "Skipping non-numeric coordinate");
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        coordinates = dataset.coords.len(),
        data_vars = dataset.data_vars.len(),
        "Read Zarr dataset metadata"
    );
    Ok(dataset)
}

fn read_consolidated_metadata(storage: &ReadableStorage) -> Result<ConsolidatedMetadata> {
    if let Some(document) = read_json(storage, V2_CONSOLIDATED_KEY)? {
        return ConsolidatedMetadata::from_v2(&document);
    }
    match read_json(storage, V3_ROOT_KEY)? {
        Some(root) => ConsolidatedMetadata::from_v3(&root),
        None => Err(StoreError::MissingConsolidatedMetadata),
    }
}

fn read_json(storage: &ReadableStorage, key: &str) -> Result<Option<Value>> {
    let store_key = StoreKey::new(key).map_err(|e| StoreError::invalid(key, e.to_string()))?;
    let Some(bytes) = storage
        .get(&store_key)
        .map_err(|e| StoreError::Backend(e.to_string()))?
    else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StoreError::invalid(key, e.to_string()))
}

/// Decoded coordinate values with CF packing undone and fill values as NaN
fn read_coordinate_values(
    storage: &ReadableStorage,
    name: &str,
    attrs: &Map<String, Value>,
) -> Result<Vec<f64>> {
    let array = Array::open(storage.clone(), &format!("/{}", name))
        .map_err(|e| StoreError::read(name, e))?;

    let raw = match array.data_type() {
        DataType::Float64 => elements::<f64>(&array, name)?,
        DataType::Float32 => widen(elements::<f32>(&array, name)?),
        DataType::Int64 => elements::<i64>(&array, name)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        DataType::Int32 => widen(elements::<i32>(&array, name)?),
        DataType::Int16 => widen(elements::<i16>(&array, name)?),
        DataType::Int8 => widen(elements::<i8>(&array, name)?),
        DataType::UInt64 => elements::<u64>(&array, name)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        DataType::UInt32 => widen(elements::<u32>(&array, name)?),
        DataType::UInt16 => widen(elements::<u16>(&array, name)?),
        DataType::UInt8 => widen(elements::<u8>(&array, name)?),
        other => {
            return Err(StoreError::UnsupportedDataType {
                name: name.to_string(),
                data_type: format!("{:?}", other),
            })
        }
    };

    Ok(unpack(raw, attrs))
}

fn elements<T: ElementOwned>(array: &Array<dyn ReadableStorageTraits>, name: &str) -> Result<Vec<T>> {
    array
        .retrieve_array_subset_elements::<T>(&array.subset_all())
        .map_err(|e| StoreError::read(name, e))
}

fn widen<T: Into<f64>>(values: Vec<T>) -> Vec<f64> {
    values.into_iter().map(Into::into).collect()
}

fn unpack(values: Vec<f64>, attrs: &Map<String, Value>) -> Vec<f64> {
    let fill_values: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|key| attrs.get(*key).and_then(Value::as_f64))
        .collect();
    let scale = attrs.get("scale_factor").and_then(Value::as_f64).unwrap_or(1.0);
    let offset = attrs.get("add_offset").and_then(Value::as_f64).unwrap_or(0.0);

    values
        .into_iter()
        .map(|v| {
            if fill_values.contains(&v) {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect()
}
