//! DeepCode Store - Zarr dataset access
//!
//! Implements the core `DatasetOpener` port for Zarr stores on the local file
//! system or in S3-compatible object storage, reading consolidated metadata
//! and coordinate values with `zarrs`.

pub mod consolidated;
pub mod error;
pub mod s3;
pub mod zarr;

pub use error::StoreError;
pub use zarr::{read_dataset, ZarrDatasetOpener};
