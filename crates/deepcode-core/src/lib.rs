//! DeepCode Core - Domain models, catalog builders, and publishing workflow
//!
//! This crate turns a dataset configuration, a workflow configuration and an
//! opened dataset into the STAC collections/catalogs and OGC API records that
//! make up an Open Science Catalog contribution.

pub mod builder;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod linker;
pub mod lint;
pub mod models;
pub mod osc;
pub mod ports;
pub mod publish;
pub mod records;
pub mod storage;
pub mod templates;

pub use error::{DeepCodeError, Result};
