pub mod dataset;
pub mod inputs;
pub mod record;
pub mod stac;

pub use dataset::{Attributes, Coordinate, CoordinateValues, DataVariable, Dataset};
pub use inputs::{
    ContactConfig, DatasetConfig, DatasetStatus, GitCredentials, JupyterKernelInfo,
    WorkflowConfig, WorkflowProperties,
};
pub use record::{Contact, ExperimentRecord, RecordProperties, Theme, ThemeConcept, WorkflowRecord};
pub use stac::{Catalog, Collection, Extent, Link, Linkable, StacDocument};
