//! Opened dataset contents: attributes, coordinate values and data variables

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Attribute map of a dataset, coordinate, or variable
pub type Attributes = Map<String, Value>;

/// In-memory view of an opened gridded dataset
///
/// Only what catalog generation needs is kept: global attributes, the values
/// of every coordinate, and the attributes of every data variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Global attributes
    pub attrs: Attributes,

    /// Coordinates in declaration order
    pub coords: Vec<(String, Coordinate)>,

    /// Data variables in declaration order
    pub data_vars: Vec<DataVariable>,
}

/// Values and attributes of a coordinate variable
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub values: CoordinateValues,
    pub attrs: Attributes,
}

/// Coordinate values, either raw numbers or already decoded timestamps
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateValues {
    Numeric(Vec<f64>),
    Timestamps(Vec<DateTime<Utc>>),
}

/// A data variable (non-coordinate array)
#[derive(Debug, Clone, PartialEq)]
pub struct DataVariable {
    pub name: String,
    pub dims: Vec<String>,
    pub attrs: Attributes,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_coord(mut self, name: impl Into<String>, coord: Coordinate) -> Self {
        let name = name.into();
        self.coords.retain(|(existing, _)| existing != &name);
        self.coords.push((name, coord));
        self
    }

    pub fn with_data_var(mut self, var: DataVariable) -> Self {
        self.data_vars.push(var);
        self
    }

    pub fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.coords.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn has_coords(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.coord(name).is_some())
    }

    /// String-valued global attribute
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        attr_str(&self.attrs, key)
    }
}

impl Coordinate {
    pub fn numeric(values: Vec<f64>) -> Self {
        Self {
            values: CoordinateValues::Numeric(values),
            attrs: Attributes::new(),
        }
    }

    pub fn timestamps(values: Vec<DateTime<Utc>>) -> Self {
        Self {
            values: CoordinateValues::Timestamps(values),
            attrs: Attributes::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Minimum and maximum of the finite numeric values
    pub fn numeric_range(&self) -> Option<(f64, f64)> {
        match &self.values {
            CoordinateValues::Numeric(values) => finite_range(values),
            CoordinateValues::Timestamps(_) => None,
        }
    }
}

impl DataVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dims: Vec::new(),
            attrs: Attributes::new(),
        }
    }

    pub fn with_dims(mut self, dims: &[&str]) -> Self {
        self.dims = dims.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        attr_str(&self.attrs, key)
    }
}

/// Non-empty string attribute lookup
pub fn attr_str<'a>(attrs: &'a Attributes, key: &str) -> Option<&'a str> {
    attrs
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}
