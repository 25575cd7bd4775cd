//! Spatial, temporal and per-variable metadata drawn from an opened dataset

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::{DeepCodeError, Result};
use crate::models::dataset::attr_str;
use crate::models::{Coordinate, CoordinateValues, DataVariable, Dataset};

/// Coordinate-name pairs tried, in order, for the spatial extent
pub const SPATIAL_COORDINATE_PAIRS: [(&str, &str); 3] =
    [("lon", "lat"), ("longitude", "latitude"), ("x", "y")];

/// Variable ids never published as variables
pub const EXCLUDED_VARIABLE_IDS: [&str; 2] = ["crs", "spatial-ref"];

pub const NO_DESCRIPTION: &str = "No description available.";

/// Descriptive metadata of one data variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMetadata {
    pub variable_id: String,
    pub description: Option<String>,
    pub gcmd_keyword_url: Option<String>,
}

/// Lowercase, with spaces and underscores turned into hyphens
pub fn normalize_name(name: &str) -> String {
    name.replace([' ', '_'], "-").to_lowercase()
}

/// `[lon_min, lat_min, lon_max, lat_max]` from the first recognized coordinate pair
pub fn spatial_extent(dataset: &Dataset) -> Result<[f64; 4]> {
    let (x_name, y_name) = SPATIAL_COORDINATE_PAIRS
        .iter()
        .find(|(x, y)| dataset.has_coords(&[*x, *y]))
        .ok_or_else(|| {
            DeepCodeError::Extraction(
                "Dataset does not have recognized spatial coordinates ('lon', 'lat' or 'x', 'y')."
                    .to_string(),
            )
        })?;

    let (x_min, x_max) = coordinate_range(dataset, x_name)?;
    let (y_min, y_max) = coordinate_range(dataset, y_name)?;
    Ok([x_min, y_min, x_max, y_max])
}

fn coordinate_range(dataset: &Dataset, name: &str) -> Result<(f64, f64)> {
    dataset
        .coord(name)
        .and_then(Coordinate::numeric_range)
        .ok_or_else(|| {
            DeepCodeError::Extraction(format!("Coordinate '{}' has no finite numeric values.", name))
        })
}

/// Earliest and latest instant of the `time` coordinate
pub fn temporal_extent(dataset: &Dataset) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let time = dataset.coord("time").ok_or_else(|| {
        DeepCodeError::Extraction("Dataset does not have a 'time' coordinate.".to_string())
    })?;

    let instants = decode_time(time).map_err(|reason| {
        DeepCodeError::Extraction(format!("Failed to parse temporal extent: {}", reason))
    })?;

    let start = instants.iter().min().copied();
    let end = instants.iter().max().copied();
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(DeepCodeError::Extraction(
            "Failed to parse temporal extent: time coordinate is empty".to_string(),
        )),
    }
}

/// RFC 3339 form used for STAC temporal intervals
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn decode_time(time: &Coordinate) -> std::result::Result<Vec<DateTime<Utc>>, String> {
    match &time.values {
        CoordinateValues::Timestamps(values) => Ok(values.clone()),
        CoordinateValues::Numeric(values) => {
            let units = attr_str(&time.attrs, "units")
                .ok_or_else(|| "time coordinate has no 'units' attribute".to_string())?;
            let (step, reference) = parse_time_units(units)?;
            if let Some(calendar) = attr_str(&time.attrs, "calendar") {
                if !is_standard_calendar(calendar) {
                    tracing::warn!(
                        "Time calendar '{}' is decoded as proleptic Gregorian; the temporal extent may be off",
                        calendar
                    );
                }
            }

            values
                .iter()
                .filter(|v| v.is_finite())
                .map(|v| {
                    let nanos = v * step as f64;
                    if nanos.abs() >= i64::MAX as f64 {
                        return Err(format!("time value {} is out of range", v));
                    }
                    reference
                        .checked_add_signed(Duration::nanoseconds(nanos.round() as i64))
                        .ok_or_else(|| format!("time value {} is out of range", v))
                })
                .collect()
        }
    }
}

/// CF calendars that decode exactly as proleptic Gregorian for post-1582 dates
fn is_standard_calendar(calendar: &str) -> bool {
    matches!(
        calendar.trim().to_lowercase().as_str(),
        "standard" | "gregorian" | "proleptic_gregorian"
    )
}

/// Split CF time units `"<unit> since <reference>"` into nanoseconds per unit and the epoch
fn parse_time_units(units: &str) -> std::result::Result<(i64, DateTime<Utc>), String> {
    let (unit, reference) = units
        .split_once(" since ")
        .ok_or_else(|| format!("unsupported time units '{}'", units))?;

    let step = match unit.trim().to_lowercase().as_str() {
        "days" | "day" | "d" => 86_400_000_000_000,
        "hours" | "hour" | "h" => 3_600_000_000_000,
        "minutes" | "minute" | "min" => 60_000_000_000,
        "seconds" | "second" | "s" | "sec" => 1_000_000_000,
        "milliseconds" | "millisecond" | "ms" => 1_000_000,
        "microseconds" | "microsecond" | "us" => 1_000,
        "nanoseconds" | "nanosecond" | "ns" => 1,
        other => return Err(format!("unsupported time unit '{}'", other)),
    };

    Ok((step, parse_reference(reference)?))
}

fn parse_reference(reference: &str) -> std::result::Result<DateTime<Utc>, String> {
    let trimmed = reference.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }

    let naive = trimmed
        .trim_end_matches("UTC")
        .trim_end_matches('Z')
        .trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(instant) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(instant.and_utc());
        }
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|instant| instant.and_utc())
        .ok_or_else(|| format!("unparsable reference date '{}'", reference))
}

/// Dataset `description` attribute, or a fixed placeholder
pub fn general_description(dataset: &Dataset) -> String {
    dataset
        .attr_str("description")
        .unwrap_or(NO_DESCRIPTION)
        .to_string()
}

pub fn extract_variable_metadata(variable: &DataVariable) -> VariableMetadata {
    let raw_id = variable.attr_str("standard_name").unwrap_or(&variable.name);
    let description = variable
        .attr_str("description")
        .or_else(|| variable.attr_str("long_name"))
        .map(str::to_string);

    VariableMetadata {
        variable_id: normalize_name(raw_id),
        description,
        gcmd_keyword_url: variable.attr_str("gcmd_keyword_url").map(str::to_string),
    }
}

/// Metadata of every data variable, one entry per normalized id
///
/// A later variable with the same id replaces the earlier entry in its position.
pub fn variables_metadata(dataset: &Dataset) -> Vec<VariableMetadata> {
    let mut metadata: Vec<VariableMetadata> = Vec::with_capacity(dataset.data_vars.len());
    for variable in &dataset.data_vars {
        let entry = extract_variable_metadata(variable);
        match metadata
            .iter_mut()
            .find(|existing| existing.variable_id == entry.variable_id)
        {
            Some(existing) => *existing = entry,
            None => metadata.push(entry),
        }
    }
    metadata
}

/// Publishable variable ids
pub fn variable_ids(metadata: &[VariableMetadata]) -> Vec<String> {
    metadata
        .iter()
        .map(|m| m.variable_id.clone())
        .filter(|id| !EXCLUDED_VARIABLE_IDS.contains(&id.as_str()))
        .collect()
}
