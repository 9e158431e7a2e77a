//! Code for reading hydrogen pipelines from a GeoJSON file.
use super::input_err_msg;
use crate::pipeline::{Pipeline, PipelineID};
use anyhow::{Context, Result, bail, ensure};
use geo::{Coord, LineString, MultiLineString};
use geojson::{Feature, GeoJson, Position, Value};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const PIPELINES_FILE_NAME: &str = "pipelines.geojson";

/// Property names under which the commissioning year may be given
const COMMISSIONING_YEAR_PROPERTIES: [&str; 2] = ["commissioning_year", "Commissioning Year First"];

/// Read pipelines from the model directory.
///
/// The file is optional: models without it have no pipeline network.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The pipelines, `None` if the file does not exist, or an error.
pub fn read_pipelines(model_dir: &Path) -> Result<Option<Vec<Pipeline>>> {
    let file_path = model_dir.join(PIPELINES_FILE_NAME);
    if !file_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&file_path).with_context(|| input_err_msg(&file_path))?;
    let pipelines = read_pipelines_from_str(&contents).with_context(|| input_err_msg(&file_path))?;

    Ok(Some(pipelines))
}

fn read_pipelines_from_str(contents: &str) -> Result<Vec<Pipeline>> {
    let GeoJson::FeatureCollection(collection) = contents.parse::<GeoJson>()? else {
        bail!("Pipelines must be given as a FeatureCollection");
    };

    let mut ids = HashSet::new();
    let mut pipelines = Vec::new();
    for (index, feature) in collection.features.iter().enumerate() {
        let pipeline = read_pipeline(feature)
            .with_context(|| format!("Invalid pipeline feature at position {index}"))?;
        ensure!(
            ids.insert(pipeline.id.clone()),
            "Duplicate pipeline ID found: {}",
            pipeline.id
        );
        pipelines.push(pipeline);
    }

    Ok(pipelines)
}

fn read_pipeline(feature: &Feature) -> Result<Pipeline> {
    let id = match feature.property("id") {
        Some(JsonValue::String(id)) => PipelineID::new(id),
        Some(JsonValue::Number(id)) => PipelineID::from(id.to_string()),
        _ => bail!("Pipeline must have an id property"),
    };

    let commissioning_year = COMMISSIONING_YEAR_PROPERTIES
        .iter()
        .find_map(|name| feature.property(name))
        .with_context(|| format!("Pipeline {id} must have a commissioning_year property"))?;
    let commissioning_year = parse_year(commissioning_year)
        .with_context(|| format!("Invalid commissioning year for pipeline {id}"))?;

    let geometry = feature
        .geometry
        .as_ref()
        .with_context(|| format!("Pipeline {id} has no geometry"))?;
    let lines = match &geometry.value {
        Value::LineString(line) => vec![to_line_string(line)?],
        Value::MultiLineString(lines) => lines
            .iter()
            .map(|line| to_line_string(line))
            .collect::<Result<_>>()?,
        _ => bail!("Pipeline {id} must be a LineString or MultiLineString"),
    };

    Ok(Pipeline::new(
        id,
        MultiLineString::new(lines),
        commissioning_year,
    ))
}

/// Parse a year given as a JSON number.
///
/// GIS tools often store integer attributes as floats, so whole-valued floats are accepted too.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_year(value: &JsonValue) -> Result<u32> {
    let year = match value.as_u64() {
        Some(year) => year,
        None => {
            let year = value
                .as_f64()
                .with_context(|| format!("Year must be a number, got {value}"))?;
            ensure!(
                year.is_finite() && year.fract() == 0.0 && year >= 0.0,
                "Year must be a non-negative whole number, got {year}"
            );
            ensure!(year <= f64::from(u32::MAX), "Year is out of range: {year}");
            year as u64
        }
    };

    Ok(u32::try_from(year)?)
}

fn to_line_string(positions: &[Position]) -> Result<LineString<f64>> {
    ensure!(
        positions.len() >= 2,
        "A line must have at least two positions"
    );

    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => bail!("Positions must have a longitude and a latitude"),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}
