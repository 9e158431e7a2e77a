//! Common routines for handling input data.
use crate::model::{Model, ModelParameters};
use crate::pipeline::PipelineNetwork;
use crate::region::{Region, RegionMap};
use crate::site::{Site, SiteMap};
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use log::warn;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fs;
use std::path::Path;
use std::vec;

pub mod energy_carrier;
use energy_carrier::read_energy_carriers;
pub mod pipeline;
use pipeline::read_pipelines;
pub mod process;
use process::{ProcessCatalog, read_process_catalog};
pub mod production_unit;
use production_unit::read_production_units;
pub mod region;
use region::read_regions;
pub mod site;
use site::read_sites;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<vec::IntoIter<T>> {
    let vec = read_csv_internal(file_path)?;
    ensure!(!vec.is_empty(), "CSV file {} cannot be empty", file_path.display());

    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file, which may be absent or empty
pub fn read_csv_optional<T: DeserializeOwned>(file_path: &Path) -> Result<vec::IntoIter<T>> {
    if !file_path.exists() {
        return Ok(Vec::new().into_iter());
    }

    Ok(read_csv_internal(file_path)?.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Read an f64, checking that it is between 0 and 1
pub fn deserialise_proportion<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value) {
        Err(serde::de::Error::custom("Value must be between 0 and 1"))?;
    }

    Ok(value)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Check that every value in the iterator is a finite number
pub fn check_values_finite<I>(values: I) -> Result<()>
where
    I: IntoIterator<Item = (&'static str, f64)>,
{
    for (name, value) in values {
        ensure!(value.is_finite(), "{name} must be a finite number");
    }

    Ok(())
}

/// Read a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The static model data ([`Model`]) or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;

    let regions = read_regions(model_dir, &parameters)?;
    let mut carriers = read_energy_carriers(model_dir, &regions)?;
    let mut catalogs = read_process_catalog(model_dir, &carriers, &parameters)?;
    let sites = read_sites(model_dir, &regions)?;
    let mut units = read_production_units(model_dir, &sites, &catalogs, &parameters)?;

    let mut region_map = RegionMap::new();
    for (region_id, region) in regions {
        let ProcessCatalog { products, .. } = catalogs
            .shift_remove(&region_id)
            .context("Missing processes for region")?;
        let mut region = Region {
            id: region_id.clone(),
            description: region.description,
            co2_price: region.co2_price,
            carriers: carriers
                .shift_remove(&region_id)
                .context("Missing energy carriers for region")?,
            products,
            sites: SiteMap::new(),
        };

        for site in sites.values().filter(|site| site.region_id == region_id) {
            let site_units = units.shift_remove(&site.id).unwrap_or_default();
            if site_units.is_empty() {
                warn!("Site {} has no production units and will be ignored", site.id);
                continue;
            }

            region.sites.insert(
                site.id.clone(),
                Site {
                    id: site.id.clone(),
                    region_id: region_id.clone(),
                    location: site.location,
                    units: site_units,
                },
            );
        }

        region_map.insert(region_id, region);
    }

    let pipelines = read_pipelines(model_dir)?.map(|pipelines| {
        let sites = region_map
            .values()
            .flat_map(|region| region.sites.values())
            .map(|site| (&site.id, site.location));
        PipelineNetwork::new(pipelines, sites, parameters.pipeline_cost_per_km)
    });

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        regions: region_map,
        pipelines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use serde::Deserialize;
    use serde::de::IntoDeserializer;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    /// Create an example CSV file in dir_path
    fn create_csv_file(dir_path: &Path, contents: &str) -> std::path::PathBuf {
        let file_path = dir_path.join("test.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{contents}").unwrap();
        file_path
    }

    /// Test a normal read
    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value\nhello,1\n world , 2\n");
        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".to_string(),
                    value: 1,
                },
                Record {
                    id: "world".to_string(),
                    value: 2,
                }
            ]
        );

        // File with no data (only column headers)
        let file_path = create_csv_file(dir.path(), "id,value\n");
        assert!(read_csv::<Record>(&file_path).is_err());
        assert!(
            read_csv_optional::<Record>(&file_path)
                .unwrap()
                .next()
                .is_none()
        );

        // Missing file
        let file_path = dir.path().join("a_missing_file.csv");
        assert!(!file_path.exists());
        assert!(read_csv::<Record>(&file_path).is_err());
        assert!(
            read_csv_optional::<Record>(&file_path)
                .unwrap()
                .next()
                .is_none()
        );
    }

    #[test]
    fn test_read_toml() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Value {
            value: u32,
        }

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        fs::write(&file_path, "value = 1").unwrap();
        assert_eq!(read_toml::<Value>(&file_path).unwrap(), Value { value: 1 });

        fs::write(&file_path, "bad toml syntax").unwrap();
        assert!(read_toml::<Value>(&file_path).is_err());
    }

    /// Deserialise value with deserialise_proportion()
    fn deserialise_f64(value: f64) -> Result<f64, serde::de::value::Error> {
        let deserialiser: serde::de::value::F64Deserializer<serde::de::value::Error> =
            value.into_deserializer();
        deserialise_proportion(deserialiser)
    }

    #[test]
    fn test_deserialise_proportion() {
        // Valid inputs
        assert_eq!(deserialise_f64(0.0), Ok(0.0));
        assert_eq!(deserialise_f64(0.5), Ok(0.5));
        assert_eq!(deserialise_f64(1.0), Ok(1.0));

        // Invalid inputs
        assert!(deserialise_f64(-1.0).is_err());
        assert!(deserialise_f64(2.0).is_err());
        assert!(deserialise_f64(f64::NAN).is_err());
        assert!(deserialise_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn test_check_values_finite() {
        assert!(check_values_finite([("capex", 1.0), ("opex", 0.0)]).is_ok());
        assert_error!(
            check_values_finite([("capex", 1.0), ("opex", f64::NAN)]),
            "opex must be a finite number"
        );
    }
}
