//! Code for reading production units from a CSV file.
use super::process::ProcessCatalog;
use super::site::SiteDefinition;
use super::{input_err_msg, read_csv};
use crate::id::IDCollection;
use crate::model::ModelParameters;
use crate::process::ProcessID;
use crate::product::ProductID;
use crate::production_unit::{LeafState, ProductionUnit, ProductionUnitID};
use crate::region::RegionID;
use crate::site::SiteID;
use crate::units::{Tons, UnitType};
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;

const PRODUCTION_UNITS_FILE_NAME: &str = "production_units.csv";

#[derive(Debug, PartialEq, Deserialize)]
struct ProductionUnitRaw {
    id: ProductionUnitID,
    site_id: String,
    product_id: ProductID,
    process_id: ProcessID,
    production: Tons,
    year_of_last_reinvestment: Option<u32>,
    /// Units sharing a parent are grouped into a composite unit with that ID
    parent_id: Option<ProductionUnitID>,
}

/// The production units at each site, in input order
pub type SiteUnitsMap = IndexMap<SiteID, Vec<ProductionUnit>>;

/// Read production units from the model directory.
///
/// Units making products which are excluded by the model's product filter are skipped.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `sites` - All sites in the model
/// * `catalogs` - The products and processes of each region
/// * `parameters` - Model parameters
///
/// # Returns
///
/// The production units at each site which has any, or an error.
pub fn read_production_units(
    model_dir: &Path,
    sites: &IndexMap<SiteID, SiteDefinition>,
    catalogs: &IndexMap<RegionID, ProcessCatalog>,
    parameters: &ModelParameters,
) -> Result<SiteUnitsMap> {
    let file_path = model_dir.join(PRODUCTION_UNITS_FILE_NAME);
    let units_csv = read_csv(&file_path)?;
    read_production_units_from_iter(
        units_csv,
        sites,
        catalogs,
        parameters.product_filter.as_deref(),
    )
    .with_context(|| input_err_msg(&file_path))
}

fn read_production_units_from_iter<I>(
    iter: I,
    sites: &IndexMap<SiteID, SiteDefinition>,
    catalogs: &IndexMap<RegionID, ProcessCatalog>,
    product_filter: Option<&[ProductID]>,
) -> Result<SiteUnitsMap>
where
    I: Iterator<Item = ProductionUnitRaw>,
{
    let mut unit_ids = HashSet::new();
    let mut parent_sites = HashMap::new();
    let mut units = SiteUnitsMap::new();
    for raw in iter {
        ensure!(
            unit_ids.insert(raw.id.clone()),
            "Duplicate production unit ID found: {}",
            raw.id
        );
        if product_filter.is_some_and(|filter| !filter.contains(&raw.product_id)) {
            continue;
        }

        let site_id = sites.get_id_by_str(&raw.site_id)?;
        let region_id = &sites[&site_id].region_id;
        let catalog = catalogs
            .get(region_id)
            .with_context(|| format!("No processes defined for region {region_id}"))?;
        let unit = create_unit(&raw, catalog)
            .with_context(|| format!("Invalid production unit {}", raw.id))?;

        if let Some(parent_id) = &raw.parent_id {
            // Composite IDs share a namespace with the units they are made of
            match parent_sites.get(parent_id) {
                None => {
                    ensure!(
                        unit_ids.insert(parent_id.clone()),
                        "Duplicate production unit ID found: {parent_id}"
                    );
                    parent_sites.insert(parent_id.clone(), site_id.clone());
                }
                Some(parent_site_id) => ensure!(
                    *parent_site_id == site_id,
                    "Composite unit {parent_id} has children at more than one site"
                ),
            }
        }

        let site_units = units.entry(site_id).or_default();
        match raw.parent_id {
            None => site_units.push(unit),
            Some(parent_id) => add_to_composite(site_units, parent_id, unit)?,
        }
    }

    Ok(units)
}

/// Create a unit which runs a single process
fn create_unit(raw: &ProductionUnitRaw, catalog: &ProcessCatalog) -> Result<ProductionUnit> {
    ensure!(
        raw.production.is_finite() && raw.production >= Tons(0.0),
        "Production must be a finite number greater than or equal to zero"
    );

    let product = catalog
        .products
        .get(&raw.product_id)
        .with_context(|| format!("Unknown product {}", raw.product_id))?;
    let process = catalog
        .processes
        .get(&(raw.product_id.clone(), raw.process_id.clone()))
        .with_context(|| {
            format!(
                "Process {} cannot make product {}",
                raw.process_id, raw.product_id
            )
        })?;

    let state = LeafState::new(
        Rc::clone(product),
        Rc::clone(process),
        raw.production,
        raw.year_of_last_reinvestment,
    );

    Ok(ProductionUnit::new_leaf(raw.id.clone(), state))
}

/// Add a unit to the composite with the given ID, creating the composite if needed
fn add_to_composite(
    site_units: &mut Vec<ProductionUnit>,
    parent_id: ProductionUnitID,
    unit: ProductionUnit,
) -> Result<()> {
    if let Some(parent) = site_units.iter_mut().find(|parent| parent.id == parent_id) {
        let Some(children) = parent.children_mut() else {
            bail!("Parent unit {parent_id} is not a composite unit");
        };
        children.push(unit);
    } else {
        site_units.push(ProductionUnit::new_composite(parent_id, vec![unit]));
    }

    Ok(())
}
