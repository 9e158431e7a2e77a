//! Code for reading site locations from a CSV file.
use super::region::RegionDefinition;
use super::{input_err_msg, read_csv};
use crate::id::IDCollection;
use crate::region::RegionID;
use crate::site::SiteID;
use anyhow::{Context, Result, ensure};
use geo::Point;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const SITES_FILE_NAME: &str = "sites.csv";

/// The location of a site, before its production units are known
#[derive(Debug, Clone, PartialEq)]
pub struct SiteDefinition {
    /// Unique identifier for the site
    pub id: SiteID,
    /// The region in which the site is located
    pub region_id: RegionID,
    /// Longitude and latitude in degrees
    pub location: Point<f64>,
}

#[derive(Debug, PartialEq, Deserialize)]
struct SiteRaw {
    id: SiteID,
    region_id: String,
    longitude: f64,
    latitude: f64,
}

/// Read sites from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `regions` - All regions in the model
///
/// # Returns
///
/// A map of sites keyed by ID or an error
pub fn read_sites(
    model_dir: &Path,
    regions: &IndexMap<RegionID, RegionDefinition>,
) -> Result<IndexMap<SiteID, SiteDefinition>> {
    let file_path = model_dir.join(SITES_FILE_NAME);
    let sites_csv = read_csv(&file_path)?;
    read_sites_from_iter(sites_csv, regions).with_context(|| input_err_msg(&file_path))
}

fn read_sites_from_iter<I>(
    iter: I,
    regions: &IndexMap<RegionID, RegionDefinition>,
) -> Result<IndexMap<SiteID, SiteDefinition>>
where
    I: Iterator<Item = SiteRaw>,
{
    let mut sites = IndexMap::new();
    for site in iter {
        let region_id = regions.get_id_by_str(&site.region_id)?;
        ensure!(
            (-180.0..=180.0).contains(&site.longitude) && (-90.0..=90.0).contains(&site.latitude),
            "Invalid location for site {}: longitude must be between -180 and 180 and latitude \
            between -90 and 90",
            site.id
        );

        let definition = SiteDefinition {
            id: site.id.clone(),
            region_id,
            location: Point::new(site.longitude, site.latitude),
        };
        ensure!(
            sites.insert(site.id.clone(), definition).is_none(),
            "Duplicate site ID found: {}",
            site.id
        );
    }

    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use crate::units::MoneyPerEmissions;
    use crate::year::Trajectory;
    use rstest::rstest;

    fn regions() -> IndexMap<RegionID, RegionDefinition> {
        IndexMap::from([(
            "DE".into(),
            RegionDefinition {
                description: "Germany".into(),
                co2_price: Trajectory::constant(MoneyPerEmissions(100.0)),
            },
        )])
    }

    fn site(id: &str, region_id: &str, longitude: f64, latitude: f64) -> SiteRaw {
        SiteRaw {
            id: id.into(),
            region_id: region_id.into(),
            longitude,
            latitude,
        }
    }

    #[test]
    fn test_read_sites_from_iter() {
        let sites = read_sites_from_iter(
            [site("a", "DE", 8.0, 50.0), site("b", "DE", 13.4, 52.5)].into_iter(),
            &regions(),
        )
        .unwrap();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites["b"].location, Point::new(13.4, 52.5));
        assert_eq!(sites["a"].region_id, RegionID::new("DE"));
    }

    #[test]
    fn test_read_sites_unknown_region() {
        assert_error!(
            read_sites_from_iter([site("a", "FR", 8.0, 50.0)].into_iter(), &regions()),
            "Unknown ID FR found"
        );
    }

    #[test]
    fn test_read_sites_duplicate() {
        assert_error!(
            read_sites_from_iter(
                [site("a", "DE", 8.0, 50.0), site("a", "DE", 9.0, 50.0)].into_iter(),
                &regions()
            ),
            "Duplicate site ID found: a"
        );
    }

    #[rstest]
    #[case(181.0, 50.0)]
    #[case(8.0, -91.0)]
    #[case(f64::NAN, 50.0)]
    fn test_read_sites_invalid_location(#[case] longitude: f64, #[case] latitude: f64) {
        assert!(
            read_sites_from_iter([site("a", "DE", longitude, latitude)].into_iter(), &regions())
                .is_err()
        );
    }
}
