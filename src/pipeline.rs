//! Hydrogen pipelines and their distance to industrial sites.
//!
//! Pipelines start out carrying blended gas and are converted to carry pure hydrogen from their
//! commissioning year onwards. A site's distance to the nearest hydrogen pipeline determines the
//! surcharge applied to hydrogen-using processes at that site.
use crate::id::{define_id_getter, define_id_type};
use crate::site::SiteID;
use crate::units::{Distance, Money, MoneyPerDistance};
use geo::{Closest, ClosestPoint, MultiLineString, Point};
use indexmap::IndexMap;
use log::info;

define_id_type! {PipelineID}

/// Mean diameter of the Earth in km
const EARTH_DIAMETER: f64 = 12742.0;

/// Surcharge applied when there is no hydrogen pipeline at all
pub const UNREACHABLE_PIPELINE_COST_SCALING: Money = Money(1e14);

/// What a pipeline is carrying
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PipelineMode {
    /// Natural gas, possibly with some hydrogen blended in
    Blended,
    /// Pure hydrogen
    Hydrogen,
}

/// A pipeline, made up of one or more line strings
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    /// Unique identifier for the pipeline
    pub id: PipelineID,
    /// Route of the pipeline in longitude/latitude
    pub geometry: MultiLineString<f64>,
    /// The year from which the pipeline carries hydrogen
    pub commissioning_year: u32,
    /// What the pipeline is currently carrying
    pub mode: PipelineMode,
}
define_id_getter! {Pipeline, PipelineID}

/// The distance between the site and a pipeline along with the pipeline's current mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SitePipelineRelation {
    /// Distance from the site to the closest point on the pipeline
    pub distance: Distance,
    /// Mode of the pipeline in the current year
    pub mode: PipelineMode,
}

/// Great-circle distance between two points given as longitude/latitude in degrees
pub fn haversine(from: Point<f64>, to: Point<f64>) -> Distance {
    let lat1 = from.y().to_radians();
    let lat2 = to.y().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (to.x() - from.x()).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    Distance(EARTH_DIAMETER * a.sqrt().asin())
}

impl Pipeline {
    /// Create a new pipeline, which starts out carrying blended gas
    pub fn new(id: PipelineID, geometry: MultiLineString<f64>, commissioning_year: u32) -> Self {
        Self {
            id,
            geometry,
            commissioning_year,
            mode: PipelineMode::Blended,
        }
    }

    /// Convert the pipeline to hydrogen if it has been commissioned.
    ///
    /// Once converted, a pipeline never reverts.
    pub fn update(&mut self, year: u32) {
        if self.mode == PipelineMode::Blended && year >= self.commissioning_year {
            info!("Pipeline {} converted to hydrogen in {year}", self.id);
            self.mode = PipelineMode::Hydrogen;
        }
    }

    /// Distance from `point` to the closest point on any of the pipeline's line strings.
    ///
    /// The closest point is found in the (planar) longitude/latitude space, then the distance to
    /// it is measured along the Earth's surface. Returns `None` for an empty geometry.
    pub fn distance_to(&self, point: Point<f64>) -> Option<Distance> {
        self.geometry
            .iter()
            .filter_map(|line| match line.closest_point(&point) {
                Closest::Intersection(closest) | Closest::SinglePoint(closest) => {
                    Some(haversine(point, closest))
                }
                Closest::Indeterminate => None,
            })
            .min_by(|d1, d2| d1.0.total_cmp(&d2.0))
    }
}

/// All pipelines along with their relation to each site
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineNetwork {
    /// The pipelines, keyed by ID
    pub pipelines: IndexMap<PipelineID, Pipeline>,
    /// Each site's relation to every pipeline, keyed by site then pipeline
    relations: IndexMap<SiteID, IndexMap<PipelineID, SitePipelineRelation>>,
    cost_per_km: MoneyPerDistance,
}

impl PipelineNetwork {
    /// Create the network, measuring the distance from every site to every pipeline.
    ///
    /// # Arguments
    ///
    /// * `pipelines` - The pipelines
    /// * `sites` - The ID and location of every site
    /// * `cost_per_km` - Cost of connecting a site to a pipeline per km
    pub fn new<'a, I>(pipelines: Vec<Pipeline>, sites: I, cost_per_km: MoneyPerDistance) -> Self
    where
        I: IntoIterator<Item = (&'a SiteID, Point<f64>)>,
    {
        let relations = sites
            .into_iter()
            .map(|(site_id, location)| {
                let site_relations = pipelines
                    .iter()
                    .filter_map(|pipeline| {
                        let relation = SitePipelineRelation {
                            distance: pipeline.distance_to(location)?,
                            mode: pipeline.mode,
                        };
                        Some((pipeline.id.clone(), relation))
                    })
                    .collect::<IndexMap<_, _>>();
                (site_id.clone(), site_relations)
            })
            .collect();

        Self {
            pipelines: pipelines
                .into_iter()
                .map(|pipeline| (pipeline.id.clone(), pipeline))
                .collect(),
            relations,
            cost_per_km,
        }
    }

    /// Update the mode of every pipeline and copy it to the site relations
    pub fn update(&mut self, year: u32) {
        for pipeline in self.pipelines.values_mut() {
            pipeline.update(year);
        }

        for site_relations in self.relations.values_mut() {
            for (pipeline_id, relation) in site_relations {
                relation.mode = self.pipelines[pipeline_id].mode;
            }
        }
    }

    /// Iterate over the site's relations to each pipeline
    pub fn iter_relations(
        &self,
        site_id: &SiteID,
    ) -> impl Iterator<Item = (&PipelineID, &SitePipelineRelation)> {
        self.relations.get(site_id).into_iter().flatten()
    }

    /// Distance from the site to the closest pipeline carrying hydrogen, if there is one
    pub fn distance_to_closest_hydrogen_pipeline(&self, site_id: &SiteID) -> Option<Distance> {
        self.iter_relations(site_id)
            .filter(|(_, relation)| relation.mode == PipelineMode::Hydrogen)
            .map(|(_, relation)| relation.distance)
            .min_by(|d1, d2| d1.0.total_cmp(&d2.0))
    }

    /// The surcharge on hydrogen-using processes for a site at the given distance
    pub fn pipeline_cost_scaling(&self, distance: Option<Distance>) -> Money {
        match distance {
            Some(distance) => distance * self.cost_per_km,
            None => UNREACHABLE_PIPELINE_COST_SCALING,
        }
    }
}
