//! The protocol by which results are collected from the simulation.
//!
//! After each simulated year, every visitor is walked depth-first through the entity tree: each
//! region, then each of its sites, then each production unit at the site. For units which run a
//! single process, the unit's product and process are visited next; for composite units, the
//! children are visited in order. Visitors only observe the entities.
use crate::pipeline::PipelineNetwork;
use crate::production_unit::{LeafState, ProductionUnit, UnitState};
use crate::region::Region;
use crate::site::Site;
use anyhow::Result;

/// Collects results from the simulation.
///
/// All methods do nothing by default, so implementors only need to override the ones they use.
#[allow(unused_variables)]
pub trait ResultVisitor {
    /// Called once per region per year
    fn visit_region(&mut self, year: u32, region: &Region) -> Result<()> {
        Ok(())
    }

    /// Called once per site per year
    fn visit_site(&mut self, year: u32, region: &Region, site: &Site) -> Result<()> {
        Ok(())
    }

    /// Called for every production unit, including composite units and their children
    fn visit_production_unit(
        &mut self,
        year: u32,
        region: &Region,
        site: &Site,
        unit: &ProductionUnit,
    ) -> Result<()> {
        Ok(())
    }

    /// Called with the product made by a unit which runs a single process
    fn visit_product(&mut self, year: u32, region: &Region, leaf: &LeafState) -> Result<()> {
        Ok(())
    }

    /// Called with the process used by a unit which runs a single process
    fn visit_process(
        &mut self,
        year: u32,
        region: &Region,
        site: &Site,
        unit: &ProductionUnit,
        leaf: &LeafState,
    ) -> Result<()> {
        Ok(())
    }

    /// Called once per year after the entity tree has been visited
    fn visit_pipelines(&mut self, year: u32, network: &PipelineNetwork) -> Result<()> {
        Ok(())
    }

    /// Called once after the final year
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Walk the visitor through the region and everything in it
pub fn visit_region(visitor: &mut dyn ResultVisitor, year: u32, region: &Region) -> Result<()> {
    visitor.visit_region(year, region)?;
    for site in region.sites.values() {
        visit_site(visitor, year, region, site)?;
    }

    Ok(())
}

/// Walk the visitor through the site and its production units
pub fn visit_site(
    visitor: &mut dyn ResultVisitor,
    year: u32,
    region: &Region,
    site: &Site,
) -> Result<()> {
    visitor.visit_site(year, region, site)?;
    for unit in &site.units {
        visit_production_unit(visitor, year, region, site, unit)?;
    }

    Ok(())
}

/// Walk the visitor through the production unit and its children
pub fn visit_production_unit(
    visitor: &mut dyn ResultVisitor,
    year: u32,
    region: &Region,
    site: &Site,
    unit: &ProductionUnit,
) -> Result<()> {
    visitor.visit_production_unit(year, region, site, unit)?;
    match &unit.state {
        UnitState::Leaf(leaf) => {
            visitor.visit_product(year, region, leaf)?;
            visitor.visit_process(year, region, site, unit, leaf)?;
        }
        UnitState::Composite(children) => {
            for child in children {
                visit_production_unit(visitor, year, region, site, child)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{process_a, product, region};
    use crate::process::Process;
    use crate::product::Product;
    use crate::units::Tons;
    use anyhow::bail;
    use rstest::rstest;
    use std::rc::Rc;

    /// Records the order in which entities are visited
    #[derive(Default)]
    struct RecordingVisitor {
        visited: Vec<String>,
    }

    impl ResultVisitor for RecordingVisitor {
        fn visit_region(&mut self, year: u32, region: &Region) -> Result<()> {
            self.visited.push(format!("region {} {year}", region.id));
            Ok(())
        }

        fn visit_site(&mut self, _year: u32, _region: &Region, site: &Site) -> Result<()> {
            self.visited.push(format!("site {}", site.id));
            Ok(())
        }

        fn visit_production_unit(
            &mut self,
            _year: u32,
            _region: &Region,
            _site: &Site,
            unit: &ProductionUnit,
        ) -> Result<()> {
            self.visited.push(format!("unit {}", unit.id));
            Ok(())
        }

        fn visit_product(&mut self, _year: u32, _region: &Region, leaf: &LeafState) -> Result<()> {
            self.visited.push(format!("product {}", leaf.product.id));
            Ok(())
        }

        fn visit_process(
            &mut self,
            _year: u32,
            _region: &Region,
            _site: &Site,
            _unit: &ProductionUnit,
            leaf: &LeafState,
        ) -> Result<()> {
            self.visited.push(format!("process {}", leaf.process.id));
            Ok(())
        }
    }

    #[rstest]
    fn test_visit_order(mut region: Region, product: Product, process_a: Rc<Process>) {
        // Add a composite unit with two children to the site
        let product = Rc::new(product);
        let child = |id: &str| {
            ProductionUnit::new_leaf(
                id.into(),
                LeafState::new(
                    Rc::clone(&product),
                    Rc::clone(&process_a),
                    Tons(1.0),
                    None,
                ),
            )
        };
        let composite =
            ProductionUnit::new_composite("parent".into(), vec![child("c1"), child("c2")]);
        region.sites[0].units.push(composite);

        let mut visitor = RecordingVisitor::default();
        visit_region(&mut visitor, 2030, &region).unwrap();
        assert_eq!(
            visitor.visited,
            [
                "region DE 2030",
                "site site1",
                "unit unit1",
                "product steel",
                "process A",
                "unit parent",
                "unit c1",
                "product steel",
                "process A",
                "unit c2",
                "product steel",
                "process A",
            ]
        );
    }

    #[rstest]
    fn test_errors_abort_traversal(region: Region) {
        struct FailingVisitor;
        impl ResultVisitor for FailingVisitor {
            fn visit_site(&mut self, _year: u32, _region: &Region, _site: &Site) -> Result<()> {
                bail!("Disk full")
            }
        }

        let result = visit_region(&mut FailingVisitor, 2030, &region);
        assert_eq!(result.unwrap_err().to_string(), "Disk full");
    }
}
