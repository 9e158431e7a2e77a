//! Common functionality for techdiff.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod demand;
pub mod energy_carrier;
pub mod finance;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod product;
pub mod production_unit;
pub mod region;
pub mod settings;
pub mod simulation;
pub mod site;
pub mod units;
pub mod visitor;
pub mod year;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// On Linux, this will be `~/.config/techdiff`.
pub fn get_techdiff_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        // No config dir on this platform, so fall back to the working directory
        return PathBuf::from(".");
    };
    config_dir.push("techdiff");
    config_dir
}
