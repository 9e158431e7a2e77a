//! Code for working with years and for quantities which change from year to year.
//!
//! Input data gives most quantities at a handful of anchor years (2015, 2030 and 2050), from which
//! values for the simulated years are derived by one of the interpolation schemes in
//! [`Trajectory`]. Note that the linear schemes are anchored at [`BASE_YEAR`] rather than 2015,
//! i.e. the 2015 value is treated as the value in the base year.
use crate::units::UnitType;
use anyhow::{Result, ensure};

/// The year from which interpolation starts
pub const BASE_YEAR: u32 = 2022;

/// The year at which kinked and exponential trajectories change regime
pub const KINK_YEAR: u32 = 2030;

/// The final anchor year
pub const END_YEAR: u32 = 2050;

/// Years elapsed since `from`, which is negative for earlier years
fn years_since(year: u32, from: u32) -> f64 {
    f64::from(year) - f64::from(from)
}

/// Straight line through the base year and 2050 values
pub fn interpolate(year: u32, value_2015: f64, value_2050: f64) -> f64 {
    let slope = (value_2050 - value_2015) / years_since(END_YEAR, BASE_YEAR);
    value_2015 + slope * years_since(year, BASE_YEAR)
}

/// Two straight segments joined at 2030
pub fn interpolate_with_kink(year: u32, value_2015: f64, value_2030: f64, value_2050: f64) -> f64 {
    if year <= KINK_YEAR {
        let slope = (value_2030 - value_2015) / years_since(KINK_YEAR, BASE_YEAR);
        value_2015 + slope * years_since(year, BASE_YEAR)
    } else {
        linear_after_kink(year, value_2030, value_2050)
    }
}

/// Geometric decay towards the 2030 value, then a straight line to the 2050 value.
///
/// The decay factor is undefined when `value_2015` is zero or when the two early values have
/// different signs, so input validation must rule these cases out.
pub fn exponential_decrease(year: u32, value_2015: f64, value_2030: f64, value_2050: f64) -> f64 {
    if year <= KINK_YEAR {
        let ratio = value_2030 / value_2015;
        let exponent = years_since(year, BASE_YEAR) / years_since(KINK_YEAR, BASE_YEAR);
        value_2015 * ratio.powf(exponent)
    } else {
        linear_after_kink(year, value_2030, value_2050)
    }
}

fn linear_after_kink(year: u32, value_2030: f64, value_2050: f64) -> f64 {
    let slope = (value_2050 - value_2030) / years_since(END_YEAR, KINK_YEAR);
    value_2030 + slope * years_since(year, KINK_YEAR)
}

/// A quantity defined at anchor years, evaluated for any year by interpolation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trajectory<T: UnitType> {
    /// See [`interpolate`]
    Linear {
        /// Value at the base year
        value_2015: T,
        /// Value in 2050
        value_2050: T,
    },
    /// See [`interpolate_with_kink`]
    Kinked {
        /// Value at the base year
        value_2015: T,
        /// Value in 2030
        value_2030: T,
        /// Value in 2050
        value_2050: T,
    },
    /// See [`exponential_decrease`]
    ExponentialDecrease {
        /// Value at the base year
        value_2015: T,
        /// Value in 2030
        value_2030: T,
        /// Value in 2050
        value_2050: T,
    },
}

impl<T: UnitType> Trajectory<T> {
    /// A straight-line trajectory
    pub fn linear(value_2015: T, value_2050: T) -> Self {
        Self::Linear {
            value_2015,
            value_2050,
        }
    }

    /// A trajectory which does not change over time
    pub fn constant(value: T) -> Self {
        Self::linear(value, value)
    }

    /// Evaluate the trajectory for the given year
    pub fn value_at(&self, year: u32) -> T {
        let value = match *self {
            Self::Linear {
                value_2015,
                value_2050,
            } => interpolate(year, value_2015.value(), value_2050.value()),
            Self::Kinked {
                value_2015,
                value_2030,
                value_2050,
            } => interpolate_with_kink(
                year,
                value_2015.value(),
                value_2030.value(),
                value_2050.value(),
            ),
            Self::ExponentialDecrease {
                value_2015,
                value_2030,
                value_2050,
            } => exponential_decrease(
                year,
                value_2015.value(),
                value_2030.value(),
                value_2050.value(),
            ),
        };

        T::new(value)
    }
}

/// Create the sequence of simulated years.
///
/// # Arguments
///
/// * `start_year` - First simulated year
/// * `end_year` - Last simulated year (inclusive)
/// * `increment` - Number of years between consecutive steps
///
/// # Returns
///
/// The years in ascending order, or an error if the span would be empty.
pub fn year_span(start_year: u32, end_year: u32, increment: u32) -> Result<Vec<u32>> {
    ensure!(increment > 0, "Year increment must be greater than zero");
    ensure!(
        start_year <= end_year,
        "The start year ({start_year}) must not be after the end year ({end_year})"
    );

    Ok((start_year..=end_year).step_by(increment as usize).collect())
}
