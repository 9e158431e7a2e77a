//! Quantities used throughout the model and the arithmetic permitted between them.
//!
//! Every quantity is a thin wrapper around an `f64`. Multiplying or dividing two quantities is only
//! possible where a rule below says what the result is, which catches unit mistakes (e.g. adding a
//! per-ton cost to a total cost) at compile time.
use float_cmp::{ApproxEq, F64Margin};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

/// Behaviour shared by all quantities
pub trait UnitType:
    fmt::Debug
    + Copy
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Dimensionless, Output = Self>
    + Div<Dimensionless, Output = Self>
    + Sum
{
    /// Create from a raw `f64`
    fn new(value: f64) -> Self;

    /// The underlying `f64`
    fn value(&self) -> f64;

    /// Whether the underlying value is neither infinite nor NaN
    fn is_finite(&self) -> bool {
        self.value().is_finite()
    }
}

/// Represents a dimensionless quantity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Default,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Display,
)]
pub struct Dimensionless(pub f64);

impl Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl Dimensionless {
    /// Raise to an integer power
    pub fn powi(self, rhs: i32) -> Self {
        Dimensionless(self.0.powi(rhs))
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

impl Sum for Dimensionless {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Dimensionless(iter.map(|x| x.0).sum())
    }
}

impl UnitType for Dimensionless {
    fn new(value: f64) -> Self {
        Self(value)
    }

    fn value(&self) -> f64 {
        self.0
    }
}

impl ApproxEq for Dimensionless {
    type Margin = F64Margin;

    fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
        self.0.approx_eq(other.0, margin)
    }
}

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::Display,
        )]
        pub struct $name(pub f64);

        impl UnitType for $name {
            fn new(value: f64) -> Self {
                Self(value)
            }

            fn value(&self) -> f64 {
                self.0
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                $name(iter.map(|x| x.0).sum())
            }
        }

        impl ApproxEq for $name {
            type Margin = F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                self.0.approx_eq(other.0, margin)
            }
        }

        impl Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl Div for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 / rhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Money);
unit_struct!(Tons);
unit_struct!(Energy);
unit_struct!(Emissions);
unit_struct!(Distance);

// Derived quantities
unit_struct!(MoneyPerTon);
unit_struct!(MoneyPerEnergy);
unit_struct!(MoneyPerEmissions);
unit_struct!(MoneyPerDistance);
unit_struct!(EnergyPerTon);
unit_struct!(EmissionsPerEnergy);
unit_struct!(EmissionsPerTon);

// Multiplication rules
impl_mul!(EnergyPerTon, MoneyPerEnergy, MoneyPerTon);
impl_mul!(EnergyPerTon, EmissionsPerEnergy, EmissionsPerTon);
impl_mul!(EmissionsPerTon, MoneyPerEmissions, MoneyPerTon);
impl_mul!(Tons, MoneyPerTon, Money);
impl_mul!(Tons, EnergyPerTon, Energy);
impl_mul!(Tons, EmissionsPerTon, Emissions);
impl_mul!(Emissions, MoneyPerEmissions, Money);
impl_mul!(Distance, MoneyPerDistance, Money);

// Division rules
impl_div!(Money, Tons, MoneyPerTon);
impl_div!(Emissions, Tons, EmissionsPerTon);
impl_div!(Energy, Tons, EnergyPerTon);

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_cost_of_energy_demand() {
        let demand = EnergyPerTon(2.0);
        let price = MoneyPerEnergy(15.0);
        assert_eq!(demand * price, MoneyPerTon(30.0));
        assert_eq!(price * demand, MoneyPerTon(30.0));
    }

    #[test]
    fn test_total_cost_from_per_ton() {
        let total = Tons(1000.0) * MoneyPerTon(2.5);
        assert_eq!(total, Money(2500.0));
        assert_eq!(total / Tons(1000.0), MoneyPerTon(2.5));
    }

    #[test]
    fn test_same_unit_ratio_is_dimensionless() {
        assert_eq!(Money(3.0) / Money(4.0), Dimensionless(0.75));
    }

    #[test]
    fn test_sum() {
        let total: Emissions = [Emissions(1.0), Emissions(2.0), Emissions(0.5)]
            .into_iter()
            .sum();
        assert_approx_eq!(Emissions, total, Emissions(3.5));
    }

    #[test]
    fn test_add_assign() {
        let mut cost = MoneyPerTon(1.0);
        cost += MoneyPerTon(2.0);
        cost -= MoneyPerTon(0.5);
        assert_eq!(cost, MoneyPerTon(2.5));
    }

    #[test]
    fn test_is_finite() {
        assert!(Money(1.0).is_finite());
        assert!(!Money(f64::NAN).is_finite());
        assert!(!Distance(f64::INFINITY).is_finite());
    }
}
