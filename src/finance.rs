//! General functions related to finance.
use crate::units::{Dimensionless, MoneyPerTon};

/// Calculates the annuity factor for a given interest rate and depreciation period.
///
/// This is the share of an up-front investment which must be paid back each year so that the
/// investment, plus interest, is repaid by the end of the depreciation period.
///
/// # Arguments
///
/// * `interest_rate` - Annual interest rate
/// * `depreciation_period` - Number of years over which the investment is repaid
pub fn annuity_factor(interest_rate: Dimensionless, depreciation_period: u32) -> Dimensionless {
    if depreciation_period == 0 {
        return Dimensionless(0.0);
    }

    // Limit of the formula below as the interest rate tends to zero
    if interest_rate == Dimensionless(0.0) {
        return Dimensionless(1.0) / Dimensionless(depreciation_period as f64);
    }

    let factor = (Dimensionless(1.0) + interest_rate).powi(depreciation_period as i32);
    (factor * interest_rate) / (factor - Dimensionless(1.0))
}

/// Calculates the annual repayment per ton of capacity for an investment
pub fn annuity_per_ton(
    net_investment: MoneyPerTon,
    interest_rate: Dimensionless,
    depreciation_period: u32,
) -> MoneyPerTon {
    net_investment * annuity_factor(interest_rate, depreciation_period)
}
