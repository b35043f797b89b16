// Salary estimates for seasons the contract ledger does not cover.

use crate::params::ForecastParams;

/// Base open-market salary per squared rating point.
const MARKET_SALARY_PER_RATING_SQ: f64 = 1_200_000.0;

/// Open-market value for a player of this rating, never below the league
/// minimum.
pub fn market_value(rating: f64, params: &ForecastParams) -> u64 {
    let r = rating.max(0.0);
    let value = (MARKET_SALARY_PER_RATING_SQ * r * r).round() as u64;
    value.max(params.minimum_salary)
}

/// Share of market value paid in a given arbitration year.
fn arbitration_share(service_year: u32) -> f64 {
    match service_year {
        0..=2 => 0.0,
        3 => 0.25,
        4 => 0.40,
        5 => 0.60,
        _ => 1.0,
    }
}

/// Estimated salary for a player in their `service_year`-th season of
/// service: league minimum before arbitration, a growing share of market
/// value through arbitration, full market value after.
pub fn estimate_salary(service_year: u32, rating: f64, params: &ForecastParams) -> u64 {
    let share = arbitration_share(service_year);
    if share == 0.0 {
        return params.minimum_salary;
    }
    let value = (market_value(rating, params) as f64 * share).round() as u64;
    value.max(params.minimum_salary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_value_scales_with_rating_squared() {
        let params = ForecastParams::default();
        assert_eq!(market_value(3.0, &params), 10_800_000);
        assert_eq!(market_value(4.0, &params), 19_200_000);
    }

    #[test]
    fn market_value_floored_at_minimum() {
        let params = ForecastParams::default();
        assert_eq!(market_value(0.5, &params), 740_000);
        assert_eq!(market_value(-1.0, &params), 740_000);
    }

    #[test]
    fn pre_arbitration_pays_minimum() {
        let params = ForecastParams::default();
        for year in 0..3 {
            assert_eq!(estimate_salary(year, 4.5, &params), 740_000);
        }
    }

    #[test]
    fn arbitration_tiers() {
        let params = ForecastParams::default();
        assert_eq!(estimate_salary(3, 4.0, &params), 4_800_000);
        assert_eq!(estimate_salary(4, 4.0, &params), 7_680_000);
        assert_eq!(estimate_salary(5, 4.0, &params), 11_520_000);
        assert_eq!(estimate_salary(6, 4.0, &params), 19_200_000);
        assert_eq!(estimate_salary(9, 4.0, &params), 19_200_000);
    }

    #[test]
    fn arbitration_never_below_minimum() {
        let params = ForecastParams::default();
        assert_eq!(estimate_salary(3, 1.0, &params), 740_000);
    }
}
