// Roster forecasting engine: depth-chart grid, prospect assignment,
// indicators, payroll, position findings, and manual overrides.

pub mod assessment;
pub mod assign;
pub mod eta;
pub mod financials;
pub mod forecast;
pub mod grid;
pub mod indicators;
pub mod overrides;
pub mod params;
pub mod player;
pub mod position;
pub mod salary;

pub use forecast::{build_forecast, Forecast, ForecastInputs};
pub use params::ForecastParams;
