// Compact JSON-friendly summary of a forecast.

use std::collections::BTreeMap;

use rostercast_baseball::financials::YearFinancials;
use rostercast_baseball::Forecast;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFindings {
    pub label: String,
    pub findings: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub org_id: String,
    pub base_year: i32,
    pub financials: Vec<YearFinancials>,
    /// Only rows with at least one finding, in grid order.
    pub findings: Vec<RowFindings>,
    /// Indicator code -> number of cells carrying it.
    pub indicator_counts: BTreeMap<&'static str, usize>,
    pub empty_cells: usize,
}

impl ForecastSummary {
    pub fn from_forecast(forecast: &Forecast) -> Self {
        let findings = forecast
            .assessments
            .iter()
            .filter(|a| !a.findings.is_empty())
            .map(|a| RowFindings {
                label: a.label.clone(),
                findings: a.findings.iter().map(|f| f.label()).collect(),
            })
            .collect();

        let mut indicator_counts = BTreeMap::new();
        let mut empty_cells = 0;
        for cell in forecast.grid.rows.iter().flat_map(|r| &r.cells) {
            if cell.is_empty() {
                empty_cells += 1;
            }
            for indicator in &cell.indicators {
                *indicator_counts.entry(indicator.kind.code()).or_insert(0) += 1;
            }
        }

        ForecastSummary {
            org_id: forecast.grid.org_id.clone(),
            base_year: forecast.grid.base_year,
            financials: forecast.financials.clone(),
            findings,
            indicator_counts,
            empty_cells,
        }
    }
}
