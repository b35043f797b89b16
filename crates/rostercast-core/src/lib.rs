// Library root: shared configuration and persistence used by the forecasting
// engine and the planner binary.

pub mod config;
pub mod db;
