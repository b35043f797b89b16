// Library root: collaborators, data sources, and the forecast planner, exposed
// so integration tests can drive the planner end to end.

pub mod collaborators;
pub mod files;
pub mod planner;
pub mod store;
pub mod summary;
