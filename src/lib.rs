pub mod activities;
pub mod api_router;
pub mod attendance;
pub mod core;
pub mod dashboards;
pub mod employees;
pub mod leads;
pub mod main_module;
pub mod settings;

pub use crate::core::config::AppConfig;
pub use crate::core::shared::error::ApiError;
pub use crate::core::shared::state::AppState;
pub use crate::leads::distributor::{distribute, distribute_unassigned, DistributionReport};
