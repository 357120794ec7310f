pub mod analytics;
pub mod core;
pub mod dashboards;
pub mod enrichment;
pub mod main_module;
pub mod presentation;
pub mod store;

pub use main_module::{build_router, run_axum_server};
