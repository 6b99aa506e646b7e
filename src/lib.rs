pub mod cli;
pub mod config;
pub mod datasources;
pub mod error;
pub mod logic;
pub mod models;
pub mod report;

pub use config::Config;
pub use error::{CropWiseError, Result};
pub use logic::PlanningService;
