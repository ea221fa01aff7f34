pub mod clients;
pub mod config;
pub mod encoding;
pub mod error;
pub mod glossary;
pub mod html;
pub mod models;
pub mod service;
pub mod tasks;
pub mod telemetry;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use config::AppConfig;
pub use models::*;
pub use service::{AppState, create_app};
pub use workflow::{ServiceClients, Workflow, build_analysis_workflow};
