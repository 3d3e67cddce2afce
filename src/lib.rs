pub mod cli;
pub mod config;
pub mod generator;
pub mod llm;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use generator::workflow::{WorkflowInputs, WorkflowReport, launch};
