pub mod agent;
pub mod context;
pub mod journal;
pub mod outlet;
pub mod persona;
pub mod types;
pub mod workflow;
