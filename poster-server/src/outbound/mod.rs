pub mod gallery;
pub mod metrics;
