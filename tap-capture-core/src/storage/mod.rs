pub mod exporter;
pub mod metadata;
