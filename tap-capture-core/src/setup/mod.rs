//! Device-graph construction steps, run in order by the capture session.

pub mod aggregate_builder;
pub mod discovery;
pub mod tap_factory;
