//! CLI library components for the consultation quality pipeline.

pub mod logging;
pub mod pipeline;
