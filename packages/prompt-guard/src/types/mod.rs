//! Value types flowing through the pipeline.

pub mod diff;
pub mod entity;
pub mod record;
pub mod risk;
pub mod sanitization;
