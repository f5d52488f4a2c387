//! Trait seams for external collaborators.

pub mod source;

pub use source::EntitySource;
