//! Federation domain entities.

pub mod model;

pub use model::Federation;
