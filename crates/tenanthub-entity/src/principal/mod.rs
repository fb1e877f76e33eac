//! Principal (authenticated actor) domain entities.

pub mod model;

pub use model::Principal;
