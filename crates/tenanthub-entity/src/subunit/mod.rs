//! Sub-unit (branch) domain entities.

pub mod model;

pub use model::{Subunit, sort_main_first};
