//! Sub-unit service.

pub mod service;

pub use service::SubunitService;
