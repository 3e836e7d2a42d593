//! Command implementations for enrollctl CLI

pub mod serve;

pub use serve::run_serve;
