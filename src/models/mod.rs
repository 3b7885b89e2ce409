//! Domain model module declarations.

pub mod activity;
pub mod pricing;
pub mod snapshot;
