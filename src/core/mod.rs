// munkireport-filter - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: platform, app, or any filesystem access.

pub mod filter;
pub mod model;
pub mod summary;
