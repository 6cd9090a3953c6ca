// munkireport-filter - platform/mod.rs
//
// Platform abstraction layer: preference store, report file I/O,
// config file and path resolution.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
pub mod preferences;
