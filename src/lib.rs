// munkireport-filter - lib.rs
//
// Library entry point, exposing the pipeline layers for integration testing.
// The binary in `main.rs` is a thin clap wrapper over `app::pipeline`.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
