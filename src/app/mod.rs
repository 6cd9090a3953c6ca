// munkireport-filter - app/mod.rs
//
// Application layer: wires platform I/O around the core filter.

pub mod pipeline;
