//! Test and validation suites for the sediment engine.
//!
//! Cross-module integration suites live here, one module per area, plus
//! property-based round-trip tests. Unit tests stay next to the code they
//! cover inside the `sediment` crate.

pub mod chunking_integration;
pub mod engine_integration;
pub mod proptest_engine;
pub mod tiering_integration;

pub use proptest_engine::{arb_payload, arb_text_payload};
