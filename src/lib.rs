//! Freight cost comparison for international shipments across FedEx, DHL
//! and UPS.

pub mod cli;
pub mod domain;
pub mod infra;
pub mod util;
