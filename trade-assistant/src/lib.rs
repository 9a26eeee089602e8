// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod config;
pub mod db;
pub mod league;
pub mod market;
pub mod optimizer;
pub mod trade;
pub mod valuation;
