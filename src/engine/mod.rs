//! Pure derived-price computations. Every function here is a total,
//! deterministic function of an observation slice, the catalog data the
//! caller already resolved, and an explicit "now". No I/O, no shared state.

pub mod currency;
pub mod normalizer;
pub mod history;
pub mod deals;
pub mod predictor;
pub mod comparator;
pub mod alerts;
pub mod savings;
