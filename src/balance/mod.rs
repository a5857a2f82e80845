//! Star-count stratified sampling of a collected dataset
//!
//! Records are assigned to right-closed star bins, an equal quota is drawn from each
//! non-empty bin, and any shortfall is topped up from the records left over. Both random
//! draws use fixed seeds so that the same dataset always yields the same sample.

mod bins;
mod sampler;

pub use bins::StarBins;
pub use sampler::{BalancedSample, BinSummary, StratifiedSampler};
