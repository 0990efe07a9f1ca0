pub mod config;
pub mod contract;
pub mod episode;
pub mod error;
pub mod ids;
mod model;
pub mod monte_carlo;
pub mod policy;
pub mod policy_iteration;
pub mod snapshot;
pub mod solution;
pub mod stats;
mod sweep;
pub mod table;
pub mod value_iteration;

#[cfg(test)]
mod tests;
