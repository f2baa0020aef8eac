pub mod engine;
pub mod id_cache;
pub mod models;
pub mod result_cache;
pub mod service;

pub use models::ScoreboardEntry;
pub use service::ScoreboardService;

#[cfg(test)]
pub(crate) mod fake;
