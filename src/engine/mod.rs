mod async_engine;
mod fraud_engine;

pub use async_engine::AsyncEngine;
pub use fraud_engine::FraudEngine;
