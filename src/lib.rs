//! Neural core: resilient access to a rate-limited generative-AI endpoint.

pub mod ai;
pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod neural;
pub mod observability;
pub mod resilience;

pub use config::NeuralConfig;
pub use neural::NeuralCore;
pub use resilience::{Gate, GateError};
