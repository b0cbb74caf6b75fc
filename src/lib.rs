pub mod codec;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod hal;
pub mod hub;
pub mod observability;
pub mod resilience;
