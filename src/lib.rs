pub mod config;
pub mod engine;
pub mod error;
pub mod geodesy;
pub mod models;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod spatial;
pub mod species;
pub mod statistics;
pub mod systems;
pub mod tree;
pub mod world;

pub use config::SimulationConfig;
pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use error::ConfigError;
pub use world::{TreeId, World};
