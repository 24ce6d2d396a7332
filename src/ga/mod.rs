//! Genetic Algorithm engine.
//!
//! A generic, problem-agnostic GA built on trait-based abstractions. Users
//! define their problem by implementing [`GaProblem`], which specifies how to
//! create, evaluate, recombine, and mutate individuals. Parameters live in a
//! [`GaConfig`] value; there is no global registry.
//!
//! # Core Traits
//!
//! - [`Individual`]: A candidate solution with a cached, invalidatable fitness
//! - [`GaProblem`]: Problem definition: initialization, evaluation and operators
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, rates, seed, parallelism)
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Final optimization result with per-generation statistics
//!
//! # Submodules
//!
//! - [`operators`]: Real-valued blend crossover and Gaussian mutation
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Bäck, Fogel & Michalewicz (2000), *Evolutionary Computation 1*, ch. 33

mod config;
pub mod operators;
mod runner;
mod selection;
mod types;

pub use config::GaConfig;
pub use runner::{GaError, GaResult, GaRunner, GenerationStats};
pub use selection::{select_tournament, tournament};
pub use types::{Fitness, GaProblem, Individual};
