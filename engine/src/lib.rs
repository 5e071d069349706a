// Engine library root: indicator engine, data providers, pipeline and presenters.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod pipeline;
pub mod presentation;

pub use error::EngineError;
pub use pipeline::{Dashboard, ViewModel};
