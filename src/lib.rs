// Library surface for the binary, headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod formatter;
pub mod generator;
pub mod quiz;
pub mod rng;
pub mod runtime;
pub mod session;
pub mod store;
pub mod ui;
pub mod util;

pub use error::{QuizError, Result};
