pub mod config;
pub mod error;
pub mod genome;
pub mod io;
pub mod matcher;
pub mod processing;
pub mod samples;

pub use error::{Error, Result};
