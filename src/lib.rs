#![allow(clippy::implicit_hasher)]
#![allow(unknown_lints)]

pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod synthesis;
pub mod time;

pub use config::{ConvertOptions, OutputFormat};
pub use error::ConvertError;
pub use pipeline::{build_logics, convert};
