pub mod action;
pub mod batch;
pub mod config;
pub mod dispute;
pub mod error;
pub mod group;
pub mod lock;
pub mod normalize;
pub mod pack;
pub mod plan;
pub mod recommendation;
pub mod types;

pub use error::{RedressError, Result};
