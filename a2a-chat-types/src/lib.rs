#![doc = include_str!("../README.md")]

pub mod error;
pub mod event;
pub mod stats;
pub mod types;

pub use error::*;
pub use event::*;
pub use stats::*;
pub use types::*;
