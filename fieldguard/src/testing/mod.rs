//! Test helpers: validator mocks and outcome assertions.

pub mod assertions;
pub mod mocks;

pub use assertions::*;
pub use mocks::*;
