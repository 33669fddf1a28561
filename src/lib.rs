//! Term rewriting and Knuth-Bendix completion over terms in Euler-tour form.

pub mod completion;
pub mod error;
pub mod matching;
pub mod ordering;
pub mod rewriting;
pub mod tree;
pub mod utils;

#[cfg(test)]
mod macros;

pub use error::{Error, Result};
