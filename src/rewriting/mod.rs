//! Rules, equations, systems of both, and rewriting terms with them.

pub mod engine;
pub mod rule;
pub mod system;

pub use engine::{RewriteStep, Rewriter};
pub use rule::{Equation, Rule};
pub use system::{Change, System, SystemChange};
