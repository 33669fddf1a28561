//! Locating patterns inside linearized terms.

pub mod aho_corasick;
pub mod pattern;

pub use aho_corasick::AhoCorasick;
pub use pattern::{
    Bindings, FreshIds, PatternMatch, contains_instance, instantiate, is_instance_of,
    match_at_root, pattern_match, properly_contains_instance, substitute,
};
