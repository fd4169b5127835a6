//! URL handling module for Hostwalk
//!
//! This module provides the two URL policies the crawler applies to every
//! discovered link: trailing-terminator normalization and host confinement.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, is_same_host};
pub use normalize::{canonical_url, normalize_url};
