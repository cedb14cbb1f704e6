//! Page-content processing for the update checker.
//!
//! - Lightweight HTML-to-text conversion and the date-anchored
//!   "latest update" snippet heuristic (`extract`)
//! - Content fingerprinting (`fingerprint`)
//!
//! The extraction is deliberately a heuristic, not a parser: it anchors on
//! the first date-shaped substring so the snippet survives markup and
//! layout churn, and collapses whitespace so cosmetic reflow never reads
//! as a content change.

pub mod extract;
pub mod fingerprint;

pub use extract::extract_latest_block;
pub use fingerprint::fingerprint;
