//! The draft -> verify -> format pipeline.
//!
//! - `verify`: dependent second generation call for notation correctness
//! - `restructure`: optional formatter-agent pass
//! - `markup`: deterministic markdown-to-markup rendering
//! - `postprocess`: scoping and fallback rules tying the passes together

pub mod markup;
pub mod postprocess;
pub mod restructure;
pub mod verify;

/// Fixed user-facing text returned whenever a reply cannot be produced.
pub const APOLOGY_TEXT: &str =
    "I'm sorry, I wasn't able to answer that just now. Please try again in a moment.";
