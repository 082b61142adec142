//! Parsing options
//!
//! Controls how much structural damage the tokenizer tolerates.

use super::stack_safe::MAX_NESTING_DEPTH;

/// Options for tokenizing content streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Best-effort ("force parsing") mode. Stray `]` bytes become `Null`,
    /// unreadable operator words end the pass, and the outermost driver
    /// recovers from truncated composites and malformed numbers.
    pub lenient_syntax: bool,

    /// Maximum nesting of arrays, dictionaries and inline image parameters
    pub max_depth: usize,

    /// Upper bound on the size of a content stream read from a file
    pub max_input_bytes: Option<usize>,

    /// Keep the errors recovered from in best-effort mode
    pub collect_warnings: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            lenient_syntax: true,
            max_depth: MAX_NESTING_DEPTH,
            max_input_bytes: None,
            collect_warnings: false,
        }
    }
}

impl ParseOptions {
    /// Strict parsing: every structural problem is an error
    pub fn strict() -> Self {
        Self {
            lenient_syntax: false,
            collect_warnings: false,
            ..Default::default()
        }
    }

    /// Lenient parsing that also records what was recovered
    pub fn lenient() -> Self {
        Self {
            lenient_syntax: true,
            collect_warnings: true,
            ..Default::default()
        }
    }

    /// Set the byte ceiling for file input
    pub fn with_max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = Some(limit);
        self
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
