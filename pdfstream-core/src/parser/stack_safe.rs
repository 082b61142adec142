//! Stack-safe parsing utilities
//!
//! Composite values recurse into the tokenizer; this module bounds how deep
//! that recursion may go so hostile input cannot exhaust the stack.

use super::{ParseError, ParseResult};

/// Default maximum nesting depth for composite values. Unoptimized builds
/// must still fit this many levels on a 2 MiB thread stack.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Recursion state carried through one tokenizer call chain
#[derive(Debug)]
pub struct StackSafeContext {
    /// Current nesting depth
    pub depth: usize,
    /// Maximum allowed depth
    pub max_depth: usize,
}

impl Default for StackSafeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl StackSafeContext {
    /// Create a context with the default limit
    pub fn new() -> Self {
        Self::with_limit(MAX_NESTING_DEPTH)
    }

    /// Create a context with a custom limit
    pub fn with_limit(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    /// Enter a new nesting level
    pub fn enter(&mut self) -> ParseResult<()> {
        if self.depth + 1 > self.max_depth {
            return Err(ParseError::RecursionLimitExceeded {
                depth: self.depth + 1,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Exit a nesting level
    pub fn exit(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    /// Run `f` one level deeper, leaving the depth unchanged afterwards
    /// whether or not `f` succeeds.
    pub fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.enter()?;
        let result = f(self);
        self.exit();
        result
    }
}
