//! Persistent scope chain used to resolve identifiers during execution.
//!
//! An environment is a singly-linked list of frames, each binding one symbol.
//! Frames are never modified after creation, so any number of closures (and
//! threads) can share a common tail.

use std::sync::Arc;

use crate::shared_tree_impl::shared_tree_execution::Object;

struct Frame {
    symbol: String,
    value: Object,
    parent: Option<Arc<Frame>>,
}

/// A handle to the innermost frame of a scope chain. Cloning is cheap and
/// shares every frame.
#[derive(Clone, Default)]
pub struct Environment {
    head: Option<Arc<Frame>>,
}

impl Environment {
    /// Creates an environment with no bindings.
    pub fn empty() -> Environment {
        return Environment { head: None };
    }

    /// Returns a new environment where `symbol` is bound to `value`, in front
    /// of every binding of `self`. `self` is left untouched.
    pub fn extend(&self, symbol: &str, value: Object) -> Environment {
        return Environment {
            head: Some(Arc::new(Frame {
                symbol: String::from(symbol),
                value,
                parent: self.head.clone(),
            })),
        };
    }

    /// Finds the innermost binding of `symbol`.
    pub fn lookup(&self, symbol: &str) -> Option<&Object> {
        let mut curr_frame = self.head.as_deref();

        while let Some(frame) = curr_frame {
            if frame.symbol == symbol {
                return Some(&frame.value);
            }
            curr_frame = frame.parent.as_deref();
        }

        return None;
    }

    /// Symbols from innermost to outermost, duplicates included.
    pub fn symbols(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut curr_frame = self.head.as_deref();

        while let Some(frame) = curr_frame {
            out.push(frame.symbol.as_str());
            curr_frame = frame.parent.as_deref();
        }

        return out;
    }

    /// True if both handles point at the same frame.
    pub fn same_scope(&self, other: &Environment) -> bool {
        return match (&self.head, &other.head) {
            (Some(lhs), Some(rhs)) => Arc::ptr_eq(lhs, rhs),
            (None, None) => true,
            _ => false,
        };
    }
}

// Unlinks uniquely-owned frames one at a time, so releasing a long chain
// doesn't recurse once per frame.
impl Drop for Environment {
    fn drop(&mut self) {
        let mut curr_frame = self.head.take();

        while let Some(frame_arc) = curr_frame {
            match Arc::try_unwrap(frame_arc) {
                Ok(mut frame) => curr_frame = frame.parent.take(),
                Err(_) => break,
            }
        }
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f.debug_list().entries(self.symbols()).finish();
    }
}
