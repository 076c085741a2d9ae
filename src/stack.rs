//! Host stack growth for the recursive passes.
//!
//! Parsing, resolution and evaluation all recurse on the syntax tree, and
//! evaluation also recurses per script call. Nesting is bounded by the
//! parser and calls by the configured call depth; this keeps the native
//! stack from running out before either limit is reached.

const RED_ZONE: usize = 128 * 1024;
const GROWTH: usize = 2 * 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
