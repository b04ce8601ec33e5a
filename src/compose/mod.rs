//! Tree composition over route chains.
//!
//! A route chain runs outermost layout to innermost leaf. Composition invokes
//! the leaf, optionally wraps it in a deferred boundary fed by a loading
//! placeholder, then folds ancestor layouts around it. Layouts never see
//! query parameters; that isolation keeps shared chrome byte-stable across
//! leaf-only query changes.

/// The chain-folding composer.
pub mod composer;
/// The shared compose+encode build path.
pub mod page;
/// Route chain and parameter types.
pub mod route;
