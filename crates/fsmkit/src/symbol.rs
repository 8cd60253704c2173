//! Symbol types for automata transitions.

use std::fmt::Debug;
use std::hash::Hash;

/// A transition label.
///
/// Symbols are opaque to the automata: any cloneable, hashable, ordered type
/// works, typically `char`, `u8` or a token-class name. The ordering is only
/// used to build canonical symbol lists; it carries no meaning.
pub trait Symbol: Clone + Eq + Hash + Ord + Debug {}

impl<T: Clone + Eq + Hash + Ord + Debug> Symbol for T {}
