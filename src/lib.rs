//! Library for working with finite automata over opaque, string-named states.
//!
//! An [`Automaton`](prelude::Automaton) is an immutable value consisting of a set of states, an
//! input alphabet, a designated initial state, a set of final states and a transition relation
//! mapping `(state, symbol)` pairs to sets of successor states. The empty symbol is reserved for
//! epsilon (no-input) transitions and can never be a member of the alphabet. A single
//! representation covers both deterministic and nondeterministic automata; determinism is a
//! computed classification rather than a separate type, so every algorithm operates on the common
//! shape.
//!
//! The operations offered on top of that representation are
//! - acceptance testing of input words via an exhaustive nondeterministic search that handles
//!   epsilon transitions and epsilon cycles ([`acceptance`]),
//! - epsilon-closure and symbol-move primitives ([`closure`]),
//! - conversion of a nondeterministic automaton into an equivalent deterministic one via the
//!   subset construction ([`determinize`]),
//! - reduction of a deterministic automaton to its unique minimal form via reachability pruning
//!   followed by partition refinement ([`minimize`]).
//!
//! Each conversion returns a fresh automaton together with a report describing what changed
//! (assigned subset names, dropped states), which host layers can render however they like. The
//! crate performs no I/O of its own; the one outward-facing contract is the flat textual record
//! shape in [`storage`], which round-trips automata bit-for-bit for the persistence collaborator.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use finite_automata::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        acceptance::AcceptanceResult,
        automaton::{Automaton, Determinism, StateId, Symbol, TransitionMap, EPSILON},
        determinize::ConversionReport,
        error::AutomatonError,
        math,
        minimize::MinimizationReport,
        storage::{RecentCache, StorageError, StoredAutomaton},
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the
/// crate and do not really fit to the top level.
pub mod math;

/// Error kinds surfaced by construction and the conversion algorithms.
pub mod error;

/// Defines the automaton representation, its validity invariants and the determinism
/// classification.
pub mod automaton;

/// Epsilon-closure and symbol-move primitives shared by the conversion algorithms.
pub mod closure;

/// Acceptance testing of input words through nondeterministic exploration.
pub mod acceptance;

/// Conversion of nondeterministic automata to deterministic ones via the subset construction.
pub mod determinize;

/// Reduction of deterministic automata to their minimal form via partition refinement.
pub mod minimize;

/// The flat textual record format shared with the storage collaborator, plus the session-owned
/// cache over recently stored records.
pub mod storage;

/// Graphviz DOT output for rendering state diagrams in a host layer.
pub mod dot;
