//! # walras-core
//!
//! **Pure deterministic clearing engine for Walras.**
//!
//! Given an assignment market, the engine runs the ascending auction that
//! finds Walrasian prices and a perfect matching:
//!
//! 1. Build the preferred-seller graph at the current prices
//! 2. Compute a maximum matching on it
//! 3. If the matching is perfect, stop
//! 4. Otherwise find a constricted set and raise its neighbourhood's prices
//!    by the smallest amount that opens a new preferred edge
//!
//! It has:
//!
//! - **Zero side effects**: no I/O, no global state, no threads
//! - **Deterministic output**: same market and prices -> same outcome
//! - **Explicit tie-breaks**: ascending identifier order everywhere

pub mod clearing;
pub mod constricted;
pub mod determinism;
pub mod export;
pub mod matching;
pub mod preferred;
pub mod pricing;

pub use clearing::{ClearingLoop, NoopObserver, RoundObserver, TraceRecorder, clear_market};
pub use constricted::{Constriction, find_constricted_set};
pub use determinism::{compute_outcome_root, verify_outcome_root};
pub use export::export_graph;
pub use matching::{Adjacency, IndexMatching, OfferGraph, extend_matching, maximum_matching};
pub use preferred::PreferredSellerGraph;
pub use pricing::{apply_raise, minimal_raise};
