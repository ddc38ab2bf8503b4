//! # walras-types
//!
//! Shared types, errors, and configuration for the **Walras** assignment
//! market clearing engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`BuyerId`], [`SellerId`], [`RoundId`]
//! - **Market model**: [`Market`], [`MarketBuilder`], [`MarketInput`], [`Valuation`]
//! - **Prices**: [`PriceVector`]
//! - **Matching model**: [`Matching`], [`ConstrictedSet`]
//! - **Trace model**: [`RoundTrace`], [`PreferredEdge`]
//! - **Outcome model**: [`ClearingOutcome`]
//! - **Graph export**: [`GraphExport`], [`GraphNode`], [`GraphEdge`], [`Partition`]
//! - **Configuration**: [`ClearingConfig`]
//! - **Errors**: [`WalrasError`] with `WL_ERR_` prefix codes
//! - **Constants**: defaults and domain tags

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod market;
pub mod matching;
pub mod outcome;
pub mod price;
pub mod trace;

// Re-export all primary types at crate root for ergonomic imports:
//   use walras_types::{Market, PriceVector, Matching, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use market::*;
pub use matching::*;
pub use outcome::*;
pub use price::*;
pub use trace::*;

// Constants are accessed via `walras_types::constants::FOO`
// (not re-exported to avoid name collisions).
