//! System-wide constants for the Walras clearing engine.

use rust_decimal::Decimal;

/// Default multiplier `k` of the round bound `k · n²`.
pub const DEFAULT_ROUND_BOUND_FACTOR: usize = 10;

/// Largest accepted valuation, and the ceiling any seller price may reach.
///
/// About `Decimal::MAX / 4`. With valuations and prices both in
/// `0..=MAX_PRICE`, every payoff and price gap fits in a `Decimal`.
pub const MAX_PRICE: Decimal = Decimal::from_parts(u32::MAX, u32::MAX, u32::MAX >> 2, false, 0);

/// Domain tag hashed into every outcome fingerprint.
pub const OUTCOME_ROOT_DOMAIN: &[u8] = b"walras:outcome_root:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Walras";
