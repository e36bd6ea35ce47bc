//! Free-text normalizers for money amounts and winner-region lists.
//!
//! Normalization misses are never errors: absent financial figures and
//! unparsable region text are expected data sparsity.

pub mod amount;
pub mod distribution;

pub use amount::money_to_yuan;
pub use distribution::parse_regions;
