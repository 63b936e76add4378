//! Price source abstractions and implementations.
//!
//! This module contains:
//! - The `PriceSource` trait that all sources implement
//! - Concrete source implementations (Kraken)
//!
//! Sources receive the friendly asset symbol (e.g. "BTC") and are responsible
//! for mapping it to whatever identifier the upstream uses.

mod traits;

pub mod kraken;

pub use traits::PriceSource;
