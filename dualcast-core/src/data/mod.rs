//! Data acquisition, canonicalisation and point-in-time alignment.

pub mod align;
pub mod canonicalize;
pub mod economic;
pub mod fred;
pub mod provider;
pub mod yahoo;

pub use align::{align_backward, AlignedColumn, SeriesAligner};
pub use canonicalize::{canonicalize_bars, read_bars_csv, WireBar};
pub use economic::{
    monthly_first, EconomicContext, EconomicSource, LiveEconomicSource, ReferenceSpec,
    SeriesSource,
};
pub use fred::FredProvider;
pub use provider::{DataError, MacroDataProvider, MarketDataProvider};
pub use yahoo::YahooProvider;
