//! Valuation — core analytics for DCF, PEG, metric trends, and industry peer comparison.

pub mod dcf;
pub mod industry;
pub mod peg;
pub mod trend;
pub mod types;

pub use dcf::{calculate_dcf, MAX_FORECAST_YEARS};
pub use industry::{classify_level, compare_industry, industry_stats};
pub use peg::{classify_peg, peg_ratio};
pub use trend::metric_trend;
pub use types::*;
