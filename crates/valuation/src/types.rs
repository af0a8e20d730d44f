//! Core data types shared by the valuation analytics.

use serde::{Deserialize, Serialize};

/// Inputs that drive a discounted cash flow projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfAssumptions {
    /// Discount rate (WACC) applied to every projected flow.
    pub discount_rate: f64,
    /// Perpetual growth rate used for the terminal value.
    pub terminal_growth_rate: f64,
    /// Number of explicitly projected years.
    pub forecast_years: u32,
    /// Upper bound on the growth rate extrapolated from history.
    pub growth_cap: f64,
}

impl Default for DcfAssumptions {
    fn default() -> Self {
        Self {
            discount_rate: 0.10,
            terminal_growth_rate: 0.025,
            forecast_years: 5,
            growth_cap: 0.15,
        }
    }
}

/// Result of a DCF valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfValuation {
    pub enterprise_value: f64,
    pub pv_cash_flows: f64,
    pub pv_terminal_value: f64,
    pub terminal_value: f64,
    pub historical_growth: f64,
    pub forecast_growth_rate: f64,
    pub projected_cash_flows: Vec<f64>,
    /// Number of positive historical flows that fed the projection.
    pub periods_used: usize,
    pub assumptions: DcfAssumptions,
}

/// Interpretation band for a PEG ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PegBand {
    NegativeGrowth,
    Undervalued,
    FairlyValued,
    SlightlyOvervalued,
    Overvalued,
    SignificantlyOvervalued,
}

/// PEG ratio with its interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PegAssessment {
    pub pe_ratio: f64,
    pub growth_rate_pct: f64,
    pub peg_ratio: f64,
    pub band: PegBand,
}

/// Summary statistics for one valuation metric over time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricTrend {
    pub current: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Current value relative to the mean, in percent.
    pub deviation_pct: f64,
    /// Share of observations at or below the current value, in percent.
    pub percentile: f64,
    pub observations: usize,
}

/// The multiples tracked in an industry comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMetric {
    PeTtm,
    PbMrq,
    PsTtm,
}

impl ValuationMetric {
    pub const ALL: [ValuationMetric; 3] = [Self::PeTtm, Self::PbMrq, Self::PsTtm];

    pub fn label(&self) -> &'static str {
        match self {
            Self::PeTtm => "pe_ttm",
            Self::PbMrq => "pb_mrq",
            Self::PsTtm => "ps_ttm",
        }
    }
}

/// One company's multiples at the comparison date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerValuation {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pe_ttm: Option<f64>,
    #[serde(default)]
    pub pb_mrq: Option<f64>,
    #[serde(default)]
    pub ps_ttm: Option<f64>,
}

impl PeerValuation {
    pub fn metric(&self, metric: ValuationMetric) -> Option<f64> {
        let value = match metric {
            ValuationMetric::PeTtm => self.pe_ttm,
            ValuationMetric::PbMrq => self.pb_mrq,
            ValuationMetric::PsTtm => self.ps_ttm,
        };
        value.filter(|v| v.is_finite())
    }
}

/// Where a company's multiple sits relative to its industry mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationLevel {
    SignificantlyUndervalued,
    SlightlyUndervalued,
    Fair,
    SlightlyOvervalued,
    SignificantlyOvervalued,
}

/// Industry-wide distribution of one multiple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; zero with a single observation.
    pub std_dev: f64,
    pub observations: usize,
}

/// The target's position for one multiple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: ValuationMetric,
    pub stats: IndustryStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<ValuationLevel>,
}

/// Result of comparing a company against its industry peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryComparison {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    pub peer_count: usize,
    pub metrics: Vec<MetricComparison>,
}

/// Errors produced by the valuation analytics.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Target not found among peers: {0}")]
    TargetNotFound(String),
}

pub type ValuationResult<T> = Result<T, ValuationError>;
