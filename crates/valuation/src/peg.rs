//! PEG ratio (price/earnings relative to earnings growth).

use crate::types::{PegAssessment, PegBand, ValuationError, ValuationResult};

/// Compute PEG = P/E ÷ growth, with growth given in percent (e.g. `20.0`).
pub fn peg_ratio(pe_ratio: f64, growth_rate_pct: f64) -> ValuationResult<PegAssessment> {
    if !pe_ratio.is_finite() || !growth_rate_pct.is_finite() {
        return Err(ValuationError::InvalidInput(
            "P/E and growth rate must be finite".to_string(),
        ));
    }
    if growth_rate_pct == 0.0 {
        return Err(ValuationError::InvalidInput(
            "growth rate must be non-zero".to_string(),
        ));
    }

    let peg = pe_ratio / growth_rate_pct;

    Ok(PegAssessment {
        pe_ratio,
        growth_rate_pct,
        peg_ratio: peg,
        band: classify_peg(peg),
    })
}

/// Map a PEG ratio onto its interpretation band.
pub fn classify_peg(peg: f64) -> PegBand {
    if peg < 0.0 {
        PegBand::NegativeGrowth
    } else if peg < 0.5 {
        PegBand::Undervalued
    } else if peg <= 1.0 {
        PegBand::FairlyValued
    } else if peg <= 1.5 {
        PegBand::SlightlyOvervalued
    } else if peg <= 2.0 {
        PegBand::Overvalued
    } else {
        PegBand::SignificantlyOvervalued
    }
}
