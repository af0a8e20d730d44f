//! Discounted cash flow valuation.

use crate::types::{DcfAssumptions, DcfValuation, ValuationError, ValuationResult};

/// Longest explicit projection accepted.
pub const MAX_FORECAST_YEARS: u32 = 50;

/// Value a business from its historical cash flows, oldest first.
///
/// Non-positive flows are discarded before the growth rate is extrapolated,
/// so at least two positive observations are required.
pub fn calculate_dcf(cash_flows: &[f64], assumptions: &DcfAssumptions) -> ValuationResult<DcfValuation> {
    validate_assumptions(assumptions)?;

    if cash_flows.len() < 2 {
        return Err(ValuationError::InsufficientData(
            "DCF requires at least 2 periods of cash flow".to_string(),
        ));
    }

    let positive: Vec<f64> = cash_flows
        .iter()
        .copied()
        .filter(|cf| cf.is_finite() && *cf > 0.0)
        .collect();
    if positive.len() < 2 {
        return Err(ValuationError::InsufficientData(
            "DCF requires at least 2 positive cash flows".to_string(),
        ));
    }

    let first = positive[0];
    let last = positive[positive.len() - 1];
    let periods = (positive.len() - 1) as f64;
    let historical_growth = (last / first).powf(1.0 / periods) - 1.0;
    let forecast_growth_rate = historical_growth.min(assumptions.growth_cap);

    let years = i32::try_from(assumptions.forecast_years).map_err(|_| {
        ValuationError::InvalidInput("forecast_years is out of range".to_string())
    })?;
    let projected_cash_flows: Vec<f64> = (1..=years)
        .map(|year| last * (1.0 + forecast_growth_rate).powi(year))
        .collect();

    let r = assumptions.discount_rate;
    let tg = assumptions.terminal_growth_rate;

    let final_flow = *projected_cash_flows.last().ok_or_else(|| {
        ValuationError::InvalidInput("forecast_years must be at least 1".to_string())
    })?;
    let terminal_value = final_flow * (1.0 + tg) / (r - tg);

    let pv_cash_flows: f64 = projected_cash_flows
        .iter()
        .enumerate()
        .map(|(i, cf)| cf / (1.0 + r).powi(i as i32 + 1))
        .sum();
    let pv_terminal_value = terminal_value / (1.0 + r).powi(years);

    tracing::debug!(
        historical_growth,
        forecast_growth_rate,
        periods = positive.len(),
        "Computed DCF projection"
    );

    Ok(DcfValuation {
        enterprise_value: pv_cash_flows + pv_terminal_value,
        pv_cash_flows,
        pv_terminal_value,
        terminal_value,
        historical_growth,
        forecast_growth_rate,
        projected_cash_flows,
        periods_used: positive.len(),
        assumptions: *assumptions,
    })
}

fn validate_assumptions(assumptions: &DcfAssumptions) -> ValuationResult<()> {
    if assumptions.forecast_years == 0 || assumptions.forecast_years > MAX_FORECAST_YEARS {
        return Err(ValuationError::InvalidInput(format!(
            "forecast_years must be between 1 and {MAX_FORECAST_YEARS}, got {}",
            assumptions.forecast_years
        )));
    }
    if !assumptions.discount_rate.is_finite() || !assumptions.terminal_growth_rate.is_finite() {
        return Err(ValuationError::InvalidInput(
            "discount and terminal growth rates must be finite".to_string(),
        ));
    }
    if assumptions.discount_rate <= assumptions.terminal_growth_rate {
        return Err(ValuationError::InvalidInput(format!(
            "discount rate {} must exceed terminal growth rate {}",
            assumptions.discount_rate, assumptions.terminal_growth_rate
        )));
    }
    if assumptions.discount_rate <= -1.0 {
        return Err(ValuationError::InvalidInput(
            "discount rate must be greater than -100%".to_string(),
        ));
    }
    Ok(())
}
