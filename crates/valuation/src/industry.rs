//! Industry peer comparison of valuation multiples.

use crate::trend::{deviation_pct, mean};
use crate::types::{
    IndustryComparison, IndustryStats, MetricComparison, PeerValuation, ValuationError,
    ValuationLevel, ValuationMetric, ValuationResult,
};

/// Compare `target` against every company in `peers` (which must include it).
///
/// Metrics no peer reports are omitted from the result.
pub fn compare_industry(target: &str, peers: &[PeerValuation]) -> ValuationResult<IndustryComparison> {
    if peers.len() < 2 {
        return Err(ValuationError::InsufficientData(format!(
            "industry comparison needs at least 2 companies, got {}",
            peers.len()
        )));
    }

    let target_peer = peers
        .iter()
        .find(|p| p.code == target)
        .ok_or_else(|| ValuationError::TargetNotFound(target.to_string()))?;

    let mut metrics = Vec::new();
    for metric in ValuationMetric::ALL {
        let values: Vec<f64> = peers.iter().filter_map(|p| p.metric(metric)).collect();
        let Some(stats) = industry_stats(&values) else {
            continue;
        };

        let target_value = target_peer.metric(metric);
        let deviation = target_value.map(|v| deviation_pct(v, stats.mean));
        let percentile = target_value.map(|v| peer_percentile(v, peers, metric));
        let level = target_value.map(|v| classify_level(v, stats.mean));

        metrics.push(MetricComparison {
            metric,
            stats,
            target_value,
            deviation_pct: deviation,
            percentile,
            level,
        });
    }

    tracing::debug!(
        target_code = target,
        peers = peers.len(),
        metrics = metrics.len(),
        "Compared industry valuation"
    );

    Ok(IndustryComparison {
        target: target.to_string(),
        target_name: target_peer.name.clone(),
        peer_count: peers.len(),
        metrics,
    })
}

/// Share of all peers whose multiple is at or below `value`, in percent.
///
/// Peers that do not report the metric stay in the denominator.
fn peer_percentile(value: f64, peers: &[PeerValuation], metric: ValuationMetric) -> f64 {
    if peers.is_empty() {
        return 0.0;
    }
    let at_or_below = peers
        .iter()
        .filter_map(|p| p.metric(metric))
        .filter(|v| *v <= value)
        .count();
    at_or_below as f64 / peers.len() as f64 * 100.0
}

/// Distribution statistics, or `None` for an empty sample.
pub fn industry_stats(values: &[f64]) -> Option<IndustryStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    let mean = mean(&sorted);
    let std_dev = if n > 1 {
        let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };

    Some(IndustryStats {
        mean,
        median,
        min: sorted[0],
        max: sorted[n - 1],
        std_dev,
        observations: n,
    })
}

/// Level of `value` relative to the industry `mean`.
pub fn classify_level(value: f64, mean: f64) -> ValuationLevel {
    if value < mean * 0.8 {
        ValuationLevel::SignificantlyUndervalued
    } else if value < mean * 0.95 {
        ValuationLevel::SlightlyUndervalued
    } else if value <= mean * 1.05 {
        ValuationLevel::Fair
    } else if value <= mean * 1.2 {
        ValuationLevel::SlightlyOvervalued
    } else {
        ValuationLevel::SignificantlyOvervalued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(code: &str, pe: Option<f64>, pb: Option<f64>) -> PeerValuation {
        PeerValuation {
            code: code.to_string(),
            name: None,
            pe_ttm: pe,
            pb_mrq: pb,
            ps_ttm: None,
        }
    }

    #[test]
    fn test_stats_odd_and_even() {
        let s = industry_stats(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(s.median, 2.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
        assert!((s.std_dev - 1.0).abs() < 1e-9);

        let s = industry_stats(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(s.median, 2.5);
        assert!(industry_stats(&[]).is_none());
        assert_eq!(industry_stats(&[7.0]).unwrap().std_dev, 0.0);
    }

    #[test]
    fn test_compare_industry() {
        let peers = vec![
            peer("sh.600000", Some(10.0), Some(1.0)),
            peer("sh.600001", Some(20.0), None),
            peer("sh.600002", Some(30.0), Some(3.0)),
        ];
        let c = compare_industry("sh.600000", &peers).unwrap();
        assert_eq!(c.peer_count, 3);
        // ps_ttm has no data and is omitted
        assert_eq!(c.metrics.len(), 2);

        let pe = &c.metrics[0];
        assert_eq!(pe.metric, ValuationMetric::PeTtm);
        assert_eq!(pe.target_value, Some(10.0));
        assert!((pe.deviation_pct.unwrap() + 50.0).abs() < 1e-9);
        assert!((pe.percentile.unwrap() - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(pe.level, Some(ValuationLevel::SignificantlyUndervalued));

        let pb = &c.metrics[1];
        assert_eq!(pb.stats.observations, 2);
        assert!((pb.stats.mean - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_counts_peers_without_the_metric() {
        let peers = vec![
            peer("A", Some(10.0), None),
            peer("B", None, None),
            peer("C", Some(30.0), None),
        ];
        let c = compare_industry("A", &peers).unwrap();
        let pe = &c.metrics[0];
        assert_eq!(pe.stats.observations, 2);
        assert!((pe.stats.mean - 20.0).abs() < 1e-9);
        assert!((pe.percentile.unwrap() - 100.0 / 3.0).abs() < 1e-9);

        let c = compare_industry("C", &peers).unwrap();
        assert!((c.metrics[0].percentile.unwrap() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_target_missing() {
        let peers = vec![peer("a", Some(1.0), None), peer("b", Some(2.0), None)];
        assert_eq!(
            compare_industry("c", &peers).unwrap_err(),
            ValuationError::TargetNotFound("c".to_string())
        );
    }

    #[test]
    fn test_compare_needs_two_peers() {
        let peers = vec![peer("a", Some(1.0), None)];
        assert!(matches!(
            compare_industry("a", &peers),
            Err(ValuationError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(classify_level(79.0, 100.0), ValuationLevel::SignificantlyUndervalued);
        assert_eq!(classify_level(90.0, 100.0), ValuationLevel::SlightlyUndervalued);
        assert_eq!(classify_level(102.0, 100.0), ValuationLevel::Fair);
        assert_eq!(classify_level(115.0, 100.0), ValuationLevel::SlightlyOvervalued);
        assert_eq!(classify_level(125.0, 100.0), ValuationLevel::SignificantlyOvervalued);
    }
}
