//! Regression metrics and feature-importance rankings
//!
//! All functions are pure. Slices of actual and predicted values must have
//! equal length; metrics over empty slices are `NaN`.

use serde::Serialize;

use crate::table::FeatureColumns;

/// Share of total importance held by one feature column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureShare {
    pub name: String,
    /// Percentage of the summed importance of every feature column
    pub percent: f64,
}

/// Scalar diagnostics of the held-out predictions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub test_rows: usize,
    pub mse: f64,
    pub r_squared: f64,
    pub explained_variance: f64,
    pub value_range: f64,
    /// `mse / value_range * 100`; `None` when the range is zero
    pub error_margin_percent: Option<f64>,
}

/// One point of the residuals-vs-predictions scatter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResidualPoint {
    pub predicted: f64,
    pub residual: f64,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sum of squared deviations from the mean
fn sum_sq_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum()
}

/// Ratio score `1 - num/den` with a constant-denominator fallback:
/// a perfect fit scores 1, anything else 0.
fn finite_score(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        if num == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - num / den
    }
}

/// Elementwise `actual - predicted`
pub fn residuals(actual: &[f64], predicted: &[f64]) -> Vec<f64> {
    debug_assert_eq!(actual.len(), predicted.len());
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| a - p)
        .collect()
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let res = residuals(actual, predicted);
    res.iter().map(|r| r * r).sum::<f64>() / res.len() as f64
}

/// Coefficient of determination
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return f64::NAN;
    }
    let ss_res: f64 = residuals(actual, predicted).iter().map(|r| r * r).sum();
    finite_score(ss_res, sum_sq_dev(actual))
}

/// `1 - Var(actual - predicted) / Var(actual)`
pub fn explained_variance_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return f64::NAN;
    }
    let res = residuals(actual, predicted);
    finite_score(sum_sq_dev(&res), sum_sq_dev(actual))
}

/// Span of the values with both bounds seeded at zero.
///
/// Returns `max(0, max v) - min(0, min v)`. For all-positive data this is
/// the maximum rather than `max - min`.
pub fn value_range(values: &[f64]) -> f64 {
    let (low, high) = values
        .iter()
        .fold((0.0_f64, 0.0_f64), |(low, high), &v| (low.min(v), high.max(v)));
    high - low
}

/// MSE as a percentage of the value range
pub fn error_margin_percent(mse: f64, value_range: f64) -> Option<f64> {
    if value_range == 0.0 {
        None
    } else {
        Some(mse / value_range * 100.0)
    }
}

/// Pair each prediction with its residual, in row order
pub fn residual_points(actual: &[f64], predicted: &[f64]) -> Vec<ResidualPoint> {
    predicted
        .iter()
        .zip(residuals(actual, predicted))
        .map(|(&predicted, residual)| ResidualPoint {
            predicted,
            residual,
        })
        .collect()
}

/// Importance of the categorical columns as a percentage of the total.
///
/// Entries come back in (price, genre, theme) order. The denominator is the
/// sum over every feature column, so the three shares need not add to 100.
pub fn importance_breakdown(columns: &FeatureColumns, importances: &[f64]) -> Vec<FeatureShare> {
    let total: f64 = importances.iter().sum();

    columns
        .breakdown()
        .iter()
        .map(|&idx| FeatureShare {
            name: columns.name(idx).unwrap_or_default().to_string(),
            percent: if total > 0.0 {
                importances[idx] / total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Ranked columns with importance strictly above `threshold`
pub fn features_above(
    columns: &FeatureColumns,
    importances: &[f64],
    threshold: f64,
) -> Vec<String> {
    ranked_where(columns, importances, |v| v > threshold)
}

/// Ranked columns with importance strictly below `threshold`
pub fn features_below(
    columns: &FeatureColumns,
    importances: &[f64],
    threshold: f64,
) -> Vec<String> {
    ranked_where(columns, importances, |v| v < threshold)
}

fn ranked_where(
    columns: &FeatureColumns,
    importances: &[f64],
    keep: impl Fn(f64) -> bool,
) -> Vec<String> {
    columns
        .ranked()
        .filter(|&idx| keep(importances[idx]))
        .filter_map(|idx| columns.name(idx).map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mse_and_residuals() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [1.5, 2.0, 2.0];
        assert_eq!(residuals(&actual, &predicted), vec![-0.5, 0.0, 1.0]);
        assert!(close(mean_squared_error(&actual, &predicted), 1.25 / 3.0));
    }

    #[test]
    fn test_r2_and_explained_variance() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        assert!(close(r2_score(&actual, &actual), 1.0));
        assert!(close(explained_variance_score(&actual, &actual), 1.0));

        // Constant offset: explained variance stays perfect, R² does not
        let shifted = [2.0, 3.0, 4.0, 5.0];
        assert!(close(explained_variance_score(&actual, &shifted), 1.0));
        assert!(close(r2_score(&actual, &shifted), 1.0 - 4.0 / 5.0));

        // Predicting the mean scores zero
        let mean_pred = [2.5; 4];
        assert!(close(r2_score(&actual, &mean_pred), 0.0));
    }

    #[test]
    fn test_constant_target() {
        let actual = [3.0, 3.0];
        assert_eq!(r2_score(&actual, &[3.0, 3.0]), 1.0);
        assert_eq!(r2_score(&actual, &[2.0, 3.0]), 0.0);
        assert_eq!(explained_variance_score(&actual, &[2.0, 3.0]), 0.0);
        assert!(r2_score(&[], &[]).is_nan());
    }

    #[test]
    fn test_value_range_is_clamped_at_zero() {
        assert_eq!(value_range(&[2.0, 5.0]), 5.0);
        assert_eq!(value_range(&[-3.0, -1.0]), 3.0);
        assert_eq!(value_range(&[-1.5, 2.5]), 4.0);
        assert_eq!(value_range(&[]), 0.0);
    }

    #[test]
    fn test_error_margin() {
        assert!(close(error_margin_percent(0.5, 4.0).unwrap(), 12.5));
        assert_eq!(error_margin_percent(0.5, 0.0), None);
        assert_eq!(error_margin_percent(0.0, value_range(&[0.0, 0.0])), None);
    }

    #[test]
    fn test_residual_points() {
        let points = residual_points(&[1.0, 2.0], &[1.5, 1.0]);
        assert_eq!(
            points,
            vec![
                ResidualPoint {
                    predicted: 1.5,
                    residual: -0.5
                },
                ResidualPoint {
                    predicted: 1.0,
                    residual: 1.0
                },
            ]
        );
    }

    #[test]
    fn test_importance_rankings() {
        let columns = FeatureColumns::new(
            ["Price", "Genre", "Theme", "Reviews", "Age", "Sequel"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
        .unwrap();
        let importances = [0.10, 0.20, 0.05, 0.50, 0.145, 0.005];

        let shares = importance_breakdown(&columns, &importances);
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[1].name, "Genre");
        assert!(close(shares[0].percent, 10.0));
        assert!(close(shares[1].percent, 20.0));

        assert_eq!(features_above(&columns, &importances, 0.03), vec!["Reviews", "Age"]);
        assert_eq!(features_below(&columns, &importances, 0.01), vec!["Sequel"]);
    }

    #[test]
    fn test_breakdown_with_zero_importance() {
        let columns = FeatureColumns::new(
            ["Theme", "Genre", "Price"].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap();
        let shares = importance_breakdown(&columns, &[0.0, 0.0, 0.0]);
        assert_eq!(
            shares.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["Price", "Genre", "Theme"]
        );
        assert!(shares.iter().all(|s| s.percent == 0.0));
    }
}
