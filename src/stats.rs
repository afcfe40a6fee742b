//! ==============================================================================
//! stats.rs - moisture aggregates over the retained window
//! ==============================================================================
//!
//! a reading without a numeric `moisture` contributes 0: it stays in the
//! denominator of the mean and can become the minimum.
//!
//! min/max are reported as the original json numbers, so integer sensors get
//! integer extremes back. the mean is always a finite float: values outside
//! the f64 range saturate at f64::MAX, and a sum that overflows is averaged
//! term by term instead.
//!
//! ==============================================================================

use serde::Serialize;
use serde_json::Number;

use crate::window::RetainedWindow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStats {
    pub count: usize,
    pub avg_moisture: f64,
    pub min_moisture: Number,
    pub max_moisture: Number,
}

impl WindowStats {
    /// `None` for an empty window
    pub fn compute(window: &RetainedWindow) -> Option<Self> {
        let values: Vec<(Number, f64)> = window
            .iter()
            .map(|r| {
                let n = r.moisture();
                let v = as_f64(&n);
                (n, v)
            })
            .collect();

        let (first, first_v) = values.first()?;
        let (mut min, mut min_v) = (first, *first_v);
        let (mut max, mut max_v) = (first, *first_v);

        for (n, v) in &values[1..] {
            // strict comparisons keep the first of equal values, like min()/max()
            if *v < min_v {
                min = n;
                min_v = *v;
            } else if *v > max_v {
                max = n;
                max_v = *v;
            }
        }

        let floats: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
        Some(Self {
            count: values.len(),
            avg_moisture: mean(&floats),
            min_moisture: min.clone(),
            max_moisture: max.clone(),
        })
    }
}

fn as_f64(n: &Number) -> f64 {
    // literals like 1e400 have no f64; saturate rather than count them as 0
    n.as_f64()
        .or_else(|| n.to_string().parse::<f64>().ok())
        .map(|v| v.clamp(f64::MIN, f64::MAX))
        .unwrap_or(0.0)
}

fn mean(values: &[f64]) -> f64 {
    let count = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        return sum / count;
    }
    let scaled: f64 = values.iter().map(|v| v / count).sum();
    scaled.clamp(f64::MIN, f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Reading;
    use chrono::NaiveDate;
    use serde_json::json;

    fn window_of(bodies: &[&str]) -> RetainedWindow {
        let now = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mut window = RetainedWindow::default();
        for body in bodies {
            window.push(Reading::stamp(Reading::parse(body.as_bytes()).unwrap(), now));
        }
        window
    }

    #[test]
    fn test_empty_window_has_no_stats() {
        assert!(WindowStats::compute(&RetainedWindow::default()).is_none());
    }

    #[test]
    fn test_missing_moisture_counts_as_zero() {
        let window = window_of(&[r#"{"moisture": 10}"#, r#"{"moisture": 20}"#, r#"{"red": 5}"#]);
        let stats = WindowStats::compute(&window).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.avg_moisture, 10.0);
        assert_eq!(stats.min_moisture, Number::from(0));
        assert_eq!(stats.max_moisture, Number::from(20));
    }

    #[test]
    fn test_single_reading() {
        let stats = WindowStats::compute(&window_of(&[r#"{"moisture": 4242}"#])).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.avg_moisture, 4242.0);
        assert_eq!(stats.min_moisture, Number::from(4242));
        assert_eq!(stats.max_moisture, Number::from(4242));
    }

    #[test]
    fn test_mixed_int_and_float() {
        let window = window_of(&[r#"{"moisture": 1.5}"#, r#"{"moisture": 3}"#]);
        let stats = WindowStats::compute(&window).unwrap();
        assert_eq!(stats.avg_moisture, 2.25);
        assert_eq!(stats.min_moisture.as_f64(), Some(1.5));
        assert_eq!(stats.max_moisture, Number::from(3));
    }

    #[test]
    fn test_huge_values_keep_mean_finite() {
        let window = window_of(&[
            r#"{"moisture": 1.5e308}"#,
            r#"{"moisture": 1.5e308}"#,
            r#"{"moisture": 1e400}"#,
        ]);
        let stats = WindowStats::compute(&window).unwrap();
        assert!(stats.avg_moisture.is_finite());
        assert!(stats.avg_moisture > 1.5e308);
        assert_eq!(stats.max_moisture.to_string(), "1e400");
        assert_eq!(stats.min_moisture.to_string(), "1.5e308");

        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["avg_moisture"].is_number());
    }

    #[test]
    fn test_serialized_shape() {
        let window = window_of(&[r#"{"moisture": 10}"#, r#"{"moisture": 30}"#]);
        let stats = WindowStats::compute(&window).unwrap();
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            json!({"count": 2, "avg_moisture": 20.0, "min_moisture": 10, "max_moisture": 30})
        );
    }
}
