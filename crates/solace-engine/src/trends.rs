use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One scored user message, reduced to what the aggregation needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredPoint {
    pub timestamp: DateTime<Utc>,
    pub compound: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub avg_sentiment: f64,
    pub message_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendSummary {
    pub avg_sentiment: f64,
    pub total_messages: usize,
    /// The requested window, not a span measured from the data.
    pub days_analyzed: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendReport {
    pub trends: Vec<DailyTrend>,
    pub summary: TrendSummary,
}

/// Buckets scores by UTC calendar day. Buckets come out in date order.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrendAggregator;

impl TrendAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, points: &[ScoredPoint], days: u32) -> TrendReport {
        let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for point in points {
            let entry = buckets.entry(point.timestamp.date_naive()).or_default();
            entry.0 += point.compound;
            entry.1 += 1;
        }

        let trends = buckets
            .into_iter()
            .map(|(date, (sum, count))| DailyTrend {
                date,
                avg_sentiment: sum / count as f64,
                message_count: count,
            })
            .collect();

        let total: f64 = points.iter().map(|p| p.compound).sum();
        let avg_sentiment = if points.is_empty() {
            0.0
        } else {
            total / points.len() as f64
        };

        TrendReport {
            trends,
            summary: TrendSummary {
                avg_sentiment,
                total_messages: points.len(),
                days_analyzed: days,
            },
        }
    }
}
