use serde::{Deserialize, Serialize};

use super::models::Vote;

/// Share of the votes the top value needs before it counts as consensus
pub const CONSENSUS_THRESHOLD_PERCENT: f64 = 60.0;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub value: String,
    pub count: usize,
    pub percentage: f64,
}

/// Summary of a revealed vote set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatistics {
    pub average: String,
    pub mode: String,
    pub total_votes: usize,
    pub distribution: Vec<DistributionEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus: Option<String>,
}

impl VoteStatistics {
    fn empty() -> Self {
        Self {
            average: NOT_AVAILABLE.to_string(),
            mode: NOT_AVAILABLE.to_string(),
            total_votes: 0,
            distribution: Vec::new(),
            consensus: None,
        }
    }

    /// Summarise raw vote tokens. Tokens that don't parse as numbers only
    /// count towards the distribution, never the average.
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let values: Vec<&str> = values.into_iter().collect();
        if values.is_empty() {
            return Self::empty();
        }

        let numeric: Vec<f64> = values
            .iter()
            .filter_map(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .collect();

        let average = if numeric.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            let mean = numeric.iter().sum::<f64>() / numeric.len() as f64;
            // Half-up to one decimal: 6.25 -> "6.3"
            format!("{:.1}", (mean * 10.0).round() / 10.0)
        };

        // Encounter order is kept so the stable sort below breaks ties by first appearance
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for value in &values {
            match counts.iter_mut().find(|(v, _)| v == value) {
                Some((_, count)) => *count += 1,
                None => counts.push((*value, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let total = values.len();
        let distribution: Vec<DistributionEntry> = counts
            .into_iter()
            .map(|(value, count)| DistributionEntry {
                value: value.to_string(),
                count,
                percentage: count as f64 * 100.0 / total as f64,
            })
            .collect();

        let top = &distribution[0];
        let mode = top.value.clone();
        let consensus =
            (top.percentage >= CONSENSUS_THRESHOLD_PERCENT).then(|| top.value.clone());

        Self {
            average,
            mode,
            total_votes: total,
            distribution,
            consensus,
        }
    }
}

/// Computes average, mode, distribution and consensus for a vote set
pub fn compute_statistics(votes: &[Vote]) -> VoteStatistics {
    VoteStatistics::from_values(votes.iter().map(|v| v.value.as_ref()))
}
