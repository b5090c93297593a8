use std::collections::HashMap;

use serde::Serialize;

use crate::data::{Column, Value};
use crate::types::LabelValue;

/// Class balance of a label vector.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelDistribution {
    pub total: usize,
    pub classes: usize,
    /// Share of the most frequent class.
    pub max_share: f64,
    /// Share of the least frequent class.
    pub min_share: f64,
    pub per_label: Vec<LabelShare>,
}

/// Count and share of one label value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: LabelValue,
    pub count: usize,
    pub share: f64,
}

/// Compute class counts for `labels`, most frequent first (ties by label).
/// Non-text labels are rendered with their JSON representation.
pub fn label_distribution(labels: &Column) -> Option<LabelDistribution> {
    if labels.is_empty() {
        return None;
    }
    let mut counts: HashMap<LabelValue, usize> = HashMap::new();
    for value in labels {
        *counts.entry(render(value)).or_default() += 1;
    }
    let total = labels.len();
    let mut per_label: Vec<LabelShare> = counts
        .into_iter()
        .map(|(label, count)| LabelShare {
            label,
            count,
            share: count as f64 / total as f64,
        })
        .collect();
    per_label.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    let max_share = per_label.first().map_or(0.0, |share| share.share);
    let min_share = per_label.last().map_or(0.0, |share| share.share);
    Some(LabelDistribution {
        total,
        classes: per_label.len(),
        max_share,
        min_share,
        per_label,
    })
}

fn render(value: &Value) -> LabelValue {
    match value {
        Value::Text(text) => text.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_labels_have_no_distribution() {
        assert!(label_distribution(&Vec::new()).is_none());
    }

    #[test]
    fn distribution_sorts_by_count_then_label() {
        let labels: Column = ["major", "critical", "major", "blocker", "critical", "major"]
            .into_iter()
            .map(Value::from)
            .collect();
        let dist = label_distribution(&labels).unwrap();
        assert_eq!(dist.total, 6);
        assert_eq!(dist.classes, 3);
        let order: Vec<&str> = dist.per_label.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(order, vec!["major", "critical", "blocker"]);
        assert!((dist.max_share - 0.5).abs() < 1e-12);
        assert!((dist.min_share - 1.0 / 6.0).abs() < 1e-12);
    }
}
