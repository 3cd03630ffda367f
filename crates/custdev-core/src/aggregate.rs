//! Roll stored simulation results up into per-question, per-option totals.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Question, Segment, SimulationResult};

/// Totals for one question, options in definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResults {
    pub question_id: i64,
    pub question_text: String,
    pub options: Vec<OptionTotals>,
}

/// Totals for one option, with one breakdown entry per segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTotals {
    pub option_id: i64,
    pub option_text: String,
    pub total: u64,
    pub segment_breakdown: Vec<SegmentValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentValue {
    pub segment_id: i64,
    pub segment_name: String,
    pub value: u64,
}

impl OptionTotals {
    /// Value recorded for a segment, 0 when the segment has no entry.
    pub fn value_for(&self, segment_id: i64) -> u64 {
        self.segment_breakdown
            .iter()
            .find(|s| s.segment_id == segment_id)
            .map_or(0, |s| s.value)
    }
}

impl QuestionResults {
    /// Sum of option totals.
    pub fn total(&self) -> u64 {
        self.options.iter().map(|o| o.total).sum()
    }

    /// Sum of one segment's values across all options.
    pub fn segment_total(&self, segment_id: i64) -> u64 {
        self.options.iter().map(|o| o.value_for(segment_id)).sum()
    }
}

/// Aggregate raw results against a survey's questions and segments.
///
/// Every question and option appears in the output even with no results.
/// Every segment appears in every breakdown, with 0 where nothing was
/// recorded. Results that do not belong to a listed question/option are
/// ignored.
pub fn aggregate(
    questions: &[Question],
    segments: &[Segment],
    results: &[SimulationResult],
) -> Vec<QuestionResults> {
    let mut cells: HashMap<(i64, i64, i64), u64> = HashMap::new();
    for r in results {
        *cells
            .entry((r.question_id, r.option_id, r.segment_id))
            .or_default() += u64::from(r.value);
    }

    let mut option_totals: HashMap<(i64, i64), u64> = HashMap::new();
    for (&(question_id, option_id, _), &value) in &cells {
        *option_totals.entry((question_id, option_id)).or_default() += value;
    }

    questions
        .iter()
        .map(|question| QuestionResults {
            question_id: question.id,
            question_text: question.text.clone(),
            options: question
                .options
                .iter()
                .map(|option| OptionTotals {
                    option_id: option.id,
                    option_text: option.text.clone(),
                    total: option_totals
                        .get(&(question.id, option.id))
                        .copied()
                        .unwrap_or(0),
                    segment_breakdown: segments
                        .iter()
                        .map(|segment| SegmentValue {
                            segment_id: segment.id,
                            segment_name: segment.name.clone(),
                            value: cells
                                .get(&(question.id, option.id, segment.id))
                                .copied()
                                .unwrap_or(0),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}
