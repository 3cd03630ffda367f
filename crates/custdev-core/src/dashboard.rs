//! Derived dashboard views over aggregated results.

use serde::{Deserialize, Serialize};

use crate::aggregate::QuestionResults;
use crate::types::{Segment, Survey};

/// Survey header without its questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    pub id: i64,
    pub niche: String,
    pub title: String,
    pub created_at: String,
}

impl From<&Survey> for SurveySummary {
    fn from(survey: &Survey) -> Self {
        Self {
            id: survey.id,
            niche: survey.niche.clone(),
            title: survey.title.clone(),
            created_at: survey.created_at.clone(),
        }
    }
}

/// Everything the dashboard shows for one survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub survey: SurveySummary,
    pub segments: Vec<Segment>,
    pub results: Vec<QuestionResults>,
    pub insights: Vec<String>,
}

/// One segment's preference score for a question, 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentScore {
    pub segment_id: i64,
    pub label: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub question: String,
    pub scores: Vec<SegmentScore>,
}

impl Dashboard {
    pub fn new(
        survey: &Survey,
        segments: Vec<Segment>,
        results: Vec<QuestionResults>,
        insights: Vec<String>,
    ) -> Self {
        Self {
            survey: SurveySummary::from(survey),
            segments,
            results,
            insights,
        }
    }

    /// `(option text, total)` for the first question, empty when there are no questions.
    pub fn answer_share(&self) -> Vec<(String, u64)> {
        self.results
            .first()
            .map(|q| {
                q.options
                    .iter()
                    .map(|o| (o.option_text.clone(), o.total))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `(segment name, percentage)` in segment order.
    pub fn segment_weights(&self) -> Vec<(String, u32)> {
        self.segments
            .iter()
            .map(|s| (s.name.clone(), s.percentage))
            .collect()
    }

    /// See [`compare_segments`].
    pub fn compare(&self, selected: &[i64]) -> Vec<ComparisonRow> {
        compare_segments(&self.segments, &self.results, selected)
    }
}

/// Per-question share of respondents contributed by each segment, 0..=100.
///
/// For every question, each active segment scores
/// `round(segment sum / question total * 100)`. A question total of zero is
/// treated as one. An empty `selected` compares all segments; otherwise only
/// segments whose id is listed, in segment order.
pub fn compare_segments(
    segments: &[Segment],
    results: &[QuestionResults],
    selected: &[i64],
) -> Vec<ComparisonRow> {
    let active: Vec<&Segment> = if selected.is_empty() {
        segments.iter().collect()
    } else {
        segments.iter().filter(|s| selected.contains(&s.id)).collect()
    };

    results
        .iter()
        .map(|q| {
            let total = q.total().max(1) as f64;
            ComparisonRow {
                question: q.question_text.clone(),
                scores: active
                    .iter()
                    .map(|s| SegmentScore {
                        segment_id: s.id,
                        label: segment_label(s),
                        score: (q.segment_total(s.id) as f64 / total * 100.0).round() as u32,
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Display label for a segment, falling back to `Segment {id}` for blank names.
pub fn segment_label(segment: &Segment) -> String {
    if segment.name.trim().is_empty() {
        format!("Segment {}", segment.id)
    } else {
        segment.name.clone()
    }
}
