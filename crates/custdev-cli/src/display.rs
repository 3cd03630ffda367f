//! Text rendering for segments and the survey dashboard.
//!
//! Everything renders into a `String` so callers decide where it goes.

use std::fmt::Write;

use custdev_core::dashboard::segment_label;
use custdev_core::{ComparisonRow, Dashboard, Segment};

const LABEL_WIDTH: usize = 30;
const BAR_WIDTH: usize = 40;

// ── Public API ──

/// One line per segment with its share and class, persona indented below.
pub fn render_segments(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        let _ = writeln!(
            out,
            "  {:<LABEL_WIDTH$} {:>3}%  [{}]",
            segment_label(seg),
            seg.percentage,
            seg.class
        );
        if !seg.persona.trim().is_empty() {
            let _ = writeln!(out, "      {}", seg.persona);
        }
    }
    out
}

/// Full dashboard card: header, audience, answer share, per-question
/// breakdown, segment comparison and insights.
pub fn render_dashboard(dashboard: &Dashboard, compare: &[i64]) -> String {
    let mut out = String::new();
    let survey = &dashboard.survey;

    let _ = writeln!(out, "=== {} ===", survey.title);
    let _ = writeln!(out, "  {:<12} {}", "niche", survey.niche);
    let _ = writeln!(out, "  {:<12} {}", "created_at", survey.created_at);
    let _ = writeln!(out);

    let _ = writeln!(out, "Audience");
    for (name, pct) in dashboard.segment_weights() {
        let _ = writeln!(out, "  {:<LABEL_WIDTH$} {:>3}%", name, pct);
    }
    let _ = writeln!(out);

    let share = dashboard.answer_share();
    if !share.is_empty() {
        let _ = writeln!(out, "Answer share");
        out.push_str(&render_bars(&share));
        let _ = writeln!(out);
    }

    render_results(&mut out, dashboard);
    render_comparison(&mut out, &dashboard.compare(compare));

    if !dashboard.insights.is_empty() {
        let _ = writeln!(out, "Insights");
        for (i, insight) in dashboard.insights.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, insight);
        }
    }
    out
}

// ── Sections ──

fn render_bars(share: &[(String, u64)]) -> String {
    let total: u64 = share.iter().map(|(_, v)| v).sum::<u64>().max(1);
    let mut out = String::new();
    for (label, value) in share {
        let pct = *value as f64 / total as f64 * 100.0;
        let filled = (pct / 100.0 * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "  {:<LABEL_WIDTH$} {:<BAR_WIDTH$} {:>5.1}% ({})",
            label,
            "#".repeat(filled),
            pct,
            value
        );
    }
    out
}

fn render_results(out: &mut String, dashboard: &Dashboard) {
    for question in &dashboard.results {
        let _ = writeln!(out, "{}", question.question_text);
        for option in &question.options {
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} {:>6}", option.option_text, option.total);
            for seg in &option.segment_breakdown {
                if seg.value > 0 {
                    let _ = writeln!(out, "    {:<28} {:>6}", seg.segment_name, seg.value);
                }
            }
        }
        let _ = writeln!(out);
    }
}

fn render_comparison(out: &mut String, rows: &[ComparisonRow]) {
    if rows.iter().all(|r| r.scores.is_empty()) {
        return;
    }
    let _ = writeln!(out, "Segment comparison (% of respondents)");
    for row in rows {
        let _ = writeln!(out, "  {}", row.question);
        for score in &row.scores {
            let _ = writeln!(out, "    {:<28} {:>3}", score.label, score.score);
        }
    }
    let _ = writeln!(out);
}
