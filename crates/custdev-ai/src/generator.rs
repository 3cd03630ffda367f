//! Generate-with-fallback operations.
//!
//! Each operation asks the chat backend first and falls back to the built-in
//! data (or the rules-based allocator) on any failure, so callers always get a
//! usable value. The [`Source`] tells them which path produced it.

use std::collections::HashSet;

use custdev_core::{
    fallback, simulate_responses, Question, QuestionResults, Segment, SegmentDraft,
    SimulationResult,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use crate::client::{AiError, ChatClient, ChatMessage};
use crate::prompts;

/// Niche used in prompts when the survey has none.
pub const DEFAULT_NICHE: &str = "Без ниши";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Model,
    Fallback,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Generated<T> {
    fn model(value: T) -> Self {
        Self {
            value,
            source: Source::Model,
        }
    }

    fn fallback(value: T) -> Self {
        Self {
            value,
            source: Source::Fallback,
        }
    }
}

#[derive(Deserialize)]
struct SegmentsReply {
    segments: Vec<SegmentDraft>,
}

#[derive(Deserialize)]
struct ResponsesReply {
    responses: Vec<SimulationResult>,
}

#[derive(Deserialize)]
struct InsightsReply {
    insights: Vec<String>,
}

pub struct Generator {
    client: Option<Box<dyn ChatClient>>,
}

impl Generator {
    pub fn new(client: Box<dyn ChatClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// A generator that always uses the built-in fallbacks.
    pub fn offline() -> Self {
        Self { client: None }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn generate_segments(
        &self,
        niche: &str,
        questions: &[&str],
    ) -> Generated<Vec<SegmentDraft>> {
        let niche = if niche.trim().is_empty() {
            DEFAULT_NICHE
        } else {
            niche
        };
        let user = prompts::build_segments_prompt(niche, questions);
        let reply = self
            .ask::<SegmentsReply>(prompts::SEGMENTS_SYSTEM_PROMPT, user)
            .await
            .and_then(|r| validate_segments(r.segments));

        match reply {
            Ok(segments) => {
                info!(count = segments.len(), "segments generated by model");
                Generated::model(segments)
            }
            Err(e) => {
                warn!(error = %e, "segment generation failed, using built-in audience");
                Generated::fallback(fallback::segments())
            }
        }
    }

    pub async fn generate_responses(
        &self,
        segments: &[Segment],
        questions: &[Question],
    ) -> Generated<Vec<SimulationResult>> {
        let user = prompts::build_responses_prompt(segments, questions);
        let reply = self
            .ask::<ResponsesReply>(&prompts::responses_system_prompt(), user)
            .await
            .and_then(|r| validate_responses(r.responses, segments, questions));

        match reply {
            Ok(results) => {
                info!(count = results.len(), "responses generated by model");
                Generated::model(results)
            }
            Err(e) => {
                warn!(error = %e, "response generation failed, using allocator");
                Generated::fallback(simulate_responses(segments, questions))
            }
        }
    }

    pub async fn generate_insights(
        &self,
        niche: &str,
        title: &str,
        results: &[QuestionResults],
    ) -> Generated<Vec<String>> {
        let niche = if niche.trim().is_empty() {
            DEFAULT_NICHE
        } else {
            niche
        };
        let user = prompts::build_insights_prompt(niche, title, results);
        let reply = self
            .ask::<InsightsReply>(prompts::INSIGHTS_SYSTEM_PROMPT, user)
            .await
            .and_then(|r| validate_insights(r.insights));

        match reply {
            Ok(insights) => {
                info!(count = insights.len(), "insights generated by model");
                Generated::model(insights)
            }
            Err(e) => {
                warn!(error = %e, "insight generation failed, using built-in insights");
                Generated::fallback(fallback::insights())
            }
        }
    }

    async fn ask<T: DeserializeOwned>(&self, system: &str, user: String) -> Result<T, AiError> {
        let client = self.client.as_ref().ok_or(AiError::NotConfigured)?;
        let messages = [ChatMessage::system(system), ChatMessage::user(user)];
        let reply = client.complete(&messages).await?;
        Ok(serde_json::from_str(extract_json(&reply))?)
    }
}

/// Strip an optional markdown code fence around a JSON reply.
pub fn extract_json(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn validate_segments(segments: Vec<SegmentDraft>) -> Result<Vec<SegmentDraft>, AiError> {
    if segments.is_empty() {
        return Err(AiError::Invalid("no segments".into()));
    }
    if let Some(bad) = segments
        .iter()
        .find(|s| s.name.trim().is_empty() || s.percentage > 100)
    {
        return Err(AiError::Invalid(format!(
            "segment {:?} has percentage {}",
            bad.name, bad.percentage
        )));
    }
    Ok(segments)
}

fn validate_responses(
    responses: Vec<SimulationResult>,
    segments: &[Segment],
    questions: &[Question],
) -> Result<Vec<SimulationResult>, AiError> {
    if responses.is_empty() {
        return Err(AiError::Invalid("no responses".into()));
    }
    let segment_ids: HashSet<i64> = segments.iter().map(|s| s.id).collect();
    let cells: HashSet<(i64, i64)> = questions
        .iter()
        .flat_map(|q| q.options.iter().map(move |o| (q.id, o.id)))
        .collect();
    if let Some(bad) = responses.iter().find(|r| {
        !segment_ids.contains(&r.segment_id) || !cells.contains(&(r.question_id, r.option_id))
    }) {
        return Err(AiError::Invalid(format!(
            "unknown triple question={} option={} segment={}",
            bad.question_id, bad.option_id, bad.segment_id
        )));
    }
    Ok(responses)
}

fn validate_insights(insights: Vec<String>) -> Result<Vec<String>, AiError> {
    let insights: Vec<String> = insights
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if insights.is_empty() {
        return Err(AiError::Invalid("no insights".into()));
    }
    Ok(insights)
}
