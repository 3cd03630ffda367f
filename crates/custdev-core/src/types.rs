//! Survey, audience and result types shared by the store, the AI layer and the CLI.

use serde::{Deserialize, Serialize};

use crate::persona::PersonaClass;

/// Question kind used when a definition does not name one.
pub const DEFAULT_QUESTION_KIND: &str = "multiple-choice";

/// A persisted survey with its questions in definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: i64,
    pub niche: String,
    pub title: String,
    /// RFC 3339 timestamp string.
    pub created_at: String,
    pub questions: Vec<Question>,
}

/// A question with its answer options. Option order matters to the allocator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub text: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub options: Vec<AnswerOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: i64,
    pub text: String,
}

/// A persisted audience segment.
///
/// `class` is fixed when the segment is created and travels with it, so the
/// allocator never has to look at the name again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: i64,
    pub name: String,
    pub percentage: u32,
    pub persona: String,
    pub class: PersonaClass,
}

impl Segment {
    /// Build a segment, classifying it from its name.
    pub fn new(id: i64, name: impl Into<String>, percentage: u32, persona: impl Into<String>) -> Self {
        let name = name.into();
        let class = PersonaClass::classify(&name);
        Self {
            id,
            name,
            percentage,
            persona: persona.into(),
            class,
        }
    }
}

/// A segment as proposed by the generator, before it has an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDraft {
    pub name: String,
    pub percentage: u32,
    pub persona: String,
}

/// Simulated respondent count for one (question, option, segment) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub question_id: i64,
    pub option_id: i64,
    pub segment_id: i64,
    pub value: u32,
}

/// Survey definition as submitted by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSurvey {
    pub niche: String,
    pub title: String,
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub text: String,
    #[serde(default = "default_kind", alias = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl Survey {
    /// Question texts in order, skipping blanks.
    pub fn question_texts(&self) -> Vec<&str> {
        self.questions
            .iter()
            .map(|q| q.text.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect()
    }
}

fn default_kind() -> String {
    DEFAULT_QUESTION_KIND.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_result_uses_camel_case() {
        let r = SimulationResult {
            question_id: 10,
            option_id: 100,
            segment_id: 1,
            value: 500,
        };
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json["questionId"], 10);
        assert_eq!(json["optionId"], 100);
        assert_eq!(json["segmentId"], 1);
        assert_eq!(json["value"], 500);
    }

    #[test]
    fn new_survey_defaults_kind_and_accepts_type_alias() {
        let json = r#"{
            "niche": "Онлайн-курсы",
            "title": "Ценообразование",
            "questions": [
                { "text": "Сколько готовы платить?", "options": ["0", "500", "1000"] },
                { "text": "Формат?", "type": "single-choice", "options": ["видео", "текст"] }
            ]
        }"#;
        let survey: NewSurvey = serde_json::from_str(json).unwrap();
        assert_eq!(survey.questions[0].kind, DEFAULT_QUESTION_KIND);
        assert_eq!(survey.questions[1].kind, "single-choice");
        assert_eq!(survey.questions[0].options.len(), 3);
    }

    #[test]
    fn segment_new_classifies_from_name() {
        let s = Segment::new(1, "Родители 29–40", 30, "Ограничены временем");
        assert_eq!(s.class, PersonaClass::ConvenienceFocused);
    }

    #[test]
    fn question_texts_skip_blank() {
        let survey = Survey {
            id: 1,
            niche: "n".into(),
            title: "t".into(),
            created_at: "2026-01-01T00:00:00Z".into(),
            questions: vec![
                Question {
                    id: 1,
                    text: "first".into(),
                    kind: DEFAULT_QUESTION_KIND.into(),
                    options: vec![],
                },
                Question {
                    id: 2,
                    text: "  ".into(),
                    kind: DEFAULT_QUESTION_KIND.into(),
                    options: vec![],
                },
            ],
        };
        assert_eq!(survey.question_texts(), vec!["first"]);
    }
}
