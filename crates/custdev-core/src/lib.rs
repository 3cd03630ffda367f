pub mod aggregate;
pub mod dashboard;
mod error;
pub mod fallback;
pub mod persona;
pub mod schema;
pub mod simulator;
pub mod types;

pub use aggregate::{aggregate, OptionTotals, QuestionResults, SegmentValue};
pub use dashboard::{compare_segments, ComparisonRow, Dashboard, SegmentScore, SurveySummary};
pub use error::CoreError;
pub use persona::PersonaClass;
pub use schema::results;
pub use simulator::{simulate_responses, simulate_responses_with_rng, TOTAL_RESPONDENTS};
pub use types::{
    AnswerOption, NewQuestion, NewSurvey, Question, Segment, SegmentDraft, SimulationResult,
    Survey,
};
