//! DuckDB storage for survey definitions, audience segments and simulated results.

use std::collections::HashMap;
use std::path::Path;

use custdev_core::{
    AnswerOption, NewSurvey, PersonaClass, Question, Segment, SegmentDraft, SimulationResult,
    Survey,
};
use duckdb::{Connection, params};
use tracing::info;

use crate::StoreError;

/// Tables in creation order; each id comes from its own sequence.
const SCHEMA: &str = "
CREATE SEQUENCE IF NOT EXISTS surveys_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS questions_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS options_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS segments_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS results_id_seq START 1;

CREATE TABLE IF NOT EXISTS surveys (
    id          BIGINT PRIMARY KEY DEFAULT nextval('surveys_id_seq'),
    niche       VARCHAR NOT NULL,
    title       VARCHAR NOT NULL,
    created_at  VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS questions (
    id          BIGINT PRIMARY KEY DEFAULT nextval('questions_id_seq'),
    survey_id   BIGINT NOT NULL,
    text        VARCHAR NOT NULL,
    kind        VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS options (
    id          BIGINT PRIMARY KEY DEFAULT nextval('options_id_seq'),
    question_id BIGINT NOT NULL,
    text        VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS segments (
    id            BIGINT PRIMARY KEY DEFAULT nextval('segments_id_seq'),
    survey_id     BIGINT NOT NULL,
    name          VARCHAR NOT NULL,
    percentage    BIGINT NOT NULL,
    persona       VARCHAR NOT NULL,
    persona_class VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS results (
    id          BIGINT PRIMARY KEY DEFAULT nextval('results_id_seq'),
    question_id BIGINT NOT NULL,
    option_id   BIGINT NOT NULL,
    segment_id  BIGINT NOT NULL,
    value       BIGINT NOT NULL
);
";

/// Every table the store owns, in dependency order.
pub const TABLES: &[&str] = &["surveys", "questions", "options", "segments", "results"];

/// DuckDB store for the survey lifecycle: definition, audience, results.
///
/// Supports both in-memory (ephemeral) and persistent (file-backed) modes.
/// Both constructors create any missing tables, so a fresh file is usable
/// immediately and an existing one is opened as-is.
pub struct DuckStore {
    conn: Connection,
}

impl DuckStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open or create a persistent DuckDB database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        info!(path = %path.display(), "opened survey store");
        Ok(store)
    }

    /// Create sequences and tables that do not exist yet.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ── Surveys ──

    /// Persist a survey definition with its questions and options.
    ///
    /// Returns the new survey id.
    pub fn create_survey(&mut self, survey: &NewSurvey) -> Result<i64, StoreError> {
        let created_at = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        let survey_id: i64 = tx.query_row(
            "INSERT INTO surveys (niche, title, created_at) VALUES (?, ?, ?) RETURNING id",
            params![survey.niche, survey.title, created_at],
            |row| row.get(0),
        )?;

        for question in &survey.questions {
            let question_id: i64 = tx.query_row(
                "INSERT INTO questions (survey_id, text, kind) VALUES (?, ?, ?) RETURNING id",
                params![survey_id, question.text, question.kind],
                |row| row.get(0),
            )?;
            for option in &question.options {
                tx.execute(
                    "INSERT INTO options (question_id, text) VALUES (?, ?)",
                    params![question_id, option],
                )?;
            }
        }

        tx.commit()?;
        info!(
            survey_id,
            questions = survey.questions.len(),
            "created survey"
        );
        Ok(survey_id)
    }

    /// Fetch a survey with its questions and options in insertion order.
    pub fn get_survey(&self, survey_id: i64) -> Result<Survey, StoreError> {
        let header = self.conn.query_row(
            "SELECT niche, title, created_at FROM surveys WHERE id = ?",
            [survey_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        );
        let (niche, title, created_at) = match header {
            Ok(h) => h,
            Err(duckdb::Error::QueryReturnedNoRows) => {
                return Err(StoreError::SurveyNotFound(survey_id));
            }
            Err(e) => return Err(e.into()),
        };

        let mut options: HashMap<i64, Vec<AnswerOption>> = HashMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT o.question_id, o.id, o.text
             FROM options o JOIN questions q ON o.question_id = q.id
             WHERE q.survey_id = ?
             ORDER BY o.id",
        )?;
        let rows = stmt.query_map([survey_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                AnswerOption {
                    id: row.get(1)?,
                    text: row.get(2)?,
                },
            ))
        })?;
        for row in rows {
            let (question_id, option) = row?;
            options.entry(question_id).or_default().push(option);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id, text, kind FROM questions WHERE survey_id = ? ORDER BY id")?;
        let questions = stmt
            .query_map([survey_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .map(|row| {
                let (id, text, kind) = row?;
                Ok(Question {
                    id,
                    text,
                    kind,
                    options: options.remove(&id).unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Survey {
            id: survey_id,
            niche,
            title,
            created_at,
            questions,
        })
    }

    // ── Segments ──

    /// Replace a survey's audience with freshly generated segments.
    ///
    /// Results that referenced the old segments are removed first. Each
    /// segment is classified once here and its class stored alongside it.
    pub fn replace_segments(
        &mut self,
        survey_id: i64,
        drafts: &[SegmentDraft],
    ) -> Result<Vec<Segment>, StoreError> {
        self.ensure_survey(survey_id)?;
        let tx = self.conn.transaction()?;

        let removed_results = tx.execute(
            "DELETE FROM results WHERE segment_id IN (SELECT id FROM segments WHERE survey_id = ?)",
            [survey_id],
        )?;
        tx.execute("DELETE FROM segments WHERE survey_id = ?", [survey_id])?;

        let mut segments = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let class = PersonaClass::classify(&draft.name);
            let id: i64 = tx.query_row(
                "INSERT INTO segments (survey_id, name, percentage, persona, persona_class)
                 VALUES (?, ?, ?, ?, ?) RETURNING id",
                params![
                    survey_id,
                    draft.name,
                    i64::from(draft.percentage),
                    draft.persona,
                    class.as_str()
                ],
                |row| row.get(0),
            )?;
            segments.push(Segment {
                id,
                name: draft.name.clone(),
                percentage: draft.percentage,
                persona: draft.persona.clone(),
                class,
            });
        }

        tx.commit()?;
        info!(
            survey_id,
            count = segments.len(),
            removed_results,
            "stored segments"
        );
        Ok(segments)
    }

    /// Segments of a survey in insertion order.
    pub fn segments_for_survey(&self, survey_id: i64) -> Result<Vec<Segment>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, percentage, persona, persona_class
             FROM segments WHERE survey_id = ? ORDER BY id",
        )?;
        let rows = stmt.query_map([survey_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let segments = rows
            .map(|row| {
                let (id, name, percentage, persona, class) = row?;
                Ok(Segment {
                    id,
                    name,
                    percentage: to_u32(percentage, "percentage")?,
                    persona,
                    class: class.parse()?,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        Ok(segments)
    }

    // ── Results ──

    /// Replace all simulated results for a survey.
    ///
    /// Returns the number of rows inserted.
    pub fn replace_results(
        &mut self,
        survey_id: i64,
        results: &[SimulationResult],
    ) -> Result<usize, StoreError> {
        self.ensure_survey(survey_id)?;
        let tx = self.conn.transaction()?;

        let removed = tx.execute(
            "DELETE FROM results WHERE question_id IN (SELECT id FROM questions WHERE survey_id = ?)",
            [survey_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO results (question_id, option_id, segment_id, value) VALUES (?, ?, ?, ?)",
            )?;
            for r in results {
                stmt.execute(params![
                    r.question_id,
                    r.option_id,
                    r.segment_id,
                    i64::from(r.value)
                ])?;
            }
        }

        tx.commit()?;
        info!(
            survey_id,
            inserted = results.len(),
            removed,
            "stored simulation results"
        );
        Ok(results.len())
    }

    /// All stored results for a survey's questions.
    pub fn results_for_survey(&self, survey_id: i64) -> Result<Vec<SimulationResult>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT r.question_id, r.option_id, r.segment_id, r.value
             FROM results r JOIN questions q ON r.question_id = q.id
             WHERE q.survey_id = ?
             ORDER BY r.id",
        )?;
        let rows = stmt.query_map([survey_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let results = rows
            .map(|row| {
                let (question_id, option_id, segment_id, value) = row?;
                Ok(SimulationResult {
                    question_id,
                    option_id,
                    segment_id,
                    value: to_u32(value, "value")?,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        Ok(results)
    }

    // ── Counts ──

    /// Row count per table, in [`TABLES`] order.
    pub fn table_counts(&self) -> Result<Vec<(&'static str, usize)>, StoreError> {
        TABLES
            .iter()
            .map(|&table| Ok((table, self.count_table(table)?)))
            .collect()
    }

    fn count_table(&self, table: &str) -> Result<usize, StoreError> {
        let sql = format!("SELECT count(*)::BIGINT AS cnt FROM {table}");
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| StoreError::Other(format!("negative count in {table}")))
    }

    fn ensure_survey(&self, survey_id: i64) -> Result<(), StoreError> {
        let exists: i64 = self.conn.query_row(
            "SELECT count(*)::BIGINT FROM surveys WHERE id = ?",
            [survey_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(StoreError::SurveyNotFound(survey_id));
        }
        Ok(())
    }
}

fn to_u32(value: i64, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Other(format!("{column} out of range: {value}")))
}
