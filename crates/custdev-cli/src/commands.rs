//! Subcommand handlers.

use std::path::Path;

use anyhow::{bail, Context as _};
use custdev_ai::{GlmClient, GlmConfig, Generator};
use custdev_core::{aggregate, results, Dashboard, NewSurvey};
use custdev_store::DuckStore;
use tracing::{info, warn};

use crate::display;

pub struct Context {
    store: DuckStore,
    generator: Generator,
    db_label: String,
}

impl Context {
    pub fn new(db: &Path, api_key: Option<String>, api_url: Option<String>) -> anyhow::Result<Self> {
        let store = if db.as_os_str() == ":memory:" {
            DuckStore::open()
        } else {
            DuckStore::open_persistent(db)
        }
        .with_context(|| format!("opening store at {}", db.display()))?;

        Ok(Self {
            store,
            generator: build_generator(api_key, api_url),
            db_label: db.display().to_string(),
        })
    }
}

fn build_generator(api_key: Option<String>, api_url: Option<String>) -> Generator {
    let Some(key) = api_key.filter(|k| !k.trim().is_empty()) else {
        info!("no API key, generation uses built-in fallbacks");
        return Generator::offline();
    };
    let mut config = GlmConfig::new(key);
    if let Some(url) = api_url {
        config = config.with_api_url(url);
    }
    match GlmClient::new(config) {
        Ok(client) => Generator::new(Box::new(client)),
        Err(e) => {
            warn!(error = %e, "could not build chat client, using built-in fallbacks");
            Generator::offline()
        }
    }
}

pub fn create(mut ctx: Context, file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading survey definition {}", file.display()))?;
    let survey: NewSurvey = serde_json::from_str(&raw)
        .with_context(|| format!("parsing survey definition {}", file.display()))?;
    if survey.questions.is_empty() {
        bail!("survey definition has no questions");
    }

    let id = ctx.store.create_survey(&survey)?;
    println!("Created survey {id}: {}", survey.title);
    Ok(())
}

pub async fn segment(mut ctx: Context, survey_id: i64, niche: Option<String>) -> anyhow::Result<()> {
    let survey = ctx.store.get_survey(survey_id)?;
    let niche = niche.unwrap_or_else(|| survey.niche.clone());

    let generated = ctx
        .generator
        .generate_segments(&niche, &survey.question_texts())
        .await;
    info!(survey_id, source = generated.source.as_str(), "segments ready");

    let segments = ctx.store.replace_segments(survey_id, &generated.value)?;
    println!("Audience for survey {survey_id}:");
    print!("{}", display::render_segments(&segments));
    Ok(())
}

pub async fn simulate(mut ctx: Context, survey_id: i64) -> anyhow::Result<()> {
    let survey = ctx.store.get_survey(survey_id)?;
    let segments = ctx.store.segments_for_survey(survey_id)?;
    if segments.is_empty() {
        bail!("survey {survey_id} has no segments; run `custdev segment --survey {survey_id}` first");
    }

    let generated = ctx
        .generator
        .generate_responses(&segments, &survey.questions)
        .await;
    info!(survey_id, source = generated.source.as_str(), "responses ready");

    let stored = ctx.store.replace_results(survey_id, &generated.value)?;
    let respondents: u64 = generated.value.iter().map(|r| u64::from(r.value)).sum();
    println!("Simulated {respondents} answers across {stored} cells for survey {survey_id}");
    Ok(())
}

pub async fn dashboard(ctx: Context, survey_id: i64, compare: &[i64]) -> anyhow::Result<()> {
    let survey = ctx.store.get_survey(survey_id)?;
    let segments = ctx.store.segments_for_survey(survey_id)?;
    let raw = ctx.store.results_for_survey(survey_id)?;
    if raw.is_empty() {
        bail!("survey {survey_id} has no results; run `custdev simulate --survey {survey_id}` first");
    }
    let aggregated = aggregate(&survey.questions, &segments, &raw);

    let insights = ctx
        .generator
        .generate_insights(&survey.niche, &survey.title, &aggregated)
        .await;
    info!(survey_id, source = insights.source.as_str(), "insights ready");

    let view = Dashboard::new(&survey, segments, aggregated, insights.value);
    print!("{}", display::render_dashboard(&view, compare));
    Ok(())
}

pub fn export_rows(ctx: Context, survey_id: i64) -> anyhow::Result<()> {
    let survey = ctx.store.get_survey(survey_id)?;
    let segments = ctx.store.segments_for_survey(survey_id)?;
    let raw = ctx.store.results_for_survey(survey_id)?;
    let aggregated = aggregate(&survey.questions, &segments, &raw);

    let batch = results::flatten_to_batch(&aggregated, &segments)?;
    info!(survey_id, rows = batch.num_rows(), "exporting flattened rows");
    arrow::util::pretty::print_batches(&[batch])?;
    Ok(())
}

pub fn health(ctx: Context) -> anyhow::Result<()> {
    let counts = ctx.store.table_counts().context("querying store")?;
    let (glm, mode) = if ctx.generator.is_configured() {
        ("configured", "api")
    } else {
        ("fallback", "mock")
    };

    println!("{:<12} ok ({})", "database", ctx.db_label);
    println!("{:<12} {glm}", "glm");
    println!("{:<12} {mode}", "mode");
    for (table, n) in counts {
        println!("  {:<10} {:>8}", table, n);
    }
    Ok(())
}
