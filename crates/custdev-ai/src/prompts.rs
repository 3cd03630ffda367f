//! Prompt templates for the three generation steps.
//!
//! Every system prompt asks for raw JSON in a fixed envelope; the matching
//! reply types live in `generator`.

use custdev_core::{Question, QuestionResults, Segment, TOTAL_RESPONDENTS};

// ── Segments ──

pub const SEGMENTS_SYSTEM_PROMPT: &str = "\
Ты эксперт по customer development и сегментации аудитории.
Твоя задача - проанализировать нишу и вопросы опроса, чтобы создать реалистичные сегменты аудитории.

Верни ответ СТРОГО в формате JSON без дополнительного текста:
{
  \"segments\": [
    {
      \"name\": \"Название сегмента с возрастом\",
      \"percentage\": число_от_1_до_100,
      \"persona\": \"Подробное описание поведения, потребностей и характеристик сегмента\"
    }
  ]
}

Требования:
- Создай 3-5 сегментов
- Сумма percentage должна быть 100
- Названия сегментов должны включать возрастные группы
- Персоны должны быть детальными и реалистичными
- Учитывай специфику ниши при создании сегментов";

pub fn build_segments_prompt(niche: &str, questions: &[&str]) -> String {
    let numbered = questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {q}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Ниша: {niche}\n\
         \n\
         Вопросы опроса:\n\
         {numbered}\n\
         \n\
         Создай сегменты аудитории для этой ниши."
    )
}

// ── Responses ──

pub fn responses_system_prompt() -> String {
    format!(
        "\
Ты эксперт по анализу потребительского поведения.
Твоя задача - симулировать реалистичные ответы разных сегментов аудитории на вопросы опроса.

Верни ответ СТРОГО в формате JSON без дополнительного текста:
{{
  \"responses\": [
    {{
      \"questionId\": число,
      \"optionId\": число,
      \"segmentId\": число,
      \"value\": число_респондентов
    }}
  ]
}}

Правила:
- Учитывай персону каждого сегмента при распределении ответов
- Общее количество респондентов: {TOTAL_RESPONDENTS}
- Распредели респондентов пропорционально процентам сегментов
- Ответы должны логически соответствовать характеристикам сегмента"
    )
}

pub fn build_responses_prompt(segments: &[Segment], questions: &[Question]) -> String {
    let segment_lines = segments
        .iter()
        .map(|s| format!("{}. {} ({}%): {}", s.id, s.name, s.percentage, s.persona))
        .collect::<Vec<_>>()
        .join("\n");
    let question_blocks = questions
        .iter()
        .map(|q| {
            let mut block = format!("{}. {}", q.id, q.text);
            for option in &q.options {
                block.push_str(&format!("\n   {}. {}", option.id, option.text));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Сегменты:\n\
         {segment_lines}\n\
         \n\
         Вопросы и варианты ответов:\n\
         {question_blocks}\n\
         \n\
         Создай реалистичное распределение ответов."
    )
}

// ── Insights ──

pub const INSIGHTS_SYSTEM_PROMPT: &str = "\
Ты эксперт по customer development и анализу данных.
Проанализируй результаты опроса и создай ценные инсайты для бизнеса.

Верни ответ СТРОГО в формате JSON без дополнительного текста:
{
  \"insights\": [
    \"Инсайт 1\",
    \"Инсайт 2\",
    \"Инсайт 3\",
    \"Инсайт 4\"
  ]
}

Требования:
- 4-6 инсайтов
- Каждый инсайт должен быть конкретным и действенным
- Включай цифры и проценты
- Фокусируйся на бизнес-возможностях и рисках
- Давай рекомендации по продукту/маркетингу";

pub fn build_insights_prompt(niche: &str, title: &str, results: &[QuestionResults]) -> String {
    let blocks = results
        .iter()
        .map(|question| {
            let mut block = format!("Вопрос: {}", question.question_text);
            for option in &question.options {
                block.push_str(&format!("\n- {}: {} ответов", option.option_text, option.total));
                for seg in &option.segment_breakdown {
                    block.push_str(&format!("\n  {}: {}", seg.segment_name, seg.value));
                }
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Ниша: {niche}\n\
         Название опроса: {title}\n\
         \n\
         Результаты по сегментам:\n\
         {blocks}\n\
         \n\
         Создай инсайты для бизнеса."
    )
}
