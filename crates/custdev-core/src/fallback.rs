//! Built-in audience and insights used when the generative backend is unavailable.

use crate::types::SegmentDraft;

const SEGMENTS: &[(&str, u32, &str)] = &[
    (
        "Студенты 18–22",
        25,
        "Низкий доход, высокая digital-активность, ищут бесплатные или дешевые решения",
    ),
    (
        "Молодые специалисты 23–28",
        35,
        "Начало карьеры, ищут value-for-money, готовы инвестировать в развитие",
    ),
    (
        "Родители 29–40",
        30,
        "Ограничено временем, готовы платить за удобство и качество",
    ),
    (
        "Предприниматели 25–45",
        10,
        "Риск-аппетит, ранние адоптеры, ищут инновационные решения",
    ),
];

const INSIGHTS: &[&str] = &[
    "Основная аудитория (35%) - молодые специалисты, которые ценят соотношение цена-качество",
    "Студенческий сегмент (25%) чувствителен к цене и предпочитает бесплатные пробные версии",
    "Родители готовы платить премиум за удобство использования и экономию времени",
    "Предпринимательский сегмент, хоть и небольшой (10%), может стать источником высокой прибыли",
];

/// Four-segment audience covering every persona class.
pub fn segments() -> Vec<SegmentDraft> {
    SEGMENTS
        .iter()
        .map(|&(name, percentage, persona)| SegmentDraft {
            name: name.to_string(),
            percentage,
            persona: persona.to_string(),
        })
        .collect()
}

pub fn insights() -> Vec<String> {
    INSIGHTS.iter().map(|s| s.to_string()).collect()
}
