//! Rule-based response allocator.
//!
//! Turns segment weights and persona classes into integer respondent counts
//! for every (segment, question, option) triple without consulting any model.
//! It is the fallback used when the generative backend is unavailable or
//! returns something unparseable.
//!
//! # Algorithm
//!
//! 1. Each segment gets a pool of `round(percentage / 100 * 1000)` respondents.
//! 2. For each question, the segment's [`PersonaClass`] yields a weight per
//!    option position (see [`distribution`]).
//! 3. Each option receives `round(pool * weight)` respondents.
//!
//! Counts are rounded independently and never renormalised, so a question's
//! counts for one segment only approximately sum to the segment's pool. The
//! price-sensitive shape for a single option keeps only half of the pool.

use rand::Rng;

use crate::persona::PersonaClass;
use crate::types::{Question, Segment, SimulationResult};

/// Size of the whole simulated audience, apportioned across segments.
pub const TOTAL_RESPONDENTS: u32 = 1000;

/// Amplitude of the uniform jitter applied in the balanced shape.
const BALANCED_JITTER: f64 = 0.2;

/// Number of simulated respondents in a segment of the given percentage.
pub fn segment_respondents(percentage: u32) -> u32 {
    (f64::from(percentage) / 100.0 * f64::from(TOTAL_RESPONDENTS)).round() as u32
}

/// Simulate responses with a thread-local random source.
pub fn simulate_responses(segments: &[Segment], questions: &[Question]) -> Vec<SimulationResult> {
    simulate_responses_with_rng(segments, questions, &mut rand::thread_rng())
}

/// Simulate responses with an injected random source.
///
/// Output order is segment, then question, then option, each in input order.
pub fn simulate_responses_with_rng<R: Rng + ?Sized>(
    segments: &[Segment],
    questions: &[Question],
    rng: &mut R,
) -> Vec<SimulationResult> {
    let capacity = segments.len() * questions.iter().map(|q| q.options.len()).sum::<usize>();
    let mut results = Vec::with_capacity(capacity);

    for segment in segments {
        let pool = f64::from(segment_respondents(segment.percentage));

        for question in questions {
            let weights = distribution(segment.class, question.options.len(), &mut *rng);

            for (option, weight) in question.options.iter().zip(weights) {
                results.push(SimulationResult {
                    question_id: question.id,
                    option_id: option.id,
                    segment_id: segment.id,
                    value: (pool * weight).round() as u32,
                });
            }
        }
    }

    results
}

/// Weight per option position for a persona class.
///
/// Only [`PersonaClass::Balanced`] draws from `rng`; every other class is a
/// fixed function of `option_count`.
pub fn distribution<R: Rng + ?Sized>(
    class: PersonaClass,
    option_count: usize,
    rng: &mut R,
) -> Vec<f64> {
    let n = option_count;
    match class {
        PersonaClass::PriceSensitive => (0..n).map(|i| price_sensitive(i, n)).collect(),
        PersonaClass::ConvenienceFocused => (0..n).map(|i| convenience_focused(i, n)).collect(),
        PersonaClass::InnovationFocused => (0..n).map(|i| innovation_focused(i, n)).collect(),
        PersonaClass::Balanced => balanced(n, rng),
    }
}

/// 0.5 on the first option, 0.3 on the second, 0.2 shared by the rest.
fn price_sensitive(i: usize, n: usize) -> f64 {
    match i {
        0 => 0.5,
        1 => 0.3,
        _ => 0.2 / (n - 2) as f64,
    }
}

/// 0.4 on the middle option, 0.3 on the last, 0.3 shared by the rest.
///
/// When the middle and last positions coincide (n <= 2) the last one's 0.3
/// applies, and with no remaining positions nothing is shared.
fn convenience_focused(i: usize, n: usize) -> f64 {
    let mid = n / 2;
    let last = n - 1;
    if i == last {
        0.3
    } else if i == mid {
        0.4
    } else if n > 2 {
        0.3 / (n - 2) as f64
    } else {
        0.0
    }
}

/// 0.6 on the last option, 0.4 shared by the rest.
fn innovation_focused(i: usize, n: usize) -> f64 {
    if i == n - 1 {
        0.6
    } else {
        0.4 / (n - 1) as f64
    }
}

/// Uniform weights with ±0.1 jitter each, clamped at zero and renormalised.
fn balanced<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let base = 1.0 / n as f64;
    let raw: Vec<f64> = (0..n)
        .map(|_| {
            let u: f64 = rng.gen_range(0.0..1.0);
            (base + (u - 0.5) * BALANCED_JITTER).max(0.0)
        })
        .collect();

    let sum: f64 = raw.iter().sum();
    if sum > 0.0 {
        raw.into_iter().map(|w| w / sum).collect()
    } else {
        vec![base; n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnswerOption;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPS: f64 = 1e-12;

    fn assert_weights(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!(
                (a - e).abs() < EPS,
                "weight[{i}]: expected {e}, got {a} (full: {actual:?})"
            );
        }
    }

    fn shape(class: PersonaClass, n: usize) -> Vec<f64> {
        distribution(class, n, &mut StdRng::seed_from_u64(0))
    }

    fn question(id: i64, option_ids: &[i64]) -> Question {
        Question {
            id,
            text: format!("q{id}"),
            kind: "multiple-choice".into(),
            options: option_ids
                .iter()
                .map(|&oid| AnswerOption {
                    id: oid,
                    text: format!("o{oid}"),
                })
                .collect(),
        }
    }

    // ── Pool sizes ──

    #[test]
    fn segment_pool_sizes() {
        assert_eq!(segment_respondents(100), 1000);
        assert_eq!(segment_respondents(25), 250);
        assert_eq!(segment_respondents(35), 350);
        assert_eq!(segment_respondents(0), 0);
    }

    // ── Shapes, n = 1..5 ──

    #[test]
    fn price_sensitive_shapes() {
        let c = PersonaClass::PriceSensitive;
        assert_weights(&shape(c, 1), &[0.5]);
        assert_weights(&shape(c, 2), &[0.5, 0.3]);
        assert_weights(&shape(c, 3), &[0.5, 0.3, 0.2]);
        assert_weights(&shape(c, 4), &[0.5, 0.3, 0.1, 0.1]);
        assert_weights(&shape(c, 5), &[0.5, 0.3, 0.2 / 3.0, 0.2 / 3.0, 0.2 / 3.0]);
    }

    #[test]
    fn convenience_focused_shapes() {
        let c = PersonaClass::ConvenienceFocused;
        assert_weights(&shape(c, 1), &[0.3]);
        assert_weights(&shape(c, 2), &[0.0, 0.3]);
        assert_weights(&shape(c, 3), &[0.3, 0.4, 0.3]);
        assert_weights(&shape(c, 4), &[0.15, 0.15, 0.4, 0.3]);
        assert_weights(&shape(c, 5), &[0.1, 0.1, 0.4, 0.1, 0.3]);
    }

    #[test]
    fn innovation_focused_shapes() {
        let c = PersonaClass::InnovationFocused;
        assert_weights(&shape(c, 1), &[0.6]);
        assert_weights(&shape(c, 2), &[0.4, 0.6]);
        assert_weights(&shape(c, 3), &[0.2, 0.2, 0.6]);
        assert_weights(&shape(c, 4), &[0.4 / 3.0, 0.4 / 3.0, 0.4 / 3.0, 0.6]);
        assert_weights(&shape(c, 5), &[0.1, 0.1, 0.1, 0.1, 0.6]);
    }

    #[test]
    fn balanced_shapes_are_normalised_and_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 1..=5 {
            for _ in 0..200 {
                let w = distribution(PersonaClass::Balanced, n, &mut rng);
                assert_eq!(w.len(), n);
                let sum: f64 = w.iter().sum();
                assert!((sum - 1.0).abs() < 1e-9, "n={n}: sum {sum}");
                assert!(w.iter().all(|&x| x >= 0.0), "n={n}: {w:?}");
            }
        }
        assert_weights(&shape(PersonaClass::Balanced, 1), &[1.0]);
    }

    #[test]
    fn balanced_stays_non_negative_with_many_options() {
        // With 20 options the base weight (0.05) is below the jitter amplitude.
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let w = distribution(PersonaClass::Balanced, 20, &mut rng);
            assert!(w.iter().all(|&x| x >= 0.0));
            assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn balanced_is_reproducible_with_fixed_seed() {
        let a = distribution(PersonaClass::Balanced, 4, &mut StdRng::seed_from_u64(99));
        let b = distribution(PersonaClass::Balanced, 4, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn zero_options_yield_empty_shape() {
        for class in [
            PersonaClass::PriceSensitive,
            PersonaClass::ConvenienceFocused,
            PersonaClass::InnovationFocused,
            PersonaClass::Balanced,
        ] {
            assert!(shape(class, 0).is_empty());
        }
    }

    // ── End-to-end allocation ──

    #[test]
    fn students_four_options_scenario() {
        let segments = vec![Segment::new(1, "Студенты 18-22", 100, "x")];
        let questions = vec![question(10, &[100, 101, 102, 103])];

        let results = simulate_responses(&segments, &questions);
        let expected = vec![
            SimulationResult { question_id: 10, option_id: 100, segment_id: 1, value: 500 },
            SimulationResult { question_id: 10, option_id: 101, segment_id: 1, value: 300 },
            SimulationResult { question_id: 10, option_id: 102, segment_id: 1, value: 100 },
            SimulationResult { question_id: 10, option_id: 103, segment_id: 1, value: 100 },
        ];
        assert_eq!(results, expected);
    }

    #[test]
    fn students_single_option_keeps_half_the_pool() {
        let segments = vec![Segment::new(1, "Студенты 18-22", 100, "x")];
        let questions = vec![question(10, &[100])];

        let results = simulate_responses(&segments, &questions);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, 500);
    }

    #[test]
    fn output_covers_every_triple_in_order() {
        let segments = vec![
            Segment::new(1, "Студенты", 25, "a"),
            Segment::new(2, "Молодые специалисты", 35, "b"),
            Segment::new(3, "Родители", 30, "c"),
        ];
        let questions = vec![question(10, &[100, 101, 102]), question(11, &[110, 111])];
        let mut rng = StdRng::seed_from_u64(1);

        let results = simulate_responses_with_rng(&segments, &questions, &mut rng);
        assert_eq!(results.len(), (3 + 2) * 3);

        let keys: Vec<(i64, i64, i64)> = results
            .iter()
            .map(|r| (r.segment_id, r.question_id, r.option_id))
            .collect();
        assert_eq!(&keys[..5], &[
            (1, 10, 100),
            (1, 10, 101),
            (1, 10, 102),
            (1, 11, 110),
            (1, 11, 111),
        ]);
        assert_eq!(keys[5], (2, 10, 100));
        assert_eq!(keys[14], (3, 11, 111));
    }

    #[test]
    fn zero_option_question_contributes_nothing() {
        let segments = vec![Segment::new(1, "Родители", 50, "x")];
        let questions = vec![question(10, &[]), question(11, &[110, 111, 112])];
        let results = simulate_responses(&segments, &questions);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.question_id == 11));
    }

    #[test]
    fn counts_roughly_conserve_pool() {
        let segments = vec![
            Segment::new(1, "Студенты", 25, "a"),
            Segment::new(2, "Молодые специалисты", 35, "b"),
            Segment::new(3, "Родители", 30, "c"),
            Segment::new(4, "Предприниматели", 10, "d"),
        ];
        let questions: Vec<Question> = (3i64..=6)
            .map(|n| question(n, &(0..n).map(|o| n * 100 + o).collect::<Vec<_>>()))
            .collect();
        let mut rng = StdRng::seed_from_u64(3);
        let results = simulate_responses_with_rng(&segments, &questions, &mut rng);

        for segment in &segments {
            let pool = i64::from(segment_respondents(segment.percentage));
            for q in &questions {
                let sum: i64 = results
                    .iter()
                    .filter(|r| r.segment_id == segment.id && r.question_id == q.id)
                    .map(|r| i64::from(r.value))
                    .sum();
                let tolerance = q.options.len() as i64;
                assert!(
                    (sum - pool).abs() <= tolerance,
                    "segment {} question {}: {sum} vs pool {pool}",
                    segment.id,
                    q.id
                );
            }
        }
    }

    #[test]
    fn deterministic_classes_ignore_rng() {
        let segments = vec![
            Segment::new(1, "Студенты", 40, "a"),
            Segment::new(2, "Родители", 40, "b"),
            Segment::new(3, "Предприниматели", 20, "c"),
        ];
        let questions = vec![question(10, &[100, 101, 102, 103, 104])];

        let a = simulate_responses_with_rng(&segments, &questions, &mut StdRng::seed_from_u64(1));
        let b = simulate_responses_with_rng(&segments, &questions, &mut StdRng::seed_from_u64(2));
        assert_eq!(a, b);
        assert_eq!(a, simulate_responses(&segments, &questions));
    }

    #[test]
    fn shaping_is_positional() {
        let segments = vec![Segment::new(1, "Предприниматели", 100, "x")];
        let forward = simulate_responses(&segments, &[question(10, &[100, 101, 102])]);
        let reversed = simulate_responses(&segments, &[question(10, &[102, 101, 100])]);

        assert_eq!(forward.last().unwrap().option_id, 102);
        assert_eq!(forward.last().unwrap().value, 600);
        assert_eq!(reversed.last().unwrap().option_id, 100);
        assert_eq!(reversed.last().unwrap().value, 600);
        assert_eq!(reversed[0].option_id, 102);
        assert_eq!(reversed[0].value, 200);
    }

    #[test]
    fn convenience_two_options_scenario() {
        let segments = vec![Segment::new(7, "Родители", 30, "x")];
        let results = simulate_responses(&segments, &[question(10, &[100, 101])]);
        assert_eq!(results[0].value, 0);
        assert_eq!(results[1].value, 90);
    }

    #[test]
    fn class_comes_from_segment_not_name() {
        // The allocator trusts the stored class even if the name was edited later.
        let mut segment = Segment::new(1, "Студенты", 100, "x");
        segment.name = "Предприниматели".into();
        let results = simulate_responses(&[segment], &[question(10, &[100, 101, 102])]);
        assert_eq!(results[0].value, 500);
    }
}
