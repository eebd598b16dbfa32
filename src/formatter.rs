//! Turns a computed answer into a renderable question of a given style.

use itertools::Itertools;

use crate::generator::{AnswerValue, GeneratedQuestionResult};
use crate::quiz::QuestionStyle;
use crate::rng::QuestionRng;
use crate::util::format_number;

pub const OPTION_COUNT: usize = 4;
const MULTIPLIER_RANGE: (f64, f64) = (0.7, 1.3);
const MIN_MULTIPLIER_GAP: f64 = 0.1;
const FALSE_MULTIPLIER_RANGE: (f64, f64) = (1.2, 1.5);
// non-finite values never produce new strings; stop rather than spin
const MAX_FILL_STEPS: u32 = 64;

pub const TRUE_LABEL: &str = "True";
pub const FALSE_LABEL: &str = "False";

/// Canonical text of a computed value (3 decimals)
pub fn canonical_answer(value: AnswerValue) -> String {
    match value {
        AnswerValue::Number(v) => format_number(v, 3),
        AnswerValue::Sentinel(s) => s.to_string(),
    }
}

/// Display text of a computed value (2 decimals)
pub fn display_answer(value: AnswerValue) -> String {
    match value {
        AnswerValue::Number(v) => format_number(v, 2),
        AnswerValue::Sentinel(s) => s.to_string(),
    }
}

/// One strategy per question style
pub trait QuestionFormatter {
    fn format(&self, base: &str, value: AnswerValue, rng: &mut QuestionRng) -> GeneratedQuestionResult;
}

/// Four options: the answer plus perturbed distractors, shuffled
pub struct MultipleChoiceFormatter {
    pub options: Option<Vec<String>>,
}

impl MultipleChoiceFormatter {
    fn distractor_multipliers(rng: &mut QuestionRng) -> Vec<f64> {
        let mut multipliers = vec![1.0];
        while multipliers.len() < OPTION_COUNT {
            let m = rng.in_range(MULTIPLIER_RANGE.0, MULTIPLIER_RANGE.1);
            if !multipliers
                .iter()
                .any(|existing| (existing - m).abs() < MIN_MULTIPLIER_GAP)
            {
                multipliers.push(m);
            }
        }
        multipliers
    }

    fn numeric_options(value: f64, rng: &mut QuestionRng) -> Vec<String> {
        let mut options: Vec<String> = Self::distractor_multipliers(rng)
            .into_iter()
            .map(|m| format_number(value * m, 2))
            .unique()
            .collect();

        // tiny values collapse after rounding; step away from the answer instead
        for step in 1..=MAX_FILL_STEPS {
            if options.len() >= OPTION_COUNT {
                break;
            }
            let candidate = format_number(value + 0.01 * step as f64, 2);
            if !options.contains(&candidate) {
                options.push(candidate);
            }
        }
        options
    }

    fn sentinel_options(sentinel: &str, rng: &mut QuestionRng) -> Vec<String> {
        let mut options = vec![sentinel.to_string()];
        while options.len() < OPTION_COUNT {
            let angle = format_number(rng.in_range(5.0, 85.0), 2);
            if !options.contains(&angle) {
                options.push(angle);
            }
        }
        options
    }
}

impl QuestionFormatter for MultipleChoiceFormatter {
    fn format(&self, base: &str, value: AnswerValue, rng: &mut QuestionRng) -> GeneratedQuestionResult {
        let correct_display = display_answer(value);

        let mut options = match &self.options {
            Some(explicit) => explicit.clone(),
            None => {
                let mut synthesized = match value {
                    AnswerValue::Number(v) => Self::numeric_options(v, rng),
                    AnswerValue::Sentinel(s) => Self::sentinel_options(s, rng),
                };
                rng.shuffle(&mut synthesized);
                synthesized
            }
        };

        if !options.contains(&correct_display) && !options.is_empty() {
            let idx = rng.index(options.len());
            options[idx] = correct_display.clone();
        }
        let correct_option = options.iter().position(|o| *o == correct_display);

        GeneratedQuestionResult {
            prompt: format!("{base}\nSelect the correct answer:"),
            style: QuestionStyle::MultipleChoice,
            options: Some(options),
            correct_answer: canonical_answer(value),
            correct_option,
            explanation: None,
        }
    }
}

pub struct FreeResponseFormatter;

impl QuestionFormatter for FreeResponseFormatter {
    fn format(&self, base: &str, value: AnswerValue, _rng: &mut QuestionRng) -> GeneratedQuestionResult {
        GeneratedQuestionResult {
            prompt: format!("{base}\nProvide your answer with appropriate units:"),
            style: QuestionStyle::FreeResponse,
            options: None,
            correct_answer: canonical_answer(value),
            correct_option: None,
            explanation: None,
        }
    }
}

/// Restates the answer or a perturbed value and asks whether it holds
pub struct TrueFalseFormatter;

impl TrueFalseFormatter {
    fn false_statement(value: AnswerValue, rng: &mut QuestionRng) -> String {
        match value {
            AnswerValue::Number(v) => {
                let m = rng.in_range(FALSE_MULTIPLIER_RANGE.0, FALSE_MULTIPLIER_RANGE.1);
                let scaled = format_number(v * m, 2);
                if scaled != format_number(v, 2) {
                    scaled
                } else {
                    // zero (or near-zero) values survive scaling; shift instead
                    format_number(v + m, 2)
                }
            }
            AnswerValue::Sentinel(_) => format!("{}°", format_number(rng.in_range(5.0, 85.0), 2)),
        }
    }
}

impl QuestionFormatter for TrueFalseFormatter {
    fn format(&self, base: &str, value: AnswerValue, rng: &mut QuestionRng) -> GeneratedQuestionResult {
        let is_true = rng.chance(0.5);
        let stated = if is_true {
            display_answer(value)
        } else {
            Self::false_statement(value, rng)
        };

        GeneratedQuestionResult {
            prompt: format!("{base}\nIs this statement true or false: The answer is {stated}"),
            style: QuestionStyle::TrueFalse,
            options: None,
            correct_answer: if is_true { TRUE_LABEL } else { FALSE_LABEL }.to_string(),
            correct_option: None,
            explanation: None,
        }
    }
}

/// Format `value` in the requested style; explicit options only apply to multiple choice
pub fn format_question(
    base: &str,
    value: AnswerValue,
    style: QuestionStyle,
    options: Option<Vec<String>>,
    rng: &mut QuestionRng,
) -> GeneratedQuestionResult {
    let formatter: Box<dyn QuestionFormatter> = match style {
        QuestionStyle::MultipleChoice => Box::new(MultipleChoiceFormatter { options }),
        QuestionStyle::FreeResponse => Box::new(FreeResponseFormatter),
        QuestionStyle::TrueFalse => Box::new(TrueFalseFormatter),
    };
    formatter.format(base, value, rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(value: f64, seed: u64) -> GeneratedQuestionResult {
        let mut rng = QuestionRng::from_seed(seed);
        format_question("Q", AnswerValue::Number(value), QuestionStyle::MultipleChoice, None, &mut rng)
    }

    #[test]
    fn multiple_choice_has_four_distinct_options_with_answer() {
        for seed in 0..200 {
            let result = mc(41.0362, seed);
            let options = result.options.clone().unwrap();
            assert_eq!(options.len(), OPTION_COUNT);
            assert!(options.iter().all_unique(), "seed {seed}: {options:?}");
            assert!(options.contains(&"41.04".to_string()));
            assert_eq!(result.correct_answer, "41.036");
            assert_eq!(options[result.correct_option.unwrap()], "41.04");
        }
    }

    #[test]
    fn tiny_values_still_get_distinct_options() {
        for seed in 0..50 {
            let options = mc(0.001, seed).options.unwrap();
            assert_eq!(options.len(), OPTION_COUNT);
            assert!(options.iter().all_unique());
            assert!(options.contains(&"0".to_string()));
        }
    }

    #[test]
    fn non_finite_value_returns_instead_of_spinning() {
        let result = mc(f64::INFINITY, 1);
        assert!(result.options.unwrap().len() < OPTION_COUNT);
    }

    #[test]
    fn same_seed_same_option_set() {
        let mut a = mc(12.5, 5).options.unwrap();
        let mut b = mc(12.5, 5).options.unwrap();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn distractors_are_within_thirty_percent() {
        for seed in 0..100 {
            for o in mc(100.0, seed).options.unwrap() {
                let v: f64 = o.parse().unwrap();
                assert!((70.0..=130.0).contains(&v), "{v}");
            }
        }
    }

    #[test]
    fn explicit_options_are_kept_and_patched() {
        let mut rng = QuestionRng::from_seed(1);
        let result = format_question(
            "Q",
            AnswerValue::Number(3.0),
            QuestionStyle::MultipleChoice,
            Some(vec!["1".into(), "2".into(), "4".into()]),
            &mut rng,
        );
        let options = result.options.unwrap();
        assert_eq!(options.len(), 3);
        assert!(options.contains(&"3".to_string()));
    }

    #[test]
    fn free_response_asks_for_units() {
        let mut rng = QuestionRng::from_seed(1);
        let result = format_question("Q", AnswerValue::Number(9.8123), QuestionStyle::FreeResponse, None, &mut rng);
        assert!(result.prompt.ends_with("appropriate units:"));
        assert!(result.options.is_none());
        assert_eq!(result.correct_answer, "9.812");
    }

    #[test]
    fn true_false_labels_match_statement() {
        let mut saw_true = false;
        let mut saw_false = false;
        for seed in 0..100 {
            let mut rng = QuestionRng::from_seed(seed);
            let result = format_question("Q", AnswerValue::Number(10.0), QuestionStyle::TrueFalse, None, &mut rng);
            let stated: f64 = result.prompt.rsplit(' ').next().unwrap().parse().unwrap();
            if result.correct_answer == TRUE_LABEL {
                saw_true = true;
                assert_eq!(stated, 10.0);
            } else {
                saw_false = true;
                assert!((12.0..=15.0).contains(&stated));
            }
        }
        assert!(saw_true && saw_false);
    }

    #[test]
    fn zero_is_never_restated_as_false() {
        for seed in 0..100 {
            let mut rng = QuestionRng::from_seed(seed);
            let result = format_question("Q", AnswerValue::Number(0.0), QuestionStyle::TrueFalse, None, &mut rng);
            let stated: f64 = result.prompt.rsplit(' ').next().unwrap().parse().unwrap();
            if result.correct_answer == FALSE_LABEL {
                assert_ne!(stated, 0.0);
            }
        }
    }

    #[test]
    fn sentinel_multiple_choice() {
        let mut rng = QuestionRng::from_seed(8);
        let result = format_question(
            "Q",
            AnswerValue::Sentinel("total internal reflection"),
            QuestionStyle::MultipleChoice,
            None,
            &mut rng,
        );
        let options = result.options.unwrap();
        assert_eq!(options.len(), OPTION_COUNT);
        assert!(options.iter().all_unique());
        assert_eq!(result.correct_answer, "total internal reflection");
        assert_eq!(options[result.correct_option.unwrap()], "total internal reflection");
    }
}
