use serde::{Deserialize, Serialize};

use crate::constants::MAX_OPTIONS;
use crate::data::ReferenceData;
use crate::error::QuizError;
use crate::quiz::rng::{sample, shuffle, QuizRng};

/// What is asked and what is expected back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    CountryToCapital,
    CapitalToCountry,
}

/// Direction requested by a mode; `Mixed` is resolved per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionChoice {
    Fixed(Direction),
    Mixed,
}

impl DirectionChoice {
    pub fn resolve(self, rng: &mut dyn QuizRng) -> Direction {
        match self {
            DirectionChoice::Fixed(direction) => direction,
            DirectionChoice::Mixed => {
                if rng.next_index(2) == 0 {
                    Direction::CountryToCapital
                } else {
                    Direction::CapitalToCountry
                }
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DirectionChoice::Fixed(Direction::CountryToCapital) => "Страна → столица",
            DirectionChoice::Fixed(Direction::CapitalToCountry) => "Столица → страна",
            DirectionChoice::Mixed => "Вперемешку",
        }
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub direction: Direction,
    /// Shown to the player: a country or a capital name.
    pub subject: String,
    /// Canonical country the question is about, used for facts.
    pub country: String,
    pub answer: String,
    pub options: Vec<String>,
    pub prompt: String,
}

impl Question {
    pub fn is_correct(&self, option: usize) -> bool {
        self.options
            .get(option)
            .is_some_and(|picked| *picked == self.answer)
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.answer)
    }
}

/// Builds a question about a random subject from `pool`.
pub fn generate(
    reference: &ReferenceData,
    pool: &[String],
    direction: DirectionChoice,
    rng: &mut dyn QuizRng,
) -> Result<Question, QuizError> {
    if pool.is_empty() {
        return Err(QuizError::EmptyPool);
    }
    let subject = pool[rng.next_index(pool.len())].clone();
    generate_for(reference, &subject, pool, direction, rng)
}

/// Builds a question about `country`, drawing distractors from `pool`.
pub fn generate_for(
    reference: &ReferenceData,
    country: &str,
    pool: &[String],
    direction: DirectionChoice,
    rng: &mut dyn QuizRng,
) -> Result<Question, QuizError> {
    if pool.is_empty() {
        return Err(QuizError::EmptyPool);
    }
    let entry = reference
        .entry(country)
        .ok_or_else(|| QuizError::DataIntegrity(format!("unknown country {country}")))?;
    let direction = direction.resolve(rng);

    let (subject, answer) = match direction {
        Direction::CountryToCapital => (entry.name.clone(), entry.capital.clone()),
        Direction::CapitalToCountry => (entry.capital.clone(), entry.name.clone()),
    };

    let mut candidates: Vec<String> = Vec::new();
    for other in pool.iter().filter(|c| **c != entry.name) {
        let option = match direction {
            Direction::CountryToCapital => match reference.capital_of(other) {
                Some(capital) => capital.to_string(),
                None => continue,
            },
            Direction::CapitalToCountry => other.clone(),
        };
        if option != answer && !candidates.contains(&option) {
            candidates.push(option);
        }
    }

    let mut options = sample(rng, &candidates, MAX_OPTIONS - 1);
    options.push(answer.clone());
    shuffle(rng, &mut options);

    let prompt = match direction {
        Direction::CountryToCapital => match entry.flag.as_deref() {
            Some(flag) => format!("Какая столица у страны «{}» {}?", entry.name, flag),
            None => format!("Какая столица у страны «{}»?", entry.name),
        },
        Direction::CapitalToCountry => format!("Столицей какой страны является «{}»?", entry.capital),
    };

    Ok(Question {
        direction,
        subject,
        country: entry.name.clone(),
        answer,
        options,
        prompt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::rng::{ScriptedRng, SeededRng};
    use std::collections::HashSet;

    fn reference() -> ReferenceData {
        ReferenceData::from_json_str(
            r#"{
                "continents": ["Европа"],
                "countries": [
                    {"name": "Франция", "capital": "Париж", "continent": "Европа", "flag": "🇫🇷"},
                    {"name": "Германия", "capital": "Берлин", "continent": "Европа"},
                    {"name": "Италия", "capital": "Рим", "continent": "Европа"},
                    {"name": "Испания", "capital": "Мадрид", "continent": "Европа"},
                    {"name": "Польша", "capital": "Варшава", "continent": "Европа"},
                    {"name": "Австрия", "capital": "Вена", "continent": "Европа"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_options_are_unique_and_contain_answer() {
        let reference = reference();
        let pool = reference.list_countries(None);
        let mut rng = SeededRng::new(Some(11));
        for _ in 0..200 {
            let question = generate(&reference, &pool, DirectionChoice::Mixed, &mut rng).unwrap();
            let unique: HashSet<_> = question.options.iter().collect();
            assert_eq!(unique.len(), question.options.len());
            assert_eq!(question.options.len(), MAX_OPTIONS);
            assert_eq!(
                question.options.iter().filter(|o| **o == question.answer).count(),
                1
            );
            assert!(question.correct_index().is_some());
        }
    }

    #[test]
    fn test_country_to_capital_uses_capitals_as_distractors() {
        let reference = reference();
        let pool = reference.list_countries(None);
        let mut rng = ScriptedRng::constant(0.0);
        let question = generate_for(
            &reference,
            "Франция",
            &pool,
            DirectionChoice::Fixed(Direction::CountryToCapital),
            &mut rng,
        )
        .unwrap();
        assert_eq!(question.answer, "Париж");
        assert_eq!(question.subject, "Франция");
        assert!(question.prompt.contains("🇫🇷"));
        let capitals = reference.list_capitals(None);
        assert!(question.options.iter().all(|o| capitals.contains(o)));
    }

    #[test]
    fn test_capital_to_country_uses_country_names() {
        let reference = reference();
        let pool = reference.list_countries(None);
        let mut rng = ScriptedRng::constant(0.0);
        let question = generate_for(
            &reference,
            "Италия",
            &pool,
            DirectionChoice::Fixed(Direction::CapitalToCountry),
            &mut rng,
        )
        .unwrap();
        assert_eq!(question.subject, "Рим");
        assert_eq!(question.answer, "Италия");
        assert!(question.options.iter().all(|o| pool.contains(o)));
    }

    #[test]
    fn test_small_pool_gives_fewer_options() {
        let reference = reference();
        let pool = vec!["Франция".to_string()];
        let mut rng = SeededRng::new(Some(1));
        let question = generate(&reference, &pool, DirectionChoice::Mixed, &mut rng).unwrap();
        assert_eq!(question.options, vec![question.answer.clone()]);

        let pool = vec!["Франция".to_string(), "Италия".to_string()];
        let question = generate(&reference, &pool, DirectionChoice::Mixed, &mut rng).unwrap();
        assert_eq!(question.options.len(), 2);
    }

    #[test]
    fn test_empty_pool_fails() {
        let reference = reference();
        let mut rng = SeededRng::new(None);
        let err = generate(&reference, &[], DirectionChoice::Mixed, &mut rng).unwrap_err();
        assert_eq!(err, QuizError::EmptyPool);
    }

    #[test]
    fn test_is_correct() {
        let reference = reference();
        let pool = reference.list_countries(None);
        let mut rng = SeededRng::new(Some(5));
        let question = generate(&reference, &pool, DirectionChoice::Mixed, &mut rng).unwrap();
        let idx = question.correct_index().unwrap();
        assert!(question.is_correct(idx));
        assert!(!question.is_correct(question.options.len()));
    }
}
