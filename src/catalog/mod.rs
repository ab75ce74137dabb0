// src/catalog/mod.rs — Question producer per game kind

pub mod content;

use std::collections::BTreeMap;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::game::kind::GameKind;
use crate::game::normalize::{chain_letter, last_letter, normalize, to_arabic_digits};
use crate::game::session::{AuxSeed, ExpectedAnswer};
use crate::infra::config::GamesConfig;
use content::ContentPack;

/// A freshly materialized question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub question_text: String,
    pub expected_answer: ExpectedAnswer,
    pub auxiliary_seed: AuxSeed,
    pub points_value: u32,
}

/// Produces randomized questions. Must never return an expected answer the
/// kind's match rule cannot compare against.
pub trait GameCatalog: Send + Sync {
    /// `None` when there is no content for the kind.
    fn next_question(&self, kind: GameKind) -> Option<Question>;
}

/// Points per kind before config overrides.
pub fn default_points(kind: GameKind) -> u32 {
    match kind {
        GameKind::Chain => 5,
        GameKind::Riddle => 3,
        GameKind::Scramble => 2,
        GameKind::Quiz => 2,
        GameKind::Math => 2,
        GameKind::Letters => 3,
        GameKind::FastType => 1,
    }
}

/// Catalog backed by a `ContentPack`. Math questions are generated.
pub struct ContentCatalog {
    pack: ContentPack,
    points: BTreeMap<GameKind, u32>,
}

impl ContentCatalog {
    pub fn new(pack: ContentPack) -> Self {
        let points = GameKind::ALL
            .into_iter()
            .map(|k| (k, default_points(k)))
            .collect();
        Self { pack, points }
    }

    pub fn builtin() -> Self {
        Self::new(ContentPack::builtin())
    }

    /// Apply `[games.kinds.<kind>] points` overrides.
    pub fn with_points(mut self, games: &GamesConfig) -> Self {
        for kind in GameKind::ALL {
            if let Some(points) = games.override_for(kind).and_then(|o| o.points) {
                self.points.insert(kind, points);
            }
        }
        self
    }

    pub fn pack(&self) -> &ContentPack {
        &self.pack
    }

    fn points(&self, kind: GameKind) -> u32 {
        self.points
            .get(&kind)
            .copied()
            .unwrap_or_else(|| default_points(kind))
    }

    fn chain(&self) -> Option<(String, ExpectedAnswer, AuxSeed)> {
        let seed = self.pack.chain_seeds.choose(&mut rand::rng())?;
        let rules = GameKind::Chain.base_rules();
        let required_first = chain_letter(last_letter(&normalize(seed, rules.normalize))?);
        Some((
            format!("الكلمة الأولى: {seed}"),
            ExpectedAnswer::Chain { required_first },
            AuxSeed {
                used_answers: vec![seed.clone()],
            },
        ))
    }

    fn text_item(
        items: &[content::TextItem],
        prefix: &str,
    ) -> Option<(String, ExpectedAnswer, AuxSeed)> {
        let item = items.choose(&mut rand::rng())?;
        let expected = if item.alternatives.is_empty() {
            ExpectedAnswer::text(item.answer.clone())
        } else {
            let mut answers = vec![item.answer.clone()];
            answers.extend(item.alternatives.iter().cloned());
            ExpectedAnswer::OneOf { answers }
        };
        Some((
            format!("{prefix}{}", item.question),
            expected,
            AuxSeed::default(),
        ))
    }

    fn scramble(&self) -> Option<(String, ExpectedAnswer, AuxSeed)> {
        let mut rng = rand::rng();
        let word = self.pack.scramble.choose(&mut rng)?;
        let original: Vec<char> = word.chars().collect();
        let mut letters = original.clone();
        for _ in 0..8 {
            letters.shuffle(&mut rng);
            if letters != original {
                break;
            }
        }
        Some((
            format!("رتب الحروف: {}", spaced(&letters)),
            ExpectedAnswer::text(word.clone()),
            AuxSeed::default(),
        ))
    }

    fn fast_type(&self) -> Option<(String, ExpectedAnswer, AuxSeed)> {
        let phrase = self.pack.fast_type.choose(&mut rand::rng())?;
        Some((
            format!("اكتب بسرعة: {phrase}"),
            ExpectedAnswer::text(phrase.clone()),
            AuxSeed::default(),
        ))
    }

    fn letters(&self) -> Option<(String, ExpectedAnswer, AuxSeed)> {
        let mut rng = rand::rng();
        let set = self.pack.letters.choose(&mut rng)?;
        let mut shown: Vec<char> = set.letters.chars().collect();
        shown.shuffle(&mut rng);
        Some((
            format!("كوّن كلمات من الحروف: {}", spaced(&shown)),
            ExpectedAnswer::Composition {
                letters: set.letters.clone(),
                accepted: set.words.clone(),
            },
            AuxSeed::default(),
        ))
    }

    fn math() -> (String, ExpectedAnswer, AuxSeed) {
        let mut rng = rand::rng();
        let (text, value) = match rng.random_range(0..3u8) {
            0 => {
                let a: i64 = rng.random_range(10..=99);
                let b: i64 = rng.random_range(10..=99);
                (format!("{} + {}", to_arabic_digits(a), to_arabic_digits(b)), a + b)
            }
            1 => {
                let a: i64 = rng.random_range(20..=99);
                let b: i64 = rng.random_range(1..=19);
                (format!("{} - {}", to_arabic_digits(a), to_arabic_digits(b)), a - b)
            }
            _ => {
                let a: i64 = rng.random_range(2..=12);
                let b: i64 = rng.random_range(2..=12);
                (format!("{} × {}", to_arabic_digits(a), to_arabic_digits(b)), a * b)
            }
        };
        (
            format!("كم يساوي {text}؟"),
            ExpectedAnswer::Number {
                value,
                spelled: Vec::new(),
            },
            AuxSeed::default(),
        )
    }
}

impl GameCatalog for ContentCatalog {
    fn next_question(&self, kind: GameKind) -> Option<Question> {
        let (question_text, expected_answer, auxiliary_seed) = match kind {
            GameKind::Chain => self.chain()?,
            GameKind::Riddle => Self::text_item(&self.pack.riddles, "لغز: ")?,
            GameKind::Quiz => Self::text_item(&self.pack.quiz, "")?,
            GameKind::Scramble => self.scramble()?,
            GameKind::FastType => self.fast_type()?,
            GameKind::Letters => self.letters()?,
            GameKind::Math => Self::math(),
        };
        debug_assert!(expected_answer.fits(kind.base_rules().matching));
        Some(Question {
            question_text,
            expected_answer,
            auxiliary_seed,
            points_value: self.points(kind),
        })
    }
}

fn spaced(letters: &[char]) -> String {
    letters
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Literal answer a player could type to win, when one exists.
pub fn sample_answer(expected: &ExpectedAnswer) -> Option<String> {
    match expected {
        ExpectedAnswer::Text { answer } => Some(answer.clone()),
        ExpectedAnswer::OneOf { answers } => answers.first().cloned(),
        ExpectedAnswer::Number { value, .. } => Some(value.to_string()),
        ExpectedAnswer::Composition { accepted, .. } => accepted.first().cloned(),
        ExpectedAnswer::Chain { .. } => None,
    }
}
