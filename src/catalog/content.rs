// src/catalog/content.rs — Question content pools
//
// Content is data. A small built-in pack ships with the binary so every
// kind is playable; an optional TOML file extends it.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::game::normalize::{letters_cover, normalize, NormalizePolicy};

/// A question with a literal answer and optional alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

/// A letter set and the words that may be spelled from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSet {
    pub letters: String,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPack {
    /// Opening words for the chain game.
    #[serde(default)]
    pub chain_seeds: Vec<String>,
    #[serde(default)]
    pub riddles: Vec<TextItem>,
    #[serde(default)]
    pub quiz: Vec<TextItem>,
    /// Words to scramble.
    #[serde(default)]
    pub scramble: Vec<String>,
    /// Phrases to retype.
    #[serde(default)]
    pub fast_type: Vec<String>,
    #[serde(default)]
    pub letters: Vec<LetterSet>,
}

impl ContentPack {
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let pack: ContentPack = toml::from_str(content)?;
        Ok(pack.validated())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Append another pack's content.
    pub fn merge(&mut self, other: ContentPack) {
        self.chain_seeds.extend(other.chain_seeds);
        self.riddles.extend(other.riddles);
        self.quiz.extend(other.quiz);
        self.scramble.extend(other.scramble);
        self.fast_type.extend(other.fast_type);
        self.letters.extend(other.letters);
    }

    /// Drop entries that could never be answered correctly.
    pub fn validated(mut self) -> Self {
        self.chain_seeds.retain(|w| !w.trim().is_empty());
        self.scramble
            .retain(|w| normalize(w, NormalizePolicy::LITERAL).chars().count() >= 2);
        self.fast_type.retain(|p| !p.trim().is_empty());
        self.riddles
            .retain(|r| !r.answer.trim().is_empty() && !r.question.trim().is_empty());
        self.quiz
            .retain(|q| !q.answer.trim().is_empty() && !q.question.trim().is_empty());

        for set in &mut self.letters {
            let pool = normalize(&set.letters, NormalizePolicy::LITERAL);
            set.words.retain(|w| {
                let ok = letters_cover(&pool, &normalize(w, NormalizePolicy::LITERAL));
                if !ok {
                    warn!("Dropping '{}': not spelled from '{}'", w, set.letters);
                }
                ok
            });
        }
        self.letters.retain(|s| !s.words.is_empty());
        self
    }

    /// The content shipped with the bot.
    pub fn builtin() -> Self {
        let text = |q: &str, a: &str, alts: &[&str]| TextItem {
            question: q.to_string(),
            answer: a.to_string(),
            alternatives: alts.iter().map(|s| s.to_string()).collect(),
        };
        let words = |ws: &[&str]| ws.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        ContentPack {
            chain_seeds: words(&[
                "كتاب", "قمر", "شمس", "بحر", "جبل", "نهر", "قلم", "باب", "ورد", "سفر",
            ]),
            riddles: vec![
                text("ما الشيء الذي يكسر قبل أن يؤكل؟", "البيضة", &[]),
                text("له أسنان ولا يعض، فما هو؟", "المشط", &[]),
                text("شيء كلما أخذت منه كبر، فما هو؟", "الحفرة", &["حفره"]),
                text("يسمع بلا أذن ويتكلم بلا لسان، فما هو؟", "الهاتف", &["الجوال", "التلفون"]),
                text("له عين واحدة ولا يرى، فما هو؟", "الإبرة", &[]),
                text("يمشي بلا أرجل ويبكي بلا عيون، فما هو؟", "السحاب", &["الغيم", "السحابة"]),
                text("بيت بلا أبواب ولا نوافذ، فما هو؟", "البيضة", &[]),
                text("ما الذي يجري ولا يمشي؟", "الماء", &["النهر"]),
            ],
            quiz: vec![
                text("ما عاصمة المغرب؟", "الرباط", &[]),
                text("ما أكبر كوكب في المجموعة الشمسية؟", "المشتري", &[]),
                text("كم عدد أيام الأسبوع؟", "سبعة", &["7", "سبع"]),
                text("ما أطول نهر في العالم؟", "النيل", &[]),
                text("ما عاصمة اليابان؟", "طوكيو", &[]),
                text("ما أسرع حيوان بري؟", "الفهد", &[]),
                text("ما العنصر الذي رمزه O؟", "الأكسجين", &["الاكسجين", "أكسجين"]),
            ],
            scramble: words(&[
                "مدرسة", "سيارة", "حديقة", "مكتبة", "طائرة", "شجرة", "نافذة", "قهوة",
            ]),
            fast_type: words(&[
                "العلم نور والجهل ظلام",
                "من جد وجد ومن زرع حصد",
                "الصبر مفتاح الفرج",
                "خير الكلام ما قل ودل",
                "في التأني السلامة وفي العجلة الندامة",
            ]),
            letters: vec![
                LetterSet {
                    letters: "قلمر".into(),
                    words: words(&["قلم", "قمر", "رمل"]),
                },
                LetterSet {
                    letters: "سلمع".into(),
                    words: words(&["علم", "سلم", "عمل", "لمس", "سمع"]),
                },
                LetterSet {
                    letters: "كتبر".into(),
                    words: words(&["كتب", "ركب", "بكر", "ترك"]),
                },
            ],
        }
    }
}
