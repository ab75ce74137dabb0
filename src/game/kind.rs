// src/game/kind.rs — Game kinds and their rule table
//
// One enum tag per game variant plus a table mapping each tag to its
// normalization flags, comparison rule, and continuation rule. Nothing
// else in the crate branches on the concrete game.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::normalize::{normalize, NormalizePolicy};
use crate::infra::config::GamesConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// Word chain: each word starts with the last letter of the previous one.
    Chain,
    Riddle,
    /// Unscramble a shuffled word.
    Scramble,
    Quiz,
    Math,
    /// Spell words out of a fixed set of letters.
    Letters,
    /// Retype a phrase exactly.
    FastType,
}

impl GameKind {
    pub const ALL: [GameKind; 7] = [
        GameKind::Chain,
        GameKind::Riddle,
        GameKind::Scramble,
        GameKind::Quiz,
        GameKind::Math,
        GameKind::Letters,
        GameKind::FastType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Chain => "chain",
            GameKind::Riddle => "riddle",
            GameKind::Scramble => "scramble",
            GameKind::Quiz => "quiz",
            GameKind::Math => "math",
            GameKind::Letters => "letters",
            GameKind::FastType => "fast_type",
        }
    }

    /// Name shown to players.
    pub fn display_name(&self) -> &'static str {
        match self {
            GameKind::Chain => "سلسلة الكلمات",
            GameKind::Riddle => "لغز",
            GameKind::Scramble => "رتب الحروف",
            GameKind::Quiz => "سؤال عام",
            GameKind::Math => "حساب سريع",
            GameKind::Letters => "تكوين كلمات",
            GameKind::FastType => "الأسرع كتابة",
        }
    }

    /// Chat words that start this game.
    pub fn triggers(&self) -> &'static [&'static str] {
        match self {
            GameKind::Chain => &["سلسلة", "/chain"],
            GameKind::Riddle => &["لغز", "/riddle"],
            GameKind::Scramble => &["رتب", "ترتيب", "/scramble"],
            GameKind::Quiz => &["سؤال", "/quiz"],
            GameKind::Math => &["حساب", "/math"],
            GameKind::Letters => &["حروف", "/letters"],
            GameKind::FastType => &["أسرع", "/fast"],
        }
    }

    /// Games whose answers are free words, so a bare trigger word may be a
    /// legitimate move.
    pub fn takes_word_answers(&self) -> bool {
        matches!(self, GameKind::Chain | GameKind::Letters)
    }

    /// Match a whole chat message against every kind's trigger words.
    pub fn from_trigger(text: &str) -> Option<GameKind> {
        let wanted = normalize(text, NormalizePolicy::LITERAL);
        GameKind::ALL.into_iter().find(|kind| {
            kind.triggers()
                .iter()
                .any(|t| normalize(t, NormalizePolicy::LITERAL) == wanted)
        })
    }

    /// Built-in rules before config overrides.
    pub fn base_rules(&self) -> KindRules {
        match self {
            GameKind::Chain => KindRules {
                normalize: NormalizePolicy::ARTICLE_INSENSITIVE,
                matching: MatchMode::ChainLetter,
                continuation: Continuation::Rounds(5),
                max_attempts: Some(3),
                anti_repetition: true,
                semantic: false,
                ttl_secs: Some(180),
            },
            GameKind::Riddle => KindRules {
                normalize: NormalizePolicy::ARTICLE_INSENSITIVE,
                matching: MatchMode::Containment,
                continuation: Continuation::SingleShot,
                max_attempts: None,
                anti_repetition: false,
                semantic: true,
                ttl_secs: None,
            },
            GameKind::Scramble => KindRules {
                normalize: NormalizePolicy::LITERAL,
                matching: MatchMode::Exact,
                continuation: Continuation::SingleShot,
                max_attempts: Some(2),
                anti_repetition: false,
                semantic: false,
                ttl_secs: None,
            },
            GameKind::Quiz => KindRules {
                normalize: NormalizePolicy::ARTICLE_INSENSITIVE,
                matching: MatchMode::Exact,
                continuation: Continuation::SingleShot,
                max_attempts: Some(2),
                anti_repetition: false,
                semantic: true,
                ttl_secs: None,
            },
            GameKind::Math => KindRules {
                normalize: NormalizePolicy::LITERAL,
                matching: MatchMode::Numeric,
                continuation: Continuation::SingleShot,
                max_attempts: Some(2),
                anti_repetition: false,
                semantic: false,
                ttl_secs: Some(60),
            },
            GameKind::Letters => KindRules {
                normalize: NormalizePolicy::LITERAL,
                matching: MatchMode::Composition,
                continuation: Continuation::Rounds(3),
                max_attempts: Some(5),
                anti_repetition: true,
                semantic: false,
                ttl_secs: Some(180),
            },
            GameKind::FastType => KindRules {
                normalize: NormalizePolicy::LITERAL,
                matching: MatchMode::Exact,
                continuation: Continuation::SingleShot,
                max_attempts: None,
                anti_repetition: false,
                semantic: false,
                ttl_secs: Some(30),
            },
        }
    }

    /// Rules with `[games]` config applied.
    pub fn rules(&self, games: &GamesConfig) -> KindRules {
        let mut rules = self.base_rules();
        if rules.ttl_secs.is_none() {
            rules.ttl_secs = Some(games.default_ttl_secs);
        }
        if let Some(o) = games.override_for(*self) {
            if let Some(ttl) = o.ttl_secs {
                rules.ttl_secs = Some(ttl);
            }
            if let Some(attempts) = o.max_attempts {
                rules.max_attempts = (attempts > 1).then_some(attempts);
            }
            if let (Some(rounds), Continuation::Rounds(_)) = (o.rounds, rules.continuation) {
                rules.continuation = Continuation::Rounds(rounds.max(1));
            }
        }
        rules
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        GameKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .or_else(|| GameKind::from_trigger(s))
            .ok_or_else(|| format!("unknown game kind '{s}'"))
    }
}

/// How a normalized candidate is compared with the expected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Equality with the answer or any member of the accepted set.
    Exact,
    /// Either string contains the other.
    Containment,
    /// Parsed integer first, falling back to exact text.
    Numeric,
    /// First letter equals the required letter.
    ChainLetter,
    /// Spelled from the given letters and present in the accepted set.
    Composition,
}

/// What happens after a correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Continuation {
    SingleShot,
    /// Keep going until this many correct answers.
    Rounds(u32),
}

impl Continuation {
    pub fn rounds_to_win(&self) -> u32 {
        match self {
            Continuation::SingleShot => 1,
            Continuation::Rounds(n) => *n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindRules {
    pub normalize: NormalizePolicy,
    pub matching: MatchMode,
    pub continuation: Continuation,
    /// `None` means one wrong answer ends the game.
    pub max_attempts: Option<u32>,
    /// Reject answers already given in this session before checking them.
    pub anti_repetition: bool,
    /// The AI verifier may rescue answers the exact rule rejects.
    pub semantic: bool,
    pub ttl_secs: Option<u64>,
}

impl KindRules {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_secs.unwrap_or(120) as i64)
    }
}
