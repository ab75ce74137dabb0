// src/bot/mod.rs — Inbound message dispatch
//
// Turns one chat message into a start, a control command, a score query,
// or an answer for the conversation's running game.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::kind::GameKind;
use crate::game::normalize::{normalize, to_arabic_digits, NormalizePolicy};
use crate::game::{AnswerResult, Player, SessionManager};
use crate::infra::errors::GameError;
use crate::ledger::format_leaderboard;

/// A message from the messaging platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inbound {
    pub conversation_id: String,
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub text: String,
}

impl Inbound {
    pub fn player(&self) -> Player {
        let name = self
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.user_id);
        Player::new(self.user_id.clone(), name)
    }
}

/// What the bot sends back. `text` is `None` when it stays silent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: Option<String>,
    pub result: Option<AnswerResult>,
}

impl Reply {
    fn say(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            result: None,
        }
    }

    fn silent() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(GameKind),
    Stop,
    Hint,
    Points,
    Leaderboard,
    Help,
    Answer(String),
}

const STOP_WORDS: &[&str] = &["انسحب", "ايقاف", "/stop"];
const HINT_WORDS: &[&str] = &["السؤال", "/hint"];
const POINTS_WORDS: &[&str] = &["نقاطي", "/points"];
const LEADERBOARD_WORDS: &[&str] = &["الصدارة", "الترتيب", "/top"];
const HELP_WORDS: &[&str] = &["مساعدة", "الالعاب", "/help"];

impl Command {
    pub fn parse(text: &str) -> Command {
        if let Some(kind) = GameKind::from_trigger(text) {
            return Command::Start(kind);
        }
        let wanted = normalize(text, NormalizePolicy::LITERAL);
        let is = |words: &[&str]| {
            words
                .iter()
                .any(|w| normalize(w, NormalizePolicy::LITERAL) == wanted)
        };

        if is(STOP_WORDS) {
            Command::Stop
        } else if is(HINT_WORDS) {
            Command::Hint
        } else if is(POINTS_WORDS) {
            Command::Points
        } else if is(LEADERBOARD_WORDS) {
            Command::Leaderboard
        } else if is(HELP_WORDS) {
            Command::Help
        } else {
            Command::Answer(text.to_string())
        }
    }
}

pub struct Bot {
    manager: Arc<SessionManager>,
    leaderboard_size: u32,
}

impl Bot {
    pub fn new(manager: Arc<SessionManager>, leaderboard_size: u32) -> Self {
        Self {
            manager,
            leaderboard_size,
        }
    }

    pub fn manager(&self) -> &Arc<SessionManager> {
        &self.manager
    }

    /// A chain or letters game is running, so Arabic trigger words are
    /// answers and only `/slash` triggers restart.
    async fn expects_words(&self, conversation: &str) -> Result<bool, GameError> {
        Ok(self
            .manager
            .peek(conversation)
            .await?
            .is_some_and(|s| s.game_kind.takes_word_answers()))
    }

    /// Handle one message. Only storage failures come back as `Err`.
    pub async fn handle(&self, inbound: &Inbound) -> Result<Reply, GameError> {
        let conversation = inbound.conversation_id.as_str();
        let player = inbound.player();
        let command = match Command::parse(&inbound.text) {
            Command::Start(_)
                if !inbound.text.trim_start().starts_with('/')
                    && self.expects_words(conversation).await? =>
            {
                Command::Answer(inbound.text.clone())
            }
            command => command,
        };
        debug!(conversation, user = %player.user_id, ?command, "Inbound message");

        match command {
            Command::Start(kind) => match self.manager.start(conversation, &player, kind).await {
                Ok((prompt, _)) => Ok(Reply::say(prompt)),
                Err(GameError::NoContentAvailable { .. }) => {
                    Ok(Reply::say("عذراً، لا توجد أسئلة لهذه اللعبة حالياً."))
                }
                Err(e) => Err(e),
            },
            Command::Stop => Ok(match self.manager.stop(conversation).await? {
                Some(session) => Reply::say(format!(
                    "🛑 تم إيقاف اللعبة. الإجابة: {}",
                    session.expected_answer.reveal()
                )),
                None => Reply::say("لا توجد لعبة جارية."),
            }),
            Command::Hint => Ok(match self.manager.peek(conversation).await? {
                Some(session) => {
                    let left = session.seconds_left(self.manager.now());
                    let mut text = format!("{}\n{}", session.game_kind.display_name(), session.question);
                    if let Some(hint) = session.progress_hint() {
                        text.push('\n');
                        text.push_str(&hint);
                    }
                    text.push_str(&format!("\n⏱ باقي {} ثانية", to_arabic_digits(left)));
                    Reply::say(text)
                }
                None => Reply::say("لا توجد لعبة جارية."),
            }),
            Command::Points => {
                let record = self.manager.ledger().get(&player.user_id).await?;
                let text = match record {
                    Some(r) => format!(
                        "⭐ {}: {} نقطة، {} فوز من {} لعبة",
                        r.display_name,
                        to_arabic_digits(r.total_points),
                        to_arabic_digits(r.wins),
                        to_arabic_digits(r.games_played)
                    ),
                    None => format!("⭐ {}: لا توجد نقاط بعد.", player.display_name),
                };
                Ok(Reply::say(text))
            }
            Command::Leaderboard => {
                let entries = self
                    .manager
                    .ledger()
                    .leaderboard(self.leaderboard_size)
                    .await?;
                Ok(Reply::say(format_leaderboard(&entries)))
            }
            Command::Help => Ok(Reply::say(help_text())),
            Command::Answer(text) => {
                match self.manager.check_answer(conversation, &player, &text).await {
                    Ok(result) => {
                        let mut reply = result.message.clone();
                        if let Some(next) = &result.next_prompt {
                            reply.push('\n');
                            reply.push_str(next);
                        }
                        Ok(Reply {
                            text: Some(reply),
                            result: Some(result),
                        })
                    }
                    // Ordinary chatter while no game runs.
                    Err(GameError::NoActiveSession) => Ok(Reply::silent()),
                    Err(e) => Err(e),
                }
            }
        }
    }
}

pub fn help_text() -> String {
    let mut out = String::from("🎮 الألعاب المتاحة:");
    for kind in GameKind::ALL {
        out.push_str(&format!(
            "\n• {}: {}",
            kind.display_name(),
            kind.triggers().join(" / ")
        ));
    }
    out.push_str("\n\nأوامر: انسحب، السؤال، نقاطي، الصدارة");
    out
}
