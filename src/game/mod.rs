// src/game/mod.rs — Game sessions: kinds, normalization, lifecycle

pub mod clock;
pub mod kind;
pub mod locks;
pub mod manager;
pub mod normalize;
pub mod repository;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use kind::{Continuation, GameKind, KindRules, MatchMode};
pub use manager::SessionManager;
pub use normalize::NormalizePolicy;
pub use repository::{GameEnd, SessionStore};
pub use session::{AnswerResult, ExpectedAnswer, Outcome, Player, Session};
