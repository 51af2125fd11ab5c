//! Ledger and job-progression engine for a multiplayer game server.
//!
//! The engine tracks per-player balances across multiple currencies,
//! moves funds atomically between accounts, and tracks per-player job
//! experience with a deterministic leveling curve. It is a synchronous
//! in-process library over a relational store: hosts (game-server plugins,
//! admin tools) call it from whatever workers they dispatch events on, and
//! the engine guarantees that writes racing on the same row serialize
//! without lost updates.
//!
//! Command parsing, chat formatting and event detection live in the host;
//! the boundary is [`Engine`]'s public API plus the [`PlayerHandle`]
//! capability trait.

pub use accounts::Account;
pub use balances::{Balance, Deposit, Transfer};
pub use currency::{Currency, CurrencyRegistry};
pub use error::EngineError;
pub use job_actions::JobAction;
pub use job_experience::{JobExperience, LevelProgress};
pub use job_rewards::JobReward;
pub use jobs::{Job, JobCatalog};
pub use leveling::{experience_for_level, level_for_experience, next_level_experience};
pub use money::Money;
pub use ops::{ActionOutcome, Engine, EngineBuilder};
pub use player::PlayerHandle;

mod accounts;
mod balances;
mod currency;
mod default_balances;
mod error;
mod job_actions;
mod job_experience;
mod job_rewards;
mod jobs;
mod leveling;
mod money;
mod ops;
mod player;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
