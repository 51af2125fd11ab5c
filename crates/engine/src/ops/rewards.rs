use uuid::Uuid;

use crate::{Deposit, LevelProgress, Money, PlayerHandle, ResultEngine};

use super::Engine;

/// What happened when a tracked action was rewarded.
///
/// The money credit and the experience add are separate ledgers and are
/// **not** atomic with each other: each sub-result is carried here as it
/// happened. A partial credit (one succeeded, the other failed) is a
/// surfaced, logged condition, never silently swallowed.
#[derive(Debug)]
pub struct ActionOutcome {
    pub job_id: Uuid,
    pub material: String,
    /// Deposit receipt, or `None` when the reward carries no money.
    pub money: Option<ResultEngine<Deposit>>,
    pub experience: ResultEngine<LevelProgress>,
}

impl ActionOutcome {
    /// Amount actually credited (zero when the deposit failed or the reward
    /// carried no money).
    #[must_use]
    pub fn credited(&self) -> Money {
        match &self.money {
            Some(Ok(deposit)) => deposit.amount,
            _ => Money::ZERO,
        }
    }

    /// New level after the experience add, when it succeeded.
    #[must_use]
    pub fn new_level(&self) -> Option<u32> {
        self.experience.as_ref().ok().map(|progress| progress.level)
    }

    /// Whether the experience add crossed a level boundary.
    #[must_use]
    pub fn leveled_up(&self) -> bool {
        matches!(&self.experience, Ok(progress) if progress.leveled_up)
    }

    /// Whether every configured part of the reward was applied.
    #[must_use]
    pub fn fully_applied(&self) -> bool {
        let money_ok = !matches!(&self.money, Some(Err(_)));
        money_ok && self.experience.is_ok()
    }
}

impl Engine {
    /// Reward a player for an in-game action.
    ///
    /// `action_name` and `material` come straight from the event-detection
    /// layer ("break" on "coal_ore", "kill" on "zombie", ...). Returns
    /// `None`, with no side effects, when the action kind is not tracked
    /// or no reward is configured for that action/material pair, which is
    /// the common case.
    ///
    /// When a reward exists, both the deposit and the experience add are
    /// attempted regardless of the other's outcome, and both results are
    /// reported in the [`ActionOutcome`].
    pub async fn handle_action(
        &self,
        player: &dyn PlayerHandle,
        action_name: &str,
        material: &str,
    ) -> Option<ActionOutcome> {
        let Ok(action) = self.jobs().action_by_name(action_name) else {
            return None;
        };
        let reward = self.jobs().reward_for(action.id, material)?.clone();
        let account_id = player.id();

        let money = if reward.money.is_positive() {
            let deposit = self
                .deposit(account_id, reward.currency_id, reward.money, false)
                .await;
            if let Err(err) = &deposit {
                tracing::warn!(
                    player = player.display_name(),
                    %account_id,
                    currency_id = reward.currency_id,
                    material,
                    "reward deposit failed: {err}"
                );
            }
            Some(deposit)
        } else {
            None
        };

        let experience = self
            .add_experience(account_id, reward.job_id, reward.experience)
            .await;
        if let Err(err) = &experience {
            tracing::warn!(
                player = player.display_name(),
                %account_id,
                job_id = %reward.job_id,
                material,
                "reward experience add failed: {err}"
            );
        }

        Some(ActionOutcome {
            job_id: reward.job_id,
            material: material.to_string(),
            money,
            experience,
        })
    }
}
