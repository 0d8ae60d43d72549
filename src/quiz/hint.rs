//! Hint Budget
//!
//! Tracks how many region hints remain and whether one has been shown for
//! the current round.

use serde::{Deserialize, Serialize};

use crate::quiz::catalog::Country;

/// Why a hint was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintDenial {
    /// No hints left this session
    BudgetExhausted,
    /// A hint is already showing for this round
    AlreadyRevealed,
    /// The round has been answered
    RoundResolved,
}

/// Result of a hint request. Denial is a normal outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintOutcome {
    /// Region of the current target
    Revealed {
        /// Target region
        region: String,
        /// Hints left after this one
        remaining: u32,
    },
    /// Request refused
    Denied(HintDenial),
}

/// Per-session hint budget.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HintManager {
    remaining: u32,
    revealed: Option<String>,
}

impl HintManager {
    /// Create with a full budget.
    pub fn new(budget: u32) -> Self {
        Self {
            remaining: budget,
            revealed: None,
        }
    }

    /// Hints left.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Region shown for the current round, if any.
    pub fn revealed(&self) -> Option<&str> {
        self.revealed.as_deref()
    }

    /// Reveal the target's region.
    pub fn reveal(&mut self, target: &Country) -> HintOutcome {
        if self.revealed.is_some() {
            return HintOutcome::Denied(HintDenial::AlreadyRevealed);
        }
        if self.remaining == 0 {
            return HintOutcome::Denied(HintDenial::BudgetExhausted);
        }

        self.remaining -= 1;
        self.revealed = Some(target.region.clone());

        HintOutcome::Revealed {
            region: target.region.clone(),
            remaining: self.remaining,
        }
    }

    /// Hide the hint for a new round. The budget is not restored.
    pub fn new_round(&mut self) {
        self.revealed = None;
    }

    /// Restore the full budget for a new session.
    pub fn reset(&mut self, budget: u32) {
        *self = Self::new(budget);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Country {
        Country::new("PER", "Peru", "pe.png", "Americas")
    }

    #[test]
    fn test_reveal_spends_budget() {
        let mut hints = HintManager::new(2);
        let outcome = hints.reveal(&target());
        assert_eq!(
            outcome,
            HintOutcome::Revealed { region: "Americas".into(), remaining: 1 }
        );
        assert_eq!(hints.revealed(), Some("Americas"));
    }

    #[test]
    fn test_second_reveal_same_round_denied() {
        let mut hints = HintManager::new(3);
        hints.reveal(&target());
        assert_eq!(hints.reveal(&target()), HintOutcome::Denied(HintDenial::AlreadyRevealed));
        assert_eq!(hints.remaining(), 2);
    }

    #[test]
    fn test_new_round_hides_but_keeps_budget() {
        let mut hints = HintManager::new(1);
        hints.reveal(&target());
        hints.new_round();
        assert_eq!(hints.revealed(), None);
        assert_eq!(hints.remaining(), 0);
        assert_eq!(hints.reveal(&target()), HintOutcome::Denied(HintDenial::BudgetExhausted));
    }

    #[test]
    fn test_zero_budget() {
        let mut hints = HintManager::new(0);
        assert_eq!(hints.reveal(&target()), HintOutcome::Denied(HintDenial::BudgetExhausted));
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut hints = HintManager::new(1);
        hints.reveal(&target());
        hints.reset(3);
        assert_eq!(hints.remaining(), 3);
        assert_eq!(hints.revealed(), None);
    }
}
