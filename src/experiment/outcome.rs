//! Finalization: who called the collapse first.

use serde::{Deserialize, Serialize};

use crate::detect::HumanResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The detector never latched.
    NoDeathObserved,
    /// No response, a timeout, or a response at or after death.
    HumanTooLate,
    /// The observer signaled strictly before death.
    HumanAnticipated,
}

impl Outcome {
    pub fn name(&self) -> &'static str {
        match self {
            Outcome::NoDeathObserved => "NO_DEATH_OBSERVED",
            Outcome::HumanTooLate => "HUMAN_TOO_LATE",
            Outcome::HumanAnticipated => "HUMAN_ANTICIPATED",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One finished trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub t_death: Option<f64>,
    pub t_human: HumanResponse,
    pub outcome: Outcome,
    /// `t_death − t_human`, only when the observer anticipated death.
    pub delta_t: Option<f64>,
}

/// Pure classification of `(t_death, t_human)`.
///
/// A missing human response counts as the timeout sentinel.
pub fn classify(t_death: Option<f64>, human: Option<HumanResponse>) -> ResultRecord {
    let t_human = human.unwrap_or(HumanResponse::TimedOut);
    let (outcome, delta_t) = match t_death {
        None => (Outcome::NoDeathObserved, None),
        Some(td) => {
            let th = t_human.time();
            if th >= td {
                (Outcome::HumanTooLate, None)
            } else {
                (Outcome::HumanAnticipated, Some(td - th))
            }
        }
    };
    ResultRecord { t_death, t_human, outcome, delta_t }
}
