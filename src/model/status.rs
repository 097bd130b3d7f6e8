//! Wish status: where a wish sits in its lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a wish.
///
/// Transitions between these are decided by [`WishStatus::can_become`];
/// the cap on [`WishStatus::WantSoon`] is enforced by the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WishStatus {
    /// General interest. Eligible for promotion.
    Candidate,

    /// The prioritized set, capped per owner.
    WantSoon,

    /// Done, with a recorded date and reflection.
    AchievedWithDate,

    /// Done, but the month is not known.
    ///
    /// A date may still be filled in later without changing status.
    AchievedUnknownDate,

    /// Rejected. Terminal.
    NotInterested,
}

impl WishStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 5] = [
        Self::WantSoon,
        Self::Candidate,
        Self::AchievedWithDate,
        Self::AchievedUnknownDate,
        Self::NotInterested,
    ];

    /// Whether this is one of the completion states.
    pub fn is_achieved(self) -> bool {
        matches!(self, Self::AchievedWithDate | Self::AchievedUnknownDate)
    }

    /// Whether an existing wish may move from `self` to `to`.
    ///
    /// Staying in the same status is not a transition and returns `false`.
    pub fn can_become(self, to: Self) -> bool {
        use WishStatus::{AchievedUnknownDate, AchievedWithDate, Candidate, NotInterested, WantSoon};

        match (self, to) {
            (Candidate, WantSoon) | (WantSoon, Candidate) => true,
            (Candidate | WantSoon, AchievedWithDate) => true,
            (Candidate | WantSoon | AchievedWithDate, AchievedUnknownDate) => true,
            (NotInterested, _) => false,
            (
                Candidate | WantSoon | AchievedWithDate | AchievedUnknownDate,
                Candidate | WantSoon | AchievedWithDate | AchievedUnknownDate | NotInterested,
            ) => false,
        }
    }

    /// Stable storage key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::WantSoon => "want-soon",
            Self::AchievedWithDate => "achieved",
            Self::AchievedUnknownDate => "achieved-undated",
            Self::NotInterested => "not-interested",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Candidate => "want to do",
            Self::WantSoon => "want to do soon",
            Self::AchievedWithDate => "done",
            Self::AchievedUnknownDate => "done (date unknown)",
            Self::NotInterested => "not interested",
        }
    }
}

impl fmt::Display for WishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status key.
#[derive(Debug, thiserror::Error)]
#[error("unknown wish status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for WishStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use WishStatus::*;

    #[test]
    fn promotion_and_demotion_are_legal() {
        assert!(Candidate.can_become(WantSoon));
        assert!(WantSoon.can_become(Candidate));
    }

    #[test]
    fn dated_completion_only_from_active_states() {
        assert!(Candidate.can_become(AchievedWithDate));
        assert!(WantSoon.can_become(AchievedWithDate));
        assert!(!AchievedUnknownDate.can_become(AchievedWithDate));
        assert!(!NotInterested.can_become(AchievedWithDate));
    }

    #[test]
    fn not_interested_is_terminal() {
        for to in WishStatus::ALL {
            assert!(!NotInterested.can_become(to), "NotInterested -> {to}");
        }
    }

    #[test]
    fn same_status_is_not_a_transition() {
        for status in WishStatus::ALL {
            assert!(!status.can_become(status));
        }
    }

    #[test]
    fn achieved_cannot_return_to_active() {
        for from in [AchievedWithDate, AchievedUnknownDate] {
            assert!(!from.can_become(Candidate));
            assert!(!from.can_become(WantSoon));
        }
    }

    #[test]
    fn storage_keys_parse_back() {
        for status in WishStatus::ALL {
            assert_eq!(status.as_str().parse::<WishStatus>().unwrap(), status);
        }
        assert!("done".parse::<WishStatus>().is_err());
    }
}
