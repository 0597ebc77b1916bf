use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Lifecycle of an interest (negotiation offer) between two profiles.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InterestStatus {
    #[sea_orm(string_value = "AWAITING_CONFIRMATION")]
    AwaitingConfirmation,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// Which side of an interest is allowed to trigger a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InterestParty {
    /// The profile that made the offer.
    Interested,
    /// The profile that received the offer.
    Target,
}

impl InterestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InterestStatus::AwaitingConfirmation)
    }

    /// Party whose action triggers `self -> to`, or `None` if the transition is not allowed.
    pub fn transition_party(&self, to: InterestStatus) -> Option<InterestParty> {
        match (self, to) {
            (InterestStatus::AwaitingConfirmation, InterestStatus::Accepted) => {
                Some(InterestParty::Target)
            }
            (InterestStatus::AwaitingConfirmation, InterestStatus::Rejected) => {
                Some(InterestParty::Target)
            }
            (InterestStatus::AwaitingConfirmation, InterestStatus::Cancelled) => {
                Some(InterestParty::Interested)
            }
            // Terminal states and same-state requests are rejected
            _ => None,
        }
    }

    pub fn can_transition_to(&self, to: InterestStatus) -> bool {
        self.transition_party(to).is_some()
    }

    pub fn validate_transition(&self, to: InterestStatus) -> Result<InterestParty, ServiceError> {
        self.transition_party(to)
            .ok_or(ServiceError::InvalidStateTransition { from: *self, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::str::FromStr;

    const ALL: [InterestStatus; 4] = [
        InterestStatus::AwaitingConfirmation,
        InterestStatus::Accepted,
        InterestStatus::Rejected,
        InterestStatus::Cancelled,
    ];

    #[test]
    fn only_three_transitions_are_permitted() {
        let allowed: Vec<_> = ALL
            .iter()
            .flat_map(|from| ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();
        assert_eq!(
            allowed,
            vec![
                (InterestStatus::AwaitingConfirmation, InterestStatus::Accepted),
                (InterestStatus::AwaitingConfirmation, InterestStatus::Rejected),
                (InterestStatus::AwaitingConfirmation, InterestStatus::Cancelled),
            ]
        );
    }

    #[test]
    fn triggers_match_the_negotiating_party() {
        let awaiting = InterestStatus::AwaitingConfirmation;
        assert_eq!(
            awaiting.transition_party(InterestStatus::Accepted),
            Some(InterestParty::Target)
        );
        assert_eq!(
            awaiting.transition_party(InterestStatus::Rejected),
            Some(InterestParty::Target)
        );
        assert_eq!(
            awaiting.transition_party(InterestStatus::Cancelled),
            Some(InterestParty::Interested)
        );
    }

    #[test]
    fn terminal_and_same_state_requests_name_the_pair() {
        assert_matches!(
            InterestStatus::Accepted.validate_transition(InterestStatus::Rejected),
            Err(ServiceError::InvalidStateTransition {
                from: InterestStatus::Accepted,
                to: InterestStatus::Rejected
            })
        );
        assert_matches!(
            InterestStatus::AwaitingConfirmation
                .validate_transition(InterestStatus::AwaitingConfirmation),
            Err(ServiceError::InvalidStateTransition { .. })
        );
        assert!(ALL[1..].iter().all(InterestStatus::is_terminal));
    }

    #[test]
    fn wire_names_are_screaming_snake_case() {
        assert_eq!(
            InterestStatus::AwaitingConfirmation.to_string(),
            "AWAITING_CONFIRMATION"
        );
        assert_eq!(
            InterestStatus::from_str("CANCELLED").unwrap(),
            InterestStatus::Cancelled
        );
        assert_eq!(
            serde_json::to_string(&InterestStatus::Accepted).unwrap(),
            "\"ACCEPTED\""
        );
    }
}
