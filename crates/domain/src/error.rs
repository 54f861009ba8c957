//! Errors raised by domain rules.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input that a value object or aggregate refuses.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// An operation the current contents forbid, such as removing the world view.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A current-view change outside the allowed transitions.
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_a_state_is_missing_then_the_message_names_it() {
        let err = DomainError::not_found("State", "cellar");
        assert_eq!(err.to_string(), "Entity not found: State with id cellar");
    }

    #[test]
    fn when_a_transition_is_refused_then_both_views_are_reported() {
        let err = DomainError::invalid_state_transition("encounter_a -> encounter_b");
        assert_eq!(
            err.to_string(),
            "Invalid state transition: encounter_a -> encounter_b"
        );
    }
}
