//! Defect lifecycle transition policy
//!
//! The transition graph is a process-wide constant: directed edges only,
//! no implicit reverse edges, terminal statuses have no outgoing edges.
//! The policy performs no I/O and cannot fail except by answering
//! "not allowed".

use crate::value_objects::DefectStatus;

/// Statuses reachable in one step from `from`
pub const fn allowed_transitions(from: DefectStatus) -> &'static [DefectStatus] {
    match from {
        DefectStatus::New => &[DefectStatus::InProgress, DefectStatus::Canceled],
        DefectStatus::InProgress => &[DefectStatus::InReview, DefectStatus::Canceled],
        DefectStatus::InReview => &[DefectStatus::Closed, DefectStatus::Canceled],
        DefectStatus::Closed | DefectStatus::Canceled => &[],
    }
}

/// Whether the edge `from -> to` exists in the transition graph
pub fn can_transition(from: DefectStatus, to: DefectStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Whether moving into `to` is an elevated transition restricted to managers
pub const fn requires_manager(to: DefectStatus) -> bool {
    matches!(to, DefectStatus::Closed | DefectStatus::Canceled)
}

/// Whether `status` has no outgoing edges
pub const fn is_terminal(status: DefectStatus) -> bool {
    allowed_transitions(status).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use DefectStatus::*;

    #[test]
    fn test_transition_table_is_exact() {
        // Every (from, to) pair, checked against the full table.
        let legal = [
            (New, InProgress),
            (New, Canceled),
            (InProgress, InReview),
            (InProgress, Canceled),
            (InReview, Closed),
            (InReview, Canceled),
        ];

        for from in DefectStatus::ALL {
            for to in DefectStatus::ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    can_transition(from, to),
                    expected,
                    "unexpected answer for {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_outgoing_edges() {
        assert!(is_terminal(Closed));
        assert!(is_terminal(Canceled));
        for to in DefectStatus::ALL {
            assert!(!can_transition(Closed, to));
            assert!(!can_transition(Canceled, to));
        }
    }

    #[test]
    fn test_non_terminal_statuses_have_outgoing_edges() {
        assert!(!is_terminal(New));
        assert!(!is_terminal(InProgress));
        assert!(!is_terminal(InReview));
    }

    #[test]
    fn test_elevated_targets() {
        assert!(requires_manager(Closed));
        assert!(requires_manager(Canceled));
        assert!(!requires_manager(New));
        assert!(!requires_manager(InProgress));
        assert!(!requires_manager(InReview));
    }

    #[test]
    fn test_no_reverse_edges() {
        assert!(!can_transition(InProgress, New));
        assert!(!can_transition(InReview, InProgress));
        assert!(!can_transition(Closed, InReview));
    }
}
