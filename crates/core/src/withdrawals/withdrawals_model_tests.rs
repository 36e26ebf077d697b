//! Tests for the withdrawal state machine.

#[cfg(test)]
mod tests {
    use crate::withdrawals::{WithdrawalEvent, WithdrawalSource, WithdrawalStatus};

    fn confirm() -> WithdrawalEvent {
        WithdrawalEvent::ConfirmPaid {
            rrn: "RRN123".to_string(),
            gateway: "razorpay".to_string(),
        }
    }

    fn reject() -> WithdrawalEvent {
        WithdrawalEvent::Reject {
            reason: "kyc mismatch".to_string(),
        }
    }

    fn fail() -> WithdrawalEvent {
        WithdrawalEvent::Fail {
            reason: Some("rail timeout".to_string()),
        }
    }

    #[test]
    fn test_happy_path() {
        let s = WithdrawalStatus::Requested;
        let s = s.transition(&WithdrawalEvent::SubmitForReview).unwrap();
        assert_eq!(s, WithdrawalStatus::UnderAdminReview);
        let s = s.transition(&WithdrawalEvent::Approve).unwrap();
        assert_eq!(s, WithdrawalStatus::Approved);
        let s = s.transition(&confirm()).unwrap();
        assert_eq!(s, WithdrawalStatus::Paid);
        assert!(s.is_terminal());
    }

    #[test]
    fn test_reject_and_fail_reachable_from_all_non_terminal_states() {
        for from in [
            WithdrawalStatus::Requested,
            WithdrawalStatus::UnderAdminReview,
            WithdrawalStatus::Approved,
        ] {
            assert_eq!(from.transition(&reject()).unwrap(), WithdrawalStatus::Rejected);
            assert_eq!(from.transition(&fail()).unwrap(), WithdrawalStatus::Failed);
        }
    }

    #[test]
    fn test_reprocess_is_the_only_backward_transition() {
        let s = WithdrawalStatus::Failed
            .transition(&WithdrawalEvent::Reprocess)
            .unwrap();
        assert_eq!(s, WithdrawalStatus::UnderAdminReview);

        for from in [
            WithdrawalStatus::Requested,
            WithdrawalStatus::UnderAdminReview,
            WithdrawalStatus::Approved,
            WithdrawalStatus::Paid,
            WithdrawalStatus::Rejected,
        ] {
            assert!(from.transition(&WithdrawalEvent::Reprocess).is_err());
        }
    }

    #[test]
    fn test_terminal_states_never_move() {
        let events = [
            WithdrawalEvent::SubmitForReview,
            WithdrawalEvent::Approve,
            confirm(),
            reject(),
            fail(),
        ];
        for terminal in [WithdrawalStatus::Paid, WithdrawalStatus::Rejected] {
            assert!(terminal.is_terminal());
            for event in &events {
                assert!(terminal.transition(event).is_err());
            }
        }
    }

    #[test]
    fn test_no_skipping_review_or_approval() {
        assert!(WithdrawalStatus::Requested.transition(&confirm()).is_err());
        assert!(WithdrawalStatus::Requested
            .transition(&WithdrawalEvent::Approve)
            .is_err());
        assert!(WithdrawalStatus::UnderAdminReview
            .transition(&confirm())
            .is_err());
    }

    #[test]
    fn test_failed_is_not_terminal() {
        assert!(!WithdrawalStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_and_source_round_trip() {
        for status in [
            WithdrawalStatus::Requested,
            WithdrawalStatus::UnderAdminReview,
            WithdrawalStatus::Approved,
            WithdrawalStatus::Paid,
            WithdrawalStatus::Rejected,
            WithdrawalStatus::Failed,
        ] {
            assert_eq!(WithdrawalStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(WithdrawalStatus::parse("queued").is_err());

        for source in [WithdrawalSource::Earnings, WithdrawalSource::Referral] {
            assert_eq!(WithdrawalSource::parse(source.as_str()).unwrap(), source);
        }
        assert!(WithdrawalSource::parse("bonus").is_err());
    }
}
