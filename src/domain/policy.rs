use crate::domain::event::TransactionEvent;

/// Messages abandoned more than this many times are treated as poison.
pub const MAX_DELIVERY_ATTEMPTS: u32 = 3;

/// Decides whether a decoded event should bypass processing entirely.
///
/// Info and Error events are informational echoes carrying no actionable
/// balance mutation; any message redelivered more than
/// `MAX_DELIVERY_ATTEMPTS` times is contained regardless of kind.
pub fn should_dead_letter(event: &TransactionEvent, delivery_attempts: u32) -> bool {
    matches!(
        event,
        TransactionEvent::Info { .. } | TransactionEvent::Error { .. }
    ) || delivery_attempts > MAX_DELIVERY_ATTEMPTS
}

/// Reason and description recorded against the dead-lettered message.
pub fn dead_letter_reason(
    event: &TransactionEvent,
    delivery_attempts: u32,
) -> (&'static str, String) {
    if !event.is_transactional() && delivery_attempts <= MAX_DELIVERY_ATTEMPTS {
        (
            "NonTransactionalMessage",
            format!("{} events carry no balance mutation", event.kind()),
        )
    } else {
        (
            "MaxDeliveryAttemptsExceeded",
            format!("message was delivered {delivery_attempts} times"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::Amount;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn debit() -> TransactionEvent {
        TransactionEvent::Debit {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            amount: Amount::new(dec!(1.0)).unwrap(),
        }
    }

    fn info() -> TransactionEvent {
        TransactionEvent::Info {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_info_and_error_are_dead_lettered_on_first_delivery() {
        assert!(should_dead_letter(&info(), 0));
        let error = TransactionEvent::Error {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
        };
        assert!(should_dead_letter(&error, 0));
    }

    #[test]
    fn test_transactional_events_pass_within_attempt_budget() {
        assert!(!should_dead_letter(&debit(), 0));
        assert!(!should_dead_letter(&debit(), MAX_DELIVERY_ATTEMPTS));
    }

    #[test]
    fn test_poison_messages_are_contained_regardless_of_kind() {
        assert!(should_dead_letter(&debit(), MAX_DELIVERY_ATTEMPTS + 1));
    }

    #[test]
    fn test_unsupported_kind_is_not_dead_lettered_early() {
        let event = TransactionEvent::Unsupported {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            kind: "Transfer".to_string(),
        };
        // Routed to the processor, which rejects it; only poison containment
        // applies here.
        assert!(!should_dead_letter(&event, 0));
        assert!(should_dead_letter(&event, 4));
    }

    #[test]
    fn test_reason_reports_poison_before_kind() {
        let (reason, description) = dead_letter_reason(&info(), 5);
        assert_eq!(reason, "MaxDeliveryAttemptsExceeded");
        assert!(description.contains('5'));

        let (reason, _) = dead_letter_reason(&info(), 0);
        assert_eq!(reason, "NonTransactionalMessage");
    }
}
