use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of an order. Stored as its canonical uppercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(OrderStatus::Pending),
            "PAID" => Some(OrderStatus::Paid),
            "SHIPPED" => Some(OrderStatus::Shipped),
            "DELIVERED" => Some(OrderStatus::Delivered),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Forward edges of the order state machine. Cancellation is allowed from
    /// any non-terminal state.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        match self {
            OrderStatus::Pending => matches!(next, OrderStatus::Paid | OrderStatus::Cancelled),
            OrderStatus::Paid => matches!(next, OrderStatus::Shipped | OrderStatus::Cancelled),
            OrderStatus::Shipped => matches!(next, OrderStatus::Delivered | OrderStatus::Cancelled),
            OrderStatus::Delivered | OrderStatus::Cancelled => false,
        }
    }
}

/// Whether admin status changes enforce the state-machine edges. Lenient mode
/// matches the historical behavior where any status may be set from any
/// status; repeating a transition then simply appends another timeline row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionMode {
    Strict,
    Lenient,
}

impl TransitionMode {
    pub fn allows(self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            TransitionMode::Lenient => true,
            TransitionMode::Strict => from.can_transition_to(to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_unknown_statuses() {
        assert_eq!(OrderStatus::parse("SHIPPEDX"), None);
        assert_eq!(OrderStatus::parse(""), None);
        assert_eq!(OrderStatus::parse("paid"), Some(OrderStatus::Paid));
        assert_eq!(OrderStatus::parse(" Delivered "), Some(OrderStatus::Delivered));
    }

    #[test]
    fn canonical_strings_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn strict_mode_follows_the_state_machine() {
        let mode = TransitionMode::Strict;
        assert!(mode.allows(OrderStatus::Pending, OrderStatus::Paid));
        assert!(mode.allows(OrderStatus::Paid, OrderStatus::Shipped));
        assert!(mode.allows(OrderStatus::Shipped, OrderStatus::Delivered));
        assert!(mode.allows(OrderStatus::Shipped, OrderStatus::Cancelled));
        assert!(!mode.allows(OrderStatus::Pending, OrderStatus::Shipped));
        assert!(!mode.allows(OrderStatus::Delivered, OrderStatus::Pending));
        assert!(!mode.allows(OrderStatus::Cancelled, OrderStatus::Paid));
        // repeating a status is not a forward edge
        assert!(!mode.allows(OrderStatus::Paid, OrderStatus::Paid));
    }

    #[test]
    fn lenient_mode_allows_any_transition() {
        let mode = TransitionMode::Lenient;
        assert!(mode.allows(OrderStatus::Delivered, OrderStatus::Pending));
        assert!(mode.allows(OrderStatus::Paid, OrderStatus::Paid));
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for status in OrderStatus::ALL {
            if status.is_terminal() {
                for next in OrderStatus::ALL {
                    assert!(!status.can_transition_to(next));
                }
            }
        }
    }
}
