//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// Where an order sits in its lifecycle.
///
/// Transitions are one-way:
///
/// ```text
/// PendingPayment ──► Paid ──► Delivered
///        │
///        └─────────► Voided
/// ```
///
/// `Voided` is reached only from `PendingPayment`, by the compensating
/// cleanup after a failed payment-intent creation or by the reconciler
/// sweeping orders whose intent never succeeded within the timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, intent requested, awaiting payment confirmation.
    #[default]
    PendingPayment,
    /// Payment verified with the processor.
    Paid,
    /// Fulfilled and handed to the customer.
    Delivered,
    /// Abandoned before payment; stock has been restored.
    Voided,
}

impl OrderStatus {
    /// Whether the transition `self -> next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::PendingPayment, Self::Paid)
                | (Self::PendingPayment, Self::Voided)
                | (Self::Paid, Self::Delivered)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PendingPayment => write!(f, "pending_payment"),
            Self::Paid => write!(f, "paid"),
            Self::Delivered => write!(f, "delivered"),
            Self::Voided => write!(f, "voided"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(Self::PendingPayment),
            "paid" => Ok(Self::Paid),
            "delivered" => Ok(Self::Delivered),
            "voided" => Ok(Self::Voided),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}
