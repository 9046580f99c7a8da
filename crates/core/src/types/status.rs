//! Status and role enums mirrored from the gateway's wire contract.

use serde::{Deserialize, Serialize};

/// Role of a gateway user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserRole {
    /// A paying customer.
    #[default]
    #[serde(rename = "endUser")]
    EndUser,
    /// A merchant receiving payouts.
    #[serde(rename = "merchant")]
    Merchant,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndUser => write!(f, "endUser"),
            Self::Merchant => write!(f, "merchant"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "endUser" | "end_user" | "customer" => Ok(Self::EndUser),
            "merchant" => Ok(Self::Merchant),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Gateway account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Pending,
    Active,
    Suspended,
}

/// Shop order status.
///
/// An order is created `Pending` and only becomes `Completed` once the bank
/// payment step returns a confirmed transaction id. There is no client-side
/// transition to `Completed` without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
}

/// Gateway payment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Cancelled,
}

/// Gateway transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TransactionStatus {
    #[default]
    Pending,
    Success,
    Failed,
    Reversed,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_wire_names() {
        assert_eq!(serde_json::to_string(&UserRole::EndUser).unwrap(), "\"endUser\"");
        assert_eq!(serde_json::to_string(&UserRole::Merchant).unwrap(), "\"merchant\"");
        let role: UserRole = serde_json::from_str("\"endUser\"").unwrap();
        assert_eq!(role, UserRole::EndUser);
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!("merchant".parse::<UserRole>().unwrap(), UserRole::Merchant);
        assert_eq!("endUser".parse::<UserRole>().unwrap(), UserRole::EndUser);
        assert!("admin2".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_order_status_wire_names() {
        assert_eq!(serde_json::to_string(&OrderStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(
            serde_json::to_string(&OrderStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn test_payment_status_wire_names() {
        // The gateway capitalizes payment statuses, unlike order statuses.
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Cancelled).unwrap(),
            "\"Cancelled\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Success).unwrap(),
            "\"Success\""
        );
    }
}
