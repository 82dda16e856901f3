//! Macro for implementing Display and FromStr for status enums
//!
//! Order and command statuses arrive as lowercase strings; this keeps their
//! textual form in one place for log fields and error messages.
//!
//! # Example
//!
//! ```rust
//! use dbaas_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum RestoreStatus {
//!     Queued,
//!     Running,
//!     Done,
//! }
//!
//! impl_domain_status_conversions!(RestoreStatus {
//!     Queued => "queued",
//!     Running => "running",
//!     Done => "done",
//! });
//! ```

/// Implements Display and FromStr traits for status enums
///
/// This macro generates:
/// - Display trait: converts enum variants to lowercase strings
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
///
/// # Features
///
/// - Case-insensitive parsing (e.g., "PENDING", "pending", "Pending" all work)
/// - Consistent lowercase string output
/// - Descriptive error messages with enum name
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::types::{CommandStatus, OrderStatus};

    #[test]
    fn order_status_displays_wire_form() {
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert_eq!(OrderStatus::Success.to_string(), "success");
        assert_eq!(OrderStatus::Error.to_string(), "error");
    }

    #[test]
    fn command_status_parses_case_insensitively() {
        assert_eq!(CommandStatus::from_str("SUCCESS").unwrap(), CommandStatus::Success);
        assert_eq!(CommandStatus::from_str("Failed").unwrap(), CommandStatus::Failed);
    }

    #[test]
    fn unknown_status_reports_enum_name() {
        let err = OrderStatus::from_str("exploded").unwrap_err();
        assert!(err.contains("Invalid OrderStatus: exploded"));
    }
}
