//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL. Los enums se guardan como TEXT en mayúsculas
//! (`PENDING_APPROVAL`, `SUPER_ADMIN`...) y se convierten con `as_str` / `FromStr`.

/// Error al interpretar un valor textual como enum del dominio
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declara un enum guardado como TEXT con su representación en mayúsculas
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err($crate::models::ParseEnumError {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod actor;
pub mod admin;
pub mod loyalty;
pub mod payment;
pub mod rental;
pub mod station;
pub mod user;
pub mod vehicle;

pub use actor::Actor;
pub use admin::{Admin, AdminRole};
pub use loyalty::{LoyaltyAccount, LoyaltyTier, LoyaltyTransaction, LoyaltyTransactionType};
pub use payment::{AuthorizationStatus, Payment, PaymentAuthorization, PaymentStatus, PaymentType};
pub use rental::{Rental, RentalPaymentStatus, RentalStatus};
pub use station::Station;
pub use user::{KycStatus, User};
pub use vehicle::{Vehicle, VehicleStatus, VehicleType};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_enum_round_trip_and_case() {
        for status in RentalStatus::ALL {
            assert_eq!(status.as_str().parse::<RentalStatus>().unwrap(), *status);
        }
        assert_eq!("pending_approval".parse::<RentalStatus>().unwrap(), RentalStatus::PendingApproval);
        assert_eq!(AdminRole::StationMaster.to_string(), "STATION_MASTER");
    }

    #[test]
    fn test_text_enum_rejects_unknown_values() {
        let err = "FLYING".parse::<VehicleStatus>().unwrap_err();
        assert_eq!(err.kind, "VehicleStatus");
        assert_eq!(err.to_string(), "Invalid VehicleStatus: 'FLYING'");
    }

    #[test]
    fn test_text_enum_serde_uses_stored_text() {
        let json = serde_json::to_string(&VehicleStatus::OutOfService).unwrap();
        assert_eq!(json, "\"OUT_OF_SERVICE\"");
        let tier: LoyaltyTier = serde_json::from_str("\"GOLD\"").unwrap();
        assert_eq!(tier, LoyaltyTier::Gold);
    }

    #[test]
    fn test_loyalty_tiers_are_ordered() {
        assert!(LoyaltyTier::Basic < LoyaltyTier::Silver);
        assert!(LoyaltyTier::Silver < LoyaltyTier::Gold);
        assert!(LoyaltyTier::Gold < LoyaltyTier::Platinum);
    }
}
