use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{KycStatus, User};

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitKycRequest {
    #[validate(custom = "crate::utils::validation::validate_kyc_document")]
    pub document_number: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewKycRequest {
    pub approved: bool,

    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct KycStatusResponse {
    pub kyc_status: KycStatus,
    pub kyc_reference: Option<String>,
    pub document_last4: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl From<&User> for KycStatusResponse {
    fn from(user: &User) -> Self {
        Self {
            kyc_status: user.kyc_status(),
            kyc_reference: user.kyc_reference.clone(),
            document_last4: user.kyc_document_last4.clone(),
            submitted_at: user.kyc_submitted_at,
            verified_at: user.kyc_verified_at,
            rejection_reason: user.kyc_rejection_reason.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_number_must_be_twelve_digits() {
        let ok = SubmitKycRequest { document_number: "123412341234".to_string() };
        assert!(ok.validate().is_ok());

        let short = SubmitKycRequest { document_number: "1234".to_string() };
        assert!(short.validate().is_err());
    }
}
