use serde::Deserialize;
use validator::Validate;

/// Retención de fondos para una reserva
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PreAuthorizeRequest {
    #[validate(length(min = 1, max = 255))]
    pub payment_method_ref: Option<String>,
}
