use serde::Serialize;

use crate::utils::pagination::PageMeta;

/// Respuesta estándar de la API
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Página de resultados con sus metadatos
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, pagination: PageMeta) -> Self {
        Self { items, pagination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::pagination::Pagination;

    #[test]
    fn test_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::success_with_message(42, "ok")).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "ok");
        assert_eq!(value["data"], 42);

        let bare = serde_json::to_value(ApiResponse::success("x")).unwrap();
        assert!(bare.get("message").is_none());
    }

    #[test]
    fn test_paginated_shape() {
        let page = PaginatedResponse::new(vec![1, 2], PageMeta::new(12, Pagination::default()));
        let value = serde_json::to_value(page).unwrap();
        assert_eq!(value["items"].as_array().unwrap().len(), 2);
        assert_eq!(value["pagination"]["pages"], 2);
        assert_eq!(value["pagination"]["has_next"], true);
    }
}
