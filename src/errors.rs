use axum::http::StatusCode;
use axum::response::IntoResponse;
use thiserror::Error;

use crate::external::chart_data::DataSourceError;
use crate::models::AggregationMode;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
    #[error("Aggregation mode {0} is not yet supported")]
    UnsupportedMode(AggregationMode),
    #[error("Data source error: {0}")]
    DataSource(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::InvalidSelection(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::UnsupportedMode(mode) => (
                StatusCode::NOT_IMPLEMENTED,
                format!("Aggregation mode {} is not yet supported", mode),
            )
                .into_response(),
            AppError::DataSource(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
            AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<DataSourceError> for AppError {
    fn from(value: DataSourceError) -> Self {
        AppError::DataSource(value.to_string())
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::InvalidSelection(value)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(value: tokio::task::JoinError) -> Self {
        AppError::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (AppError::InvalidSelection("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::UnsupportedMode(AggregationMode::Daily), StatusCode::NOT_IMPLEMENTED),
            (AppError::DataSource("io".into()), StatusCode::BAD_GATEWAY),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_bad_request_with_plain_message() {
        let response =
            AppError::InvalidSelection("Unknown ticker 'GME'".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Unknown ticker 'GME'");
    }

    #[test]
    fn test_validation_messages_convert_to_invalid_selection() {
        let err: AppError = "Top must be one of [3, 5, 10, 15], got 4".to_string().into();
        assert!(matches!(err, AppError::InvalidSelection(_)));
    }

    #[test]
    fn test_collaborator_failures_are_opaque() {
        let err: AppError = DataSourceError::Missing("data/tweets.csv".into()).into();
        assert!(matches!(err, AppError::DataSource(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
