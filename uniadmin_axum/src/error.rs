use http::StatusCode;
use uniadmin::CoordinationError;

/// Helper trait for converting errors to a standard response error format
pub(super) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Every coordination failure is an infrastructure fault. Details stay in the log.
impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            tracing::error!("Request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            )
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, askama::Error> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordination_error_is_internal_and_opaque() {
        // Given a storage failure with internal details
        let result: Result<(), CoordinationError> = Err(CoordinationError::Coordination(
            "database is locked".to_string(),
        ));

        // When converting to a response error
        let response_error = result.into_response_error();

        // Then the status is 500 and the details are not exposed
        let Err((status, body)) = response_error else {
            panic!("expected an error");
        };
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("locked"));
    }

    #[test]
    fn test_success_case() {
        let result: Result<String, CoordinationError> = Ok("Success".to_string());
        assert_eq!(result.into_response_error().unwrap(), "Success");
    }

    #[test]
    fn test_askama_error_is_internal() {
        let result: Result<(), askama::Error> = Err(askama::Error::Fmt);

        let Err((status, _)) = result.into_response_error() else {
            panic!("expected an error");
        };
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
