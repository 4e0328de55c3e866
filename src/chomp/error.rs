//! Request-scoped errors of the translation layer.

use tonic::Status;

/// Failure of the single outbound API call.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("failed to execute HTTP request against Chomp API: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to read HTTP response bytes from Chomp API: {0}")]
    Read(#[source] reqwest::Error),

    #[error("failed to unmarshal payload from Chomp API: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Errors returned to RPC callers, each with a coarse status code.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("missing api_key header")]
    PermissionDenied,

    #[error("no foods found")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl From<ServiceError> for Status {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::PermissionDenied => Status::permission_denied(err.to_string()),
            ServiceError::NotFound => Status::not_found(err.to_string()),
            ServiceError::Upstream(_) => Status::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn errors_map_to_coarse_codes() {
        assert_eq!(Status::from(ServiceError::PermissionDenied).code(), Code::PermissionDenied);
        assert_eq!(Status::from(ServiceError::NotFound).code(), Code::NotFound);

        let decode = serde_json::from_str::<u32>("nope").unwrap_err();
        let status = Status::from(ServiceError::from(UpstreamError::Decode(decode)));
        assert_eq!(status.code(), Code::Internal);
        assert!(status.message().starts_with("failed to unmarshal payload from Chomp API"));
    }
}
