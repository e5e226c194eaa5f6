use crate::constants::{ERROR_SERVER_UNAVAILABLE, ERROR_TIMEOUT};
use crate::error::ApiError;

pub fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_connect() {
        ApiError::network(ERROR_SERVER_UNAVAILABLE)
    } else if err.is_timeout() {
        ApiError::network(ERROR_TIMEOUT)
    } else {
        log::error!("HTTP request failed: {}", err);
        ApiError::network(&format!("chat request failed: {}", err))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        map_reqwest_error(err)
    }
}
