//! Conversions from external infrastructure errors into domain errors.

use dbaas_domain::DbaasError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DbaasError);

impl From<InfraError> for DbaasError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DbaasError> for InfraError {
    fn from(value: DbaasError) -> Self {
        Self(value)
    }
}

trait IntoDbaasError {
    fn into_dbaas(self) -> DbaasError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DbaasError */
/* -------------------------------------------------------------------------- */

impl IntoDbaasError for HttpError {
    fn into_dbaas(self) -> DbaasError {
        let context = self.url().map_or_else(String::new, |url| format!(" ({url})"));

        if self.is_timeout() {
            return DbaasError::Network(format!("http request timed out{context}: {self}"));
        }
        if self.is_connect() {
            return DbaasError::Network(format!("http connection failed{context}: {self}"));
        }
        if self.is_builder() {
            return DbaasError::Config(format!("invalid http request{context}: {self}"));
        }
        if self.is_decode() || self.is_body() {
            return DbaasError::Decode(format!("http body could not be read{context}: {self}"));
        }
        if let Some(status) = self.status() {
            return DbaasError::from_status("http request", 200, status.as_u16(), &self.to_string());
        }
        DbaasError::Network(format!("http request failed{context}: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_dbaas())
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn refused_connection_is_a_transient_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reqwest::Client::new().get(format!("http://{addr}")).send().await.unwrap_err();
        let converted: DbaasError = InfraError::from(err).into();

        assert!(matches!(converted, DbaasError::Network(_)), "{converted:?}");
        assert!(converted.is_transient());
    }

    #[test]
    fn invalid_url_is_a_config_error() {
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let converted: DbaasError = InfraError::from(err).into();
        assert!(matches!(converted, DbaasError::Config(_)), "{converted:?}");
    }
}
