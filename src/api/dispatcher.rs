//! Request dispatcher: authenticates, sends, checks the status and decodes.

use super::credential::Credential;
use super::transport::{HttpRequest, Transport};
use crate::error::{DecodeError, HttpError, Result, VstsError};
use serde_json::Value;

/// Owns the transport and credential for one host.
///
/// Configuration is fixed at construction, apart from [`Dispatcher::transport_mut`]
/// which needs `&mut self` and so cannot overlap an in-flight call.
pub struct Dispatcher<T> {
    host: String,
    credential: Box<dyn Credential>,
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(host: impl Into<String>, credential: Box<dyn Credential>, transport: T) -> Self {
        Self {
            host: host.into(),
            credential,
            transport,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Performs one round trip and returns the decoded JSON body.
    ///
    /// Returns `Ok(None)` for an empty body (e.g. deletes).
    ///
    /// # Errors
    ///
    /// - [`VstsError::Transport`] when the exchange could not complete
    /// - [`VstsError::Http`] for any status of 300 or above
    /// - [`VstsError::Decode`] when the body is not UTF-8 JSON
    pub async fn perform(&self, mut request: HttpRequest) -> Result<Option<Value>> {
        request.host = self.host.clone();
        request
            .headers
            .insert("Accept".to_string(), "application/json".to_string());
        request.headers.insert(
            "Authorization".to_string(),
            self.credential.authorization_header(),
        );

        tracing::debug!(
            method = %request.method,
            host = %request.host,
            path = %request.path,
            query = %request.query,
            "sending request"
        );
        if let Some(body) = &request.body {
            tracing::debug!(body = %String::from_utf8_lossy(body), "request body");
        }

        let response = self
            .transport
            .send(&request)
            .await
            .map_err(VstsError::Transport)?;

        tracing::debug!(
            status = response.status,
            body = %String::from_utf8_lossy(&response.body),
            "received response"
        );

        if response.status >= 300 {
            tracing::warn!(
                status = response.status,
                reason = %response.reason,
                path = %request.path,
                "request rejected"
            );
            return Err(HttpError {
                status: response.status,
                reason: response.reason,
                headers: response.headers,
                body: response.body,
            }
            .into());
        }

        if response.body.is_empty() {
            return Ok(None);
        }

        let text = std::str::from_utf8(&response.body).map_err(DecodeError::from)?;
        let value = serde_json::from_str(text).map_err(DecodeError::from)?;
        Ok(Some(value))
    }

    /// Performs one round trip and passes the decoded body through `parser`.
    ///
    /// The parser only runs for successful responses. An empty body reaches
    /// it as `null`, which record parsers reject.
    pub async fn perform_with<R, F>(&self, request: HttpRequest, parser: F) -> Result<R>
    where
        F: FnOnce(&Value) -> std::result::Result<R, DecodeError>,
    {
        let value = self.perform(request).await?.unwrap_or(Value::Null);
        Ok(parser(&value)?)
    }
}
