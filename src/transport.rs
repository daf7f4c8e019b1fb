// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP transport used to talk to the Identity service.
//!
//! A [Connector](trait.Connector.html) creates a
//! [Transport](trait.Transport.html) bound to one endpoint. The default
//! implementation is [HttpConnector](struct.HttpConnector.html), based on
//! `reqwest`. Custom implementations can be injected with
//! [Connection::with_connector](../connection/struct.Connection.html#method.with_connector).

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};

use super::error::TransportError;
use super::headers::ResponseHeaders;

/// JSON media type.
pub const APPLICATION_JSON: &str = "application/json";

/// Response as returned by a transport.
///
/// `Debug` output masks the token header, see
/// [ResponseHeaders](../headers/struct.ResponseHeaders.html).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// Response headers.
    pub headers: ResponseHeaders,
    /// Raw response body.
    pub body: String,
}

/// Transport bound to a single endpoint.
#[async_trait]
pub trait Transport: Debug + Send + Sync {
    /// Send a POST request with the given body.
    ///
    /// Implementations must return an error for non-success responses.
    async fn post(
        &self,
        body: String,
        content_type: &str,
        accept: &str,
    ) -> Result<RawResponse, TransportError>;
}

/// Factory of transports.
pub trait Connector: Debug + Send + Sync {
    /// Create a transport for the endpoint.
    fn transport(
        &self,
        endpoint: &str,
        verify_ssl: bool,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn Transport>, TransportError>;
}

/// Connector using `reqwest`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

/// Transport using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport for the endpoint.
    pub fn new(
        endpoint: &str,
        verify_ssl: bool,
        timeout: Option<Duration>,
    ) -> Result<HttpTransport, TransportError> {
        let endpoint = Url::parse(endpoint)?;
        let mut builder = Client::builder().danger_accept_invalid_certs(!verify_ssl);
        if let Some(value) = timeout {
            builder = builder.timeout(value);
        }
        Ok(HttpTransport {
            client: builder.build()?,
            endpoint,
        })
    }

    /// Endpoint this transport talks to.
    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Connector for HttpConnector {
    fn transport(
        &self,
        endpoint: &str,
        verify_ssl: bool,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(HttpTransport::new(endpoint, verify_ssl, timeout)?))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        body: String,
        content_type: &str,
        accept: &str,
    ) -> Result<RawResponse, TransportError> {
        trace!("POST {}", self.endpoint);
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, accept)
            .body(body)
            .send()
            .await?
            .error_for_status()?;
        trace!("Received HTTP {} from {}", resp.status(), self.endpoint);
        let headers = ResponseHeaders::from(resp.headers());
        let body = resp.text().await?;
        Ok(RawResponse { headers, body })
    }
}
