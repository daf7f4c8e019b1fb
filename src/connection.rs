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

//! Connection to the object storage.
//!
//! The connection authenticates against the Identity service, keeps the
//! resulting token and the object-store catalog entry and resolves the admin,
//! internal and public URLs of the storage.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Local};
use log::{debug, error, info, trace};
use serde::Deserialize;
use serde_json::Value;
use static_assertions::assert_impl_all;

use super::catalog::{find_object_store, InterfaceType, OBJECT_STORE};
use super::config::Options;
use super::headers::{ResponseHeaders, SUBJECT_TOKEN};
use super::protocol::{AuthRoot, CatalogRecord, TokenRoot};
use super::transport::{Connector, HttpConnector, RawResponse, APPLICATION_JSON};
use super::{Error, ErrorKind, Result};

const MISSING_SUBJECT_HEADER: &str = "Missing X-Subject-Token header";

/// Response of the Identity service to an authentication request.
///
/// The token header is masked in the `Debug` output.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResponse {
    headers: ResponseHeaders,
    body: Value,
}

impl AuthResponse {
    /// Parse a raw transport response.
    pub fn parse(raw: RawResponse) -> Result<AuthResponse> {
        let body = serde_json::from_str(&raw.body)?;
        Ok(AuthResponse {
            headers: raw.headers,
            body,
        })
    }

    /// Response headers.
    #[inline]
    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    /// Parsed response body.
    #[inline]
    pub fn body(&self) -> &Value {
        &self.body
    }
}

#[derive(Clone, PartialEq, Eq)]
struct Token(String);

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        write!(f, "Token {{ hash: {} }}", hasher.finish())
    }
}

#[derive(Clone)]
struct Session {
    auth_response: AuthResponse,
    token: Token,
    expires_at: DateTime<Local>,
    catalog: CatalogRecord,
    admin_url: String,
    internal_url: String,
    public_url: String,
    upload_url: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token)
            .field("expires_at", &self.expires_at)
            .field("catalog", &self.catalog)
            .field("admin_url", &self.admin_url)
            .field("internal_url", &self.internal_url)
            .field("public_url", &self.public_url)
            .field("upload_url", &self.upload_url)
            .finish()
    }
}

impl Session {
    fn new(auth_response: AuthResponse, options: &Options) -> Result<Session> {
        let token = match auth_response.headers.get(SUBJECT_TOKEN) {
            Some(value) => Token(value.to_string()),
            None => {
                error!("No X-Subject-Token header received from {}", options.auth_url());
                return Err(Error::new(ErrorKind::InvalidResponse, MISSING_SUBJECT_HEADER));
            }
        };

        let root = TokenRoot::deserialize(&auth_response.body)?;
        let expires_at = root.token.expires_at.with_timezone(&Local);
        debug!("Received a token expiring at {}", expires_at);
        trace!("Received catalog: {:?}", root.token.catalog);

        let catalog = match find_object_store(&root.token.catalog) {
            Some(record) => record.clone(),
            None => {
                error!(
                    "No {} service in the catalog for project {}",
                    OBJECT_STORE,
                    options.tenant_name()
                );
                return Err(Error::new(
                    ErrorKind::ConfigurationError,
                    format!(
                        "No {} service in the catalog, check the tenant and credentials",
                        OBJECT_STORE
                    ),
                ));
            }
        };

        let lookup = options.endpoint_lookup();
        let admin_url = match options.admin_url() {
            Some(url) => url.to_string(),
            None => catalog.endpoint_url(InterfaceType::Admin, lookup)?.to_string(),
        };
        let internal_url = catalog
            .endpoint_url(InterfaceType::Internal, lookup)?
            .to_string();
        let public_url = match options.public_url() {
            Some(url) => url.to_string(),
            None => catalog.endpoint_url(InterfaceType::Public, lookup)?.to_string(),
        };
        let upload_url = format!("{}/{}", admin_url, options.bucket());

        Ok(Session {
            auth_response,
            token,
            expires_at,
            catalog,
            admin_url,
            internal_url,
            public_url,
            upload_url,
        })
    }
}

#[derive(Debug)]
enum State {
    Disconnected,
    Authenticated(Box<Session>),
    Failed,
}

/// Observable status of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// `connect` has never been called.
    Disconnected,
    /// Authenticated and the token is still valid.
    Connected,
    /// Authenticated but the token has expired.
    Expired,
    /// The last `connect` call failed.
    Failed,
}

/// Connection to the object storage.
///
/// Start with [new](#method.new), then call [connect](#method.connect):
///
/// ```rust,no_run
/// # async fn example() -> Result<(), nightcrawler_swift::Error> {
/// use nightcrawler_swift::{Connection, Options};
///
/// let options = Options::new(
///     "my-bucket",
///     "project1",
///     "admin",
///     "pa$$w0rd",
///     "https://cloud.local/identity/v3/auth/tokens",
/// );
/// let mut conn = Connection::new(options);
/// let upload_url = conn.connect().await?.upload_url().map(String::from);
/// assert!(conn.is_connected());
/// # Ok(()) }
/// ```
///
/// The token is never refreshed behind the caller's back: check
/// [is_connected](#method.is_connected) and call `connect` again (or use
/// [ensure_connected](#method.ensure_connected)) once it expires.
#[derive(Debug)]
pub struct Connection {
    options: Options,
    connector: Box<dyn Connector>,
    state: State,
}

assert_impl_all!(Connection: Send, Sync);

impl Connection {
    /// Create a connection using the default HTTP transport.
    pub fn new(options: Options) -> Connection {
        Connection::with_connector(options, HttpConnector)
    }

    /// Create a connection using a custom transport.
    pub fn with_connector<C>(options: Options, connector: C) -> Connection
    where
        C: Connector + 'static,
    {
        Connection {
            options,
            connector: Box::new(connector),
            state: State::Disconnected,
        }
    }

    /// Authenticate and populate the connection.
    ///
    /// Performs exactly one request to the Identity service. On failure the
    /// previous session (if any) is dropped.
    pub async fn connect(&mut self) -> Result<&mut Connection> {
        match self.authenticate().await {
            Ok(session) => {
                info!(
                    "Connected to {} as user {}, token expires at {}",
                    session.admin_url,
                    self.options.username(),
                    session.expires_at
                );
                self.state = State::Authenticated(Box::new(session));
                Ok(self)
            }
            Err(err) => {
                error!(
                    "Cannot connect to {} as user {}: {}",
                    self.options.auth_url(),
                    self.options.username(),
                    err
                );
                self.state = State::Failed;
                Err(err)
            }
        }
    }

    /// Connect unless the current token is still valid.
    pub async fn ensure_connected(&mut self) -> Result<&mut Connection> {
        if self.is_connected() {
            trace!("Token is still valid, not reconnecting");
            return Ok(self);
        }
        self.connect().await
    }

    /// Whether a token is present and has not expired yet.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.is_connected_at(Local::now())
    }

    /// Whether a token is present and is still valid at the given time.
    pub fn is_connected_at(&self, now: DateTime<Local>) -> bool {
        match self.session() {
            Some(session) => session.expires_at > now,
            None => false,
        }
    }

    /// Current status.
    pub fn status(&self) -> Status {
        match self.state {
            State::Disconnected => Status::Disconnected,
            State::Failed => Status::Failed,
            State::Authenticated(..) if self.is_connected() => Status::Connected,
            State::Authenticated(..) => Status::Expired,
        }
    }

    /// Options of this connection.
    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Full response of the last successful authentication.
    pub fn auth_response(&self) -> Option<&AuthResponse> {
        self.session().map(|s| &s.auth_response)
    }

    /// Token ID.
    pub fn token_id(&self) -> Option<&str> {
        self.session().map(|s| s.token.0.as_str())
    }

    /// Token expiration time.
    pub fn expires_at(&self) -> Option<DateTime<Local>> {
        self.session().map(|s| s.expires_at)
    }

    /// Object-store entry of the service catalog.
    pub fn catalog(&self) -> Option<&CatalogRecord> {
        self.session().map(|s| &s.catalog)
    }

    /// Admin URL of the storage.
    pub fn admin_url(&self) -> Option<&str> {
        self.session().map(|s| s.admin_url.as_str())
    }

    /// Internal URL of the storage.
    pub fn internal_url(&self) -> Option<&str> {
        self.session().map(|s| s.internal_url.as_str())
    }

    /// Public URL of the storage.
    pub fn public_url(&self) -> Option<&str> {
        self.session().map(|s| s.public_url.as_str())
    }

    /// URL to upload objects to: the admin URL followed by the bucket.
    pub fn upload_url(&self) -> Option<&str> {
        self.session().map(|s| s.upload_url.as_str())
    }

    #[inline]
    fn session(&self) -> Option<&Session> {
        match self.state {
            State::Authenticated(ref session) => Some(&**session),
            _ => None,
        }
    }

    async fn authenticate(&self) -> Result<Session> {
        let body = serde_json::to_string(&AuthRoot::new(&self.options)).map_err(|e| {
            Error::new(
                ErrorKind::ConfigurationError,
                format!("Cannot serialize the authentication request: {}", e),
            )
        })?;

        debug!(
            "Requesting a token for user {} from {}",
            self.options.username(),
            self.options.auth_url()
        );
        let transport = self
            .connector
            .transport(
                self.options.auth_url(),
                self.options.verify_ssl(),
                self.options.timeout(),
            )
            .map_err(|e| Error::from_transport("Cannot create a transport", e))?;
        let raw = transport
            .post(body, APPLICATION_JSON, APPLICATION_JSON)
            .await
            .map_err(|e| Error::from_transport("Authentication request failed", e))?;

        Session::new(AuthResponse::parse(raw)?, &self.options)
    }
}
