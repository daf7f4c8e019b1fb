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

//! Error and Result implementations.

use std::error::Error as StdError;
use std::fmt;

use reqwest::StatusCode;

/// Boxed error produced by a transport.
pub type TransportError = Box<dyn StdError + Send + Sync + 'static>;

/// Kind of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Failure to reach or complete a request against the Identity service.
    ///
    /// Covers transport construction failures, network failures and HTTP
    /// error statuses.
    ConnectionError,

    /// Local configuration problem.
    ///
    /// Returned when the service catalog has no object-store entry (the
    /// tenant is not provisioned for object storage or the credentials map
    /// to the wrong scope), or when the options themselves are invalid.
    ConfigurationError,

    /// Response received from the server is malformed.
    InvalidResponse,
}

/// Error from a connection call.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    status: Option<StatusCode>,
    message: Option<String>,
    source: Option<TransportError>,
}

/// Result of a connection call.
pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    /// Create a new error of the provided kind.
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Error {
        Error {
            kind,
            status: None,
            message: Some(message.into()),
            source: None,
        }
    }

    /// Create with providing all details.
    pub(crate) fn new_with_details(
        kind: ErrorKind,
        status: Option<StatusCode>,
        message: Option<String>,
    ) -> Error {
        Error {
            kind,
            status,
            message,
            source: None,
        }
    }

    /// Attach an underlying cause to this error.
    pub(crate) fn with_source<E>(mut self, source: E) -> Error
    where
        E: Into<TransportError>,
    {
        self.source = Some(source.into());
        self
    }

    /// Wrap an error coming from a transport.
    ///
    /// HTTP statuses are preserved when the cause is a `reqwest` error.
    pub(crate) fn from_transport(context: &str, source: TransportError) -> Error {
        let status = source
            .downcast_ref::<reqwest::Error>()
            .and_then(|e| e.status());
        Error::new_with_details(
            ErrorKind::ConnectionError,
            status,
            Some(format!("{}: {}", context, source)),
        )
        .with_source(source)
    }

    /// Error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status code (if any).
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Error message (if any).
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl ErrorKind {
    /// Short description of the error kind.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::ConnectionError => "Cannot connect to the Identity service",
            ErrorKind::ConfigurationError => "Invalid configuration",
            ErrorKind::InvalidResponse => "Received invalid response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(ref msg) = self.message {
            write!(f, ": {}", msg)
        } else {
            Ok(())
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let source: &(dyn StdError + 'static) = &**self.source.as_ref()?;
        Some(source)
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Error {
        Error::from_transport("HTTP request failed", Box::new(value))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Error {
        Error::new(
            ErrorKind::InvalidResponse,
            format!("Cannot parse the response: {}", value),
        )
        .with_source(value)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Error {
        Error::new(
            ErrorKind::ConfigurationError,
            format!("Cannot parse the configuration: {}", value),
        )
        .with_source(value)
    }
}
