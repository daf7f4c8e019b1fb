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

//! Connection options.
//!
//! Options are an explicit value handed to a
//! [Connection](../connection/struct.Connection.html). They can be built in
//! code, read from a YAML file or collected from the environment.

use std::env;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use log::debug;
use serde_derive::Deserialize;

use super::catalog::EndpointLookup;
use super::{Error, ErrorKind, Result};

/// Options of a Swift connection.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Options {
    bucket: String,
    tenant_name: String,
    username: String,
    password: String,
    auth_url: String,
    #[serde(default)]
    admin_url: Option<String>,
    #[serde(default)]
    public_url: Option<String>,
    #[serde(default)]
    max_age: Option<u64>,
    #[serde(default)]
    verify_ssl: bool,
    #[serde(default)]
    timeout: Option<u64>,
    #[serde(default)]
    endpoint_lookup: EndpointLookup,
}

fn missing(name: &str) -> Error {
    Error::new(
        ErrorKind::ConfigurationError,
        format!("Missing environment variable {}", name),
    )
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| missing(name))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: fmt::Display,
{
    optional_var(name)
        .map(|value| {
            value.parse().map_err(|e| {
                Error::new(
                    ErrorKind::ConfigurationError,
                    format!("Invalid value {:?} of {}: {}", value, name, e),
                )
            })
        })
        .transpose()
}

fn parse_flag(name: &str) -> Result<Option<bool>> {
    match optional_var(name).as_deref().map(str::to_ascii_lowercase) {
        None => Ok(None),
        Some(ref s) if s == "1" || s == "true" || s == "yes" => Ok(Some(true)),
        Some(ref s) if s == "0" || s == "false" || s == "no" => Ok(Some(false)),
        Some(other) => Err(Error::new(
            ErrorKind::ConfigurationError,
            format!("Invalid boolean {:?} of {}", other, name),
        )),
    }
}

impl Options {
    /// Create options with the required values.
    ///
    /// SSL verification is disabled and no timeout is set by default.
    pub fn new<S1, S2, S3, S4, S5>(
        bucket: S1,
        tenant_name: S2,
        username: S3,
        password: S4,
        auth_url: S5,
    ) -> Options
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
        S4: Into<String>,
        S5: Into<String>,
    {
        Options {
            bucket: bucket.into(),
            tenant_name: tenant_name.into(),
            username: username.into(),
            password: password.into(),
            auth_url: auth_url.into(),
            admin_url: None,
            public_url: None,
            max_age: None,
            verify_ssl: false,
            timeout: None,
            endpoint_lookup: EndpointLookup::default(),
        }
    }

    /// Read options from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Options> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::new(
                ErrorKind::ConfigurationError,
                format!("Cannot read {}: {}", path.display(), e),
            )
        })?;
        let options: Options = serde_yaml::from_reader(file)?;
        debug!("Loaded options {:?} from {}", options, path.display());
        options.validated()
    }

    /// Collect options from the environment.
    ///
    /// Credentials use the usual `OS_AUTH_URL`, `OS_USERNAME`, `OS_PASSWORD`
    /// and `OS_PROJECT_NAME` (or `OS_TENANT_NAME`) variables. The bucket is
    /// taken from `SWIFT_BUCKET`. `SWIFT_ADMIN_URL`, `SWIFT_PUBLIC_URL`,
    /// `SWIFT_MAX_AGE`, `SWIFT_VERIFY_SSL` and `SWIFT_TIMEOUT` are optional.
    pub fn from_env() -> Result<Options> {
        let tenant_name = optional_var("OS_PROJECT_NAME")
            .or_else(|| optional_var("OS_TENANT_NAME"))
            .ok_or_else(|| missing("OS_PROJECT_NAME"))?;

        let mut options = Options::new(
            required_var("SWIFT_BUCKET")?,
            tenant_name,
            required_var("OS_USERNAME")?,
            required_var("OS_PASSWORD")?,
            required_var("OS_AUTH_URL")?,
        );
        options.admin_url = optional_var("SWIFT_ADMIN_URL");
        options.public_url = optional_var("SWIFT_PUBLIC_URL");
        options.max_age = parse_var("SWIFT_MAX_AGE")?;
        options.timeout = parse_var("SWIFT_TIMEOUT")?;
        if let Some(verify) = parse_flag("SWIFT_VERIFY_SSL")? {
            options.verify_ssl = verify;
        }
        options.validated()
    }

    fn validated(self) -> Result<Options> {
        let required = [
            ("bucket", &self.bucket),
            ("tenant_name", &self.tenant_name),
            ("username", &self.username),
            ("auth_url", &self.auth_url),
        ];
        for (name, value) in required.iter() {
            if value.is_empty() {
                return Err(Error::new(
                    ErrorKind::ConfigurationError,
                    format!("Option {} must not be empty", name),
                ));
            }
        }
        Ok(self)
    }

    /// Use the given admin URL instead of the catalog one.
    pub fn with_admin_url<S: Into<String>>(mut self, url: S) -> Options {
        self.admin_url = Some(url.into());
        self
    }

    /// Use the given public URL instead of the catalog one.
    pub fn with_public_url<S: Into<String>>(mut self, url: S) -> Options {
        self.public_url = Some(url.into());
        self
    }

    /// Set the cache max age (in seconds) for uploaded objects.
    pub fn with_max_age(mut self, max_age: u64) -> Options {
        self.max_age = Some(max_age);
        self
    }

    /// Enable or disable SSL certificate verification.
    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Options {
        self.verify_ssl = verify_ssl;
        self
    }

    /// Set a request timeout (in seconds).
    pub fn with_timeout(mut self, timeout: u64) -> Options {
        self.timeout = Some(timeout);
        self
    }

    /// Change how endpoints are picked from the catalog.
    pub fn with_endpoint_lookup(mut self, lookup: EndpointLookup) -> Options {
        self.endpoint_lookup = lookup;
        self
    }

    /// Target container name.
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Project (tenant) name.
    #[inline]
    pub fn tenant_name(&self) -> &str {
        &self.tenant_name
    }

    /// User name.
    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Identity service endpoint.
    #[inline]
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Admin URL override.
    #[inline]
    pub fn admin_url(&self) -> Option<&str> {
        self.admin_url.as_deref()
    }

    /// Public URL override.
    #[inline]
    pub fn public_url(&self) -> Option<&str> {
        self.public_url.as_deref()
    }

    /// Cache max age in seconds.
    #[inline]
    pub fn max_age(&self) -> Option<u64> {
        self.max_age
    }

    /// Whether SSL certificates are verified.
    #[inline]
    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    /// Request timeout.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// How endpoints are picked from the catalog.
    #[inline]
    pub fn endpoint_lookup(&self) -> EndpointLookup {
        self.endpoint_lookup
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("bucket", &self.bucket)
            .field("tenant_name", &self.tenant_name)
            .field("username", &self.username)
            .field("password", &"***")
            .field("auth_url", &self.auth_url)
            .field("admin_url", &self.admin_url)
            .field("public_url", &self.public_url)
            .field("max_age", &self.max_age)
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout", &self.timeout)
            .field("endpoint_lookup", &self.endpoint_lookup)
            .finish()
    }
}

#[cfg(test)]
mod test {
    #![allow(unused_results)]

    use std::env;
    use std::fs;
    use std::time::Duration;

    use super::Options;
    use crate::catalog::EndpointLookup;
    use crate::ErrorKind;

    fn options() -> Options {
        Options::new(
            "my-bucket-name",
            "tenant_username1",
            "username1",
            "some-pass",
            "https://auth-url-com:123/v3/auth/tokens",
        )
    }

    #[test]
    fn test_new_defaults() {
        let opts = options();
        assert_eq!(opts.bucket(), "my-bucket-name");
        assert_eq!(opts.tenant_name(), "tenant_username1");
        assert_eq!(opts.username(), "username1");
        assert_eq!(opts.password(), "some-pass");
        assert_eq!(opts.auth_url(), "https://auth-url-com:123/v3/auth/tokens");
        assert!(opts.admin_url().is_none());
        assert!(opts.public_url().is_none());
        assert!(opts.max_age().is_none());
        assert!(!opts.verify_ssl());
        assert!(opts.timeout().is_none());
        assert_eq!(opts.endpoint_lookup(), EndpointLookup::Positional);
    }

    #[test]
    fn test_builder() {
        let opts = options()
            .with_admin_url("http://admin")
            .with_public_url("http://public")
            .with_max_age(31536000)
            .with_verify_ssl(true)
            .with_timeout(30)
            .with_endpoint_lookup(EndpointLookup::Interface);
        assert_eq!(opts.admin_url(), Some("http://admin"));
        assert_eq!(opts.public_url(), Some("http://public"));
        assert_eq!(opts.max_age(), Some(31536000));
        assert!(opts.verify_ssl());
        assert_eq!(opts.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(opts.endpoint_lookup(), EndpointLookup::Interface);
    }

    #[test]
    fn test_debug_hides_password() {
        let repr = format!("{:?}", options());
        assert!(repr.contains("username1"));
        assert!(!repr.contains("some-pass"));
    }

    #[test]
    fn test_from_file() {
        let path = env::temp_dir().join(format!("swift-options-{}.yaml", std::process::id()));
        fs::write(
            &path,
            "bucket: my-bucket\n\
             tenant_name: tenant1\n\
             username: user1\n\
             password: secret\n\
             auth_url: https://keystone.local/v3/auth/tokens\n\
             public_url: https://cdn.local\n\
             verify_ssl: true\n\
             timeout: 5\n\
             endpoint_lookup: interface\n",
        )
        .unwrap();
        let opts = Options::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(opts.bucket(), "my-bucket");
        assert_eq!(opts.tenant_name(), "tenant1");
        assert_eq!(opts.public_url(), Some("https://cdn.local"));
        assert!(opts.admin_url().is_none());
        assert!(opts.verify_ssl());
        assert_eq!(opts.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(opts.endpoint_lookup(), EndpointLookup::Interface);
    }

    #[test]
    fn test_from_file_missing_field() {
        let path = env::temp_dir().join(format!("swift-invalid-{}.yaml", std::process::id()));
        fs::write(&path, "bucket: my-bucket\n").unwrap();
        let err = Options::from_file(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert_eq!(err.kind(), ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_from_file_empty_value() {
        let path = env::temp_dir().join(format!("swift-empty-{}.yaml", std::process::id()));
        fs::write(
            &path,
            "bucket: ''\ntenant_name: t\nusername: u\npassword: p\nauth_url: http://a\n",
        )
        .unwrap();
        let err = Options::from_file(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert_eq!(err.kind(), ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_from_file_not_found() {
        let err = Options::from_file("/nonexistent/swift.yaml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationError);
    }
}
