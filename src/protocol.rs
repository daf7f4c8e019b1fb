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

//! JSON structures and protocol bits for the Identity V3 API.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserialize, Deserializer};
use serde_derive::{Deserialize, Serialize};

use super::config::Options;

const PASSWORD_METHOD: &str = "password";
const DEFAULT_DOMAIN: &str = "default";

#[derive(Clone, Debug, Serialize)]
pub(crate) struct DomainId {
    pub id: String,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct UserAndPassword {
    pub domain: DomainId,
    pub name: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct PasswordAuth {
    pub user: UserAndPassword,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct PasswordIdentity {
    pub methods: Vec<String>,
    pub password: PasswordAuth,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct Project {
    pub domain: DomainId,
    pub name: String,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct ProjectScope {
    pub project: Project,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct Auth {
    pub identity: PasswordIdentity,
    pub scope: ProjectScope,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct AuthRoot {
    pub auth: Auth,
}

/// An endpoint in the service catalog.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Endpoint {
    /// Endpoint URL.
    pub url: String,
    /// Interface (`admin`, `internal` or `public`), if reported.
    #[serde(default)]
    pub interface: Option<String>,
    /// Region, if reported.
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint ID, if reported.
    #[serde(default)]
    pub id: Option<String>,
}

/// A service in the service catalog.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CatalogRecord {
    /// Service type, e.g. `object-store`.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Service name, if reported.
    #[serde(default)]
    pub name: Option<String>,
    /// Endpoints of the service.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Token {
    #[serde(deserialize_with = "de_timestamp")]
    pub expires_at: DateTime<FixedOffset>,
    pub catalog: Vec<CatalogRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TokenRoot {
    pub token: Token,
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// RFC 3339 timestamp, or a timestamp without an offset taken as UTC.
fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if let Ok(result) = DateTime::parse_from_rfc3339(&value) {
        return Ok(result);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&value, fmt).ok())
        .map(|naive| DateTime::<FixedOffset>::from(Utc.from_utc_datetime(&naive)))
        .ok_or_else(|| {
            de::Error::invalid_value(de::Unexpected::Str(&value), &"an ISO 8601 timestamp")
        })
}

fn default_domain() -> DomainId {
    DomainId {
        id: String::from(DEFAULT_DOMAIN),
    }
}

impl AuthRoot {
    /// Password authentication scoped to the configured tenant.
    pub fn new(options: &Options) -> AuthRoot {
        AuthRoot {
            auth: Auth {
                identity: PasswordIdentity {
                    methods: vec![String::from(PASSWORD_METHOD)],
                    password: PasswordAuth {
                        user: UserAndPassword {
                            domain: default_domain(),
                            name: options.username().to_string(),
                            password: options.password().to_string(),
                        },
                    },
                },
                scope: ProjectScope {
                    project: Project {
                        domain: default_domain(),
                        name: options.tenant_name().to_string(),
                    },
                },
            },
        }
    }
}

#[cfg(test)]
pub mod test {
    #![allow(unused_results)]

    use serde_json::json;

    use super::{AuthRoot, TokenRoot};
    use crate::config::Options;

    #[test]
    fn test_auth_body() {
        let opts = Options::new("bucket", "tenant1", "user1", "pa$$w0rd", "http://auth");
        let body = serde_json::to_value(AuthRoot::new(&opts)).unwrap();
        assert_eq!(
            body,
            json!({
                "auth": {
                    "identity": {
                        "methods": ["password"],
                        "password": {
                            "user": {
                                "domain": {"id": "default"},
                                "name": "user1",
                                "password": "pa$$w0rd"
                            }
                        }
                    },
                    "scope": {
                        "project": {
                            "domain": {"id": "default"},
                            "name": "tenant1"
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_token_root() {
        let root: TokenRoot = serde_json::from_value(json!({
            "token": {
                "methods": ["password"],
                "expires_at": "2030-01-01T00:00:00.000000Z",
                "catalog": [{
                    "type": "object-store",
                    "name": "swift",
                    "endpoints": [
                        {"url": "http://admin", "interface": "admin", "region": "RegionOne"},
                        {"url": "http://internal"}
                    ]
                }]
            }
        }))
        .unwrap();
        assert_eq!(root.token.expires_at.to_rfc3339(), "2030-01-01T00:00:00+00:00");
        assert_eq!(root.token.catalog.len(), 1);
        let record = &root.token.catalog[0];
        assert_eq!(record.service_type, "object-store");
        assert_eq!(record.name.as_deref(), Some("swift"));
        assert_eq!(record.endpoints[0].interface.as_deref(), Some("admin"));
        assert!(record.endpoints[1].interface.is_none());
    }

    #[test]
    fn test_token_root_expiry_without_offset() {
        let root: TokenRoot = serde_json::from_value(json!({
            "token": {"expires_at": "2030-01-01T00:00:00", "catalog": []}
        }))
        .unwrap();
        assert_eq!(root.token.expires_at.to_rfc3339(), "2030-01-01T00:00:00+00:00");

        let root: TokenRoot = serde_json::from_value(json!({
            "token": {"expires_at": "2030-01-01 12:30:00.123456", "catalog": []}
        }))
        .unwrap();
        assert_eq!(
            root.token.expires_at.to_rfc3339(),
            "2030-01-01T12:30:00.123456+00:00"
        );
    }

    #[test]
    fn test_token_root_expiry_keeps_offset() {
        let root: TokenRoot = serde_json::from_value(json!({
            "token": {"expires_at": "2030-01-01T02:00:00+02:00", "catalog": []}
        }))
        .unwrap();
        assert_eq!(root.token.expires_at.to_rfc3339(), "2030-01-01T02:00:00+02:00");
        assert_eq!(root.token.expires_at.timestamp(), 1_893_448_800);
    }

    #[test]
    fn test_token_root_invalid_expiry() {
        let result = serde_json::from_value::<TokenRoot>(json!({
            "token": {"expires_at": "next tuesday", "catalog": []}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_token_root_service_without_endpoints() {
        let root: TokenRoot = serde_json::from_value(json!({
            "token": {
                "expires_at": "2030-01-01T00:00:00Z",
                "catalog": [
                    {"type": "identity"},
                    {"type": "object-store", "endpoints": [{"url": "http://admin"}]}
                ]
            }
        }))
        .unwrap();
        assert!(root.token.catalog[0].endpoints.is_empty());
        assert_eq!(root.token.catalog[1].endpoints[0].url, "http://admin");
    }

    #[test]
    fn test_token_root_missing_expiry() {
        let result = serde_json::from_value::<TokenRoot>(json!({
            "token": {"catalog": []}
        }));
        assert!(result.is_err());
    }
}
