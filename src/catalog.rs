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

//! Object-store lookup in a service catalog.

use std::fmt;

use log::{debug, error};
use serde_derive::Deserialize;

use super::protocol::{CatalogRecord, Endpoint};
use super::{Error, ErrorKind, Result};

/// Service type of the object storage.
pub const OBJECT_STORE: &str = "object-store";

/// Endpoint interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceType {
    /// Admin interface.
    Admin,
    /// Internal interface.
    Internal,
    /// Public interface.
    Public,
}

/// How endpoints of the object-store entry are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointLookup {
    /// Endpoints are ordered as admin, internal, public.
    #[default]
    Positional,
    /// Endpoints are matched by their `interface` field.
    Interface,
}

impl InterfaceType {
    /// Position of the interface in a positional catalog.
    pub fn position(self) -> usize {
        match self {
            InterfaceType::Admin => 0,
            InterfaceType::Internal => 1,
            InterfaceType::Public => 2,
        }
    }

    /// Interface name as reported by the Identity service.
    pub fn as_str(self) -> &'static str {
        match self {
            InterfaceType::Admin => "admin",
            InterfaceType::Internal => "internal",
            InterfaceType::Public => "public",
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Find the first object-store record.
pub fn find_object_store(catalog: &[CatalogRecord]) -> Option<&CatalogRecord> {
    catalog.iter().find(|x| x.service_type == OBJECT_STORE)
}

impl CatalogRecord {
    /// Find an endpoint of the given interface.
    pub fn find_endpoint(
        &self,
        interface: InterfaceType,
        lookup: EndpointLookup,
    ) -> Option<&Endpoint> {
        match lookup {
            EndpointLookup::Positional => self.endpoints.get(interface.position()),
            EndpointLookup::Interface => self
                .endpoints
                .iter()
                .find(|x| x.interface.as_deref() == Some(interface.as_str())),
        }
    }

    /// Get the URL of the given interface or fail.
    pub fn endpoint_url(&self, interface: InterfaceType, lookup: EndpointLookup) -> Result<&str> {
        match self.find_endpoint(interface, lookup) {
            Some(endp) => {
                debug!("Using {:?} as the {} endpoint of {}", endp, interface, self.service_type);
                Ok(&endp.url)
            }
            None => {
                error!(
                    "No {} endpoint for {} in catalog ({:?} lookup, {} endpoints)",
                    interface,
                    self.service_type,
                    lookup,
                    self.endpoints.len()
                );
                Err(Error::new(
                    ErrorKind::InvalidResponse,
                    format!(
                        "Endpoint {} for service {} was not found",
                        interface, self.service_type
                    ),
                ))
            }
        }
    }
}
