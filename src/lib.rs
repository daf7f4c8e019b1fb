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

//! Connection manager for OpenStack Swift.
//!
//! The crate authenticates against an Identity API v3 service, keeps the
//! resulting token and the object-store entry of the service catalog, and
//! resolves the admin, internal and public URLs of the storage.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), nightcrawler_swift::Error> {
//! use nightcrawler_swift::{Connection, Options};
//!
//! let options = Options::from_env()?;
//! let mut conn = Connection::new(options);
//! let _ = conn.connect().await?;
//! println!("Uploading to {:?}", conn.upload_url());
//! # Ok(()) }
//! ```
//!
//! # Limitations
//!
//! * Only password authentication scoped to a project in the `default`
//!   domain is supported.
//! * Tokens are never refreshed automatically.

#![crate_name = "nightcrawler_swift"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
// Taken from https://github.com/rust-unofficial/patterns/
#![deny(
    dead_code,
    improper_ctypes,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_extern_crates,
    unused_import_braces,
    unused_parens,
    unused_qualifications,
    unused_results,
    while_true
)]

pub mod catalog;
pub mod config;
pub mod connection;
mod error;
pub mod headers;
mod protocol;
pub mod transport;

pub use crate::catalog::{EndpointLookup, InterfaceType};
pub use crate::config::Options;
pub use crate::connection::{AuthResponse, Connection, Status};
pub use crate::error::{Error, ErrorKind, Result, TransportError};
pub use crate::headers::ResponseHeaders;
pub use crate::protocol::{CatalogRecord, Endpoint};
pub use crate::transport::{Connector, HttpConnector, RawResponse, Transport};
