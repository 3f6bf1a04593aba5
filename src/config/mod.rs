// Copyright 2025 The Delivery Exporter Authors.
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

//! Declarative environment configuration with provenance-annotated logging.
//!
//! Configuration needs to be consistent and easy to get right. It should be
//! logged, to make debugging easier — but accidentally logging sensitive
//! information (API credentials and the like) must be hard. This module
//! handles both: a configuration type declares its fields once, and one load
//! call resolves all of them from an environment snapshot, logs every value
//! with the place it came from, and redacts anything that looks secret.
//!
//! # A simple example
//!
//! A schema with fields `username` (default `"builder"`), `token` (required)
//! and `namespaces` (a set), loaded with [`load_and_log`], will:
//!
//! 1. Look for the environment variable `USERNAME`.
//! 2. Look for the environment variable `TOKEN`.
//! 3. Look for `NAMESPACES` and split it at each comma, stripping whitespace.
//! 4. Construct the config — or, if `TOKEN` is missing, report that along
//!    with every other problem in a single [`MissingConfigError`].
//!
//! It then logs each field with its provenance:
//!
//! ```text
//! username=builder (default value; USERNAME was not set)
//! token=REDACTED (from env var TOKEN)
//! namespaces={dev, prod} (from env var NAMESPACES)
//! ```
//!
//! Any field whose name contains a word in [`REDACT_WORDS`] is redacted by
//! default; fields whose names start with `_` are omitted entirely. Both can
//! be overridden per field with an explicit [`LogPolicy`].
//!
//! # Customization
//!
//! Each declaration can deviate from the defaults: alternative lookup chains
//! (`env_lookups(["API_USER", "GIT_USER"])`, first match winning), explicit
//! log policies, factory defaults for collections, and override-only fields
//! for dependencies that cannot come from text (an already-connected API
//! client, say) — those are declared with [`Field::opaque`] and supplied
//! through [`Overrides`] at load time.
//!
//! # The default keyword
//!
//! An environment variable set to the keyword `default` (configurable per
//! load call, and process-wide through [`DEFAULT_KEYWORD_VAR`]) explicitly
//! selects the field's declared default — useful on platforms where a set
//! variable cannot be unset.
//!
//! Everything a load call reads is passed in explicitly — the environment
//! snapshot, the override map, the default keyword — so repeated and
//! concurrent loads are independent and tests never mutate process state.

pub mod audit;
pub mod convert;
pub mod env;
pub mod errors;
pub mod loader;
pub mod resolver;
pub mod schema;
pub mod value;

// Re-export the surface most callers need.
pub use audit::render_lines;
pub use convert::ConvertError;
pub use env::{EnvSnapshot, Overrides, DEFAULT_KEYWORD, DEFAULT_KEYWORD_VAR};
pub use errors::{ConfigError, ConstructError, FieldError, MissingConfigError};
pub use loader::{
    load, load_and_log, load_and_log_with, load_with, resolve_all, EnvConfig, Loaded, Provenance,
    ResolvedValues,
};
pub use resolver::FieldOutcome;
pub use schema::{
    DeclaredType, Field, FieldDefault, FieldDescriptor, LogPolicy, Schema, SchemaBuilder,
    SchemaError, REDACT_WORDS,
};
pub use value::{OpaqueValue, Value, ValueSource};
