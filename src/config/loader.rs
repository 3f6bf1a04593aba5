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

//! The configuration loader.
//!
//! [`load_and_log`] is the production entry point: it resolves every field of
//! a schema against one environment snapshot and one override map, renders
//! the provenance-annotated audit lines through the `log` facade, and either
//! constructs the typed configuration or returns one aggregate error naming
//! every problem found. Every field is resolved unconditionally — the loader
//! never stops at the first failure.
//!
//! A configuration type opts in by implementing [`EnvConfig`]:
//!
//! ```
//! use delivery_exporter::config::{
//!     load, ConstructError, EnvConfig, EnvSnapshot, Field, Overrides, ResolvedValues, Schema,
//! };
//! use lazy_static::lazy_static;
//!
//! struct ReleaseConfig {
//!     git_api: String,
//!     verify_certs: bool,
//! }
//!
//! impl EnvConfig for ReleaseConfig {
//!     fn schema() -> &'static Schema {
//!         lazy_static! {
//!             static ref SCHEMA: Schema = Schema::builder("ReleaseConfig")
//!                 .field(Field::text("git_api").env_lookups(["GIT_API", "GITHUB_API"]).default(""))
//!                 .field(Field::bool("verify_certs").default(true))
//!                 .build()
//!                 .expect("invalid ReleaseConfig schema");
//!         }
//!         &SCHEMA
//!     }
//!
//!     fn from_values(values: &mut ResolvedValues) -> Result<Self, ConstructError> {
//!         Ok(Self {
//!             git_api: values.take_text("git_api")?,
//!             verify_certs: values.take_bool("verify_certs")?,
//!         })
//!     }
//! }
//!
//! let env = EnvSnapshot::from([("GIT_API", "https://api.github.com")]);
//! let loaded = load::<ReleaseConfig>(&env, &Overrides::new()).unwrap();
//! assert_eq!(loaded.git_api, "https://api.github.com");
//! assert!(loaded.verify_certs);
//! ```

use std::collections::BTreeSet;
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{error, info};

use super::audit;
use super::env::{EnvSnapshot, Overrides, DEFAULT_KEYWORD};
use super::errors::{ConfigError, ConstructError, MissingConfigError};
use super::resolver::{resolve, FieldOutcome};
use super::schema::Schema;
use super::value::{Value, ValueSource};

/// A configuration type constructible from resolved environment values.
pub trait EnvConfig: Sized {
    /// The static schema describing this type's fields. Built once; schema
    /// mistakes fail fast on first access.
    fn schema() -> &'static Schema;

    /// Construct the type from exactly the resolved values. Implementations
    /// take each declared field once and may reject values their own
    /// validation rules do not allow.
    fn from_values(values: &mut ResolvedValues) -> Result<Self, ConstructError>;

    /// Convenience for [`load`] with this type.
    fn load(env: &EnvSnapshot, overrides: &Overrides) -> Result<Loaded<Self>, ConfigError> {
        load::<Self>(env, overrides)
    }

    /// Convenience for [`load_and_log`] with this type.
    fn load_and_log(
        env: &EnvSnapshot,
        overrides: &Overrides,
    ) -> Result<Loaded<Self>, ConfigError> {
        load_and_log::<Self>(env, overrides)
    }
}

/// The per-field values produced by a successful resolution pass, keyed by
/// field name, consumed by [`EnvConfig::from_values`].
#[derive(Debug)]
pub struct ResolvedValues {
    values: IndexMap<&'static str, Value>,
}

impl ResolvedValues {
    fn take(&mut self, name: &str) -> Result<Value, ConstructError> {
        self.values
            .shift_remove(name)
            .ok_or_else(|| ConstructError::MissingField { field: name.into() })
    }

    fn wrong_type(name: &str, expected: &'static str, found: &Value) -> ConstructError {
        ConstructError::WrongType {
            field: name.into(),
            expected,
            found: found.kind(),
        }
    }

    pub fn take_text(&mut self, name: &str) -> Result<String, ConstructError> {
        match self.take(name)? {
            Value::Text(s) => Ok(s),
            other => Err(Self::wrong_type(name, "text", &other)),
        }
    }

    pub fn take_optional_text(&mut self, name: &str) -> Result<Option<String>, ConstructError> {
        match self.take(name)? {
            Value::OptionalText(s) => Ok(s),
            other => Err(Self::wrong_type(name, "optional text", &other)),
        }
    }

    pub fn take_bool(&mut self, name: &str) -> Result<bool, ConstructError> {
        match self.take(name)? {
            Value::Bool(b) => Ok(b),
            other => Err(Self::wrong_type(name, "bool", &other)),
        }
    }

    pub fn take_int(&mut self, name: &str) -> Result<i64, ConstructError> {
        match self.take(name)? {
            Value::Int(i) => Ok(i),
            other => Err(Self::wrong_type(name, "int", &other)),
        }
    }

    pub fn take_list(&mut self, name: &str) -> Result<Vec<String>, ConstructError> {
        match self.take(name)? {
            Value::List(items) => Ok(items),
            other => Err(Self::wrong_type(name, "list of text", &other)),
        }
    }

    pub fn take_set(&mut self, name: &str) -> Result<BTreeSet<String>, ConstructError> {
        match self.take(name)? {
            Value::Set(items) => Ok(items),
            other => Err(Self::wrong_type(name, "set of text", &other)),
        }
    }

    pub fn take_opaque<T: std::any::Any + Send + Sync>(
        &mut self,
        name: &str,
    ) -> Result<Arc<T>, ConstructError> {
        match self.take(name)? {
            Value::Opaque(opaque) => {
                opaque
                    .downcast::<T>()
                    .ok_or_else(|| ConstructError::WrongType {
                        field: name.into(),
                        expected: std::any::type_name::<T>(),
                        found: opaque.type_name(),
                    })
            }
            other => Err(Self::wrong_type(name, std::any::type_name::<T>(), &other)),
        }
    }
}

/// Field name to value-source map, in declaration order. Write-once during
/// construction, read-only afterwards; used only for audit rendering.
pub type Provenance = IndexMap<&'static str, ValueSource>;

/// A constructed configuration together with its provenance map.
///
/// Derefs to the configuration; the provenance never participates in
/// equality or any business logic.
#[derive(Debug)]
pub struct Loaded<C> {
    config: C,
    provenance: Provenance,
}

impl<C> Loaded<C> {
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn into_inner(self) -> C {
        self.config
    }
}

impl<C> Deref for Loaded<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.config
    }
}

/// Resolve every field of `schema`, in declaration order, with no
/// short-circuiting. Exposed so alternative audit sinks can render outcomes
/// themselves.
pub fn resolve_all(
    schema: &Schema,
    env: &EnvSnapshot,
    overrides: &Overrides,
    default_keyword: &str,
) -> Vec<FieldOutcome> {
    schema
        .fields()
        .iter()
        .map(|field| resolve(field, env, overrides, default_keyword))
        .collect()
}

/// Load a configuration with the standard default keyword.
pub fn load<C: EnvConfig>(
    env: &EnvSnapshot,
    overrides: &Overrides,
) -> Result<Loaded<C>, ConfigError> {
    load_with(env, overrides, DEFAULT_KEYWORD)
}

/// Load a configuration with a caller-chosen default keyword.
pub fn load_with<C: EnvConfig>(
    env: &EnvSnapshot,
    overrides: &Overrides,
    default_keyword: &str,
) -> Result<Loaded<C>, ConfigError> {
    let schema = C::schema();
    let outcomes = resolve_all(schema, env, overrides, default_keyword);
    construct::<C>(schema, outcomes)
}

/// Load a configuration and emit the audit lines through the `log` facade:
/// info on success, error on failure. Lines are emitted in both cases, so a
/// failed startup still shows every resolved and failed field.
pub fn load_and_log<C: EnvConfig>(
    env: &EnvSnapshot,
    overrides: &Overrides,
) -> Result<Loaded<C>, ConfigError> {
    load_and_log_with(env, overrides, DEFAULT_KEYWORD)
}

pub fn load_and_log_with<C: EnvConfig>(
    env: &EnvSnapshot,
    overrides: &Overrides,
    default_keyword: &str,
) -> Result<Loaded<C>, ConfigError> {
    let schema = C::schema();
    let outcomes = resolve_all(schema, env, overrides, default_keyword);
    let lines = audit::render_lines(schema, &outcomes);

    if outcomes.iter().all(FieldOutcome::is_resolved) {
        info!("Loading {}, values:", schema.name());
        for line in &lines {
            info!("  {line}");
        }
    } else {
        error!(
            "While loading {}, errors were encountered. All values:",
            schema.name()
        );
        for line in &lines {
            error!("  {line}");
        }
    }

    construct::<C>(schema, outcomes)
}

fn construct<C: EnvConfig>(
    schema: &Schema,
    outcomes: Vec<FieldOutcome>,
) -> Result<Loaded<C>, ConfigError> {
    let mut values = IndexMap::with_capacity(outcomes.len());
    let mut provenance = Provenance::with_capacity(outcomes.len());
    let mut missing = Vec::new();

    for (field, outcome) in schema.fields().iter().zip(outcomes) {
        match outcome {
            FieldOutcome::Resolved { value, source } => {
                values.insert(field.name(), value);
                provenance.insert(field.name(), source);
            }
            FieldOutcome::Failed(err) => missing.push(err),
        }
    }

    if !missing.is_empty() {
        return Err(MissingConfigError::new(schema.name(), missing).into());
    }

    let mut values = ResolvedValues { values };
    let config = C::from_values(&mut values).map_err(|source| ConfigError::Construct {
        config: schema.name(),
        source,
    })?;

    Ok(Loaded { config, provenance })
}
