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

//! Load-time error taxonomy.
//!
//! Per-field failures ([`FieldError`]) are detailed and meant to be read in
//! aggregate: the loader never throws on the first problem, it collects every
//! failure and reports them as one [`MissingConfigError`] so an operator sees
//! the whole picture from a single run. Schema-declaration mistakes are a
//! separate class ([`SchemaError`](super::schema::SchemaError)) and are never
//! folded in here.

use std::fmt;

use super::convert::ConvertError;

/// One field's resolution failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FieldError {
    /// No tried environment variable was present and the field declares no
    /// default.
    #[error("'{name}' was not found in {}", lookup_phrase(.tried))]
    MissingVariable {
        name: &'static str,
        tried: Vec<String>,
    },

    /// A matched variable held the default keyword, but the field declares
    /// no default to fall back to.
    #[error(
        "'{name}' was set to the default keyword in env var {var} but no default is declared"
    )]
    MissingDefault { name: &'static str, var: String },

    /// Environment lookups are disabled for the field and the override map
    /// did not supply it.
    #[error("'{name}' has environment lookups disabled but was not supplied in overrides")]
    MissingOverride { name: &'static str },

    /// The raw environment string could not be converted to the declared
    /// type.
    #[error("'{name}' could not be parsed from env var {var}=\"{value}\": {source}")]
    InvalidValue {
        name: &'static str,
        var: String,
        value: String,
        source: ConvertError,
    },
}

impl FieldError {
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldError::MissingVariable { name, .. }
            | FieldError::MissingDefault { name, .. }
            | FieldError::MissingOverride { name }
            | FieldError::InvalidValue { name, .. } => name,
        }
    }
}

fn lookup_phrase(tried: &[String]) -> String {
    match tried {
        [single] => format!("env var {single}"),
        many => format!("any of {}", many.join(", ")),
    }
}

/// Every resolution failure from one load call, bundled into a single
/// reportable error. The configuration instance is never constructed when
/// this is returned.
#[derive(Debug)]
pub struct MissingConfigError {
    config: &'static str,
    missing: Vec<FieldError>,
}

impl MissingConfigError {
    pub(crate) fn new(config: &'static str, missing: Vec<FieldError>) -> Self {
        Self { config, missing }
    }

    pub fn config_name(&self) -> &'static str {
        self.config
    }

    pub fn missing(&self) -> &[FieldError] {
        &self.missing
    }
}

impl fmt::Display for MissingConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config for {} is missing data:", self.config)?;
        for error in &self.missing {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MissingConfigError {}

/// A failure while building the typed configuration from already-resolved
/// values. These indicate either a schema/constructor mismatch or a value
/// rejected by the configuration's own validation.
#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    #[error("field '{field}' resolved as {found} but the constructor expected {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{field}' is not among the resolved values")]
    MissingField { field: String },

    #[error("field '{field}' is invalid: {reason}")]
    Invalid { field: String, reason: String },
}

/// Unified error for one load call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Missing(#[from] MissingConfigError),

    #[error("constructing {config}: {source}")]
    Construct {
        config: &'static str,
        #[source]
        source: ConstructError,
    },
}
