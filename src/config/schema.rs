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

//! Declarative configuration schemas.
//!
//! A [`Schema`] is an ordered list of field descriptors declared once per
//! configuration type, through a builder:
//!
//! ```
//! use delivery_exporter::config::{Field, Schema, Value};
//!
//! let schema = Schema::builder("CommitTimeConfig")
//!     .field(Field::text("username").env_lookups(["API_USER", "GIT_USER"]).default(""))
//!     .field(Field::text("token").env_lookups(["TOKEN", "GIT_TOKEN"]).default(""))
//!     .field(Field::set("namespaces").default_factory(|| Value::Set(Default::default())))
//!     .field(Field::bool("tls_verify").default(true))
//!     .build()
//!     .unwrap();
//! assert_eq!(schema.fields().len(), 4);
//! ```
//!
//! Everything that can be validated without an environment is validated here,
//! at declaration time: duplicate names, opaque fields that claim environment
//! lookups, literal defaults whose type contradicts the declaration. Those
//! are programming mistakes, so they surface as [`SchemaError`] from
//! [`SchemaBuilder::build`] — never at load time.

use super::convert::{converter_for, Converter};
use super::value::Value;

/// Field names containing any of these words are redacted in audit output
/// unless an explicit log policy says otherwise.
pub const REDACT_WORDS: [&str; 5] = ["pass", "token", "key", "cred", "secret"];

/// The semantic type a resolved field value must have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Text,
    OptionalText,
    Bool,
    Int,
    ListOfText,
    SetOfText,
    /// An externally-supplied type with no textual representation. Such
    /// fields must disable environment lookups and arrive via overrides.
    Opaque { type_name: &'static str },
}

impl DeclaredType {
    pub fn describe(&self) -> &'static str {
        match self {
            DeclaredType::Text => "text",
            DeclaredType::OptionalText => "optional text",
            DeclaredType::Bool => "bool",
            DeclaredType::Int => "int",
            DeclaredType::ListOfText => "list of text",
            DeclaredType::SetOfText => "set of text",
            DeclaredType::Opaque { type_name } => type_name,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (DeclaredType::Text, Value::Text(_))
                | (DeclaredType::OptionalText, Value::OptionalText(_))
                | (DeclaredType::Bool, Value::Bool(_))
                | (DeclaredType::Int, Value::Int(_))
                | (DeclaredType::ListOfText, Value::List(_))
                | (DeclaredType::SetOfText, Value::Set(_))
                | (DeclaredType::Opaque { .. }, Value::Opaque(_))
        )
    }
}

/// How a field appears in audit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogPolicy {
    /// Render the value.
    Log,
    /// Render the literal text `REDACTED`, but still show the source.
    Redact,
    /// Omit the field entirely.
    Skip,
}

/// Default policy when none is declared: internal fields (leading `_`) are
/// skipped, names containing a sensitive word are redacted, everything else
/// is logged.
fn inferred_log_policy(name: &str) -> LogPolicy {
    if name.starts_with('_') {
        return LogPolicy::Skip;
    }
    let lower = name.to_ascii_lowercase();
    if REDACT_WORDS.iter().any(|word| lower.contains(word)) {
        LogPolicy::Redact
    } else {
        LogPolicy::Log
    }
}

/// A field's declared default: a literal, or a zero-argument factory invoked
/// fresh on every resolution.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    Literal(Value),
    Factory(fn() -> Value),
}

impl FieldDefault {
    pub(crate) fn produce(&self) -> Value {
        match self {
            FieldDefault::Literal(value) => value.clone(),
            FieldDefault::Factory(factory) => factory(),
        }
    }
}

/// Builder for one field declaration. Finalized into a [`FieldDescriptor`]
/// when the schema is built.
#[derive(Debug)]
pub struct Field {
    name: &'static str,
    declared: DeclaredType,
    env_lookups: Option<Vec<String>>,
    default: Option<FieldDefault>,
    log: Option<LogPolicy>,
}

impl Field {
    fn new(name: &'static str, declared: DeclaredType) -> Self {
        Self {
            name,
            declared,
            env_lookups: None,
            default: None,
            log: None,
        }
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, DeclaredType::Text)
    }

    pub fn optional_text(name: &'static str) -> Self {
        Self::new(name, DeclaredType::OptionalText)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, DeclaredType::Bool)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, DeclaredType::Int)
    }

    pub fn list(name: &'static str) -> Self {
        Self::new(name, DeclaredType::ListOfText)
    }

    pub fn set(name: &'static str) -> Self {
        Self::new(name, DeclaredType::SetOfText)
    }

    /// Declare a field of an externally-supplied type. Environment lookups
    /// are disabled; the value must arrive through the override map.
    pub fn opaque<T: 'static>(name: &'static str) -> Self {
        let mut field = Self::new(
            name,
            DeclaredType::Opaque {
                type_name: std::any::type_name::<T>(),
            },
        );
        field.env_lookups = Some(Vec::new());
        field
    }

    /// Replace the default lookup (the upper-cased field name) with an
    /// ordered list of variable names, first match winning.
    pub fn env_lookups<I, S>(mut self, lookups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_lookups = Some(lookups.into_iter().map(Into::into).collect());
        self
    }

    /// Disable environment lookups entirely; the field must be satisfied
    /// through the override map.
    pub fn no_env(mut self) -> Self {
        self.env_lookups = Some(Vec::new());
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Literal(value.into()));
        self
    }

    /// Use a factory so every load produces its own instance. Required
    /// discipline for collection defaults in the original system; kept here
    /// for computed defaults.
    pub fn default_factory(mut self, factory: fn() -> Value) -> Self {
        self.default = Some(FieldDefault::Factory(factory));
        self
    }

    /// Override the inferred log policy.
    pub fn log_policy(mut self, policy: LogPolicy) -> Self {
        self.log = Some(policy);
        self
    }

    fn finalize(self) -> Result<FieldDescriptor, SchemaError> {
        let env_lookups = self
            .env_lookups
            .unwrap_or_else(|| vec![self.name.to_uppercase()]);

        let converter = converter_for(&self.declared);
        if converter.is_none() && !env_lookups.is_empty() {
            return Err(SchemaError::UnsupportedType {
                field: self.name,
                type_name: self.declared.describe(),
            });
        }

        if let Some(FieldDefault::Literal(value)) = &self.default {
            if !self.declared.matches(value) {
                return Err(SchemaError::DefaultTypeMismatch {
                    field: self.name,
                    declared: self.declared.describe(),
                    found: value.kind(),
                });
            }
        }

        let log = self.log.unwrap_or_else(|| inferred_log_policy(self.name));

        Ok(FieldDescriptor {
            name: self.name,
            declared: self.declared,
            env_lookups,
            default: self.default,
            log,
            converter,
        })
    }
}

/// Finalized per-field metadata: lookup order, default, log policy, and the
/// converter cached at build time.
#[derive(Debug)]
pub struct FieldDescriptor {
    name: &'static str,
    declared: DeclaredType,
    env_lookups: Vec<String>,
    default: Option<FieldDefault>,
    log: LogPolicy,
    converter: Option<Converter>,
}

impl FieldDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared
    }

    pub fn env_lookups(&self) -> &[String] {
        &self.env_lookups
    }

    pub fn log_policy(&self) -> LogPolicy {
        self.log
    }

    pub(crate) fn default(&self) -> Option<&FieldDefault> {
        self.default.as_ref()
    }

    pub(crate) fn converter(&self) -> Option<Converter> {
        self.converter
    }
}

/// An ordered, named set of field descriptors. Built once per configuration
/// type and shared for the process lifetime.
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            name,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[cfg(test)]
    pub(crate) fn into_fields(self) -> Vec<FieldDescriptor> {
        self.fields
    }
}

#[derive(Debug)]
pub struct SchemaBuilder {
    name: &'static str,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            let descriptor = field.finalize()?;
            if fields
                .iter()
                .any(|existing: &FieldDescriptor| existing.name == descriptor.name)
            {
                return Err(SchemaError::DuplicateField {
                    field: descriptor.name,
                });
            }
            fields.push(descriptor);
        }
        Ok(Schema {
            name: self.name,
            fields,
        })
    }
}

/// A mistake in the schema declaration itself. Raised when the schema is
/// built, never folded into load-time errors.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("field '{field}' is declared more than once")]
    DuplicateField { field: &'static str },

    #[error(
        "field '{field}' has type {type_name} which cannot be read from the \
         environment; disable lookups and supply it through overrides"
    )]
    UnsupportedType {
        field: &'static str,
        type_name: &'static str,
    },

    #[error("field '{field}' declares type {declared} but its default is {found}")]
    DefaultTypeMismatch {
        field: &'static str,
        declared: &'static str,
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ApiClient;

    #[test]
    fn lookup_defaults_to_uppercased_name() {
        let schema = Schema::builder("Example")
            .field(Field::text("git_api"))
            .build()
            .unwrap();
        assert_eq!(schema.fields()[0].env_lookups(), ["GIT_API"]);
    }

    #[test]
    fn log_policy_inference() {
        let schema = Schema::builder("Example")
            .field(Field::text("username"))
            .field(Field::text("api_token"))
            .field(Field::text("ssl_key_path"))
            .field(Field::text("_internal"))
            .field(Field::text("password").log_policy(LogPolicy::Log))
            .build()
            .unwrap();

        let policies: Vec<LogPolicy> = schema.fields().iter().map(|f| f.log_policy()).collect();
        assert_eq!(
            policies,
            vec![
                LogPolicy::Log,
                LogPolicy::Redact,
                LogPolicy::Redact,
                LogPolicy::Skip,
                LogPolicy::Log,
            ]
        );
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let result = Schema::builder("Example")
            .field(Field::text("token"))
            .field(Field::bool("token"))
            .build();
        assert!(matches!(
            result,
            Err(SchemaError::DuplicateField { field: "token" })
        ));
    }

    #[test]
    fn opaque_field_with_lookups_is_rejected() {
        let result = Schema::builder("Example")
            .field(Field::opaque::<ApiClient>("client").env_lookups(["CLIENT"]))
            .build();
        assert!(matches!(result, Err(SchemaError::UnsupportedType { field: "client", .. })));
    }

    #[test]
    fn opaque_field_without_lookups_is_fine() {
        let schema = Schema::builder("Example")
            .field(Field::opaque::<ApiClient>("client"))
            .build()
            .unwrap();
        assert!(schema.fields()[0].env_lookups().is_empty());
    }

    #[test]
    fn mismatched_literal_default_is_rejected() {
        let result = Schema::builder("Example")
            .field(Field::bool("tls_verify").default("yes"))
            .build();
        assert!(matches!(
            result,
            Err(SchemaError::DefaultTypeMismatch {
                field: "tls_verify",
                declared: "bool",
                found: "text",
            })
        ));
    }

    #[test]
    fn factory_default_produces_fresh_values() {
        let field = Field::set("namespaces")
            .default_factory(|| Value::Set(Default::default()))
            .finalize()
            .unwrap();

        let first = field.default().unwrap().produce();
        let second = field.default().unwrap().produce();
        match (first, second) {
            (Value::Set(a), Value::Set(b)) => {
                assert!(a.is_empty());
                assert!(b.is_empty());
            }
            other => panic!("expected two sets, got {other:?}"),
        }
    }
}
