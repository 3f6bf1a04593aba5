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

//! Runtime configuration values and their provenance.
//!
//! A [`Value`] is the dynamically-typed result of resolving one declared
//! field: the resolver produces it either by converting an environment
//! string, by taking a declared default, or by accepting an override. A
//! [`ValueSource`] records which of those happened, and exists purely so the
//! audit log can say where every value came from.

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A resolved configuration value.
///
/// The variants correspond one-to-one with
/// [`DeclaredType`](crate::config::schema::DeclaredType). `Opaque` carries a
/// type-erased value supplied through the override map; it never originates
/// from the environment.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    OptionalText(Option<String>),
    Bool(bool),
    Int(i64),
    List(Vec<String>),
    Set(BTreeSet<String>),
    Opaque(OpaqueValue),
}

impl Value {
    /// Short variant name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::OptionalText(_) => "optional text",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::List(_) => "list of text",
            Value::Set(_) => "set of text",
            Value::Opaque(_) => "opaque",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::OptionalText(Some(s)) => write!(f, "{s}"),
            Value::OptionalText(None) => write!(f, "None"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
            Value::Set(items) => {
                let joined = items.iter().cloned().collect::<Vec<_>>().join(", ");
                write!(f, "{{{joined}}}")
            }
            Value::Opaque(o) => write!(f, "<{}>", o.type_name()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Option<String>> for Value {
    fn from(s: Option<String>) -> Self {
        Value::OptionalText(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeSet<String>> for Value {
    fn from(items: BTreeSet<String>) -> Self {
        Value::Set(items)
    }
}

/// A type-erased value injected through the override map.
///
/// Used for dependencies that cannot be expressed as environment text, such
/// as an already-connected API client. The concrete type name is captured at
/// construction so audit output and error messages can identify it.
#[derive(Clone)]
pub struct OpaqueValue {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recover the concrete value, or `None` if `T` is not the stored type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Where a resolved value came from. Used only for audit rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Read from the named environment variable.
    Env { var: String },
    /// Nothing was set; the declared default was used. `tried` lists the
    /// lookups that were probed, in order.
    DefaultUnset { tried: Vec<String> },
    /// The named variable held the default keyword, selecting the declared
    /// default explicitly.
    DefaultKeyword { var: String, keyword: String },
    /// Supplied through the override map; no environment variable implicated.
    Supplied,
}

impl ValueSource {
    /// Human-readable source annotation, or `None` for override-supplied
    /// values which render without one.
    pub fn describe(&self) -> Option<String> {
        match self {
            ValueSource::Env { var } => Some(format!("from env var {var}")),
            ValueSource::DefaultUnset { tried } if tried.len() == 1 => {
                Some(format!("default value; {} was not set", tried[0]))
            }
            ValueSource::DefaultUnset { tried } => Some(format!(
                "default value; none of {} were set",
                tried.join(", ")
            )),
            ValueSource::DefaultKeyword { var, keyword } => {
                Some(format!("default value ({var} set to {keyword})"))
            }
            ValueSource::Supplied => None,
        }
    }
}
