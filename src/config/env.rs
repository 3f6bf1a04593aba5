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

//! Inputs to a load call: the environment snapshot and the override map.
//!
//! Both are passed explicitly to the loader rather than read from ambient
//! process state, so every load call is fully parameterized and tests never
//! have to mutate the real environment.

use std::any::Any;
use std::collections::HashMap;

use super::value::{OpaqueValue, Value};

/// The keyword that, when found as an environment variable's value, means
/// "use the declared default instead of this literal string". Overridable
/// per load call and, in the binary, through [`DEFAULT_KEYWORD_VAR`].
pub const DEFAULT_KEYWORD: &str = "default";

/// Environment variable consulted by the binary to reconfigure the default
/// keyword itself.
pub const DEFAULT_KEYWORD_VAR: &str = "EXPORTER_DEFAULT_KEYWORD";

/// An immutable name-to-string view of the environment, captured once per
/// load call.
///
/// In production this is a snapshot of the OS process environment; in tests
/// it is built from literals:
///
/// ```
/// use delivery_exporter::config::EnvSnapshot;
///
/// let env = EnvSnapshot::from([("GIT_API", "https://api.github.com")]);
/// assert_eq!(env.get("GIT_API"), Some("https://api.github.com"));
/// assert!(!env.contains("TOKEN"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the OS process environment.
    pub fn from_os() -> Self {
        std::env::vars().collect()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Whether `name` is present at all. An empty string is a present value,
    /// distinct from an absent variable.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }
}

impl FromIterator<(String, String)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for EnvSnapshot {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }
}

/// Caller-supplied values that preempt environment resolution.
///
/// An override satisfies any field without consulting the environment, and is
/// the only way to satisfy a field declared with no environment lookups.
/// Opaque entries inject runtime-constructed dependencies (an API client, a
/// platform handle) that cannot come from text:
///
/// ```
/// use delivery_exporter::config::Overrides;
///
/// struct ApiClient;
///
/// let overrides = Overrides::new()
///     .value("git_provider", "github")
///     .opaque("api_client", ApiClient);
/// assert!(overrides.contains("api_client"));
/// ```
#[derive(Debug, Default)]
pub struct Overrides {
    values: HashMap<String, Value>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain value for the named field.
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Add a type-erased dependency for the named field.
    pub fn opaque<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.values
            .insert(name.into(), Value::Opaque(OpaqueValue::new(value)));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_present() {
        let env = EnvSnapshot::from([("EMPTY", "")]);
        assert!(env.contains("EMPTY"));
        assert_eq!(env.get("EMPTY"), Some(""));
        assert!(!env.contains("ABSENT"));
    }

    #[test]
    fn overrides_hold_plain_and_opaque_values() {
        struct Handle(u32);

        let overrides = Overrides::new()
            .value("namespace", "prod")
            .opaque("handle", Handle(7));

        assert!(matches!(overrides.get("namespace"), Some(Value::Text(s)) if s == "prod"));
        match overrides.get("handle") {
            Some(Value::Opaque(o)) => assert_eq!(o.downcast::<Handle>().unwrap().0, 7),
            other => panic!("expected opaque value, got {other:?}"),
        }
    }
}
