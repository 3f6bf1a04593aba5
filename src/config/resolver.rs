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

//! Per-field value resolution.
//!
//! Resolution order for one field:
//!
//! 1. The override map, which preempts everything.
//! 2. With lookups disabled: fail — only an override can satisfy the field.
//! 3. The first present environment variable in declaration order. Presence
//!    counts even for an empty string; later names are never consulted once
//!    an earlier one is present.
//! 4. A present value equal to the default keyword selects the declared
//!    default explicitly (an error if there is none).
//! 5. Any other present value goes through the field's cached converter.
//! 6. Nothing present: the declared default, or a missing-variable failure.

use super::env::{EnvSnapshot, Overrides};
use super::errors::FieldError;
use super::schema::FieldDescriptor;
use super::value::{Value, ValueSource};

/// The terminal state of one field's resolution.
#[derive(Debug)]
pub enum FieldOutcome {
    Resolved { value: Value, source: ValueSource },
    Failed(FieldError),
}

impl FieldOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, FieldOutcome::Resolved { .. })
    }
}

pub fn resolve(
    field: &FieldDescriptor,
    env: &EnvSnapshot,
    overrides: &Overrides,
    default_keyword: &str,
) -> FieldOutcome {
    let name = field.name();

    if let Some(value) = overrides.get(name) {
        return FieldOutcome::Resolved {
            value: value.clone(),
            source: ValueSource::Supplied,
        };
    }

    let lookups = field.env_lookups();
    if lookups.is_empty() {
        return FieldOutcome::Failed(FieldError::MissingOverride { name });
    }

    let first_match = lookups
        .iter()
        .find_map(|var| env.get(var).map(|raw| (var.as_str(), raw)));

    let (var, raw) = match first_match {
        Some(hit) => hit,
        None => {
            // Nothing set anywhere; only a declared default can save us.
            return match field.default() {
                Some(default) => FieldOutcome::Resolved {
                    value: default.produce(),
                    source: ValueSource::DefaultUnset {
                        tried: lookups.to_vec(),
                    },
                },
                None => FieldOutcome::Failed(FieldError::MissingVariable {
                    name,
                    tried: lookups.to_vec(),
                }),
            };
        }
    };

    if raw == default_keyword {
        return match field.default() {
            Some(default) => FieldOutcome::Resolved {
                value: default.produce(),
                source: ValueSource::DefaultKeyword {
                    var: var.to_owned(),
                    keyword: default_keyword.to_owned(),
                },
            },
            None => FieldOutcome::Failed(FieldError::MissingDefault {
                name,
                var: var.to_owned(),
            }),
        };
    }

    let convert = match field.converter() {
        Some(convert) => convert,
        // Schema build rejects env lookups on fields without a converter.
        None => unreachable!("fields with env lookups always carry a converter"),
    };

    match convert(raw) {
        Ok(value) => FieldOutcome::Resolved {
            value,
            source: ValueSource::Env {
                var: var.to_owned(),
            },
        },
        Err(source) => FieldOutcome::Failed(FieldError::InvalidValue {
            name,
            var: var.to_owned(),
            value: raw.to_owned(),
            source,
        }),
    }
}
