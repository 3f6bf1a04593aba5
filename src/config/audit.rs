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

//! Provenance-annotated rendering of a load attempt.
//!
//! One line per loggable field, in declaration order, rendered whether or not
//! the load succeeded — an operator gets the whole picture from a single log
//! emission instead of chasing one missing variable at a time.

use super::errors::FieldError;
use super::resolver::FieldOutcome;
use super::schema::{LogPolicy, Schema};

/// Render one line per field: `name=value (source)`.
///
/// Fields with policy `Skip` are omitted entirely. `Redact` fields render
/// `REDACTED` in place of the value but keep their source description.
/// Failed fields render as `name=ERROR: message`. Override-supplied fields
/// carry no source annotation.
pub fn render_lines(schema: &Schema, outcomes: &[FieldOutcome]) -> Vec<String> {
    let mut lines = Vec::with_capacity(outcomes.len());

    for (field, outcome) in schema.fields().iter().zip(outcomes) {
        if field.log_policy() == LogPolicy::Skip {
            continue;
        }

        match outcome {
            FieldOutcome::Failed(error) => {
                lines.push(format!("{}=ERROR: {}", field.name(), failure_text(field.log_policy(), error)));
            }
            FieldOutcome::Resolved { value, source } => {
                let rendered = match field.log_policy() {
                    LogPolicy::Redact => "REDACTED".to_owned(),
                    _ => value.to_string(),
                };
                let line = match source.describe() {
                    Some(description) => {
                        format!("{}={} ({})", field.name(), rendered, description)
                    }
                    None => format!("{}={}", field.name(), rendered),
                };
                lines.push(line);
            }
        }
    }

    lines
}

// Conversion failures echo the raw value; for redacted fields that would put
// the secret in the log, so the value is dropped from the message.
fn failure_text(policy: LogPolicy, error: &FieldError) -> String {
    match (policy, error) {
        (LogPolicy::Redact, FieldError::InvalidValue { name, var, .. }) => {
            format!("'{name}' could not be parsed from env var {var} (value redacted)")
        }
        (_, error) => error.to_string(),
    }
}
