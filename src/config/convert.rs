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

//! String-to-value conversion for environment-sourced raw strings.
//!
//! Converters run only on strings that actually came from the environment;
//! declared defaults pass through untouched. The converter for a field is
//! selected once, when its schema is built, and cached on the descriptor —
//! a declared type with no converter is a schema error, not a load error.

use std::collections::BTreeSet;

use super::schema::DeclaredType;
use super::value::Value;

/// A cached conversion function from raw environment text to a typed value.
pub type Converter = fn(&str) -> Result<Value, ConvertError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConvertError {
    #[error("expected one of true/false/1/0/yes/no, got \"{value}\"")]
    InvalidBool { value: String },

    #[error("\"{value}\" is not a base-10 integer")]
    InvalidInt { value: String },
}

/// Look up the converter for a declared type. `None` for opaque types, which
/// cannot be produced from text.
pub(crate) fn converter_for(declared: &DeclaredType) -> Option<Converter> {
    match declared {
        DeclaredType::Text => Some(text),
        DeclaredType::OptionalText => Some(optional_text),
        DeclaredType::Bool => Some(boolean),
        DeclaredType::Int => Some(int),
        DeclaredType::ListOfText => Some(list),
        DeclaredType::SetOfText => Some(set),
        DeclaredType::Opaque { .. } => None,
    }
}

fn text(raw: &str) -> Result<Value, ConvertError> {
    Ok(Value::Text(raw.to_owned()))
}

// "Optional" only affects whether a default of None is legal; a present
// string converts exactly like text.
fn optional_text(raw: &str) -> Result<Value, ConvertError> {
    Ok(Value::OptionalText(Some(raw.to_owned())))
}

fn boolean(raw: &str) -> Result<Value, ConvertError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(Value::Bool(true)),
        "false" | "0" | "no" => Ok(Value::Bool(false)),
        _ => Err(ConvertError::InvalidBool {
            value: raw.to_owned(),
        }),
    }
}

fn int(raw: &str) -> Result<Value, ConvertError> {
    raw.parse::<i64>()
        .map(Value::Int)
        .map_err(|_| ConvertError::InvalidInt {
            value: raw.to_owned(),
        })
}

fn list(raw: &str) -> Result<Value, ConvertError> {
    Ok(Value::List(split_commas(raw)))
}

fn set(raw: &str) -> Result<Value, ConvertError> {
    let items: BTreeSet<String> = split_commas(raw).into_iter().collect();
    Ok(Value::Set(items))
}

/// Split on `,` with whitespace stripped from each element. The empty string
/// yields no elements, not a single empty element.
fn split_commas(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|part| part.trim().to_owned()).collect()
}
