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

//! End-to-end tests for the declarative configuration loader.

use std::collections::BTreeSet;
use std::sync::Arc;

use lazy_static::lazy_static;
use pretty_assertions::assert_eq;

use delivery_exporter::config::{
    load, render_lines, resolve_all, ConfigError, ConstructError, EnvConfig, EnvSnapshot, Field,
    FieldError, Overrides, ResolvedValues, Schema, Value, ValueSource,
};

/// A configuration shaped like the commit-time exporter's, including an
/// externally-supplied client that never comes from the environment.
#[derive(Debug)]
struct PlatformClient {
    cluster: String,
}

#[derive(Debug)]
struct ExampleConfig {
    client: Arc<PlatformClient>,
    api_user: Option<String>,
    token: Option<String>,
    git_api: String,
    namespaces: BTreeSet<String>,
    watched: Vec<String>,
    tls_verify: bool,
}

impl EnvConfig for ExampleConfig {
    fn schema() -> &'static Schema {
        lazy_static! {
            static ref SCHEMA: Schema = Schema::builder("ExampleConfig")
                .field(Field::opaque::<PlatformClient>("client"))
                .field(
                    Field::optional_text("api_user")
                        .env_lookups(["API_USER", "GIT_USER", "GITHUB_USER"])
                        .default(Option::<String>::None)
                )
                .field(
                    Field::optional_text("token")
                        .env_lookups(["TOKEN", "GIT_TOKEN", "GITHUB_TOKEN"])
                        .default(Option::<String>::None)
                )
                .field(
                    Field::text("git_api")
                        .env_lookups(["GIT_API", "GITHUB_API"])
                        .default("")
                )
                .field(Field::set("namespaces").default_factory(|| Value::Set(Default::default())))
                .field(Field::list("watched").default_factory(|| Value::List(Vec::new())))
                .field(Field::bool("tls_verify").default(true))
                .build()
                .expect("invalid ExampleConfig schema");
        }
        &SCHEMA
    }

    fn from_values(values: &mut ResolvedValues) -> Result<Self, ConstructError> {
        Ok(Self {
            client: values.take_opaque("client")?,
            api_user: values.take_optional_text("api_user")?,
            token: values.take_optional_text("token")?,
            git_api: values.take_text("git_api")?,
            namespaces: values.take_set("namespaces")?,
            watched: values.take_list("watched")?,
            tls_verify: values.take_bool("tls_verify")?,
        })
    }
}

fn client_override() -> Overrides {
    Overrides::new().opaque(
        "client",
        PlatformClient {
            cluster: "in-cluster".to_owned(),
        },
    )
}

#[test]
fn first_match_wins_across_the_lookup_chain() {
    let env = EnvSnapshot::from([
        ("API_USER", "from-api-user"),
        ("GIT_USER", "from-git-user"),
    ]);

    let loaded = load::<ExampleConfig>(&env, &client_override()).unwrap();
    assert_eq!(loaded.api_user.as_deref(), Some("from-api-user"));
    assert_eq!(loaded.token, None);
    assert!(loaded.tls_verify);
}

#[test]
fn default_keyword_selects_the_declared_default() {
    let env = EnvSnapshot::from([("GIT_API", "default")]);

    let loaded = load::<ExampleConfig>(&env, &client_override()).unwrap();
    assert_eq!(loaded.git_api, "");
    let source = loaded.provenance().get("git_api").unwrap();
    assert_eq!(
        source,
        &ValueSource::DefaultKeyword {
            var: "GIT_API".into(),
            keyword: "default".into(),
        }
    );
    assert_eq!(
        source.describe().unwrap(),
        "default value (GIT_API set to default)"
    );
}

#[test]
fn default_keyword_without_a_default_is_a_reported_failure() {
    #[derive(Debug)]
    struct NoDefault;

    impl EnvConfig for NoDefault {
        fn schema() -> &'static Schema {
            lazy_static! {
                static ref SCHEMA: Schema = Schema::builder("NoDefault")
                    .field(Field::text("required"))
                    .build()
                    .expect("invalid NoDefault schema");
            }
            &SCHEMA
        }

        fn from_values(values: &mut ResolvedValues) -> Result<Self, ConstructError> {
            values.take_text("required")?;
            Ok(Self)
        }
    }

    let env = EnvSnapshot::from([("REQUIRED", "default")]);
    let err = load::<NoDefault>(&env, &Overrides::new()).unwrap_err();
    match err {
        ConfigError::Missing(missing) => {
            assert!(matches!(
                missing.missing()[0],
                FieldError::MissingDefault { name: "required", .. }
            ));
        }
        other => panic!("expected missing-data error, got {other:?}"),
    }
}

#[test]
fn every_failure_is_reported_in_one_error() {
    // No overrides: the client is missing too, alongside a malformed bool.
    let env = EnvSnapshot::from([("TLS_VERIFY", "yes please")]);

    let err = load::<ExampleConfig>(&env, &Overrides::new()).unwrap_err();
    match err {
        ConfigError::Missing(missing) => {
            let names: Vec<_> = missing.missing().iter().map(FieldError::field_name).collect();
            assert_eq!(names, vec!["client", "tls_verify"]);

            let message = missing.to_string();
            assert!(message.starts_with("config for ExampleConfig is missing data:"));
            assert!(message.contains("'client' has environment lookups disabled"));
            assert!(message.contains("'tls_verify' could not be parsed"));
        }
        other => panic!("expected missing-data error, got {other:?}"),
    }
}

#[test]
fn collections_split_strip_and_collapse() {
    let env = EnvSnapshot::from([("NAMESPACES", "one, two ,three,two"), ("WATCHED", "")]);

    let loaded = load::<ExampleConfig>(&env, &client_override()).unwrap();
    let expected: BTreeSet<String> = ["one", "two", "three"].iter().map(|s| s.to_string()).collect();
    assert_eq!(loaded.namespaces, expected);
    // An empty string is a present value meaning "no elements".
    assert_eq!(loaded.watched, Vec::<String>::new());
}

#[test]
fn override_bypasses_the_environment_entirely() {
    let loaded = load::<ExampleConfig>(&EnvSnapshot::empty(), &client_override()).unwrap();
    assert_eq!(loaded.client.cluster, "in-cluster");
    assert_eq!(
        loaded.provenance().get("client"),
        Some(&ValueSource::Supplied)
    );
}

#[test]
fn audit_lines_for_the_documented_example() {
    let schema = Schema::builder("Example")
        .field(Field::text("foo"))
        .field(Field::text("bar").default("d"))
        .build()
        .unwrap();
    let env = EnvSnapshot::from([("FOO", "hello")]);

    let outcomes = resolve_all(&schema, &env, &Overrides::new(), "default");
    assert_eq!(
        render_lines(&schema, &outcomes),
        vec![
            "foo=hello (from env var FOO)",
            "bar=d (default value; BAR was not set)",
        ]
    );
}

#[test]
fn audit_lines_render_on_partial_failure() {
    let schema = Schema::builder("Example")
        .field(Field::text("good").default("fine"))
        .field(Field::text("api_token"))
        .build()
        .unwrap();

    let outcomes = resolve_all(&schema, &EnvSnapshot::empty(), &Overrides::new(), "default");
    assert_eq!(
        render_lines(&schema, &outcomes),
        vec![
            "good=fine (default value; GOOD was not set)",
            "api_token=ERROR: 'api_token' was not found in env var API_TOKEN",
        ]
    );
}

#[test]
fn factory_defaults_are_independent_per_load() {
    let first = load::<ExampleConfig>(&EnvSnapshot::empty(), &client_override()).unwrap();
    let second = load::<ExampleConfig>(&EnvSnapshot::empty(), &client_override()).unwrap();

    assert!(first.namespaces.is_empty());
    assert!(second.namespaces.is_empty());
    // Both instances own their collections; nothing is shared.
    let mut owned = first.into_inner();
    owned.namespaces.insert("mutated".to_owned());
    assert!(second.namespaces.is_empty());
}

#[test]
fn redaction_applies_to_provenance_rendering() {
    let schema = Schema::builder("Example")
        .field(Field::text("api_token"))
        .build()
        .unwrap();
    let env = EnvSnapshot::from([("API_TOKEN", "s3cr3t")]);

    let outcomes = resolve_all(&schema, &env, &Overrides::new(), "default");
    let lines = render_lines(&schema, &outcomes);
    assert_eq!(lines, vec!["api_token=REDACTED (from env var API_TOKEN)"]);
    assert!(!lines.join("\n").contains("s3cr3t"));
}
