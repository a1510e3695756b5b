//! End-to-end scenarios exercising dependency resolution, longest-match
//! disambiguation, and default propagation across a small grammar built from
//! the public combinator surface.
#![allow(clippy::unwrap_used)]

use depcli::dependency::Registry;
use depcli::object::{field, Object};
use depcli::value_parser::Mode;
use depcli::value_parsers::{ChoiceValueParser, StringValueParser};
use depcli::{
    argument, longest_match, object, option, option_derived, option_source, parse,
    with_default_some, Combinator, Derived, ErrorKind,
};

fn mode_log_level_grammar() -> Object {
    let mode_opt = option_source(vec!["--mode".to_string()], ChoiceValueParser::new("MODE", ["dev", "prod"]));
    let mode_id = mode_opt.source_identities()[0];
    let log_level = option_derived(
        vec!["--log-level".to_string()],
        Derived::new(
            vec![mode_id],
            "LOG_LEVEL",
            Mode::Sync,
            move |registry: &Registry| {
                let mode: String = registry.get(mode_id).unwrap_or_else(|| "dev".to_string());
                let choices: &[&str] = if mode == "prod" { &["quiet", "silent"] } else { &["debug", "verbose"] };
                Ok(ChoiceValueParser::new("LOG_LEVEL", choices.iter().copied()))
            },
            Registry::new,
        ),
    );
    object! {
        mode: mode_opt,
        log_level: log_level,
    }
}

#[test]
fn dependency_resolves_when_source_precedes_derived() {
    let parser = mode_log_level_grammar();
    let mut result = parse(&parser, ["--mode", "prod", "--log-level", "quiet"]).expect("parse succeeds");
    assert_eq!(field::<Option<String>>(&mut result, "mode"), Some("prod".to_string()));
    assert_eq!(field::<Option<String>>(&mut result, "log_level"), Some("quiet".to_string()));
}

#[test]
fn dependency_resolves_when_derived_precedes_source() {
    let parser = mode_log_level_grammar();
    let mut result = parse(&parser, ["--log-level", "silent", "--mode", "prod"]).expect("parse succeeds");
    assert_eq!(field::<Option<String>>(&mut result, "mode"), Some("prod".to_string()));
    assert_eq!(field::<Option<String>>(&mut result, "log_level"), Some("silent".to_string()));
}

#[test]
fn derived_value_invalid_under_the_resolved_source_fails() {
    let parser = mode_log_level_grammar();
    let err = parse(&parser, ["--mode", "dev", "--log-level", "quiet"]).unwrap_err();
    assert_eq!(err.error.kind, ErrorKind::InvalidValue);
    let message = err.to_string();
    assert!(message.contains("quiet"));
    assert!(message.contains("debug"));
    assert!(message.contains("verbose"));
}

#[test]
fn longest_match_falls_back_to_the_branch_that_actually_completes() {
    // `short` shares `--alpha` with `long` but also needs a positional value
    // nothing in the input can ever supply, so it can never complete; `long`
    // picks up the rest of the stream instead.
    let short = object! {
        alpha: option(vec!["--alpha".to_string()], StringValueParser::new("ALPHA")),
        nonce: argument("NONCE", StringValueParser::new("NONCE")),
    };
    let long = object! {
        alpha: option(vec!["--alpha".to_string()], StringValueParser::new("ALPHA")),
        beta: option(vec!["--beta".to_string()], StringValueParser::new("BETA")),
    };
    let parser = longest_match(short, long);

    let mut result = parse(&parser, ["--alpha", "v1", "--beta", "v2"]).expect("parse succeeds");
    assert_eq!(field::<Option<String>>(&mut result, "beta"), Some("v2".to_string()));
}

#[test]
fn longest_match_prefers_the_branch_that_consumes_more_of_a_shared_input() {
    // Both branches fully complete from `--mode y --derived y1 --extra
    // value`: `b1` stops after `mode`/`derived` (four tokens), `b2` goes on
    // to also consume `--extra value` (six tokens). `b2` wins despite being
    // declared second.
    fn branch(with_extra: bool) -> Object {
        let mode_opt = option_source(vec!["--mode".to_string()], StringValueParser::new("MODE"));
        let mode_id = mode_opt.source_identities()[0];
        let derived = option_derived(
            vec!["--derived".to_string()],
            Derived::new(
                vec![mode_id],
                "DERIVED",
                Mode::Sync,
                move |registry: &Registry| {
                    let mode: String = registry.get(mode_id).unwrap_or_else(|| "y".to_string());
                    Ok(ChoiceValueParser::new("DERIVED", vec![format!("{mode}1"), format!("{mode}2")]))
                },
                Registry::new,
            ),
        );
        if with_extra {
            object! {
                mode: mode_opt,
                derived: derived,
                extra: option(vec!["--extra".to_string()], StringValueParser::new("EXTRA")),
            }
        } else {
            object! {
                mode: mode_opt,
                derived: derived,
            }
        }
    }

    let b1 = branch(false);
    let b2 = branch(true);
    let parser = longest_match(b1, b2);

    let mut result = parse(&parser, ["--mode", "y", "--derived", "y1", "--extra", "value"]).expect("parse succeeds");
    assert_eq!(field::<Option<String>>(&mut result, "mode"), Some("y".to_string()));
    assert_eq!(field::<Option<String>>(&mut result, "derived"), Some("y1".to_string()));
    assert_eq!(field::<Option<String>>(&mut result, "extra"), Some("value".to_string()));
}

#[test]
fn multiple_derived_options_share_one_source() {
    let env_opt = option_source(vec!["--env".to_string()], StringValueParser::new("ENV"));
    let env_id = env_opt.source_identities()[0];

    let log_level = option_derived(
        vec!["--log-level".to_string()],
        Derived::new(
            vec![env_id],
            "LOG_LEVEL",
            Mode::Sync,
            move |registry: &Registry| {
                let env: String = registry.get(env_id).unwrap_or_else(|| "dev".to_string());
                let choices: &[&str] = if env == "staging" { &["info", "debug"] } else { &["quiet"] };
                Ok(ChoiceValueParser::new("LOG_LEVEL", choices.iter().copied()))
            },
            Registry::new,
        ),
    );
    let timeout = option_derived(
        vec!["--timeout".to_string()],
        Derived::new(
            vec![env_id],
            "TIMEOUT",
            Mode::Sync,
            |_registry: &Registry| Ok(StringValueParser::new("TIMEOUT")),
            Registry::new,
        ),
    );
    let retries = option_derived(
        vec!["--retries".to_string()],
        Derived::new(
            vec![env_id],
            "RETRIES",
            Mode::Sync,
            |_registry: &Registry| Ok(StringValueParser::new("RETRIES")),
            Registry::new,
        ),
    );

    let parser = object! {
        env: env_opt,
        log_level: log_level,
        timeout: timeout,
        retries: retries,
    };

    let mut result = parse(
        &parser,
        ["--env", "staging", "--log-level", "info", "--timeout", "10000", "--retries", "3"],
    )
    .expect("parse succeeds");
    assert_eq!(field::<Option<String>>(&mut result, "env"), Some("staging".to_string()));
    assert_eq!(field::<Option<String>>(&mut result, "log_level"), Some("info".to_string()));
    assert_eq!(field::<Option<String>>(&mut result, "timeout"), Some("10000".to_string()));
    assert_eq!(field::<Option<String>>(&mut result, "retries"), Some("3".to_string()));
}

#[test]
fn with_default_on_source_feeds_derived_sibling() {
    let mode_opt = option_source(vec!["--mode".to_string()], ChoiceValueParser::new("MODE", ["dev", "prod"]));
    let mode_id = mode_opt.source_identities()[0];
    let mode_field = with_default_some(mode_opt, "prod".to_string());

    let log_level = option_derived(
        vec!["--log-level".to_string()],
        Derived::new(
            vec![mode_id],
            "LOG_LEVEL",
            Mode::Sync,
            move |registry: &Registry| {
                let mode: String = registry.get(mode_id).unwrap_or_else(|| "dev".to_string());
                let choices: &[&str] = if mode == "prod" {
                    &["quiet", "silent", "warn", "error"]
                } else {
                    &["debug", "verbose"]
                };
                Ok(ChoiceValueParser::new("LOG_LEVEL", choices.iter().copied()))
            },
            Registry::new,
        ),
    );

    let parser = object! {
        mode: mode_field,
        log_level: log_level,
    };

    let mut result = parse(&parser, ["--log-level", "warn"]).expect("parse succeeds");
    assert_eq!(field::<String>(&mut result, "mode"), "prod".to_string());
    assert_eq!(field::<Option<String>>(&mut result, "log_level"), Some("warn".to_string()));
}
