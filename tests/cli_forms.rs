//! Token-grammar forms beyond plain `--name`/`--name=value`/positional: bundled
//! boolean short-flag clusters, the short inline-value option form, and
//! suggestions for a derived field once its source is known.
#![allow(clippy::unwrap_used)]

use depcli::dependency::{Identity, Registry};
use depcli::object::field;
use depcli::value_parser::{Mode, Suggestion};
use depcli::value_parsers::{ChoiceValueParser, StringValueParser};
use depcli::{object, option, option_derived, parse, Combinator, Derived, Flag};
use futures::StreamExt;

#[test]
fn bundled_short_flags_expand_to_individual_flags() {
    let parser = object! {
        all: Flag::new(vec!["-a".to_string()]),
        boring: Flag::new(vec!["-b".to_string()]),
        color: Flag::new(vec!["-c".to_string()]),
    };

    let mut result = parse(&parser, ["-abc"]).expect("parse succeeds");
    assert!(field::<bool>(&mut result, "all"));
    assert!(field::<bool>(&mut result, "boring"));
    assert!(field::<bool>(&mut result, "color"));
}

#[test]
fn bundled_short_flags_compose_with_other_options() {
    let parser = object! {
        all: Flag::new(vec!["-a".to_string()]),
        boring: Flag::new(vec!["-b".to_string()]),
        name: option(vec!["-n".to_string(), "--name".to_string()], StringValueParser::new("NAME")),
    };

    let mut result = parse(&parser, ["-ab", "--name", "x"]).expect("parse succeeds");
    assert!(field::<bool>(&mut result, "all"));
    assert!(field::<bool>(&mut result, "boring"));
    assert_eq!(field::<Option<String>>(&mut result, "name"), Some("x".to_string()));
}

#[test]
fn a_cluster_naming_a_valued_option_is_left_for_its_own_short_form() {
    // `-n` here is a valued option, not a boolean flag, so `-njohn` is never a
    // cluster: the whole tail after the two-character name is `john`, `Opt`'s
    // own short inline-value form's job, not `Fields`' cluster splitter.
    let parser = object! {
        name: option(vec!["-n".to_string(), "--name".to_string()], StringValueParser::new("NAME")),
    };

    let mut result = parse(&parser, ["-njohn"]).expect("parse succeeds");
    assert_eq!(field::<Option<String>>(&mut result, "name"), Some("john".to_string()));
}

#[test]
fn short_inline_value_is_distinct_from_space_separated_and_equals_forms() {
    let grammar = || {
        object! {
            name: option(vec!["-n".to_string(), "--name".to_string()], StringValueParser::new("NAME")),
        }
    };

    let mut inline = parse(&grammar(), ["-nval"]).expect("parse succeeds");
    assert_eq!(field::<Option<String>>(&mut inline, "name"), Some("val".to_string()));

    let mut spaced = parse(&grammar(), ["-n", "val"]).expect("parse succeeds");
    assert_eq!(field::<Option<String>>(&mut spaced, "name"), Some("val".to_string()));

    let mut equals = parse(&grammar(), ["--name=val"]).expect("parse succeeds");
    assert_eq!(field::<Option<String>>(&mut equals, "name"), Some("val".to_string()));
}

fn literal_texts(suggestions: Vec<Suggestion>) -> Vec<String> {
    let mut texts: Vec<String> = suggestions
        .into_iter()
        .map(|s| match s {
            Suggestion::Literal { text, .. } => text,
            Suggestion::File { .. } => panic!("unexpected file suggestion"),
        })
        .collect();
    texts.sort();
    texts
}

fn mode_dependent_log_level(mode_id: Identity) -> Derived<String> {
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
    )
}

#[test]
fn derived_suggest_reflects_the_resolved_source() {
    let mode_id = Identity::fresh();
    let derived = mode_dependent_log_level(mode_id);

    let mut prod_registry = Registry::new();
    prod_registry.set(mode_id, "prod".to_string());
    let prod_suggestions: Vec<Suggestion> = futures::executor::block_on(derived.suggest(&prod_registry, "s").collect());
    assert_eq!(literal_texts(prod_suggestions), vec!["silent".to_string()]);

    let mut dev_registry = Registry::new();
    dev_registry.set(mode_id, "dev".to_string());
    let dev_suggestions: Vec<Suggestion> = futures::executor::block_on(derived.suggest(&dev_registry, "").collect());
    assert_eq!(literal_texts(dev_suggestions), vec!["debug".to_string(), "verbose".to_string()]);
}

#[test]
fn derived_suggest_falls_back_to_factory_defaults_before_the_source_is_known() {
    let mode_id = Identity::fresh();
    let derived = mode_dependent_log_level(mode_id);

    // `mode_id` is unbound in this registry, so `suggest` builds its parser
    // from the factory's own defaults (an empty registry, the "dev" branch)
    // rather than refusing to answer.
    let empty_registry = Registry::new();
    let suggestions: Vec<Suggestion> = futures::executor::block_on(derived.suggest(&empty_registry, "").collect());
    assert_eq!(literal_texts(suggestions), vec!["debug".to_string(), "verbose".to_string()]);
}

#[test]
fn option_derived_suggest_threads_the_registry_through_to_its_derived_source() {
    let mode_id = Identity::fresh();
    let log_level_opt = option_derived(vec!["--log-level".to_string()], mode_dependent_log_level(mode_id));

    let mut registry = Registry::new();
    registry.set(mode_id, "prod".to_string());
    let state = log_level_opt.initial_state();
    let suggestions: Vec<Suggestion> =
        futures::executor::block_on(log_level_opt.suggest(&state, "s", &registry).collect());
    assert_eq!(literal_texts(suggestions), vec!["silent".to_string()]);
}
