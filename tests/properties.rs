//! Property tests for the engine's cross-cutting invariants: identity
//! uniqueness, field-order irrelevance, modifier transparency, longest-match
//! fallback, deferred-resolution order independence, failure locality, and the
//! optional/default/multiple laws on empty input.
#![allow(clippy::unwrap_used)]

use depcli::dependency::{Identity, Registry};
use depcli::object::{field, Object};
use depcli::value_parser::Mode;
use depcli::value_parsers::{ChoiceValueParser, StringValueParser};
use depcli::{
    argument, group, multiple, object, option, option_derived, option_source, optional, parse,
    with_default, Combinator, Derived, ErrorKind,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn safe_value() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,7}"
}

proptest! {
    /// spec.md §3: every dependency source's identity is unique within the process.
    #[test]
    fn identity_is_always_unique(count in 1usize..200) {
        let ids: Vec<Identity> = (0..count).map(|_| Identity::fresh()).collect();
        let unique: HashSet<Identity> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), count);
    }

    /// spec.md §4.3: an `object`'s fields resolve independent of declaration
    /// order of the tokens on the command line (not the fields themselves,
    /// which is a macro-time decision) when each field's flag is unambiguous.
    #[test]
    fn object_fields_are_order_independent(a_first in any::<bool>(), a_val in safe_value(), b_val in safe_value()) {
        let grammar = || object! {
            a: option(vec!["--a".to_string()], StringValueParser::new("A")),
            b: option(vec!["--b".to_string()], StringValueParser::new("B")),
        };

        let tokens: Vec<String> = if a_first {
            vec!["--a".into(), a_val.clone(), "--b".into(), b_val.clone()]
        } else {
            vec!["--b".into(), b_val.clone(), "--a".into(), a_val.clone()]
        };

        let mut result = parse(&grammar(), tokens).expect("parse succeeds");
        prop_assert_eq!(field::<Option<String>>(&mut result, "a"), Some(a_val));
        prop_assert_eq!(field::<Option<String>>(&mut result, "b"), Some(b_val));
    }

    /// spec.md §4.4: a modifier forwards `source_identities` unchanged, so
    /// wrapping a source in `optional`/`withDefault`/`group` never hides it
    /// from a derived sibling.
    #[test]
    fn modifiers_forward_source_identities(val in safe_value()) {
        let src = option_source(vec!["--src".to_string()], StringValueParser::new("SRC"));
        let bare_ids = src.source_identities();

        let wrapped_optional = optional(option_source(vec!["--src".to_string()], StringValueParser::new("SRC")));
        let wrapped_default = with_default(
            optional(option_source(vec!["--src".to_string()], StringValueParser::new("SRC"))),
            None,
        );
        let wrapped_group = group("title", option_source(vec!["--src".to_string()], StringValueParser::new("SRC")));

        prop_assert_eq!(bare_ids.len(), 1);
        prop_assert_eq!(wrapped_optional.source_identities().len(), 1);
        prop_assert_eq!(wrapped_default.source_identities().len(), 1);
        prop_assert_eq!(wrapped_group.source_identities().len(), 1);

        // sanity: the wrapper still actually parses the value through.
        let mut result = parse(&object! { src: src }, vec!["--src".to_string(), val.clone()]).expect("parse succeeds");
        prop_assert_eq!(field::<Option<String>>(&mut result, "src"), Some(val));
    }

    /// spec.md §8 scenario 2/§4.2: a derived field resolves to the same value
    /// whether its source token precedes or follows it on the command line.
    #[test]
    fn deferred_resolution_is_order_independent(source_first in any::<bool>()) {
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
        let grammar = object! { mode: mode_opt, log_level: log_level };

        let tokens: Vec<String> = if source_first {
            vec!["--mode".into(), "prod".into(), "--log-level".into(), "quiet".into()]
        } else {
            vec!["--log-level".into(), "quiet".into(), "--mode".into(), "prod".into()]
        };

        let mut result = parse(&grammar, tokens).expect("parse succeeds");
        prop_assert_eq!(field::<Option<String>>(&mut result, "mode"), Some("prod".to_string()));
        prop_assert_eq!(field::<Option<String>>(&mut result, "log_level"), Some("quiet".to_string()));
    }

    /// spec.md §7 propagation policy: a failing sibling's error doesn't
    /// absorb or distort a healthy sibling's outcome — the surfaced error is
    /// exactly the failing field's own `invalid-value`, nothing merged in
    /// from the one that succeeded.
    #[test]
    fn failing_sibling_does_not_corrupt_a_healthy_one(ok_val in safe_value(), bad_val in "[a-zA-Z][a-zA-Z0-9]{0,7}") {
        prop_assume!(bad_val != "yes" && bad_val != "no");
        let grammar = object! {
            flag: option(vec!["--flag".to_string()], ChoiceValueParser::new("FLAG", ["yes", "no"])),
            note: option(vec!["--note".to_string()], StringValueParser::new("NOTE")),
        };

        let err = parse(
            &grammar,
            vec!["--flag".to_string(), bad_val.clone(), "--note".to_string(), ok_val],
        )
        .unwrap_err();

        prop_assert_eq!(err.error.kind, ErrorKind::InvalidValue);
        // Exactly one error's worth of terms: `value`, "is not a valid", metavar,
        // "expected one of", choices — five terms, not a merger with a second
        // field's complaint.
        prop_assert_eq!(err.error.terms.len(), 5);
        let message = err.to_string();
        prop_assert!(message.contains(&bad_val));
    }

    /// spec.md §4.4: `optional(p)` on an absent `p` completes to `None`; a
    /// present `p` still completes to `Some`. Wraps `argument`, which errors
    /// (rather than itself completing to `None`) on absence — `option` is
    /// already `Option`-shaped and isn't what `optional` is for.
    #[test]
    fn optional_on_empty_is_none(val in safe_value()) {
        let grammar = object! {
            maybe: optional(argument("MAYBE", StringValueParser::new("MAYBE"))),
        };
        let mut absent = parse(&grammar, Vec::<String>::new()).expect("parse succeeds");
        prop_assert_eq!(field::<Option<String>>(&mut absent, "maybe"), None);

        let mut present = parse(&grammar, vec![val.clone()]).expect("parse succeeds");
        prop_assert_eq!(field::<Option<String>>(&mut present, "maybe"), Some(val));
    }

    /// spec.md §4.4: `withDefault(p, d)` on an absent `p` completes to `d`.
    #[test]
    fn with_default_on_empty_is_the_default(default_val in safe_value(), given_val in safe_value()) {
        let make = |default: String| object! {
            setting: with_default(option(vec!["--setting".to_string()], StringValueParser::new("SETTING")), default),
        };

        let mut absent = parse(&make(default_val.clone()), Vec::<String>::new()).expect("parse succeeds");
        prop_assert_eq!(field::<String>(&mut absent, "setting"), default_val.clone());

        let mut present = parse(&make(default_val), vec!["--setting".to_string(), given_val.clone()]).expect("parse succeeds");
        prop_assert_eq!(field::<String>(&mut present, "setting"), given_val);
    }

    /// spec.md §4.4: `multiple(p)` on an absent `p` completes to an empty
    /// sequence, and preserves the order repetitions were given in otherwise.
    #[test]
    fn multiple_on_empty_is_an_empty_sequence(vals in proptest::collection::vec(safe_value(), 0..5)) {
        let grammar = object! {
            tags: multiple(option(vec!["--tag".to_string()], StringValueParser::new("TAG"))),
        };

        let mut absent = parse(&grammar, Vec::<String>::new()).expect("parse succeeds");
        prop_assert_eq!(field::<Vec<Option<String>>>(&mut absent, "tags"), Vec::<Option<String>>::new());

        let mut tokens = Vec::new();
        for v in &vals {
            tokens.push("--tag".to_string());
            tokens.push(v.clone());
        }
        let mut present = parse(&grammar, tokens).expect("parse succeeds");
        let expected: Vec<Option<String>> = vals.iter().cloned().map(Some).collect();
        prop_assert_eq!(field::<Vec<Option<String>>>(&mut present, "tags"), expected);
    }
}

/// spec.md §8 scenario 4, restated as a property: whichever alternative can
/// actually `complete` (every required field satisfiable from the given
/// tokens) wins over one that structurally cannot, regardless of how many
/// tokens the non-completing branch's shared prefix would otherwise consume.
#[test]
fn longest_match_prefers_the_branch_that_can_complete() {
    use depcli::longest_match;

    let short = object! {
        alpha: option(vec!["--alpha".to_string()], StringValueParser::new("ALPHA")),
        nonce: argument("NONCE", StringValueParser::new("NONCE")),
    };
    let long = object! {
        alpha: option(vec!["--alpha".to_string()], StringValueParser::new("ALPHA")),
        beta: option(vec!["--beta".to_string()], StringValueParser::new("BETA")),
    };
    let parser = longest_match(short, long);

    for tokens in [
        vec!["--alpha".to_string(), "v1".to_string(), "--beta".to_string(), "v2".to_string()],
        vec!["--beta".to_string(), "v2".to_string()],
    ] {
        let mut result = parse(&parser, tokens).expect("parse succeeds");
        assert_eq!(field::<Option<String>>(&mut result, "beta"), Some("v2".to_string()));
    }
}

/// spec.md §8 scenario 4, the case the fallback test above doesn't reach:
/// both alternatives can fully `complete` from the same input, and the one
/// that consumed more of it wins, even though it's declared second.
#[test]
fn longest_match_prefers_the_branch_with_more_total_tokens_when_both_complete() {
    use depcli::longest_match;

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

    let parser = longest_match(branch(false), branch(true));
    let mut result = parse(&parser, ["--mode", "y", "--derived", "y1", "--extra", "value"]).expect("parse succeeds");
    assert_eq!(field::<Option<String>>(&mut result, "extra"), Some("value".to_string()));
}
