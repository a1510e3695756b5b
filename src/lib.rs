#![doc = include_str!("../README.md")]

pub mod error;
pub mod token;

pub mod value_parser;
pub mod value_parsers;

pub mod dependency;

pub mod combinator;

pub mod primitives;

pub mod object;
pub mod constructs;

pub mod modifiers;

pub mod driver;

mod macros;

pub use combinator::{Combinator, Error, Result, Usage};
pub use error::{ErrorKind, Errors, Term};
pub use modifiers::CombinatorExt;
pub use dependency::{Derived, Identity, NotDerived, Registry, Source};
pub use driver::{parse, parse_async, suggest, ParseError};
pub use token::Token;
pub use primitives::{
    argument, argument_derived, argument_source, option, option_derived, option_source, Arg, Command, Constant,
    Flag, Opt, Passthrough, PassthroughFormat,
};
pub use value_parser::{FileKind, Mode, Suggestion, ValueParser};

/// `optional(p)` (spec.md §4.4).
#[must_use]
pub fn optional<C: Combinator>(inner: C) -> modifiers::Optional<C> {
    modifiers::Optional::new(inner)
}

/// `withDefault(p, d)` (spec.md §4.4), `d` a value already in hand.
#[must_use]
pub fn with_default<C: Combinator>(inner: C, default: C::Output) -> modifiers::WithDefault<C>
where
    C::Output: Clone + Send + Sync + 'static,
{
    modifiers::WithDefault::value(inner, default)
}

/// `withDefault(p, d)` (spec.md §4.4), `d` a lazily-evaluated fallback.
#[must_use]
pub fn with_default_fn<C, F>(inner: C, default: F) -> modifiers::WithDefault<C>
where
    C: Combinator,
    C::Output: Clone + Send + Sync,
    F: Fn() -> C::Output + Send + Sync + 'static,
{
    modifiers::WithDefault::new(inner, default)
}

/// `withDefault(p, d)` (spec.md §4.4) for a `p` whose `Output` is already
/// `Option<U>` (`option`/`argument_source`, self-optional by construction) —
/// see [`modifiers::OptionDefault`].
#[must_use]
pub fn with_default_some<C, U>(inner: C, default: U) -> modifiers::OptionDefault<C, U>
where
    C: Combinator<Output = Option<U>>,
    U: Clone + Send + Sync + 'static,
{
    modifiers::OptionDefault::value(inner, default)
}

/// `multiple(p)` (spec.md §4.4).
#[must_use]
pub fn multiple<C: Combinator>(inner: C) -> modifiers::Multiple<C> {
    modifiers::Multiple::new(inner)
}

/// `or(a, b)` (spec.md §4.3).
#[must_use]
pub fn or<A, B>(first: A, second: B) -> constructs::Or<A, B>
where
    A: Combinator,
    B: Combinator<Output = A::Output>,
{
    constructs::Or::new(first, second)
}

/// `longestMatch(a, b)` (spec.md §4.3).
#[must_use]
pub fn longest_match<A, B>(first: A, second: B) -> constructs::LongestMatch<A, B>
where
    A: Combinator,
    B: Combinator<Output = A::Output>,
{
    constructs::LongestMatch::new(first, second)
}

/// `concat(a, b)` (spec.md §4.3).
#[must_use]
pub fn concat<A: Combinator, B: Combinator>(first: A, second: B) -> constructs::Concat<A, B> {
    constructs::Concat::new(first, second)
}

/// `group(title, inner)` (spec.md §4.3).
#[must_use]
pub fn group<C: Combinator>(title: impl Into<String>, inner: C) -> constructs::Group<C> {
    constructs::Group::new(title, inner)
}
