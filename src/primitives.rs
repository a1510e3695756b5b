//! The leaf parsers: `option`, `argument`, `flag`, `constant`, `passthrough`,
//! `command` (spec.md §4.4). Each is a [`Combinator`] whose `Output` is a plain
//! value — the engine's dependency wiring ([`ValueSource`]) is an internal detail
//! of `option`/`argument`, not something the other layers see.

use crate::combinator::{ready, Combinator, Result, Usage};
use crate::dependency::{Derived, Identity, NotDerived, ParseOutcome, Registry, Source, ValueEffect};
use crate::error::Error;
use crate::token::{Cursor, Token};
use crate::value_parser::{Mode, ParseEffect, Suggestion, ValueParser};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use std::sync::Arc;

/// Where an `option`/`argument`'s value comes from: a plain parser, a parser
/// wrapped as a dependency source, or one whose rule depends on other sources.
/// Exactly one of these backs any given primitive instance (spec.md §4.2's three
/// constructors `plain`, `wrap-as-source`, `derive` are mutually exclusive ways to
/// build *one* leaf).
pub(crate) enum ValueSource<T: Send + 'static> {
    Plain(Arc<dyn ValueParser<Value = T> + Send + Sync>),
    Source(Arc<Source<Box<dyn ValueParser<Value = T> + Send + Sync>>>),
    Derived(Derived<T>),
}

impl<T: Clone + Send + Sync + 'static> ValueSource<T> {
    pub(crate) fn plain<V>(parser: V) -> Self
    where
        V: ValueParser<Value = T> + Send + Sync + 'static,
    {
        ValueSource::Plain(Arc::new(parser))
    }

    pub(crate) fn source<V>(parser: V) -> Self
    where
        V: ValueParser<Value = T> + crate::dependency::NotDerived + Send + Sync + 'static,
    {
        let boxed: Box<dyn ValueParser<Value = T> + Send + Sync> = Box::new(parser);
        ValueSource::Source(Arc::new(Source::new(boxed)))
    }

    pub(crate) fn derived(derived: Derived<T>) -> Self {
        ValueSource::Derived(derived)
    }

    fn metavar(&self) -> &str {
        match self {
            ValueSource::Plain(p) => p.metavar(),
            ValueSource::Source(s) => s.inner.metavar(),
            ValueSource::Derived(d) => d.metavar(),
        }
    }

    fn mode(&self) -> Mode {
        match self {
            ValueSource::Plain(p) => p.mode(),
            ValueSource::Source(s) => s.inner.mode(),
            ValueSource::Derived(d) => d.mode(),
        }
    }

    fn suggest(&self, prefix: &str, registry: &Registry) -> BoxStream<'static, Suggestion> {
        match self {
            ValueSource::Plain(p) => p.suggest(prefix),
            ValueSource::Source(s) => s.inner.suggest(prefix),
            ValueSource::Derived(d) => d.suggest(registry, prefix),
        }
    }

    fn source_identities(&self) -> Vec<Identity> {
        match self {
            ValueSource::Source(s) => vec![s.id],
            _ => Vec::new(),
        }
    }

    /// Parses one token, writing to `registry` under this source's identity (if
    /// it is one) and returning a still-possibly-deferred outcome.
    fn evaluate<'a>(
        &'a self,
        token: &'a Token,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<ParseOutcome<T>, Error>> {
        match self {
            ValueSource::Plain(p) => match p.parse(token) {
                ParseEffect::Ready(r) => {
                    let boxed = r.map(ParseOutcome::Success);
                    ready(boxed)
                }
                ParseEffect::Pending(fut) => {
                    Box::pin(async move { fut.await.map(ParseOutcome::Success) })
                }
            },
            ValueSource::Source(s) => {
                let id = s.id;
                match s.inner.parse(token) {
                    ParseEffect::Ready(Ok(v)) => {
                        registry.set(id, v.clone());
                        ready(Ok(ParseOutcome::Success(v)))
                    }
                    ParseEffect::Ready(Err(e)) => ready(Err(e)),
                    ParseEffect::Pending(fut) => Box::pin(async move {
                        let v = fut.await?;
                        Ok(ParseOutcome::Success(v))
                    }),
                }
            }
            ValueSource::Derived(d) => {
                let effect = d.evaluate(token)(registry);
                match effect {
                    ValueEffect::Ready(r) => ready(r),
                    ValueEffect::Pending(fut) => fut,
                }
            }
        }
    }
}

/// An optional, named, value-taking option: `--name VALUE` / `-n VALUE`
/// (spec.md §4.4 `option`). `Output = Option<T>`: absent unless the token stream
/// supplies it at least once (last occurrence wins per spec.md's overwrite rule,
/// enforced by [`crate::modifiers::Multiple`] for the repeated case — a bare
/// `Option` here is single-occurrence).
pub struct Opt<T: Send + 'static> {
    names: Vec<String>,
    description: Option<String>,
    source: ValueSource<T>,
}

/// State threaded through an `option`'s single run: the raw token once matched,
/// kept until `complete` so dependency resolution happens exactly once, against
/// the final registry.
pub enum OptState<T> {
    Unmatched,
    Matched(Token, std::marker::PhantomData<T>),
}

impl<T> Default for OptState<T> {
    fn default() -> Self {
        OptState::Unmatched
    }
}

// Written by hand rather than derived: `#[derive(Clone)]` would add a spurious
// `T: Clone` bound even though the only `T` here lives behind `PhantomData`.
impl<T> Clone for OptState<T> {
    fn clone(&self) -> Self {
        match self {
            OptState::Unmatched => OptState::Unmatched,
            OptState::Matched(tok, _) => OptState::Matched(tok.clone(), std::marker::PhantomData),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Opt<T> {
    pub(crate) fn from_source(names: Vec<String>, source: ValueSource<T>) -> Self {
        Opt {
            names,
            description: None,
            source,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn matches_name(&self, token: &Token) -> bool {
        if let Some((name, _)) = token.split_equals() {
            return self.names.iter().any(|n| n == name);
        }
        if self.names.iter().any(|n| n == &token.0) {
            return true;
        }
        self.short_inline_value(token).is_some()
    }

    /// Splits a short-form `-xvalue` token (spec.md §6) into its name and
    /// inline value, if the first two characters name one of this option's
    /// own declared short names. Distinct from the bundled-boolean-flag
    /// clustering `object`/`tuple` do: a valued option's short form never
    /// bundles, it just takes the rest of the token as the value.
    fn short_inline_value<'t>(&self, token: &'t Token) -> Option<&'t str> {
        if !token.is_short_option() || token.0.len() <= 2 {
            return None;
        }
        let (name, value) = token.0.split_at(2);
        self.names.iter().any(|n| n == name).then_some(value)
    }
}

impl<T: Clone + Send + Sync + 'static> Combinator for Opt<T> {
    type Output = Option<T>;
    type State = OptState<T>;

    fn initial_state(&self) -> Self::State {
        OptState::Unmatched
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        Box::pin(async move {
            let Some(tok) = cursor.peek().cloned() else {
                return Ok(None);
            };
            if !self.matches_name(&tok) {
                return Ok(None);
            }
            if matches!(state, OptState::Matched(..)) {
                return Err(Error::duplicate_option(&self.names[0]));
            }
            let raw_value = if let Some((_, value)) = tok.split_equals() {
                cursor.advance(1);
                Token(value.to_string())
            } else if let Some(value) = self.short_inline_value(&tok) {
                let value = value.to_string();
                cursor.advance(1);
                Token(value)
            } else {
                cursor.advance(1);
                match cursor.peek().cloned() {
                    Some(v) if !v.is_long_option() && !v.is_short_option() => {
                        cursor.advance(1);
                        v
                    }
                    _ => return Err(Error::missing_value(&self.names[0])),
                }
            };
            // Validate eagerly so a bad value is reported at match time, but the
            // real (possibly dependency-sensitive) parse happens once in
            // `complete`, against the final registry.
            let _ = self.source.evaluate(&raw_value, registry).await?;
            Ok(Some(OptState::Matched(raw_value, std::marker::PhantomData)))
        })
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(async move {
            match state {
                OptState::Unmatched => Ok(None),
                OptState::Matched(raw, _) => {
                    let mut scratch = registry.clone();
                    let outcome = self.source.evaluate(&raw, &mut scratch).await?;
                    let value = outcome.resolve(registry)?;
                    Ok(Some(value))
                }
            }
        })
    }

    fn suggest<'a>(
        &'a self,
        state: &'a Self::State,
        prefix: &'a str,
        registry: &'a Registry,
    ) -> BoxStream<'a, Suggestion> {
        if matches!(state, OptState::Matched(..)) {
            return Box::pin(futures::stream::empty());
        }
        if prefix.starts_with('-') {
            let names: Vec<_> = self
                .names
                .iter()
                .filter(|n| n.starts_with(prefix))
                .map(|n| Suggestion::Literal {
                    text: n.clone(),
                    description: self.description.clone(),
                })
                .collect();
            Box::pin(futures::stream::iter(names))
        } else {
            self.source.suggest(prefix, registry)
        }
    }

    fn usage(&self) -> Usage {
        Usage::leaf(self.names.clone(), Some(self.source.metavar().to_string()))
            .with_description(self.description.clone().unwrap_or_default())
    }

    fn mode(&self) -> Mode {
        self.source.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.source.source_identities()
    }
}

/// A required, positional, value-taking argument (spec.md §4.4 `argument`).
/// `Output = T`: failing to find a matching token is a `missing-argument`
/// error surfaced at `complete` time, not at the point the cursor ran dry.
pub struct Arg<T: Send + 'static> {
    name: String,
    description: Option<String>,
    source: ValueSource<T>,
}

impl<T: Clone + Send + Sync + 'static> Arg<T> {
    pub(crate) fn from_source(name: impl Into<String>, source: ValueSource<T>) -> Self {
        Arg {
            name: name.into(),
            description: None,
            source,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl<T: Clone + Send + Sync + 'static> Combinator for Arg<T> {
    type Output = T;
    type State = Option<Token>;

    fn initial_state(&self) -> Self::State {
        None
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        Box::pin(async move {
            if state.is_some() {
                return Ok(None);
            }
            let Some(tok) = cursor.peek().cloned() else {
                return Ok(None);
            };
            if tok.is_long_option() || tok.is_short_option() {
                return Ok(None);
            }
            cursor.advance(1);
            let _ = self.source.evaluate(&tok, registry).await?;
            Ok(Some(Some(tok)))
        })
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(async move {
            match state {
                None => Err(Error::missing_argument(&self.name)),
                Some(raw) => {
                    let mut scratch = registry.clone();
                    let outcome = self.source.evaluate(&raw, &mut scratch).await?;
                    outcome.resolve(registry)
                }
            }
        })
    }

    fn suggest<'a>(
        &'a self,
        state: &'a Self::State,
        prefix: &'a str,
        registry: &'a Registry,
    ) -> BoxStream<'a, Suggestion> {
        if state.is_some() {
            Box::pin(futures::stream::empty())
        } else {
            self.source.suggest(prefix, registry)
        }
    }

    fn usage(&self) -> Usage {
        Usage::leaf(vec![self.name.clone()], Some(self.source.metavar().to_string()))
            .with_description(self.description.clone().unwrap_or_default())
            .required(true)
    }

    fn mode(&self) -> Mode {
        self.source.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.source.source_identities()
    }
}

/// A boolean switch: present or absent, no value (spec.md §4.4 `flag`).
pub struct Flag {
    names: Vec<String>,
    description: Option<String>,
}

impl Flag {
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        Flag {
            names,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Combinator for Flag {
    type Output = bool;
    type State = bool;

    fn initial_state(&self) -> Self::State {
        false
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        _registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        Box::pin(async move {
            let Some(tok) = cursor.peek() else {
                return Ok(None);
            };
            if !self.names.iter().any(|n| n == &tok.0) {
                return Ok(None);
            }
            if *state {
                return Err(Error::duplicate_option(&self.names[0]));
            }
            cursor.advance(1);
            Ok(Some(true))
        })
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        _registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        ready(Ok(state))
    }

    fn suggest<'a>(
        &'a self,
        state: &'a Self::State,
        prefix: &'a str,
        _registry: &'a Registry,
    ) -> BoxStream<'a, Suggestion> {
        if *state {
            return Box::pin(futures::stream::empty());
        }
        let names: Vec<_> = self
            .names
            .iter()
            .filter(|n| n.starts_with(prefix))
            .map(|n| Suggestion::Literal {
                text: n.clone(),
                description: self.description.clone(),
            })
            .collect();
        Box::pin(futures::stream::iter(names))
    }

    fn usage(&self) -> Usage {
        Usage::leaf(self.names.clone(), None).with_description(self.description.clone().unwrap_or_default())
    }

    fn mode(&self) -> Mode {
        Mode::Sync
    }
}

/// A parser that never consumes a token and always produces the same fixed
/// value (spec.md §4.4 `constant`). Useful as a `longestMatch`/`or` fallback arm
/// and for filling a field in a larger object without a corresponding flag.
pub struct Constant<T: Clone + Send + Sync + 'static>(T);

impl<T: Clone + Send + Sync + 'static> Constant<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Constant(value)
    }
}

impl<T: Clone + Send + Sync + 'static> Combinator for Constant<T> {
    type Output = T;
    type State = ();

    fn initial_state(&self) -> Self::State {}

    fn try_consume<'a>(
        &'a self,
        _state: &'a Self::State,
        _cursor: &'a mut Cursor,
        _registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        ready(Ok(None))
    }

    fn complete<'a>(
        &'a self,
        _state: Self::State,
        _registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        ready(Ok(self.0.clone()))
    }

    fn usage(&self) -> Usage {
        Usage::default()
    }

    fn mode(&self) -> Mode {
        Mode::Sync
    }
}

/// Which trailing tokens a [`Passthrough`] collects (spec.md §4.4 `passthrough`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughFormat {
    /// Everything after a `--` terminator, verbatim. Requires the terminator;
    /// the tail lives on the [`Cursor`] itself, so the driver reads it with
    /// [`Passthrough::take`] after the main pass rather than through
    /// `try_consume`.
    Greedy,
    /// Any `--name=value` token no sibling recognized, interleaved with
    /// recognized options, no `--` required. Relies on `object`/`tuple`'s
    /// longest-match tie-break: a recognized sibling option consumes the same
    /// one token and, declared earlier, wins the tie, so this only ever claims
    /// tokens nothing else wanted.
    EqualsOnly,
}

/// Captures trailing or unrecognized tokens verbatim (spec.md §4.4
/// `passthrough`). `Output = Vec<String>`, empty (not missing) if nothing
/// matched.
pub struct Passthrough {
    format: PassthroughFormat,
}

impl Passthrough {
    #[must_use]
    pub fn new(format: PassthroughFormat) -> Self {
        Passthrough { format }
    }

    #[must_use]
    pub fn greedy() -> Self {
        Passthrough::new(PassthroughFormat::Greedy)
    }

    #[must_use]
    pub fn equals_only() -> Self {
        Passthrough::new(PassthroughFormat::EqualsOnly)
    }

    /// Resolves the greedy form against the cursor's tail directly; called by
    /// the driver after the main pass, since the tail lives on the [`Cursor`]
    /// rather than being discoverable through the ordinary `try_consume` token
    /// stream.
    #[must_use]
    pub fn take(cursor: &Cursor) -> Vec<String> {
        cursor
            .tail()
            .map(|tail| tail.iter().map(|t| t.0.clone()).collect())
            .unwrap_or_default()
    }
}

impl Combinator for Passthrough {
    type Output = Vec<String>;
    type State = Vec<String>;

    fn initial_state(&self) -> Self::State {
        Vec::new()
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        _registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        Box::pin(async move {
            if self.format != PassthroughFormat::EqualsOnly {
                return Ok(None);
            }
            let Some(tok) = cursor.peek().cloned() else {
                return Ok(None);
            };
            if !tok.is_long_option() || tok.split_equals().is_none() {
                return Ok(None);
            }
            cursor.advance(1);
            let mut next = state.clone();
            next.push(tok.0);
            Ok(Some(next))
        })
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        _registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        ready(Ok(state))
    }

    fn usage(&self) -> Usage {
        Usage::default()
    }

    fn mode(&self) -> Mode {
        Mode::Sync
    }
}

/// Dispatches to a subcommand's own parser by name (spec.md §4.4 `command`).
pub struct Command<C: Combinator> {
    name: String,
    description: Option<String>,
    inner: C,
}

impl<C: Combinator> Command<C> {
    pub fn new(name: impl Into<String>, inner: C) -> Self {
        Command {
            name: name.into(),
            description: None,
            inner,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

pub enum CommandState<C: Combinator> {
    Unselected,
    Selected(C::State),
}

impl<C: Combinator> Clone for CommandState<C> {
    fn clone(&self) -> Self {
        match self {
            CommandState::Unselected => CommandState::Unselected,
            CommandState::Selected(s) => CommandState::Selected(s.clone()),
        }
    }
}

impl<C: Combinator> Combinator for Command<C> {
    type Output = C::Output;
    type State = CommandState<C>;

    fn initial_state(&self) -> Self::State {
        CommandState::Unselected
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        Box::pin(async move {
            match state {
                CommandState::Unselected => {
                    let Some(tok) = cursor.peek().cloned() else {
                        return Ok(None);
                    };
                    if tok.0 != self.name {
                        return Ok(None);
                    }
                    cursor.advance(1);
                    let inner_state = self.inner.initial_state();
                    match self
                        .inner
                        .try_consume(&inner_state, cursor, registry)
                        .await?
                    {
                        Some(next) => Ok(Some(CommandState::Selected(next))),
                        None => Ok(Some(CommandState::Selected(inner_state))),
                    }
                }
                CommandState::Selected(inner_state) => self
                    .inner
                    .try_consume(inner_state, cursor, registry)
                    .await
                    .map(|opt| opt.map(CommandState::Selected)),
            }
        })
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(async move {
            match state {
                CommandState::Unselected => {
                    Err(Error::unknown_command(&Token(self.name.clone())))
                }
                CommandState::Selected(inner_state) => {
                    self.inner.complete(inner_state, registry).await
                }
            }
        })
    }

    fn seed_defaults<'a>(
        &'a self,
        state: &'a Self::State,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match state {
                CommandState::Unselected => Ok(()),
                CommandState::Selected(inner_state) => {
                    self.inner.seed_defaults(inner_state, registry).await
                }
            }
        })
    }

    fn suggest<'a>(
        &'a self,
        state: &'a Self::State,
        prefix: &'a str,
        registry: &'a Registry,
    ) -> BoxStream<'a, Suggestion> {
        match state {
            CommandState::Unselected => {
                if self.name.starts_with(prefix) {
                    Box::pin(futures::stream::once(async {
                        Suggestion::Literal {
                            text: self.name.clone(),
                            description: self.description.clone(),
                        }
                    }))
                } else {
                    Box::pin(futures::stream::empty())
                }
            }
            CommandState::Selected(inner_state) => self.inner.suggest(inner_state, prefix, registry),
        }
    }

    fn usage(&self) -> Usage {
        let mut usage = Usage::leaf(vec![self.name.clone()], None)
            .with_description(self.description.clone().unwrap_or_default());
        usage.children.push(self.inner.usage());
        usage
    }

    fn mode(&self) -> Mode {
        self.inner.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.inner.source_identities()
    }
}

/// Builds a valued `option` (spec.md §4.3 `option`) over a plain value parser —
/// no dependency wiring.
#[must_use]
pub fn option<T, V>(names: Vec<String>, parser: V) -> Opt<T>
where
    T: Clone + Send + Sync + 'static,
    V: ValueParser<Value = T> + Send + Sync + 'static,
{
    Opt::from_source(names, ValueSource::plain(parser))
}

/// Builds an `option` whose value parser is also a dependency source (spec.md
/// §4.2 `wrap-as-source`): on successful parse its value is written into the
/// registry under a fresh identity.
#[must_use]
pub fn option_source<T, V>(names: Vec<String>, parser: V) -> Opt<T>
where
    T: Clone + Send + Sync + 'static,
    V: ValueParser<Value = T> + NotDerived + Send + Sync + 'static,
{
    Opt::from_source(names, ValueSource::source(parser))
}

/// Builds an `option` whose value parser is itself [`Derived`] (spec.md §4.2
/// `derive`) — its parse rule depends on one or more sibling sources.
#[must_use]
pub fn option_derived<T>(names: Vec<String>, derived: Derived<T>) -> Opt<T>
where
    T: Clone + Send + Sync + 'static,
{
    Opt::from_source(names, ValueSource::derived(derived))
}

/// Builds a required positional `argument` (spec.md §4.3 `argument`) over a
/// plain value parser.
#[must_use]
pub fn argument<T, V>(name: impl Into<String>, parser: V) -> Arg<T>
where
    T: Clone + Send + Sync + 'static,
    V: ValueParser<Value = T> + Send + Sync + 'static,
{
    Arg::from_source(name, ValueSource::plain(parser))
}

/// Builds an `argument` whose value parser is also a dependency source.
#[must_use]
pub fn argument_source<T, V>(name: impl Into<String>, parser: V) -> Arg<T>
where
    T: Clone + Send + Sync + 'static,
    V: ValueParser<Value = T> + NotDerived + Send + Sync + 'static,
{
    Arg::from_source(name, ValueSource::source(parser))
}

/// Builds an `argument` whose value parser is [`Derived`].
#[must_use]
pub fn argument_derived<T>(name: impl Into<String>, derived: Derived<T>) -> Arg<T>
where
    T: Clone + Send + Sync + 'static,
{
    Arg::from_source(name, ValueSource::derived(derived))
}
