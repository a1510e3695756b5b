//! `optional`, `withDefault`, `multiple`, `map` (spec.md §4.4): wrappers that
//! adapt a parser's shape without changing the token protocol. Each forwards
//! `try_consume` to its inner parser untouched — only `complete` (and, for
//! `withDefault`, `seed_defaults`) differs — so deferred states and dependency
//! identities always flow through unmodified, per the composition invariants.

use crate::combinator::{Combinator, Result, Usage};
use crate::dependency::{Identity, Registry};
use crate::error::ErrorKind;
use crate::token::Cursor;
use crate::value_parser::{Mode, Suggestion};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use std::sync::Arc;

/// True for the completion errors that mean "this parser simply never matched
/// anything", as opposed to a genuine value-level failure. `optional` and
/// `withDefault` only swallow this one, never `invalid-value`/`missing-value`.
fn is_unsatisfied(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::MissingArgument)
}

/// `optional(p)` (spec.md §4.4): `undefined` (`None`) if `p` never matched;
/// `p`'s value otherwise. A value-level error from a token `p` did accept still
/// propagates — only "never satisfied" is swallowed.
pub struct Optional<C: Combinator> {
    inner: C,
}

impl<C: Combinator> Optional<C> {
    pub fn new(inner: C) -> Self {
        Optional { inner }
    }
}

impl<C: Combinator> Combinator for Optional<C> {
    type Output = Option<C::Output>;
    type State = C::State;

    fn initial_state(&self) -> Self::State {
        self.inner.initial_state()
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        self.inner.try_consume(state, cursor, registry)
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(async move {
            match self.inner.complete(state, registry).await {
                Ok(v) => Ok(Some(v)),
                Err(e) if is_unsatisfied(e.kind) => Ok(None),
                Err(e) => Err(e),
            }
        })
    }

    fn seed_defaults<'a>(
        &'a self,
        state: &'a Self::State,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<()>> {
        self.inner.seed_defaults(state, registry)
    }

    fn suggest<'a>(&'a self, state: &'a Self::State, prefix: &'a str, registry: &'a Registry) -> BoxStream<'a, Suggestion> {
        self.inner.suggest(state, prefix, registry)
    }

    fn usage(&self) -> Usage {
        self.inner.usage().required(false)
    }

    fn mode(&self) -> Mode {
        self.inner.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.inner.source_identities()
    }
}

/// `withDefault(p, d)` (spec.md §4.4): `d`/`d()` if `p` never matched, `p`'s
/// value otherwise. If `p` is (or wraps) a dependency source, the default is
/// also written into the registry during `seed_defaults` so a sibling derived
/// parser observes it instead of its own built-in default (scenario 6).
pub struct WithDefault<C: Combinator>
where
    C::Output: Clone + Send + Sync,
{
    inner: C,
    default: Arc<dyn Fn() -> C::Output + Send + Sync>,
}

impl<C: Combinator> WithDefault<C>
where
    C::Output: Clone + Send + Sync,
{
    pub fn new<F>(inner: C, default: F) -> Self
    where
        F: Fn() -> C::Output + Send + Sync + 'static,
    {
        WithDefault {
            inner,
            default: Arc::new(default),
        }
    }

    #[must_use]
    pub fn value(inner: C, default: C::Output) -> Self
    where
        C::Output: 'static,
    {
        WithDefault::new(inner, move || default.clone())
    }
}

impl<C: Combinator> Combinator for WithDefault<C>
where
    C::Output: Clone + Send + Sync,
{
    type Output = C::Output;
    type State = C::State;

    fn initial_state(&self) -> Self::State {
        self.inner.initial_state()
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        self.inner.try_consume(state, cursor, registry)
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(async move {
            match self.inner.complete(state, registry).await {
                Ok(v) => Ok(v),
                Err(e) if is_unsatisfied(e.kind) => Ok((self.default)()),
                Err(e) => Err(e),
            }
        })
    }

    fn seed_defaults<'a>(
        &'a self,
        state: &'a Self::State,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.inner.seed_defaults(state, registry).await?;
            let ids = self.inner.source_identities();
            if ids.is_empty() {
                return Ok(());
            }
            let scratch = registry.clone();
            if let Err(e) = self.inner.complete(state.clone(), &scratch).await {
                if is_unsatisfied(e.kind) {
                    let value = (self.default)();
                    for id in ids {
                        registry.set(id, value.clone());
                    }
                }
            }
            Ok(())
        })
    }

    fn suggest<'a>(&'a self, state: &'a Self::State, prefix: &'a str, registry: &'a Registry) -> BoxStream<'a, Suggestion> {
        self.inner.suggest(state, prefix, registry)
    }

    fn usage(&self) -> Usage {
        let mut usage = self.inner.usage();
        usage.required = false;
        usage.default_display = Some("default".to_string());
        usage
    }

    fn mode(&self) -> Mode {
        self.inner.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.inner.source_identities()
    }
}

/// `multiple(p)` (spec.md §4.4): `p` may match any number of times; completion
/// returns the ordered sequence of its results. Each repetition is only
/// `complete`d once, at the very end against the final registry — finalizing
/// per-repetition mid-pass would force dependency resolution before the
/// registry is actually complete (the same source-after-derived hazard the
/// engine exists to get right).
pub struct Multiple<C: Combinator> {
    inner: C,
}

impl<C: Combinator> Multiple<C> {
    pub fn new(inner: C) -> Self {
        Multiple { inner }
    }
}

pub struct MultipleState<C: Combinator> {
    /// One inner state per repetition seen so far, plus the not-yet-matched
    /// slot currently being offered to the cursor.
    committed: Vec<C::State>,
    pending: C::State,
}

impl<C: Combinator> Clone for MultipleState<C> {
    fn clone(&self) -> Self {
        MultipleState {
            committed: self.committed.clone(),
            pending: self.pending.clone(),
        }
    }
}

impl<C: Combinator> Combinator for Multiple<C> {
    type Output = Vec<C::Output>;
    type State = MultipleState<C>;

    fn initial_state(&self) -> Self::State {
        MultipleState {
            committed: Vec::new(),
            pending: self.inner.initial_state(),
        }
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        Box::pin(async move {
            match self.inner.try_consume(&state.pending, cursor, registry).await? {
                None => Ok(None),
                Some(next) => {
                    let mut committed = state.committed.clone();
                    committed.push(next);
                    Ok(Some(MultipleState {
                        committed,
                        pending: self.inner.initial_state(),
                    }))
                }
            }
        })
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(async move {
            let mut out = Vec::with_capacity(state.committed.len());
            for s in state.committed {
                out.push(self.inner.complete(s, registry).await?);
            }
            Ok(out)
        })
    }

    fn seed_defaults<'a>(
        &'a self,
        state: &'a Self::State,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            for s in &state.committed {
                self.inner.seed_defaults(s, registry).await?;
            }
            Ok(())
        })
    }

    fn suggest<'a>(&'a self, state: &'a Self::State, prefix: &'a str, registry: &'a Registry) -> BoxStream<'a, Suggestion> {
        self.inner.suggest(&state.pending, prefix, registry)
    }

    fn usage(&self) -> Usage {
        self.inner.usage()
    }

    fn mode(&self) -> Mode {
        self.inner.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.inner.source_identities()
    }
}

/// `withDefault(p, d)` (spec.md §4.4) specialized for a `p` whose own `Output`
/// is already `Option<U>` — `option`/`argument_source` wrapped directly, which
/// are self-optional by construction (`complete` returns `Ok(None)`, never a
/// `missing-argument` error), so the error-based [`WithDefault`] never
/// swallows their absence. This variant reads the `None`/`Some` directly,
/// seeding the registry with `d` under the same pre-`complete` protocol so a
/// derived sibling sees `d` rather than its own built-in default (scenario 6
/// of spec.md §8).
pub struct OptionDefault<C, U>
where
    C: Combinator<Output = Option<U>>,
    U: Clone + Send + Sync + 'static,
{
    inner: C,
    default: Arc<dyn Fn() -> U + Send + Sync>,
}

impl<C, U> OptionDefault<C, U>
where
    C: Combinator<Output = Option<U>>,
    U: Clone + Send + Sync + 'static,
{
    pub fn new<F>(inner: C, default: F) -> Self
    where
        F: Fn() -> U + Send + Sync + 'static,
    {
        OptionDefault {
            inner,
            default: Arc::new(default),
        }
    }

    #[must_use]
    pub fn value(inner: C, default: U) -> Self {
        OptionDefault::new(inner, move || default.clone())
    }
}

impl<C, U> Combinator for OptionDefault<C, U>
where
    C: Combinator<Output = Option<U>>,
    U: Clone + Send + Sync + 'static,
{
    type Output = U;
    type State = C::State;

    fn initial_state(&self) -> Self::State {
        self.inner.initial_state()
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        self.inner.try_consume(state, cursor, registry)
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(async move {
            match self.inner.complete(state, registry).await? {
                Some(v) => Ok(v),
                None => Ok((self.default)()),
            }
        })
    }

    fn seed_defaults<'a>(
        &'a self,
        state: &'a Self::State,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.inner.seed_defaults(state, registry).await?;
            let ids = self.inner.source_identities();
            if ids.is_empty() {
                return Ok(());
            }
            let scratch = registry.clone();
            if let Ok(None) = self.inner.complete(state.clone(), &scratch).await {
                let value = (self.default)();
                for id in ids {
                    registry.set(id, value.clone());
                }
            }
            Ok(())
        })
    }

    fn suggest<'a>(&'a self, state: &'a Self::State, prefix: &'a str, registry: &'a Registry) -> BoxStream<'a, Suggestion> {
        self.inner.suggest(state, prefix, registry)
    }

    fn usage(&self) -> Usage {
        let mut usage = self.inner.usage();
        usage.required = false;
        usage.default_display = Some("default".to_string());
        usage
    }

    fn mode(&self) -> Mode {
        self.inner.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.inner.source_identities()
    }
}

/// Method-chaining sugar over the free `optional`/`with_default`/`multiple`/`map`
/// constructors, blanket-implemented for every [`Combinator`] so a parser built
/// up from primitives can be adapted fluently: `argument(...).optional()`,
/// `option(...).map(|s| s.len())`.
pub trait CombinatorExt: Combinator + Sized {
    fn optional(self) -> Optional<Self> {
        Optional::new(self)
    }

    fn with_default(self, default: Self::Output) -> WithDefault<Self>
    where
        Self::Output: Clone + Send + Sync + 'static,
    {
        WithDefault::value(self, default)
    }

    fn with_default_fn<F>(self, default: F) -> WithDefault<Self>
    where
        Self::Output: Clone + Send + Sync,
        F: Fn() -> Self::Output + Send + Sync + 'static,
    {
        WithDefault::new(self, default)
    }

    /// `withDefault` for a parser whose `Output` is already `Option<U>` — see
    /// [`OptionDefault`].
    fn with_default_some<U>(self, default: U) -> OptionDefault<Self, U>
    where
        Self: Combinator<Output = Option<U>>,
        U: Clone + Send + Sync + 'static,
    {
        OptionDefault::value(self, default)
    }

    fn multiple(self) -> Multiple<Self> {
        Multiple::new(self)
    }

    fn map<F, U>(self, f: F) -> Map<Self, F, U>
    where
        F: Fn(Self::Output) -> U + Send + Sync + 'static,
        U: Send + 'static,
    {
        Map::new(self, f)
    }
}

impl<C: Combinator> CombinatorExt for C {}

/// `map(p, f)` (spec.md §4.4): applies a pure transformation to `p`'s completed
/// value. `f` never touches the registry, so a derived parser downstream still
/// sees `p`'s pre-`map` value (the value written into the registry happens
/// inside `p`'s own `try_consume`, well before `map::complete` ever runs).
pub struct Map<C: Combinator, F, U> {
    inner: C,
    f: Arc<F>,
    _marker: std::marker::PhantomData<fn(C::Output) -> U>,
}

impl<C: Combinator, F, U> Map<C, F, U>
where
    F: Fn(C::Output) -> U + Send + Sync + 'static,
    U: Send + 'static,
{
    pub fn new(inner: C, f: F) -> Self {
        Map {
            inner,
            f: Arc::new(f),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<C: Combinator, F, U> Combinator for Map<C, F, U>
where
    F: Send + Sync + 'static + Fn(C::Output) -> U,
    U: Send + 'static,
{
    type Output = U;
    type State = C::State;

    fn initial_state(&self) -> Self::State {
        self.inner.initial_state()
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        self.inner.try_consume(state, cursor, registry)
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(async move { Ok((self.f)(self.inner.complete(state, registry).await?)) })
    }

    fn seed_defaults<'a>(
        &'a self,
        state: &'a Self::State,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<()>> {
        self.inner.seed_defaults(state, registry)
    }

    fn suggest<'a>(&'a self, state: &'a Self::State, prefix: &'a str, registry: &'a Registry) -> BoxStream<'a, Suggestion> {
        self.inner.suggest(state, prefix, registry)
    }

    fn usage(&self) -> Usage {
        self.inner.usage()
    }

    fn mode(&self) -> Mode {
        self.inner.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.inner.source_identities()
    }
}
