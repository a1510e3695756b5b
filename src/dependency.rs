//! C2: the dependency graph. Identity issuance, dependency sources, derived value
//! parsers, deferred parse states and post-pass resolution (spec.md §4.2).

use crate::error::Error;
use crate::token::Token;
use crate::value_parser::{Mode, ParseEffect, Suggestion, ValueParser};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use std::any::Any;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[cfg(feature = "fast_hash")]
type Map<K, V> = fxhash::FxHashMap<K, V>;
#[cfg(not(feature = "fast_hash"))]
type Map<K, V> = std::collections::HashMap<K, V>;

/// A process-wide-unique identity for a dependency source (spec.md §3 invariant:
/// "every dependency source has an identity unique within the process").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(u64);

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

impl Identity {
    /// Mints a fresh, never-reused identity.
    #[must_use]
    pub fn fresh() -> Self {
        Identity(NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed))
    }
}

/// The per-pass map from dependency-source identity to resolved value. Cloning a
/// `Registry` clones the map structure (cheap: `Arc`-shared payloads) so
/// `longestMatch` can give every branch an isolated view and install only the
/// winner's clone as the parent's (spec.md §5).
#[derive(Clone, Default)]
pub struct Registry {
    values: Map<Identity, Arc<dyn Any + Send + Sync>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Registry {
            values: Map::default(),
        }
    }

    #[must_use]
    pub fn contains(&self, id: Identity) -> bool {
        self.values.contains_key(&id)
    }

    /// Reads back a previously inserted value of type `T`. `None` if the identity
    /// is unbound or was bound with a different type (a programmer error the
    /// type-safe constructors in this module make unreachable in practice).
    #[must_use]
    pub fn get<T: Clone + Send + Sync + 'static>(&self, id: Identity) -> Option<T> {
        self.values.get(&id).and_then(|v| v.downcast_ref::<T>()).cloned()
    }

    /// Unconditionally (re)binds `id`. Used both for a fresh write and for
    /// `multiple`'s "only the last successful value is written" overwrite
    /// (spec.md §4.4) — sibling-level duplicate detection happens structurally in
    /// `object`/`tuple`, not here, since a legitimate `multiple` self-overwrite and
    /// an illegitimate cross-sibling duplicate look identical at this layer.
    pub fn set<T: Send + Sync + 'static>(&mut self, id: Identity, value: T) {
        self.values.insert(id, Arc::new(value));
    }

    /// Merges `other` into `self`, with `other`'s bindings taking precedence. Used
    /// to install a `longestMatch` winner's registry back into the parent.
    pub fn merge(&mut self, other: Registry) {
        self.values.extend(other.values);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Marker for value parsers that are not themselves a [`Derived`] parser. Bounds
/// [`Source::new`] so that, per spec.md §3, "a derived parser is not itself a
/// dependency source" is enforced structurally at compile time for the typed
/// construction path, rather than by a runtime duck-type check.
pub trait NotDerived {}

/// A value parser wrapped with a fresh, globally-unique identity. Parsing behaves
/// identically to the underlying parser; on success the *driver* (the owning
/// `option`/`argument` primitive, not this type) records the value into the
/// registry under `id` (spec.md §4.2 `wrap-as-source`).
pub struct Source<V> {
    pub id: Identity,
    pub inner: V,
}

impl<V: ValueParser + NotDerived> Source<V> {
    #[must_use]
    pub fn new(inner: V) -> Self {
        Source {
            id: Identity::fresh(),
            inner,
        }
    }
}

impl<V: ValueParser> ValueParser for Source<V> {
    type Value = V::Value;

    fn parse(&self, token: &Token) -> ParseEffect<Self::Value> {
        self.inner.parse(token)
    }

    fn format(&self, value: &Self::Value) -> String {
        self.inner.format(value)
    }

    fn suggest(&self, prefix: &str) -> futures::stream::BoxStream<'static, crate::value_parser::Suggestion> {
        self.inner.suggest(prefix)
    }

    fn metavar(&self) -> &str {
        self.inner.metavar()
    }

    fn mode(&self) -> Mode {
        self.inner.mode()
    }
}

impl<V> NotDerived for Source<V> {}

/// A boxed value parser is never itself a [`Derived`] parser (`Derived` does not
/// implement [`ValueParser`] in the first place), so boxing never needs to revoke
/// the marker.
impl<T: ?Sized> NotDerived for Box<T> {}

/// A parse outcome that may still be awaiting dependency resolution.
pub enum ParseOutcome<T> {
    Success(T),
    Deferred(DeferredState<T>),
}

impl<T: Clone> Clone for ParseOutcome<T> {
    fn clone(&self) -> Self {
        match self {
            ParseOutcome::Success(v) => ParseOutcome::Success(v.clone()),
            ParseOutcome::Deferred(d) => ParseOutcome::Deferred(d.clone()),
        }
    }
}

impl<T> ParseOutcome<T> {
    /// Resolves the outcome against the (now final) registry. Plain successes pass
    /// through; deferred ones run `resolve-deferred`.
    pub fn resolve(self, registry: &Registry) -> Result<T, Error>
    where
        T: Clone,
    {
        match self {
            ParseOutcome::Success(v) => Ok(v),
            ParseOutcome::Deferred(d) => d.resolve(registry),
        }
    }
}

/// The effect of evaluating a [`Derived`] parser against a token: ready now, or
/// pending an async factory/value-parser.
pub enum ValueEffect<T> {
    Ready(Result<ParseOutcome<T>, Error>),
    Pending(BoxFuture<'static, Result<ParseOutcome<T>, Error>>),
}

/// An object produced when a derived parser is asked to parse before its sources
/// are known: the raw token, the source identities it is waiting on, and the
/// result obtained against the factory's default values (spec.md §3). That
/// result may itself be a rejection — e.g. a value only valid once the real
/// source is known, not under the default — so it stays a `Result` rather
/// than a bare `T`: a preliminary failure must not abort the parse before
/// `resolve` gets a chance to retry against the real sources (this is the
/// "source declared after its derived sibling" case).
pub struct DeferredState<T> {
    pub raw: Token,
    pub sources: Vec<Identity>,
    pub preliminary: Result<T, Error>,
    resolver: Arc<dyn Fn(&Registry, &Token) -> Result<T, Error> + Send + Sync>,
}

impl<T: Clone> Clone for DeferredState<T> {
    fn clone(&self) -> Self {
        DeferredState {
            raw: self.raw.clone(),
            sources: self.sources.clone(),
            preliminary: self.preliminary.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<T: Clone> DeferredState<T> {
    /// `resolve-deferred`: if all required sources are present, re-invoke the
    /// factory with the actual values and re-parse the raw token; otherwise keep
    /// the preliminary result (spec.md §4.2).
    pub fn resolve(self, registry: &Registry) -> Result<T, Error> {
        thread_local! {
            static RESOLVING: RefCell<Vec<Identity>> = const { RefCell::new(Vec::new()) };
        }

        let have_all = self.sources.iter().all(|id| registry.contains(*id));
        if !have_all {
            return self.preliminary;
        }

        let cycle = RESOLVING.with(|r| {
            let stack = r.borrow();
            self.sources.iter().any(|id| stack.contains(id))
        });
        if cycle {
            return Err(Error::circular_dependency());
        }

        RESOLVING.with(|r| r.borrow_mut().extend(self.sources.iter().copied()));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            (self.resolver)(registry, &self.raw)
        }));
        RESOLVING.with(|r| {
            let mut stack = r.borrow_mut();
            for id in &self.sources {
                if let Some(pos) = stack.iter().rposition(|x| x == id) {
                    stack.remove(pos);
                }
            }
        });

        match result {
            Ok(r) => r,
            Err(panic) => Err(Error::factory_error(panic_message(&panic))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "derived parser factory panicked".to_string()
    }
}

type BoxedValueParser<T> = Box<dyn ValueParser<Value = T> + Send + Sync>;
type Factory<T> = dyn Fn(&Registry) -> Result<BoxedValueParser<T>, Error> + Send + Sync;
type Defaults = dyn Fn() -> Registry + Send + Sync;

/// A value parser whose actual parsing rule depends on the resolved values of one
/// or more dependency sources (spec.md §3/§4.2). Does not implement [`NotDerived`]:
/// it cannot be wrapped in [`Source::new`], enforcing "a derived parser is not
/// itself a dependency source" at compile time.
pub struct Derived<T: Send + 'static> {
    pub sources: Vec<Identity>,
    factory: Arc<Factory<T>>,
    defaults: Arc<Defaults>,
    metavar: String,
    mode: Mode,
}

impl<T: Clone + Send + Sync + 'static> Derived<T> {
    /// Builds a derived parser. `mode` fixes sync/async (use [`derive_mode`] to
    /// infer it from `sources`/the factory's typical product instead of pinning
    /// it explicitly).
    pub fn new<F, D, V>(sources: Vec<Identity>, metavar: impl Into<String>, mode: Mode, factory: F, defaults: D) -> Self
    where
        F: Fn(&Registry) -> Result<V, Error> + Send + Sync + 'static,
        D: Fn() -> Registry + Send + Sync + 'static,
        V: ValueParser<Value = T> + Send + Sync + 'static,
    {
        Derived {
            sources,
            factory: Arc::new(move |registry: &Registry| {
                factory(registry).map(|v| Box::new(v) as BoxedValueParser<T>)
            }),
            defaults: Arc::new(defaults),
            metavar: metavar.into(),
            mode,
        }
    }

    fn make_resolver(&self) -> Arc<dyn Fn(&Registry, &Token) -> Result<T, Error> + Send + Sync> {
        let factory = Arc::clone(&self.factory);
        Arc::new(move |registry: &Registry, token: &Token| {
            let parser = factory(registry)?;
            match parser.parse(token) {
                ParseEffect::Ready(r) => r,
                ParseEffect::Pending(_) => Err(Error::factory_error(
                    "derived parser's factory produced an async parser during sync resolution",
                )),
            }
        })
    }

    /// `derive`'s `parse(token)` behavior (spec.md §4.2 operation `derive`). When
    /// `sources` aren't all resolved yet, a rejection here is only provisional —
    /// the real source may make the same token valid once it arrives (spec.md §8
    /// scenario 2) — so the parse result, success or failure, is carried into a
    /// [`DeferredState`] rather than surfaced immediately. Once every source is
    /// known, the same rejection is final.
    pub fn evaluate(&self, token: &Token) -> impl FnOnce(&Registry) -> ValueEffect<T> + '_ {
        move |registry: &Registry| {
            let have_all = self.sources.iter().all(|id| registry.contains(*id));
            let active_registry = if have_all {
                registry.clone()
            } else {
                (self.defaults)()
            };

            let parser = match (self.factory)(&active_registry) {
                Ok(p) => p,
                Err(e) => return ValueEffect::Ready(Err(e)),
            };

            match parser.parse(token) {
                ParseEffect::Ready(result) => {
                    if have_all {
                        ValueEffect::Ready(result.map(ParseOutcome::Success))
                    } else {
                        let resolver = self.make_resolver();
                        ValueEffect::Ready(Ok(ParseOutcome::Deferred(DeferredState {
                            raw: token.clone(),
                            sources: self.sources.clone(),
                            preliminary: result,
                            resolver,
                        })))
                    }
                }
                ParseEffect::Pending(fut) => {
                    let resolver = (!have_all).then(|| self.make_resolver());
                    let raw = token.clone();
                    let sources = self.sources.clone();
                    ValueEffect::Pending(Box::pin(async move {
                        let result = fut.await;
                        if have_all {
                            result.map(ParseOutcome::Success)
                        } else {
                            #[allow(clippy::unwrap_used)]
                            Ok(ParseOutcome::Deferred(DeferredState {
                                raw,
                                sources,
                                preliminary: result,
                                resolver: resolver.unwrap(),
                            }))
                        }
                    }))
                }
            }
        }
    }

    #[must_use]
    pub fn metavar(&self) -> &str {
        &self.metavar
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Suggestions for this derived parser's accepted values (spec.md §6):
    /// built against the real sources once every one of them is resolved in
    /// `registry`, falling back to the factory's own defaults while any are
    /// still outstanding — the same `have_all` split `evaluate` uses.
    #[must_use]
    pub fn suggest(&self, registry: &Registry, prefix: &str) -> BoxStream<'static, Suggestion> {
        let have_all = self.sources.iter().all(|id| registry.contains(*id));
        let active_registry = if have_all { registry.clone() } else { (self.defaults)() };
        match (self.factory)(&active_registry) {
            Ok(parser) => parser.suggest(prefix),
            Err(_) => Box::pin(futures::stream::empty()),
        }
    }
}

/// Infers a derived parser's mode as the union of its sources' modes and the
/// factory's typical product mode (spec.md §4.2 "Mode inference").
#[must_use]
pub fn derive_mode(sources_async: bool, factory_product_async: bool) -> Mode {
    if sources_async || factory_product_async {
        Mode::Async
    } else {
        Mode::Sync
    }
}
