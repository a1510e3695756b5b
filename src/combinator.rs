//! C3: the combinator core. Every parser in this crate — primitive or
//! construct — implements one [`Combinator`] trait exposing the uniform
//! `try-consume`/`complete` step protocol from spec.md §4.3. Suspension (for async
//! value parsers and derived factories) is modeled by always returning a boxed
//! future; the sync entry point in [`crate::driver`] rejects anything whose
//! [`Combinator::mode`] reports [`Mode::Async`] *before* running, so that future is
//! statically guaranteed to resolve on first poll and can be driven with
//! `futures::executor::block_on` without ever truly suspending.

use crate::dependency::{Identity, Registry};
use crate::token::Cursor;
use crate::value_parser::{Mode, Suggestion};
use futures::future::BoxFuture;
use futures::stream::BoxStream;

pub use crate::error::{Error, Result};

/// Usage metadata for help/error renderers (spec.md §4.3/§6): the external
/// collaborators this crate does not implement still need something to walk.
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub names: Vec<String>,
    pub metavar: Option<String>,
    pub description: Option<String>,
    pub default_display: Option<String>,
    pub group: Option<String>,
    pub required: bool,
    pub children: Vec<Usage>,
}

impl Usage {
    #[must_use]
    pub fn leaf(names: Vec<String>, metavar: Option<String>) -> Self {
        Usage {
            names,
            metavar,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_group(mut self, title: impl Into<String>) -> Self {
        self.group = Some(title.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// The uniform parser contract (spec.md §3 "Parser", §4.3). `State` is the
/// per-run, per-instance bookkeeping a parser accumulates while walking the
/// cursor; parsers themselves stay immutable and shareable across runs
/// (spec.md §3 "Lifecycle") because all mutable progress lives in `State`
/// values threaded explicitly by the caller, never in `&mut self`.
pub trait Combinator: Send + Sync {
    /// The typed value this parser ultimately produces.
    type Output: Send + 'static;
    /// Per-run progress state, produced fresh by [`Combinator::initial_state`] and
    /// threaded functionally: `try_consume` takes the current state by reference
    /// and returns a *new* state candidate rather than mutating in place, so
    /// object/tuple can speculatively probe several children against cloned
    /// cursors/registries and commit only the winner.
    type State: Clone + Send + Sync + 'static;

    /// A fresh, empty per-run state.
    fn initial_state(&self) -> Self::State;

    /// Attempts to match at the current cursor position. `Ok(None)` means "skip,
    /// try the next sibling"; `Ok(Some(state))` means the candidate state after
    /// consuming some tokens (the caller measures how many by comparing cursor
    /// positions before/after); `Err` is a value-level failure that aborts the
    /// step immediately (spec.md §7: value-level errors are reported in place).
    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>>;

    /// Finalizes a state into a typed result once the token pass is done.
    /// `registry` is final at this point, so this is where derived-parser
    /// deferred states are resolved (spec.md §4.2 `resolve-deferred`).
    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>>;

    /// Writes any fallback default values this parser owns into `registry`
    /// *before* any sibling's `complete` runs (spec.md §4.4 `withDefault`
    /// ordering invariant: a derived parser must see a source's default value
    /// through the registry, not fall back to its own default, when the source
    /// was never provided). `object`/`tuple` call this for every field in
    /// declaration order in one pass that precedes the `complete` pass
    /// entirely. Most parsers have nothing to seed; only `withDefault` and
    /// modifiers forwarding through it override this.
    fn seed_defaults<'a>(
        &'a self,
        _state: &'a Self::State,
        _registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<()>> {
        ready(Ok(()))
    }

    /// Completion suggestions for `prefix`, given the progress recorded in
    /// `state` (spec.md §6 "Suggestion protocol"). `registry` is whatever has
    /// been resolved so far in the run, letting a derived field base its
    /// suggestions on the real sources once they're known rather than always
    /// falling back to its factory's defaults. Default: no suggestions — only
    /// the primitives that actually own names or a value parser
    /// (`option`/`argument`/`flag`) and the constructs that aggregate their
    /// children override this.
    fn suggest<'a>(
        &'a self,
        _state: &'a Self::State,
        _prefix: &'a str,
        _registry: &'a Registry,
    ) -> BoxStream<'a, Suggestion> {
        Box::pin(futures::stream::empty())
    }

    /// Usage metadata for help/error rendering.
    fn usage(&self) -> Usage;

    /// Whether any part of this parser can suspend.
    fn mode(&self) -> Mode;

    /// Dependency-source identities reachable directly in this parser (not
    /// through a nested `or`/`longestMatch`, where source reuse across branches
    /// is legitimate per DESIGN.md). Used by `object`/`tuple`/`merge` to detect
    /// `duplicate-dependency` among AND-combined siblings.
    fn source_identities(&self) -> Vec<Identity> {
        Vec::new()
    }
}

/// Small helper: wraps an already-available value as a ready boxed future,
/// since every [`Combinator`] method must return one even in the common sync
/// case.
pub fn ready<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, T> {
    Box::pin(futures::future::ready(value))
}
