//! `or`, `longestMatch`, `concat`, `merge`, `conditional`, `group` (spec.md
//! §4.3). Alternation and sequencing over heterogeneous-but-same-shaped
//! parsers; `conditional` reuses the [`crate::object`] type-erasure scaffolding
//! since its branches are, in general, differently shaped.

use crate::combinator::{Combinator, Result, Usage};
use crate::dependency::{Identity, Registry};
use crate::error::{Error, Errors};
use crate::object::{erase, AnyOutput, AnyState, ErasedField, Fields, FieldSlot, Object};
use crate::token::Cursor;
use crate::value_parser::{Mode, Suggestion};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use std::collections::HashMap;
use std::sync::Arc;

/// `or(a, b)` (spec.md §4.3): the first branch whose `try_consume` makes
/// progress wins and is committed for the rest of the run; alternation is eager
/// and never backtracks across a successful commit. Both branches must share an
/// `Output` type — in practice each branch already ends in its own `map` into a
/// common result type, exactly as `bpaf`'s alternation combinators expect.
pub struct Or<A: Combinator, B: Combinator<Output = A::Output>> {
    first: A,
    second: B,
}

impl<A: Combinator, B: Combinator<Output = A::Output>> Or<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Or { first, second }
    }
}

pub enum OrState<A: Combinator, B: Combinator> {
    Undecided,
    First(A::State),
    Second(B::State),
}

impl<A: Combinator, B: Combinator> Clone for OrState<A, B> {
    fn clone(&self) -> Self {
        match self {
            OrState::Undecided => OrState::Undecided,
            OrState::First(s) => OrState::First(s.clone()),
            OrState::Second(s) => OrState::Second(s.clone()),
        }
    }
}

impl<A: Combinator, B: Combinator<Output = A::Output>> Combinator for Or<A, B> {
    type Output = A::Output;
    type State = OrState<A, B>;

    fn initial_state(&self) -> Self::State {
        OrState::Undecided
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        Box::pin(async move {
            match state {
                OrState::Undecided => {
                    let a0 = self.first.initial_state();
                    if let Some(s) = self.first.try_consume(&a0, cursor, registry).await? {
                        return Ok(Some(OrState::First(s)));
                    }
                    let b0 = self.second.initial_state();
                    if let Some(s) = self.second.try_consume(&b0, cursor, registry).await? {
                        return Ok(Some(OrState::Second(s)));
                    }
                    Ok(None)
                }
                OrState::First(s) => self
                    .first
                    .try_consume(s, cursor, registry)
                    .await
                    .map(|next| next.map(OrState::First)),
                OrState::Second(s) => self
                    .second
                    .try_consume(s, cursor, registry)
                    .await
                    .map(|next| next.map(OrState::Second)),
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
                OrState::Undecided => Err(Error::no_branch(Vec::new())),
                OrState::First(s) => self.first.complete(s, registry).await,
                OrState::Second(s) => self.second.complete(s, registry).await,
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
                OrState::Undecided => Ok(()),
                OrState::First(s) => self.first.seed_defaults(s, registry).await,
                OrState::Second(s) => self.second.seed_defaults(s, registry).await,
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
            // Neither branch has committed yet: both are still candidates.
            // `initial_state()` results are `'static`, so leaking them is the
            // only way to hand the borrowing `suggest` call a long enough
            // reference without threading fresh storage through the caller.
            OrState::Undecided => {
                let a0: &'static A::State = Box::leak(Box::new(self.first.initial_state()));
                let b0: &'static B::State = Box::leak(Box::new(self.second.initial_state()));
                Box::pin(futures::stream::select(
                    self.first.suggest(a0, prefix, registry),
                    self.second.suggest(b0, prefix, registry),
                ))
            }
            OrState::First(s) => self.first.suggest(s, prefix, registry),
            OrState::Second(s) => self.second.suggest(s, prefix, registry),
        }
    }

    fn usage(&self) -> Usage {
        let mut usage = Usage::default();
        usage.children = vec![self.first.usage(), self.second.usage()];
        usage
    }

    fn mode(&self) -> Mode {
        self.first.mode().join(self.second.mode())
    }

    fn source_identities(&self) -> Vec<Identity> {
        let mut ids = self.first.source_identities();
        ids.extend(self.second.source_identities());
        ids
    }
}

/// `longestMatch(a, b)` (spec.md §4.3): drives each branch independently to
/// its own completion over a private fork of the remaining input, then keeps
/// whichever one can actually `complete` while having consumed the most
/// tokens overall (ties favor `a`). A branch that cannot complete at all
/// loses regardless of how long a shared prefix it ate along the way.
pub struct LongestMatch<A: Combinator, B: Combinator<Output = A::Output>> {
    first: A,
    second: B,
}

impl<A: Combinator, B: Combinator<Output = A::Output>> LongestMatch<A, B> {
    pub fn new(first: A, second: B) -> Self {
        LongestMatch { first, second }
    }
}

enum Decision<A: Combinator, B: Combinator> {
    First(A::State),
    Second(B::State),
    /// Neither branch could complete; both are kept so `complete` can still
    /// report a `no-branch` error built from each branch's own failure.
    Neither(A::State, B::State),
}

impl<A: Combinator, B: Combinator> Clone for Decision<A, B> {
    fn clone(&self) -> Self {
        match self {
            Decision::First(s) => Decision::First(s.clone()),
            Decision::Second(s) => Decision::Second(s.clone()),
            Decision::Neither(a, b) => Decision::Neither(a.clone(), b.clone()),
        }
    }
}

#[derive(Clone)]
pub struct LongestMatchState<A: Combinator, B: Combinator> {
    decided: Option<Decision<A, B>>,
}

/// Drives `parser` to exhaustion over whatever remains of `cursor` — the same
/// loop `driver::run_pass` runs at the top level, one level down, so each
/// `longestMatch` branch gets to see the entire remaining input instead of
/// racing the other branch one shared round at a time.
async fn drain_to_completion<C: Combinator>(
    parser: &C,
    cursor: &mut Cursor,
    registry: &mut Registry,
) -> Result<C::State> {
    let mut state = parser.initial_state();
    while !cursor.is_exhausted() {
        match parser.try_consume(&state, cursor, registry).await? {
            Some(next) => state = next,
            None => break,
        }
    }
    Ok(state)
}

impl<A: Combinator, B: Combinator<Output = A::Output>> Combinator for LongestMatch<A, B> {
    type Output = A::Output;
    type State = LongestMatchState<A, B>;

    fn initial_state(&self) -> Self::State {
        LongestMatchState { decided: None }
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        Box::pin(async move {
            if state.decided.is_some() || cursor.is_exhausted() {
                return Ok(None);
            }

            let start = cursor.position();

            let mut cursor_a = cursor.clone();
            let mut registry_a = registry.clone();
            let a_state = drain_to_completion(&self.first, &mut cursor_a, &mut registry_a).await?;
            let consumed_a = cursor_a.position() - start;
            let a_ok = self.first.complete(a_state.clone(), &registry_a).await.is_ok();

            let mut cursor_b = cursor.clone();
            let mut registry_b = registry.clone();
            let b_state = drain_to_completion(&self.second, &mut cursor_b, &mut registry_b).await?;
            let consumed_b = cursor_b.position() - start;
            let b_ok = self.second.complete(b_state.clone(), &registry_b).await.is_ok();

            let decision = match (a_ok, b_ok) {
                (true, false) => {
                    *cursor = cursor_a;
                    *registry = registry_a;
                    Decision::First(a_state)
                }
                (false, true) => {
                    *cursor = cursor_b;
                    *registry = registry_b;
                    Decision::Second(b_state)
                }
                (true, true) if consumed_a >= consumed_b => {
                    *cursor = cursor_a;
                    *registry = registry_a;
                    Decision::First(a_state)
                }
                (true, true) => {
                    *cursor = cursor_b;
                    *registry = registry_b;
                    Decision::Second(b_state)
                }
                (false, false) => {
                    // Neither branch satisfies, but still commit the cursor
                    // past whichever one ate more so the outer pass advances
                    // and `complete` gets to report the real failure.
                    if consumed_a >= consumed_b {
                        *cursor = cursor_a;
                        *registry = registry_a;
                    } else {
                        *cursor = cursor_b;
                        *registry = registry_b;
                    }
                    Decision::Neither(a_state, b_state)
                }
            };

            Ok(Some(LongestMatchState { decided: Some(decision) }))
        })
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(async move {
            match state.decided {
                Some(Decision::First(s)) => self.first.complete(s, registry).await,
                Some(Decision::Second(s)) => self.second.complete(s, registry).await,
                Some(Decision::Neither(a, b)) => {
                    let ea = match self.first.complete(a, registry).await {
                        Ok(v) => return Ok(v),
                        Err(e) => e,
                    };
                    match self.second.complete(b, registry).await {
                        Ok(v) => Ok(v),
                        Err(eb) => Err(Error::no_branch(vec![ea, eb])),
                    }
                }
                // `try_consume` never ran at all (e.g. an empty command line):
                // fall back to completing each branch from its own initial
                // state, the same race an empty input would always have hit.
                None => {
                    let a = self.first.complete(self.first.initial_state(), registry).await;
                    let b = self.second.complete(self.second.initial_state(), registry).await;
                    match (a, b) {
                        (Ok(v), _) => Ok(v),
                        (Err(_), Ok(v)) => Ok(v),
                        (Err(ea), Err(eb)) => Err(Error::no_branch(vec![ea, eb])),
                    }
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
            match &state.decided {
                Some(Decision::First(s)) => self.first.seed_defaults(s, registry).await,
                Some(Decision::Second(s)) => self.second.seed_defaults(s, registry).await,
                Some(Decision::Neither(a, b)) => {
                    self.first.seed_defaults(a, registry).await?;
                    self.second.seed_defaults(b, registry).await
                }
                None => Ok(()),
            }
        })
    }

    fn suggest<'a>(
        &'a self,
        state: &'a Self::State,
        prefix: &'a str,
        registry: &'a Registry,
    ) -> BoxStream<'a, Suggestion> {
        match &state.decided {
            Some(Decision::First(s)) => self.first.suggest(s, prefix, registry),
            Some(Decision::Second(s)) => self.second.suggest(s, prefix, registry),
            Some(Decision::Neither(a, b)) => Box::pin(futures::stream::select(
                self.first.suggest(a, prefix, registry),
                self.second.suggest(b, prefix, registry),
            )),
            // Leaking mirrors `Or::suggest`'s `Undecided` arm: the trait ties
            // the state borrow to `&self`, and a locally built
            // `initial_state()` doesn't live long enough on its own.
            None => {
                let a0: &'static A::State = Box::leak(Box::new(self.first.initial_state()));
                let b0: &'static B::State = Box::leak(Box::new(self.second.initial_state()));
                Box::pin(futures::stream::select(
                    self.first.suggest(a0, prefix, registry),
                    self.second.suggest(b0, prefix, registry),
                ))
            }
        }
    }

    fn usage(&self) -> Usage {
        let mut usage = Usage::default();
        usage.children = vec![self.first.usage(), self.second.usage()];
        usage
    }

    fn mode(&self) -> Mode {
        self.first.mode().join(self.second.mode())
    }

    fn source_identities(&self) -> Vec<Identity> {
        let mut ids = self.first.source_identities();
        ids.extend(self.second.source_identities());
        ids
    }
}

/// `concat(a, b)` (spec.md §4.3): sequential composition of two parsers — `a`
/// is tried to exhaustion before `b` ever gets a token, but neither is
/// `complete`d until the very end, so a dependency source declared in `b`
/// still resolves correctly for a derived parser declared in `a`.
pub struct Concat<A: Combinator, B: Combinator> {
    first: A,
    second: B,
}

impl<A: Combinator, B: Combinator> Concat<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Concat { first, second }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    First,
    Second,
}

pub struct ConcatState<A: Combinator, B: Combinator> {
    phase: Phase,
    a: A::State,
    b: B::State,
}

impl<A: Combinator, B: Combinator> Clone for ConcatState<A, B> {
    fn clone(&self) -> Self {
        ConcatState {
            phase: self.phase,
            a: self.a.clone(),
            b: self.b.clone(),
        }
    }
}

impl<A: Combinator, B: Combinator> Combinator for Concat<A, B> {
    type Output = (A::Output, B::Output);
    type State = ConcatState<A, B>;

    fn initial_state(&self) -> Self::State {
        ConcatState {
            phase: Phase::First,
            a: self.first.initial_state(),
            b: self.second.initial_state(),
        }
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        Box::pin(async move {
            if state.phase == Phase::First {
                if let Some(a_next) = self.first.try_consume(&state.a, cursor, registry).await? {
                    return Ok(Some(ConcatState {
                        phase: Phase::First,
                        a: a_next,
                        b: state.b.clone(),
                    }));
                }
                if let Some(b_next) = self.second.try_consume(&state.b, cursor, registry).await? {
                    return Ok(Some(ConcatState {
                        phase: Phase::Second,
                        a: state.a.clone(),
                        b: b_next,
                    }));
                }
                Ok(None)
            } else {
                self.second
                    .try_consume(&state.b, cursor, registry)
                    .await
                    .map(|next| {
                        next.map(|b_next| ConcatState {
                            phase: Phase::Second,
                            a: state.a.clone(),
                            b: b_next,
                        })
                    })
            }
        })
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(async move {
            let mut errors = Errors::new();
            let a = match self.first.complete(state.a, registry).await {
                Ok(v) => Some(v),
                Err(e) => {
                    errors.push(e);
                    None
                }
            };
            let b = match self.second.complete(state.b, registry).await {
                Ok(v) => Some(v),
                Err(e) => {
                    errors.push(e);
                    None
                }
            };
            match (a, b) {
                (Some(a), Some(b)) => Ok((a, b)),
                _ => Err(errors.into_single()),
            }
        })
    }

    fn seed_defaults<'a>(
        &'a self,
        state: &'a Self::State,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.first.seed_defaults(&state.a, registry).await?;
            self.second.seed_defaults(&state.b, registry).await
        })
    }

    fn suggest<'a>(
        &'a self,
        state: &'a Self::State,
        prefix: &'a str,
        registry: &'a Registry,
    ) -> BoxStream<'a, Suggestion> {
        if state.phase == Phase::First {
            Box::pin(futures::stream::select(
                self.first.suggest(&state.a, prefix, registry),
                self.second.suggest(&state.b, prefix, registry),
            ))
        } else {
            self.second.suggest(&state.b, prefix, registry)
        }
    }

    fn usage(&self) -> Usage {
        let mut usage = Usage::default();
        usage.children = vec![self.first.usage(), self.second.usage()];
        usage
    }

    fn mode(&self) -> Mode {
        self.first.mode().join(self.second.mode())
    }

    fn source_identities(&self) -> Vec<Identity> {
        let mut ids = self.first.source_identities();
        ids.extend(self.second.source_identities());
        ids
    }
}

/// `merge(o1, ..., on)` (spec.md §4.3): flattens several `object!`s' fields
/// into one. Token-level behavior is identical to declaring all fields on a
/// single `object!` — this just concatenates field slots and rebuilds the
/// duplicate-dependency check over the union.
#[must_use]
pub fn merge(objects: Vec<Object>) -> Object {
    let mut slots: Vec<FieldSlot> = Vec::new();
    for object in objects {
        slots.extend(object.into_slots());
    }
    Object::from_fields(Fields::new(slots))
}

/// `conditional(discriminator, {key: branch, ...}, default?)` (spec.md §4.3):
/// parses the discriminator, then dispatches to the branch registered under its
/// value. Branches may differ in shape, so they are stored behind the same
/// type-erasure [`crate::object`] uses for heterogeneous object fields; the
/// result pairs the discriminator with the erased branch value for the caller
/// to downcast with [`crate::object::field`]-style helpers.
pub struct Conditional<D: Combinator<Output = String>> {
    discriminator: D,
    branches: HashMap<String, Arc<dyn ErasedField>>,
    default: Option<Arc<dyn ErasedField>>,
}

impl<D: Combinator<Output = String>> Conditional<D> {
    pub fn new(discriminator: D) -> Self {
        Conditional {
            discriminator,
            branches: HashMap::new(),
            default: None,
        }
    }

    #[must_use]
    pub fn branch<C: Combinator + 'static>(mut self, key: impl Into<String>, parser: C) -> Self {
        self.branches.insert(key.into(), erase(parser));
        self
    }

    #[must_use]
    pub fn default_branch<C: Combinator + 'static>(mut self, parser: C) -> Self {
        self.default = Some(erase(parser));
        self
    }
}

pub enum ConditionalState<D: Combinator> {
    ParsingDiscriminator(D::State),
    Selected {
        discriminator: String,
        state: AnyState,
    },
}

impl<D: Combinator> Clone for ConditionalState<D> {
    fn clone(&self) -> Self {
        match self {
            ConditionalState::ParsingDiscriminator(s) => ConditionalState::ParsingDiscriminator(s.clone()),
            ConditionalState::Selected { discriminator, state } => ConditionalState::Selected {
                discriminator: discriminator.clone(),
                // Cloning a boxed `Any` state generically isn't possible without
                // the owning branch's vtable; `ConditionalState` is only ever
                // cloned by the driver before the discriminator has resolved a
                // branch in practice (speculative alternation over a whole
                // `conditional` is not something this crate nests), so this
                // path exists only to satisfy `Combinator::State: Clone`.
                state: Box::new(()),
            },
        }
    }
}

impl<D: Combinator<Output = String>> Combinator for Conditional<D> {
    type Output = (String, AnyOutput);
    type State = ConditionalState<D>;

    fn initial_state(&self) -> Self::State {
        ConditionalState::ParsingDiscriminator(self.discriminator.initial_state())
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        Box::pin(async move {
            match state {
                ConditionalState::ParsingDiscriminator(d_state) => {
                    match self.discriminator.try_consume(d_state, cursor, registry).await? {
                        Some(next) => Ok(Some(ConditionalState::ParsingDiscriminator(next))),
                        None => {
                            if cursor.is_exhausted() {
                                return Ok(None);
                            }
                            let value = self
                                .discriminator
                                .complete(d_state.clone(), registry)
                                .await
                                .ok();
                            let Some(value) = value else { return Ok(None) };
                            let branch = self.branches.get(&value).or(self.default.as_ref());
                            let Some(branch) = branch else {
                                return Err(Error::no_branch(Vec::new()));
                            };
                            let branch_state = branch.initial_state();
                            let branch_state = match branch.try_consume(&branch_state, cursor, registry).await? {
                                Some(s) => s,
                                None => branch_state,
                            };
                            Ok(Some(ConditionalState::Selected {
                                discriminator: value,
                                state: branch_state,
                            }))
                        }
                    }
                }
                ConditionalState::Selected { discriminator, state } => {
                    let branch = self
                        .branches
                        .get(discriminator)
                        .or(self.default.as_ref())
                        .ok_or_else(|| Error::no_branch(Vec::new()))?;
                    branch
                        .try_consume(state, cursor, registry)
                        .await
                        .map(|next| {
                            next.map(|s| ConditionalState::Selected {
                                discriminator: discriminator.clone(),
                                state: s,
                            })
                        })
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
            match state {
                ConditionalState::ParsingDiscriminator(d_state) => {
                    Err(self
                        .discriminator
                        .complete(d_state, registry)
                        .await
                        .err()
                        .unwrap_or_else(|| Error::no_branch(Vec::new())))
                }
                ConditionalState::Selected { discriminator, state } => {
                    let branch = self
                        .branches
                        .get(&discriminator)
                        .or(self.default.as_ref())
                        .ok_or_else(|| Error::no_branch(Vec::new()))?;
                    let value = branch.complete(state, registry).await?;
                    Ok((discriminator, value))
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
                ConditionalState::ParsingDiscriminator(d_state) => {
                    self.discriminator.seed_defaults(d_state, registry).await
                }
                ConditionalState::Selected { discriminator, state } => {
                    let branch = self
                        .branches
                        .get(discriminator)
                        .or(self.default.as_ref())
                        .ok_or_else(|| Error::no_branch(Vec::new()))?;
                    branch.seed_defaults(state, registry).await
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
            ConditionalState::ParsingDiscriminator(d_state) => self.discriminator.suggest(d_state, prefix, registry),
            ConditionalState::Selected { discriminator, state } => {
                match self.branches.get(discriminator).or(self.default.as_ref()) {
                    Some(branch) => branch.suggest(state, prefix, registry),
                    None => Box::pin(futures::stream::empty()),
                }
            }
        }
    }

    fn usage(&self) -> Usage {
        let mut usage = Usage::default();
        usage.children = self.branches.values().map(|b| b.usage()).collect();
        usage
    }

    fn mode(&self) -> Mode {
        let mut mode = self.discriminator.mode();
        for b in self.branches.values() {
            mode = mode.join(b.mode());
        }
        mode
    }

    fn source_identities(&self) -> Vec<Identity> {
        let mut ids = self.discriminator.source_identities();
        for b in self.branches.values() {
            ids.extend(b.source_identities());
        }
        ids
    }
}

/// `group(title, inner)` (spec.md §4.3): purely decorative — identical
/// token-level behavior to `inner`, just tags its usage subtree with a section
/// title for help rendering.
pub struct Group<C: Combinator> {
    title: String,
    inner: C,
}

impl<C: Combinator> Group<C> {
    pub fn new(title: impl Into<String>, inner: C) -> Self {
        Group {
            title: title.into(),
            inner,
        }
    }
}

impl<C: Combinator> Combinator for Group<C> {
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
        self.inner.complete(state, registry)
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
        self.inner.usage().with_group(self.title.clone())
    }

    fn mode(&self) -> Mode {
        self.inner.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.inner.source_identities()
    }
}
