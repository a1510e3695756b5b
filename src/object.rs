//! `object`/`tuple` (spec.md §4.3). Fields of an `object!`/`tuple!` have
//! different `Output` types, which Rust cannot express as a homogeneous
//! collection without type erasure. Internally every field is stored behind the
//! object-safe [`ErasedField`] trait (`Box<dyn Any>` payloads); the public
//! `object!`/`tuple!` macros restore static types at the call site by downcasting
//! into the caller's declared struct-literal/tuple-binding — the same ergonomics
//! bpaf's `construct!` macro gives its combinatoric API, callers never see `Any`.

use crate::combinator::{Combinator, Result, Usage};
use crate::dependency::{Identity, Registry};
use crate::error::{Error, Errors};
use crate::token::{Cursor, Token};
use crate::value_parser::{Mode, Suggestion};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) type AnyState = Box<dyn Any + Send + Sync>;
pub(crate) type AnyOutput = Box<dyn Any + Send>;

/// Object-safe erasure of [`Combinator`], used internally by [`Object`]/[`Tuple`].
/// Public (not `pub(crate)`) only so `object!`/`tuple!` expand at an external
/// call site; not part of the crate's real API, hence hidden from docs.
#[doc(hidden)]
#[allow(private_interfaces)]
pub trait ErasedField: Send + Sync {
    fn initial_state(&self) -> AnyState;
    fn clone_state(&self, state: &AnyState) -> AnyState;
    fn try_consume<'a>(
        &'a self,
        state: &'a AnyState,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<AnyState>>>;
    fn complete<'a>(&'a self, state: AnyState, registry: &'a Registry) -> BoxFuture<'a, Result<AnyOutput>>;
    fn seed_defaults<'a>(&'a self, state: &'a AnyState, registry: &'a mut Registry) -> BoxFuture<'a, Result<()>>;
    fn suggest<'a>(&'a self, state: &'a AnyState, prefix: &'a str, registry: &'a Registry) -> BoxStream<'a, Suggestion>;
    fn usage(&self) -> Usage;
    fn mode(&self) -> Mode;
    fn source_identities(&self) -> Vec<Identity>;
}

struct ErasedFieldImpl<C>(C);

impl<C: Combinator + 'static> ErasedField for ErasedFieldImpl<C> {
    fn initial_state(&self) -> AnyState {
        Box::new(self.0.initial_state())
    }

    fn clone_state(&self, state: &AnyState) -> AnyState {
        #[allow(clippy::expect_used)]
        let typed = state
            .downcast_ref::<C::State>()
            .expect("object field state type mismatch");
        Box::new(typed.clone())
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a AnyState,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<AnyState>>> {
        Box::pin(async move {
            #[allow(clippy::expect_used)]
            let typed = state
                .downcast_ref::<C::State>()
                .expect("object field state type mismatch");
            let next = self.0.try_consume(typed, cursor, registry).await?;
            Ok(next.map(|s| Box::new(s) as AnyState))
        })
    }

    fn complete<'a>(&'a self, state: AnyState, registry: &'a Registry) -> BoxFuture<'a, Result<AnyOutput>> {
        Box::pin(async move {
            #[allow(clippy::expect_used)]
            let typed = *state
                .downcast::<C::State>()
                .expect("object field state type mismatch");
            let out = self.0.complete(typed, registry).await?;
            Ok(Box::new(out) as AnyOutput)
        })
    }

    fn seed_defaults<'a>(&'a self, state: &'a AnyState, registry: &'a mut Registry) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            #[allow(clippy::expect_used)]
            let typed = state
                .downcast_ref::<C::State>()
                .expect("object field state type mismatch");
            self.0.seed_defaults(typed, registry).await
        })
    }

    fn suggest<'a>(&'a self, state: &'a AnyState, prefix: &'a str, registry: &'a Registry) -> BoxStream<'a, Suggestion> {
        #[allow(clippy::expect_used)]
        let typed = state
            .downcast_ref::<C::State>()
            .expect("object field state type mismatch");
        self.0.suggest(typed, prefix, registry)
    }

    fn usage(&self) -> Usage {
        self.0.usage()
    }

    fn mode(&self) -> Mode {
        self.0.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.0.source_identities()
    }
}

/// Used by the `object!`/`tuple!` macro expansion; not meant to be called
/// directly.
#[doc(hidden)]
pub fn erase<C: Combinator + 'static>(inner: C) -> Arc<dyn ErasedField> {
    Arc::new(ErasedFieldImpl(inner))
}

#[derive(Clone)]
pub(crate) struct FieldSlot {
    pub(crate) name: &'static str,
    pub(crate) field: Arc<dyn ErasedField>,
}

/// Per-run state: one erased child state per declared field, carried in
/// declaration order, each paired with the field vtable needed to clone it.
/// Pairing the vtable with the payload (rather than deriving `Clone` on the
/// `Box<dyn Any>` alone, which is impossible) is what lets this type honestly
/// satisfy `Combinator::State: Clone`.
pub(crate) struct ObjectState(pub(crate) Vec<(Arc<dyn ErasedField>, AnyState)>);

impl Clone for ObjectState {
    fn clone(&self) -> Self {
        ObjectState(
            self.0
                .iter()
                .map(|(field, state)| (Arc::clone(field), field.clone_state(state)))
                .collect(),
        )
    }
}

/// The shared order-independent round engine behind `object`/`tuple` (spec.md
/// §4.3 construct protocol): one round of `try_consume` probes every field
/// against a cloned cursor/registry, keeps the one that consumed the most
/// tokens (ties broken by declaration order), and commits only that field's
/// progress — mirroring the driver's own outer try-consume loop one level down.
pub(crate) struct Fields {
    pub(crate) slots: Vec<FieldSlot>,
    /// Set at construction if two distinct fields declare an overlapping
    /// dependency-source identity; surfaced at `complete` time rather than
    /// panicking during construction (spec.md §7 propagation policy).
    duplicate_dependency: bool,
}

impl Fields {
    pub(crate) fn new(slots: Vec<FieldSlot>) -> Self {
        let mut seen: HashMap<Identity, usize> = HashMap::new();
        let mut duplicate_dependency = false;
        for (idx, slot) in slots.iter().enumerate() {
            for id in slot.field.source_identities() {
                match seen.get(&id) {
                    Some(&owner) if owner != idx => duplicate_dependency = true,
                    _ => {
                        seen.insert(id, idx);
                    }
                }
            }
        }
        Fields {
            slots,
            duplicate_dependency,
        }
    }

    pub(crate) fn initial_state(&self) -> ObjectState {
        ObjectState(
            self.slots
                .iter()
                .map(|s| (Arc::clone(&s.field), s.field.initial_state()))
                .collect(),
        )
    }

    pub(crate) fn mode(&self) -> Mode {
        self.slots.iter().fold(Mode::Sync, |m, s| m.join(s.field.mode()))
    }

    pub(crate) fn source_identities(&self) -> Vec<Identity> {
        self.slots.iter().flat_map(|s| s.field.source_identities()).collect()
    }

    pub(crate) fn usage(&self) -> Usage {
        let mut usage = Usage::default();
        usage.children = self.slots.iter().map(|s| s.field.usage()).collect();
        usage
    }

    /// Bundled boolean short flags (`-abc` ≡ `-a -b -c`, spec.md §6): if every
    /// letter of a short-option cluster at the cursor names a declared boolean
    /// flag among this object's own fields (a slot whose usage has no
    /// metavar), splits it into one token per letter so the ordinary
    /// whole-token `Flag` matching below picks them off one at a time over
    /// subsequent rounds. Left untouched if any letter doesn't resolve to a
    /// boolean flag — e.g. `-xvalue` where `-x` is a valued option, which
    /// `Opt`'s own short inline-value form handles instead.
    fn expand_short_cluster(&self, cursor: &mut Cursor) {
        let Some(tok) = cursor.peek() else { return };
        if !tok.is_short_option() || tok.0.len() <= 2 || tok.split_equals().is_some() {
            return;
        }
        let letters = &tok.0[1..];
        let mut expanded = Vec::with_capacity(letters.len());
        for ch in letters.chars() {
            let name = format!("-{ch}");
            let is_bool_flag = self.slots.iter().any(|slot| {
                let usage = slot.field.usage();
                usage.metavar.is_none() && usage.names.iter().any(|n| n == &name)
            });
            if !is_bool_flag {
                return;
            }
            expanded.push(Token(name));
        }
        cursor.splice_current(expanded);
    }

    pub(crate) fn try_consume<'a>(
        &'a self,
        state: &'a ObjectState,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<ObjectState>>> {
        Box::pin(async move {
            if cursor.is_exhausted() {
                return Ok(None);
            }
            self.expand_short_cluster(cursor);
            let mut best: Option<(usize, AnyState, usize, Cursor, Registry)> = None;
            for (idx, slot) in self.slots.iter().enumerate() {
                let mut probe_cursor = cursor.clone();
                let mut probe_registry = registry.clone();
                let before = probe_cursor.position();
                match slot
                    .field
                    .try_consume(&state.0[idx].1, &mut probe_cursor, &mut probe_registry)
                    .await
                {
                    Ok(Some(new_state)) => {
                        let consumed = probe_cursor.position() - before;
                        let better = match &best {
                            None => true,
                            Some((_, _, best_consumed, ..)) => consumed > *best_consumed,
                        };
                        if better {
                            best = Some((idx, new_state, consumed, probe_cursor, probe_registry));
                        }
                    }
                    Ok(None) => {}
                    Err(e) => return Err(e),
                }
            }
            match best {
                None => Ok(None),
                Some((winner, new_state, _, new_cursor, new_registry)) => {
                    *cursor = new_cursor;
                    *registry = new_registry;
                    let mut entries = Vec::with_capacity(self.slots.len());
                    for (i, (field, s)) in state.0.iter().enumerate() {
                        if i == winner {
                            entries.push((Arc::clone(field), new_state_as_placeholder()));
                        } else {
                            entries.push((Arc::clone(field), field.clone_state(s)));
                        }
                    }
                    entries[winner].1 = new_state;
                    Ok(Some(ObjectState(entries)))
                }
            }
        })
    }

    /// Runs every field's `seed_defaults` in declaration order against one
    /// shared, mutable registry clone before any field actually completes —
    /// this is what lets a `withDefault`-wrapped source's fallback value reach
    /// a derived sibling regardless of field declaration order.
    pub(crate) async fn seed_defaults(&self, state: &ObjectState, registry: &mut Registry) -> Result<()> {
        for (slot, (_, child_state)) in self.slots.iter().zip(state.0.iter()) {
            slot.field.seed_defaults(child_state, registry).await?;
        }
        Ok(())
    }

    /// Merges every field's suggestion stream for `prefix` (spec.md §6):
    /// a field that has already matched contributes nothing (its own
    /// `suggest` override is responsible for going quiet once satisfied).
    pub(crate) fn suggest<'a>(
        &'a self,
        state: &'a ObjectState,
        prefix: &'a str,
        registry: &'a Registry,
    ) -> BoxStream<'a, Suggestion> {
        let streams = self
            .slots
            .iter()
            .zip(state.0.iter())
            .map(|(slot, (_, child_state))| slot.field.suggest(child_state, prefix, registry));
        Box::pin(futures::stream::select_all(streams))
    }

    pub(crate) async fn complete_map(
        &self,
        state: ObjectState,
        registry: &Registry,
    ) -> Result<HashMap<String, AnyOutput>> {
        if self.duplicate_dependency {
            return Err(Error::duplicate_dependency());
        }
        let mut registry = registry.clone();
        self.seed_defaults(&state, &mut registry).await?;
        let registry = &registry;
        let mut errors = Errors::new();
        let mut out = HashMap::new();
        for (slot, (_, child_state)) in self.slots.iter().zip(state.0.into_iter()) {
            match slot.field.complete(child_state, registry).await {
                Ok(value) => {
                    out.insert(slot.name.to_string(), value);
                }
                Err(e) => errors.push(e),
            }
        }
        if errors.is_empty() {
            Ok(out)
        } else {
            Err(errors.into_single())
        }
    }

    pub(crate) async fn complete_vec(&self, state: ObjectState, registry: &Registry) -> Result<Vec<AnyOutput>> {
        if self.duplicate_dependency {
            return Err(Error::duplicate_dependency());
        }
        let mut registry = registry.clone();
        self.seed_defaults(&state, &mut registry).await?;
        let registry = &registry;
        let mut errors = Errors::new();
        let mut out = Vec::with_capacity(self.slots.len());
        for (slot, (_, child_state)) in self.slots.iter().zip(state.0.into_iter()) {
            match slot.field.complete(child_state, registry).await {
                Ok(value) => out.push(value),
                Err(e) => errors.push(e),
            }
        }
        if errors.is_empty() {
            Ok(out)
        } else {
            Err(errors.into_single())
        }
    }
}

/// A throwaway value used only to occupy the winning slot for one statement
/// before it is immediately overwritten with the real new state.
fn new_state_as_placeholder() -> AnyState {
    Box::new(())
}

/// Downcasts and removes one completed field out of an [`Object`]'s result map.
/// Typical use is inside a `map` closure that reassembles the erased fields into
/// a caller-defined struct: `object!{ mode: ..., log_level: ... }.map(|mut
/// fields| MyArgs { mode: object::field(&mut fields, "mode"), .. })`.
///
/// # Panics
/// Panics if `key` is absent or was completed with a different type than `T` —
/// both are engine invariant violations the `object!` macro's own bookkeeping
/// makes unreachable for callers who only ever downcast at the types the macro
/// itself declared.
#[must_use]
pub fn field<T: 'static>(map: &mut HashMap<String, AnyOutput>, key: &str) -> T {
    #[allow(clippy::expect_used)]
    let boxed = map.remove(key).expect("object field missing from completed map");
    #[allow(clippy::expect_used)]
    *boxed.downcast::<T>().expect("object field type mismatch")
}

/// Downcasts one positional entry out of a [`Tuple`]'s result vector. See
/// [`field`] for panics.
#[must_use]
pub fn index<T: 'static>(values: &mut Vec<AnyOutput>, i: usize) -> T {
    #[allow(clippy::expect_used)]
    let boxed = std::mem::replace(&mut values[i], Box::new(()));
    #[allow(clippy::expect_used)]
    *boxed.downcast::<T>().expect("tuple field type mismatch")
}

/// `object({key: parser, ...})`: runs children order-independently and completes
/// into a `HashMap<String, Box<dyn Any + Send>>`. The `object!` macro downcasts
/// each entry back into the caller's declared field types.
pub struct Object {
    fields: Fields,
}

impl Object {
    #[doc(hidden)]
    #[must_use]
    pub fn from_slots(slots: Vec<(&'static str, Arc<dyn ErasedField>)>) -> Self {
        Object {
            fields: Fields::new(
                slots
                    .into_iter()
                    .map(|(name, field)| FieldSlot { name, field })
                    .collect(),
            ),
        }
    }

    /// Unwraps into its field slots, discarding the duplicate-dependency check
    /// (the caller, e.g. `constructs::merge`, reassembles a fresh [`Fields`] over
    /// the union and re-derives that check there).
    pub(crate) fn into_slots(self) -> Vec<FieldSlot> {
        self.fields.slots
    }

    pub(crate) fn from_fields(fields: Fields) -> Self {
        Object { fields }
    }
}

impl Combinator for Object {
    type Output = HashMap<String, AnyOutput>;
    type State = ObjectState;

    fn initial_state(&self) -> Self::State {
        self.fields.initial_state()
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        self.fields.try_consume(state, cursor, registry)
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(self.fields.complete_map(state, registry))
    }

    fn seed_defaults<'a>(
        &'a self,
        state: &'a Self::State,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.fields.seed_defaults(state, registry))
    }

    fn suggest<'a>(&'a self, state: &'a Self::State, prefix: &'a str, registry: &'a Registry) -> BoxStream<'a, Suggestion> {
        self.fields.suggest(state, prefix, registry)
    }

    fn usage(&self) -> Usage {
        self.fields.usage()
    }

    fn mode(&self) -> Mode {
        self.fields.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.fields.source_identities()
    }
}

/// `tuple([p1, ..., pn])`: same protocol as [`Object`], completes positionally.
pub struct Tuple {
    fields: Fields,
}

impl Tuple {
    #[doc(hidden)]
    #[must_use]
    pub fn from_slots(fields: Vec<Arc<dyn ErasedField>>) -> Self {
        Tuple {
            fields: Fields::new(
                fields
                    .into_iter()
                    .enumerate()
                    .map(|(i, field)| FieldSlot {
                        name: Box::leak(i.to_string().into_boxed_str()),
                        field,
                    })
                    .collect(),
            ),
        }
    }
}

impl Combinator for Tuple {
    type Output = Vec<AnyOutput>;
    type State = ObjectState;

    fn initial_state(&self) -> Self::State {
        self.fields.initial_state()
    }

    fn try_consume<'a>(
        &'a self,
        state: &'a Self::State,
        cursor: &'a mut Cursor,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<Option<Self::State>>> {
        self.fields.try_consume(state, cursor, registry)
    }

    fn complete<'a>(
        &'a self,
        state: Self::State,
        registry: &'a Registry,
    ) -> BoxFuture<'a, Result<Self::Output>> {
        Box::pin(self.fields.complete_vec(state, registry))
    }

    fn seed_defaults<'a>(
        &'a self,
        state: &'a Self::State,
        registry: &'a mut Registry,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.fields.seed_defaults(state, registry))
    }

    fn suggest<'a>(&'a self, state: &'a Self::State, prefix: &'a str, registry: &'a Registry) -> BoxStream<'a, Suggestion> {
        self.fields.suggest(state, prefix, registry)
    }

    fn usage(&self) -> Usage {
        self.fields.usage()
    }

    fn mode(&self) -> Mode {
        self.fields.mode()
    }

    fn source_identities(&self) -> Vec<Identity> {
        self.fields.source_identities()
    }
}
