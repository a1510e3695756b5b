//! `object!`/`tuple!`/`merge!`/`conditional!`: the declarative surface over the
//! type-erased engine in [`crate::object`]/[`crate::constructs`]. Modeled on
//! bpaf's `construct!` ergonomics — callers write a plain braced or bracketed
//! list of child parsers and never see the `Box<dyn Any>` plumbing underneath.

#[cfg(doc)]
use crate::*;

/// Builds an [`crate::object::Object`] from `name: parser` pairs.
///
/// ```ignore
/// let parser = object!{
///     mode: option(vec!["--mode".into()], value_parsers::ChoiceValueParser::new("MODE", ["dev", "prod"])),
///     verbose: flag(vec!["--verbose".into()]),
/// };
/// ```
#[macro_export]
macro_rules! object {
    ( $( $field:ident : $parser:expr ),+ $(,)? ) => {{
        $crate::object::Object::from_slots(vec![
            $( (stringify!($field), $crate::object::erase($parser)) ),+
        ])
    }};
}

/// Builds a [`crate::object::Tuple`] from a positional parser list.
///
/// ```ignore
/// let parser = tuple![argument::<String>(...), argument::<i64>(...)];
/// ```
#[macro_export]
macro_rules! tuple {
    ( $( $parser:expr ),+ $(,)? ) => {{
        $crate::object::Tuple::from_slots(vec![
            $( $crate::object::erase($parser) ),+
        ])
    }};
}

/// Shape-level merge of several `object!`s into one (spec.md §4.3 `merge`):
/// token-level behavior is identical to declaring all fields on a single
/// `object!`.
#[macro_export]
macro_rules! merge {
    ( $( $object:expr ),+ $(,)? ) => {{
        $crate::constructs::merge(vec![ $( $object ),+ ])
    }};
}
