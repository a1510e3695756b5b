//! C1: the value parser contract (spec.md §4.1). A value parser turns one token
//! into a typed value, can format it back, and can suggest completions.

use crate::error::Error;
use crate::token::Token;
use futures::future::BoxFuture;
use futures::stream::BoxStream;

/// Whether a parser's step can suspend (async) or completes eagerly (sync). Mode
/// propagates upward: any parser containing an async sub-parser is itself async
/// (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Mode {
    Sync,
    Async,
}

impl Mode {
    /// Union of two modes: async wins.
    #[must_use]
    pub fn join(self, other: Mode) -> Mode {
        if self == Mode::Async || other == Mode::Async {
            Mode::Async
        } else {
            Mode::Sync
        }
    }
}

/// The effect of calling [`ValueParser::parse`]: either the value is ready
/// immediately (the sync path, and the common case), or producing it requires
/// awaiting a future (the async path). Suspension may occur only inside a value
/// parser's `parse`/`suggest`, never inside the combinator step protocol itself
/// (spec.md §5).
pub enum ParseEffect<T> {
    Ready(Result<T, Error>),
    Pending(BoxFuture<'static, Result<T, Error>>),
}

impl<T: Send + 'static> ParseEffect<T> {
    /// Resolves the effect, blocking the caller only if it was already pending
    /// and is used from sync context — the sync driver instead rejects
    /// `Pending` outright (spec.md §4.5: `parse` errors if any sub-parser is
    /// async).
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, ParseEffect::Pending(_))
    }

    /// Takes the ready result, panicking if the effect was pending. Callers must
    /// check [`ParseEffect::is_pending`] first; this exists for the sync driver's
    /// hot path where pending has already been ruled out.
    pub async fn resolve(self) -> Result<T, Error> {
        match self {
            ParseEffect::Ready(r) => r,
            ParseEffect::Pending(fut) => fut.await,
        }
    }
}

/// One suggestion for shell completion. Either a concrete literal or a delegation
/// to the host shell's native file completion (spec.md §6).
#[derive(Debug, Clone)]
pub enum Suggestion {
    Literal {
        text: String,
        description: Option<String>,
    },
    File {
        kind: FileKind,
        extensions: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Either,
}

/// C1 contract: `parse(token) -> result<T>`, `format(value) -> string`, an
/// optional `suggest(prefix) -> stream`, and a non-empty `metavar` label.
pub trait ValueParser: Send + Sync {
    /// The typed value this parser produces.
    type Value: Send + 'static;

    /// Parses a single token. Sync parsers should return `ParseEffect::Ready`;
    /// parsers that must suspend return `ParseEffect::Pending`, which makes this
    /// parser (and anything composed around it) async per spec.md §3.
    fn parse(&self, token: &Token) -> ParseEffect<Self::Value>;

    /// Best-effort inverse of `parse`, used by help/error renderers.
    fn format(&self, value: &Self::Value) -> String;

    /// A finite, possibly empty, possibly async stream of completions for
    /// `prefix`. Default: no suggestions.
    fn suggest(&self, _prefix: &str) -> BoxStream<'static, Suggestion> {
        Box::pin(futures::stream::empty())
    }

    /// Non-empty label shown in usage, e.g. `FILE`, `PORT`.
    fn metavar(&self) -> &str;

    /// Whether this value parser's `parse` can ever return `Pending`. Used for
    /// static mode inference without having to call `parse`.
    fn mode(&self) -> Mode {
        Mode::Sync
    }
}

impl<P: ValueParser + ?Sized> ValueParser for Box<P> {
    type Value = P::Value;

    fn parse(&self, token: &Token) -> ParseEffect<Self::Value> {
        (**self).parse(token)
    }

    fn format(&self, value: &Self::Value) -> String {
        (**self).format(value)
    }

    fn suggest(&self, prefix: &str) -> BoxStream<'static, Suggestion> {
        (**self).suggest(prefix)
    }

    fn metavar(&self) -> &str {
        (**self).metavar()
    }

    fn mode(&self) -> Mode {
        (**self).mode()
    }
}
