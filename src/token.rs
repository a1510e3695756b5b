//! Tokens and the cursor used to walk them. A [`Cursor`] is the cheap-to-clone
//! equivalent of unsynn's `TokenIter`: peeking or speculative branches clone the
//! cursor, try something, and either discard the clone or copy it back over the
//! original on success. Shares its slice via `Arc` rather than `Rc` since the
//! async driver requires every in-flight parser state to be `Send`.

use std::sync::Arc;

/// A single command line token. Just a thin wrapper over `String` so that
/// `Debug`/`Display`/usage formatting stay centralized instead of passing bare
/// strings around.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(pub String);

impl Token {
    /// Does this look like a long option, e.g. `--name` or `--name=value`.
    #[must_use]
    pub fn is_long_option(&self) -> bool {
        self.0.starts_with("--") && self.0.len() > 2
    }

    /// Does this look like a short option cluster, e.g. `-x` or `-abc`.
    #[must_use]
    pub fn is_short_option(&self) -> bool {
        self.0.starts_with('-') && !self.0.starts_with("--") && self.0.len() > 1
    }

    /// Is this the `--` terminator.
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        self.0 == "--"
    }

    /// Splits a `--name=value` style token into `(name, value)`. The short
    /// `-xvalue` form (no `=`) isn't handled here — `Opt` matches that
    /// directly against its own declared short names instead, since only it
    /// knows how many leading characters are the name.
    #[must_use]
    pub fn split_equals(&self) -> Option<(&str, &str)> {
        self.0.split_once('=')
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token({:?})", self.0)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(s.to_string())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token(s)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds the token list for a run from any iterator of stringy things.
pub fn tokenize<I, S>(args: I) -> Vec<Token>
where
    I: IntoIterator<Item = S>,
    S: Into<Token>,
{
    args.into_iter().map(Into::into).collect()
}

/// A position into an immutable, shared token list. Cloning a `Cursor` is O(1): it
/// shares the underlying slice via `Rc` and copies the position index, which is
/// exactly the "clone the iterator, commit the clone back on success" discipline
/// unsynn documents for its `TokenIter`.
#[derive(Clone)]
pub struct Cursor {
    tokens: Arc<[Token]>,
    pos: usize,
    /// Tokens captured after a `--` terminator, handed verbatim to a `passthrough`
    /// child. `None` until a terminator has actually been seen.
    tail: Option<Arc<[Token]>>,
}

impl Cursor {
    /// Creates a cursor over `tokens`, splitting off anything after a bare `--`
    /// terminator into the pass-through tail.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        if let Some(idx) = tokens.iter().position(Token::is_terminator) {
            let tail: Arc<[Token]> = tokens[idx + 1..].to_vec().into();
            let head: Arc<[Token]> = tokens[..idx].to_vec().into();
            Cursor {
                tokens: head,
                pos: 0,
                tail: Some(tail),
            }
        } else {
            Cursor {
                tokens: tokens.into(),
                pos: 0,
                tail: None,
            }
        }
    }

    /// Peeks at the token at the current position without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Peeks `n` tokens ahead of the current position.
    #[must_use]
    pub fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    /// Advances the cursor by one token and returns it.
    pub fn next(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Advances the cursor by `n` tokens without returning them.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.tokens.len());
    }

    /// Current position, used to compute how many tokens a speculative attempt
    /// consumed: `after.position() - before.position()`.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// True when no more tokens remain in the recognized (pre-`--`) region.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// The pass-through tail, if a `--` terminator was present.
    #[must_use]
    pub fn tail(&self) -> Option<&[Token]> {
        self.tail.as_deref()
    }

    /// Whether a `--` terminator was seen at all (distinct from an empty tail).
    #[must_use]
    pub fn has_terminator(&self) -> bool {
        self.tail.is_some()
    }

    /// Replaces the token at the current position with `replacement`, rebuilding
    /// the backing slice the same way [`Cursor::new`] splits off its
    /// pass-through tail. Used to expand a bundled short-flag cluster (`-abc`)
    /// into its individual flags (`-a`, `-b`, `-c`) before the per-field probe
    /// ever sees it (spec.md §6).
    pub fn splice_current(&mut self, replacement: Vec<Token>) {
        let mut tokens: Vec<Token> = self.tokens[..self.pos].to_vec();
        tokens.extend(replacement);
        tokens.extend(self.tokens[self.pos + 1..].iter().cloned());
        self.tokens = tokens.into();
    }
}
