//! Structured errors. Mirrors the shape of unsynn's hand-rolled `Error`/`Result`:
//! an enum with cheap, allocation-light common cases, `Debug`/`Display` impls
//! instead of pulling in a derive-macro error crate, and a crate-wide `Result<T>`
//! alias. Extended here with the ordered message-term list spec.md §3/§7 requires,
//! so renderers can style each fragment independently.

use crate::token::Token;
use std::fmt;

/// One semantically typed fragment of an error message. Errors compose into ordered
/// lists of these rather than a formatted string.
#[derive(Debug, Clone)]
pub enum Term {
    /// Plain prose.
    Text(String),
    /// A literal value, e.g. the rejected token.
    Value(String),
    /// A metavar label, e.g. `PORT`.
    Metavar(String),
    /// An option name, e.g. `--log-level`.
    OptionName(String),
    /// A set of accepted values, e.g. `{debug, verbose}`.
    ValuesList(Vec<String>),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Text(s) => write!(f, "{s}"),
            Term::Value(v) => write!(f, "`{v}`"),
            Term::Metavar(m) => write!(f, "{m}"),
            Term::OptionName(n) => write!(f, "{n}"),
            Term::ValuesList(vs) => write!(f, "{{{}}}", vs.join(", ")),
        }
    }
}

/// The semantic error kinds enumerated in spec.md §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownOption,
    MissingValue,
    InvalidValue,
    DuplicateOption,
    DuplicateDependency,
    MissingArgument,
    UnresolvedDependency,
    CircularDependency,
    FactoryError,
    NoBranch,
    UnknownCommand,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::UnknownOption => "unknown-option",
            ErrorKind::MissingValue => "missing-value",
            ErrorKind::InvalidValue => "invalid-value",
            ErrorKind::DuplicateOption => "duplicate-option",
            ErrorKind::DuplicateDependency => "duplicate-dependency",
            ErrorKind::MissingArgument => "missing-argument",
            ErrorKind::UnresolvedDependency => "unresolved-dependency",
            ErrorKind::CircularDependency => "circular-dependency",
            ErrorKind::FactoryError => "factory-error",
            ErrorKind::NoBranch => "no-branch",
            ErrorKind::UnknownCommand => "unknown-command",
        };
        write!(f, "{s}")
    }
}

/// A single structured error: a semantic `kind` plus the ordered terms that explain
/// it. `Error`s accumulate into [`Errors`] at construct boundaries (`object`,
/// `tuple`) rather than being concatenated into strings.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub terms: Vec<Term>,
}

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind, terms: Vec<Term>) -> Self {
        Error { kind, terms }
    }

    #[must_use]
    pub fn unknown_option(token: &Token) -> Self {
        Error::new(
            ErrorKind::UnknownOption,
            vec![
                Term::Text("unrecognized option".into()),
                Term::Value(token.0.clone()),
            ],
        )
    }

    #[must_use]
    pub fn missing_value(name: &str) -> Self {
        Error::new(
            ErrorKind::MissingValue,
            vec![
                Term::OptionName(name.to_string()),
                Term::Text("requires a value".into()),
            ],
        )
    }

    #[must_use]
    pub fn invalid_value(token: &Token, metavar: &str, accepted: Option<Vec<String>>) -> Self {
        let mut terms = vec![
            Term::Value(token.0.clone()),
            Term::Text("is not a valid".into()),
            Term::Metavar(metavar.to_string()),
        ];
        if let Some(accepted) = accepted {
            terms.push(Term::Text("expected one of".into()));
            terms.push(Term::ValuesList(accepted));
        }
        Error::new(ErrorKind::InvalidValue, terms)
    }

    #[must_use]
    pub fn duplicate_option(name: &str) -> Self {
        Error::new(
            ErrorKind::DuplicateOption,
            vec![
                Term::OptionName(name.to_string()),
                Term::Text("may not be given more than once".into()),
            ],
        )
    }

    #[must_use]
    pub fn duplicate_dependency() -> Self {
        Error::new(
            ErrorKind::DuplicateDependency,
            vec![Term::Text(
                "dependency bound by more than one sibling".into(),
            )],
        )
    }

    #[must_use]
    pub fn missing_argument(name: &str) -> Self {
        Error::new(
            ErrorKind::MissingArgument,
            vec![
                Term::Text("missing required".into()),
                Term::OptionName(name.to_string()),
            ],
        )
    }

    #[must_use]
    pub fn unresolved_dependency() -> Self {
        Error::new(
            ErrorKind::UnresolvedDependency,
            vec![Term::Text(
                "a deferred value never had its dependency resolved".into(),
            )],
        )
    }

    #[must_use]
    pub fn circular_dependency() -> Self {
        Error::new(
            ErrorKind::CircularDependency,
            vec![Term::Text("dependency graph contains a cycle".into())],
        )
    }

    #[must_use]
    pub fn factory_error(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::FactoryError, vec![Term::Text(message.into())])
    }

    #[must_use]
    pub fn no_branch(errors: Vec<Error>) -> Self {
        let mut terms = vec![Term::Text("no alternative matched".into())];
        for e in errors {
            terms.extend(e.terms);
        }
        Error::new(ErrorKind::NoBranch, terms)
    }

    #[must_use]
    pub fn unknown_command(token: &Token) -> Self {
        Error::new(
            ErrorKind::UnknownCommand,
            vec![
                Term::Text("unrecognized command".into()),
                Term::Value(token.0.clone()),
            ],
        )
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind)?;
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

/// An ordered, non-empty-in-practice collection of [`Error`]s. `object`/`tuple`
/// completion accumulates one per unsatisfied or failing child, preserving
/// declaration order (spec.md §7 propagation policy).
#[derive(Debug, Clone, Default)]
pub struct Errors(pub Vec<Error>);

impl Errors {
    #[must_use]
    pub fn new() -> Self {
        Errors(Vec::new())
    }

    pub fn push(&mut self, err: Error) {
        self.0.push(err);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flattens into one [`Error`], keeping declaration order of the terms.
    #[must_use]
    pub fn into_single(mut self) -> Error {
        if self.0.len() == 1 {
            #[allow(clippy::unwrap_used)]
            self.0.pop().unwrap()
        } else {
            let kind = self
                .0
                .first()
                .map_or(ErrorKind::MissingArgument, |e| e.kind);
            let mut terms = Vec::new();
            for e in self.0 {
                terms.extend(e.terms);
            }
            Error::new(kind, terms)
        }
    }
}

impl From<Error> for Errors {
    fn from(e: Error) -> Self {
        Errors(vec![e])
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}

/// Crate-wide result alias, the same shape as unsynn's `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
