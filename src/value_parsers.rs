//! Minimal concrete [`ValueParser`] implementations. spec.md's Non-goals exclude a
//! *complete* value-parser library (strings/integers/choices/paths are named as
//! out of scope), but the engine's own test suite and the scenarios in spec.md §8
//! need something concrete to drive. Kept deliberately thin: format/suggest/metavar
//! only, no locale-aware formatting or filesystem traversal.

use crate::dependency::NotDerived;
use crate::error::Error;
use crate::token::Token;
use crate::value_parser::{ParseEffect, Suggestion, ValueParser};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;

/// Parses any token as an owned `String`. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringValueParser {
    metavar: &'static str,
}

impl StringValueParser {
    #[must_use]
    pub fn new(metavar: &'static str) -> Self {
        StringValueParser { metavar }
    }
}

impl ValueParser for StringValueParser {
    type Value = String;

    fn parse(&self, token: &Token) -> ParseEffect<String> {
        ParseEffect::Ready(Ok(token.0.clone()))
    }

    fn format(&self, value: &String) -> String {
        value.clone()
    }

    fn metavar(&self) -> &str {
        if self.metavar.is_empty() {
            "STRING"
        } else {
            self.metavar
        }
    }
}

impl NotDerived for StringValueParser {}

/// Parses a token with `FromStr`, for any `T: FromStr + Display`.
pub struct FromStrValueParser<T> {
    metavar: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FromStrValueParser<T> {
    #[must_use]
    pub fn new(metavar: &'static str) -> Self {
        FromStrValueParser {
            metavar,
            _marker: PhantomData,
        }
    }
}

impl<T> ValueParser for FromStrValueParser<T>
where
    T: FromStr + std::fmt::Display + Send + Sync + 'static,
{
    type Value = T;

    fn parse(&self, token: &Token) -> ParseEffect<T> {
        match token.0.parse::<T>() {
            Ok(v) => ParseEffect::Ready(Ok(v)),
            Err(_) => ParseEffect::Ready(Err(Error::invalid_value(token, self.metavar, None))),
        }
    }

    fn format(&self, value: &T) -> String {
        value.to_string()
    }

    fn metavar(&self) -> &str {
        self.metavar
    }
}

impl<T> NotDerived for FromStrValueParser<T> {}

/// `FromStrValueParser<i64>` with the conventional `NUMBER` metavar.
#[must_use]
pub fn int_value_parser() -> FromStrValueParser<i64> {
    FromStrValueParser::new("NUMBER")
}

/// Parses a token against a fixed, ordered set of accepted string choices.
#[derive(Debug, Clone)]
pub struct ChoiceValueParser {
    metavar: &'static str,
    choices: Vec<String>,
}

impl ChoiceValueParser {
    #[must_use]
    pub fn new(metavar: &'static str, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ChoiceValueParser {
            metavar,
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl ValueParser for ChoiceValueParser {
    type Value = String;

    fn parse(&self, token: &Token) -> ParseEffect<String> {
        if self.choices.iter().any(|c| c == &token.0) {
            ParseEffect::Ready(Ok(token.0.clone()))
        } else {
            ParseEffect::Ready(Err(Error::invalid_value(
                token,
                self.metavar,
                Some(self.choices.clone()),
            )))
        }
    }

    fn format(&self, value: &String) -> String {
        value.clone()
    }

    fn suggest(&self, prefix: &str) -> futures::stream::BoxStream<'static, Suggestion> {
        let matches: Vec<_> = self
            .choices
            .iter()
            .filter(|c| c.starts_with(prefix))
            .map(|c| Suggestion::Literal {
                text: c.clone(),
                description: None,
            })
            .collect();
        Box::pin(futures::stream::iter(matches))
    }

    fn metavar(&self) -> &str {
        self.metavar
    }
}

impl NotDerived for ChoiceValueParser {}

/// Parses a token as a filesystem path. Never rejects a token (path syntax is
/// permissive); existence/kind checks are a collaborator's concern.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathValueParser {
    metavar: &'static str,
}

impl PathValueParser {
    #[must_use]
    pub fn new(metavar: &'static str) -> Self {
        PathValueParser { metavar }
    }
}

impl ValueParser for PathValueParser {
    type Value = PathBuf;

    fn parse(&self, token: &Token) -> ParseEffect<PathBuf> {
        ParseEffect::Ready(Ok(PathBuf::from(&token.0)))
    }

    fn format(&self, value: &PathBuf) -> String {
        value.display().to_string()
    }

    fn suggest(&self, _prefix: &str) -> futures::stream::BoxStream<'static, Suggestion> {
        Box::pin(futures::stream::once(async {
            Suggestion::File {
                kind: crate::value_parser::FileKind::Either,
                extensions: Vec::new(),
            }
        }))
    }

    fn metavar(&self) -> &str {
        if self.metavar.is_empty() {
            "PATH"
        } else {
            self.metavar
        }
    }
}

impl NotDerived for PathValueParser {}
