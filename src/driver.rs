//! C5: the evaluation driver (spec.md §4.5). Drives a [`Combinator`] over a
//! token stream to completion, in sync or async mode, and exposes the
//! suggestion-query entry point completion generators build on.

use crate::combinator::{Combinator, Error};
use crate::dependency::Registry;
use crate::error::ErrorKind;
use crate::token::{tokenize, Cursor, Token};
use crate::value_parser::Mode;
use tracing::{debug, instrument, trace};

/// Outcome of a driven parse: either the typed result, or an error together
/// with whatever trailing pass-through tokens were collected before the
/// failure (renderers may still want to forward them).
#[derive(Debug, Clone)]
pub struct ParseError {
    pub error: Error,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ParseError {}

/// Runs one `try_consume`/`complete` pass of `parser` over `cursor`, looping
/// until the cursor is exhausted or a round makes no progress (spec.md §4.5
/// "Pass structure").
#[instrument(level = "debug", skip_all)]
async fn run_pass<C: Combinator>(parser: &C, cursor: &mut Cursor, registry: &mut Registry) -> Result<C::State, Error> {
    let mut state = parser.initial_state();
    loop {
        if cursor.is_exhausted() {
            break;
        }
        match parser.try_consume(&state, cursor, registry).await? {
            Some(next) => {
                trace!(position = cursor.position(), "round consumed tokens");
                state = next;
            }
            None => {
                trace!(position = cursor.position(), "no child matched, stopping");
                break;
            }
        }
    }
    Ok(state)
}

/// Synchronous entry point (spec.md §4.5 `parse`): errors immediately, before
/// running anything, if any part of `parser` reports [`Mode::Async`] — the
/// resulting future is then statically guaranteed to resolve on its first
/// poll and is driven to completion with `futures::executor::block_on`
/// without ever truly suspending.
#[instrument(level = "debug", skip(parser))]
pub fn parse<C, I, S>(parser: &C, args: I) -> Result<C::Output, ParseError>
where
    C: Combinator,
    I: IntoIterator<Item = S>,
    S: Into<Token>,
{
    if parser.mode() == Mode::Async {
        return Err(ParseError {
            error: Error::factory_error("parser contains an async sub-parser; use parse_async"),
        });
    }
    futures::executor::block_on(parse_async(parser, args))
}

/// Asynchronous entry point (spec.md §4.5 `parseAsync`).
#[instrument(level = "debug", skip(parser))]
pub async fn parse_async<C, I, S>(parser: &C, args: I) -> Result<C::Output, ParseError>
where
    C: Combinator,
    I: IntoIterator<Item = S>,
    S: Into<Token>,
{
    let tokens = tokenize(args);
    let mut cursor = Cursor::new(tokens);
    let mut registry = Registry::new();

    let state = run_pass(parser, &mut cursor, &mut registry)
        .await
        .map_err(|error| ParseError { error })?;

    if !cursor.is_exhausted() {
        let offending = cursor.peek().cloned().unwrap_or_else(|| Token(String::new()));
        debug!(token = %offending, "leftover token after pass");
        return Err(ParseError {
            error: Error::unknown_option(&offending),
        });
    }

    match parser.complete(state, &registry).await {
        Ok(value) => Ok(value),
        Err(error) => Err(ParseError { error }),
    }
}

/// Suggestion-only entry point (spec.md §6 "Suggestion protocol"): parses all
/// but the last token normally, then asks `parser` to suggest completions for
/// the final (possibly partial) token. The last token is never consumed as a
/// real value, matching the convention that it is always the in-progress
/// prefix.
#[instrument(level = "debug", skip(parser))]
pub async fn suggest<C, I, S>(parser: &C, args: I) -> Vec<crate::value_parser::Suggestion>
where
    C: Combinator,
    I: IntoIterator<Item = S>,
    S: Into<Token>,
{
    use futures::StreamExt;

    let mut tokens = tokenize(args);
    let Some(prefix_token) = tokens.pop() else {
        return Vec::new();
    };
    let mut cursor = Cursor::new(tokens);
    let mut registry = Registry::new();

    let Ok(state) = run_pass(parser, &mut cursor, &mut registry).await else {
        return Vec::new();
    };

    if !cursor.is_exhausted() {
        // Something already failed to match before the final token; nothing
        // sensible to suggest.
        return Vec::new();
    }

    let prefix = prefix_token.0;
    parser.suggest(&state, &prefix, &registry).collect().await
}

/// True if `error` indicates the failure was "nothing matched" rather than a
/// genuine value-level rejection — useful for collaborators distinguishing a
/// missing optional field from a malformed one.
#[must_use]
pub fn is_unsatisfied(error: &Error) -> bool {
    matches!(error.kind, ErrorKind::MissingArgument)
}
