//! Expression invocation resolution
//!
//! Invocations are `#{name(argument)}` (or a bare `#{name}`) dispatched to a
//! caller-supplied chain of named processors. Nested invocations resolve
//! innermost-first so an outer processor receives already-resolved argument
//! text. Unrecognized names are inert text, not errors.

use std::fmt;

use thiserror::Error;

use crate::scanner::{next_placeholder, PlaceholderKind};
use crate::value::Value;

/// Error type a processor handler may fail with
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A matched expression processor failed. This is the only failure mode
    /// that aborts an in-progress resolution; everything else degrades to
    /// verbatim text.
    #[error("failed to process expression '{invocation}': {source}")]
    Expression {
        invocation: String,
        source: HandlerError,
    },
}

/// A named expression handler
///
/// Processors are tried in registration order; the first whose name matches
/// and whose handler yields a value wins. A handler may decline with
/// `Ok(None)` to pass the invocation along the chain.
pub struct ExpressionProcessor {
    name: String,
    handler: Box<dyn Fn(&str) -> Result<Option<Value>, HandlerError> + Send + Sync>,
}

impl ExpressionProcessor {
    /// Create a processor from its invocation name and handler
    pub fn new(
        name: impl Into<String>,
        handler: impl Fn(&str) -> Result<Option<Value>, HandlerError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            handler: Box::new(handler),
        }
    }

    /// A processor over a plain string function that always succeeds
    pub fn unary(
        name: impl Into<String>,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, move |argument| Ok(Some(Value::Text(f(argument)))))
    }

    /// The invocation name this processor handles
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ExpressionProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionProcessor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Resolve every expression invocation in `text`, innermost-first.
///
/// A non-textual result whose invocation spans the whole text is returned
/// typed. In `dry_run` mode no handler is invoked and the text comes back
/// untouched. A handler error is logged with the offending invocation and
/// then propagated.
pub(crate) fn resolve_expressions(
    text: &str,
    processors: &[ExpressionProcessor],
    dry_run: bool,
) -> Result<Value, ResolveError> {
    if dry_run {
        return Ok(Value::Text(text.to_string()));
    }
    let mut out = String::new();
    let mut pos = 0;
    while let Some(ph) = next_placeholder(text, pos, PlaceholderKind::Expression) {
        out.push_str(&text[pos..ph.span.start]);
        // Inner invocations first, so the outer one sees their results
        let body = resolve_expressions(&ph.body, processors, false)?.into_text();
        match dispatch(&body, processors)? {
            Some(value) => {
                if ph.covers(text) && !value.is_text() {
                    return Ok(value);
                }
                out.push_str(&value.into_text());
            }
            None => {
                // Unsupported invocations stay in the output as written,
                // argument resolution included
                out.push_str("#{");
                out.push_str(&body);
                out.push('}');
            }
        }
        pos = ph.span.end;
    }
    out.push_str(&text[pos..]);
    Ok(Value::Text(out))
}

/// Offer the invocation to the chain; the first result wins
fn dispatch(body: &str, processors: &[ExpressionProcessor]) -> Result<Option<Value>, ResolveError> {
    let (name, argument) = parse_invocation(body);
    for processor in processors.iter().filter(|p| p.name == name) {
        match (processor.handler)(argument) {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => {}
            Err(source) => {
                let invocation = format!("#{{{}}}", body);
                tracing::error!("unable to process expression '{}': {}", invocation, source);
                return Err(ResolveError::Expression { invocation, source });
            }
        }
    }
    Ok(None)
}

/// Split an invocation body into name and argument text.
/// `name(arg)` and bare `name` are both valid; the latter gets an empty
/// argument.
fn parse_invocation(body: &str) -> (&str, &str) {
    if let Some(open) = body.find('(') {
        if body.ends_with(')') {
            return (&body[..open], &body[open + 1..body.len() - 1]);
        }
    }
    (body, "")
}
