//! Fixpoint resolution over whole texts

use super::expressions::{resolve_expressions, ExpressionProcessor, ResolveError};
use super::variables::{resolve_variables, DynamicProvider, VariableScope, VariableStore};
use crate::value::Value;

/// Upper bound on alternating variable/expression passes over a text.
///
/// A resolved value may reintroduce placeholders, so resolution repeats
/// until the text stops changing. Realistic nesting settles within a few
/// passes; the bound exists to guarantee termination on self-referential
/// inputs. Hitting it returns the best-effort text, never an error.
pub const MAX_RESOLUTION_PASSES: usize = 32;

/// Placeholder resolution engine
///
/// Owns the caller-supplied value sources and processor chain and applies
/// them to texts: each pass substitutes variable references, then expression
/// invocations, and the loop runs to a fixpoint. The engine holds no mutable
/// state across calls, so a shared reference is usable from multiple threads
/// as long as the supplied providers and processors are.
#[derive(Debug)]
pub struct Resolver {
    store: VariableStore,
    providers: Vec<DynamicProvider>,
    processors: Vec<ExpressionProcessor>,
    dry_run: bool,
    max_passes: usize,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Create a resolver with no value sources or processors
    pub fn new() -> Self {
        Self {
            store: VariableStore::new(),
            providers: Vec::new(),
            processors: Vec::new(),
            dry_run: false,
            max_passes: MAX_RESOLUTION_PASSES,
        }
    }

    /// Replace the variable store wholesale
    pub fn with_store(mut self, store: VariableStore) -> Self {
        self.store = store;
        self
    }

    /// Bind a global variable
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.store.set(VariableScope::Global, name, value);
        self
    }

    /// Register a dynamic provider
    pub fn with_provider(mut self, provider: DynamicProvider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Append one expression processor to the chain
    pub fn with_processor(mut self, processor: ExpressionProcessor) -> Self {
        self.processors.push(processor);
        self
    }

    /// Append a batch of expression processors to the chain
    pub fn with_processors(mut self, processors: Vec<ExpressionProcessor>) -> Self {
        self.processors.extend(processors);
        self
    }

    /// Suppress dynamic-provider lookups and expression processing;
    /// static variable substitution still happens
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Override the resolution pass bound
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    /// The variable store backing this resolver
    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Mutable store access, for scope management between resolutions
    pub fn store_mut(&mut self) -> &mut VariableStore {
        &mut self.store
    }

    /// Resolve all placeholders in `text`.
    ///
    /// Returns a typed [`Value`] when the whole input was a single
    /// placeholder with a non-textual result; otherwise the (fully or
    /// partially) resolved text. The only error is a failing expression
    /// processor.
    pub fn resolve(&self, text: &str) -> Result<Value, ResolveError> {
        let mut current = text.to_string();
        for _ in 0..self.max_passes {
            let vars = resolve_variables(&current, &self.store, &self.providers, self.dry_run);
            let Value::Text(after_vars) = vars else {
                return Ok(vars);
            };
            let exprs = resolve_expressions(&after_vars, &self.processors, self.dry_run)?;
            let Value::Text(next) = exprs else {
                return Ok(exprs);
            };
            if next == current {
                return Ok(Value::Text(next));
            }
            current = next;
        }
        // Pass bound reached; hand back whatever resolved so far
        Ok(Value::Text(current))
    }

    /// Resolve and coerce the result to text
    pub fn resolve_to_string(&self, text: &str) -> Result<String, ResolveError> {
        self.resolve(text).map(Value::into_text)
    }

    /// Resolve a pipe-delimited table cell by cell; see [`super::table`]
    pub fn resolve_table(&self, table: &str) -> Result<String, ResolveError> {
        super::table::resolve_table(self, table)
    }
}
