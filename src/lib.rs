//! Placefill - placeholder resolution for acceptance-test tooling
//!
//! This library scans text for two placeholder families and rewrites it by
//! substituting resolved values, recursively, until nothing more resolves:
//!
//! - *Variable references*: `${name}` or `${name:default}`, looked up in a
//!   scope-layered static store or computed by named dynamic providers.
//! - *Expression invocations*: `#{name(argument)}`, dispatched to a chain
//!   of named processors.
//!
//! Resolution is innermost-first, tolerant by design (anything it cannot
//! interpret stays in the output verbatim), and bounded so self-referential
//! inputs terminate.
//!
//! # Example
//!
//! ```rust
//! use placefill::{string_processors, Resolver, Value};
//!
//! let resolver = Resolver::new()
//!     .with_variable("name", Value::from("world"))
//!     .with_processors(string_processors());
//!
//! let greeting = resolver.resolve_to_string("hello ${name}").unwrap();
//! assert_eq!(greeting, "hello world");
//!
//! let shout = resolver.resolve_to_string("#{toUpperCase(${name})}").unwrap();
//! assert_eq!(shout, "WORLD");
//!
//! // Unresolvable placeholders round-trip unchanged
//! assert_eq!(resolver.resolve_to_string("${missing}").unwrap(), "${missing}");
//! ```

pub mod config;
pub mod processors;
pub mod resolve;
pub mod scanner;
pub mod value;

pub use config::{ConfigError, VariablesFile};
pub use processors::string_processors;
pub use resolve::{
    resolve_table, DynamicProvider, ExpressionProcessor, HandlerError, ResolveError, Resolver,
    VariableScope, VariableStore, MAX_RESOLUTION_PASSES,
};
pub use scanner::{next_placeholder, Placeholder, PlaceholderKind};
pub use value::Value;
