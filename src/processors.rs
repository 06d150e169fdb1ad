//! Built-in expression processors
//!
//! A default chain covering the common string manipulations. Callers
//! compose it with their own processors:
//!
//! ```rust
//! use placefill::{string_processors, Resolver};
//!
//! let resolver = Resolver::new().with_processors(string_processors());
//! let out = resolver.resolve_to_string("#{capitalize(#{trim( word )})}").unwrap();
//! assert_eq!(out, "Word");
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::resolve::ExpressionProcessor;
use crate::value::Value;

/// The default string-manipulation processor chain
pub fn string_processors() -> Vec<ExpressionProcessor> {
    vec![
        ExpressionProcessor::unary("trim", |s| s.trim().to_string()),
        ExpressionProcessor::unary("toUpperCase", str::to_uppercase),
        ExpressionProcessor::unary("toLowerCase", str::to_lowercase),
        ExpressionProcessor::unary("capitalize", capitalize),
        ExpressionProcessor::unary("uncapitalize", uncapitalize),
        ExpressionProcessor::new("length", |s| {
            Ok(Some(Value::Integer(s.chars().count() as i64)))
        }),
        ExpressionProcessor::unary("encodeToBase64", |s| BASE64.encode(s.as_bytes())),
        ExpressionProcessor::new("decodeFromBase64", |s| {
            let bytes = BASE64.decode(s.as_bytes())?;
            Ok(Some(Value::Text(String::from_utf8_lossy(&bytes).into_owned())))
        }),
    ]
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn uncapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
