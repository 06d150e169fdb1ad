//! Variable reference resolution
//!
//! A reference body is `name` or `name:default`; the name may itself contain
//! nested references, which resolve first. Values come from the scoped
//! static store or, failing that, from named dynamic providers.

use std::collections::HashMap;
use std::fmt;

use crate::scanner::{next_placeholder, PlaceholderKind};
use crate::value::Value;

/// Lifetime of a variable binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableScope {
    /// Lives for the whole run
    Global,
    /// Cleared when the story finishes
    Story,
    /// Cleared when the scenario finishes
    Scenario,
    /// Lives in the innermost step frame
    Step,
}

/// Scope-layered static value source
///
/// Lookup walks the innermost step frame outwards: step frames (newest
/// first), then scenario, story, and global bindings. Keys may address into
/// structured values with `name[index]` and `name.key` paths; an exact-key
/// binding always wins over the compound interpretation.
#[derive(Debug, Default)]
pub struct VariableStore {
    global: HashMap<String, Value>,
    story: HashMap<String, Value>,
    scenario: HashMap<String, Value>,
    step_frames: Vec<HashMap<String, Value>>,
}

impl VariableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable in the given scope
    ///
    /// A `Step` binding lands in the innermost frame, opening one if none
    /// has been pushed yet.
    pub fn set(&mut self, scope: VariableScope, name: impl Into<String>, value: Value) {
        let layer = match scope {
            VariableScope::Global => &mut self.global,
            VariableScope::Story => &mut self.story,
            VariableScope::Scenario => &mut self.scenario,
            VariableScope::Step => {
                if self.step_frames.is_empty() {
                    self.step_frames.push(HashMap::new());
                }
                self.step_frames.last_mut().expect("frame was just pushed")
            }
        };
        layer.insert(name.into(), value);
    }

    /// Look up a key, innermost scope first
    pub fn get(&self, key: &str) -> Option<Value> {
        self.layers()
            .find_map(|layer| lookup_in(layer, key))
            .cloned()
    }

    /// Open a fresh step frame
    pub fn push_step_frame(&mut self) {
        self.step_frames.push(HashMap::new());
    }

    /// Drop the innermost step frame, if any
    pub fn pop_step_frame(&mut self) {
        self.step_frames.pop();
    }

    /// Drop all scenario-scoped bindings
    pub fn clear_scenario(&mut self) {
        self.scenario.clear();
    }

    /// Drop all story-scoped bindings
    pub fn clear_story(&mut self) {
        self.story.clear();
    }

    fn layers(&self) -> impl Iterator<Item = &HashMap<String, Value>> {
        self.step_frames
            .iter()
            .rev()
            .chain(std::iter::once(&self.scenario))
            .chain(std::iter::once(&self.story))
            .chain(std::iter::once(&self.global))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for VariableStore {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (name, value) in iter {
            store.set(VariableScope::Global, name, value);
        }
        store
    }
}

/// A named, lazily-computed value source
///
/// Invoked on each lookup; yields either a value or a diagnostic message.
/// The provider is addressable by its registered name or the equivalent
/// camelCase/kebab-case spelling of it.
pub struct DynamicProvider {
    name: String,
    provider: Box<dyn Fn() -> Result<Value, String> + Send + Sync>,
}

impl DynamicProvider {
    /// Create a provider from its primary name and computation
    pub fn new(
        name: impl Into<String>,
        provider: impl Fn() -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            provider: Box::new(provider),
        }
    }

    /// The primary name this provider was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, requested: &str) -> bool {
        self.name == requested || kebab_case(&self.name) == kebab_case(requested)
    }
}

impl fmt::Debug for DynamicProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicProvider")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Resolve every variable reference in `text`, innermost-first.
///
/// References that resolve to nothing round-trip into the output (with any
/// nested parts still resolved); a non-textual value whose reference spans
/// the whole text is returned typed. Dynamic providers are skipped under
/// `dry_run`; static substitution still happens.
pub(crate) fn resolve_variables(
    text: &str,
    store: &VariableStore,
    providers: &[DynamicProvider],
    dry_run: bool,
) -> Value {
    let mut out = String::new();
    let mut pos = 0;
    while let Some(ph) = next_placeholder(text, pos, PlaceholderKind::Variable) {
        out.push_str(&text[pos..ph.span.start]);
        // The reference body may itself contain references; the lookup name
        // is the fully-resolved body
        let name = resolve_variables(&ph.body, store, providers, dry_run).into_text();
        let (key, default) = split_reference(&name);
        let value = store.get(key).or_else(|| {
            if dry_run {
                None
            } else {
                resolve_dynamic(providers, key)
            }
        });
        match value {
            Some(value) => {
                if ph.covers(text) && !value.is_text() {
                    return value;
                }
                out.push_str(&value.into_text());
            }
            None => match default {
                Some(default) => out.push_str(default),
                None => {
                    // Never silently dropped: the reference survives verbatim
                    out.push_str("${");
                    out.push_str(&name);
                    out.push('}');
                }
            },
        }
        pos = ph.span.end;
    }
    out.push_str(&text[pos..]);
    Value::Text(out)
}

/// Split a reference body on the first colon into key and optional default
fn split_reference(name: &str) -> (&str, Option<&str>) {
    match name.split_once(':') {
        Some((key, default)) => (key, Some(default)),
        None => (name, None),
    }
}

fn resolve_dynamic(providers: &[DynamicProvider], key: &str) -> Option<Value> {
    let provider = providers.iter().find(|p| p.matches(key))?;
    match (provider.provider)() {
        Ok(value) => Some(value),
        Err(diagnostic) => {
            tracing::error!(
                "unable to resolve dynamic variable ${{{}}}: {}",
                key,
                diagnostic
            );
            None
        }
    }
}

/// `dynamicVariableKey` -> `dynamic-variable-key`; hyphenated names map to
/// themselves
fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// One step along a compound key path
enum Accessor {
    Index(usize),
    Field(String),
}

/// Parse `base[0].inner` into the base name and accessor chain.
/// Returns None for keys without compound syntax.
fn parse_compound(key: &str) -> Option<(&str, Vec<Accessor>)> {
    let base_end = key.find(|c| c == '[' || c == '.')?;
    if base_end == 0 {
        return None;
    }
    let base = &key[..base_end];
    let mut accessors = Vec::new();
    let mut rest = &key[base_end..];
    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('[') {
            let close = stripped.find(']')?;
            let index = stripped[..close].parse().ok()?;
            accessors.push(Accessor::Index(index));
            rest = &stripped[close + 1..];
        } else if let Some(stripped) = rest.strip_prefix('.') {
            let end = stripped
                .find(|c| c == '[' || c == '.')
                .unwrap_or(stripped.len());
            if end == 0 {
                return None;
            }
            accessors.push(Accessor::Field(stripped[..end].to_string()));
            rest = &stripped[end..];
        } else {
            return None;
        }
    }
    Some((base, accessors))
}

fn lookup_in<'a>(layer: &'a HashMap<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = layer.get(key) {
        return Some(value);
    }
    let (base, accessors) = parse_compound(key)?;
    descend(layer.get(base)?, &accessors)
}

fn descend<'a>(value: &'a Value, accessors: &[Accessor]) -> Option<&'a Value> {
    let mut current = value;
    for accessor in accessors {
        current = match (accessor, current) {
            (Accessor::Index(i), Value::List(items)) => items.get(*i)?,
            (Accessor::Field(name), Value::Map(entries)) => entries.get(name)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn store_of(bindings: &[(&str, &str)]) -> VariableStore {
        bindings
            .iter()
            .map(|(name, value)| (name.to_string(), Value::from(*value)))
            .collect()
    }

    fn resolve(text: &str, store: &VariableStore) -> Value {
        resolve_variables(text, store, &[], false)
    }

    #[test]
    fn test_resolves_single_reference() {
        let store = store_of(&[("var", "value")]);
        assert_eq!(resolve("${var}", &store), Value::from("value"));
    }

    #[test]
    fn test_resolves_several_references() {
        let store = store_of(&[("var1", "2"), ("var2", "3")]);
        assert_eq!(
            resolve("varvar${var1}${var2}moremore", &store),
            Value::from("varvar23moremore")
        );
        assert_eq!(resolve("${var1}${var2}", &store), Value::from("23"));
    }

    #[test]
    fn test_unresolved_reference_round_trips() {
        let store = VariableStore::new();
        assert_eq!(resolve("${var}", &store), Value::from("${var}"));
    }

    #[test]
    fn test_nothing_to_resolve() {
        let store = store_of(&[("var", "value")]);
        for text in ["varvar", "${}", "$", "{}", "$}{"] {
            assert_eq!(resolve(text, &store), Value::from(text));
        }
    }

    #[test]
    fn test_default_used_when_unbound() {
        let store = VariableStore::new();
        assert_eq!(resolve("${name:def}", &store), Value::from("def"));
        assert_eq!(resolve("${name:}", &store), Value::from(""));
    }

    #[test]
    fn test_binding_beats_default() {
        let store = store_of(&[("name", "bound")]);
        assert_eq!(resolve("${name:def}", &store), Value::from("bound"));
    }

    #[test]
    fn test_default_splits_on_first_colon() {
        let store = VariableStore::new();
        assert_eq!(resolve("${name:a:b}", &store), Value::from("a:b"));
    }

    #[test]
    fn test_nested_reference_in_name() {
        let store = store_of(&[("varPartName", "value")]);
        // The inner reference resolves, the outer lookup still fails
        assert_eq!(
            resolve("${var${varPartName}}", &store),
            Value::from("${varvalue}")
        );

        let store = store_of(&[("var1", "2"), ("var2", "3")]);
        assert_eq!(resolve("${var${var1}}", &store), Value::from("3"));
        assert_eq!(
            resolve("${var${var1}} + ${var${var1}}", &store),
            Value::from("3 + 3")
        );
    }

    #[test]
    fn test_nested_reference_in_default() {
        let store = store_of(&[("var1", "2")]);
        assert_eq!(resolve("${var:${var1}}", &store), Value::from("2"));
    }

    #[test]
    fn test_non_text_value_embedded_is_coerced() {
        let mut store = VariableStore::new();
        store.set(VariableScope::Global, "var1", Value::Integer(1));
        store.set(VariableScope::Global, "var2", Value::Integer(2));
        assert_eq!(
            resolve("varvar${var1}${var2}moremore", &store),
            Value::from("varvar12moremore")
        );
    }

    #[test]
    fn test_whole_input_reference_keeps_type() {
        let mut store = VariableStore::new();
        store.set(
            VariableScope::Global,
            "answer",
            Value::List(vec![Value::Integer(42)]),
        );
        assert_eq!(
            resolve("${answer}", &store),
            Value::List(vec![Value::Integer(42)])
        );
    }

    #[test]
    fn test_surrounding_text_preserved() {
        let store = store_of(&[("var", "value")]);
        assert_eq!(
            resolve(r#"{"ids": ["${var}", "12-ce"]}"#, &store),
            Value::from(r#"{"ids": ["value", "12-ce"]}"#)
        );
        assert_eq!(
            resolve("[JAVA_HOME=${var}].*[^${PATH}].*", &store),
            Value::from("[JAVA_HOME=value].*[^${PATH}].*")
        );
    }

    #[test]
    fn test_expression_placeholders_left_alone() {
        let store = store_of(&[("var", "value")]);
        assert_eq!(
            resolve("${var}|#{expr}", &store),
            Value::from("value|#{expr}")
        );
        assert_eq!(
            resolve("#{eval(${var:0} + 1)}", &store),
            Value::from("#{eval(value + 1)}")
        );
    }

    #[test]
    fn test_dynamic_provider_by_name_and_alias() {
        let provider = DynamicProvider::new("dynamic-variable-key", || Ok(Value::from("2")));
        let store = VariableStore::new();
        let providers = [provider];
        assert_eq!(
            resolve_variables("${dynamic-variable-key}", &store, &providers, false),
            Value::from("2")
        );
        assert_eq!(
            resolve_variables("${dynamicVariableKey}", &store, &providers, false),
            Value::from("2")
        );
    }

    #[test]
    fn test_static_binding_shadows_provider() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let providers = [DynamicProvider::new("key", move || {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(Value::from("dynamic"))
        })];
        let store = store_of(&[("key", "static")]);
        assert_eq!(
            resolve_variables("${key}", &store, &providers, false),
            Value::from("static")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_provider_failure_leaves_reference() {
        let providers = [DynamicProvider::new("key", || Err("error".to_string()))];
        let store = VariableStore::new();
        assert_eq!(
            resolve_variables("${key}", &store, &providers, false),
            Value::from("${key}")
        );
    }

    #[test]
    fn test_no_provider_for_name() {
        let providers = [DynamicProvider::new("var2", || Ok(Value::from("2")))];
        let store = VariableStore::new();
        assert_eq!(
            resolve_variables("${var1}", &store, &providers, false),
            Value::from("${var1}")
        );
    }

    #[test]
    fn test_dry_run_skips_providers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let providers = [DynamicProvider::new("key", move || {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(Value::from("dynamic"))
        })];
        let store = store_of(&[("static", "value")]);
        assert_eq!(
            resolve_variables("${key} ${static}", &store, &providers, true),
            Value::from("${key} value")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_scope_precedence() {
        let mut store = VariableStore::new();
        store.set(VariableScope::Global, "name", Value::from("global"));
        store.set(VariableScope::Story, "name", Value::from("story"));
        store.set(VariableScope::Scenario, "name", Value::from("scenario"));
        assert_eq!(store.get("name"), Some(Value::from("scenario")));

        store.push_step_frame();
        store.set(VariableScope::Step, "name", Value::from("step"));
        assert_eq!(store.get("name"), Some(Value::from("step")));

        store.pop_step_frame();
        assert_eq!(store.get("name"), Some(Value::from("scenario")));

        store.clear_scenario();
        assert_eq!(store.get("name"), Some(Value::from("story")));

        store.clear_story();
        assert_eq!(store.get("name"), Some(Value::from("global")));
    }

    #[test]
    fn test_compound_list_lookup() {
        let mut store = VariableStore::new();
        store.set(
            VariableScope::Global,
            "users",
            Value::List(vec![Value::from("ada"), Value::from("grace")]),
        );
        assert_eq!(store.get("users[1]"), Some(Value::from("grace")));
        assert_eq!(store.get("users[5]"), None);
    }

    #[test]
    fn test_compound_map_lookup() {
        let mut inner = BTreeMap::new();
        inner.insert("name".to_string(), Value::from("ada"));
        let mut store = VariableStore::new();
        store.set(
            VariableScope::Global,
            "users",
            Value::List(vec![Value::Map(inner)]),
        );
        assert_eq!(store.get("users[0].name"), Some(Value::from("ada")));
        assert_eq!(store.get("users[0].age"), None);
    }

    #[test]
    fn test_exact_key_beats_compound_path() {
        let mut store = VariableStore::new();
        store.set(VariableScope::Global, "users[0]", Value::from("literal"));
        store.set(
            VariableScope::Global,
            "users",
            Value::List(vec![Value::from("indexed")]),
        );
        assert_eq!(store.get("users[0]"), Some(Value::from("literal")));
    }
}
