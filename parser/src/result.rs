//! Parse outcome type returned by flag-level and command-level parsing.

use serde::Serialize;
use serde_json::{Map, Value};

/// Outcome of a successful parse.
///
/// `flags` holds one entry per flag that was given or has a default, keyed
/// by the camelCase flag name. Dotted names (`bitrate.audio`) are expanded
/// into nested objects.
///
/// # Examples
///
/// ```
/// use command_args_core::FlagSpec;
/// use command_args_parser::{ParseOptions, parse_flags};
/// use serde_json::json;
///
/// let flags = [
///     FlagSpec::new("bitrate.audio").alias("b.a").with_type("number"),
///     FlagSpec::new("bitrate.video").alias("b.v").with_type("number"),
/// ];
/// let result = parse_flags(&["-b.a", "300", "-b.v", "900"], &flags, &ParseOptions::default()).unwrap();
///
/// assert_eq!(result.flags(), &json!({ "bitrate": { "audio": 300, "video": 900 } }));
/// assert_eq!(result.flag("bitrate.video"), Some(&json!(900)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    /// Resolved command path below the root; empty for flag-level parsing.
    pub command: Vec<String>,
    /// Typed flag values.
    pub flags: Value,
    /// Typed positional values; variadic values are flattened in.
    pub args: Vec<Value>,
    /// Raw tokens after `--`.
    pub literal: Vec<String>,
    /// Tokens not matched to a flag or argument.
    pub unknown: Vec<String>,
    /// Set when a standalone flag (such as `--help`) ended validation early.
    pub standalone: bool,
}

impl ParseResult {
    pub(crate) fn new(flat: Map<String, Value>) -> Self {
        Self {
            flags: Value::Object(nest(flat)),
            ..Default::default()
        }
    }

    /// The flag values as a JSON object.
    pub fn flags(&self) -> &Value {
        &self.flags
    }

    /// Looks up a flag value by result key; dots walk nested objects.
    pub fn flag(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.flags, |current, segment| current.get(segment))
    }
}

/// Expands dotted keys into nested objects.
pub(crate) fn nest(flat: Map<String, Value>) -> Map<String, Value> {
    let mut nested = Map::new();
    for (key, value) in flat {
        insert_nested(&mut nested, &key, value);
    }
    nested
}

fn insert_nested(target: &mut Map<String, Value>, key: &str, value: Value) {
    let Some((head, tail)) = key.split_once('.') else {
        target.insert(key.to_string(), value);
        return;
    };
    let entry = target
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    match entry {
        Value::Object(inner) => insert_nested(inner, tail, value),
        // a flat value already owns this segment; keep the dotted key as is
        _ => {
            target.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn flat(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_nest_dotted_keys() {
        let nested = nest(flat(json!({
            "bitrate.audio": 300,
            "bitrate.video": 900,
            "dryRun": true,
            "a.b.c": "deep"
        })));

        assert_eq!(
            Value::Object(nested),
            json!({
                "bitrate": { "audio": 300, "video": 900 },
                "dryRun": true,
                "a": { "b": { "c": "deep" } }
            })
        );
    }

    #[test]
    fn test_nest_keeps_dotted_key_on_collision() {
        let nested = nest(flat(json!({ "bitrate": 1, "bitrate.audio": 2 })));

        assert_eq!(
            Value::Object(nested),
            json!({ "bitrate": 1, "bitrate.audio": 2 })
        );
    }

    #[test]
    fn test_flag_lookup() {
        let result = ParseResult::new(flat(json!({ "a.b": 1, "c": "x" })));

        assert_eq!(result.flag("a.b"), Some(&json!(1)));
        assert_eq!(result.flag("c"), Some(&json!("x")));
        assert_eq!(result.flag("a.z"), None);
    }
}
