//! Type coercion registry.
//!
//! Flag values and positional arguments arrive as raw strings. The
//! [`TypeRegistry`] maps a type name from the schema (`number`, `integer[]`,
//! a custom `color`, ...) to a handler that turns the string into a typed
//! [`Value`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Number, Value};

use crate::error::{ParseError, Result};
use crate::suggest::suggest;

/// Context handed to a type handler: where the value came from and what it is.
///
/// `label` is `"Option"` for flag values (with `name` like `--flag`) and
/// `"Argument"` for positional values (with the argument name).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo<'a> {
    pub label: &'a str,
    pub name: &'a str,
    pub type_name: &'a str,
    pub value: &'a str,
}

impl<'a> TypeInfo<'a> {
    /// Context for a flag value.
    pub fn option(name: &'a str, type_name: &'a str, value: &'a str) -> Self {
        Self {
            label: "Option",
            name,
            type_name,
            value,
        }
    }

    /// Context for a positional value.
    pub fn argument(name: &'a str, type_name: &'a str, value: &'a str) -> Self {
        Self {
            label: "Argument",
            name,
            type_name,
            value,
        }
    }

    /// Same context with a different type name and raw value.
    pub fn with(self, type_name: &'a str, value: &'a str) -> Self {
        Self {
            type_name,
            value,
            ..self
        }
    }

    /// The standard `must be a valid` message for this value, for custom
    /// handlers that want to reuse it as their rejection reason.
    pub fn invalid_message(&self) -> String {
        format!(
            "{} \"{}\" must be a valid \"{}\", but got \"{}\".",
            self.label, self.name, self.type_name, self.value
        )
    }

    fn invalid_type(&self) -> ParseError {
        ParseError::InvalidType {
            label: self.label.to_string(),
            name: self.name.to_string(),
            type_name: self.type_name.to_string(),
            value: self.value.to_string(),
        }
    }

    fn invalid_value(&self, reason: String) -> ParseError {
        ParseError::InvalidValue {
            label: self.label.to_string(),
            name: self.name.to_string(),
            type_name: self.type_name.to_string(),
            value: self.value.to_string(),
            reason,
        }
    }
}

/// Built-in value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinType {
    /// Any string, unchanged.
    String,
    /// Any finite numeric literal.
    Number,
    /// Integral numeric literal.
    Integer,
    /// `true`/`false`/`1`/`0`.
    Boolean,
    /// File path, passed through without touching the filesystem.
    File,
    /// Path, passed through without touching the filesystem.
    Path,
}

impl BuiltinType {
    /// Every built-in with its registry name.
    pub const ALL: [(&'static str, BuiltinType); 6] = [
        ("string", BuiltinType::String),
        ("number", BuiltinType::Number),
        ("integer", BuiltinType::Integer),
        ("boolean", BuiltinType::Boolean),
        ("file", BuiltinType::File),
        ("path", BuiltinType::Path),
    ];

    /// Coerces a raw string, or `None` if it is not a valid value.
    pub fn coerce(self, raw: &str) -> Option<Value> {
        match self {
            Self::String | Self::File | Self::Path => Some(Value::String(raw.to_string())),
            Self::Number => parse_number(raw).and_then(number_value),
            Self::Integer => parse_number(raw)
                .filter(|n| n.fract() == 0.0)
                .and_then(number_value),
            Self::Boolean => parse_boolean(raw).map(Value::Bool),
        }
    }

    /// Returns `true` for number-like types, whose slots accept `-1` style
    /// tokens as values.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }
}

type CustomFn = dyn Fn(&TypeInfo<'_>) -> std::result::Result<Value, String> + Send + Sync;

/// A registered type handler.
#[derive(Clone)]
pub enum TypeHandler {
    Builtin(BuiltinType),
    /// Custom closure; an `Err` carries the rejection reason.
    Custom(Arc<CustomFn>),
}

impl TypeHandler {
    /// Wraps a custom closure.
    pub fn custom(
        handler: impl Fn(&TypeInfo<'_>) -> std::result::Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self::Custom(Arc::new(handler))
    }
}

impl fmt::Debug for TypeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(builtin) => f.debug_tuple("Builtin").field(builtin).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Registry of named value types.
///
/// A new registry holds the built-ins; custom types are added with
/// [`register`](Self::register) and may replace a built-in of the same name.
///
/// # Examples
///
/// ```
/// use command_args_parser::{TypeHandler, TypeInfo, TypeRegistry};
/// use serde_json::json;
///
/// let mut types = TypeRegistry::new();
/// types.register(
///     "color",
///     TypeHandler::custom(|info: &TypeInfo<'_>| match info.value {
///         "red" | "blue" | "yellow" => Ok(json!(info.value)),
///         _ => Err(info.invalid_message()),
///     }),
/// );
///
/// let red = types.resolve(&TypeInfo::argument("color", "color", "red")).unwrap();
/// assert_eq!(red, json!("red"));
///
/// let list = types.resolve(&TypeInfo::option("--ids", "integer[]", "1,2,3")).unwrap();
/// assert_eq!(list, json!([1, 2, 3]));
///
/// let err = types.resolve(&TypeInfo::argument("bar", "number", "xyz")).unwrap_err();
/// assert_eq!(err.to_string(), "Argument \"bar\" must be of type \"number\", but got \"xyz\".");
/// ```
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeHandler>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry holding the built-in types.
    pub fn new() -> Self {
        let types = BuiltinType::ALL
            .iter()
            .map(|(name, builtin)| (name.to_string(), TypeHandler::Builtin(*builtin)))
            .collect();
        Self { types }
    }

    /// Registers (or replaces) a type.
    pub fn register(&mut self, name: &str, handler: TypeHandler) -> &mut Self {
        self.types.insert(name.to_string(), handler);
        self
    }

    /// Builder form of [`register`](Self::register) for custom closures.
    pub fn with_type(
        mut self,
        name: &str,
        handler: impl Fn(&TypeInfo<'_>) -> std::result::Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.register(name, TypeHandler::custom(handler));
        self
    }

    /// Returns `true` if `name` (without a `[]` suffix) is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name.strip_suffix("[]").unwrap_or(name))
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /// Returns `true` if the type is a numeric built-in.
    pub fn is_numeric(&self, name: &str) -> bool {
        matches!(
            self.types.get(name.strip_suffix("[]").unwrap_or(name)),
            Some(TypeHandler::Builtin(builtin)) if builtin.is_numeric()
        )
    }

    /// Coerces `info.value` according to `info.type_name`.
    ///
    /// A `T[]` type splits the value on `,` and yields an array.
    pub fn resolve(&self, info: &TypeInfo<'_>) -> Result<Value> {
        match info.type_name.strip_suffix("[]") {
            Some(element) => self.resolve_list(&info.with(element, info.value), ","),
            None => self.resolve_scalar(info),
        }
    }

    /// Splits `info.value` on `separator` and coerces every element with
    /// `info.type_name` (which must not carry a `[]` suffix).
    pub fn resolve_list(&self, info: &TypeInfo<'_>, separator: &str) -> Result<Value> {
        info.value
            .split(separator)
            .map(|element| self.resolve_scalar(&info.with(info.type_name, element)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn resolve_scalar(&self, info: &TypeInfo<'_>) -> Result<Value> {
        match self.types.get(info.type_name) {
            Some(TypeHandler::Builtin(builtin)) => {
                builtin.coerce(info.value).ok_or_else(|| info.invalid_type())
            }
            Some(TypeHandler::Custom(handler)) => {
                handler(info).map_err(|reason| info.invalid_value(reason))
            }
            None => {
                let names = self.names();
                Err(ParseError::UnknownType {
                    type_name: info.type_name.to_string(),
                    suggestion: suggest(info.type_name, &names).map(str::to_string),
                })
            }
        }
    }
}

/// Parses decimal, exponent and `0x`/`0o`/`0b` literals, with an optional sign.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let radix = match unsigned.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &unsigned[2..];
        if digits.starts_with(['+', '-']) {
            return None;
        }
        let magnitude = i64::from_str_radix(digits, radix).ok()? as f64;
        return Some(if negative { -magnitude } else { magnitude });
    }

    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Integral numbers within the exactly representable range become integers.
fn number_value(n: f64) -> Option<Value> {
    const MAX_SAFE: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() < MAX_SAFE {
        Some(Value::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number)
    }
}

fn parse_boolean(raw: &str) -> Option<bool> {
    match raw {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn resolve(type_name: &str, value: &str) -> Result<Value> {
        TypeRegistry::new().resolve(&TypeInfo::option("--flag", type_name, value))
    }

    #[test]
    fn test_builtin_number() {
        assert_eq!(resolve("number", "300").unwrap(), json!(300));
        assert_eq!(resolve("number", "-1.5").unwrap(), json!(-1.5));
        assert_eq!(resolve("number", "1e3").unwrap(), json!(1000));
        assert!(resolve("number", "NaN").is_err());
        assert!(resolve("number", "inf").is_err());
        assert!(resolve("number", "").is_err());
        assert_eq!(resolve("number", "0x10").unwrap(), json!(16));
        assert_eq!(resolve("number", "0o17").unwrap(), json!(15));
        assert_eq!(resolve("number", "0b101").unwrap(), json!(5));
        assert_eq!(resolve("number", "-0xff").unwrap(), json!(-255));
        assert!(resolve("number", "0x").is_err());
        assert!(resolve("number", "0x-1").is_err());
        assert_eq!(resolve("integer", "0x1F").unwrap(), json!(31));
    }

    #[test]
    fn test_builtin_integer_rejects_fraction() {
        assert_eq!(resolve("integer", "42").unwrap(), json!(42));
        assert_eq!(
            resolve("integer", "4.2").unwrap_err(),
            ParseError::InvalidType {
                label: "Option".to_string(),
                name: "--flag".to_string(),
                type_name: "integer".to_string(),
                value: "4.2".to_string(),
            }
        );
    }

    #[test]
    fn test_builtin_boolean() {
        assert_eq!(resolve("boolean", "1").unwrap(), json!(true));
        assert_eq!(resolve("boolean", "false").unwrap(), json!(false));
        assert!(resolve("boolean", "yes").is_err());
    }

    #[test]
    fn test_file_is_passthrough() {
        assert_eq!(
            resolve("file", "does/not/exist.txt").unwrap(),
            json!("does/not/exist.txt")
        );
    }

    #[test]
    fn test_list_error_names_element_type() {
        let err = TypeRegistry::new()
            .resolve(&TypeInfo::argument("list", "number[]", "1,2,3,four"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Argument \"list\" must be of type \"number\", but got \"four\"."
        );
    }

    #[test]
    fn test_custom_separator() {
        let value = TypeRegistry::new()
            .resolve_list(&TypeInfo::option("--other-list", "string", "1 2 3"), " ")
            .unwrap();
        assert_eq!(value, json!(["1", "2", "3"]));
    }

    #[test]
    fn test_unknown_type_suggests() {
        let err = resolve("nubmer", "1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown type \"nubmer\". Did you mean type \"number\"?"
        );
    }

    #[test]
    fn test_custom_type_failure_keeps_reason() {
        let types = TypeRegistry::new().with_type("upper", |info: &TypeInfo<'_>| {
            if info.value.is_empty() {
                Err("empty".to_string())
            } else {
                Ok(json!(info.value.to_uppercase()))
            }
        });

        assert_eq!(
            types.resolve(&TypeInfo::option("--name", "upper", "abc")).unwrap(),
            json!("ABC")
        );
        match types.resolve(&TypeInfo::option("--name", "upper", "")).unwrap_err() {
            ParseError::InvalidValue { reason, .. } => assert_eq!(reason, "empty"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_registry_metadata() {
        let types = TypeRegistry::new();
        assert!(types.contains("integer[]"));
        assert!(types.is_numeric("number"));
        assert!(!types.is_numeric("string"));
        assert_eq!(types.names().len(), BuiltinType::ALL.len());
    }
}
