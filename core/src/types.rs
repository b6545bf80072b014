//! Schema type definitions for command-line argument trees.
//!
//! This module defines the declarative data model the parser consumes:
//! flags ([`FlagSpec`]), positional arguments ([`ArgumentSpec`]) and the
//! command tree ([`CommandNode`]). The types are designed for serialization
//! with [`serde`] so a whole tree can be loaded from a YAML or JSON document,
//! and they expose fluent builders for declaring schemas in code.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type name used when a flag or argument does not declare one.
pub const DEFAULT_VALUE_TYPE: &str = "string";

/// Default separator for list-typed values (`--list 1,2,3`).
pub const DEFAULT_SEPARATOR: &str = ",";

type ValueFn = dyn Fn(Value, Option<&Value>) -> Value + Send + Sync;

/// Post-processing transform applied to a flag value after coercion.
///
/// The handler receives the freshly coerced value and the value previously
/// stored under the same key (if the flag was repeated), and returns the
/// value to store. Handlers are not serialized.
///
/// # Examples
///
/// ```
/// use command_args_core::ValueHandler;
/// use serde_json::json;
///
/// let double = ValueHandler::new(|value, _previous| {
///     json!(value.as_i64().unwrap_or_default() * 2)
/// });
/// assert_eq!(double.apply(json!(21), None), json!(42));
/// ```
#[derive(Clone)]
pub struct ValueHandler(Arc<ValueFn>);

impl ValueHandler {
    /// Wraps a transform closure.
    pub fn new(handler: impl Fn(Value, Option<&Value>) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(handler))
    }

    /// Applies the transform.
    pub fn apply(&self, value: Value, previous: Option<&Value>) -> Value {
        (self.0)(value, previous)
    }
}

impl fmt::Debug for ValueHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueHandler(..)")
    }
}

/// Schema for a positional argument or for one value slot of a flag.
///
/// A slot is required (`<name>`) or optional (`[name]`), may be variadic
/// (`...name`, consuming every remaining value) and may be list-typed
/// (`number[]`, splitting one token on a separator).
///
/// # Examples
///
/// ```
/// use command_args_core::ArgumentSpec;
///
/// let input = ArgumentSpec::required("input", "file");
/// assert!(input.is_required());
/// assert_eq!(input.action(), "file");
///
/// let ids = ArgumentSpec::optional("ids", "integer[]");
/// assert!(ids.is_list());
/// assert_eq!(ids.element_type(), "integer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgumentSpec {
    /// Name of the argument (e.g., "file", "url")
    pub name: String,
    /// Registry key of the value type; a `[]` suffix marks a list
    #[serde(rename = "type")]
    pub value_type: String,
    /// Is this slot optional (`[name]`)?
    pub optional: bool,
    /// Does this slot consume all remaining values?
    pub variadic: bool,
    /// Does one token hold several separated values?
    pub list: bool,
    /// Shell completion action identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Description for help and completion output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for ArgumentSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            value_type: DEFAULT_VALUE_TYPE.to_string(),
            optional: false,
            variadic: false,
            list: false,
            action: None,
            description: None,
        }
    }
}

impl ArgumentSpec {
    /// Creates a required slot (`<name:type>`).
    pub fn required(name: &str, value_type: &str) -> Self {
        Self {
            name: name.to_string(),
            value_type: value_type.to_string(),
            ..Default::default()
        }
    }

    /// Creates an optional slot (`[name:type]`).
    pub fn optional(name: &str, value_type: &str) -> Self {
        Self {
            optional: true,
            ..Self::required(name, value_type)
        }
    }

    /// Marks the slot as variadic.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Marks the slot as list-typed.
    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    /// Sets the completion action identifier.
    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Returns `true` unless the slot is optional.
    pub fn is_required(&self) -> bool {
        !self.optional
    }

    /// Returns `true` if one token carries several separated values.
    pub fn is_list(&self) -> bool {
        self.list || self.value_type.ends_with("[]")
    }

    /// Type name of a single element, without the `[]` list suffix.
    pub fn element_type(&self) -> &str {
        self.value_type
            .strip_suffix("[]")
            .unwrap_or(&self.value_type)
    }

    /// Completion action identifier, falling back to the element type name.
    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or_else(|| self.element_type())
    }
}

/// Schema for a command flag (option).
///
/// A flag is identified by its kebab-case `name` plus any number of
/// `aliases`; both are stored without leading dashes. Single-character names
/// are written as `-x` on the command line, longer ones as `--name`.
///
/// A flag takes no value unless it declares a `value_type` (one implicit
/// slot) or explicit `args` slots (fixed arity, e.g. `<foo> <bar> <baz>`).
///
/// # Examples
///
/// ```
/// use command_args_core::FlagSpec;
/// use serde_json::json;
///
/// let verbose = FlagSpec::new("verbose").alias("v").global();
/// assert!(verbose.matches("-v"));
/// assert!(verbose.matches("--verbose"));
/// assert!(verbose.is_switch());
///
/// let level = FlagSpec::new("log-level")
///     .with_type("integer")
///     .with_default(json!(3));
/// assert_eq!(level.result_key(), "logLevel");
/// assert_eq!(level.display_name(), "--log-level");
/// assert_eq!(level.slots().len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagSpec {
    /// Canonical kebab-case name, may contain dot segments (`bitrate.audio`)
    pub name: String,
    /// Alternate short or long names
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Value type of the implicit single slot; `None` means a presence flag
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Explicit value slots, overriding `value_type`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgumentSpec>,
    /// May the implicit slot be omitted?
    pub optional_value: bool,
    /// Value injected when the flag is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Transform applied to every matched value
    #[serde(skip)]
    pub value: Option<ValueHandler>,
    /// Can this flag appear multiple times, collecting its values?
    pub collect: bool,
    /// Separator for list-typed slots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    /// Must this flag be present?
    pub required: bool,
    /// Must this flag be the only explicit flag (e.g. `--help`)?
    pub standalone: bool,
    /// Flags this conflicts with (mutually exclusive)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
    /// Flags this requires to also be present
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
    /// Is this flag inherited by descendant commands?
    pub global: bool,
    /// May this flag shadow an inherited global flag of the same name?
    #[serde(rename = "override")]
    pub overrides: bool,
    /// Hidden from outlines
    pub hidden: bool,
    /// Description from the schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FlagSpec {
    /// Creates a presence flag with the given canonical name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds an alias (without leading dashes).
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Sets the value type of the implicit single slot.
    pub fn with_type(mut self, value_type: &str) -> Self {
        self.value_type = Some(value_type.to_string());
        self
    }

    /// Allows the implicit slot to be omitted.
    pub fn optional_value(mut self) -> Self {
        self.optional_value = true;
        self
    }

    /// Appends an explicit value slot.
    pub fn with_arg(mut self, arg: ArgumentSpec) -> Self {
        self.args.push(arg);
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the value transform.
    pub fn with_value(
        mut self,
        handler: impl Fn(Value, Option<&Value>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.value = Some(ValueHandler::new(handler));
        self
    }

    /// Allows repeated occurrences, collecting values into a list.
    pub fn collect(mut self) -> Self {
        self.collect = true;
        self
    }

    /// Sets the list separator.
    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = Some(separator.to_string());
        self
    }

    /// Marks the flag as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the flag as standalone.
    pub fn standalone(mut self) -> Self {
        self.standalone = true;
        self
    }

    /// Adds mutually exclusive flags.
    pub fn conflicts_with(mut self, names: &[&str]) -> Self {
        self.conflicts.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Adds flags that must also be present.
    pub fn depends_on(mut self, names: &[&str]) -> Self {
        self.depends.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Makes the flag visible to descendant commands.
    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    /// Allows this flag to shadow an inherited global flag.
    pub fn overrides(mut self) -> Self {
        self.overrides = true;
        self
    }

    /// Hides the flag from outlines.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Checks if this flag matches a name or alias, with or without dashes.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_args_core::FlagSpec;
    ///
    /// let flag = FlagSpec::new("bitrate.audio").alias("b.a").alias("audio-bitrate");
    /// assert!(flag.matches("-b.a"));
    /// assert!(flag.matches("--bitrate.audio"));
    /// assert!(flag.matches("audio-bitrate"));
    /// assert!(!flag.matches("--bitrate"));
    /// ```
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim_start_matches('-');
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Returns `true` for `no-*` flags, which store `false` under the
    /// positive name.
    pub fn is_negation(&self) -> bool {
        self.name.starts_with("no-")
    }

    /// Name with a negation prefix removed.
    pub fn positive_name(&self) -> &str {
        self.name.strip_prefix("no-").unwrap_or(&self.name)
    }

    /// Key under which the value is stored in the parse result.
    pub fn result_key(&self) -> String {
        param_case_to_camel_case(self.positive_name())
    }

    /// Canonical name as typed on the command line (`-x` or `--name`).
    pub fn display_name(&self) -> String {
        flag_display(&self.name)
    }

    /// Value slots, synthesizing one from `value_type` when `args` is empty.
    ///
    /// Boolean-typed implicit slots are always optional so `--flag` alone
    /// means `true`.
    pub fn slots(&self) -> Cow<'_, [ArgumentSpec]> {
        if !self.args.is_empty() {
            return Cow::Borrowed(&self.args);
        }
        match &self.value_type {
            Some(value_type) => Cow::Owned(vec![ArgumentSpec {
                name: self.name.clone(),
                value_type: value_type.clone(),
                optional: self.optional_value || value_type == "boolean",
                ..Default::default()
            }]),
            None => Cow::Borrowed(&[]),
        }
    }

    /// Returns `true` if the flag never needs a value (presence flags and
    /// optional booleans). Only switches can be combined as `-xyz`.
    pub fn is_switch(&self) -> bool {
        let slots = self.slots();
        match slots.as_ref() {
            [] => true,
            [slot] => {
                slot.optional && !slot.variadic && !slot.is_list() && slot.value_type == "boolean"
            }
            _ => false,
        }
    }

    /// Returns `true` if the flag yields an array (several slots or a
    /// variadic slot).
    pub fn is_multi_value(&self) -> bool {
        let slots = self.slots();
        slots.len() > 1 || slots.iter().any(|s| s.variadic)
    }
}

/// A command in the tree: local flags, positional arguments and children.
///
/// The root node is the program itself. Children are looked up by name or
/// alias. Global flags declared on a node are inherited by all descendants
/// unless a descendant sets `no_globals`.
///
/// # Examples
///
/// ```
/// use command_args_core::{ArgumentSpec, CommandNode, FlagSpec};
///
/// let root = CommandNode::new("media")
///     .with_version("1.2.0")
///     .with_flag(FlagSpec::new("verbose").alias("v").global())
///     .with_command(
///         CommandNode::new("encode")
///             .with_alias("enc")
///             .with_flag(FlagSpec::new("bitrate").alias("b").with_type("integer"))
///             .with_argument(ArgumentSpec::required("input", "file")),
///     );
///
/// assert_eq!(root.command_names(), vec!["encode"]);
/// assert!(root.find_command("enc").is_some());
/// assert!(root.find_flag("-v").is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandNode {
    /// Name of the command
    pub name: String,
    /// Aliases for this command
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Short description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Version string; on the root it enables `-V, --version`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Flags declared on this command
    pub flags: Vec<FlagSpec>,
    /// Positional arguments
    pub arguments: Vec<ArgumentSpec>,
    /// Nested commands
    pub commands: Vec<CommandNode>,
    /// Block global flags inherited from ancestors (help stays reachable)
    pub no_globals: bool,
    /// Stop matching flags at the first positional token
    pub stop_early: bool,
    /// Skip required-option checks when no flag is given at all
    pub allow_empty: bool,
}

impl CommandNode {
    /// Creates a command with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets the version string.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Adds a flag.
    pub fn with_flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    /// Adds a positional argument.
    pub fn with_argument(mut self, arg: ArgumentSpec) -> Self {
        self.arguments.push(arg);
        self
    }

    /// Adds several positional arguments.
    pub fn with_arguments(mut self, args: impl IntoIterator<Item = ArgumentSpec>) -> Self {
        self.arguments.extend(args);
        self
    }

    /// Adds a nested command.
    pub fn with_command(mut self, command: CommandNode) -> Self {
        self.commands.push(command);
        self
    }

    /// Blocks inherited global flags.
    pub fn no_globals(mut self) -> Self {
        self.no_globals = true;
        self
    }

    /// Stops flag matching at the first positional token.
    pub fn stop_early(mut self) -> Self {
        self.stop_early = true;
        self
    }

    /// Sets whether an invocation without any flag skips required checks.
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Finds a direct child by name or alias.
    pub fn find_command(&self, name: &str) -> Option<&CommandNode> {
        self.commands
            .iter()
            .find(|c| c.name == name || c.aliases.iter().any(|a| a == name))
    }

    /// Finds a local flag by name or alias.
    pub fn find_flag(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.matches(name))
    }

    /// Gets all direct child names.
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Converts a kebab-case name into the camelCase result key.
///
/// Only a dash followed by a lowercase ASCII letter is folded; dots and
/// other characters are kept.
///
/// # Examples
///
/// ```
/// use command_args_core::param_case_to_camel_case;
///
/// assert_eq!(param_case_to_camel_case("script-arg1"), "scriptArg1");
/// assert_eq!(param_case_to_camel_case("bitrate.audio"), "bitrate.audio");
/// assert_eq!(param_case_to_camel_case("dry-run.max-depth"), "dryRun.maxDepth");
/// ```
pub fn param_case_to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '-' {
            if let Some(next) = chars.peek().copied().filter(char::is_ascii_lowercase) {
                out.push(next.to_ascii_uppercase());
                chars.next();
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Renders a flag name as typed on the command line.
///
/// # Examples
///
/// ```
/// use command_args_core::flag_display;
///
/// assert_eq!(flag_display("v"), "-v");
/// assert_eq!(flag_display("verbose"), "--verbose");
/// assert_eq!(flag_display("--already"), "--already");
/// ```
pub fn flag_display(name: &str) -> String {
    if name.starts_with('-') {
        name.to_string()
    } else if name.chars().count() > 1 {
        format!("--{name}")
    } else {
        format!("-{name}")
    }
}
