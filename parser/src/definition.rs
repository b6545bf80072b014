//! Compact definition strings.
//!
//! Flags, arguments and commands can be declared with the usage syntax that
//! help output shows:
//!
//! - flags: `"-f, --foo <foo> <bar> <baz>"`, `"-t, --type [value:string]"`
//! - arguments: `"<input:string> [bar:number] [...list:number[]]"`
//! - commands: `"copy <src:file> <dst:path>"`
//!
//! An argument token is `<name>` (required) or `[name]` (optional), with an
//! optional `...` variadic prefix, `:type` (default `string`) and a second
//! `:action` segment naming the completion action.

use std::sync::LazyLock;

use command_args_core::{ArgumentSpec, CommandNode, FlagSpec, ValidationError, validate_arguments};
use regex::Regex;
use thiserror::Error;

static ARGUMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:<(\.\.\.)?([^:<>\[\]]+)(?::([^:<>\[\]]+(?:\[\])?))?(?::([^:<>\[\]]+))?>|\[(\.\.\.)?([^:<>\[\]]+)(?::([^:<>\[\]]+(?:\[\])?))?(?::([^:<>\[\]]+))?\])$")
        .expect("static regex must compile")
});

static FLAG_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-{1,2})([A-Za-z0-9][A-Za-z0-9_.-]*)$").expect("static regex must compile")
});

static COMMAND_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_:.-]*$").expect("static regex must compile"));

/// Errors raised while reading a definition string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The definition is empty or whitespace-only.
    #[error("definition cannot be empty")]
    Empty,
    /// A flag name token is malformed (e.g. `---x`).
    #[error("invalid flag name: {0}")]
    InvalidFlagName(String),
    /// An argument token is malformed (e.g. `<foo`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A command name is malformed.
    #[error("invalid command name: {0}")]
    InvalidCommandName(String),
    /// A flag definition declares value slots but no name.
    #[error("flag definition has no name: {0}")]
    MissingFlagName(String),
    /// A name token appears after the value slots.
    #[error("unexpected token after arguments: {0}")]
    UnexpectedToken(String),
    /// The argument list breaks an ordering rule.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Convenience alias for results with [`DefinitionError`].
pub type Result<T> = std::result::Result<T, DefinitionError>;

/// Parses a flag definition.
///
/// The first `--long` name becomes the canonical name (the first name when
/// there is no long one); the others become aliases. A single plain value
/// slot becomes the flag's type; several slots, or a variadic one, are kept
/// as explicit slots.
///
/// # Examples
///
/// ```
/// use command_args_parser::parse_flag_definition;
///
/// let flag = parse_flag_definition("-t, --type [value:string]").unwrap();
/// assert_eq!(flag.name, "type");
/// assert_eq!(flag.aliases, vec!["t"]);
/// assert_eq!(flag.value_type.as_deref(), Some("string"));
/// assert!(flag.optional_value);
///
/// let multi = parse_flag_definition("-f, --foo <foo> <bar> <baz>").unwrap();
/// assert_eq!(multi.args.len(), 3);
/// ```
pub fn parse_flag_definition(definition: &str) -> Result<FlagSpec> {
    let mut names: Vec<(bool, String)> = Vec::new();
    let mut args: Vec<ArgumentSpec> = Vec::new();

    for token in definition
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '|' | '='))
        .filter(|t| !t.is_empty())
    {
        if token.starts_with('<') || token.starts_with('[') {
            args.push(parse_argument(token)?);
            continue;
        }
        if !args.is_empty() {
            return Err(DefinitionError::UnexpectedToken(token.to_string()));
        }
        let caps = FLAG_NAME_RE
            .captures(token)
            .ok_or_else(|| DefinitionError::InvalidFlagName(token.to_string()))?;
        names.push((caps[1].len() == 2, caps[2].to_string()));
    }

    if names.is_empty() {
        return Err(if args.is_empty() {
            DefinitionError::Empty
        } else {
            DefinitionError::MissingFlagName(definition.trim().to_string())
        });
    }
    validate_arguments(&args)?;

    let canonical = names.iter().position(|(long, _)| *long).unwrap_or(0);
    let name = names.remove(canonical).1;
    let mut flag = FlagSpec::new(&name);
    flag.aliases = names.into_iter().map(|(_, alias)| alias).collect();

    let plain = matches!(
        args.as_slice(),
        [single] if !single.variadic && !single.list && single.action.is_none()
    );
    if plain {
        flag.value_type = Some(args[0].value_type.clone());
        flag.optional_value = args[0].optional;
    } else if !args.is_empty() {
        flag.args = args;
    }

    Ok(flag)
}

/// Parses a whitespace-separated list of argument tokens.
///
/// # Examples
///
/// ```
/// use command_args_parser::parse_arguments_definition;
///
/// let args = parse_arguments_definition("<foo:string> [bar:number] [...list:number[]]").unwrap();
/// assert_eq!(args.len(), 3);
/// assert!(args[1].optional);
/// assert!(args[2].variadic);
/// assert_eq!(args[2].element_type(), "number");
/// ```
pub fn parse_arguments_definition(definition: &str) -> Result<Vec<ArgumentSpec>> {
    let args = definition
        .split_whitespace()
        .map(parse_argument)
        .collect::<Result<Vec<_>>>()?;
    validate_arguments(&args)?;
    Ok(args)
}

/// Parses a command definition: a name (with optional `|alias` names)
/// followed by argument tokens.
///
/// # Examples
///
/// ```
/// use command_args_parser::parse_command_definition;
///
/// let command = parse_command_definition("copy|cp <src:file> <dst:path>").unwrap();
/// assert_eq!(command.name, "copy");
/// assert_eq!(command.aliases, vec!["cp"]);
/// assert_eq!(command.arguments.len(), 2);
/// ```
pub fn parse_command_definition(definition: &str) -> Result<CommandNode> {
    let trimmed = definition.trim();
    let (head, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    if head.is_empty() {
        return Err(DefinitionError::Empty);
    }

    let mut names = head.split('|');
    let name = names.next().unwrap_or_default();
    let mut command = CommandNode::new(name);
    for candidate in std::iter::once(name).chain(names.clone()) {
        if !COMMAND_NAME_RE.is_match(candidate) {
            return Err(DefinitionError::InvalidCommandName(candidate.to_string()));
        }
    }
    command.aliases = names.map(str::to_string).collect();
    command.arguments = parse_arguments_definition(rest)?;
    Ok(command)
}

fn parse_argument(token: &str) -> Result<ArgumentSpec> {
    let caps = ARGUMENT_RE
        .captures(token)
        .ok_or_else(|| DefinitionError::InvalidArgument(token.to_string()))?;
    let optional = token.starts_with('[');
    let group = |required: usize, optional_group: usize| {
        caps.get(if optional { optional_group } else { required })
            .map(|m| m.as_str())
    };

    let mut arg = ArgumentSpec {
        name: group(2, 6).unwrap_or_default().to_string(),
        optional,
        variadic: group(1, 5).is_some(),
        ..Default::default()
    };
    if let Some(value_type) = group(3, 7) {
        arg.value_type = value_type.to_string();
    }
    arg.action = group(4, 8).map(str::to_string);
    Ok(arg)
}
