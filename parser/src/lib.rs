//! Token matching, type coercion and validation for command-line argument
//! trees.
//!
//! This crate turns argv-like token lists into typed, validated values
//! according to the schema model of `command-args-core`.
//!
//! # Main entry points
//!
//! - [`Parser`]: parses a full command line against a [`CommandNode`] tree,
//!   descending into subcommands and binding positional arguments.
//! - [`parse_flags`]: parses a flat list of flags without commands or
//!   positional binding.
//! - [`ParserConfig`]: loads a command tree from a YAML or JSON document.
//! - [`parse_flag_definition`] and friends: build specs from compact
//!   definition strings such as `"-p, --port <port:integer>"`.
//!
//! # Example
//!
//! ```
//! use command_args_core::CommandNode;
//! use command_args_parser::{Parser, parse_arguments_definition, parse_flag_definition};
//! use serde_json::json;
//!
//! let root = CommandNode::new("serve")
//!     .with_flag(parse_flag_definition("-p, --port <port:integer>").unwrap())
//!     .with_flag(parse_flag_definition("--no-color").unwrap())
//!     .with_arguments(parse_arguments_definition("<dir:path> [...extra]").unwrap());
//!
//! let result = Parser::new(root)
//!     .parse(&["--no-color", "-p", "80", "public", "a", "b"])
//!     .unwrap();
//!
//! assert_eq!(result.flags, json!({ "color": false, "port": 80 }));
//! assert_eq!(result.args, vec![json!("public"), json!("a"), json!("b")]);
//! ```
//!
//! Errors carry the user-facing message in their `Display` output:
//!
//! ```
//! use command_args_core::CommandNode;
//! use command_args_parser::{Parser, parse_flag_definition};
//!
//! let root = CommandNode::new("app").with_flag(parse_flag_definition("--force").unwrap());
//! let err = Parser::new(root).parse(&["--forse"]).unwrap_err();
//!
//! assert_eq!(
//!     err.to_string(),
//!     "Unknown option \"--forse\". Did you mean option \"--force\"?"
//! );
//! ```
//!
//! [`CommandNode`]: command_args_core::CommandNode

mod config;
mod definition;
mod error;
mod matcher;
mod resolve;
mod result;
mod suggest;
mod types;
mod validate;

use command_args_core::FlagSpec;
use tracing::debug;

pub use config::{LoadError, ParseOptions, ParserConfig};
pub use definition::{
    DefinitionError, parse_arguments_definition, parse_command_definition, parse_flag_definition,
};
pub use error::{ParseError, Result};
pub use resolve::Parser;
pub use result::ParseResult;
pub use suggest::{did_you_mean, suggest};
pub use types::{BuiltinType, TypeHandler, TypeInfo, TypeRegistry};

use matcher::{FlagMatcher, FlagValues};
use validate::{Validated, validate_flags};

/// Parses a flat flag list with the built-in types.
///
/// Non-flag tokens are reported in [`ParseResult::unknown`]. With an empty
/// `flags` slice every flag is accepted as an optional string flag and no
/// validation runs.
///
/// # Examples
///
/// ```
/// use command_args_core::FlagSpec;
/// use command_args_parser::{ParseOptions, parse_flags};
/// use serde_json::json;
///
/// let flags = [
///     FlagSpec::new("all").alias("a"),
///     FlagSpec::new("depth").alias("d").with_type("integer").with_default(1),
/// ];
/// let result = parse_flags(&["-a", "src", "-d", "3"], &flags, &ParseOptions::default()).unwrap();
///
/// assert_eq!(result.flags, json!({ "all": true, "depth": 3 }));
/// assert_eq!(result.unknown, vec!["src"]);
/// ```
pub fn parse_flags<S: AsRef<str>>(
    tokens: &[S],
    flags: &[FlagSpec],
    options: &ParseOptions,
) -> Result<ParseResult> {
    parse_flags_with(tokens, flags, options, &TypeRegistry::new())
}

/// Parses a flat flag list with a caller-provided type registry.
pub fn parse_flags_with<S: AsRef<str>>(
    tokens: &[S],
    flags: &[FlagSpec],
    options: &ParseOptions,
    types: &TypeRegistry,
) -> Result<ParseResult> {
    let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
    let specs: Vec<&FlagSpec> = flags.iter().collect();
    let mut values = FlagValues::default();

    let leftovers = FlagMatcher::new(&specs, types).scan(&tokens, options.stop_early, &mut values)?;

    let outcome = if specs.is_empty() {
        Validated::Complete
    } else {
        validate_flags(&specs, &mut values, options.allow_empty)?
    };

    let mut result = ParseResult::new(values.values);
    result.unknown = leftovers.unknown;
    result.literal = leftovers.literal;
    result.standalone = outcome == Validated::Standalone;

    debug!(
        flags = specs.len(),
        unknown = result.unknown.len(),
        literal = result.literal.len(),
        "parsed flags"
    );
    Ok(result)
}
