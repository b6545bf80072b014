//! Error types for argument parsing.
//!
//! Every failure is terminal: a parse either yields a complete
//! [`ParseResult`](crate::ParseResult) or exactly one [`ParseError`]. The
//! `Display` output is the user-facing message, including a
//! ` Did you mean ...?` hint when a close candidate exists.

use thiserror::Error;

/// Errors that can occur while parsing tokens against a command tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A flag token matched no flag in scope.
    #[error("Unknown option \"{option}\".{}", hint("option", .suggestion))]
    UnknownOption {
        option: String,
        suggestion: Option<String>,
    },

    /// A positional token was expected to name a child command.
    #[error("Unknown command \"{command}\".{}", hint("command", .suggestion))]
    UnknownCommand {
        command: String,
        suggestion: Option<String>,
    },

    /// A flag or argument declares a type name the registry does not know.
    #[error("Unknown type \"{type_name}\".{}", hint("type", .suggestion))]
    UnknownType {
        type_name: String,
        suggestion: Option<String>,
    },

    /// A built-in type rejected a value.
    #[error("{label} \"{name}\" must be of type \"{type_name}\", but got \"{value}\".")]
    InvalidType {
        label: String,
        name: String,
        type_name: String,
        value: String,
    },

    /// A custom type handler rejected a value; `reason` is the handler's message.
    #[error("{label} \"{name}\" must be a valid \"{type_name}\", but got \"{value}\".")]
    InvalidValue {
        label: String,
        name: String,
        type_name: String,
        value: String,
        reason: String,
    },

    /// A flag with a required value slot got no value.
    #[error("Missing value for option \"{0}\".")]
    MissingOptionValue(String),

    /// A required flag is absent.
    #[error("Missing required option \"{0}\".")]
    MissingRequiredOption(String),

    /// Two mutually exclusive flags were given.
    #[error("Option \"{option}\" conflicts with option \"{conflicts_with}\".")]
    ConflictingOption {
        option: String,
        conflicts_with: String,
    },

    /// A flag was given without a flag it depends on.
    #[error("Option \"{option}\" depends on option \"{depends_on}\".")]
    DependingOption { option: String, depends_on: String },

    /// A standalone flag was combined with other flags.
    #[error("Option \"{0}\" cannot be combined with other options.")]
    OptionNotCombinable(String),

    /// Required positional arguments are missing, in declaration order.
    #[error("Missing argument(s): {}", .names.join(", "))]
    MissingArguments { names: Vec<String> },

    /// A non-collecting flag occurred more than once.
    #[error("Option \"{0}\" can only occur once, but was found several times.")]
    DuplicateOption(String),

    /// More positional tokens than argument slots.
    #[error("Too many arguments: {}", .tokens.join(" "))]
    TooManyArguments { tokens: Vec<String> },

    /// Positional tokens given to a command without arguments or children.
    #[error("No arguments allowed for command \"{0}\".")]
    NoArgumentsAllowed(String),
}

/// Convenience alias for results with [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;

fn hint(kind: &str, suggestion: &Option<String>) -> String {
    match suggestion {
        Some(candidate) => format!(" Did you mean {kind} \"{candidate}\"?"),
        None => String::new(),
    }
}
