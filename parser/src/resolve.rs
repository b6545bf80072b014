//! Command tree resolution.
//!
//! The [`Parser`] walks the tokens left to right with a path of command
//! nodes. Flags are matched against the flags visible at the current node,
//! non-flag tokens either descend into a child command or become positional
//! values of the node reached last.

use command_args_core::{
    ArgumentSpec, CommandNode, CommandOutline, DEFAULT_SEPARATOR, ValidationError,
    effective_flags, outline, validate_schema,
};
use serde_json::Value;
use tracing::debug;

use crate::config::ParserConfig;
use crate::error::{ParseError, Result};
use crate::matcher::{FlagMatcher, FlagValues, is_flag};
use crate::result::ParseResult;
use crate::suggest::suggest;
use crate::types::{TypeHandler, TypeInfo, TypeRegistry};
use crate::validate::{Validated, validate_flags};

/// Parses command lines against a command tree.
///
/// A parser owns its tree and a [`TypeRegistry`] shared by every command.
/// Parsing takes `&self`, so one parser can serve many threads.
///
/// # Examples
///
/// ```
/// use command_args_core::{ArgumentSpec, CommandNode, FlagSpec};
/// use command_args_parser::Parser;
/// use serde_json::json;
///
/// let parser = Parser::new(
///     CommandNode::new("app")
///         .with_flag(FlagSpec::new("verbose").alias("v").global())
///         .with_command(
///             CommandNode::new("run")
///                 .with_flag(FlagSpec::new("port").alias("p").with_type("integer").with_default(8080))
///                 .with_argument(ArgumentSpec::required("script", "file")),
///         ),
/// );
///
/// let result = parser.parse(&["-v", "run", "main.ts", "-p", "3000"]).unwrap();
/// assert_eq!(result.command, vec!["run"]);
/// assert_eq!(result.flags, json!({ "verbose": true, "port": 3000 }));
/// assert_eq!(result.args, vec![json!("main.ts")]);
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    root: CommandNode,
    types: TypeRegistry,
}

impl Parser {
    /// Creates a parser with the built-in types.
    pub fn new(root: CommandNode) -> Self {
        Self {
            root,
            types: TypeRegistry::new(),
        }
    }

    /// Creates a parser from a loaded schema document.
    pub fn from_config(config: ParserConfig) -> Self {
        Self::new(config.command)
    }

    /// Registers a custom type.
    pub fn with_type(
        mut self,
        name: &str,
        handler: impl Fn(&TypeInfo<'_>) -> std::result::Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.types.register(name, TypeHandler::custom(handler));
        self
    }

    /// The type registry.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Mutable access to the type registry.
    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    /// The command tree.
    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// Checks the command tree for structural errors.
    pub fn validate(&self) -> Vec<ValidationError> {
        validate_schema(&self.root)
    }

    /// Completion view of the command at `path` below the root.
    pub fn outline(&self, path: &[&str]) -> Option<CommandOutline> {
        outline(&self.root, path)
    }

    /// Parses a command line (without the program name).
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ParseResult> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        let mut path: Vec<&CommandNode> = vec![&self.root];
        let mut values = FlagValues::default();
        let mut positional: Vec<String> = Vec::new();
        let mut literal: Vec<String> = Vec::new();
        let mut index = 0;

        while let Some(token) = tokens.get(index) {
            let node = current(&path, &self.root);
            if token == "--" {
                literal.extend_from_slice(&tokens[index + 1..]);
                break;
            }

            if is_flag(token) {
                let flags = effective_flags(&path);
                let commands = command_names(node);
                let matcher = FlagMatcher::new(&flags, &self.types).with_commands(&commands);
                index += matcher.match_flag(&tokens[index..], &mut values)?;
                continue;
            }

            if positional.is_empty() {
                if let Some(child) = node.find_command(token) {
                    debug!(command = %child.name, "descending into command");
                    path.push(child);
                    index += 1;
                    continue;
                }
            }

            if node.stop_early {
                let rest = &tokens[index..];
                let end = rest.iter().position(|t| t == "--").unwrap_or(rest.len());
                positional.extend_from_slice(&rest[..end]);
                if end < rest.len() {
                    literal.extend_from_slice(&rest[end + 1..]);
                }
                break;
            }

            positional.push(token.clone());
            index += 1;
        }

        let node = current(&path, &self.root);
        let flags = effective_flags(&path);
        let outcome = validate_flags(&flags, &mut values, node.allow_empty)?;

        let mut result = ParseResult::new(values.values);
        result.command = path.iter().skip(1).map(|n| n.name.clone()).collect();
        result.literal = literal;

        match outcome {
            Validated::Standalone => {
                result.standalone = true;
                result.unknown = positional;
            }
            Validated::Complete => {
                result.args = self.bind_arguments(&path, &positional)?;
            }
        }

        debug!(
            command = ?result.command,
            args = result.args.len(),
            standalone = result.standalone,
            "parsed command line"
        );
        Ok(result)
    }

    fn bind_arguments(&self, path: &[&CommandNode], positional: &[String]) -> Result<Vec<Value>> {
        let node = current(path, &self.root);

        if node.arguments.is_empty() {
            let Some(first) = positional.first() else {
                return Ok(Vec::new());
            };
            if !node.commands.is_empty() {
                let names = node.command_names();
                return Err(ParseError::UnknownCommand {
                    command: first.clone(),
                    suggestion: suggest(first, &names).map(str::to_string),
                });
            }
            let name: Vec<&str> = path.iter().map(|n| n.name.as_str()).collect();
            return Err(ParseError::NoArgumentsAllowed(name.join(" ")));
        }

        let missing: Vec<String> = node
            .arguments
            .iter()
            .enumerate()
            .filter(|(i, arg)| arg.is_required() && *i >= positional.len())
            .map(|(_, arg)| arg.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ParseError::MissingArguments { names: missing });
        }

        let mut args = Vec::with_capacity(positional.len());
        let mut rest = positional;
        for spec in &node.arguments {
            if spec.variadic {
                for raw in rest {
                    args.push(self.coerce_argument(spec, raw)?);
                }
                rest = &[];
                break;
            }
            let Some((raw, tail)) = rest.split_first() else {
                break;
            };
            args.push(self.coerce_argument(spec, raw)?);
            rest = tail;
        }

        if !rest.is_empty() {
            return Err(ParseError::TooManyArguments {
                tokens: rest.to_vec(),
            });
        }
        Ok(args)
    }

    fn coerce_argument(&self, spec: &ArgumentSpec, raw: &str) -> Result<Value> {
        let info = TypeInfo::argument(&spec.name, spec.element_type(), raw);
        if spec.is_list() {
            self.types.resolve_list(&info, DEFAULT_SEPARATOR)
        } else {
            self.types.resolve(&info)
        }
    }
}

fn current<'a>(path: &[&'a CommandNode], root: &'a CommandNode) -> &'a CommandNode {
    path.last().copied().unwrap_or(root)
}

fn command_names(node: &CommandNode) -> Vec<&str> {
    node.commands
        .iter()
        .flat_map(|c| std::iter::once(&c.name).chain(&c.aliases))
        .map(String::as_str)
        .collect()
}
