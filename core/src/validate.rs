//! Structural validation of command trees.
//!
//! Validates invariants the parser relies on, catching errors such as
//! duplicate flags, misplaced optional arguments, dangling `conflicts`
//! references and dotted-name collisions before a tree is used for parsing.
//!
//! # Examples
//!
//! ```
//! use command_args_core::*;
//!
//! let root = CommandNode::new("app").with_flag(FlagSpec::new("verbose").alias("v"));
//! assert!(validate_schema(&root).is_empty());
//!
//! // Invalid: flag names are stored without leading dashes
//! let bad = CommandNode::new("app").with_flag(FlagSpec::new("--verbose"));
//! assert!(!validate_schema(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{ArgumentSpec, CommandNode, FlagSpec, effective_flags};

/// Schema validation errors.
///
/// Each variant describes a specific structural problem found during
/// validation. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Flag name or alias is empty, dashed, or contains invalid characters.
    #[error("invalid flag name: {0}")]
    InvalidFlagName(String),
    /// Two flags in the same scope share a name or alias.
    #[error("duplicate flag in scope: {0}")]
    DuplicateFlag(String),
    /// Two subcommands in the same scope share a name or alias.
    #[error("duplicate subcommand in scope: {0}")]
    DuplicateSubcommand(String),
    /// A local flag shadows an inherited global flag without `override`.
    #[error("flag {0} shadows a global flag; set `override` to allow it")]
    MissingOverride(String),
    /// A flag's `conflicts` names a flag that is not in scope.
    #[error("flag {flag} conflicts with unknown flag {target}")]
    UnknownConflictingOption { flag: String, target: String },
    /// A flag's `depends` names a flag that is not in scope.
    #[error("flag {flag} depends on unknown flag {target}")]
    UnknownDependency { flag: String, target: String },
    /// A dotted flag name collides with a flat flag of its leading segment.
    #[error("dotted flag {dotted} collides with flag {flat}")]
    DottedNameCollision { dotted: String, flat: String },
    /// A required argument is declared after an optional one.
    #[error("required argument {0} cannot follow an optional argument")]
    RequiredArgumentFollowsOptional(String),
    /// An argument is declared after a variadic one.
    #[error("argument {0} cannot follow a variadic argument")]
    ArgumentFollowsVariadic(String),
    /// An argument has an empty name.
    #[error("argument name cannot be empty")]
    EmptyArgumentName,
}

/// Validates a command tree.
///
/// Walks every node from the root down and returns the first problem found
/// (the list is empty for a valid tree). Flag references and shadowing are
/// checked against each node's effective flags.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// // Optional argument followed by a required one
/// let root = CommandNode::new("app")
///     .with_argument(ArgumentSpec::optional("first", "string"))
///     .with_argument(ArgumentSpec::required("second", "string"));
/// let errors = validate_schema(&root);
/// assert_eq!(
///     errors,
///     vec![ValidationError::RequiredArgumentFollowsOptional("second".to_string())]
/// );
///
/// // `conflicts` must name a flag in scope
/// let root = CommandNode::new("app")
///     .with_flag(FlagSpec::new("audio").conflicts_with(&["video"]));
/// assert!(matches!(
///     validate_schema(&root)[0],
///     ValidationError::UnknownConflictingOption { .. }
/// ));
/// ```
pub fn validate_schema(root: &CommandNode) -> Vec<ValidationError> {
    let mut path = vec![root];
    let mut errors = Vec::new();
    if let Err(err) = validate_node(&mut path) {
        errors.push(err);
    }
    errors
}

fn validate_node<'a>(path: &mut Vec<&'a CommandNode>) -> Result<(), ValidationError> {
    let Some(&node) = path.last() else {
        return Ok(());
    };

    if node.name.trim().is_empty() {
        return Err(ValidationError::EmptyCommandName);
    }

    validate_local_flags(&node.flags)?;
    validate_shadowing(path)?;

    let scope = effective_flags(path);
    for flag in &node.flags {
        validate_references(flag, &scope)?;
        validate_arguments(&flag.args)?;
    }
    validate_dotted_names(&scope)?;
    validate_arguments(&node.arguments)?;

    let mut seen: HashSet<&str> = HashSet::new();
    for child in &node.commands {
        for name in std::iter::once(&child.name).chain(&child.aliases) {
            if !seen.insert(name.as_str()) {
                return Err(ValidationError::DuplicateSubcommand(name.clone()));
            }
        }
    }

    for child in &node.commands {
        path.push(child);
        let result = validate_node(path);
        path.pop();
        result?;
    }

    Ok(())
}

fn validate_local_flags(flags: &[FlagSpec]) -> Result<(), ValidationError> {
    let mut seen: HashSet<&str> = HashSet::new();

    for flag in flags {
        for name in std::iter::once(&flag.name).chain(&flag.aliases) {
            if !is_valid_flag_name(name) {
                return Err(ValidationError::InvalidFlagName(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(ValidationError::DuplicateFlag(name.clone()));
            }
        }
    }

    Ok(())
}

fn is_valid_flag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn validate_shadowing(path: &[&CommandNode]) -> Result<(), ValidationError> {
    let Some((node, ancestors)) = path.split_last() else {
        return Ok(());
    };
    if node.no_globals || ancestors.is_empty() {
        return Ok(());
    }

    let inherited = effective_flags(ancestors);
    for flag in node.flags.iter().filter(|f| !f.overrides) {
        let shadows = inherited
            .iter()
            .any(|g| g.global && g.name == flag.name && !is_builtin(g));
        if shadows {
            return Err(ValidationError::MissingOverride(flag.name.clone()));
        }
    }

    Ok(())
}

fn is_builtin(flag: &FlagSpec) -> bool {
    std::ptr::eq(flag, &*crate::HELP_FLAG) || std::ptr::eq(flag, &*crate::VERSION_FLAG)
}

fn validate_references(flag: &FlagSpec, scope: &[&FlagSpec]) -> Result<(), ValidationError> {
    let in_scope = |name: &str| scope.iter().any(|f| f.matches(name));

    if let Some(target) = flag.conflicts.iter().find(|n| !in_scope(n.as_str())) {
        return Err(ValidationError::UnknownConflictingOption {
            flag: flag.name.clone(),
            target: target.clone(),
        });
    }
    if let Some(target) = flag.depends.iter().find(|n| !in_scope(n.as_str())) {
        return Err(ValidationError::UnknownDependency {
            flag: flag.name.clone(),
            target: target.clone(),
        });
    }

    Ok(())
}

fn validate_dotted_names(scope: &[&FlagSpec]) -> Result<(), ValidationError> {
    let keys: Vec<String> = scope.iter().map(|f| f.result_key()).collect();

    for dotted in keys.iter().filter(|k| k.contains('.')) {
        let mut prefix = dotted.as_str();
        while let Some((head, _)) = prefix.rsplit_once('.') {
            if keys.iter().any(|k| k == head) {
                return Err(ValidationError::DottedNameCollision {
                    dotted: dotted.clone(),
                    flat: head.to_string(),
                });
            }
            prefix = head;
        }
    }

    Ok(())
}

/// Checks the ordering rules of an argument (or flag value slot) list:
/// non-empty names, no required slot after an optional one, nothing after a
/// variadic slot.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let args = [
///     ArgumentSpec::required("input", "file"),
///     ArgumentSpec::optional("rest", "string").variadic(),
/// ];
/// assert!(validate_arguments(&args).is_ok());
/// ```
pub fn validate_arguments(slots: &[ArgumentSpec]) -> Result<(), ValidationError> {
    let mut seen_optional = false;
    let mut seen_variadic = false;

    for slot in slots {
        if slot.name.trim().is_empty() {
            return Err(ValidationError::EmptyArgumentName);
        }
        if seen_variadic {
            return Err(ValidationError::ArgumentFollowsVariadic(slot.name.clone()));
        }
        if slot.is_required() && seen_optional {
            return Err(ValidationError::RequiredArgumentFollowsOptional(
                slot.name.clone(),
            ));
        }
        seen_optional |= slot.optional;
        seen_variadic |= slot.variadic;
    }

    Ok(())
}
