//! Effective flag scope for a command path.
//!
//! A command sees its own flags plus the `global` flags of its ancestors,
//! plus the built-in help and version flags. [`effective_flags`] merges these
//! scopes for a path of nodes from the root down to the target.
//!
//! # Example
//!
//! ```
//! use command_args_core::*;
//!
//! let root = CommandNode::new("app")
//!     .with_flag(FlagSpec::new("verbose").alias("v").global())
//!     .with_flag(FlagSpec::new("base"))
//!     .with_command(CommandNode::new("run").with_flag(FlagSpec::new("port").with_type("integer")));
//! let run = root.find_command("run").unwrap();
//!
//! let names: Vec<&str> = effective_flags(&[&root, run])
//!     .iter()
//!     .map(|f| f.name.as_str())
//!     .collect();
//! assert_eq!(names, vec!["help", "verbose", "port"]);
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::{CommandNode, FlagSpec};

/// Built-in `-h, --help` flag, reachable from every command.
pub static HELP_FLAG: LazyLock<FlagSpec> = LazyLock::new(|| {
    FlagSpec::new("help")
        .alias("h")
        .standalone()
        .global()
        .with_description("Show this help.")
});

/// Built-in `-V, --version` flag, present when the root declares a version.
pub static VERSION_FLAG: LazyLock<FlagSpec> = LazyLock::new(|| {
    FlagSpec::new("version")
        .alias("V")
        .standalone()
        .global()
        .with_description("Show the version number for this program.")
});

/// Computes the flags visible on the last node of `path`.
///
/// `path` runs from the root to the target command. The result lists the
/// help flag first, then the version flag (if the root declares a version and
/// inheritance reaches the root), then inherited global flags with the
/// nearest ancestor first, then the target's local flags. A local flag, or a
/// nearer ancestor's global flag, shadows a farther flag of the same name.
///
/// `no_globals` on the target or on any ancestor on the way up blocks every
/// ancestor above it. The help flag is never blocked.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let root = CommandNode::new("app")
///     .with_version("0.1.0")
///     .with_flag(FlagSpec::new("global").alias("g").global())
///     .with_command(CommandNode::new("isolated").no_globals());
/// let isolated = root.find_command("isolated").unwrap();
///
/// let visible = effective_flags(&[&root, isolated]);
/// assert_eq!(visible.len(), 1);
/// assert_eq!(visible[0].name, "help");
///
/// let at_root = effective_flags(&[&root]);
/// assert_eq!(at_root.len(), 3);
/// ```
pub fn effective_flags<'a>(path: &[&'a CommandNode]) -> Vec<&'a FlagSpec> {
    let Some((target, ancestors)) = path.split_last() else {
        return Vec::new();
    };

    let mut taken: HashSet<&str> = target.flags.iter().map(|f| f.name.as_str()).collect();

    let mut inherited: Vec<&'a FlagSpec> = Vec::new();
    let mut reaches_root = true;
    if target.no_globals {
        reaches_root = ancestors.is_empty();
    } else {
        for (depth, ancestor) in ancestors.iter().enumerate().rev() {
            for flag in ancestor.flags.iter().filter(|f| f.global) {
                if taken.insert(flag.name.as_str()) {
                    inherited.push(flag);
                }
            }
            if ancestor.no_globals {
                reaches_root = depth == 0;
                break;
            }
        }
    }

    let mut flags: Vec<&'a FlagSpec> = Vec::with_capacity(inherited.len() + target.flags.len() + 2);
    if taken.insert(HELP_FLAG.name.as_str()) {
        flags.push(&HELP_FLAG);
    }
    if reaches_root && path[0].version.is_some() && taken.insert(VERSION_FLAG.name.as_str()) {
        flags.push(&VERSION_FLAG);
    }
    flags.extend(inherited);
    flags.extend(target.flags.iter());
    flags
}
