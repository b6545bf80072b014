use serde::{Deserialize, Serialize};

use crate::{CommandNode, effective_flags};

/// Read-only view of one command, shaped for shell completion generators.
///
/// An outline lists everything a completion script needs at a given command
/// path: the visible flags (with how many values each takes), the positional
/// arguments with their completion actions, and the child command names.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let root = CommandNode::new("media").with_command(
///     CommandNode::new("encode")
///         .with_flag(FlagSpec::new("bitrate").alias("b").with_type("integer"))
///         .with_flag(FlagSpec::new("debug-dump").hidden())
///         .with_argument(ArgumentSpec::required("input", "file")),
/// );
///
/// let outline = outline(&root, &["encode"]).unwrap();
/// assert_eq!(outline.path, vec!["media", "encode"]);
/// assert_eq!(outline.flags.len(), 2); // help + bitrate
/// assert_eq!(outline.flags[1].arg_count, 1);
/// assert_eq!(outline.arguments[0].action, "file");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutline {
    /// Command names from the root to this command.
    pub path: Vec<String>,
    /// Visible flags in effective order.
    pub flags: Vec<FlagOutline>,
    /// Positional arguments in declaration order.
    pub arguments: Vec<ArgumentOutline>,
    /// Child command names.
    pub commands: Vec<String>,
}

/// Completion view of a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagOutline {
    /// Flag as typed (`--name` or `-x`).
    pub name: String,
    /// Aliases as typed.
    pub aliases: Vec<String>,
    /// Number of value slots.
    pub arg_count: usize,
    /// Completion action of the first slot, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Completion view of a positional argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentOutline {
    pub name: String,
    pub action: String,
    pub optional: bool,
    pub variadic: bool,
}

/// Builds the outline for the command at `path` (names or aliases below the
/// root). Returns `None` if the path does not exist.
pub fn outline(root: &CommandNode, path: &[&str]) -> Option<CommandOutline> {
    let mut nodes = vec![root];
    for segment in path {
        let current = *nodes.last()?;
        nodes.push(current.find_command(segment)?);
    }
    let node = *nodes.last()?;

    let flags = effective_flags(&nodes)
        .into_iter()
        .filter(|flag| !flag.hidden)
        .map(|flag| {
            let slots = flag.slots();
            FlagOutline {
                name: flag.display_name(),
                aliases: flag.aliases.iter().map(|a| crate::flag_display(a)).collect(),
                arg_count: slots.len(),
                action: slots.first().map(|slot| slot.action().to_string()),
            }
        })
        .collect();

    let arguments = node
        .arguments
        .iter()
        .map(|arg| ArgumentOutline {
            name: arg.name.clone(),
            action: arg.action().to_string(),
            optional: arg.optional,
            variadic: arg.variadic,
        })
        .collect();

    Some(CommandOutline {
        path: nodes.iter().map(|n| n.name.clone()).collect(),
        flags,
        arguments,
        commands: node.commands.iter().map(|c| c.name.clone()).collect(),
    })
}
