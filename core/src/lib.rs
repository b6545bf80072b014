//! Core schema types for command-line argument trees.
//!
//! This crate defines the declarative model consumed by
//! `command-args-parser`:
//!
//! - [`CommandNode`]: a command with local flags, positional arguments and
//!   child commands.
//! - [`FlagSpec`]: a flag with aliases, value slots, defaults and relations
//!   (`conflicts`, `depends`, `standalone`, `global`).
//! - [`ArgumentSpec`]: a positional argument or flag value slot with a type
//!   name and multiplicity.
//!
//! Scope merging ([`effective_flags`]) computes which flags a command sees,
//! including inherited globals and the built-in help and version flags.
//! Validation ([`validate_schema`]) catches structural errors such as
//! duplicate flags or a required argument after an optional one.
//! [`outline`] produces a read-only view for completion generators.
//!
//! # Example
//!
//! ```
//! use command_args_core::*;
//!
//! // Build a tree for a fictional CLI
//! let root = CommandNode::new("mycli")
//!     .with_version("0.3.1")
//!     .with_flag(
//!         FlagSpec::new("verbose")
//!             .alias("v")
//!             .global()
//!             .with_description("Enable verbose output"),
//!     )
//!     .with_command(
//!         CommandNode::new("run")
//!             .with_flag(FlagSpec::new("port").with_type("integer").with_default(8080))
//!             .with_argument(ArgumentSpec::required("script", "file")),
//!     );
//!
//! assert_eq!(root.find_command("run").unwrap().name, "run");
//! assert!(root.find_flag("--verbose").is_some());
//! assert!(validate_schema(&root).is_empty());
//!
//! let run = root.find_command("run").unwrap();
//! assert_eq!(effective_flags(&[&root, run]).len(), 4);
//! ```

mod merge;
mod outline;
mod types;
mod validate;

pub use merge::{HELP_FLAG, VERSION_FLAG, effective_flags};
pub use outline::{ArgumentOutline, CommandOutline, FlagOutline, outline};
pub use serde_json::Value;
pub use types::*;
pub use validate::{ValidationError, validate_arguments, validate_schema};
