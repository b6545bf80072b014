use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use command_args_core::FlagSpec;
use command_args_parser::{
    ParseOptions, ParserConfig, did_you_mean, parse_flag_definition, parse_flags, suggest,
};
use serde::Serialize;
use tracing::debug;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "command-args")]
#[command(about = "Parse command lines against declarative argument schemas", version)]
struct Cli {
    /// Log parser decisions to stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse tokens against a schema document and print the result.
    Parse(ParseArgs),
    /// Parse tokens against flag definition strings.
    Flags(FlagsArgs),
    /// Load and validate one or more schema documents.
    Check(CheckArgs),
    /// Print the completion outline of a command in a schema document.
    Outline(OutlineArgs),
    /// Print the candidate closest to an input.
    Suggest(SuggestArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Schema document (.json, otherwise YAML).
    #[arg(long)]
    schema: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
    /// Tokens to parse, after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct FlagsArgs {
    /// Flag definition such as "-p, --port <port:integer>"; repeatable.
    #[arg(long = "def", value_name = "DEFINITION", allow_hyphen_values = true)]
    definitions: Vec<String>,
    /// Stop matching flags at the first non-flag token.
    #[arg(long)]
    stop_early: bool,
    /// Skip required checks when no flag is given.
    #[arg(long)]
    allow_empty: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
    /// Tokens to parse, after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema documents to validate.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct OutlineArgs {
    /// Schema document (.json, otherwise YAML).
    #[arg(long)]
    schema: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
    /// Command path below the root (e.g. `remote add`).
    path: Vec<String>,
}

#[derive(Debug, Args)]
struct SuggestArgs {
    /// Misspelled input.
    input: String,
    /// Candidates to choose from.
    #[arg(required = true)]
    candidates: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Flags(args) => run_flags(args),
        Command::Check(args) => run_check(args),
        Command::Outline(args) => run_outline(args),
        Command::Suggest(args) => run_suggest(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "command_args_parser=trace,command_args=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let parser = command_args_parser::Parser::from_config(load(&args.schema)?);
    let result = parser.parse(&args.tokens).map_err(|e| e.to_string())?;
    print_formatted(&result, args.format)
}

fn run_flags(args: FlagsArgs) -> Result<(), String> {
    let flags = args
        .definitions
        .iter()
        .map(|definition| {
            parse_flag_definition(definition).map_err(|e| format!("{definition:?}: {e}"))
        })
        .collect::<Result<Vec<FlagSpec>, String>>()?;
    let options = ParseOptions {
        stop_early: args.stop_early,
        allow_empty: args.allow_empty,
    };

    let result = parse_flags(&args.tokens, &flags, &options).map_err(|e| e.to_string())?;
    print_formatted(&result, args.format)
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let mut commands = 0;
    for path in &args.inputs {
        let config = load(path)?;
        commands += count_commands(&config.command);
    }
    println!(
        "Checked {} schema file(s) with {} command(s).",
        args.inputs.len(),
        commands
    );
    Ok(())
}

fn run_outline(args: OutlineArgs) -> Result<(), String> {
    let config = load(&args.schema)?;
    let path: Vec<&str> = args.path.iter().map(String::as_str).collect();
    let outline = command_args_core::outline(&config.command, &path).ok_or_else(|| {
        let missing = path.last().copied().unwrap_or_default();
        format!(
            "no command at path '{}'.{}",
            path.join(" "),
            did_you_mean("command", missing, &all_command_names(&config.command))
        )
    })?;
    print_formatted(&outline, args.format)
}

fn run_suggest(args: SuggestArgs) -> Result<(), String> {
    let suggestion = suggest(&args.input, &args.candidates)
        .ok_or_else(|| "no candidates given".to_string())?;
    println!("{suggestion}");
    Ok(())
}

fn load(path: &Path) -> Result<ParserConfig, String> {
    debug!(path = %path.display(), "loading schema document");
    ParserConfig::load(path).map_err(|e| format!("{}: {e}", path.display()))
}

fn count_commands(node: &command_args_core::CommandNode) -> usize {
    1 + node.commands.iter().map(count_commands).sum::<usize>()
}

fn all_command_names(node: &command_args_core::CommandNode) -> Vec<&str> {
    let mut names = Vec::new();
    for child in &node.commands {
        names.push(child.name.as_str());
        names.extend(all_command_names(child));
    }
    names
}

fn print_formatted<T: Serialize>(value: &T, format: OutputFormat) -> Result<(), String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string())?,
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string())?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
