//! Command-line interface for recast
//! This binary inspects and rewrites a single project file and prints the result; it never
//! writes files.
//!
//! Usage:
//!   recast inspect `<path>` [--format json|yaml]                     - Print the parsed fact tree
//!   recast substitute `<path>` --old `<s>` --new `<s>` [--comments] [--imports]
//!                                                                  - Print the text after a literal substitution
//!   recast apply `<path>` --facts `<file>`                           - Apply a replacement fact tree
//!   recast formats                                                 - List the path patterns
//!
//! Configuration is the built-in defaults, then `recast.toml` of the current directory, then
//! the file given with `--config <file>`.
//! Logging goes to stderr and is filtered with `RECAST_LOG` (default `warn`).

use clap::{Arg, ArgAction, ArgMatches, Command};
use recast::config::{Loader, RecastConfig};
use recast::{Error, FormatRegistry, ImportRename, InfoNode, Script, Substitution, Transform};
use std::path::Path;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let matches = Command::new("recast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and rewrite project files while preserving their formatting")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML file layered over the default configuration"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the fact tree of a file")
                .arg(path_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["json", "yaml"])
                        .default_value("json"),
                ),
        )
        .subcommand(
            Command::new("substitute")
                .about("Print a file after a literal substitution")
                .arg(path_arg())
                .arg(Arg::new("old").long("old").required(true).help("Text to replace"))
                .arg(Arg::new("new").long("new").required(true).help("Replacement text"))
                .arg(
                    Arg::new("comments")
                        .long("comments")
                        .action(ArgAction::SetTrue)
                        .help("Also rewrite comments in INI and YAML files"),
                )
                .arg(
                    Arg::new("imports")
                        .long("imports")
                        .action(ArgAction::SetTrue)
                        .help("Rename the package `old` in Python imports first"),
                ),
        )
        .subcommand(
            Command::new("apply")
                .about("Print a file after applying a replacement fact tree")
                .arg(path_arg())
                .arg(
                    Arg::new("facts")
                        .long("facts")
                        .required(true)
                        .help("JSON or YAML file holding the partial fact tree"),
                ),
        )
        .subcommand(Command::new("formats").about("List the path patterns and their formats"))
        .get_matches();

    let config = load_config(matches.get_one::<String>("config")).unwrap_or_else(|e| fail(e));
    let registry = FormatRegistry::from_config(&config);

    match matches.subcommand() {
        Some(("inspect", inspect_matches)) => {
            handle_inspect_command(&config, &registry, inspect_matches)
        }
        Some(("substitute", substitute_matches)) => {
            handle_substitute_command(&config, &registry, substitute_matches)
        }
        Some(("apply", apply_matches)) => handle_apply_command(&config, &registry, apply_matches),
        Some(("formats", _)) => handle_formats_command(&registry),
        _ => {
            eprintln!("Unknown command, see `recast --help`");
            process::exit(2);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RECAST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Path to the file")
        .required(true)
        .index(1)
}

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", err);
    process::exit(1);
}

fn load_config(path: Option<&String>) -> Result<RecastConfig, Error> {
    let mut loader = Loader::new().with_project_dir(".");
    if let Some(path) = path {
        loader = loader.with_file(path);
    }
    loader.build()
}

fn read_script(config: &RecastConfig, registry: &FormatRegistry, path: &str) -> Script {
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        process::exit(1);
    });
    let script = Script::for_path(registry, path, source).with_defaults(config.substitution);
    debug!(path, format = %script.format(), "read script");
    script
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    match matches.get_one::<String>(name) {
        Some(value) => value,
        None => fail(format!("missing --{}", name)),
    }
}

/// Handle the inspect command
fn handle_inspect_command(config: &RecastConfig, registry: &FormatRegistry, matches: &ArgMatches) {
    let mut script = read_script(config, registry, required(matches, "path"));
    let Some(info) = script.info().unwrap_or_else(|e| fail(e)) else {
        eprintln!("Format '{}' has no fact tree", script.format());
        return;
    };
    let output = match required(matches, "format") {
        "yaml" => serde_yaml::to_string(&info).map_err(Error::from),
        _ => serde_json::to_string_pretty(&info).map_err(Error::from),
    };
    println!("{}", output.unwrap_or_else(|e| fail(e)));
}

/// Handle the substitute command
fn handle_substitute_command(
    config: &RecastConfig,
    registry: &FormatRegistry,
    matches: &ArgMatches,
) {
    let mut script = read_script(config, registry, required(matches, "path"));
    let (old, new) = (required(matches, "old"), required(matches, "new"));

    let mut substitution = Substitution::new(old, new);
    if matches.get_flag("comments") {
        substitution = substitution.with_comments(true);
    }
    let mut transform = Transform::new().with_substitution(substitution);
    if matches.get_flag("imports") {
        transform = transform.with_import_rename(ImportRename::new(old, new));
    }
    print!("{}", script.publish(&transform).unwrap_or_else(|e| fail(e)));
}

/// Handle the apply command
fn handle_apply_command(config: &RecastConfig, registry: &FormatRegistry, matches: &ArgMatches) {
    let mut script = read_script(config, registry, required(matches, "path"));
    let Some(schema) = script.format().schema() else {
        fail(format!("Format '{}' has no fact tree", script.format()));
    };

    let facts_path = required(matches, "facts");
    let text = std::fs::read_to_string(facts_path).unwrap_or_else(|e| {
        eprintln!("Error reading facts: {}", e);
        process::exit(1);
    });
    let is_yaml = Path::new(facts_path)
        .extension()
        .is_some_and(|ext| ext == "yml" || ext == "yaml");
    let facts = if is_yaml {
        InfoNode::from_yaml_str(schema, &text)
    } else {
        InfoNode::from_json_str(schema, &text)
    }
    .unwrap_or_else(|e| fail(e));

    let output = script
        .publish(&Transform::new().with_facts(facts))
        .unwrap_or_else(|e| fail(e));
    print!("{}", output);
}

/// Handle the formats command
fn handle_formats_command(registry: &FormatRegistry) {
    println!("Path patterns (first match wins, unmatched files are plain text):\n");
    for (pattern, format) in registry.list() {
        println!("  {:<16} {:<14} {}", pattern, format, format.description());
    }
}
