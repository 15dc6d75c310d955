//! Command-line interface for razor
//! Renders templates and shows the intermediate forms the compiler produces.
//!
//! Usage:
//!   razor render `<path>` [--model `<file>`] [--config `<file>`] [--ignore-whitespace] [--debug]
//!   razor tokens `<path>` [--ignore-whitespace]  - Print the token stream as JSON
//!   razor procedure `<path>` [--ignore-whitespace]  - Print the generated procedure

use clap::{Arg, ArgAction, ArgMatches, Command};
use razor::razor::config::{CompileOptions, Loader, RazorConfig};
use razor::razor::lexing::tokenize;
use razor::{compile, Razor};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn ignore_whitespace_arg() -> Arg {
    Arg::new("ignore-whitespace")
        .long("ignore-whitespace")
        .short('w')
        .help("Strip leading whitespace and never echo indentation")
        .action(ArgAction::SetTrue)
}

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Path to the template")
        .required(true)
        .index(1)
}

fn main() {
    let matches = Command::new("razor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile and render razor templates")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("render")
                .about("Render a template")
                .arg(path_arg())
                .arg(
                    Arg::new("model")
                        .long("model")
                        .short('m')
                        .help("JSON or YAML file with the model"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Configuration file layered over the defaults"),
                )
                .arg(ignore_whitespace_arg())
                .arg(
                    Arg::new("debug")
                        .long("debug")
                        .help("Log tokens and the generated procedure")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream as JSON")
                .arg(path_arg())
                .arg(ignore_whitespace_arg()),
        )
        .subcommand(
            Command::new("procedure")
                .about("Print the generated render procedure")
                .arg(path_arg())
                .arg(ignore_whitespace_arg()),
        )
        .get_matches();

    let debug = matches
        .subcommand_matches("render")
        .is_some_and(|m| m.get_flag("debug"));
    init_tracing(debug);

    match matches.subcommand() {
        Some(("render", render_matches)) => handle_render_command(render_matches),
        Some(("tokens", tokens_matches)) => handle_tokens_command(tokens_matches),
        Some(("procedure", procedure_matches)) => handle_procedure_command(procedure_matches),
        _ => unreachable!(),
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("razor=debug")
    } else {
        EnvFilter::try_from_env("RAZOR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn read_source(path: &str) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("cannot read {}: {}", path, e)))
}

fn load_config(matches: &ArgMatches) -> RazorConfig {
    let mut loader = Loader::new().with_project_dir(".");
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if matches.get_flag("ignore-whitespace") {
        loader = loader
            .set_override("compile.ignore_whitespace", true)
            .unwrap_or_else(|e| fail(e));
    }
    if matches.get_flag("debug") {
        loader = loader
            .set_override("compile.debug", true)
            .unwrap_or_else(|e| fail(e));
    }
    loader.build().unwrap_or_else(|e| fail(e))
}

fn load_model(path: &str) -> serde_json::Value {
    let text = read_source(path);
    let is_yaml = Path::new(path)
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    if is_yaml {
        serde_yaml::from_str(&text).unwrap_or_else(|e| fail(format!("invalid model {}: {}", path, e)))
    } else {
        serde_json::from_str(&text).unwrap_or_else(|e| fail(format!("invalid model {}: {}", path, e)))
    }
}

/// Handle the render command
fn handle_render_command(matches: &ArgMatches) {
    let path = matches.get_one::<String>("path").unwrap();
    let model = matches
        .get_one::<String>("model")
        .map(|model_path| load_model(model_path))
        .unwrap_or(serde_json::Value::Null);

    let razor = Razor::new(load_config(matches));
    let output = razor
        .render_file(path, &model)
        .unwrap_or_else(|e| fail(e));
    print!("{}", output);
}

/// Handle the tokens command
fn handle_tokens_command(matches: &ArgMatches) {
    let path = matches.get_one::<String>("path").unwrap();
    let source = read_source(path);
    let tokens = tokenize(&source, matches.get_flag("ignore-whitespace")).unwrap_or_else(|e| fail(e));
    let json = serde_json::to_string_pretty(&tokens).unwrap_or_else(|e| fail(e));
    println!("{}", json);
}

/// Handle the procedure command
fn handle_procedure_command(matches: &ArgMatches) {
    let path = matches.get_one::<String>("path").unwrap();
    let source = read_source(path);
    let options = CompileOptions {
        ignore_whitespace: matches.get_flag("ignore-whitespace"),
        debug: false,
    };
    let template = compile(&source, &options).unwrap_or_else(|e| fail(e));
    print!("{}", template.procedure());
}
