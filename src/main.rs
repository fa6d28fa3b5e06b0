//! Opsrun - render and validate parameterized operator runbooks.
//!
//! Runbooks are shell/SQL/JS snippets with `{{ .var | filter "arg" }}`
//! placeholders; opsrun substitutes variables through each placeholder's
//! filter chain and refuses to emit partially rendered output.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use opsrun::{Config, Runbook, TemplateError, Variables};

/// Render and validate parameterized operator runbooks
#[derive(Parser)]
#[command(name = "opsrun")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a runbook with the given variables
    Render {
        /// Runbook name or path
        runbook: String,

        /// Variable assignments (key=value)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,

        /// JSON or YAML file with variable values
        #[arg(long, value_name = "FILE")]
        var_file: Option<PathBuf>,

        /// Fall back to environment variables for unset variables
        #[arg(long)]
        env: bool,

        /// Write rendered output to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Validate a runbook's template without rendering
    Check {
        /// Runbook name or path
        runbook: String,
    },

    /// Show the variables a runbook accepts
    Vars {
        /// Runbook name or path
        runbook: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List discovered runbooks
    List {
        /// Directory to search (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show configuration
    Config {
        /// Show config file search paths
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    // Pick up variables operators keep in a local .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    match cli.command {
        Commands::Render { runbook, vars, var_file, env, output } => {
            cmd_render(&runbook, &vars, var_file.as_deref(), env, output.as_deref())?;
        }
        Commands::Check { runbook } => {
            cmd_check(&runbook)?;
        }
        Commands::Vars { runbook, format } => {
            cmd_vars(&runbook, &format)?;
        }
        Commands::List { path, format } => {
            cmd_list(&path, &format)?;
        }
        Commands::Config { path } => {
            cmd_config(path)?;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

/// Resolve a runbook argument (name or path) against the configuration.
fn load_runbook(arg: &str, config: &Config) -> Result<Runbook> {
    let cwd = std::env::current_dir()?;
    match opsrun::resolve_runbook(arg, &cwd, config) {
        Some(Ok(runbook)) => Ok(runbook),
        Some(Err(e)) => Err(e.into()),
        None => anyhow::bail!("Runbook '{arg}' not found"),
    }
}

/// Render a runbook.
fn cmd_render(
    name: &str,
    assignments: &[String],
    var_file: Option<&std::path::Path>,
    use_env: bool,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let config = Config::load();
    let runbook = load_runbook(name, &config)?;

    // --var beats --var-file beats the environment.
    let mut vars = Variables::from_assignments(assignments)?;
    if let Some(file) = var_file {
        vars.merge_missing(Variables::from_file(file)?);
    }
    if use_env {
        vars.merge_env();
    }

    tracing::debug!(runbook = runbook.name, variables = vars.len(), "Rendering runbook");

    match runbook.render(&vars) {
        Ok(text) => {
            if let Some(path) = output {
                std::fs::write(path, &text)?;
                eprintln!("Rendered '{}' to {}", runbook.name, path.display());
            } else {
                print!("{text}");
                io::stdout().flush()?;
            }
            Ok(())
        }
        Err(TemplateError::Invalid(errors)) => {
            eprintln!("Runbook '{}' failed validation:", runbook.name);
            for issue in errors.iter() {
                eprintln!("  - {issue}");
            }
            anyhow::bail!("{} validation error(s); nothing was rendered", errors.len());
        }
        Err(TemplateError::Parse(e)) => Err(e.into()),
    }
}

/// Validate a runbook's template without rendering it.
fn cmd_check(name: &str) -> Result<()> {
    let config = Config::load();
    let runbook = load_runbook(name, &config)?;

    // Loading already validated the template; report what was found.
    let variables = runbook.variables()?;
    println!("Runbook '{}' is valid ({} variable(s))", runbook.name, variables.len());
    Ok(())
}

/// Show the variables a runbook accepts.
fn cmd_vars(name: &str, format: &str) -> Result<()> {
    let config = Config::load();
    let runbook = load_runbook(name, &config)?;
    let variables = runbook.variables()?;

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&variables)?;
            println!("{json}");
        }
        _ => {
            for info in &variables {
                let mut attrs = Vec::new();
                if info.required {
                    attrs.push("required".to_string());
                }
                if let Some(ref default) = info.default {
                    attrs.push(format!("default: \"{default}\""));
                }
                if let Some(type_name) = info.type_name {
                    attrs.push(format!("type: {type_name}"));
                }
                if let Some(ref pattern) = info.pattern {
                    attrs.push(format!("pattern: {pattern}"));
                }

                let mut line = format!(".{}", info.path);
                if !attrs.is_empty() {
                    line.push_str(&format!(" [{}]", attrs.join(", ")));
                }
                if let Some(ref description) = info.description {
                    line.push_str(&format!(" - {description}"));
                }
                println!("{line}");
            }
            println!("\nTotal: {} variable(s)", variables.len());
        }
    }

    Ok(())
}

/// List discovered runbooks.
fn cmd_list(path: &str, format: &str) -> Result<()> {
    let config = Config::load();
    let root = std::path::Path::new(path);
    let runbooks = opsrun::discover_runbooks(root, &config);

    match format {
        "json" => {
            let entries: Vec<_> = runbooks
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "name": r.name,
                        "description": r.description,
                        "interpreter": r.interpreter,
                        "tags": r.tags,
                        "path": r.path,
                        "variables": r.variable_count(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        _ => {
            for runbook in &runbooks {
                println!(
                    "{} ({} variable(s)) - {}",
                    runbook.name,
                    runbook.variable_count(),
                    runbook.description.as_deref().unwrap_or("")
                );
            }
            println!("\nTotal: {} runbook(s)", runbooks.len());
        }
    }

    Ok(())
}

/// Show the effective configuration.
fn cmd_config(show_paths: bool) -> Result<()> {
    if show_paths {
        println!("project: {}", Config::project_path().display());
        if let Some(user) = Config::user_path() {
            println!("user: {}", user.display());
        }
        return Ok(());
    }

    let config = Config::load();
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "opsrun", &mut io::stdout());
}
