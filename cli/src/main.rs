mod config;
mod test_runner;
mod tree;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{FileConfig, Overrides};
use director::{Director, DirectorError};

const SUBCOMMANDS: &[&str] = &["run", "test", "help"];

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "FSDIR_LOG";

#[derive(Parser)]
#[command(name = "fsdir", version, about = "FileSystem Director")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log each phase to stderr (FSDIR_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a script and stage it into the sandbox
    Run(RunArgs),

    /// Run .test.fsdir test files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Script to execute
    file: PathBuf,

    /// Change the default sandbox dir
    #[arg(short, long)]
    sandbox: Option<PathBuf>,

    /// Apply the sandbox to the real files
    #[arg(short, long)]
    apply: bool,

    /// Display the sandbox tree
    #[arg(short, long)]
    display: bool,

    /// Validate the script only
    #[arg(short, long)]
    test: bool,

    /// Validate, then run the script into the sandbox
    #[arg(short, long)]
    run: bool,

    /// Keep the sandbox directory after apply
    #[arg(short, long)]
    keep: bool,

    /// TOML file with default settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.fsdir file or directory containing them
    path: PathBuf,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `fsdir script.fsdir` is shorthand for `fsdir run script.fsdir`.
    let mut args: Vec<String> = std::env::args().collect();
    let needs_run = args
        .iter()
        .skip(1)
        .find(|a| !a.starts_with('-'))
        .is_some_and(|first_pos| !SUBCOMMANDS.contains(&first_pos.as_str()));
    if needs_run {
        args.insert(1, "run".to_string());
    }

    let cli = Cli::parse_from(&args);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(run_args) => do_run(run_args, cli.no_color),
        Command::Test(test_args) => {
            if test_args.list_categories {
                test_runner::list_categories(&test_args.path);
                return;
            }
            let exit_code =
                test_runner::run_tests(&test_args.path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn do_run(args: RunArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let file_config = match &args.config {
        Some(path) => match FileConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    let options = config::resolve(
        file_config,
        Overrides {
            sandbox: args.sandbox.clone(),
            keep: args.keep,
        },
    );

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file.display(), e);
            process::exit(1);
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.display().to_string(), source.clone());

    debug!(?options, "resolved options");
    let mut director = Director::new(options);
    if let Err(error) = drive(&mut director, &source, file_id, &args) {
        let writer = StandardStream::stderr(color_choice);
        emit_error(&writer, &files, file_id, &error);
        process::exit(1);
    }
}

/// Load and validate; then, unless only testing, stage the script and
/// optionally apply it.
fn drive(
    director: &mut Director,
    source: &str,
    file_id: usize,
    args: &RunArgs,
) -> director::Result<()> {
    info!(file = %args.file.display(), "loading script");
    director.loads(source, file_id)?;
    director.validate()?;

    if args.test || args.run {
        println!("The script is valid.");
    }
    if args.test && !args.run && !args.apply {
        debug!("test only, skipping sandbox run");
        return Ok(());
    }

    director.sandbox_run()?;

    if args.display {
        debug!(root = %director.sandbox_root().display(), "displaying sandbox");
        show_tree(director.sandbox_root())?;
    }

    if args.apply {
        info!(keep = director.options().keep, "applying sandbox");
        let changed = director.apply()?;
        println!("Applied {} change(s).", changed);
    }
    Ok(())
}

fn show_tree(root: &Path) -> director::Result<()> {
    let rendered = tree::render(root).map_err(|e| DirectorError::io(root, e))?;
    print!("{}", rendered);
    Ok(())
}

fn emit_error(
    writer: &StandardStream,
    files: &SimpleFiles<String, String>,
    file_id: usize,
    error: &DirectorError,
) {
    if error.span().is_some() {
        let config = term::Config::default();
        let diagnostic = error.to_diagnostic(file_id);
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
    } else {
        eprintln!("error: {}", error);
    }
}
