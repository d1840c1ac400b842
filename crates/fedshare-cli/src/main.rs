#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fedshare")]
#[command(author, version, about = "Bundle module-federation shared mappings", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Bundle every shared mapping into a content-hashed ES module
    BundleShared {
        /// Federation config file (default: federation.config.json in the workspace root)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output directory for the bundles
        #[arg(long, short = 'o', default_value = "dist", value_name = "DIR")]
        output: PathBuf,

        /// tsconfig used when none is found above a mapping
        #[arg(long, default_value = "tsconfig.json", value_name = "FILE")]
        tsconfig: PathBuf,

        /// Additional external packages (kept as imports)
        #[arg(long, value_delimiter = ',')]
        external: Vec<String>,

        /// Record each mapping's source entry point
        #[arg(long)]
        debug: bool,

        /// Write the shared records to this file as JSON
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,

        /// Define replacements (e.g., __DEV__=false)
        #[arg(long, value_delimiter = ',')]
        define: Vec<String>,

        /// Banner text to prepend to every bundle
        #[arg(long)]
        banner: Option<String>,

        /// Footer text to append to every bundle
        #[arg(long)]
        footer: Option<String>,
    },

    /// Show the tsconfig that applies to a path
    Tsconfig {
        /// File or directory to start from
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let cwd = dunce::canonicalize(&cwd).unwrap_or(cwd);

    logging::init(cli.verbose, cli.json);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::BundleShared {
            config,
            output,
            tsconfig,
            external,
            debug,
            manifest,
            define,
            banner,
            footer,
        }) => {
            let action = commands::shared::BundleSharedAction {
                cwd,
                config,
                output,
                tsconfig,
                external,
                debug,
                manifest,
                define,
                banner,
                footer,
            };

            let rt = tokio::runtime::Runtime::new().into_diagnostic()?;
            rt.block_on(commands::shared::run(action, cli.json))
        }
        Some(Commands::Tsconfig { path }) => commands::tsconfig::run(&cwd, &path, cli.json),
    }
}
