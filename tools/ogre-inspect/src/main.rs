//! ogre-inspect - Ogre binary asset inspector
//!
//! Decodes legacy `.mesh` / `.skeleton` files and prints what they contain.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ogre_inspect::{
    InspectConfig, MeshOptions, OutputFormat, inspect_mesh, inspect_skeleton, render,
};

#[derive(Parser)]
#[command(name = "ogre-inspect")]
#[command(about = "Inspect Ogre binary mesh and skeleton files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./ogre-inspect.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a .mesh file and the skeleton it links to
    Mesh {
        /// Input .mesh file
        input: PathBuf,

        /// Extra skeleton search directory, tried before configured ones
        #[arg(short = 'I', long = "search-path")]
        search_paths: Vec<PathBuf>,

        /// Do not follow the skeleton link
        #[arg(long)]
        no_skeleton: bool,
    },

    /// Inspect a .skeleton file
    Skeleton {
        /// Input .skeleton file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir()?;
    let config = InspectConfig::discover(cli.config.as_deref(), &cwd)?;
    let format = cli.format.unwrap_or(config.output.format);

    let output = match cli.command {
        Commands::Mesh {
            input,
            search_paths,
            no_skeleton,
        } => {
            tracing::debug!("Inspecting mesh {:?}", input);
            let mut options = MeshOptions::from_config(&config);
            if !search_paths.is_empty() {
                let mut paths = search_paths;
                paths.extend_from_slice(options.resolver.search_paths());
                options.resolver = ogre_inspect::SkeletonResolver::new(paths);
            }
            if no_skeleton {
                options.resolve_skeleton = false;
            }
            render(&inspect_mesh(&input, &options)?, format)?
        }

        Commands::Skeleton { input } => {
            tracing::debug!("Inspecting skeleton {:?}", input);
            render(&inspect_skeleton(&input)?, format)?
        }
    };

    print!("{}", output);
    Ok(())
}
