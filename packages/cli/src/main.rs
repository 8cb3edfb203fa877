use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use routefs_cli::{run, Command, Options};

/// routefs - inspect the route store built from a routes directory
#[derive(Parser, Debug)]
#[command(name = "routefs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Routes directory, relative to the current directory
    #[arg(long, default_value = "src/routes")]
    routes: PathBuf,

    /// Extension of route files
    #[arg(long, default_value = "ripple")]
    ext: String,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List top-level route names
    Paths,
    /// List every route key
    FullPaths,
    /// Print the contents stored at a route key
    Get { path: String },
    /// Print the routes as a directory tree
    Tree {
        /// Only show the subtree mounted at this prefix
        #[arg(long)]
        mount: Option<String>,
    },
    /// List entries, optionally through a view mounted at a prefix
    Entries {
        #[arg(long)]
        mount: Option<String>,
    },
}

impl From<Cmd> for Command {
    fn from(cmd: Cmd) -> Self {
        match cmd {
            Cmd::Paths => Command::Paths,
            Cmd::FullPaths => Command::FullPaths,
            Cmd::Get { path } => Command::Get { path },
            Cmd::Tree { mount } => Command::Tree { mount },
            Cmd::Entries { mount } => Command::Entries { mount },
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let options = Options {
        routes: args.routes,
        extension: args.ext,
        color: !args.no_color,
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = run(&options, &cwd, args.command.into(), &mut stdout) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
