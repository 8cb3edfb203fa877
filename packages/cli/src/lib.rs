//! The `routefs` command: scan a routes directory into a store and query it.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use nu_ansi_term::Color;

use routefs_routes::{discover, load_text, seed_store, RouteScanConfig, ScanError};
use routefs_store::{Directory, PathStore, Store, TreeNode};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Scan(#[from] ScanError),
    #[error("{0}")]
    Store(#[from] routefs_store::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("no route at {path}")]
    NotFound { path: String },
}

/// Where to scan and how to print.
#[derive(Debug, Clone)]
pub struct Options {
    pub routes: PathBuf,
    pub extension: String,
    pub color: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Paths,
    FullPaths,
    Get { path: String },
    Tree { mount: Option<String> },
    Entries { mount: Option<String> },
}

/// Scan the routes directory and run `command` against the resulting store.
pub fn run(
    options: &Options,
    cwd: &Path,
    command: Command,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let config = RouteScanConfig::new(&options.routes, &options.extension).resolve(cwd);
    tracing::debug!(root = %config.root.display(), extension = %config.extension, "scanning routes");
    let files = discover(&config)?;
    let root = seed_store(&files, load_text)?;
    execute(&root, command, options.color, out)
}

/// Run `command` against an already built store.
pub fn execute(
    root: &PathStore<String>,
    command: Command,
    color: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Paths => {
            for name in root.paths() {
                writeln!(out, "{}", name)?;
            }
        }
        Command::FullPaths => {
            for path in root.full_paths() {
                writeln!(out, "{}", path)?;
            }
        }
        Command::Get { path } => match root.get_element(&path) {
            Some(contents) => write!(out, "{}", contents)?,
            None => return Err(CliError::NotFound { path }),
        },
        Command::Tree { mount } => {
            let tree = match mount {
                Some(prefix) => root.mount(&prefix).tree()?,
                None => root.tree()?,
            };
            writeln!(out, "{}", paint_dir(tree.store().mount_path().as_str(), color))?;
            render_tree(&tree, 1, color, out)?;
        }
        Command::Entries { mount } => {
            let entries = match mount {
                Some(prefix) => root.mount(&prefix).entries(),
                None => root.entries(),
            };
            for entry in entries {
                writeln!(out, "{}\t{} bytes", entry.path, entry.value.len())?;
            }
        }
    }
    Ok(())
}

fn render_tree(
    dir: &Directory<String>,
    depth: usize,
    color: bool,
    out: &mut dyn Write,
) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    for (key, node) in dir.iter() {
        match node {
            TreeNode::Leaf(contents) => {
                writeln!(out, "{}{} ({} bytes)", indent, key, contents.len())?;
            }
            TreeNode::Directory(child) => {
                writeln!(out, "{}{}", indent, paint_dir(key, color))?;
                render_tree(child, depth + 1, color, out)?;
            }
        }
    }
    Ok(())
}

fn paint_dir(text: &str, color: bool) -> String {
    if color {
        Color::Blue.bold().paint(text).to_string()
    } else {
        text.to_string()
    }
}
