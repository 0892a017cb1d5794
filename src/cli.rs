//! Command-line argument definitions and startup path resolution.

use clap::Parser;
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;

use crate::state::{StateFiles, DEFAULT_STATE_DIR};

/// Long flags that may also be written with a single dash (`-db`, `-stardb=...`).
const SINGLE_DASH_FLAGS: &[&str] = &["db", "stardb", "state-dir"];

/// Interactive SQL terminal with starred-query bookmarks.
#[derive(Parser, Debug)]
#[command(name = "dbterminal")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Working database (falls back to the persisted default path)
    #[arg(long = "db", value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Bookmark database [default: <state-dir>/dbterminal.db]
    #[arg(long = "stardb", value_name = "PATH")]
    pub stardb: Option<PathBuf>,

    /// Directory holding lastSql.txt and defaultPath.txt
    #[arg(long = "state-dir", value_name = "DIR", default_value = DEFAULT_STATE_DIR)]
    pub state_dir: PathBuf,

    /// Enable verbose logging on stderr
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Parse process arguments, accepting single-dash long flags.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    pub fn bookmark_db(&self) -> PathBuf {
        self.stardb
            .clone()
            .unwrap_or_else(|| self.state_dir.join("dbterminal.db"))
    }

    pub fn state_files(&self) -> StateFiles {
        StateFiles::new(&self.state_dir)
    }
}

/// Rewrite `-db`/`-db=x` style flags to their double-dash form.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = text.strip_prefix('-') else {
                return arg;
            };
            if rest.starts_with('-') {
                return arg;
            }
            let name = rest.split('=').next().unwrap_or(rest);
            if SINGLE_DASH_FLAGS.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}

/// Errors that make the terminal unable to pick a working database.
#[derive(Debug, thiserror::Error)]
pub enum PathPromptError {
    #[error("no database path given and input closed")]
    InputClosed,
    #[error("failed to read database path: {0}")]
    Io(#[from] io::Error),
}

/// Decide which working database to open.
///
/// An explicit path wins. Otherwise the persisted default is used, and when
/// none exists the user is asked once and the answer is persisted.
pub fn resolve_working_db<R: BufRead, W: Write>(
    explicit: Option<PathBuf>,
    state: &StateFiles,
    input: &mut R,
    out: &mut W,
) -> Result<PathBuf, PathPromptError> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    match state.default_path() {
        Ok(Some(path)) => return Ok(path),
        Ok(None) => {}
        Err(e) => writeln!(out, "Error reading default path: {e}")?,
    }

    write!(out, "enter sql path: ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(PathPromptError::InputClosed);
    }
    let path = PathBuf::from(line.trim());

    match state.set_default_path(&path) {
        Ok(()) => info!(path = %path.display(), "default path saved"),
        Err(e) => writeln!(out, "Error saving default path: {e}")?,
    }
    Ok(path)
}
