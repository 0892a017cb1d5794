//! dbterminal CLI entry point.

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use dbterminal::cli::{resolve_working_db, Args};
use dbterminal::repl::Repl;
use dbterminal::store::SessionStore;

fn main() -> Result<()> {
    let args = Args::parse_normalized();

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();

    let state = args.state_files();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout().lock();

    let working_db = resolve_working_db(args.db.clone(), &state, &mut input, &mut stdout)?;
    let bookmark_db = args.bookmark_db();

    let store = SessionStore::open(&working_db, &bookmark_db).with_context(|| {
        format!(
            "Connect to database failed: {} (bookmarks: {})",
            working_db.display(),
            bookmark_db.display()
        )
    })?;

    writeln!(stdout, "Connect to database: {}", working_db.display())?;
    writeln!(stdout, "In interactive mode now (Type 'exit' to leave)")?;

    let mut repl = Repl::new(store, state);
    let outcome = repl.run(&mut input, &mut stdout);

    repl.into_session().store.close()?;
    outcome.context("Failed to read input")
}
