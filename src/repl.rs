use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

use crate::command::Command;
use crate::state::StateFiles;
use crate::store::SessionStore;

/// Prompt printed before every line and in front of recalled bookmarks.
pub const PROMPT: &str = "SQL> ";

/// In-progress SQL text awaiting a terminating `;`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SqlBuffer {
    text: String,
}

impl SqlBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Append a raw input line followed by a separating space.
    pub fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push(' ');
    }

    /// Replace the whole buffer, as bookmark recall does.
    pub fn replace(&mut self, content: impl Into<String>) {
        self.text = content.into();
    }

    pub fn is_complete(&self) -> bool {
        self.text.trim().ends_with(';')
    }

    /// Take the trimmed statement if it is complete, leaving the buffer empty.
    pub fn take_complete(&mut self) -> Option<String> {
        if !self.is_complete() {
            return None;
        }
        let statement = self.text.trim().to_string();
        self.text.clear();
        Some(statement)
    }
}

/// Everything a command handler may touch.
#[derive(Debug)]
pub struct Session {
    pub store: SessionStore,
    pub state: StateFiles,
    pub buffer: SqlBuffer,
}

enum Flow {
    Continue,
    Exit,
}

/// The read-eval-print loop.
///
/// Generic over its input and output so whole sessions can be scripted.
#[derive(Debug)]
pub struct Repl {
    session: Session,
}

impl Repl {
    pub fn new(store: SessionStore, state: StateFiles) -> Self {
        Self {
            session: Session {
                store,
                state,
                buffer: SqlBuffer::new(),
            },
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Main REPL loop. Returns on `exit` or end of input.
    ///
    /// Only failures of `input` or `out` themselves end the loop with an error.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> io::Result<()> {
        let mut raw = Vec::new();
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            raw.clear();
            if input.read_until(b'\n', &mut raw)? == 0 {
                debug!("end of input");
                break;
            }
            // Undecodable bytes become U+FFFD instead of ending the session.
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if let Flow::Exit = self.handle_line(line, out)? {
                break;
            }
        }
        Ok(())
    }

    fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        match Command::parse(line) {
            Command::Exit => return Ok(Flow::Exit),
            Command::List => return self.list(out).map(|_| Flow::Continue),
            Command::Unstar => return self.unstar(out).map(|_| Flow::Continue),
            Command::Star => return self.star(out).map(|_| Flow::Continue),
            Command::Zip => return self.zip(out).map(|_| Flow::Continue),
            Command::Recall(id) => {
                if !self.recall(id, out)? {
                    return Ok(Flow::Continue);
                }
            }
            Command::Fragment(text) => self.session.buffer.push_line(&text),
        }

        if let Some(statement) = self.session.buffer.take_complete() {
            self.execute(&statement, out)?;
        }
        Ok(Flow::Continue)
    }

    fn list<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self.session.store.bookmarks() {
            Ok(bookmarks) if bookmarks.is_empty() => writeln!(out, "no data"),
            Ok(bookmarks) => {
                for bookmark in bookmarks {
                    writeln!(out, "{}. {}", bookmark.id, bookmark.content)?;
                }
                Ok(())
            }
            Err(e) => writeln!(out, "Error: {e}"),
        }
    }

    fn unstar<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(last_sql) = self.last_sql(out)? else {
            return Ok(());
        };
        match self.session.store.unstar(&last_sql) {
            Ok(_) => writeln!(out, "success"),
            Err(e) => writeln!(out, "Error: {e}"),
        }
    }

    fn star<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(last_sql) = self.last_sql(out)? else {
            return Ok(());
        };
        match self.session.store.star(&last_sql) {
            Ok(_) => writeln!(out, "starred"),
            Err(e) => writeln!(out, "Error: {e}"),
        }
    }

    fn zip<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self.session.store.zip() {
            Ok(()) => writeln!(out, "zipped"),
            Err(e) => writeln!(out, "Error: {e}"),
        }
    }

    /// Load bookmark `id` into the buffer. Returns false when nothing was loaded.
    fn recall<W: Write>(&mut self, id: i64, out: &mut W) -> io::Result<bool> {
        match self.session.store.bookmark(id) {
            Ok(Some(bookmark)) => {
                writeln!(out, "{PROMPT}{}", bookmark.content)?;
                self.session.buffer.replace(bookmark.content);
                Ok(true)
            }
            Ok(None) => {
                writeln!(out, "no such index.")?;
                Ok(false)
            }
            Err(e) => {
                writeln!(out, "Error: {e}")?;
                Ok(false)
            }
        }
    }

    fn execute<W: Write>(&mut self, statement: &str, out: &mut W) -> io::Result<()> {
        if let Err(e) = self.session.store.execute(statement, out) {
            warn!(error = %e, "statement failed");
            writeln!(out, "Execute error: {e}")?;
        }
        if let Err(e) = self.session.state.set_last_sql(statement) {
            writeln!(out, "Error saving last SQL: {e}")?;
        }
        Ok(())
    }

    fn last_sql<W: Write>(&self, out: &mut W) -> io::Result<Option<String>> {
        match self.session.state.last_sql() {
            Ok(sql) => Ok(Some(sql)),
            Err(e) => {
                writeln!(out, "Error reading last SQL: {e}")?;
                Ok(None)
            }
        }
    }
}
