//! Helpers shared by the command modules.

use std::io::{self, Write};

use tickdown_core::{Database, KvStore, MemoryKv};

/// Open the kv store, falling back to a process-local map when the
/// database is unavailable. The command still runs; its changes are
/// simply not persisted.
pub fn open_kv() -> Box<dyn KvStore> {
    match Database::open() {
        Ok(db) => Box::new(db),
        Err(e) => {
            tracing::warn!("storage unavailable, changes will not persist: {e}");
            Box::new(MemoryKv::new())
        }
    }
}

/// Ask a yes/no question and read one line from stdin. Anything but an
/// explicit yes declines.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
