//! Export command: prints the ledger in its stored JSON form.

use std::io::Write;

use anyhow::{Context, Result};
use trike_core::Ledger;

pub fn run<W: Write>(writer: &mut W, ledger: &Ledger) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &ledger.to_stored())
        .context("failed to serialize ledger")?;
    writeln!(writer)?;
    Ok(())
}
