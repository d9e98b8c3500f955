//! Result rendering
//!
//! The ranking goes to stdout, one `identity total` line per contributor. The
//! identity details of a history run can additionally be written as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use contributions_collector::{IdentityDetails, Summary};
use num_format::{Locale, ToFormattedString};

/// One line per identity, highest total first, totals with thousands separators
pub fn format_ranking(summary: &Summary) -> String {
    summary
        .ranked()
        .into_iter()
        .map(|(identity, total)| format!("{} {}\n", identity, total.to_formatted_string(&Locale::en)))
        .collect()
}

pub fn write_ranking<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    out.write_all(format_ranking(summary).as_bytes())?;
    out.flush()
}

/// Write the names and logins seen per email as pretty-printed JSON
pub fn write_identities(path: &Path, identities: &BTreeMap<String, IdentityDetails>) -> Result<()> {
    let json = serde_json::to_string_pretty(identities).context("Failed to serialize identities")?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write identities to {}", path.display()))?;
    tracing::info!(path = %path.display(), identities = identities.len(), "Wrote identities");
    Ok(())
}
