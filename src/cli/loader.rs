use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::Context;

use crate::{
    debugger::{Component, DebugLevel, Debugger},
    error::IndexError,
    idx_info, idx_scope,
    storage::RecordIndex,
};

/// Reads `key,value` lines. Blank lines are skipped, and so is a leading
/// header whose first field is not an integer. The value is everything
/// after the first comma, trimmed.
pub fn parse_records(reader: impl BufRead) -> anyhow::Result<Vec<(i64, String)>> {
    let mut records = Vec::new();
    let mut seen_data = false;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed to read line {}", line_no))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(',') else {
            return Err(IndexError::InvalidRecord {
                line: line_no,
                reason: "expected key,value".to_string(),
            }
            .into());
        };

        let key = match key.trim().parse::<i64>() {
            Ok(key) => key,
            Err(_) if !seen_data => {
                seen_data = true;
                continue;
            }
            Err(_) => {
                return Err(IndexError::InvalidRecord {
                    line: line_no,
                    reason: format!("key '{}' is not an integer", key.trim()),
                }
                .into());
            }
        };

        seen_data = true;
        records.push((key, value.trim().to_string()));
    }

    Ok(records)
}

/// Inserts every record of the CSV at `path`, returning how many were loaded.
pub fn load_csv(
    path: &Path,
    index: &mut dyn RecordIndex<i64, String>,
    debugger: &Debugger,
) -> anyhow::Result<usize> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file '{}'", path.display()))?;

    let records = parse_records(BufReader::new(file))
        .with_context(|| format!("failed to load '{}'", path.display()))?;

    let count = records.len();
    idx_scope!(debugger, DebugLevel::Debug, Component::Loader, "load", {
        for (key, value) in records {
            index.insert(key, value);
        }
    });

    idx_info!(
        debugger,
        Component::Loader,
        "loaded {} records from '{}' into {}",
        count,
        path.display(),
        index.name()
    );

    Ok(count)
}
