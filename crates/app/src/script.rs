use std::time::Duration;

use lower_third_core::{Command, LowerThirdError, Result};

/// One timed line of a simulation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    pub at: Duration,
    pub command: Command,
}

/// Parses `<ms> <command line>` entries. Blank lines and `#` comments are
/// skipped, as are lines whose command part the bridge does not understand.
/// A bad timestamp is an error. Entries come back ordered by time, keeping
/// file order for equal timestamps.
pub fn parse_script(source: &str) -> Result<Vec<ScriptEntry>> {
    let mut entries = Vec::new();

    for (number, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (stamp, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let millis: u64 = stamp.parse().map_err(|_| {
            LowerThirdError::msg(format!(
                "line {}: expected a millisecond timestamp, found `{stamp}`",
                number + 1
            ))
        })?;

        match Command::parse_line(rest) {
            Ok(command) => entries.push(ScriptEntry {
                at: Duration::from_millis(millis),
                command,
            }),
            Err(err) => tracing::warn!(line = number + 1, %err, "skipping script line"),
        }
    }

    entries.sort_by_key(|entry| entry.at);
    Ok(entries)
}
