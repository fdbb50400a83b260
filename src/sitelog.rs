use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDateTime};
use tracing::{info, warn};

use crate::utils::error::Result;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only per-site run log, one `[timestamp] message` line per entry.
///
/// This is the durable record the 30-day retention window applies to;
/// console output goes through tracing and is filtered separately.
#[derive(Debug, Clone)]
pub struct SiteLogger {
    site: String,
    path: PathBuf,
}

impl SiteLogger {
    pub fn new(logs_dir: &Path, site: &str) -> Result<Self> {
        fs::create_dir_all(logs_dir)?;
        Ok(Self {
            site: site.to_string(),
            path: logs_dir.join(format!("{site}.log")),
        })
    }

    pub fn log(&self, message: &str) {
        info!(site = %self.site, "{message}");

        let line = format!("[{}] {}\n", Local::now().format(TIMESTAMP_FORMAT), message);
        let append = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()));
        if let Err(err) = append {
            warn!(site = %self.site, %err, "failed to append to site log");
        }
    }
}

/// Drop log entries older than the retention window. Runs once at process
/// start; lines with an unparsable timestamp are kept.
pub fn prune_logs(logs_dir: &Path, retention_days: u32) -> Result<()> {
    if !logs_dir.exists() {
        return Ok(());
    }

    let cutoff = Local::now().naive_local() - Duration::days(i64::from(retention_days));

    for entry in fs::read_dir(logs_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("log") {
            continue;
        }

        let contents = fs::read_to_string(&path)?;
        let kept: Vec<&str> = contents
            .lines()
            .filter(|line| match entry_timestamp(line) {
                Some(ts) => ts >= cutoff,
                None => true,
            })
            .collect();

        if kept.len() != contents.lines().count() {
            let mut rewritten = kept.join("\n");
            if !rewritten.is_empty() {
                rewritten.push('\n');
            }
            fs::write(&path, rewritten)?;
        }
    }

    Ok(())
}

fn entry_timestamp(line: &str) -> Option<NaiveDateTime> {
    let stamp = line.strip_prefix('[')?.split(']').next()?;
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}
