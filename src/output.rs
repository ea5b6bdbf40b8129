use std::fmt::Display;
use std::io::Write;

use chrono::Local;
use colored::Colorize;

use crate::error::Result;

/// Line-oriented log sink. Each line is prefixed with a local `[HH:MM:SS]`
/// timestamp unless timestamps are disabled.
pub struct Log<W: Write> {
    out: W,
    timestamps: bool,
}

impl<W: Write> Log<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            timestamps: true,
        }
    }

    pub fn without_timestamps(out: W) -> Self {
        Self {
            out,
            timestamps: false,
        }
    }

    pub fn line(&mut self, message: impl Display) -> Result<()> {
        if self.timestamps {
            let stamp = Local::now().format("%H:%M:%S").to_string();
            write!(self.out, "[{}] ", stamp.dimmed())?;
        }
        writeln!(self.out, "{message}")?;
        Ok(())
    }
}

/// `round(n / total * 100)`, with an empty total reported as 100%.
pub fn percent(n: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    ((n as f64 / total as f64) * 100.0).round() as u64
}

pub fn filter_line(label: &str, values: &[String]) -> String {
    let list: Vec<String> = values.iter().map(|v| v.cyan().to_string()).collect();
    format!("{label}: {}", list.join(", "))
}

pub fn progress_line(collection: &str, id: &str, n: u64, total: u64) -> String {
    format!(
        "Reindex {} / {} {}",
        collection.cyan(),
        format!("#{id}").cyan(),
        format!("{n} / {total} ~ {}%", percent(n, total)).bright_black()
    )
}

pub fn summary_line(reindexed: u64) -> String {
    format!(
        "Reindex complete. Processed {} documents",
        reindexed.to_string().cyan()
    )
}
