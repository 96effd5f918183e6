use std::fmt::{self, Display};

use colored::Colorize;

/// Display symbol for a raw submission status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusSymbol {
    /// The latest submission passed.
    Success,
    /// The latest submission did not pass.
    Failure,
    /// The latest submission could not be evaluated.
    Error,
    /// No submission, or a status outside the known vocabulary.
    Blank,
}

impl StatusSymbol {
    /// Maps a raw status onto a symbol.
    ///
    /// Both the terse codes (`SUCCESSFUL`, `UNSUCCESSFUL`, `ERROR`) and the
    /// human-readable labels (`Completed`, `Incomplete`, `Error`) are accepted,
    /// in any case. Everything else, including no status at all, is blank.
    pub fn from_status(status: Option<&str>) -> Self {
        let Some(status) = status else {
            return StatusSymbol::Blank;
        };

        match status.trim().to_ascii_lowercase().as_str() {
            "successful" | "completed" => StatusSymbol::Success,
            "unsuccessful" | "incomplete" => StatusSymbol::Failure,
            "error" => StatusSymbol::Error,
            _ => StatusSymbol::Blank,
        }
    }

    /// Returns the bare symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            StatusSymbol::Success => "✅",
            StatusSymbol::Failure => "❌",
            StatusSymbol::Error => "⚠️",
            StatusSymbol::Blank => "",
        }
    }

    /// Returns a plain-text marker for terminals, colored when supported.
    pub fn colored(&self) -> String {
        match self {
            StatusSymbol::Success => "✔".green().to_string(),
            StatusSymbol::Failure => "✘".red().to_string(),
            StatusSymbol::Error => "!".yellow().bold().to_string(),
            StatusSymbol::Blank => String::new(),
        }
    }
}

impl Display for StatusSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
