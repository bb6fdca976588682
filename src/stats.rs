//! Summary of a finished report: how many books can be had, and how.

use crate::report::ReportScan;
use std::fmt;

/// Books grouped by the kinds of offers they got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub has_text: usize,
    pub has_audio: usize,
    pub has_both: usize,
    pub has_none: usize,
}

impl Summary {
    /// Tallies every book block of a scanned report.
    pub fn from_scan(scan: &ReportScan) -> Self {
        let mut summary = Self::default();
        for block in &scan.blocks {
            match (block.has_text, block.has_audio) {
                (true, true) => summary.has_both += 1,
                (true, false) => summary.has_text += 1,
                (false, true) => summary.has_audio += 1,
                (false, false) => summary.has_none += 1,
            }
        }
        summary
    }

    /// Total number of books.
    pub fn total(&self) -> usize {
        self.has_text + self.has_audio + self.has_both + self.has_none
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Of {} books:", self.total())?;
        writeln!(f, " - {} are available as ebooks,", self.has_text)?;
        writeln!(f, " - {} are available as audiobooks,", self.has_audio)?;
        writeln!(f, " - {} are available as both,", self.has_both)?;
        write!(f, " - {} are unavailable.", self.has_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let report = "A: One\n- text, Available now at x (A: One)\n- audio, About 2 weeks at x (A: One)\nB: Two\nC: Three\n- audio, Several months at y (C: Three)\nD: Four\n- text, About 1 days at y (D: Four)\n- text, About 9 days at z (D: Four)\n";
        let scan = ReportScan::read(report.as_bytes()).unwrap();

        let summary = Summary::from_scan(&scan);
        assert_eq!(
            summary,
            Summary {
                has_text: 1,
                has_audio: 1,
                has_both: 1,
                has_none: 1
            }
        );
        assert_eq!(
            summary.to_string(),
            "Of 4 books:\n - 1 are available as ebooks,\n - 1 are available as audiobooks,\n - 1 are available as both,\n - 1 are unavailable."
        );
    }

    #[test]
    fn test_empty_report() {
        let scan = ReportScan::read("".as_bytes()).unwrap();
        assert_eq!(Summary::from_scan(&scan).total(), 0);
    }
}
