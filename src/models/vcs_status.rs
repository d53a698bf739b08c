use std::fmt;

/// Cleanliness and ahead/behind counts of one working tree.
///
/// The default value is the degraded reading used when the probe fails:
/// clean with every count at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcsStatus {
    pub clean: bool,
    pub ahead: u32,
    pub behind: u32,
    pub staged: u32,
    pub unstaged: u32,
    pub untracked: u32,
}

impl Default for VcsStatus {
    fn default() -> Self {
        Self {
            clean: true,
            ahead: 0,
            behind: 0,
            staged: 0,
            unstaged: 0,
            untracked: 0,
        }
    }
}

impl VcsStatus {
    /// Classify `git status --porcelain` output.
    pub fn from_porcelain(output: &str) -> Self {
        let mut status = Self::default();
        let trimmed = output.trim_end();
        if trimmed.trim().is_empty() {
            return status;
        }

        status.clean = false;
        for line in trimmed.lines() {
            let bytes = line.as_bytes();
            if bytes.len() < 2 {
                continue;
            }
            let (x, y) = (bytes[0], bytes[1]);
            if x == b'?' && y == b'?' {
                status.untracked += 1;
            } else if x != b' ' && x != b'?' {
                status.staged += 1;
                if y != b' ' {
                    status.unstaged += 1;
                }
            } else if y != b' ' {
                status.unstaged += 1;
            }
        }
        status
    }

    /// Apply `git rev-list --left-right --count @{upstream}...HEAD` output
    /// (`<behind>\t<ahead>`). Malformed output leaves the counts untouched.
    pub fn with_ahead_behind(mut self, output: &str) -> Self {
        let mut parts = output.split_whitespace();
        if let (Some(behind), Some(ahead), None) = (parts.next(), parts.next(), parts.next()) {
            if let (Ok(behind), Ok(ahead)) = (behind.parse(), ahead.parse()) {
                self.behind = behind;
                self.ahead = ahead;
            }
        }
        self
    }

    pub fn is_synced(&self) -> bool {
        self.clean && self.ahead == 0 && self.behind == 0
    }
}

impl fmt::Display for VcsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synced() {
            return write!(f, "clean");
        }

        let mut parts = vec![if self.clean { "clean" } else { "dirty" }.to_string()];
        if self.ahead > 0 {
            parts.push(format!("↑{}", self.ahead));
        }
        if self.behind > 0 {
            parts.push(format!("↓{}", self.behind));
        }
        if self.staged > 0 {
            parts.push(format!("+{} staged", self.staged));
        }
        if self.unstaged > 0 {
            parts.push(format!("{} unstaged", self.unstaged));
        }
        if self.untracked > 0 {
            parts.push(format!("{} untracked", self.untracked));
        }
        write!(f, "{}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_clean_with_zero_counts() {
        let status = VcsStatus::default();
        assert!(status.clean, "default: degraded status should report clean");
        assert_eq!(status.ahead + status.behind, 0);
        assert_eq!(status.staged + status.unstaged + status.untracked, 0);
    }

    #[test]
    fn from_porcelain_empty_output_is_clean() {
        assert_eq!(
            VcsStatus::from_porcelain("\n"),
            VcsStatus::default(),
            "from_porcelain: empty output should be clean"
        );
    }

    #[test]
    fn from_porcelain_classifies_entries() {
        let output = "M  src/lib.rs\nMM src/main.rs\n M README.md\n?? notes.txt\n?? tmp/\n";
        let status = VcsStatus::from_porcelain(output);

        assert!(!status.clean, "from_porcelain: entries should mark dirty");
        assert_eq!(status.staged, 2, "from_porcelain: X column counts as staged");
        assert_eq!(
            status.unstaged, 2,
            "from_porcelain: Y column counts as unstaged, including MM"
        );
        assert_eq!(status.untracked, 2, "from_porcelain: ?? counts as untracked");
    }

    #[test]
    fn with_ahead_behind_reads_left_as_behind() {
        let status = VcsStatus::default().with_ahead_behind("3\t5\n");
        assert_eq!(status.behind, 3);
        assert_eq!(status.ahead, 5);
    }

    #[test]
    fn with_ahead_behind_ignores_garbage() {
        let status = VcsStatus::default().with_ahead_behind("fatal: no upstream");
        assert_eq!(status.ahead, 0);
        assert_eq!(status.behind, 0);
    }

    #[test]
    fn display_summarises_counts() {
        let status = VcsStatus {
            clean: false,
            ahead: 2,
            behind: 1,
            staged: 1,
            unstaged: 0,
            untracked: 4,
        };
        assert_eq!(status.to_string(), "dirty ↑2 ↓1 +1 staged 4 untracked");
        assert_eq!(VcsStatus::default().to_string(), "clean");
    }
}
