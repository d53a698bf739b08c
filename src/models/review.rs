use serde::{Deserialize, Serialize};
use std::fmt;

/// Pull request attached to a working tree's branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub number: u64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "isDraft")]
    pub is_draft: bool,
}

impl fmt::Display for ReviewRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_draft {
            write!(f, "#{} (draft) {}", self.number, self.title)
        } else {
            write!(f, "#{} {}", self.number, self.title)
        }
    }
}
