use std::collections::HashSet;

use crate::config::DEFAULT_VOTERS;
use crate::normalize_text;

/// The static list of people allowed to vote.
///
/// Submissions are checked with an exact, case-sensitive comparison. Rows
/// already in the ledger are checked after normalization, since the ledger
/// stores lowercased values.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AllowList {
    names: Vec<String>,
    exact: HashSet<String>,
    normalized: HashSet<String>,
}

impl AllowList {
    pub fn new<S: AsRef<str>>(names: &[S]) -> AllowList {
        let names: Vec<String> = names.iter().map(|s| s.as_ref().to_string()).collect();
        AllowList {
            exact: names.iter().cloned().collect(),
            normalized: names.iter().map(|s| normalize_text(s)).collect(),
            names,
        }
    }

    /// The 12 members of the team.
    pub fn default_roster() -> AllowList {
        AllowList::new(&DEFAULT_VOTERS)
    }

    /// Exact membership. The caller is expected to trim the name.
    pub fn is_allowed(&self, name: &str) -> bool {
        self.exact.contains(name)
    }

    pub(crate) fn contains_normalized(&self, normalized_name: &str) -> bool {
        self.normalized.contains(normalized_name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
