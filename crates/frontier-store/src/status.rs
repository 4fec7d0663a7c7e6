use std::collections::BTreeSet;

/// Working-tree status scoped to a subpath.
///
/// All paths are relative to the working tree root, `/`-separated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatus {
    /// Staged files that do not exist in the last commit
    pub added: BTreeSet<String>,
    /// Tracked files whose content differs from the last commit
    pub changed: BTreeSet<String>,
    /// Tracked files deleted from the index or the working tree
    pub removed: BTreeSet<String>,
    /// Files unknown to the store
    pub untracked: BTreeSet<String>,
}

impl StoreStatus {
    /// `true` when nothing under the scoped path differs from the last commit.
    pub fn is_clean(&self) -> bool {
        self.added.is_empty()
            && self.changed.is_empty()
            && self.removed.is_empty()
            && self.untracked.is_empty()
    }

    /// `true` when a tracked file is touched (staged or not).
    pub fn has_tracked_changes(&self) -> bool {
        !self.added.is_empty() || !self.changed.is_empty() || !self.removed.is_empty()
    }

    /// Parse `git status --porcelain=v1 -z --no-renames` output.
    ///
    /// Each entry is `XY <path>` terminated by NUL, where `X` is the index
    /// column and `Y` the working-tree column.
    pub fn from_porcelain(output: &str) -> Self {
        let mut status = StoreStatus::default();

        for entry in output.split('\0').filter(|e| e.len() > 3) {
            let mut codes = entry.chars();
            let (x, y) = match (codes.next(), codes.next()) {
                (Some(x), Some(y)) => (x, y),
                _ => continue,
            };
            let path = entry[3..].to_string();

            match (x, y) {
                ('?', '?') => {
                    status.untracked.insert(path);
                }
                ('!', '!') => {}
                ('A', _) => {
                    status.added.insert(path);
                }
                ('D', _) | (_, 'D') => {
                    status.removed.insert(path);
                }
                _ => {
                    status.changed.insert(path);
                }
            }
        }

        status
    }
}
