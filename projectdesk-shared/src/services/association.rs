/// Many-to-many reconciliation.

use std::collections::HashSet;
use std::hash::Hash;

/// How a requested id list relates to the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The request is the complete new set.
    Replace,
    /// The request only adds; nothing is disconnected.
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationDiff<T> {
    pub connect: Vec<T>,
    pub disconnect: Vec<T>,
}

impl<T> AssociationDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.connect.is_empty() && self.disconnect.is_empty()
    }
}

/// `connect = requested ∖ current` in request order, and in replace mode
/// `disconnect = current ∖ requested` in stored order. Both are deduplicated.
pub fn diff<T>(current: &[T], requested: &[T], mode: Mode) -> AssociationDiff<T>
where
    T: Eq + Hash + Clone,
{
    let current_set: HashSet<&T> = current.iter().collect();
    let requested_set: HashSet<&T> = requested.iter().collect();

    let mut seen = HashSet::new();
    let connect = requested
        .iter()
        .filter(|id| !current_set.contains(id) && seen.insert(*id))
        .cloned()
        .collect();

    let disconnect = match mode {
        Mode::Merge => Vec::new(),
        Mode::Replace => {
            let mut seen = HashSet::new();
            current
                .iter()
                .filter(|id| !requested_set.contains(id) && seen.insert(*id))
                .cloned()
                .collect()
        }
    };

    AssociationDiff { connect, disconnect }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_connects_and_disconnects() {
        let d = diff(&[1, 2, 3], &[2, 3, 4], Mode::Replace);
        assert_eq!(d.connect, vec![4]);
        assert_eq!(d.disconnect, vec![1]);
    }

    #[test]
    fn test_identical_sets_are_a_no_op() {
        let d = diff(&[1, 2, 3], &[3, 1, 2], Mode::Replace);
        assert!(d.is_empty());
    }

    #[test]
    fn test_merge_never_disconnects() {
        let d = diff(&[1, 2], &[5], Mode::Merge);
        assert_eq!(d.connect, vec![5]);
        assert!(d.disconnect.is_empty());
    }

    #[test]
    fn test_duplicates_collapse_and_order_is_kept() {
        let d = diff(&[9, 1, 9], &[7, 3, 7, 3], Mode::Replace);
        assert_eq!(d.connect, vec![7, 3]);
        assert_eq!(d.disconnect, vec![9, 1]);
    }

    #[test]
    fn test_works_on_text() {
        let current = vec!["Rust".to_string(), "SQL".to_string()];
        let requested = vec!["SQL".to_string(), "Go".to_string()];
        let d = diff(&current, &requested, Mode::Replace);
        assert_eq!(d.connect, vec!["Go".to_string()]);
        assert_eq!(d.disconnect, vec!["Rust".to_string()]);
    }
}
