//! Pairwise symmetric difference under an arbitrary equality predicate.
//!
//! Records are not hashable under structural equality, so both directions
//! are an O(n*m) scan. API surfaces are small enough for this to be fine.

use super::types::{DiffEntry, DiffOperation, DiffSet};

/// Reports items of `list1` missing from `list2` through `on_removed`, then
/// items of `list2` missing from `list1` through `on_added`. Each side keeps
/// its source order.
pub fn diff<T, Eq, Added, Removed>(
    list1: &[T],
    list2: &[T],
    eq: Eq,
    mut on_added: Added,
    mut on_removed: Removed,
) where
    Eq: Fn(&T, &T) -> bool,
    Added: FnMut(&T),
    Removed: FnMut(&T),
{
    for old in list1 {
        if !list2.iter().any(|new| eq(old, new)) {
            on_removed(old);
        }
    }
    for new in list2 {
        if !list1.iter().any(|old| eq(old, new)) {
            on_added(new);
        }
    }
}

/// Collects [`diff`] over borrowed records into an owned [`DiffSet`].
pub fn diff_set<T, Eq>(list1: &[&T], list2: &[&T], eq: Eq) -> DiffSet<T>
where
    T: Clone,
    Eq: Fn(&T, &T) -> bool,
{
    let mut removed = Vec::new();
    let mut added = Vec::new();
    diff(
        list1,
        list2,
        |a: &&T, b: &&T| eq(*a, *b),
        |item| {
            added.push(DiffEntry {
                operation: DiffOperation::Added,
                item: (*item).clone(),
            })
        },
        |item| {
            removed.push(DiffEntry {
                operation: DiffOperation::Removed,
                item: (*item).clone(),
            })
        },
    );
    DiffSet::from_parts(removed, added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_then_added_in_source_order() {
        let mut events = Vec::new();
        let old = [1, 2, 3, 4];
        let new = [3, 5, 1, 6];
        let mut added = Vec::new();
        let mut removed = Vec::new();
        diff(&old, &new, |a, b| a == b, |x| added.push(*x), |x| removed.push(*x));
        events.extend(removed.iter().map(|x| format!("-{x}")));
        events.extend(added.iter().map(|x| format!("+{x}")));
        assert_eq!(events, vec!["-2", "-4", "+5", "+6"]);
    }

    #[test]
    fn test_custom_equality() {
        let old = ["Foo", "bar"];
        let new = ["foo", "BAZ"];
        let set = diff_set(
            &old.iter().collect::<Vec<_>>(),
            &new.iter().collect::<Vec<_>>(),
            |a: &&str, b: &&str| a.eq_ignore_ascii_case(b),
        );
        assert_eq!(set.removed().collect::<Vec<_>>(), vec![&"bar"]);
        assert_eq!(set.added().collect::<Vec<_>>(), vec![&"BAZ"]);
    }

    #[test]
    fn test_identical_lists_produce_nothing() {
        let items = ["a", "b"];
        let refs: Vec<_> = items.iter().collect();
        let set = diff_set(&refs, &refs, |a: &&str, b: &&str| a == b);
        assert!(set.is_empty());
    }
}
