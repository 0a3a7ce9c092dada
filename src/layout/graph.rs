//! Locked/movable classification of a layout's objects

use std::collections::HashSet;

use tracing::warn;

use super::types::Layout;

/// Which objects the solver may touch.
///
/// Built once per request. Both lists keep layout order so every pass over
/// them is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutGraph {
    locked: Vec<String>,
    movable: Vec<String>,
    locked_set: HashSet<String>,
}

impl LayoutGraph {
    /// Split a layout into locked and movable objects.
    ///
    /// An object is locked when it is structural, carries the locked flag,
    /// or is named in `user_locked_ids`. Ids that match nothing are logged
    /// and otherwise ignored.
    pub fn classify<S: AsRef<str>>(layout: &Layout, user_locked_ids: &[S]) -> Self {
        let requested: HashSet<&str> = user_locked_ids.iter().map(|id| id.as_ref()).collect();

        for id in user_locked_ids.iter().map(|id| id.as_ref()) {
            if layout.get(id).is_some() {
                continue;
            }
            let known: Vec<&str> = layout.objects().iter().map(|o| o.id.as_str()).collect();
            let suggestions = find_similar(&known, id, 2);
            if suggestions.is_empty() {
                warn!(id, "locked id does not match any object");
            } else {
                warn!(
                    id,
                    did_you_mean = %suggestions.join(", "),
                    "locked id does not match any object"
                );
            }
        }

        let mut locked = Vec::new();
        let mut movable = Vec::new();
        for obj in layout.objects() {
            if obj.is_fixed() || requested.contains(obj.id.as_str()) {
                locked.push(obj.id.clone());
            } else {
                movable.push(obj.id.clone());
            }
        }
        let locked_set = locked.iter().cloned().collect();

        Self {
            locked,
            movable,
            locked_set,
        }
    }

    pub fn locked_ids(&self) -> &[String] {
        &self.locked
    }

    pub fn movable_ids(&self) -> &[String] {
        &self.movable
    }

    pub fn is_locked(&self, id: &str) -> bool {
        self.locked_set.contains(id)
    }

    /// True only for ids that were classified as movable
    pub fn is_movable(&self, id: &str) -> bool {
        !self.is_locked(id) && self.movable.iter().any(|m| m == id)
    }

    /// `(locked, movable)`
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.locked, self.movable)
    }
}

/// Edit distance between two ids
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Up to three known ids within `max_distance` edits of `target`, closest first
fn find_similar(known: &[&str], target: &str, max_distance: usize) -> Vec<String> {
    let mut candidates: Vec<(&str, usize)> = known
        .iter()
        .map(|id| (*id, levenshtein_distance(id, target)))
        .filter(|(_, d)| *d > 0 && *d <= max_distance)
        .collect();
    candidates.sort_by_key(|(_, d)| *d);
    candidates
        .into_iter()
        .take(3)
        .map(|(id, _)| id.to_string())
        .collect()
}
