use std::collections::HashSet;

use uuid::Uuid;

/// Lead ids picked for download, in pick order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<Uuid>,
}

impl Selection {
    pub fn from_ids<I: IntoIterator<Item = Uuid>>(ids: I) -> Self {
        let mut sel = Selection::default();
        for id in ids {
            if !sel.contains(id) {
                sel.ids.push(id);
            }
        }
        sel
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    pub fn toggle(&mut self, id: Uuid) {
        if let Some(pos) = self.ids.iter().position(|x| *x == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    /// Clears when the selection is as large as the filtered set, otherwise
    /// selects exactly the filtered set.
    pub fn toggle_all(&mut self, filtered: &[Uuid]) {
        if self.ids.len() == filtered.len() {
            self.ids.clear();
        } else {
            *self = Selection::from_ids(filtered.iter().copied());
        }
    }

    /// Selected ids the user has not unlocked yet.
    pub fn locked(&self, unlocked: &HashSet<Uuid>) -> Vec<Uuid> {
        locked_leads(&self.ids, unlocked)
    }

    pub fn cost(&self, unlocked: &HashSet<Uuid>) -> i64 {
        self.locked(unlocked).len() as i64
    }
}

/// The subset of `selected` absent from `unlocked`; each one costs a credit.
pub fn locked_leads(selected: &[Uuid], unlocked: &HashSet<Uuid>) -> Vec<Uuid> {
    selected
        .iter()
        .filter(|id| !unlocked.contains(*id))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn cost_counts_only_locked_leads() {
        let leads = ids(3);
        let sel = Selection::from_ids(leads.clone());
        let mut history = HashSet::new();
        assert_eq!(sel.cost(&history), 3);

        history.insert(leads[1]);
        assert_eq!(sel.cost(&history), 2);
        assert_eq!(sel.locked(&history), vec![leads[0], leads[2]]);
    }

    #[test]
    fn duplicates_collapse() {
        let a = Uuid::new_v4();
        let sel = Selection::from_ids([a, a, a]);
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.cost(&HashSet::new()), 1);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let a = Uuid::new_v4();
        let mut sel = Selection::default();
        sel.toggle(a);
        assert!(sel.contains(a));
        sel.toggle(a);
        assert!(sel.is_empty());
    }

    #[test]
    fn toggle_all_selects_filtered_then_clears() {
        let filtered = ids(4);
        let mut sel = Selection::from_ids([filtered[0]]);
        sel.toggle_all(&filtered);
        assert_eq!(sel.ids(), filtered.as_slice());
        sel.toggle_all(&filtered);
        assert!(sel.is_empty());
    }

    #[test]
    fn toggle_all_compares_sizes_only() {
        // Same size as the filtered set but different members still clears.
        let filtered = ids(2);
        let mut sel = Selection::from_ids(ids(2));
        sel.toggle_all(&filtered);
        assert!(sel.is_empty());
    }
}
