//! Ordered queue of workout segments

use super::item::{ItemFields, ItemId, ItemPatch, TimerItem};

/// The playback queue. Insertion order is playback order.
///
/// Ids come from a counter owned by the queue, so they stay unique for the
/// lifetime of the queue even across [`Queue::load_all`].
#[derive(Debug, Clone)]
pub struct Queue {
    items: Vec<TimerItem>,
    next_id: u64,
}

impl Queue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a queue holding one default item, the way a fresh session starts
    pub fn with_default_item() -> Self {
        let mut queue = Self::new();
        queue.add();
        queue
    }

    fn fresh_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn items(&self) -> &[TimerItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&TimerItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Field-only projection of every item, in order
    pub fn fields(&self) -> Vec<ItemFields> {
        self.items.iter().map(|item| item.fields).collect()
    }

    /// Sum of all item durations in seconds
    pub fn total_duration(&self) -> u64 {
        self.items.iter().map(TimerItem::duration).sum()
    }

    /// Append a default item and return its id
    pub fn add(&mut self) -> ItemId {
        let id = self.fresh_id();
        self.items.push(TimerItem {
            id,
            fields: ItemFields::default(),
        });
        id
    }

    /// Remove the item with `id`. Returns false when no such item exists.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Merge `patch` into the item with `id`. Unknown ids are ignored.
    pub fn update(&mut self, id: ItemId, patch: &ItemPatch) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                patch.apply(&mut item.fields);
                true
            }
            None => false,
        }
    }

    /// Swap the item at `index` with its neighbour at `index + direction`.
    /// Out-of-range targets leave the queue untouched and return false.
    pub fn move_item(&mut self, index: usize, direction: isize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        let target = match index.checked_add_signed(direction) {
            Some(target) if target < self.items.len() => target,
            _ => return false,
        };
        self.items.swap(index, target);
        true
    }

    /// Replace the whole queue with fresh items built from `fields`
    pub fn load_all(&mut self, fields: &[ItemFields]) {
        let items = fields
            .iter()
            .map(|f| TimerItem {
                id: self.fresh_id(),
                fields: *f,
            })
            .collect();
        self.items = items;
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(queue: &Queue) -> Vec<ItemId> {
        queue.items().iter().map(|i| i.id).collect()
    }

    #[test]
    fn add_appends_defaults_with_unique_ids() {
        let mut queue = Queue::new();
        let a = queue.add();
        let b = queue.add();
        assert_ne!(a, b);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.get(1).unwrap().fields, ItemFields::default());
        assert_eq!(queue.get(1).unwrap().duration(), 60);
    }

    #[test]
    fn remove_is_noop_for_unknown_id() {
        let mut queue = Queue::new();
        let a = queue.add();
        assert!(!queue.remove(ItemId(999)));
        assert_eq!(queue.len(), 1);
        assert!(queue.remove(a));
        assert!(queue.is_empty());
    }

    #[test]
    fn ids_are_never_reused_after_removal() {
        let mut queue = Queue::new();
        let a = queue.add();
        queue.remove(a);
        let b = queue.add();
        assert_ne!(a, b);
    }

    #[test]
    fn update_merges_only_given_fields() {
        let mut queue = Queue::new();
        let id = queue.add();
        let patch = ItemPatch {
            seconds: Some(30),
            ..Default::default()
        };
        assert!(queue.update(id, &patch));
        let fields = queue.get(0).unwrap().fields;
        assert_eq!(fields, ItemFields::new(1, 30, 5.0));

        assert!(!queue.update(ItemId(42), &patch));
    }

    #[test]
    fn move_swaps_neighbours() {
        let mut queue = Queue::new();
        let a = queue.add();
        let b = queue.add();
        let c = queue.add();
        assert!(queue.move_item(0, 1));
        assert_eq!(ids(&queue), vec![b, a, c]);
        assert!(queue.move_item(2, -1));
        assert_eq!(ids(&queue), vec![b, c, a]);
    }

    #[test]
    fn move_at_boundaries_is_noop() {
        let mut queue = Queue::new();
        let a = queue.add();
        let b = queue.add();
        assert!(!queue.move_item(0, -1));
        assert!(!queue.move_item(1, 1));
        assert!(!queue.move_item(5, -1));
        assert_eq!(ids(&queue), vec![a, b]);
    }

    #[test]
    fn load_all_replaces_with_fresh_ids() {
        let mut queue = Queue::with_default_item();
        queue.add();
        let before = ids(&queue);

        queue.load_all(&[ItemFields::new(1, 30, 6.0)]);
        assert_eq!(queue.len(), 1);
        let item = queue.get(0).unwrap();
        assert_eq!(item.fields, ItemFields::new(1, 30, 6.0));
        assert!(!before.contains(&item.id));
    }

    #[test]
    fn total_duration_sums_items() {
        let mut queue = Queue::new();
        queue.load_all(&[ItemFields::new(1, 0, 5.0), ItemFields::new(0, 30, 8.0)]);
        assert_eq!(queue.total_duration(), 90);
        assert_eq!(queue.fields().len(), 2);
    }
}
