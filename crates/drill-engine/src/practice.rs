//! Bidirectional cursor for untimed practice runs.

use crate::models::Item;

/// Walks a deck in group order, one card at a time.
///
/// Practice never shuffles and never records per-card answers; the cursor
/// just moves forward on advance and back on request, with backing out of
/// the first card guarded off.
#[derive(Debug, Clone)]
pub struct PracticeNavigator {
    items: Vec<Item>,
    index: usize,
}

impl PracticeNavigator {
    /// Build a navigator over `items`, reordered by group. Cards within a
    /// group keep their deck order.
    pub fn new(mut items: Vec<Item>) -> Self {
        items.sort_by_key(|item| item.group);
        Self { items, index: 0 }
    }

    /// The card under the cursor, or `None` once the run is finished.
    pub fn current(&self) -> Option<&Item> {
        self.items.get(self.index)
    }

    /// One-based number of the current card, for display.
    pub fn current_number(&self) -> usize {
        self.index + 1
    }

    /// Total cards in the run.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Zero-based cursor position.
    pub fn cursor(&self) -> usize {
        self.index
    }

    /// Move to the next card. Advancing past the last card finishes the
    /// run; `current` then returns `None`.
    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// Step back one card. Returns `false` when already at the first card.
    pub fn back(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(front: &str, group: u32) -> Item {
        Item::new(front, format!("{front}-back"), group, "")
    }

    #[test]
    fn test_orders_by_group_keeping_deck_order() {
        let nav = PracticeNavigator::new(vec![
            item("a", 2),
            item("b", 1),
            item("c", 2),
            item("d", 1),
        ]);
        let fronts: Vec<&str> = nav.items.iter().map(|i| i.front.as_str()).collect();
        assert_eq!(fronts, ["b", "d", "a", "c"]);
    }

    #[test]
    fn test_back_at_first_card_is_guarded() {
        let mut nav = PracticeNavigator::new(vec![item("a", 1), item("b", 1)]);
        assert!(!nav.back());
        assert_eq!(nav.cursor(), 0);
        assert_eq!(nav.current().map(|i| i.front.as_str()), Some("a"));
    }

    #[test]
    fn test_advance_four_then_back_lands_on_fourth() {
        let items: Vec<Item> = (0..5).map(|i| item(&format!("w{i}"), 1)).collect();
        let mut nav = PracticeNavigator::new(items);
        for _ in 0..4 {
            nav.advance();
        }
        assert!(nav.back());
        assert_eq!(nav.cursor(), 3);
    }

    #[test]
    fn test_advancing_past_the_end_finishes() {
        let mut nav = PracticeNavigator::new(vec![item("a", 1)]);
        assert_eq!(nav.current_number(), 1);
        assert_eq!(nav.total(), 1);
        nav.advance();
        assert!(nav.current().is_none());
    }
}
