//! Deck loading and filtering.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use drill_engine::Item;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("deck has no cards")]
    Empty,
    #[error("card '{0}' uses group 0, which is reserved for \"all groups\"")]
    ReservedGroup(String),
}

/// The full card set, loaded once at startup.
#[derive(Debug)]
pub struct Deck {
    items: Vec<Item>,
}

impl Deck {
    /// Load cards from a CSV file with `front,back,group,tag` columns.
    ///
    /// Group numbers must be positive; 0 is the "all groups" selector and
    /// cannot name a real group.
    pub fn load(path: &Path) -> Result<Self, DeckError> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(file);
        let mut items = Vec::new();
        for row in reader.deserialize() {
            let item: Item = row?;
            if item.group == 0 {
                return Err(DeckError::ReservedGroup(item.front));
            }
            items.push(item);
        }
        if items.is_empty() {
            return Err(DeckError::Empty);
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Group numbers present in the deck, ascending.
    pub fn groups(&self) -> Vec<u32> {
        let mut groups: Vec<u32> = self.items.iter().map(|i| i.group).collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    pub fn all(&self) -> Vec<Item> {
        self.items.clone()
    }

    pub fn group(&self, group: u32) -> Vec<Item> {
        self.items
            .iter()
            .filter(|i| i.group == group)
            .cloned()
            .collect()
    }

    /// The cards whose fronts appear in `fronts`, in deck order.
    pub fn with_fronts(&self, fronts: &HashSet<String>) -> Vec<Item> {
        self.items
            .iter()
            .filter(|i| fronts.contains(&i.front))
            .cloned()
            .collect()
    }
}
