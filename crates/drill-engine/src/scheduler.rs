//! Adaptive requeue scheduling for quiz sessions.

use std::collections::VecDeque;

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::models::{Item, QueueEntry};

/// A card waiting to reappear.
#[derive(Debug, Clone)]
struct PendingRepeat {
    item: Item,
    required_streak: u32,
    due_at: u64,
}

/// Decides which card a quiz shows next.
///
/// Cards start in a shuffled main queue. A missed card moves into the
/// repeat registry and comes due 5 to 10 positions later; once due, it is
/// reinserted near the front of the queue at the next dequeue, at a random
/// slot among the first few so it does not always reappear immediately. A
/// missed card owes two more correct answers; each correct answer pays one
/// off, each miss resets the debt.
///
/// When the main queue empties while repeats are still pending, the
/// scheduler enters the drain phase: pending repeats replay in registry
/// order, round after round, ignoring due positions. Cards missed during a
/// round wait for the next round. The quiz is over when queue and registry
/// are both empty.
pub struct RequeueScheduler<R> {
    queue: VecDeque<QueueEntry>,
    repeats: IndexMap<String, PendingRepeat>,
    position: u64,
    draining: bool,
    rng: R,
}

impl<R: Rng> RequeueScheduler<R> {
    /// Build a scheduler over `items`, shuffled with `rng`.
    pub fn new(items: Vec<Item>, mut rng: R) -> Self {
        let mut items = items;
        items.shuffle(&mut rng);
        let queue = items
            .into_iter()
            .map(|item| QueueEntry {
                item,
                required_streak: 0,
            })
            .collect();
        Self {
            queue,
            repeats: IndexMap::new(),
            position: 0,
            draining: false,
            rng,
        }
    }

    /// Take the next card to show. `None` means every card has retired.
    ///
    /// The dequeue order matters: the front card is popped first, and only
    /// then are due repeats folded back into the queue, so a repeat coming
    /// due can never preempt the card already at the front.
    pub fn next_entry(&mut self) -> Option<QueueEntry> {
        if self.queue.is_empty() {
            if self.repeats.is_empty() {
                return None;
            }
            self.start_drain_round();
        }
        let entry = self.queue.pop_front()?;
        if !self.draining {
            self.reinsert_due();
        }
        Some(entry)
    }

    /// Record a correct answer, scheduling the follow-up when the card
    /// still owes correct answers.
    pub fn mark_correct(&mut self, entry: QueueEntry) {
        if entry.required_streak > 1 {
            self.schedule_repeat(entry.item, entry.required_streak - 1);
        } else {
            trace!(front = %entry.item.front, "card retired");
        }
        self.position += 1;
    }

    /// Record a miss. The card owes two correct answers from here, no
    /// matter what it owed before.
    pub fn mark_incorrect(&mut self, entry: QueueEntry) {
        self.schedule_repeat(entry.item, 2);
        self.position += 1;
    }

    /// Cards left in the main queue, not counting the one being shown.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Cards waiting in the repeat registry.
    pub fn repeat_count(&self) -> usize {
        self.repeats.len()
    }

    /// Number of cards judged so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Whether the scheduler has entered the drain phase.
    pub fn is_draining(&self) -> bool {
        self.draining
    }

    fn start_drain_round(&mut self) {
        self.draining = true;
        let pending = std::mem::take(&mut self.repeats);
        debug!(round_size = pending.len(), "drain round started");
        for (_, repeat) in pending {
            self.queue.push_back(QueueEntry {
                item: repeat.item,
                required_streak: repeat.required_streak,
            });
        }
    }

    /// Move every repeat that has come due back into the queue, each at a
    /// random slot among the first `min(4, len + 1)` positions.
    fn reinsert_due(&mut self) {
        let due: Vec<String> = self
            .repeats
            .iter()
            .filter(|(_, repeat)| repeat.due_at <= self.position)
            .map(|(front, _)| front.clone())
            .collect();
        for front in due {
            let Some(repeat) = self.repeats.shift_remove(&front) else {
                continue;
            };
            let slot = self.rng.gen_range(0..=self.queue.len().min(3));
            trace!(front = %front, slot, "repeat due, reinserting");
            self.queue.insert(
                slot,
                QueueEntry {
                    item: repeat.item,
                    required_streak: repeat.required_streak,
                },
            );
        }
    }

    /// A pending entry for the same card is overwritten in place, keeping
    /// its registry slot and losing its old due position.
    fn schedule_repeat(&mut self, item: Item, required_streak: u32) {
        let due_at = if self.draining {
            // Drain rounds ignore due positions; no delay is drawn.
            0
        } else {
            self.position + self.rng.gen_range(5..=10)
        };
        trace!(front = %item.front, required_streak, due_at, "repeat scheduled");
        self.repeats.insert(
            item.front.clone(),
            PendingRepeat {
                item,
                required_streak,
                due_at,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn item(front: &str) -> Item {
        Item::new(front, format!("{front}-back"), 1, "")
    }

    fn deck(fronts: &[&str]) -> Vec<Item> {
        fronts.iter().map(|f| item(f)).collect()
    }

    fn scheduler(fronts: &[&str], seed: u64) -> RequeueScheduler<ChaCha8Rng> {
        RequeueScheduler::new(deck(fronts), ChaCha8Rng::seed_from_u64(seed))
    }

    /// Drive a whole quiz, answering with `judge`, and return the shown
    /// fronts plus the correct/incorrect tallies.
    fn play<F>(
        sched: &mut RequeueScheduler<ChaCha8Rng>,
        mut judge: F,
    ) -> (Vec<String>, u32, u32)
    where
        F: FnMut(&QueueEntry, &[String]) -> bool,
    {
        let mut shown = Vec::new();
        let mut correct = 0;
        let mut incorrect = 0;
        while let Some(entry) = sched.next_entry() {
            assert!(shown.len() < 1000, "quiz did not terminate");
            shown.push(entry.item.front.clone());
            if judge(&entry, &shown) {
                correct += 1;
                sched.mark_correct(entry);
            } else {
                incorrect += 1;
                sched.mark_incorrect(entry);
            }
        }
        (shown, correct, incorrect)
    }

    #[test]
    fn test_shuffle_keeps_every_card() {
        let fronts = ["a", "b", "c", "d", "e", "f"];
        let mut sched = scheduler(&fronts, 7);
        let (shown, correct, _) = play(&mut sched, |_, _| true);
        assert_eq!(shown.len(), fronts.len());
        assert_eq!(correct as usize, fronts.len());
        let mut sorted = shown.clone();
        sorted.sort();
        assert_eq!(sorted, ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_all_correct_terminates_without_repeats() {
        let mut sched = scheduler(&["a", "b", "c"], 1);
        let (shown, correct, incorrect) = play(&mut sched, |_, _| true);
        assert_eq!(shown.len(), 3);
        assert_eq!(correct, 3);
        assert_eq!(incorrect, 0);
        assert!(!sched.is_draining());
    }

    #[test]
    fn test_single_miss_costs_two_more_answers() {
        // Three cards; the first sight of "a" is missed, everything else
        // is answered correctly. "a" must come back exactly twice.
        let mut sched = scheduler(&["a", "b", "c"], 42);
        let mut missed_once = false;
        let (shown, correct, incorrect) = play(&mut sched, |entry, _| {
            if entry.item.front == "a" && !missed_once {
                missed_once = true;
                false
            } else {
                true
            }
        });
        assert_eq!(correct, 4);
        assert_eq!(incorrect, 1);
        assert_eq!(shown.iter().filter(|f| *f == "a").count(), 3);
        assert_eq!(shown.iter().filter(|f| *f == "b").count(), 1);
        assert_eq!(shown.iter().filter(|f| *f == "c").count(), 1);
    }

    #[test]
    fn test_missed_card_reappears_within_bounds() {
        // Enough filler that the repeat comes due in the main phase. The
        // due position lands 5 to 10 cards out; the scan runs after a pop,
        // and the slot draw can push the sighting up to three cards more.
        let fronts: Vec<String> = (0..30).map(|i| format!("w{i}")).collect();
        let refs: Vec<&str> = fronts.iter().map(|s| s.as_str()).collect();
        let mut sched = scheduler(&refs, 9);

        let mut miss_position = None;
        let mut reappear_position = None;
        let mut first = None;
        let mut count = 0u64;
        while let Some(entry) = sched.next_entry() {
            assert!(count < 200);
            let front = entry.item.front.clone();
            match first {
                None => {
                    // Miss the very first card shown.
                    first = Some(front);
                    miss_position = Some(count);
                    sched.mark_incorrect(entry);
                }
                Some(ref f) if *f == front && reappear_position.is_none() => {
                    reappear_position = Some(count);
                    sched.mark_correct(entry);
                }
                _ => sched.mark_correct(entry),
            }
            count += 1;
        }

        let missed = miss_position.unwrap();
        let again = reappear_position.unwrap();
        assert!(again >= missed + 5, "reappeared before due: {again}");
        assert!(again <= missed + 14, "reappeared too late: {again}");
    }

    #[test]
    fn test_due_repeat_goes_into_first_four_slots() {
        let fronts: Vec<String> = (0..30).map(|i| format!("w{i}")).collect();
        let refs: Vec<&str> = fronts.iter().map(|s| s.as_str()).collect();

        // Across seeds: find the dequeue where the registry entry came due
        // and check the missed card sits within the next four cards.
        for seed in 0..10 {
            let mut sched = scheduler(&refs, seed);
            let first = sched.next_entry().unwrap();
            let missed = first.item.front.clone();
            sched.mark_incorrect(first);

            let mut since_due = None;
            let mut found = false;
            for step in 0..40 {
                let Some(entry) = sched.next_entry() else {
                    break;
                };
                if sched.repeat_count() == 0 && since_due.is_none() {
                    // The registry emptied during this dequeue's due scan;
                    // the scan runs after the pop, so the reinserted card
                    // surfaces one to four pops later.
                    since_due = Some(step);
                }
                if entry.item.front == missed {
                    let due_step = since_due.unwrap();
                    assert!(step > due_step, "seed {seed}: preempted the front");
                    assert!(step - due_step <= 4, "seed {seed}: reinserted too deep");
                    sched.mark_correct(entry);
                    found = true;
                    break;
                }
                sched.mark_correct(entry);
            }
            assert!(found, "seed {seed}: repeat never reappeared");
        }
    }

    #[test]
    fn test_drain_phase_replays_in_rounds() {
        // Both cards are missed on first sight. The drain replays them in
        // miss order; cards corrected during a round are not shown again
        // until the following round.
        let mut sched = scheduler(&["a", "b"], 3);

        let first = sched.next_entry().unwrap();
        let first_front = first.item.front.clone();
        sched.mark_incorrect(first);
        let second = sched.next_entry().unwrap();
        let second_front = second.item.front.clone();
        sched.mark_incorrect(second);

        // Queue is empty, both repeats are far from due: drain starts.
        let r1a = sched.next_entry().unwrap();
        assert!(sched.is_draining());
        assert_eq!(r1a.item.front, first_front);
        sched.mark_correct(r1a);

        // The corrected card waits for the next round; its partner is next.
        let r1b = sched.next_entry().unwrap();
        assert_eq!(r1b.item.front, second_front);
        sched.mark_correct(r1b);

        // Round two replays both in the same order.
        let r2a = sched.next_entry().unwrap();
        assert_eq!(r2a.item.front, first_front);
        sched.mark_correct(r2a);
        let r2b = sched.next_entry().unwrap();
        assert_eq!(r2b.item.front, second_front);
        sched.mark_correct(r2b);

        assert!(sched.next_entry().is_none());
    }

    #[test]
    fn test_drain_terminates_with_late_misses() {
        // Missing a card during the drain keeps the drain going until it
        // is finally answered correctly twice in a row.
        let mut sched = scheduler(&["a", "b", "c"], 11);
        let mut drain_misses = 0;
        let (_, correct, incorrect) = play(&mut sched, |entry, shown| {
            let first_sight = shown.iter().filter(|f| **f == entry.item.front).count() == 1;
            if first_sight {
                false
            } else if entry.item.front == "a" && drain_misses == 0 {
                drain_misses += 1;
                false
            } else {
                true
            }
        });
        assert_eq!(incorrect, 4);
        // b and c: 2 corrects each; a: the extra miss resets it to 2 again.
        assert_eq!(correct, 6);
        assert_eq!(sched.repeat_count(), 0);
        assert_eq!(sched.queue_len(), 0);
    }

    #[test]
    fn test_incorrect_overwrites_pending_repeat() {
        // Two deck entries share a front. Missing both leaves a single
        // registry entry: the second schedule overwrites the first in
        // place, keeping the original registry slot. The most recent miss
        // wins; the earlier due position and streak are dropped.
        let items = vec![
            Item::new("a", "first", 1, ""),
            item("b"),
            Item::new("a", "second", 1, ""),
        ];
        let mut sched = RequeueScheduler::new(items, ChaCha8Rng::seed_from_u64(5));

        let mut seen_backs = Vec::new();
        for _ in 0..3 {
            let entry = sched.next_entry().unwrap();
            if entry.item.front == "a" {
                seen_backs.push(entry.item.back.clone());
                sched.mark_incorrect(entry);
            } else {
                sched.mark_correct(entry);
            }
        }
        assert_eq!(seen_backs.len(), 2);
        assert_eq!(sched.repeat_count(), 1);

        // The surviving entry is the one scheduled last.
        let survivor = sched.next_entry().unwrap();
        assert_eq!(survivor.item.front, "a");
        assert_eq!(survivor.item.back, seen_backs[1]);
    }

    #[test]
    fn test_position_counts_judged_cards() {
        let mut sched = scheduler(&["a", "b", "c"], 2);
        assert_eq!(sched.position(), 0);
        let entry = sched.next_entry().unwrap();
        sched.mark_correct(entry);
        let entry = sched.next_entry().unwrap();
        sched.mark_incorrect(entry);
        assert_eq!(sched.position(), 2);
    }
}
