use rand::Rng;

/// Items paired with integer weights, with the total precomputed.
///
/// `pick` draws `r` uniformly in `[0, total)` and walks the table
/// subtracting each weight until `r` drops to zero or below, so an item's
/// chance of being picked is `weight / total`.
#[derive(Clone, Debug)]
pub struct WeightedTable<T> {
    entries: Vec<(T, u32)>,
    total: u32,
}

impl<T> WeightedTable<T> {
    /// Zero-weight entries are dropped. Returns `None` when nothing is left
    /// or the weights overflow `u32`.
    pub fn new(mut entries: Vec<(T, u32)>) -> Option<Self> {
        entries.retain(|(_, w)| *w > 0);
        if entries.is_empty() {
            return None;
        }
        let total = entries
            .iter()
            .try_fold(0u32, |total, (_, w)| total.checked_add(*w))?;
        Some(Self { entries, total })
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        let mut r = rng.gen::<f64>() * self.total as f64;
        for (item, weight) in &self.entries {
            r -= *weight as f64;
            if r <= 0.0 {
                return item;
            }
        }
        // floating point leftovers land on the last entry
        &self.entries[self.entries.len() - 1].0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_weights_are_rejected() {
        assert!(WeightedTable::<u8>::new(vec![]).is_none());
        assert!(WeightedTable::new(vec![('a', 0), ('b', 0)]).is_none());
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        assert!(WeightedTable::new(vec![('a', u32::MAX), ('b', 1)]).is_none());

        let table = WeightedTable::new(vec![('a', u32::MAX - 1), ('b', 1)]).unwrap();
        assert_eq!(table.total(), u32::MAX);
    }

    #[test]
    fn zero_weight_entries_are_never_picked() {
        let table = WeightedTable::new(vec![('a', 0), ('b', 3), ('c', 0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            assert_eq!(*table.pick(&mut rng), 'b');
        }
    }

    #[test]
    fn frequencies_follow_weights() {
        let table = WeightedTable::new(vec![("heavy", 9), ("light", 1)]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let heavy = (0..10_000)
            .filter(|_| *table.pick(&mut rng) == "heavy")
            .count();
        assert!((8_700..=9_300).contains(&heavy), "heavy picked {heavy} times");
    }
}
