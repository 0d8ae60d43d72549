//! Round Selection
//!
//! Picks the next target uniformly from the countries not yet in history and
//! builds the multiple-choice options around it. Neither function mutates the
//! catalog or the history.

use std::collections::BTreeSet;

use crate::core::rng::DeterministicRng;
use crate::quiz::catalog::{CountryCatalog, CountryId};
use crate::quiz::state::HistoryEntry;

/// Outcome of a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Catalog index of the next target
    Next(usize),
    /// Every country has been played
    Exhausted,
}

/// Pick the next target, excluding every id already in `history`.
pub fn select_next(
    catalog: &CountryCatalog,
    history: &[HistoryEntry],
    rng: &mut DeterministicRng,
) -> Selection {
    let played: BTreeSet<&CountryId> = history.iter().map(|entry| &entry.country_id).collect();

    let remaining: Vec<usize> = catalog
        .iter()
        .enumerate()
        .filter(|(_, country)| !played.contains(&country.id))
        .map(|(index, _)| index)
        .collect();

    match rng.choose(&remaining) {
        Some(&index) => Selection::Next(index),
        None => Selection::Exhausted,
    }
}

/// Build `count` shuffled options: the target plus distinct distractors.
///
/// Distractors may be countries that were already played. A catalog smaller
/// than `count` yields every country. A `count` of zero or one yields only
/// the target.
pub fn build_options(
    catalog: &CountryCatalog,
    target: usize,
    count: usize,
    rng: &mut DeterministicRng,
) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..catalog.len()).filter(|&i| i != target).collect();
    rng.shuffle(&mut pool);

    let mut options = vec![target];
    options.extend(pool.into_iter().take(count.saturating_sub(1)));
    rng.shuffle(&mut options);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::catalog::Country;
    use crate::quiz::round::GuessOutcome;

    fn catalog(n: usize) -> CountryCatalog {
        CountryCatalog::new(
            (0..n)
                .map(|i| Country::new(format!("C{i:02}"), format!("Country {i}"), "f.png", "Region"))
                .collect(),
        )
    }

    fn played(ids: &[&str]) -> Vec<HistoryEntry> {
        ids.iter()
            .map(|id| HistoryEntry {
                country_id: CountryId::from(*id),
                outcome: GuessOutcome::Correct,
            })
            .collect()
    }

    #[test]
    fn test_select_excludes_history() {
        let catalog = catalog(3);
        let history = played(&["C00", "C02"]);
        let mut rng = DeterministicRng::new(7);
        for _ in 0..50 {
            assert_eq!(select_next(&catalog, &history, &mut rng), Selection::Next(1));
        }
    }

    #[test]
    fn test_select_exhausted() {
        let catalog = catalog(2);
        let history = played(&["C00", "C01"]);
        let mut rng = DeterministicRng::new(7);
        assert_eq!(select_next(&catalog, &history, &mut rng), Selection::Exhausted);

        let empty = CountryCatalog::default();
        assert_eq!(select_next(&empty, &[], &mut rng), Selection::Exhausted);
    }

    #[test]
    fn test_select_reaches_every_country() {
        let catalog = catalog(4);
        let mut rng = DeterministicRng::new(99);
        let mut seen = BTreeSet::new();
        for _ in 0..200 {
            if let Selection::Next(i) = select_next(&catalog, &[], &mut rng) {
                seen.insert(i);
            }
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_options_contain_target_once() {
        let catalog = catalog(10);
        let mut rng = DeterministicRng::new(3);
        for target in 0..10 {
            let options = build_options(&catalog, target, 4, &mut rng);
            assert_eq!(options.len(), 4);
            assert_eq!(options.iter().filter(|&&i| i == target).count(), 1);
            let distinct: BTreeSet<_> = options.iter().collect();
            assert_eq!(distinct.len(), 4);
        }
    }

    #[test]
    fn test_options_small_catalog() {
        let catalog = catalog(2);
        let mut rng = DeterministicRng::new(3);
        let mut options = build_options(&catalog, 1, 4, &mut rng);
        options.sort();
        assert_eq!(options, vec![0, 1]);

        assert_eq!(build_options(&catalog, 1, 0, &mut rng), vec![1]);
    }
}
