//! Display ranks for already-sorted leaderboards.

use std::collections::HashMap;

/// Podium styling applied to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Podium {
    First,
    Second,
    Third,
}

/// Entry decorated with its display rank.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub entry: T,
    /// 1-based rank; tied entries share the rank of the first of them.
    pub rank: usize,
    /// Whether another entry shares this rank.
    pub tied: bool,
}

impl<T> Ranked<T> {
    /// `=N` for shared ranks, `#N` otherwise.
    pub fn display_rank(&self) -> String {
        if self.tied {
            format!("={}", self.rank)
        } else {
            format!("#{}", self.rank)
        }
    }

    /// Every first place is highlighted; second and third only when untied.
    pub fn podium(&self) -> Option<Podium> {
        match (self.rank, self.tied) {
            (1, _) => Some(Podium::First),
            (2, false) => Some(Podium::Second),
            (3, false) => Some(Podium::Third),
            _ => None,
        }
    }
}

/// Assign display ranks to `sorted`, which must already be ordered by the
/// caller's comparator.
///
/// An entry takes its 1-based position unless its key equals the key of the
/// entry right before it, in which case it inherits that entry's rank.
pub fn rank<T, K, F>(sorted: Vec<T>, key_of: F) -> Vec<Ranked<T>>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut ranked: Vec<Ranked<T>> = Vec::with_capacity(sorted.len());
    let mut previous_key: Option<K> = None;

    for (index, entry) in sorted.into_iter().enumerate() {
        let key = key_of(&entry);
        let rank = match (&previous_key, ranked.last()) {
            (Some(previous), Some(last)) if *previous == key => last.rank,
            _ => index + 1,
        };
        previous_key = Some(key);
        ranked.push(Ranked {
            entry,
            rank,
            tied: false,
        });
    }

    let mut per_rank: HashMap<usize, usize> = HashMap::new();
    for item in &ranked {
        *per_rank.entry(item.rank).or_default() += 1;
    }
    for item in &mut ranked {
        item.tied = per_rank.get(&item.rank).copied().unwrap_or(0) > 1;
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_share_rank_and_next_entry_keeps_its_position() {
        let entries = vec![("A", 10, 1000), ("B", 10, 1000), ("C", 8, 800)];
        let ranked = rank(entries, |(_, correct, pct)| (*correct, *pct));

        let ranks = ranked.iter().map(|r| r.rank).collect::<Vec<_>>();
        assert_eq!(ranks, vec![1, 1, 3]);

        let display = ranked.iter().map(Ranked::display_rank).collect::<Vec<_>>();
        assert_eq!(display, vec!["=1", "=1", "#3"]);

        assert_eq!(ranked[0].podium(), Some(Podium::First));
        assert_eq!(ranked[1].podium(), Some(Podium::First));
        assert_eq!(ranked[2].podium(), Some(Podium::Third));
    }

    #[test]
    fn tied_second_place_loses_podium_styling() {
        let entries = vec![("A", 9), ("B", 7), ("C", 7), ("D", 5)];
        let ranked = rank(entries, |(_, score)| *score);

        let ranks = ranked.iter().map(|r| r.rank).collect::<Vec<_>>();
        assert_eq!(ranks, vec![1, 2, 2, 4]);
        assert_eq!(ranked[0].display_rank(), "#1");
        assert_eq!(ranked[1].display_rank(), "=2");
        assert_eq!(ranked[1].podium(), None);
        assert_eq!(ranked[3].podium(), None);
    }

    #[test]
    fn only_adjacent_keys_are_compared() {
        let entries = vec![("A", 3), ("B", 2), ("C", 3)];
        let ranked = rank(entries, |(_, score)| *score);
        let ranks = ranked.iter().map(|r| r.rank).collect::<Vec<_>>();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert!(ranked.iter().all(|r| !r.tied));
    }

    #[test]
    fn empty_input() {
        let ranked = rank(Vec::<u32>::new(), |value| *value);
        assert!(ranked.is_empty());
    }
}
