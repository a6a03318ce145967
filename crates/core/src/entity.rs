//! Entity trait: identity + continuity across state changes.

use chrono::{DateTime, Utc};

/// Entity marker + minimal interface.
///
/// Every stored record carries an identifier and its creation timestamp; list
/// operations order records by `(created_at, id)` descending.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// When the record was first persisted.
    fn created_at(&self) -> DateTime<Utc>;
}

/// Sort records newest-created first, breaking ties by identifier (descending).
pub fn sort_newest_first<E: Entity>(records: &mut [E]) {
    records.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(a.id()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug)]
    struct Rec(u32, DateTime<Utc>);

    impl Entity for Rec {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.0
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.1
        }
    }

    #[test]
    fn newest_first_with_id_tiebreak() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut recs = vec![Rec(1, early), Rec(2, late), Rec(3, early)];

        sort_newest_first(&mut recs);

        let ids: Vec<u32> = recs.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
