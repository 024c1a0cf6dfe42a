use chrono::Utc;

use crate::domain::BetId;

/// Issues strictly increasing bet identifiers.
///
/// Ids are millisecond timestamps bumped past the last issued value, so they
/// still read as creation times while two bets created in the same
/// millisecond (or after a clock step back) keep their order.
#[derive(Debug, Clone, Default)]
pub struct BetIdGenerator {
    last: u64,
}

impl BetIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue after the highest id already present in a ledger
    pub fn seeded<'a>(existing: impl IntoIterator<Item = &'a BetId>) -> Self {
        let last = existing.into_iter().map(BetId::value).max().unwrap_or(0);
        Self { last }
    }

    pub fn next_id(&mut self) -> BetId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(now)
    }

    pub(crate) fn next_at(&mut self, now_ms: u64) -> BetId {
        let id = now_ms.max(self.last.saturating_add(1));
        self.last = id;
        BetId(id)
    }

    pub fn last(&self) -> Option<BetId> {
        (self.last > 0).then_some(BetId(self.last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase_within_same_millisecond() {
        let mut ids = BetIdGenerator::new();
        let a = ids.next_at(1_000);
        let b = ids.next_at(1_000);
        let c = ids.next_at(999);
        assert_eq!(a, BetId(1_000));
        assert_eq!(b, BetId(1_001));
        assert_eq!(c, BetId(1_002));
    }

    #[test]
    fn test_seeded_continues_after_max() {
        let existing = [BetId(5), BetId(42), BetId(7)];
        let mut ids = BetIdGenerator::seeded(existing.iter());
        assert_eq!(ids.last(), Some(BetId(42)));
        assert_eq!(ids.next_at(10), BetId(43));
    }

    #[test]
    fn test_wall_clock_ids_increase() {
        let mut ids = BetIdGenerator::new();
        let first = ids.next_id();
        let second = ids.next_id();
        assert!(second > first);
    }
}
