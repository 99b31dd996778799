use chrono::NaiveDate;

/// A reserved span of nights. `start` is checkin day, `end` is checkout
/// day; the guest holds the nights in [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Half-open on day boundaries: a checkout and a checkin on the same
    /// day do not collide.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Whether `candidate` can be booked given every existing reservation of
/// the same listing. One conflict is enough to refuse the whole range.
pub fn is_available(existing: &[DateRange], candidate: &DateRange) -> bool {
    !existing.iter().any(|booked| booked.overlaps(candidate))
}
