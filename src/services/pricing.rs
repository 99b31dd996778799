use crate::services::availability::DateRange;

pub struct PricingService;

impl PricingService {
    /// Total cost of a stay. Prices are integral minor units, so this is
    /// exact. Returns None for an empty or inverted range, which callers
    /// reject as invalid input before getting here.
    pub fn total_price(price_per_night: i64, range: &DateRange) -> Option<i64> {
        let nights = range.nights();
        if nights < 1 || price_per_night <= 0 {
            return None;
        }
        Some(price_per_night * nights)
    }
}
