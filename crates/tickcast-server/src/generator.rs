//! Wrapping counter that produces the broadcast value.

/// Counter bounded by `[min, max]`, starting at `min`.
///
/// Each call to [`next`](Self::next) steps by one and wraps to `min` after
/// `max`. Bounds come from validated config, so `min <= max` holds.
#[derive(Debug, Clone)]
pub struct ValueGenerator {
    min: i64,
    max: i64,
    current: i64,
}

impl ValueGenerator {
    pub fn new(min: i64, max: i64) -> Self {
        debug_assert!(min <= max, "value_min {min} > value_max {max}");
        Self {
            min,
            max,
            current: min,
        }
    }

    /// Advance one step and return the new value.
    pub fn next(&mut self) -> i64 {
        self.current = if self.current >= self.max {
            self.min
        } else {
            self.current + 1
        };
        self.current
    }

    pub fn current(&self) -> i64 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_min() {
        let gen = ValueGenerator::new(4, 9);
        assert_eq!(gen.current(), 4);
    }

    #[test]
    fn wraps_after_max() {
        let mut gen = ValueGenerator::new(0, 3);
        let seq: Vec<i64> = (0..5).map(|_| gen.next()).collect();
        assert_eq!(seq, vec![1, 2, 3, 0, 1]);
    }

    #[test]
    fn stays_within_bounds_over_many_cycles() {
        let mut gen = ValueGenerator::new(0, 255);
        let mut prev = gen.current();
        for _ in 0..2_000 {
            let value = gen.next();
            assert!((0..=255).contains(&value));
            if prev == 255 {
                assert_eq!(value, 0);
            } else {
                assert_eq!(value, prev + 1);
            }
            prev = value;
        }
    }

    #[test]
    fn single_value_range_repeats() {
        let mut gen = ValueGenerator::new(7, 7);
        assert_eq!(gen.next(), 7);
        assert_eq!(gen.next(), 7);
    }

    #[test]
    fn negative_range() {
        let mut gen = ValueGenerator::new(-2, 0);
        let seq: Vec<i64> = (0..4).map(|_| gen.next()).collect();
        assert_eq!(seq, vec![-1, 0, -2, -1]);
    }
}
