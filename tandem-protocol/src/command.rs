//! Cyclic command index

/// Next command to issue, cycling through `[0, count)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandIndex {
    value: u8,
    count: u16,
}

impl CommandIndex {
    /// Start at 0, wrapping after `count` commands
    ///
    /// `count` is clamped to `1..=256`.
    pub fn new(count: usize) -> Self {
        Self {
            value: 0,
            count: count.clamp(1, 256) as u16,
        }
    }

    /// Command byte for the current cycle
    pub fn get(&self) -> u8 {
        self.value
    }

    /// Number of distinct commands in the cycle
    pub fn count(&self) -> usize {
        self.count as usize
    }

    /// Move to the next command, wrapping to 0 after the last one
    pub fn advance(&mut self) -> u8 {
        if u16::from(self.value) + 1 >= self.count {
            self.value = 0;
        } else {
            self.value += 1;
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_of_four() {
        let mut index = CommandIndex::new(4);
        assert_eq!(index.get(), 0);

        let seen: [u8; 8] = core::array::from_fn(|_| index.advance());
        assert_eq!(seen, [1, 2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_single_command_stays_at_zero() {
        let mut index = CommandIndex::new(1);
        assert_eq!(index.advance(), 0);
        assert_eq!(index.advance(), 0);
    }

    #[test]
    fn test_full_byte_range() {
        let mut index = CommandIndex::new(256);
        for expected in 1..=255u8 {
            assert_eq!(index.advance(), expected);
        }
        assert_eq!(index.advance(), 0);
    }

    #[test]
    fn test_count_is_clamped() {
        assert_eq!(CommandIndex::new(0).count(), 1);
        assert_eq!(CommandIndex::new(1000).count(), 256);
    }
}
