use crate::error::ArenaError;
use crate::{ALIGNMENT, DEFAULT_BLOCK_SIZE};

/// Tuning for an [`ArenaAllocator`](crate::ArenaAllocator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaOptions {
    /// Size of each chunk the backing arena requests from the system.
    /// Larger requests get a chunk of their own.
    pub block_size: usize,
}

impl Default for ArenaOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl ArenaOptions {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.block_size < ALIGNMENT {
            return Err(ArenaError::InvalidBlockSize {
                block_size: self.block_size,
                min: ALIGNMENT,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_is_valid() {
        let options = ArenaOptions::default();

        assert_eq!(options.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(options.validate(), Ok(()));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(ALIGNMENT - 1)]
    fn rejects_blocks_smaller_than_alignment(#[case] block_size: usize) {
        let options = ArenaOptions::default().with_block_size(block_size);

        assert_eq!(
            options.validate(),
            Err(ArenaError::InvalidBlockSize {
                block_size,
                min: ALIGNMENT
            })
        );
    }

    #[rstest]
    #[case(ALIGNMENT)]
    #[case(100)]
    #[case(1 << 20)]
    fn accepts_blocks_of_at_least_alignment(#[case] block_size: usize) {
        let options = ArenaOptions::default().with_block_size(block_size);

        assert!(options.validate().is_ok());
    }
}
