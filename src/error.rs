use thiserror::Error as ThisError;

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ArenaError {
    #[error("invalid block size, it must be at least {min} bytes. block_size=`{block_size}`")]
    InvalidBlockSize { block_size: usize, min: usize },

    #[error("buffer was issued by a different allocator. addr=`{addr:#x}`")]
    ForeignBuffer { addr: usize },

    #[error("buffer is not live in this arena. addr=`{addr:#x}`")]
    UntrackedBuffer { addr: usize },
}
