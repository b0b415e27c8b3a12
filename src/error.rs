/// All errors that `sprite-batch` can return.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The render system could not allocate a buffer.
    #[error("error creating buffer: {0}")]
    BufferCreation(String),
    /// The requested capacity needs more vertices than a `u16` index can
    /// address.
    #[error("a batch of {capacity} sprites cannot be addressed by 16-bit indices")]
    CapacityOverflow {
        /// The requested sprite capacity.
        capacity: u32,
    },
}
