use core::convert::Infallible;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by [`LedMatrix`](crate::matrix::LedMatrix) and its collaborators.
///
/// Coordinates that fall outside the display or buffer are never errors: writes to them
/// are dropped and the pixel-level calls report `false`.
#[derive(Debug, derive_more::Display, derive_more::Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An offscreen-buffer operation was requested on a matrix built without a buffer.
    #[display("offscreen buffer is disabled")]
    BufferDisabled,
    /// The buffer's const dimensions do not match the display they back.
    #[display("offscreen buffer must be {expected_rows}x{expected_cols} cells")]
    BufferDimensions {
        /// Rows required: `rows * 7 + 2`.
        expected_rows: usize,
        /// Columns required: `cols * 2 + 2`.
        expected_cols: usize,
    },
    /// The LED strip driver could not accept a frame.
    #[display("LED strip write failed")]
    StripWrite,
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
