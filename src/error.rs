//! Error types.
//!
//! The chip never acknowledges a write, so the only failure the driver can observe is the
//! transport itself failing to drive a line or shift a byte. Out-of-range luminance and orbit
//! values are clamped rather than rejected, so there is no parameter error.

use thiserror::Error;

/// An error returned by the frame protocol and the panel controller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The transport failed to set a line or transfer a byte. The transaction in progress was
    /// abandoned and chip-select was released before this was returned.
    #[error("transport fault: {0:?}")]
    Transport(E),
}

/// The error type of `SpiInterface`, which can fail in either the SPI peripheral or one of its
/// GPIO lines.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusFault<SpiE, PinE> {
    #[error("SPI peripheral fault: {0:?}")]
    Spi(SpiE),
    #[error("GPIO fault: {0:?}")]
    Pin(PinE),
}
