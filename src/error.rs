/// All the ways a driver operation can fail.
///
/// `E` is the error type of the underlying i2c bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
  /// The bus transaction failed (no acknowledge, short transfer, ...).
  /// Never retried by the driver.
  I2c(E),
  /// The identity registers did not report an AB1805
  NotDetected,
  /// The calendar counters have never been written since power-up
  RtcNotSet,
  /// An address or length falls outside the RAM or register space
  OutOfRange,
  /// A burst is longer than a single bus transaction can carry
  InvalidLength,
  /// The calendar fields don't form a valid date and time
  InvalidDateTime,
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for Error<E> {
  fn format(&self, fmt: defmt::Formatter) {
    match self {
      Error::I2c(_) => defmt::write!(fmt, "I2c"),
      Error::NotDetected => defmt::write!(fmt, "NotDetected"),
      Error::RtcNotSet => defmt::write!(fmt, "RtcNotSet"),
      Error::OutOfRange => defmt::write!(fmt, "OutOfRange"),
      Error::InvalidLength => defmt::write!(fmt, "InvalidLength"),
      Error::InvalidDateTime => defmt::write!(fmt, "InvalidDateTime"),
    }
  }
}
