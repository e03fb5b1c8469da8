use chrono::NaiveDateTime;
use embedded_hal::blocking::delay::DelayMs;

/// Host-side services the driver requests but does not implement:
/// timekeeping for the watchdog cadence, the host wall clock, and host reset.
pub trait Host: DelayMs<u32> {
  /// Milliseconds since host boot. Allowed to wrap.
  fn millis(&mut self) -> u32;

  /// The host wall clock (UTC), or `None` while it holds no valid time
  fn system_time(&mut self) -> Option<NaiveDateTime>;

  /// Set the host wall clock (UTC)
  fn set_system_time(&mut self, time: &NaiveDateTime);

  /// True once the host clock has come from a trusted source such as a
  /// network time sync
  fn time_synced(&mut self) -> bool;

  /// Software reset of the host
  fn reset(&mut self) -> !;
}
