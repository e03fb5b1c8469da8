#![cfg_attr(not(test), no_std)]

//! AB1805 / AM1805 real time clock, watchdog and power controller.
//! rust no_std driver (utilizes the embedded_hal i2c interface)
//!
//! Besides keeping calendar time the chip serves as a hardware watchdog for
//! the host, can cut and restore host power through an external switch
//! (deep power down), wakes the host from a countdown timer or an alarm, and
//! holds 256 bytes of battery-backed RAM.

mod fmt;

pub use rtcc::{
  DateTimeAccess, NaiveDate, NaiveDateTime, Datelike, Timelike,
};

pub mod registers;
pub mod calendar;
mod error;
mod bus;
mod host;
mod config;
mod wake;
mod watchdog;
mod timer;
mod ram;
mod power;
mod clock;

pub use error::Error;
pub use bus::{BusLock, NoLock, MAX_READ_LEN, MAX_WRITE_LEN};
pub use host::Host;
pub use config::{Config, NoPin, ResetFlags};
pub use calendar::CalendarTime;
pub use wake::WakeReason;
pub use watchdog::{watchdog_control, WATCHDOG_MAX_SECONDS};
pub use timer::{countdown_control, RepeatMode, COUNTDOWN_MAX};
pub use ram::{ram_chunks, RamBank, RamChunk, RamChunks, RamValue, RAM_SIZE};
pub use power::{trickle_value, Diode, Rout, VbatThreshold};

use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::InputPin;

use registers::*;

/// How long detection waits for the chip to raise FOUT/nIRQ after power up
const READY_TIMEOUT_MS: u32 = 1000;
const READY_POLL_MS: u32 = 10;

/// AB1805 driver.
///
/// - `I2C` : the bus
/// - `P` : host input wired to FOUT/nIRQ, [`NoPin`] if not connected
/// - `L` : lock shared with other users of the bus, [`NoLock`] if there are none
pub struct AB1805<I2C, P = NoPin, L = NoLock> {
  i2c: I2C,
  address: u8,
  wake_pin: Option<P>,
  lock: L,
  // set when setup found no chip; register access then fails fast
  absent: bool,
  wake_reason: WakeReason,
  // effective watchdog period, 0 when disabled
  watchdog_secs: u8,
  watchdog_refresh_ms: u32,
  last_watchdog_ms: u32,
  // the host's trusted time has been pushed to the RTC
  time_set: bool,
}

impl<I2C, E, P> AB1805<I2C, P, NoLock>
  where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    P: InputPin,
{
  /// New driver instance for a bus with no other users
  pub fn new(i2c: I2C, config: Config<P>) -> Self {
    Self::new_with_lock(i2c, config, NoLock)
  }
}

impl<I2C, E, P, L> AB1805<I2C, P, L>
  where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    P: InputPin,
    L: BusLock,
{
  /// New driver instance on a bus shared through `lock`
  pub fn new_with_lock(i2c: I2C, config: Config<P>, lock: L) -> Self {
    AB1805 {
      i2c,
      address: config.address,
      wake_pin: config.wake_pin,
      lock,
      absent: false,
      wake_reason: WakeReason::Unknown,
      watchdog_secs: 0,
      watchdog_refresh_ms: 0,
      last_watchdog_ms: 0,
      time_set: false,
    }
  }

  /// Give the bus back to the caller
  pub fn release(self) -> I2C {
    self.i2c
  }

  /// True if the last [`setup`](AB1805::setup) found the chip
  pub fn is_detected(&self) -> bool {
    !self.absent
  }

  /// Call once at startup: detect the chip and find out why the host started.
  ///
  /// Without a chip this logs and returns [`Error::NotDetected`]; the driver
  /// stays usable in that every later operation fails with the same error.
  /// If the RTC holds a valid time and the host clock does not, the host
  /// clock is set from the RTC.
  pub fn setup<H: Host>(&mut self, host: &mut H) -> Result<(), Error<E>> {
    self.wake_reason = WakeReason::Unknown;
    self.absent = false;

    if self.detect_chip(host).is_err() {
      error!("AB1805 not detected");
      self.absent = true;
      return Err(Error::NotDetected);
    }

    self.update_wake_reason()?;

    if host.system_time().is_none() {
      if let Some(now) = self.read_calendar(true)?.and_then(|time| time.to_datetime()) {
        host.set_system_time(&now);
        info!("set host clock from RTC");
      }
    }
    Ok(())
  }

  fn detect_chip<H: Host>(&mut self, host: &mut H) -> Result<(), Error<E>> {
    if let Some(pin) = self.wake_pin.as_ref() {
      // the chip holds FOUT low until its interface is ready
      let start = host.millis();
      while !matches!(pin.is_high(), Ok(true)) {
        if host.millis().wrapping_sub(start) >= READY_TIMEOUT_MS {
          info!("FOUT did not go high");
          break;
        }
        host.delay_ms(READY_POLL_MS);
      }
    }

    let mut id = [0u8; 2];
    self.read_registers(REG_ID0, &mut id, true)?;
    if id != [REG_ID0_AB18XX, REG_ID1_ABXX05] {
      return Err(Error::NotDetected);
    }
    Ok(())
  }

  /// Call frequently from the host main loop.
  ///
  /// Pushes the host time into the RTC once the host has trusted time, and
  /// refreshes an enabled watchdog. Only touches the bus when one of those
  /// is due.
  pub fn tick<H: Host>(&mut self, host: &mut H) -> Result<(), Error<E>> {
    if !self.time_set && host.time_synced() {
      if let Some(now) = host.system_time() {
        self.time_set = true;
        self.set_rtc_from_datetime(&now)?;
        info!("set RTC from host clock");
      }
    }

    if self.watchdog_refresh_ms != 0 {
      let now = host.millis();
      if now.wrapping_sub(self.last_watchdog_ms) >= self.watchdog_refresh_ms {
        self.last_watchdog_ms = now;
        self.configure_watchdog(-1, true)?;
      }
    }
    Ok(())
  }
}
