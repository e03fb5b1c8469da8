use core::cell::RefCell;

use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::InputPin;

use crate::bus::BusLock;
use crate::registers::*;
use crate::{Error, AB1805};

/// Longest watchdog period the chip supports, in seconds
pub const WATCHDOG_MAX_SECONDS: u8 = 124;

/// Watchdog register value for a requested period in seconds (> 0).
///
/// The watchdog counts a 1/4 Hz clock, so the period is quantized to
/// 4 second steps and clamped to 4..=124 s. Expiry resets the host.
pub fn watchdog_control(seconds: u32) -> WatchdogControl {
  let four_secs = (seconds / 4).clamp(1, 31) as u8;
  let mut wdt = WatchdogControl(0);
  wdt.set_reset(true);
  wdt.set_period(four_secs);
  wdt.set_clock(REG_WDT_WRB_1_4_HZ);
  wdt
}

impl<I2C, E, P, L> AB1805<I2C, P, L>
  where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    P: InputPin,
    L: BusLock,
{
  /// Configure, refresh or disable the hardware watchdog.
  /// - `seconds < 0` re-arms the last configured period (refresh). Nothing happens if
  ///   the watchdog was never enabled.
  /// - `seconds == 0` disables the watchdog.
  /// - otherwise enables it, quantized to 4 s steps within 4..=124 s.
  ///
  /// [`tick`](AB1805::tick) refreshes an enabled watchdog at half its period.
  pub fn set_watchdog(&mut self, seconds: i32) -> Result<(), Error<E>> {
    self.configure_watchdog(seconds, true)
  }

  /// Disable the watchdog, for example before a long host sleep
  pub fn stop_watchdog(&mut self) -> Result<(), Error<E>> {
    self.configure_watchdog(0, true)
  }

  /// Re-enable the watchdog with the previous period, if there was one
  pub fn resume_watchdog(&mut self) -> Result<(), Error<E>> {
    self.configure_watchdog(-1, true)
  }

  /// Current effective watchdog period in seconds, 0 when disabled
  pub fn watchdog_seconds(&self) -> u8 {
    self.watchdog_secs
  }

  /// Interval at which [`tick`](AB1805::tick) services the watchdog, 0 when disabled
  pub fn watchdog_refresh_ms(&self) -> u32 {
    self.watchdog_refresh_ms
  }

  pub(crate) fn configure_watchdog(&mut self, seconds: i32, lock: bool) -> Result<(), Error<E>> {
    trace!("set_watchdog {=i32}", seconds);

    let seconds = if seconds < 0 {
      if self.watchdog_secs == 0 {
        return Ok(());
      }
      self.watchdog_secs as u32
    }
    else {
      seconds as u32
    };

    if seconds == 0 {
      self.write_register(REG_WDT, REG_WDT_DEFAULT, lock)?;
      self.watchdog_secs = 0;
      self.watchdog_refresh_ms = 0;
      trace!("watchdog cleared");
    }
    else {
      let wdt = watchdog_control(seconds);
      self.write_register(REG_WDT, wdt.0, lock)?;
      self.watchdog_secs = wdt.period() * 4;
      // service half way through the period
      self.watchdog_refresh_ms = wdt.period() as u32 * 2000;
      trace!("watchdog set period={=u8}", self.watchdog_secs);
    }
    Ok(())
  }

  /// Disable the watchdog when the host is about to reset or reboot, so a
  /// stale watchdog can't interrupt e.g. a firmware update.
  pub fn on_host_reset(&mut self) -> Result<(), Error<E>> {
    if self.watchdog_secs != 0 {
      self.configure_watchdog(0, true)?;
    }
    Ok(())
  }

  /// A callback for the host's reset / reboot event dispatcher.
  ///
  /// The callback holds a shared handle, so the driver stays usable through
  /// the same `RefCell` while the callback is registered. If the driver is
  /// borrowed when the event fires, the callback logs and does nothing.
  pub fn reset_handler<'a>(rtc: &'a RefCell<Self>) -> impl FnMut() + 'a
    where
      Self: 'a,
  {
    move || match rtc.try_borrow_mut() {
      Ok(mut rtc) => {
        if rtc.on_host_reset().is_err() {
          error!("failed to stop watchdog on host reset");
        }
      }
      Err(_) => error!("driver busy on host reset"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Config, Host, NaiveDateTime};
  use embedded_hal::blocking::delay::DelayMs;
  use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTrans};
  use std::vec;

  #[test]
  fn test_watchdog_quantization() {
    // too short clamps to the minimum period
    let wdt = watchdog_control(3);
    assert_eq!(wdt.period() * 4, 4);
    assert_eq!(wdt.0, 0x80 | (1 << 2) | 0x03);

    // too long clamps to the maximum period
    let wdt = watchdog_control(200);
    assert_eq!(wdt.period() * 4, WATCHDOG_MAX_SECONDS);
    assert_eq!(wdt.0, 0x80 | (31 << 2) | 0x03);

    assert_eq!(watchdog_control(30).period() * 4, 28);
  }

  #[test]
  fn test_set_watchdog_and_refresh() {
    let expectations = [
      I2cTrans::write(AB1805_ADDRESS, vec![REG_WDT, 0x80 | (7 << 2) | 0x03]),
      I2cTrans::write(AB1805_ADDRESS, vec![REG_WDT, 0x80 | (7 << 2) | 0x03]),
      I2cTrans::write(AB1805_ADDRESS, vec![REG_WDT, 0x00]),
    ];
    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());

    rtc.set_watchdog(30).unwrap();
    assert_eq!(rtc.watchdog_seconds(), 28);
    assert_eq!(rtc.watchdog_refresh_ms(), 14_000);

    rtc.resume_watchdog().unwrap();
    assert_eq!(rtc.watchdog_seconds(), 28);

    rtc.stop_watchdog().unwrap();
    assert_eq!(rtc.watchdog_seconds(), 0);
    assert_eq!(rtc.watchdog_refresh_ms(), 0);

    // never enabled again: refresh is a no-op on the bus
    rtc.set_watchdog(-1).unwrap();
    rtc.release().done();
  }

  #[test]
  fn test_reset_handler_disables_running_watchdog() {
    let wdt = 0x80 | (31 << 2) | 0x03;
    let expectations = [
      I2cTrans::write(AB1805_ADDRESS, vec![REG_WDT, wdt]),
      I2cTrans::write(AB1805_ADDRESS, vec![REG_WDT, wdt]),
      I2cTrans::write(AB1805_ADDRESS, vec![REG_WDT, 0x00]),
    ];
    let rtc = RefCell::new(AB1805::new(I2cMock::new(&expectations), Config::default()));
    rtc.borrow_mut().set_watchdog(WATCHDOG_MAX_SECONDS as i32).unwrap();

    let mut handler = AB1805::reset_handler(&rtc);

    // the driver keeps working while the handler is registered
    let mut host = TestHost { now: 62_000 };
    rtc.borrow_mut().tick(&mut host).unwrap();
    assert_eq!(rtc.borrow().watchdog_seconds(), WATCHDOG_MAX_SECONDS);

    handler();
    assert_eq!(rtc.borrow().watchdog_seconds(), 0);
    // second event: already stopped, no bus traffic
    handler();

    drop(handler);
    rtc.into_inner().release().done();
  }

  #[test]
  fn test_reset_handler_while_driver_borrowed() {
    let expectations: [I2cTrans; 0] = [];
    let rtc = RefCell::new(AB1805::new(I2cMock::new(&expectations), Config::default()));
    let mut handler = AB1805::reset_handler(&rtc);
    {
      let _busy = rtc.borrow_mut();
      handler();
    }
    handler();
    drop(handler);
    rtc.into_inner().release().done();
  }

  struct TestHost {
    now: u32,
  }

  impl DelayMs<u32> for TestHost {
    fn delay_ms(&mut self, ms: u32) {
      self.now += ms;
    }
  }

  impl Host for TestHost {
    fn millis(&mut self) -> u32 {
      self.now
    }
    fn system_time(&mut self) -> Option<NaiveDateTime> {
      None
    }
    fn set_system_time(&mut self, _time: &NaiveDateTime) {}
    fn time_synced(&mut self) -> bool {
      false
    }
    fn reset(&mut self) -> ! {
      panic!("host reset")
    }
  }
}
