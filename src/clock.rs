use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::InputPin;
use rtcc::{DateTimeAccess, NaiveDateTime};

use crate::bus::BusLock;
use crate::calendar::{calendar_to_registers, registers_to_calendar, CalendarTime, CALENDAR_LEN};
use crate::registers::*;
use crate::{Error, Host, AB1805};

impl<I2C, E, P, L> AB1805<I2C, P, L>
  where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    P: InputPin,
    L: BusLock,
{
  /// True once the calendar has been written since the chip lost power.
  /// The chip powers up with WRTC set; writing the time clears it.
  pub fn is_rtc_set(&mut self) -> Result<bool, Error<E>> {
    self.is_bit_clear(REG_CTRL_1, REG_CTRL_1_WRTC, true)
  }

  /// Set the calendar counters. Hundredths are reset to zero.
  pub fn set_rtc_from_calendar(&mut self, time: &CalendarTime, lock: bool) -> Result<(), Error<E>> {
    let mut regs = [0u8; 1 + CALENDAR_LEN];
    regs[1..].copy_from_slice(&calendar_to_registers(time, true));

    self.locked(lock, |dev| {
      dev.set_register_bit(REG_CTRL_1, REG_CTRL_1_WRTC, false)?;
      dev.write_registers(REG_HUNDREDTH, &regs, false)?;
      dev.clear_register_bit(REG_CTRL_1, REG_CTRL_1_WRTC, false)
    }).map_err(|e| {
      error!("failure in set_rtc_from_calendar");
      e
    })
  }

  /// Set the calendar counters from a UTC datetime
  pub fn set_rtc_from_datetime(&mut self, time: &NaiveDateTime) -> Result<(), Error<E>> {
    self.set_rtc_from_calendar(&CalendarTime::from_datetime(time), true)
  }

  /// Copy the host wall clock into the RTC.
  /// Returns false, without touching the chip, if the host has no valid time.
  pub fn set_rtc_from_host<H: Host>(&mut self, host: &mut H) -> Result<bool, Error<E>> {
    match host.system_time() {
      Some(now) => {
        self.set_rtc_from_datetime(&now)?;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  // None while the RTC has never been set
  pub(crate) fn read_calendar(&mut self, lock: bool) -> Result<Option<CalendarTime>, Error<E>> {
    self.locked(lock, |dev| {
      if !dev.is_bit_clear(REG_CTRL_1, REG_CTRL_1_WRTC, false)? {
        return Ok(None);
      }
      let mut regs = [0u8; 1 + CALENDAR_LEN];
      dev.read_registers(REG_HUNDREDTH, &mut regs, false)?;
      Ok(Some(registers_to_calendar(&regs[1..], true)))
    })
  }

  /// The calendar counters, all zero while the RTC has never been set
  pub fn rtc_calendar(&mut self) -> Result<CalendarTime, Error<E>> {
    Ok(self.read_calendar(true)?.unwrap_or_default())
  }
}

impl<I2C, E, P, L> DateTimeAccess for AB1805<I2C, P, L>
  where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    P: InputPin,
    L: BusLock,
{
  type Error = Error<E>;

  /// The chip keeps a two digit year and assumes 2000 through 2099.
  /// Fails with [`Error::RtcNotSet`] until the time has been set.
  fn datetime(&mut self) -> Result<NaiveDateTime, Self::Error> {
    let time = self.read_calendar(true)?.ok_or(Error::RtcNotSet)?;
    time.to_datetime().ok_or(Error::InvalidDateTime)
  }

  /// Only the years 2000 through 2099 are represented faithfully
  fn set_datetime(&mut self, datetime: &NaiveDateTime) -> Result<(), Self::Error> {
    self.set_rtc_from_datetime(datetime)
  }
}
