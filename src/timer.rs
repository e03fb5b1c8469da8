use core::convert::Infallible;

use chrono::NaiveDateTime;
use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::InputPin;

use crate::bus::BusLock;
use crate::calendar::{calendar_len, calendar_to_registers, CalendarTime};
use crate::registers::*;
use crate::{Error, Host, AB1805};

/// Longest countdown, in timer clock ticks
pub const COUNTDOWN_MAX: u8 = 255;

/// Which alarm fields must match the counters for the alarm to fire.
/// Each mode compares the named field and all finer ones, so `Minute`
/// fires once an hour and `Date` once a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RepeatMode {
  /// Match seconds: once a minute
  Second,
  /// Match minutes and seconds: once an hour
  Minute,
  /// Match hours, minutes, seconds: once a day
  Hour,
  /// Match weekday and time: once a week
  Weekday,
  /// Match day of month and time: once a month
  Date,
  /// Match month, day and time: once a year
  Month,
}

impl RepeatMode {
  /// Value of the RPT field in the timer control register
  pub const fn bits(self) -> u8 {
    match self {
      RepeatMode::Second => REG_TIMER_CTRL_RPT_SEC,
      RepeatMode::Minute => REG_TIMER_CTRL_RPT_MIN,
      RepeatMode::Hour => REG_TIMER_CTRL_RPT_HOUR,
      RepeatMode::Weekday => REG_TIMER_CTRL_RPT_WKDY,
      RepeatMode::Date => REG_TIMER_CTRL_RPT_DATE,
      RepeatMode::Month => REG_TIMER_CTRL_RPT_MON,
    }
  }
}

/// Countdown timer control value for an enabled timer
pub fn countdown_control(minutes: bool, level: bool) -> TimerControl {
  let mut tc = TimerControl(0);
  tc.set_enable(true);
  tc.set_level(level);
  tc.set_frequency(if minutes { REG_TIMER_CTRL_TFS_1_60 } else { REG_TIMER_CTRL_TFS_1 });
  tc
}

fn clamp_countdown(value: i32) -> u8 {
  value.clamp(1, COUNTDOWN_MAX as i32) as u8
}

impl<I2C, E, P, L> AB1805<I2C, P, L>
  where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    P: InputPin,
    L: BusLock,
{
  /// Start the countdown timer. `value` is clamped to 1..=255 ticks of
  /// 1 Hz, or of 1/60 Hz when `minutes` is set. With `level` the interrupt
  /// output stays asserted until the status flag is cleared, otherwise it
  /// pulses. Pending status flags are cleared.
  ///
  /// The output pin routing is left alone, see [`arm_countdown`](AB1805::arm_countdown).
  pub fn set_countdown_timer(&mut self, value: i32, minutes: bool, level: bool, lock: bool)
    -> Result<(), Error<E>> {
    let ticks = clamp_countdown(value);
    trace!("set_countdown_timer {=u8} minutes={=bool}", ticks, minutes);

    self.locked(lock, |dev| {
      dev.write_register(REG_STATUS, REG_STATUS_DEFAULT, false)?;
      // the timer can't be loaded while it runs
      dev.write_register(REG_TIMER_CTRL, REG_TIMER_CTRL_DEFAULT, false)?;
      dev.write_register(REG_TIMER, ticks, false)?;
      dev.set_register_bit(REG_INT_MASK, REG_INT_MASK_TIE, false)?;
      dev.write_register(REG_TIMER_CTRL, countdown_control(minutes, level).0, false)
    }).map_err(|e| {
      error!("failure in set_countdown_timer");
      e
    })
  }

  /// Stop the countdown timer
  pub fn stop_countdown_timer(&mut self) -> Result<(), Error<E>> {
    self.write_register(REG_TIMER_CTRL, REG_TIMER_CTRL_DEFAULT, true)
  }

  /// Wake or interrupt the host on FOUT/nIRQ after `value` seconds or minutes.
  /// Disables the watchdog, which would otherwise reset the host first.
  pub fn arm_countdown(&mut self, value: i32, minutes: bool) -> Result<(), Error<E>> {
    self.locked(true, |dev| {
      dev.configure_watchdog(0, false)?;
      dev.mask_register(REG_CTRL_2, !REG_CTRL_2_OUT1S_MASK, REG_CTRL_2_OUT1S_NIRQ, false)?;
      dev.set_countdown_timer(value, minutes, false, false)
    }).map_err(|e| {
      error!("failure in arm_countdown");
      e
    })
  }

  /// Raise the alarm interrupt on FOUT/nIRQ whenever the fields selected by
  /// `mode` match `time`. Disables the watchdog and the countdown timer.
  ///
  /// The RTC must already be set: the chip compares against its own
  /// counters, which are meaningless until then. This is not checked.
  pub fn arm_repeating(&mut self, time: &CalendarTime, mode: RepeatMode) -> Result<(), Error<E>> {
    trace!("arm_repeating {}", mode);

    let mut alarm = [0u8; 1 + calendar_len(false)];
    let regs = calendar_to_registers(time, false);
    alarm[1..].copy_from_slice(&regs[..calendar_len(false)]);

    self.locked(true, |dev| {
      dev.configure_watchdog(0, false)?;
      dev.clear_register_bit(REG_STATUS, REG_STATUS_ALM, false)?;
      dev.write_registers(REG_HUNDREDTH_ALARM, &alarm, false)?;
      dev.mask_register(REG_CTRL_2, !REG_CTRL_2_OUT1S_MASK, REG_CTRL_2_OUT1S_NAIRQ, false)?;
      dev.set_register_bit(REG_INT_MASK, REG_INT_MASK_AIE, false)?;
      dev.mask_register(REG_TIMER_CTRL, !(REG_TIMER_CTRL_RPT_MASK | REG_TIMER_CTRL_TE),
                        mode.bits(), false)
    }).map_err(|e| {
      error!("failure in arm_repeating");
      e
    })
  }

  /// One alarm at `time`. Matches day of month and time of day, so without a
  /// clear it fires again a month later.
  pub fn interrupt_at(&mut self, time: &CalendarTime) -> Result<(), Error<E>> {
    self.arm_repeating(time, RepeatMode::Date)
  }

  /// [`interrupt_at`](AB1805::interrupt_at) for a UTC datetime
  pub fn interrupt_at_datetime(&mut self, time: &NaiveDateTime) -> Result<(), Error<E>> {
    self.interrupt_at(&CalendarTime::from_datetime(time))
  }

  /// Undo [`arm_repeating`](AB1805::arm_repeating): default pin routing,
  /// alarm interrupt and repeat disabled.
  pub fn clear_repeating_interrupt(&mut self) -> Result<(), Error<E>> {
    self.locked(true, |dev| {
      dev.mask_register(REG_CTRL_2, !REG_CTRL_2_OUT1S_MASK, REG_CTRL_2_OUT1S_NIRQ, false)?;
      dev.clear_register_bit(REG_INT_MASK, REG_INT_MASK_AIE, false)?;
      dev.mask_register(REG_TIMER_CTRL, !REG_TIMER_CTRL_RPT_MASK, REG_TIMER_CTRL_RPT_DIS, false)
    }).map_err(|e| {
      error!("failure in clear_repeating_interrupt");
      e
    })
  }

  /// Cut host power through the chip's power switch and restore it after
  /// `seconds` (clamped to 1..=255). The host normally loses power inside
  /// this call and cold boots with [`WakeReason::DeepPowerDown`](crate::WakeReason::DeepPowerDown).
  ///
  /// Returns only on a failed register write. If power is still on once
  /// `seconds` have passed, the host is reset.
  pub fn deep_power_down<H: Host>(&mut self, host: &mut H, seconds: i32) -> Result<Infallible, Error<E>> {
    let seconds = clamp_countdown(seconds);
    info!("deep_power_down {=u8}", seconds);

    self.locked(true, |dev| {
      dev.configure_watchdog(0, false)?;

      // drive FOUT/nIRQ low in sleep so it can't leak into the host
      dev.mask_keyed_register(REG_CONFIG_KEY_OTHER, REG_OCTRL, 0xff, REG_OCTRL_O1EN, false)?;
      dev.clear_register_bit(REG_CTRL_1, REG_CTRL_1_OUT, false)?;
      dev.write_register(REG_SQW, REG_SQW_DEFAULT, false)?;
      // OUT only, since SQW is off: the countdown interrupt stays off the pin
      dev.mask_register(REG_CTRL_2, !REG_CTRL_2_OUT1S_MASK, REG_CTRL_2_OUT1S_SQW, false)?;

      dev.set_countdown_timer(seconds as i32, false, true, false)?;

      // sleep can't be entered with STOP set
      dev.mask_register(REG_CTRL_1, !(REG_CTRL_1_STOP | REG_CTRL_1_RSP), REG_CTRL_1_PWR2, false)?;
      dev.mask_keyed_register(REG_CONFIG_KEY_OSC_CTRL, REG_OSC_CTRL, 0xff, REG_OSC_CTRL_PWGT, false)?;
      dev.mask_register(REG_CTRL_2, !REG_CTRL_2_OUT2S_MASK, REG_CTRL_2_OUT2S_SLEEP, false)?;

      let mut sleep = SleepControl(0);
      sleep.set_sleep(true);
      sleep.set_reset_low(true);
      dev.write_register(REG_SLEEP_CTRL, sleep.0, false)
    }).map_err(|e| {
      error!("failure in deep_power_down");
      e
    })?;

    let start = host.millis();
    while host.millis().wrapping_sub(start) < seconds as u32 * 1000 {
      if let Ok(_sleep_ctrl) = self.read_register(REG_SLEEP_CTRL, true) {
        trace!("sleep_ctrl={=u8:x}", _sleep_ctrl);
      }
      host.delay_ms(1000);
    }

    error!("didn't power down");
    host.reset()
  }
}
