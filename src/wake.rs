use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::InputPin;

use crate::bus::BusLock;
use crate::registers::*;
use crate::{Error, AB1805};

/// Why the host was last reset or woken
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeReason {
  /// Not caused by the RTC, or not known
  #[default]
  Unknown,
  /// The watchdog expired and reset the host
  Watchdog,
  /// The host came back from [`deep_power_down`](AB1805::deep_power_down)
  DeepPowerDown,
  /// The countdown timer reached zero
  CountdownTimer,
  /// The alarm registers matched (one-shot or repeating)
  Alarm,
}

impl<I2C, E, P, L> AB1805<I2C, P, L>
  where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    P: InputPin,
    L: BusLock,
{
  /// The wake reason found by the last [`update_wake_reason`](AB1805::update_wake_reason)
  pub fn wake_reason(&self) -> WakeReason {
    self.wake_reason
  }

  /// Classify the cause of the last reset or wake from the status flags, in
  /// priority order watchdog, deep power down, countdown timer, alarm.
  /// The flag that matched is cleared so it isn't reported again, except
  /// the sleep flag, which is device state rather than a latched event.
  ///
  /// [`setup`](AB1805::setup) calls this once. After a host sleep mode that
  /// resumes execution instead of restarting, the host must call it again.
  pub fn update_wake_reason(&mut self) -> Result<WakeReason, Error<E>> {
    let reason = self.locked(true, |dev| {
      let status = Status(dev.read_register(REG_STATUS, false)?);

      if status.watchdog() {
        dev.clear_register_bit(REG_STATUS, REG_STATUS_WDT, false)?;
        Ok(WakeReason::Watchdog)
      }
      else if SleepControl(dev.read_register(REG_SLEEP_CTRL, false)?).slept() {
        Ok(WakeReason::DeepPowerDown)
      }
      else if status.timer() {
        dev.clear_register_bit(REG_STATUS, REG_STATUS_TIM, false)?;
        Ok(WakeReason::CountdownTimer)
      }
      else if status.alarm() {
        dev.clear_register_bit(REG_STATUS, REG_STATUS_ALM, false)?;
        Ok(WakeReason::Alarm)
      }
      else {
        Ok(WakeReason::Unknown)
      }
    }).map_err(|e| {
      error!("failure in update_wake_reason");
      e
    })?;

    if reason != WakeReason::Unknown {
      info!("wake reason = {}", reason);
    }
    self.wake_reason = reason;
    Ok(reason)
  }
}
