use core::convert::Infallible;

use bitflags::bitflags;

use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::InputPin;

use crate::bus::BusLock;
use crate::registers::*;
use crate::{Error, AB1805};

/// Driver configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config<P> {
  /// Host input wired to FOUT/nIRQ, if any. The chip drives it high once
  /// its i2c interface is ready; it is also the interrupt / wake line.
  pub wake_pin: Option<P>,
  /// 7-bit bus address. The AB1805 address is not configurable.
  pub address: u8,
}

impl Default for Config<NoPin> {
  fn default() -> Self {
    Config {
      wake_pin: None,
      address: AB1805_ADDRESS,
    }
  }
}

impl<P> Config<P> {
  pub fn with_wake_pin(pin: P) -> Self {
    Config {
      wake_pin: Some(pin),
      address: AB1805_ADDRESS,
    }
  }
}

/// Placeholder pin type for boards where FOUT/nIRQ is not connected
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoPin;

impl InputPin for NoPin {
  type Error = Infallible;

  fn is_high(&self) -> Result<bool, Self::Error> {
    Ok(true)
  }

  fn is_low(&self) -> Result<bool, Self::Error> {
    Ok(false)
  }
}

bitflags! {
  /// Options for [`AB1805::reset_config`]
  #[derive(Default)]
  pub struct ResetFlags: u32 {
    /// Keep the alarm repeat setting instead of disabling it
    const PRESERVE_REPEATING_TIMER = 0x0000_0001;
    /// Run from the RC oscillator instead of the crystal
    const DISABLE_XT = 0x0000_0002;
  }
}

impl<I2C, E, P, L> AB1805<I2C, P, L>
  where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    P: InputPin,
    L: BusLock,
{
  /// Restore the configuration registers to their power-on defaults,
  /// as one atomic sequence. Whether the RTC has been set survives the reset.
  pub fn reset_config(&mut self, flags: ResetFlags) -> Result<(), Error<E>> {
    trace!("reset_config({=u32:x})", flags.bits());

    self.locked(true, |dev| {
      dev.write_register(REG_STATUS, REG_STATUS_DEFAULT, false)?;

      let rtc_set = dev.is_bit_clear(REG_CTRL_1, REG_CTRL_1_WRTC, false)?;
      dev.write_register(REG_CTRL_1, REG_CTRL_1_DEFAULT, false)?;
      if rtc_set {
        dev.clear_register_bit(REG_CTRL_1, REG_CTRL_1_WRTC, false)?;
      }

      dev.write_register(REG_CTRL_2, REG_CTRL_2_DEFAULT, false)?;
      dev.write_register(REG_INT_MASK, REG_INT_MASK_DEFAULT, false)?;
      dev.write_register(REG_SQW, REG_SQW_DEFAULT, false)?;
      dev.write_register(REG_SLEEP_CTRL, REG_SLEEP_CTRL_DEFAULT, false)?;

      if flags.contains(ResetFlags::PRESERVE_REPEATING_TIMER) {
        dev.mask_register(REG_TIMER_CTRL, REG_TIMER_CTRL_RPT_MASK,
                          REG_TIMER_CTRL_DEFAULT & !REG_TIMER_CTRL_RPT_MASK, false)?;
      }
      else {
        dev.write_register(REG_TIMER_CTRL, REG_TIMER_CTRL_DEFAULT, false)?;
      }

      dev.write_register(REG_TIMER, REG_TIMER_DEFAULT, false)?;
      dev.write_register(REG_TIMER_INITIAL, REG_TIMER_INITIAL_DEFAULT, false)?;
      dev.write_register(REG_WDT, REG_WDT_DEFAULT, false)?;

      // FOS is always on so a failing crystal falls back to RC
      let mut osc_ctrl = REG_OSC_CTRL_DEFAULT | REG_OSC_CTRL_FOS;
      if flags.contains(ResetFlags::DISABLE_XT) {
        osc_ctrl |= REG_OSC_CTRL_OSEL;
      }
      dev.write_keyed_register(REG_CONFIG_KEY_OSC_CTRL, REG_OSC_CTRL, osc_ctrl, false)?;

      dev.write_keyed_register(REG_CONFIG_KEY_OTHER, REG_TRICKLE, REG_TRICKLE_DEFAULT, false)?;
      dev.write_keyed_register(REG_CONFIG_KEY_OTHER, REG_BREF_CTRL, REG_BREF_CTRL_DEFAULT, false)?;
      dev.write_keyed_register(REG_CONFIG_KEY_OTHER, REG_AFCTRL, REG_AFCTRL_DEFAULT, false)?;
      dev.write_keyed_register(REG_CONFIG_KEY_OTHER, REG_BATMODE_IO, REG_BATMODE_IO_DEFAULT, false)?;
      dev.write_keyed_register(REG_CONFIG_KEY_OTHER, REG_OCTRL, REG_OCTRL_DEFAULT, false)
    })?;

    // the chip no longer runs a watchdog
    self.watchdog_secs = 0;
    self.watchdog_refresh_ms = 0;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTrans};
  use std::vec;
  use std::vec::Vec;

  fn w(reg: u8, value: u8) -> I2cTrans {
    I2cTrans::write(AB1805_ADDRESS, vec![reg, value])
  }

  fn r(reg: u8, value: u8) -> I2cTrans {
    I2cTrans::write_read(AB1805_ADDRESS, vec![reg], vec![value])
  }

  fn tail(osc_ctrl: u8) -> Vec<I2cTrans> {
    vec![
      w(REG_TIMER, REG_TIMER_DEFAULT),
      w(REG_TIMER_INITIAL, REG_TIMER_INITIAL_DEFAULT),
      w(REG_WDT, REG_WDT_DEFAULT),
      w(REG_CONFIG_KEY, REG_CONFIG_KEY_OSC_CTRL),
      w(REG_OSC_CTRL, osc_ctrl),
      w(REG_CONFIG_KEY, REG_CONFIG_KEY_OTHER),
      w(REG_TRICKLE, REG_TRICKLE_DEFAULT),
      w(REG_CONFIG_KEY, REG_CONFIG_KEY_OTHER),
      w(REG_BREF_CTRL, REG_BREF_CTRL_DEFAULT),
      w(REG_CONFIG_KEY, REG_CONFIG_KEY_OTHER),
      w(REG_AFCTRL, REG_AFCTRL_DEFAULT),
      w(REG_CONFIG_KEY, REG_CONFIG_KEY_OTHER),
      w(REG_BATMODE_IO, REG_BATMODE_IO_DEFAULT),
      w(REG_CONFIG_KEY, REG_CONFIG_KEY_OTHER),
      w(REG_OCTRL, REG_OCTRL_DEFAULT),
    ]
  }

  #[test]
  fn test_flags_combine() {
    let flags = ResetFlags::PRESERVE_REPEATING_TIMER | ResetFlags::DISABLE_XT;
    assert_eq!(flags.bits(), 0x03);
    assert!(flags.contains(ResetFlags::DISABLE_XT));
    assert!(!ResetFlags::empty().contains(ResetFlags::PRESERVE_REPEATING_TIMER));
  }

  #[test]
  fn test_reset_config_keeps_rtc_set() {
    let mut expectations = vec![
      w(REG_STATUS, REG_STATUS_DEFAULT),
      r(REG_CTRL_1, 0x12),
      w(REG_CTRL_1, REG_CTRL_1_DEFAULT),
      r(REG_CTRL_1, REG_CTRL_1_DEFAULT),
      w(REG_CTRL_1, REG_CTRL_1_DEFAULT & !REG_CTRL_1_WRTC),
      w(REG_CTRL_2, REG_CTRL_2_DEFAULT),
      w(REG_INT_MASK, REG_INT_MASK_DEFAULT),
      w(REG_SQW, REG_SQW_DEFAULT),
      w(REG_SLEEP_CTRL, REG_SLEEP_CTRL_DEFAULT),
      w(REG_TIMER_CTRL, REG_TIMER_CTRL_DEFAULT),
    ];
    expectations.extend(tail(REG_OSC_CTRL_FOS));

    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    rtc.reset_config(ResetFlags::empty()).unwrap();
    rtc.release().done();
  }

  #[test]
  fn test_reset_config_preserve_repeat_and_rc_oscillator() {
    let mut expectations = vec![
      w(REG_STATUS, REG_STATUS_DEFAULT),
      r(REG_CTRL_1, 0x13),
      w(REG_CTRL_1, REG_CTRL_1_DEFAULT),
      w(REG_CTRL_2, REG_CTRL_2_DEFAULT),
      w(REG_INT_MASK, REG_INT_MASK_DEFAULT),
      w(REG_SQW, REG_SQW_DEFAULT),
      w(REG_SLEEP_CTRL, REG_SLEEP_CTRL_DEFAULT),
      // enabled timer with a once-per-hour repeat: only the repeat bits survive
      r(REG_TIMER_CTRL, REG_TIMER_CTRL_TE | REG_TIMER_CTRL_RPT_MIN | REG_TIMER_CTRL_TFS_1),
      w(REG_TIMER_CTRL, REG_TIMER_CTRL_TRPT | REG_TIMER_CTRL_RPT_MIN | REG_TIMER_CTRL_TFS_1_60),
    ];
    expectations.extend(tail(REG_OSC_CTRL_FOS | REG_OSC_CTRL_OSEL));

    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    rtc.reset_config(ResetFlags::PRESERVE_REPEATING_TIMER | ResetFlags::DISABLE_XT).unwrap();
    rtc.release().done();
  }
}
