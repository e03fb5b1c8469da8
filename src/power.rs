use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::InputPin;

use crate::bus::BusLock;
use crate::registers::*;
use crate::{Error, AB1805};

/// Trickle charger series diode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diode {
  /// Standard diode, 0.6 V drop
  Standard,
  /// Schottky diode, 0.3 V drop
  Schottky,
}

/// Trickle charger series resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rout {
  R3k,
  R6k,
  R11k,
}

/// Battery voltage comparison for [`check_vbat`](AB1805::check_vbat)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VbatThreshold {
  /// Above the BREF brownout threshold
  AboveBref,
  /// Above the 1.2 V minimum
  AboveMin,
}

/// Trickle register value, 0 when charging is off
pub fn trickle_value(setting: Option<(Diode, Rout)>) -> u8 {
  match setting {
    None => REG_TRICKLE_DEFAULT,
    Some((diode, rout)) => {
      let diode = match diode {
        Diode::Standard => REG_TRICKLE_DIODE_0_6,
        Diode::Schottky => REG_TRICKLE_DIODE_0_3,
      };
      let rout = match rout {
        Rout::R3k => REG_TRICKLE_ROUT_3K,
        Rout::R6k => REG_TRICKLE_ROUT_6K,
        Rout::R11k => REG_TRICKLE_ROUT_11K,
      };
      REG_TRICKLE_TCS_ENABLE | diode | rout
    }
  }
}

impl<I2C, E, P, L> AB1805<I2C, P, L>
  where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    P: InputPin,
    L: BusLock,
{
  /// Enable trickle charging of the backup battery or supercap, or disable it with `None`
  pub fn set_trickle(&mut self, setting: Option<(Diode, Rout)>) -> Result<(), Error<E>> {
    self.write_keyed_register(REG_CONFIG_KEY_OTHER, REG_TRICKLE, trickle_value(setting), true)
  }

  /// Compare the backup battery voltage against `threshold`.
  /// Trickle charging is paused during the measurement.
  pub fn check_vbat(&mut self, threshold: VbatThreshold) -> Result<bool, Error<E>> {
    let mask = match threshold {
      VbatThreshold::AboveBref => REG_ASTAT_BBOD,
      VbatThreshold::AboveMin => REG_ASTAT_BMIN,
    };

    self.locked(true, |dev| {
      let trickle = dev.read_register(REG_TRICKLE, false)?;
      if trickle != REG_TRICKLE_DEFAULT {
        dev.write_keyed_register(REG_CONFIG_KEY_OTHER, REG_TRICKLE, REG_TRICKLE_DEFAULT, false)?;
      }

      let astat = dev.read_register(REG_ASTAT, false);

      if trickle != REG_TRICKLE_DEFAULT {
        dev.write_keyed_register(REG_CONFIG_KEY_OTHER, REG_TRICKLE, trickle, false)?;
      }
      Ok(astat? & mask != 0)
    })
  }

  /// True if the chip runs from its RC oscillator rather than the crystal,
  /// either by configuration or after a crystal failure.
  pub fn using_rc_oscillator(&mut self) -> Result<bool, Error<E>> {
    self.is_bit_set(REG_OSC_STATUS, REG_OSC_STATUS_OMODE, true)
  }

  /// The part number from the identity registers, 0x1805 for an AB1805
  pub fn part_number(&mut self) -> Result<u16, Error<E>> {
    let mut id = [0u8; 2];
    self.read_registers(REG_ID0, &mut id, true)?;
    Ok(u16::from_be_bytes(id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Config;
  use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTrans};
  use std::vec;

  fn w(reg: u8, value: u8) -> I2cTrans {
    I2cTrans::write(AB1805_ADDRESS, vec![reg, value])
  }

  fn r(reg: u8, value: u8) -> I2cTrans {
    I2cTrans::write_read(AB1805_ADDRESS, vec![reg], vec![value])
  }

  #[test]
  fn test_trickle_values() {
    assert_eq!(trickle_value(None), 0x00);
    assert_eq!(trickle_value(Some((Diode::Schottky, Rout::R3k))), 0xa5);
    assert_eq!(trickle_value(Some((Diode::Standard, Rout::R11k))), 0xab);
  }

  #[test]
  fn test_set_trickle_is_keyed() {
    let expectations = [
      w(REG_CONFIG_KEY, REG_CONFIG_KEY_OTHER),
      w(REG_TRICKLE, 0xa6),
      w(REG_CONFIG_KEY, REG_CONFIG_KEY_OTHER),
      w(REG_TRICKLE, 0x00),
    ];
    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    rtc.set_trickle(Some((Diode::Schottky, Rout::R6k))).unwrap();
    rtc.set_trickle(None).unwrap();
    rtc.release().done();
  }

  #[test]
  fn test_check_vbat_pauses_trickle() {
    let expectations = [
      r(REG_TRICKLE, 0xa5),
      w(REG_CONFIG_KEY, REG_CONFIG_KEY_OTHER),
      w(REG_TRICKLE, 0x00),
      r(REG_ASTAT, REG_ASTAT_BMIN),
      w(REG_CONFIG_KEY, REG_CONFIG_KEY_OTHER),
      w(REG_TRICKLE, 0xa5),
      // charging off: nothing to pause
      r(REG_TRICKLE, 0x00),
      r(REG_ASTAT, REG_ASTAT_BMIN),
    ];
    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    assert!(rtc.check_vbat(VbatThreshold::AboveMin).unwrap());
    assert!(!rtc.check_vbat(VbatThreshold::AboveBref).unwrap());
    rtc.release().done();
  }

  #[test]
  fn test_identity_and_oscillator() {
    let expectations = [
      I2cTrans::write_read(AB1805_ADDRESS, vec![REG_ID0], vec![REG_ID0_AB18XX, REG_ID1_ABXX05]),
      r(REG_OSC_STATUS, REG_OSC_STATUS_OMODE),
    ];
    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    assert_eq!(rtc.part_number().unwrap(), 0x1805);
    assert!(rtc.using_rc_oscillator().unwrap());
    rtc.release().done();
  }
}
