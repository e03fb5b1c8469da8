//! Register access layer.
//!
//! Every operation takes a `lock` flag. With `lock == true` the operation
//! brackets itself with the bus lock; with `false` the caller must already
//! hold it, which is how several register operations are composed into one
//! atomic sequence.

use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::InputPin;

use crate::{Error, AB1805};

/// Largest read burst the bus carries in a single transaction
pub const MAX_READ_LEN: usize = 32;

/// Largest write burst, not counting the leading register address byte
pub const MAX_WRITE_LEN: usize = 31;

// One past the last register address
const REGISTER_SPACE: usize = 0x100;

/// Mutual exclusion for a bus shared with other drivers.
///
/// Implementations must be reentrant: the driver never nests its own
/// acquisitions, but a caller that holds the lock around a block of driver
/// calls may still invoke operations that take it again.
pub trait BusLock {
  fn lock(&mut self);
  fn unlock(&mut self);
}

/// Lock for a bus that has no other users
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLock;

impl BusLock for NoLock {
  fn lock(&mut self) {}
  fn unlock(&mut self) {}
}

impl<I2C, E, P, L> AB1805<I2C, P, L>
  where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    P: InputPin,
    L: BusLock,
{
  /// Run `f` with the bus lock held if `lock` is true.
  /// The lock is released whether or not `f` succeeds.
  pub fn locked<R>(&mut self, lock: bool,
                   f: impl FnOnce(&mut Self) -> Result<R, Error<E>>) -> Result<R, Error<E>> {
    if lock {
      self.lock.lock();
    }
    let res = f(self);
    if lock {
      self.lock.unlock();
    }
    res
  }

  /// Read a single register
  pub fn read_register(&mut self, reg: u8, lock: bool) -> Result<u8, Error<E>> {
    let mut buf = [0u8];
    self.read_registers(reg, &mut buf, lock)?;
    Ok(buf[0])
  }

  /// Read sequential registers in one transaction, so multi-byte counters
  /// can't roll over in the middle of the read.
  pub fn read_registers(&mut self, reg: u8, buf: &mut [u8], lock: bool) -> Result<(), Error<E>> {
    let len = buf.len();
    if self.absent {
      return Err(Error::NotDetected);
    }
    if len > MAX_READ_LEN {
      return Err(Error::InvalidLength);
    }
    if reg as usize + len > REGISTER_SPACE {
      return Err(Error::OutOfRange);
    }
    self.locked(lock, |dev| {
      let address = dev.address;
      dev.i2c.write_read(address, &[reg], buf).map_err(|e| {
        error!("failed to read reg={=u8:x} len={=usize}", reg, len);
        Error::I2c(e)
      })
    })
  }

  /// Write a single register
  pub fn write_register(&mut self, reg: u8, value: u8, lock: bool) -> Result<(), Error<E>> {
    self.write_registers(reg, &[value], lock)
  }

  /// Write sequential registers in one transaction
  pub fn write_registers(&mut self, reg: u8, data: &[u8], lock: bool) -> Result<(), Error<E>> {
    let len = data.len();
    if self.absent {
      return Err(Error::NotDetected);
    }
    if len > MAX_WRITE_LEN {
      return Err(Error::InvalidLength);
    }
    if reg as usize + len > REGISTER_SPACE {
      return Err(Error::OutOfRange);
    }
    let mut frame = [0u8; MAX_WRITE_LEN + 1];
    frame[0] = reg;
    frame[1..=len].copy_from_slice(data);

    self.locked(lock, |dev| {
      let address = dev.address;
      dev.i2c.write(address, &frame[..=len]).map_err(|e| {
        error!("failed to write reg={=u8:x} len={=usize}", reg, len);
        Error::I2c(e)
      })
    })
  }

  /// Read-modify-write: the register becomes `(old & and_mask) | or_mask`.
  /// The read always happens; the write is skipped if the value is unchanged.
  pub fn mask_register(&mut self, reg: u8, and_mask: u8, or_mask: u8, lock: bool) -> Result<(), Error<E>> {
    self.locked(lock, |dev| {
      let old = dev.read_register(reg, false)?;
      let new = (old & and_mask) | or_mask;
      if new != old {
        dev.write_register(reg, new, false)?;
      }
      Ok(())
    })
  }

  // set specific bits in a register:
  // all bits must be high that you wish to set
  pub fn set_register_bit(&mut self, reg: u8, bits: u8, lock: bool) -> Result<(), Error<E>> {
    self.mask_register(reg, 0xff, bits, lock)
  }

  // clear specific bits in a register:
  // all bits must be high that you wish to be cleared
  pub fn clear_register_bit(&mut self, reg: u8, bits: u8, lock: bool) -> Result<(), Error<E>> {
    self.mask_register(reg, !bits, 0x00, lock)
  }

  /// True if any of `bits` is set in the register
  pub fn is_bit_set(&mut self, reg: u8, bits: u8, lock: bool) -> Result<bool, Error<E>> {
    Ok(self.read_register(reg, lock)? & bits != 0)
  }

  /// True if all of `bits` are clear in the register
  pub fn is_bit_clear(&mut self, reg: u8, bits: u8, lock: bool) -> Result<bool, Error<E>> {
    Ok(self.read_register(reg, lock)? & bits == 0)
  }

  // Protected registers only accept a write right after the matching key
  pub(crate) fn write_keyed_register(&mut self, key: u8, reg: u8, value: u8, lock: bool) -> Result<(), Error<E>> {
    self.locked(lock, |dev| {
      dev.write_register(crate::registers::REG_CONFIG_KEY, key, false)?;
      dev.write_register(reg, value, false)
    })
  }

  pub(crate) fn mask_keyed_register(&mut self, key: u8, reg: u8, and_mask: u8, or_mask: u8, lock: bool)
    -> Result<(), Error<E>> {
    self.locked(lock, |dev| {
      dev.write_register(crate::registers::REG_CONFIG_KEY, key, false)?;
      dev.mask_register(reg, and_mask, or_mask, false)
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::registers::*;
  use crate::Config;
  use core::cell::Cell;
  use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTrans};
  use embedded_hal_mock::MockError;
  use std::io::ErrorKind;
  use std::rc::Rc;
  use std::vec;

  // Counts acquisitions so tests can check lock/unlock stay balanced
  #[derive(Clone, Default)]
  struct CountingLock {
    depth: Rc<Cell<i32>>,
    acquired: Rc<Cell<u32>>,
  }

  impl BusLock for CountingLock {
    fn lock(&mut self) {
      self.depth.set(self.depth.get() + 1);
      self.acquired.set(self.acquired.get() + 1);
    }
    fn unlock(&mut self) {
      self.depth.set(self.depth.get() - 1);
    }
  }

  #[test]
  fn test_read_registers_burst() {
    let expectations = [
      I2cTrans::write_read(AB1805_ADDRESS, vec![REG_HUNDREDTH], vec![0x00, 0x59, 0x59, 0x23]),
    ];
    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    let mut buf = [0u8; 4];
    rtc.read_registers(REG_HUNDREDTH, &mut buf, true).unwrap();
    assert_eq!(buf, [0x00, 0x59, 0x59, 0x23]);
    rtc.release().done();
  }

  #[test]
  fn test_write_registers_prefixes_address() {
    let expectations = [
      I2cTrans::write(AB1805_ADDRESS, vec![REG_TIMER, 0x10, 0x20]),
    ];
    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    rtc.write_registers(REG_TIMER, &[0x10, 0x20], true).unwrap();
    rtc.release().done();
  }

  #[test]
  fn test_bursts_beyond_bus_limits_rejected() {
    let expectations: [I2cTrans; 0] = [];
    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    let mut big = [0u8; MAX_READ_LEN + 1];
    assert_eq!(rtc.read_registers(REG_ALT_RAM, &mut big, true), Err(Error::InvalidLength));
    assert_eq!(rtc.write_registers(REG_ALT_RAM, &[0u8; MAX_WRITE_LEN + 1], true),
               Err(Error::InvalidLength));
    assert_eq!(rtc.write_registers(0xf0, &[0u8; 17], true), Err(Error::OutOfRange));
    rtc.release().done();
  }

  #[test]
  fn test_mask_register_skips_unchanged_write() {
    let expectations = [
      I2cTrans::write_read(AB1805_ADDRESS, vec![REG_INT_MASK], vec![0xe8]),
    ];
    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    rtc.set_register_bit(REG_INT_MASK, REG_INT_MASK_TIE, true).unwrap();
    rtc.release().done();
  }

  #[test]
  fn test_mask_register_and_then_or() {
    let expectations = [
      I2cTrans::write_read(AB1805_ADDRESS, vec![REG_CTRL_2], vec![REG_CTRL_2_DEFAULT]),
      I2cTrans::write(AB1805_ADDRESS, vec![REG_CTRL_2, 0x3f]),
      I2cTrans::write_read(AB1805_ADDRESS, vec![REG_STATUS], vec![0x2c]),
      I2cTrans::write(AB1805_ADDRESS, vec![REG_STATUS, 0x24]),
    ];
    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    rtc.mask_register(REG_CTRL_2, !REG_CTRL_2_OUT1S_MASK, REG_CTRL_2_OUT1S_NAIRQ, true).unwrap();
    rtc.clear_register_bit(REG_STATUS, REG_STATUS_TIM, true).unwrap();
    rtc.release().done();
  }

  #[test]
  fn test_bit_queries() {
    let expectations = [
      I2cTrans::write_read(AB1805_ADDRESS, vec![REG_CTRL_1], vec![REG_CTRL_1_DEFAULT]),
      I2cTrans::write_read(AB1805_ADDRESS, vec![REG_CTRL_1], vec![REG_CTRL_1_DEFAULT]),
    ];
    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    assert!(rtc.is_bit_set(REG_CTRL_1, REG_CTRL_1_WRTC, true).unwrap());
    assert!(!rtc.is_bit_clear(REG_CTRL_1, REG_CTRL_1_WRTC, true).unwrap());
    rtc.release().done();
  }

  #[test]
  fn test_failed_read_is_reported_not_retried() {
    let expectations = [
      I2cTrans::write_read(AB1805_ADDRESS, vec![REG_STATUS], vec![0x00])
        .with_error(MockError::Io(ErrorKind::Other)),
    ];
    let mut rtc = AB1805::new(I2cMock::new(&expectations), Config::default());
    assert_eq!(rtc.clear_register_bit(REG_STATUS, REG_STATUS_ALM, true),
               Err(Error::I2c(MockError::Io(ErrorKind::Other))));
    rtc.release().done();
  }

  #[test]
  fn test_lock_released_after_failure() {
    let expectations = [
      I2cTrans::write_read(AB1805_ADDRESS, vec![REG_STATUS], vec![0x04]),
      I2cTrans::write(AB1805_ADDRESS, vec![REG_STATUS, 0x00])
        .with_error(MockError::Io(ErrorKind::Other)),
      I2cTrans::write_read(AB1805_ADDRESS, vec![REG_CTRL_1], vec![0x12]),
    ];
    let lock = CountingLock::default();
    let mut rtc = AB1805::new_with_lock(I2cMock::new(&expectations), Config::default(), lock.clone());
    assert!(rtc.clear_register_bit(REG_STATUS, REG_STATUS_ALM, true).is_err());
    assert_eq!(lock.depth.get(), 0);
    assert_eq!(lock.acquired.get(), 1);

    // caller-held lock: the driver must not take it again
    lock.depth.set(1);
    let value = rtc.read_register(REG_CTRL_1, false).unwrap();
    assert_eq!(value, 0x12);
    assert_eq!(lock.acquired.get(), 1);
    rtc.release().done();
  }
}
