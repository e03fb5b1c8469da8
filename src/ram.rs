//! Battery-backed scratch RAM.
//!
//! The 256 bytes are reached through the 128 byte alternate window at 0x80;
//! the XADA bit in the extension register picks which half of RAM the window
//! shows. A transfer is therefore split into chunks that fit one bus burst
//! and never cross the halfway point.

use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::InputPin;

use crate::bus::{BusLock, MAX_READ_LEN, MAX_WRITE_LEN};
use crate::registers::*;
use crate::{Error, AB1805};

/// Size of the scratch RAM in bytes
pub const RAM_SIZE: usize = 256;

const BANK_SIZE: usize = 128;

/// Half of RAM shown in the alternate window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RamBank {
  /// RAM addresses 0..128, XADA clear
  Lower,
  /// RAM addresses 128..256, XADA set
  Upper,
}

/// One bus transaction worth of a RAM transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamChunk {
  pub bank: RamBank,
  /// Offset within the bank
  pub offset: u8,
  /// Offset of this chunk within the caller's buffer
  pub start: usize,
  pub len: usize,
}

impl RamChunk {
  /// Register address of the first byte
  pub fn register(&self) -> u8 {
    REG_ALT_RAM + self.offset
  }
}

/// Iterator over the chunks of a RAM transfer, see [`ram_chunks`]
#[derive(Debug, Clone)]
pub struct RamChunks {
  addr: usize,
  start: usize,
  remaining: usize,
  max_len: usize,
}

/// Split a transfer of `len` bytes at RAM address `addr` into chunks of at
/// most `max_len` bytes that stay inside one bank.
pub fn ram_chunks(addr: usize, len: usize, max_len: usize) -> RamChunks {
  RamChunks { addr, start: 0, remaining: len, max_len: max_len.max(1) }
}

impl Iterator for RamChunks {
  type Item = RamChunk;

  fn next(&mut self) -> Option<RamChunk> {
    if self.remaining == 0 {
      return None;
    }
    let offset = self.addr % BANK_SIZE;
    let len = self.remaining.min(self.max_len).min(BANK_SIZE - offset);
    let chunk = RamChunk {
      bank: if self.addr < BANK_SIZE { RamBank::Lower } else { RamBank::Upper },
      offset: offset as u8,
      start: self.start,
      len,
    };
    self.addr += len;
    self.start += len;
    self.remaining -= len;
    Some(chunk)
  }
}

/// A value with a fixed little-endian encoding in scratch RAM
pub trait RamValue: Sized {
  const SIZE: usize;

  /// Encode into `buf`, which is exactly `SIZE` bytes
  fn to_ram_bytes(&self, buf: &mut [u8]);

  /// Decode from `buf`, which is exactly `SIZE` bytes
  fn from_ram_bytes(buf: &[u8]) -> Self;
}

macro_rules! ram_value_le {
  ($($t:ty),*) => {
    $(
      impl RamValue for $t {
        const SIZE: usize = core::mem::size_of::<$t>();

        fn to_ram_bytes(&self, buf: &mut [u8]) {
          buf.copy_from_slice(&self.to_le_bytes());
        }

        fn from_ram_bytes(buf: &[u8]) -> Self {
          let mut bytes = [0u8; core::mem::size_of::<$t>()];
          bytes.copy_from_slice(buf);
          <$t>::from_le_bytes(bytes)
        }
      }
    )*
  };
}

ram_value_le!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl RamValue for bool {
  const SIZE: usize = 1;

  fn to_ram_bytes(&self, buf: &mut [u8]) {
    buf[0] = *self as u8;
  }

  fn from_ram_bytes(buf: &[u8]) -> Self {
    buf[0] != 0
  }
}

impl<const N: usize> RamValue for [u8; N] {
  const SIZE: usize = N;

  fn to_ram_bytes(&self, buf: &mut [u8]) {
    buf.copy_from_slice(self);
  }

  fn from_ram_bytes(buf: &[u8]) -> Self {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(buf);
    bytes
  }
}

fn check_ram_range<E>(addr: usize, len: usize) -> Result<(), Error<E>> {
  match addr.checked_add(len) {
    Some(end) if end <= RAM_SIZE => Ok(()),
    _ => Err(Error::OutOfRange),
  }
}

impl<I2C, E, P, L> AB1805<I2C, P, L>
  where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    P: InputPin,
    L: BusLock,
{
  /// Size of the scratch RAM
  pub fn ram_len(&self) -> usize {
    RAM_SIZE
  }

  fn select_ram_bank(&mut self, bank: RamBank) -> Result<(), Error<E>> {
    match bank {
      RamBank::Lower => self.clear_register_bit(REG_EXT_ADDR, REG_EXT_ADDR_XADA, false),
      RamBank::Upper => self.set_register_bit(REG_EXT_ADDR, REG_EXT_ADDR_XADA, false),
    }
  }

  /// Read `buf.len()` bytes of scratch RAM starting at `addr`
  pub fn read_ram(&mut self, addr: usize, buf: &mut [u8], lock: bool) -> Result<(), Error<E>> {
    check_ram_range(addr, buf.len())?;
    self.locked(lock, |dev| {
      for chunk in ram_chunks(addr, buf.len(), MAX_READ_LEN) {
        dev.select_ram_bank(chunk.bank)?;
        dev.read_registers(chunk.register(), &mut buf[chunk.start..chunk.start + chunk.len], false)?;
      }
      Ok(())
    })
  }

  /// Write `data` to scratch RAM starting at `addr`
  pub fn write_ram(&mut self, addr: usize, data: &[u8], lock: bool) -> Result<(), Error<E>> {
    check_ram_range(addr, data.len())?;
    self.locked(lock, |dev| {
      for chunk in ram_chunks(addr, data.len(), MAX_WRITE_LEN) {
        dev.select_ram_bank(chunk.bank)?;
        dev.write_registers(chunk.register(), &data[chunk.start..chunk.start + chunk.len], false)?;
      }
      Ok(())
    })
  }

  /// Zero all of scratch RAM
  pub fn erase_ram(&mut self, lock: bool) -> Result<(), Error<E>> {
    self.write_ram(0, &[0u8; RAM_SIZE], lock)
  }

  /// Read a value stored with [`put`](AB1805::put)
  pub fn get<T: RamValue>(&mut self, addr: usize) -> Result<T, Error<E>> {
    let mut buf = [0u8; RAM_SIZE];
    if T::SIZE > RAM_SIZE {
      return Err(Error::OutOfRange);
    }
    self.read_ram(addr, &mut buf[..T::SIZE], true)?;
    Ok(T::from_ram_bytes(&buf[..T::SIZE]))
  }

  /// Store a value at RAM address `addr`
  pub fn put<T: RamValue>(&mut self, addr: usize, value: &T) -> Result<(), Error<E>> {
    let mut buf = [0u8; RAM_SIZE];
    if T::SIZE > RAM_SIZE {
      return Err(Error::OutOfRange);
    }
    value.to_ram_bytes(&mut buf[..T::SIZE]);
    self.write_ram(addr, &buf[..T::SIZE], true)
  }
}
