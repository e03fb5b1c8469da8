//! A register-level stand-in for the AB1805 and a scripted host, shared by
//! the integration tests.

#![allow(dead_code)]

use ab1805_rtc::registers::*;
use ab1805_rtc::{Host, NaiveDateTime, MAX_READ_LEN, MAX_WRITE_LEN};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Write, WriteRead};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nack;

/// Simulated chip: the register file, the 256 byte RAM behind the
/// alternate window, and a log of every register write.
pub struct FakeChip {
  pub regs: [u8; 256],
  pub ram: [u8; 256],
  /// No device on the bus: every transfer is NACKed
  pub absent: bool,
  /// (register, value) for each byte written, in order
  pub writes: Vec<(u8, u8)>,
}

impl FakeChip {
  pub fn new() -> Self {
    let mut regs = [0u8; 256];
    regs[REG_CTRL_1 as usize] = REG_CTRL_1_DEFAULT;
    regs[REG_CTRL_2 as usize] = REG_CTRL_2_DEFAULT;
    regs[REG_INT_MASK as usize] = REG_INT_MASK_DEFAULT;
    regs[REG_SQW as usize] = REG_SQW_DEFAULT;
    regs[REG_TIMER_CTRL as usize] = REG_TIMER_CTRL_DEFAULT;
    regs[REG_BREF_CTRL as usize] = REG_BREF_CTRL_DEFAULT;
    regs[REG_BATMODE_IO as usize] = REG_BATMODE_IO_DEFAULT;
    regs[REG_ID0 as usize] = REG_ID0_AB18XX;
    regs[REG_ID1 as usize] = REG_ID1_ABXX05;
    FakeChip { regs, ram: [0u8; 256], absent: false, writes: Vec::new() }
  }

  pub fn reg(&self, reg: u8) -> u8 {
    self.regs[reg as usize]
  }

  /// Registers written, in order, without the values
  pub fn written_registers(&self) -> Vec<u8> {
    self.writes.iter().map(|(reg, _)| *reg).collect()
  }

  fn ram_index(&self, reg: usize) -> usize {
    let bank = if self.regs[REG_EXT_ADDR as usize] & REG_EXT_ADDR_XADA != 0 { 128 } else { 0 };
    bank + reg - REG_ALT_RAM as usize
  }

  fn check(&self, address: u8, reg: u8, len: usize, max_len: usize) -> Result<(), Nack> {
    if self.absent || address != AB1805_ADDRESS || len > max_len || reg as usize + len > 0x100 {
      return Err(Nack);
    }
    Ok(())
  }
}

impl Write for FakeChip {
  type Error = Nack;

  fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
    let (&reg, data) = bytes.split_first().ok_or(Nack)?;
    self.check(address, reg, data.len(), MAX_WRITE_LEN)?;
    for (i, value) in data.iter().enumerate() {
      let r = reg as usize + i;
      if r >= REG_ALT_RAM as usize {
        let idx = self.ram_index(r);
        self.ram[idx] = *value;
      }
      else if r != REG_ID0 as usize && r != REG_ID1 as usize {
        self.regs[r] = *value;
      }
      self.writes.push((r as u8, *value));
    }
    Ok(())
  }
}

impl WriteRead for FakeChip {
  type Error = Nack;

  fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
    if bytes.len() != 1 {
      return Err(Nack);
    }
    let reg = bytes[0];
    self.check(address, reg, buffer.len(), MAX_READ_LEN)?;
    for (i, value) in buffer.iter_mut().enumerate() {
      let r = reg as usize + i;
      *value = if r >= REG_ALT_RAM as usize {
        self.ram[self.ram_index(r)]
      }
      else {
        self.regs[r]
      };
    }
    Ok(())
  }
}

/// Host with a manual millisecond clock. `delay_ms` advances it.
#[derive(Default)]
pub struct FakeHost {
  pub now: u32,
  pub time: Option<NaiveDateTime>,
  pub synced: bool,
}

impl DelayMs<u32> for FakeHost {
  fn delay_ms(&mut self, ms: u32) {
    self.now = self.now.wrapping_add(ms);
  }
}

impl Host for FakeHost {
  fn millis(&mut self) -> u32 {
    self.now
  }

  fn system_time(&mut self) -> Option<NaiveDateTime> {
    self.time
  }

  fn set_system_time(&mut self, time: &NaiveDateTime) {
    self.time = Some(*time);
  }

  fn time_synced(&mut self) -> bool {
    self.synced
  }

  fn reset(&mut self) -> ! {
    panic!("host reset")
  }
}

/// Deterministic byte pattern (64-bit LCG)
pub fn pseudo_random_bytes(seed: u64, out: &mut [u8]) {
  let mut state = seed;
  for byte in out.iter_mut() {
    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    *byte = (state >> 33) as u8;
  }
}
