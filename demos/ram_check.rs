extern crate ab1805_rtc;

mod common;

use ab1805_rtc::{AB1805, Config, RAM_SIZE};
use anyhow::Result;
use chrono::Utc;
use common::{check, LinuxHost};
use linux_embedded_hal::I2cdev;

/// Exercise the AB1805 battery-backed RAM,
/// assuming linux environment (such as Raspberry Pi 3+)
/// with the AB1805 attached to i2c1, sharing the bus with other devices.
///
/// Writes a pseudo-random pattern over all 256 bytes, reads it back across
/// the bank boundary, erases, then keeps a boot counter that survives
/// host power cycles as long as the RTC keeps power.

const BOOT_COUNT_ADDR: usize = 252;

fn fill_pattern(seed: u64, buf: &mut [u8]) {
  let mut state = seed;
  for byte in buf.iter_mut() {
    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    *byte = (state >> 33) as u8;
  }
}

fn main() -> Result<()> {
  let i2c = I2cdev::new("/dev/i2c-1").expect("Failed to open I2C device");
  let i2c_bus = shared_bus::BusManagerSimple::new(i2c);

  let mut host = LinuxHost::new();
  let mut rtc = AB1805::new(i2c_bus.acquire_i2c(), Config::default());
  check(rtc.setup(&mut host))?;
  println!("part number {:04x} wake reason {:?}",
           check(rtc.part_number())?, rtc.wake_reason());

  // keep the boot counter across the pattern test
  let boots: u32 = check(rtc.get(BOOT_COUNT_ADDR))?;

  let mut pattern = [0u8; RAM_SIZE];
  fill_pattern(Utc::now().timestamp() as u64, &mut pattern);
  check(rtc.write_ram(0, &pattern, true))?;

  let mut readback = [0u8; RAM_SIZE];
  check(rtc.read_ram(0, &mut readback, true))?;
  let mismatches = pattern.iter().zip(readback.iter()).filter(|(a, b)| a != b).count();
  println!("pattern readback: {} mismatches", mismatches);
  assert_eq!(mismatches, 0);

  check(rtc.erase_ram(true))?;
  check(rtc.read_ram(0, &mut readback, true))?;
  assert!(readback.iter().all(|b| *b == 0));
  println!("erase ok");

  check(rtc.put(BOOT_COUNT_ADDR, &boots.wrapping_add(1)))?;
  println!("boot count {}", check(rtc.get::<u32>(BOOT_COUNT_ADDR))?);

  Ok(())
}
