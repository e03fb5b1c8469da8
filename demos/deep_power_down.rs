extern crate ab1805_rtc;

mod common;

use ab1805_rtc::{AB1805, Config, WakeReason};
use anyhow::Result;
use common::{check, LinuxHost};
use linux_embedded_hal::I2cdev;

/// Cut host power for a while through the AB1805 power switch,
/// assuming a board where the AB1805 PSW/nIRQ2 output drives the enable
/// of the host regulator and FOUT/nIRQ is not shared with the host.
///
/// Run it at boot: the first run powers the host down for
/// `SLEEP_SECS`, the run after power comes back reports the wake reason
/// and counts the cycle in RTC RAM.

const SLEEP_SECS: i32 = 30;
const CYCLES_ADDR: usize = 0;

fn main() -> Result<()> {
  let i2c = I2cdev::new("/dev/i2c-1").expect("Failed to open I2C device");
  let mut host = LinuxHost::new();
  let mut rtc = AB1805::new(i2c, Config::default());
  check(rtc.setup(&mut host))?;

  let cycles: u32 = check(rtc.get(CYCLES_ADDR))?;
  let reason = rtc.wake_reason();
  println!("wake reason {:?} after {} cycles", reason, cycles);

  if reason == WakeReason::DeepPowerDown {
    check(rtc.put(CYCLES_ADDR, &cycles.wrapping_add(1)))?;
    println!("back from deep power down");
    return Ok(());
  }

  // a stale watchdog would reset the host while it prepares to sleep
  check(rtc.on_host_reset())?;
  println!("powering down for {} s", SLEEP_SECS);
  // returns only if a register write fails
  match rtc.deep_power_down(&mut host, SLEEP_SECS) {
    Ok(never) => match never {},
    Err(e) => Err(anyhow::anyhow!("deep power down failed: {:?}", e)),
  }
}
