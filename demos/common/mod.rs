//! Host services for the demos, on linux (such as a Raspberry Pi 3+)
//! with the AB1805 attached to i2c1.

#![allow(dead_code)]

use std::fmt::Debug;
use std::thread::sleep;
use std::time::{Duration, Instant};

use ab1805_rtc::{Error, Host, NaiveDateTime};
use chrono::Utc;
use embedded_hal::blocking::delay::DelayMs;

/// Host side of the driver backed by the linux clocks.
/// The system clock is treated as trusted (NTP).
pub struct LinuxHost {
  start: Instant,
}

impl LinuxHost {
  pub fn new() -> Self {
    LinuxHost { start: Instant::now() }
  }
}

impl DelayMs<u32> for LinuxHost {
  fn delay_ms(&mut self, ms: u32) {
    sleep(Duration::from_millis(ms as u64));
  }
}

impl Host for LinuxHost {
  fn millis(&mut self) -> u32 {
    self.start.elapsed().as_millis() as u32
  }

  fn system_time(&mut self) -> Option<NaiveDateTime> {
    Some(Utc::now().naive_utc())
  }

  fn set_system_time(&mut self, time: &NaiveDateTime) {
    // setting the clock needs root; the demos only report it
    println!("host clock would be set to {}", time);
  }

  fn time_synced(&mut self) -> bool {
    true
  }

  fn reset(&mut self) -> ! {
    println!("host reset requested");
    std::process::exit(1)
  }
}

/// Driver errors as anyhow errors, for `?` in the demos
pub fn check<T, E: Debug>(res: Result<T, Error<E>>) -> anyhow::Result<T> {
  res.map_err(|e| anyhow::anyhow!("AB1805 error: {:?}", e))
}
