extern crate ab1805_rtc;

mod common;

use std::time::Duration;

use ab1805_rtc::{AB1805, Config, DateTimeAccess, WakeReason};
use common::{check, LinuxHost};
use linux_embedded_hal::I2cdev;
// use direct linux gpio access using cdev rather than via constrained embedded_hal methods
use gpiocdev::line::EdgeDetection;

/// Arm the countdown timer and wait for it on FOUT/nIRQ,
/// assuming linux environment (such as Raspberry Pi 3+)
/// with the AB1805 attached to i2c1 and
/// GPIO 17 (physical pin 11) connected to FOUT/nIRQ.
/// Then arm a repeating alarm once a minute and wait for that.

const COUNTDOWN_SECS: i32 = 10;

fn dump_edge_events(gpio_int_req: &gpiocdev::Request) {
  while Ok(true) == gpio_int_req.has_edge_event() {
    if let Ok(inner_evt) = gpio_int_req.read_edge_event() {
      println!("{:?}", inner_evt);
    }
  }
}

fn main() -> anyhow::Result<()> {
  let i2c = I2cdev::new("/dev/i2c-1").expect("Failed to open I2C device");
  let mut host = LinuxHost::new();
  let mut rtc = AB1805::new(i2c, Config::default());
  check(rtc.setup(&mut host))?;

  // push the host clock into the RTC
  check(rtc.tick(&mut host))?;
  println!("rtc {}", check(rtc.datetime())?);

  let gpio_int_req = gpiocdev::Request::builder()
    .on_chip("/dev/gpiochip0")
    .with_line(17)
    // nIRQ is open drain, active low
    .as_active_low()
    .with_edge_detection(EdgeDetection::RisingEdge)
    .request()?;
  dump_edge_events(&gpio_int_req);

  check(rtc.arm_countdown(COUNTDOWN_SECS, false))?;
  println!("countdown armed for {} s", COUNTDOWN_SECS);

  let fired = gpio_int_req.wait_edge_event(Duration::from_secs(COUNTDOWN_SECS as u64 + 5))?;
  dump_edge_events(&gpio_int_req);
  let reason = check(rtc.update_wake_reason())?;
  println!("edge: {} reason: {:?}", fired, reason);
  assert_eq!(reason, WakeReason::CountdownTimer);
  check(rtc.stop_countdown_timer())?;

  // once a minute, at second 30
  let mut when = check(rtc.rtc_calendar())?;
  when.second = 30;
  check(rtc.arm_repeating(&when, ab1805_rtc::RepeatMode::Second))?;
  println!("alarm armed for :30");
  for _i in 0..2 {
    let fired = gpio_int_req.wait_edge_event(Duration::from_secs(65))?;
    dump_edge_events(&gpio_int_req);
    println!("edge: {} rtc: {} reason: {:?}",
             fired, check(rtc.datetime())?, check(rtc.update_wake_reason())?);
  }
  check(rtc.clear_repeating_interrupt())?;

  Ok(())
}
