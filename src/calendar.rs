//! Conversions between calendar time and the chip's BCD counter registers.
//! Pure functions, no bus access.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Bytes in a calendar register image, seconds through weekday
pub const CALENDAR_LEN: usize = 7;

/// Calendar time with the field conventions of C's `struct tm`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
  /// 0..59
  pub second: u8,
  /// 0..59
  pub minute: u8,
  /// 0..23
  pub hour: u8,
  /// Day of month, 1..31
  pub day: u8,
  /// Months since January, 0..11 (the chip stores 1..12)
  pub month: u8,
  /// Years since 1900. The chip keeps only two digits and assumes the 2000s.
  pub year: u16,
  /// Days since Sunday, 0..6
  pub weekday: u8,
}

impl CalendarTime {
  /// Calendar fields of a chrono datetime, truncated to whole seconds
  pub fn from_datetime(dt: &NaiveDateTime) -> Self {
    CalendarTime {
      second: dt.second().min(59) as u8,
      minute: dt.minute() as u8,
      hour: dt.hour() as u8,
      day: dt.day() as u8,
      month: dt.month0() as u8,
      year: (dt.year() - 1900).clamp(0, u16::MAX as i32) as u16,
      weekday: dt.weekday().num_days_from_sunday() as u8,
    }
  }

  /// The chrono datetime for these fields, or `None` if they don't form a valid date.
  /// `weekday` is not consulted.
  pub fn to_datetime(&self) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1900 + self.year as i32, self.month as u32 + 1, self.day as u32)?
      .and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
  }
}

impl From<&NaiveDateTime> for CalendarTime {
  fn from(dt: &NaiveDateTime) -> Self {
    CalendarTime::from_datetime(dt)
  }
}

// Converts a binary value (0..99) to BCD format
pub fn bin_to_bcd(value: u8) -> u8 {
  (((value / 10) % 10) << 4) | (value % 10)
}

// Converts a BCD value to binary format
pub fn bcd_to_bin(value: u8) -> u8 {
  ((value & 0xF0) >> 4) * 10 + (value & 0x0F)
}

/// Number of register bytes used by a calendar image with or without the year
pub const fn calendar_len(include_year: bool) -> usize {
  if include_year { CALENDAR_LEN } else { CALENDAR_LEN - 1 }
}

/// Encode calendar fields in register order: seconds, minutes, hours, day,
/// month, [year], weekday. The year is left out for the alarm registers.
/// Only the first `calendar_len(include_year)` bytes are meaningful.
pub fn calendar_to_registers(time: &CalendarTime, include_year: bool) -> [u8; CALENDAR_LEN] {
  let mut regs = [0u8; CALENDAR_LEN];
  let mut idx = 0;
  let mut push = |value: u8| {
    regs[idx] = bin_to_bcd(value);
    idx += 1;
  };
  push(time.second);
  push(time.minute);
  push(time.hour);
  push(time.day);
  push(time.month.wrapping_add(1));
  if include_year {
    push((time.year % 100) as u8);
  }
  push(time.weekday);
  regs
}

/// Inverse of [`calendar_to_registers`]. Missing trailing bytes read as zero;
/// without the year, `year` is left at 0.
pub fn registers_to_calendar(regs: &[u8], include_year: bool) -> CalendarTime {
  let mut values = regs.iter().map(|bcd| bcd_to_bin(*bcd));
  let mut next = || values.next().unwrap_or(0);

  let mut time = CalendarTime {
    second: next(),
    minute: next(),
    hour: next(),
    day: next(),
    month: next().saturating_sub(1),
    ..CalendarTime::default()
  };
  if include_year {
    time.year = next() as u16 + 100;
  }
  time.weekday = next();
  time
}
