//! AB1805 register map: addresses, bit masks and power-on defaults.
//!
//! The raw masks are what the register access layer works with; the
//! `bitfield` types below give named accessors for the registers whose
//! fields the driver composes or inspects.

use bitfield::bitfield;

// Fixed i2c bus address of the device (7-bit)
pub const AB1805_ADDRESS: u8 = 0x69;

// Calendar counters, 2 BCD digits each.
// The upper bits of several of these double as general purpose bits (GPx).
pub const REG_HUNDREDTH: u8 = 0x00;
pub const REG_SECOND: u8 = 0x01;
pub const REG_MINUTE: u8 = 0x02;
pub const REG_HOUR: u8 = 0x03;
pub const REG_DATE: u8 = 0x04;
pub const REG_MONTH: u8 = 0x05;
pub const REG_YEAR: u8 = 0x06;
pub const REG_WEEKDAY: u8 = 0x07;

// Alarm comparison registers, same layout as the counters minus the year
pub const REG_HUNDREDTH_ALARM: u8 = 0x08;
pub const REG_SECOND_ALARM: u8 = 0x09;
pub const REG_MINUTE_ALARM: u8 = 0x0a;
pub const REG_HOUR_ALARM: u8 = 0x0b;
pub const REG_DATE_ALARM: u8 = 0x0c;
pub const REG_MONTH_ALARM: u8 = 0x0d;
pub const REG_WEEKDAY_ALARM: u8 = 0x0e;

// Status flags. A flag is cleared by writing 0 to it.
pub const REG_STATUS: u8 = 0x0f;
pub const REG_STATUS_CB: u8 = 0x80; // century
pub const REG_STATUS_BAT: u8 = 0x40; // switched to VBAT
pub const REG_STATUS_WDT: u8 = 0x20; // watchdog triggered
pub const REG_STATUS_BL: u8 = 0x10; // battery low crossing
pub const REG_STATUS_TIM: u8 = 0x08; // countdown timer reached 0
pub const REG_STATUS_ALM: u8 = 0x04; // alarm registers matched
pub const REG_STATUS_EX2: u8 = 0x02; // WDI interrupt
pub const REG_STATUS_EX1: u8 = 0x01; // EXTI interrupt
pub const REG_STATUS_DEFAULT: u8 = 0x00;

pub const REG_CTRL_1: u8 = 0x10;
pub const REG_CTRL_1_STOP: u8 = 0x80; // stop clocking system
pub const REG_CTRL_1_12_24: u8 = 0x40; // 12 hour mode when set
pub const REG_CTRL_1_OUTB: u8 = 0x20; // static value for nIRQ2
pub const REG_CTRL_1_OUT: u8 = 0x10; // static value for FOUT/nIRQ
pub const REG_CTRL_1_RSP: u8 = 0x08; // reset polarity
pub const REG_CTRL_1_ARST: u8 = 0x04; // auto reset enable
pub const REG_CTRL_1_PWR2: u8 = 0x02; // PSW/nIRQ2 low resistance power switch
pub const REG_CTRL_1_WRTC: u8 = 0x01; // calendar counters writable
pub const REG_CTRL_1_DEFAULT: u8 = 0x13; // OUT | PWR2 | WRTC

pub const REG_CTRL_2: u8 = 0x11;
pub const REG_CTRL_2_RS1E: u8 = 0x20;
pub const REG_CTRL_2_OUT2S_MASK: u8 = 0x1c; // PSW/nIRQ2 output mode
pub const REG_CTRL_2_OUT2S_NIRQ: u8 = 0x00;
pub const REG_CTRL_2_OUT2S_SQW: u8 = 0x04;
pub const REG_CTRL_2_OUT2S_NAIRQ: u8 = 0x0c;
pub const REG_CTRL_2_OUT2S_TIRQ: u8 = 0x10;
pub const REG_CTRL_2_OUT2S_NTIRQ: u8 = 0x14;
pub const REG_CTRL_2_OUT2S_SLEEP: u8 = 0x18;
pub const REG_CTRL_2_OUT2S_OUTB: u8 = 0x1c;
pub const REG_CTRL_2_OUT1S_MASK: u8 = 0x03; // FOUT/nIRQ output mode
pub const REG_CTRL_2_OUT1S_NIRQ: u8 = 0x00; // nIRQ if any interrupt enabled, else OUT
pub const REG_CTRL_2_OUT1S_SQW: u8 = 0x01; // SQW if enabled, else OUT
pub const REG_CTRL_2_OUT1S_SQW_NIRQ: u8 = 0x02;
pub const REG_CTRL_2_OUT1S_NAIRQ: u8 = 0x03; // nAIRQ if AIE set, else OUT
pub const REG_CTRL_2_DEFAULT: u8 = 0x3c; // OUT2S = OUTB

pub const REG_INT_MASK: u8 = 0x12;
pub const REG_INT_MASK_CEB: u8 = 0x80;
pub const REG_INT_MASK_IM: u8 = 0x60;
pub const REG_INT_MASK_BLIE: u8 = 0x10;
pub const REG_INT_MASK_TIE: u8 = 0x08; // countdown timer interrupt enable
pub const REG_INT_MASK_AIE: u8 = 0x04; // alarm interrupt enable
pub const REG_INT_MASK_EX2E: u8 = 0x02;
pub const REG_INT_MASK_EX1E: u8 = 0x01;
pub const REG_INT_MASK_DEFAULT: u8 = 0xe0; // CEB | IM = 1/4 s

pub const REG_SQW: u8 = 0x13;
pub const REG_SQW_SQWE: u8 = 0x80;
pub const REG_SQW_DEFAULT: u8 = 0x26;

pub const REG_CAL_XT: u8 = 0x14;
pub const REG_CAL_RC_HIGH: u8 = 0x15;
pub const REG_CAL_RC_LOW: u8 = 0x16;

pub const REG_SLEEP_CTRL: u8 = 0x17;
pub const REG_SLEEP_CTRL_SLP: u8 = 0x80; // enter sleep mode
pub const REG_SLEEP_CTRL_SLRES: u8 = 0x40; // assert nRST while asleep
pub const REG_SLEEP_CTRL_EX2P: u8 = 0x20;
pub const REG_SLEEP_CTRL_EX1P: u8 = 0x10;
pub const REG_SLEEP_CTRL_SLST: u8 = 0x08; // sleep has occurred
pub const REG_SLEEP_CTRL_SLTO_MASK: u8 = 0x07;
pub const REG_SLEEP_CTRL_DEFAULT: u8 = 0x00;

pub const REG_TIMER_CTRL: u8 = 0x18;
pub const REG_TIMER_CTRL_TE: u8 = 0x80; // timer enable
pub const REG_TIMER_CTRL_TM: u8 = 0x40; // level (1) or pulse (0) interrupt
pub const REG_TIMER_CTRL_TRPT: u8 = 0x20; // timer auto reload
pub const REG_TIMER_CTRL_RPT_MASK: u8 = 0x1c; // alarm repeat function
pub const REG_TIMER_CTRL_RPT_HUN: u8 = 0x1c;
pub const REG_TIMER_CTRL_RPT_SEC: u8 = 0x18;
pub const REG_TIMER_CTRL_RPT_MIN: u8 = 0x14;
pub const REG_TIMER_CTRL_RPT_HOUR: u8 = 0x10;
pub const REG_TIMER_CTRL_RPT_WKDY: u8 = 0x0c;
pub const REG_TIMER_CTRL_RPT_DATE: u8 = 0x08;
pub const REG_TIMER_CTRL_RPT_MON: u8 = 0x04;
pub const REG_TIMER_CTRL_RPT_DIS: u8 = 0x00;
pub const REG_TIMER_CTRL_TFS_MASK: u8 = 0x03; // timer clock frequency
pub const REG_TIMER_CTRL_TFS_FAST: u8 = 0x00;
pub const REG_TIMER_CTRL_TFS_64: u8 = 0x01;
pub const REG_TIMER_CTRL_TFS_1: u8 = 0x02;
pub const REG_TIMER_CTRL_TFS_1_60: u8 = 0x03;
pub const REG_TIMER_CTRL_DEFAULT: u8 = 0x23; // TRPT | TFS = 1/60 Hz

pub const REG_TIMER: u8 = 0x19;
pub const REG_TIMER_DEFAULT: u8 = 0x00;
pub const REG_TIMER_INITIAL: u8 = 0x1a;
pub const REG_TIMER_INITIAL_DEFAULT: u8 = 0x00;

pub const REG_WDT: u8 = 0x1b;
pub const REG_WDT_RESET: u8 = 0x80; // reset the host (1) or raise WIRQ (0)
pub const REG_WDT_WRB_16_HZ: u8 = 0x00;
pub const REG_WDT_WRB_4_HZ: u8 = 0x01;
pub const REG_WDT_WRB_1_HZ: u8 = 0x02;
pub const REG_WDT_WRB_1_4_HZ: u8 = 0x03;
pub const REG_WDT_DEFAULT: u8 = 0x00;

// Writes require REG_CONFIG_KEY_OSC_CTRL in the key register first
pub const REG_OSC_CTRL: u8 = 0x1c;
pub const REG_OSC_CTRL_OSEL: u8 = 0x80; // RC oscillator when set
pub const REG_OSC_CTRL_ACAL: u8 = 0x60;
pub const REG_OSC_CTRL_AOS: u8 = 0x10;
pub const REG_OSC_CTRL_FOS: u8 = 0x08; // fall back to RC on XT failure
pub const REG_OSC_CTRL_PWGT: u8 = 0x04; // disable the I/O interface in sleep
pub const REG_OSC_CTRL_OFIE: u8 = 0x02;
pub const REG_OSC_CTRL_ACIE: u8 = 0x01;
pub const REG_OSC_CTRL_DEFAULT: u8 = 0x00;

pub const REG_OSC_STATUS: u8 = 0x1d;
pub const REG_OSC_STATUS_XTCAL: u8 = 0xc0;
pub const REG_OSC_STATUS_LKO2: u8 = 0x20;
pub const REG_OSC_STATUS_OMODE: u8 = 0x10; // running on RC (read-only)
pub const REG_OSC_STATUS_OF: u8 = 0x02;
pub const REG_OSC_STATUS_ACF: u8 = 0x01;

// The key resets to 0 after the next write to a protected register
pub const REG_CONFIG_KEY: u8 = 0x1f;
pub const REG_CONFIG_KEY_OSC_CTRL: u8 = 0xa1;
pub const REG_CONFIG_KEY_SW_RESET: u8 = 0x3c;
pub const REG_CONFIG_KEY_OTHER: u8 = 0x9d; // TRICKLE, BREF_CTRL, AFCTRL, BATMODE_IO, OCTRL

pub const REG_TRICKLE: u8 = 0x20;
pub const REG_TRICKLE_DEFAULT: u8 = 0x00;
pub const REG_TRICKLE_TCS_MASK: u8 = 0xf0;
pub const REG_TRICKLE_TCS_ENABLE: u8 = 0xa0;
pub const REG_TRICKLE_DIODE_MASK: u8 = 0x0c;
pub const REG_TRICKLE_DIODE_0_6: u8 = 0x08;
pub const REG_TRICKLE_DIODE_0_3: u8 = 0x04;
pub const REG_TRICKLE_ROUT_MASK: u8 = 0x03;
pub const REG_TRICKLE_ROUT_11K: u8 = 0x03;
pub const REG_TRICKLE_ROUT_6K: u8 = 0x02;
pub const REG_TRICKLE_ROUT_3K: u8 = 0x01;
pub const REG_TRICKLE_ROUT_DISABLE: u8 = 0x00;

pub const REG_BREF_CTRL: u8 = 0x21;
pub const REG_BREF_CTRL_DEFAULT: u8 = 0xf0;
pub const REG_BREF_CTRL_25_30: u8 = 0x70;
pub const REG_BREF_CTRL_21_25: u8 = 0xb0;
pub const REG_BREF_CTRL_18_22: u8 = 0xd0;
pub const REG_BREF_CTRL_14_16: u8 = 0xf0;

pub const REG_AFCTRL: u8 = 0x26;
pub const REG_AFCTRL_ENABLE: u8 = 0xa0;
pub const REG_AFCTRL_DISABLE: u8 = 0x00;
pub const REG_AFCTRL_DEFAULT: u8 = 0x00;

pub const REG_BATMODE_IO: u8 = 0x27;
pub const REG_BATMODE_IO_IOBM: u8 = 0x80;
pub const REG_BATMODE_IO_DEFAULT: u8 = 0x80;

// Identity registers (read-only)
pub const REG_ID0: u8 = 0x28;
pub const REG_ID0_AB18XX: u8 = 0x18;
pub const REG_ID1: u8 = 0x29;
pub const REG_ID1_ABXX05: u8 = 0x05;
pub const REG_ID2: u8 = 0x2a;
pub const REG_ID3: u8 = 0x2b;
pub const REG_ID4: u8 = 0x2c;
pub const REG_ID5: u8 = 0x2d;
pub const REG_ID6: u8 = 0x2e;

pub const REG_ASTAT: u8 = 0x2f;
pub const REG_ASTAT_BBOD: u8 = 0x80; // VBAT above BREF
pub const REG_ASTAT_BMIN: u8 = 0x40; // VBAT above 1.2V
pub const REG_ASTAT_VINIT: u8 = 0x02;

pub const REG_OCTRL: u8 = 0x30;
pub const REG_OCTRL_WDBM: u8 = 0x80;
pub const REG_OCTRL_EXBM: u8 = 0x40;
pub const REG_OCTRL_WDDS: u8 = 0x20;
pub const REG_OCTRL_EXDS: u8 = 0x10;
pub const REG_OCTRL_RSEN: u8 = 0x08;
pub const REG_OCTRL_O4EN: u8 = 0x04;
pub const REG_OCTRL_O3EN: u8 = 0x02;
pub const REG_OCTRL_O1EN: u8 = 0x01; // FOUT/nIRQ driven in sleep
pub const REG_OCTRL_DEFAULT: u8 = 0x00;

pub const REG_EXT_ADDR: u8 = 0x3f;
pub const REG_EXT_ADDR_O4MB: u8 = 0x80;
pub const REG_EXT_ADDR_BPOL: u8 = 0x40;
pub const REG_EXT_ADDR_WDIN: u8 = 0x20;
pub const REG_EXT_ADDR_EXIN: u8 = 0x10;
pub const REG_EXT_ADDR_XADA: u8 = 0x04; // selects the upper half of RAM in the alternate window
pub const REG_EXT_ADDR_XADS: u8 = 0x03;

pub const REG_RAM: u8 = 0x40;
pub const REG_ALT_RAM: u8 = 0x80;

bitfield! {
  /// Status register (0x0F)
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct Status(u8);
  impl Debug;
  pub century, _: 7;
  pub on_battery, _: 6;
  pub watchdog, set_watchdog: 5;
  pub battery_low, _: 4;
  pub timer, set_timer: 3;
  pub alarm, set_alarm: 2;
  pub ex2, _: 1;
  pub ex1, _: 0;
}

bitfield! {
  /// Control 2 register (0x11): output pin routing
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct Control2(u8);
  impl Debug;
  pub rs1e, set_rs1e: 5;
  pub u8, out2s, set_out2s: 4, 2;
  pub u8, out1s, set_out1s: 1, 0;
}

bitfield! {
  /// Sleep control register (0x17)
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct SleepControl(u8);
  impl Debug;
  pub sleep, set_sleep: 7;
  pub reset_low, set_reset_low: 6;
  pub ex2p, set_ex2p: 5;
  pub ex1p, set_ex1p: 4;
  pub slept, _: 3;
  pub u8, timeout, set_timeout: 2, 0;
}

bitfield! {
  /// Countdown timer control register (0x18)
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct TimerControl(u8);
  impl Debug;
  pub enable, set_enable: 7;
  pub level, set_level: 6;
  pub auto_reload, set_auto_reload: 5;
  pub u8, repeat, set_repeat: 4, 2;
  pub u8, frequency, set_frequency: 1, 0;
}

bitfield! {
  /// Watchdog timer register (0x1B)
  #[derive(Clone, Copy, Default, PartialEq, Eq)]
  pub struct WatchdogControl(u8);
  impl Debug;
  pub reset, set_reset: 7;
  pub u8, period, set_period: 6, 2;
  pub u8, clock, set_clock: 1, 0;
}
