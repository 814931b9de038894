//! Register definitions and bitfield structures for the DS1307 RTC.
//!
//! The DS1307 keeps its time of day in three BCD registers. Bits that do not
//! belong to the time value (the clock-halt flag, the 12/24 hour flag and the
//! AM/PM flag) share those same bytes, so every write here goes through a
//! bitfield setter that leaves the neighbouring bits alone.

use bitfield::bitfield;

use crate::TimeError;

/// Register addresses for the DS1307 RTC.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59) plus the clock-halt flag
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (1-12 + AM/PM or 0-23) plus the 12/24 hour flag
    Hours = 0x02,
}

/// Time representation format for the DS1307.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}

impl TimeRepresentation {
    /// Selects a representation by its hour count, `12` or `24`.
    ///
    /// Any other value is rejected with [`TimeError::InvalidMode`]. Use this
    /// to check a raw mode value: `From<u8>` (and so `try_from`) takes the
    /// register bit, 0 or 1, and panics on anything else.
    pub fn from_hours(hours: u8) -> Result<Self, TimeError> {
        match hours {
            12 => Ok(TimeRepresentation::TwelveHour),
            24 => Ok(TimeRepresentation::TwentyFourHour),
            other => Err(TimeError::InvalidMode(other)),
        }
    }

    /// Returns the hour count of this representation, `12` or `24`.
    pub fn hours(self) -> u8 {
        match self {
            TimeRepresentation::TwelveHour => 12,
            TimeRepresentation::TwentyFourHour => 24,
        }
    }
}

impl From<u8> for TimeRepresentation {
    /// Creates a `TimeRepresentation` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => TimeRepresentation::TwentyFourHour,
            1 => TimeRepresentation::TwelveHour,
            _ => panic!("Invalid value for TimeRepresentation: {}", v),
        }
    }
}
impl From<TimeRepresentation> for u8 {
    /// Converts a `TimeRepresentation` to its raw register value.
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

/// Oscillator state, as held by the clock-halt (CH) bit.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// Oscillator is running and the clock is counting
    Running = 0,
    /// Oscillator is halted
    Halted = 1,
}

impl Oscillator {
    /// Returns the opposite state.
    pub fn toggled(self) -> Self {
        match self {
            Oscillator::Running => Oscillator::Halted,
            Oscillator::Halted => Oscillator::Running,
        }
    }
}

impl From<u8> for Oscillator {
    /// Creates an `Oscillator` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => Oscillator::Running,
            1 => Oscillator::Halted,
            _ => panic!("Invalid value for Oscillator: {}", v),
        }
    }
}
impl From<Oscillator> for u8 {
    /// Converts an `Oscillator` to its raw register value.
    fn from(v: Oscillator) -> Self {
        v as u8
    }
}

/// AM/PM flag of the hours register.
///
/// Only meaningful while the device runs in 12-hour mode; in 24-hour mode
/// the same bit is the twenty-hours digit.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Meridiem {
    /// Ante meridiem
    Am = 0,
    /// Post meridiem
    Pm = 1,
}

impl TryFrom<u8> for Meridiem {
    type Error = TimeError;

    /// Accepts the raw flag value, `0` for AM and `1` for PM.
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Meridiem::Am),
            1 => Ok(Meridiem::Pm),
            other => Err(TimeError::InvalidMeridiem(other)),
        }
    }
}
impl From<Meridiem> for u8 {
    fn from(v: Meridiem) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Seconds register (0-59) with BCD encoding and the clock-halt flag.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Clock-halt flag, set while the oscillator is stopped
    pub from into Oscillator, clock_halt, set_clock_halt: 7, 7;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);

impl Seconds {
    /// Decoded seconds, ignoring the clock-halt flag.
    pub fn value(&self) -> u8 {
        10 * self.ten_seconds() + self.seconds()
    }

    /// Stores `value` as BCD. The clock-halt flag is left as it is.
    pub fn set_value(&mut self, value: u8) {
        self.set_seconds(value % 10);
        self.set_ten_seconds((value / 10) & 0b111);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Seconds {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Seconds({}s, {})", self.value(), self.clock_halt());
    }
}

bitfield! {
    /// Minutes register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Minutes(u8);
    impl Debug;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(Minutes);

impl Minutes {
    /// Decoded minutes.
    pub fn value(&self) -> u8 {
        10 * self.ten_minutes() + self.minutes()
    }

    /// Stores `value` as BCD.
    pub fn set_value(&mut self, value: u8) {
        self.set_minutes(value % 10);
        self.set_ten_minutes((value / 10) & 0b111);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Minutes {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Minutes({}m)", self.value());
    }
}

bitfield! {
    /// Hours register with format selection and BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// Time representation format (12/24 hour)
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    /// PM flag (12-hour) or 20-hour bit (24-hour)
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5, 5;
    /// Tens place of hours
    pub ten_hours, set_ten_hours: 4, 4;
    /// Ones place of hours
    pub hours, set_hours: 3, 0;
}
from_register_u8!(Hours);

impl Hours {
    /// Decoded hour in the register's own convention: 1-12 in 12-hour mode,
    /// 0-23 in 24-hour mode.
    ///
    /// In 12-hour mode bit 5 is the AM/PM flag and does not count towards
    /// the tens digit.
    pub fn hour(&self) -> u8 {
        let tens = match self.time_representation() {
            TimeRepresentation::TwentyFourHour => {
                self.ten_hours() + 2 * self.pm_or_twenty_hours()
            }
            TimeRepresentation::TwelveHour => self.ten_hours(),
        };
        10 * tens + self.hours()
    }

    /// Stores `hour` as BCD using the tens width of the current mode.
    ///
    /// The mode flag is never touched, and in 12-hour mode neither is the
    /// AM/PM flag.
    pub fn set_hour(&mut self, hour: u8) {
        let tens = hour / 10;
        self.set_hours(hour % 10);
        self.set_ten_hours(tens & 0x01);
        if self.time_representation() == TimeRepresentation::TwentyFourHour {
            self.set_pm_or_twenty_hours((tens >> 1) & 0x01);
        }
    }

    /// AM/PM flag, read regardless of the current mode.
    pub fn meridiem(&self) -> Meridiem {
        if self.pm_or_twenty_hours() == 0 {
            Meridiem::Am
        } else {
            Meridiem::Pm
        }
    }

    pub fn set_meridiem(&mut self, meridiem: Meridiem) {
        self.set_pm_or_twenty_hours(meridiem.into());
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Hours {
    fn format(&self, f: defmt::Formatter) {
        match self.time_representation() {
            TimeRepresentation::TwentyFourHour => {
                defmt::write!(f, "Hours({}h 24h)", self.hour());
            }
            TimeRepresentation::TwelveHour => {
                let is_pm = self.meridiem() == Meridiem::Pm;
                defmt::write!(f, "Hours({}h {})", self.hour(), if is_pm { "PM" } else { "AM" });
            }
        }
    }
}
