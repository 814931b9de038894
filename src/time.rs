//! Time-of-day conversion for the DS1307 RTC.
//!
//! The DS1307 keeps its time of day in three consecutive BCD registers
//! (seconds, minutes, hours). This module converts between that register
//! triple and chrono's `NaiveTime`, honouring the 12/24 hour flag stored in
//! the hours register and leaving the clock-halt flag alone.
//!
//! Conversion errors are reported via [`TimeError`].

use chrono::{NaiveTime, Timelike};

use crate::{Hours, Meridiem, Minutes, Seconds, TimeRepresentation};

/// Raw contents of the three time-of-day registers.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct DS1307Time {
    seconds: Seconds,
    minutes: Minutes,
    hours: Hours,
}

impl DS1307Time {
    /// Rejects the values `set_time` refuses to write.
    ///
    /// The hour bound is the same in both modes; keeping the hour consistent
    /// with the configured mode is left to the caller.
    pub(crate) fn check_time(hour: u8, minute: u8, second: u8) -> Result<(), TimeError> {
        if hour >= 13 || minute >= 60 || second >= 60 {
            error!("DS1307: rejecting time {}:{}:{}", hour, minute, second);
            return Err(TimeError::InvalidTime);
        }
        Ok(())
    }

    fn is_bcd(raw: u8) -> bool {
        (raw & 0x0F) <= 9
    }

    /// Hour of day (0-23) to the hours register, in the mode `existing`
    /// already carries.
    pub(crate) fn convert_hours(existing: Hours, hour: u32) -> Result<Hours, TimeError> {
        let hour = u8::try_from(hour).map_err(|_| TimeError::InvalidTime)?;
        if hour > 23 {
            return Err(TimeError::InvalidTime);
        }
        let mut value = existing;
        match existing.time_representation() {
            TimeRepresentation::TwentyFourHour => value.set_hour(hour),
            TimeRepresentation::TwelveHour => {
                let (hour12, meridiem) = match hour {
                    0 => (12, Meridiem::Am),
                    1..=11 => (hour, Meridiem::Am),
                    12 => (12, Meridiem::Pm),
                    _ => (hour - 12, Meridiem::Pm),
                };
                value.set_hour(hour12);
                value.set_meridiem(meridiem);
            }
        }
        Ok(value)
    }

    /// Returns a copy holding `time`, keeping the clock-halt and mode flags.
    pub(crate) fn with_time(self, time: &NaiveTime) -> Result<Self, TimeError> {
        let mut seconds = self.seconds;
        seconds.set_value(u8::try_from(time.second()).map_err(|_| TimeError::InvalidTime)?);
        let mut minutes = Minutes::default();
        minutes.set_value(u8::try_from(time.minute()).map_err(|_| TimeError::InvalidTime)?);
        let hours = Self::convert_hours(self.hours, time.hour())?;

        let raw = DS1307Time {
            seconds,
            minutes,
            hours,
        };
        debug!("raw={:?}", raw);
        Ok(raw)
    }

    pub(crate) fn into_time(self) -> Result<NaiveTime, TimeError> {
        if !(Self::is_bcd(self.seconds.0)
            && Self::is_bcd(self.minutes.0)
            && Self::is_bcd(self.hours.0))
        {
            return Err(TimeError::InvalidRegister);
        }
        let seconds = u32::from(self.seconds.value());
        let minutes = u32::from(self.minutes.value());
        let hour = u32::from(self.hours.hour());
        let hour = match self.hours.time_representation() {
            TimeRepresentation::TwentyFourHour => hour,
            TimeRepresentation::TwelveHour => match (hour, self.hours.meridiem()) {
                (h, _) if h == 0 || h > 12 => return Err(TimeError::InvalidRegister),
                (12, Meridiem::Am) => 0,
                (12, Meridiem::Pm) => 12,
                (h, Meridiem::Am) => h,
                (h, Meridiem::Pm) => h + 12,
            },
        };
        debug!(
            "raw_hour={:?} h={} m={} s={}",
            self.hours, hour, minutes, seconds
        );

        NaiveTime::from_hms_opt(hour, minutes, seconds).ok_or(TimeError::InvalidRegister)
    }
}

impl From<[u8; 3]> for DS1307Time {
    fn from(data: [u8; 3]) -> Self {
        DS1307Time {
            seconds: Seconds(data[0]),
            minutes: Minutes(data[1]),
            hours: Hours(data[2]),
        }
    }
}

impl From<&DS1307Time> for [u8; 3] {
    fn from(t: &DS1307Time) -> [u8; 3] {
        [t.seconds.0, t.minutes.0, t.hours.0]
    }
}

/// Errors raised while validating or converting a time value.
///
/// All of these are detected before any register is written.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// Hour, minute or second out of range for `set_time`
    InvalidTime,
    /// Hour mode other than 12 or 24
    InvalidMode(u8),
    /// AM/PM flag other than 0 or 1
    InvalidMeridiem(u8),
    /// The registers hold something that is not a valid time of day
    InvalidRegister,
}
