//! A platform-agnostic driver for the DS1307 battery-backed real-time clock.
//!
//! The DS1307 sits on the I2C bus at the fixed address `0x68` and keeps the
//! time of day in three BCD registers. This driver reads and writes those
//! registers through any [`embedded_hal::i2c::I2c`] implementation and keeps
//! no state of its own: the chip is always the source of truth.
//!
//! # Features
//!
//! - Time of day as separate fields or as a chrono `NaiveTime`
//! - 12/24 hour mode and the AM/PM flag
//! - Oscillator start/stop through the clock-halt flag
//! - Optional async API (`async` feature) built on `embedded-hal-async`
//! - Optional logging through `log` or `defmt`
//!
//! # Example
//!
//! ```rust,ignore
//! use ds1307::{DS1307, Oscillator, TimeRepresentation};
//!
//! let mut rtc = DS1307::new(i2c);
//! rtc.init()?;
//! rtc.set_mode(TimeRepresentation::TwentyFourHour)?;
//! rtc.set_time(7, 5, 9)?;
//! if rtc.oscillator()? == Oscillator::Halted {
//!     rtc.toggle_oscillator()?;
//! }
//! let (h, m, s) = (rtc.hours()?, rtc.minutes()?, rtc.seconds()?);
//! ```
//!
//! # Bus access
//!
//! Read-modify-write sequences (`set_time`, `set_am_pm`, `toggle_oscillator`)
//! span several bus transactions. When the bus is shared, the caller has to
//! keep other users off it for the duration of each call.
#![no_std]

#[macro_use]
mod fmt;

#[cfg(feature = "async")]
pub mod asynch;
mod registers;
mod time;

use chrono::NaiveTime;
use embedded_hal::i2c::I2c;
use paste::paste;

pub use registers::*;
pub use time::TimeError;

use crate::time::DS1307Time;

/// Fixed 7-bit I2C address of the DS1307.
pub const DEVICE_ADDRESS: u8 = 0x68;

/// Errors returned by the driver.
#[derive(Debug)]
pub enum DS1307Error<I2CE> {
    /// The bus transaction failed
    I2c(I2CE),
    /// A value was rejected before any register was written, or the
    /// registers did not hold a valid time
    Time(TimeError),
}

impl<I2CE> From<I2CE> for DS1307Error<I2CE> {
    fn from(e: I2CE) -> Self {
        DS1307Error::I2c(e)
    }
}

/// DS1307 Real-Time Clock driver.
pub struct DS1307<I2C: I2c> {
    i2c: I2C,
}

impl<I2C: I2c> DS1307<I2C> {
    /// Creates a new driver instance on the given bus.
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Consumes the driver and hands back the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Checks that the device acknowledges its address.
    ///
    /// Issues a zero-length write to `0x68`. The transport's error (usually
    /// a NoAcknowledge) is returned as-is so the caller can decide whether
    /// to carry on; a DS1307 running from battery may only answer later.
    pub fn init(&mut self) -> Result<(), DS1307Error<I2C::Error>> {
        debug!("DS1307: probing address {}", DEVICE_ADDRESS);
        self.i2c.write(DEVICE_ADDRESS, &[])?;
        Ok(())
    }

    /// Reads one register with a single `write_read`.
    ///
    /// The address byte and the one-byte read are joined by a repeated
    /// start, not a stop followed by a separate read. The DS1307 accepts
    /// either form.
    fn read_register(&mut self, reg: RegAddr) -> Result<u8, DS1307Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[reg as u8], &mut data)?;
        debug!("DS1307: read {:?} = {}", reg, data[0]);
        Ok(data[0])
    }

    fn write_register(&mut self, reg: RegAddr, value: u8) -> Result<(), DS1307Error<I2C::Error>> {
        debug!("DS1307: write {:?} = {}", reg, value);
        self.i2c.write(DEVICE_ADDRESS, &[reg as u8, value])?;
        Ok(())
    }

    /// Sets the time of day from separate fields.
    ///
    /// Rejects `hour >= 13`, `minute >= 60` or `second >= 60` with
    /// [`TimeError::InvalidTime`] without touching the bus. The hour is
    /// stored in the register's own convention, so it has to suit the
    /// current mode: 1-12 in 12-hour mode (with [`set_am_pm`](Self::set_am_pm)
    /// for the half of the day), 0-12 in 24-hour mode. Use
    /// [`set_time_of_day`](Self::set_time_of_day) for the full 24 hour range.
    ///
    /// The mode and AM/PM flags and the clock-halt flag are preserved.
    pub fn set_time(
        &mut self,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<(), DS1307Error<I2C::Error>> {
        DS1307Time::check_time(hour, minute, second).map_err(DS1307Error::Time)?;

        let mut hours = self.hours_register()?;
        hours.set_hour(hour);
        self.set_hours_register(hours)?;

        let mut minutes = Minutes::default();
        minutes.set_value(minute);
        self.set_minutes_register(minutes)?;

        let mut seconds = self.seconds_register()?;
        seconds.set_value(second);
        self.set_seconds_register(seconds)?;
        Ok(())
    }

    /// Reads the time of day in a single burst.
    ///
    /// 12-hour values are converted to a 24-hour `NaiveTime`.
    pub fn time(&mut self) -> Result<NaiveTime, DS1307Error<I2C::Error>> {
        let mut data = [0; 3];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::Seconds as u8], &mut data)?;
        DS1307Time::from(data)
            .into_time()
            .map_err(DS1307Error::Time)
    }

    /// Sets the time of day from a `NaiveTime`, encoded in the device's
    /// current mode.
    ///
    /// Unlike [`set_time`](Self::set_time) this accepts the whole 0-23 hour
    /// range; in 12-hour mode the AM/PM flag follows the hour. The
    /// clock-halt and mode flags are preserved and sub-second precision is
    /// dropped.
    pub fn set_time_of_day(&mut self, time: &NaiveTime) -> Result<(), DS1307Error<I2C::Error>> {
        let mut data = [0; 3];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::Seconds as u8], &mut data)?;
        let raw = DS1307Time::from(data)
            .with_time(time)
            .map_err(DS1307Error::Time)?;
        let data: [u8; 3] = (&raw).into();
        self.i2c.write(
            DEVICE_ADDRESS,
            &[RegAddr::Seconds as u8, data[0], data[1], data[2]],
        )?;
        Ok(())
    }

    /// Seconds (0-59), ignoring the clock-halt flag.
    pub fn seconds(&mut self) -> Result<u8, DS1307Error<I2C::Error>> {
        Ok(self.seconds_register()?.value())
    }

    /// Minutes (0-59).
    pub fn minutes(&mut self) -> Result<u8, DS1307Error<I2C::Error>> {
        Ok(self.minutes_register()?.value())
    }

    /// Hour as stored: 1-12 in 12-hour mode, 0-23 in 24-hour mode.
    pub fn hours(&mut self) -> Result<u8, DS1307Error<I2C::Error>> {
        Ok(self.hours_register()?.hour())
    }

    /// Returns the AM/PM flag.
    ///
    /// The flag is read whatever the mode; in 24-hour mode the same bit is
    /// the twenty-hours digit and the result is meaningless.
    pub fn am_pm(&mut self) -> Result<Meridiem, DS1307Error<I2C::Error>> {
        Ok(self.hours_register()?.meridiem())
    }

    /// Sets or clears the AM/PM flag, leaving the rest of the hours
    /// register as it is.
    pub fn set_am_pm(&mut self, meridiem: Meridiem) -> Result<(), DS1307Error<I2C::Error>> {
        let mut hours = self.hours_register()?;
        hours.set_meridiem(meridiem);
        self.set_hours_register(hours)
    }

    /// Reads the 12/24 hour mode flag.
    pub fn mode(&mut self) -> Result<TimeRepresentation, DS1307Error<I2C::Error>> {
        Ok(self.hours_register()?.time_representation())
    }

    /// Switches between 12- and 24-hour mode.
    ///
    /// This overwrites the whole hours register with just the mode flag:
    /// the stored hour and the AM/PM flag are reset to zero. Set the hour
    /// again after changing mode.
    pub fn set_mode(&mut self, mode: TimeRepresentation) -> Result<(), DS1307Error<I2C::Error>> {
        let mut hours = Hours::default();
        hours.set_time_representation(mode);
        self.set_hours_register(hours)
    }

    /// Reads the clock-halt flag.
    pub fn oscillator(&mut self) -> Result<Oscillator, DS1307Error<I2C::Error>> {
        Ok(self.seconds_register()?.clock_halt())
    }

    /// Starts or halts the oscillator, keeping the stored seconds.
    pub fn set_oscillator(&mut self, state: Oscillator) -> Result<(), DS1307Error<I2C::Error>> {
        let mut seconds = self.seconds_register()?;
        seconds.set_clock_halt(state);
        self.set_seconds_register(seconds)
    }

    /// Inverts the clock-halt flag: starts a halted oscillator and halts a
    /// running one. The stored seconds are kept.
    pub fn toggle_oscillator(&mut self) -> Result<(), DS1307Error<I2C::Error>> {
        let mut seconds = self.seconds_register()?;
        seconds.set_clock_halt(seconds.clock_halt().toggled());
        self.set_seconds_register(seconds)
    }
}

macro_rules! set_and_get_register {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> DS1307<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the raw ", stringify!($typ), " register.")]
                    pub fn $name(&mut self) -> Result<$typ, DS1307Error<I2C::Error>> {
                        Ok(<$typ>::from(self.read_register($regaddr)?))
                    }

                    #[doc = concat!("Writes the raw ", stringify!($typ), " register.")]
                    pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS1307Error<I2C::Error>> {
                        self.write_register($regaddr, value.into())
                    }
                }
            )+
        }
    }
}

set_and_get_register!(
    (seconds_register, RegAddr::Seconds, Seconds),
    (minutes_register, RegAddr::Minutes, Minutes),
    (hours_register, RegAddr::Hours, Hours)
);

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    fn read(reg: RegAddr, value: u8) -> I2cTrans {
        I2cTrans::write_read(DEVICE_ADDRESS, vec![reg as u8], vec![value])
    }

    fn write(reg: RegAddr, value: u8) -> I2cTrans {
        I2cTrans::write(DEVICE_ADDRESS, vec![reg as u8, value])
    }

    #[test]
    fn test_init_acknowledged() {
        let mock = I2cMock::new(&[I2cTrans::write(DEVICE_ADDRESS, vec![])]);
        let mut dev = DS1307::new(mock);
        dev.init().unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_init_not_acknowledged() {
        let mock = I2cMock::new(&[I2cTrans::write(DEVICE_ADDRESS, vec![])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))]);
        let mut dev = DS1307::new(mock);
        let result = dev.init();
        assert!(matches!(
            result,
            Err(DS1307Error::I2c(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address
            )))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_set_time_packs_bcd() {
        let mock = I2cMock::new(&[
            read(RegAddr::Hours, 0x00),
            write(RegAddr::Hours, 0x07),
            write(RegAddr::Minutes, 0x05),
            read(RegAddr::Seconds, 0x00),
            write(RegAddr::Seconds, 0x09),
        ]);
        let mut dev = DS1307::new(mock);
        dev.set_time(7, 5, 9).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_time_preserves_mode_meridiem_and_clock_halt() {
        let mock = I2cMock::new(&[
            // 12h, PM, 3 o'clock
            read(RegAddr::Hours, 0b0110_0011),
            write(RegAddr::Hours, 0b0111_0001),
            write(RegAddr::Minutes, 0x59),
            // Oscillator halted
            read(RegAddr::Seconds, 0b1000_0000),
            write(RegAddr::Seconds, 0b1011_0000),
        ]);
        let mut dev = DS1307::new(mock);
        dev.set_time(11, 59, 30).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_time_24_hour_clears_twenty_hours() {
        let mock = I2cMock::new(&[
            // 24h, 21 o'clock
            read(RegAddr::Hours, 0x21),
            write(RegAddr::Hours, 0x12),
            write(RegAddr::Minutes, 0x00),
            read(RegAddr::Seconds, 0x00),
            write(RegAddr::Seconds, 0x00),
        ]);
        let mut dev = DS1307::new(mock);
        dev.set_time(12, 0, 0).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_time_rejects_out_of_range_without_bus_access() {
        let mock = I2cMock::new(&[]);
        let mut dev = DS1307::new(mock);
        for (h, m, s) in [(13, 0, 0), (0, 60, 0), (0, 0, 60), (255, 255, 255)] {
            assert!(matches!(
                dev.set_time(h, m, s),
                Err(DS1307Error::Time(TimeError::InvalidTime))
            ));
        }
        dev.i2c.done();
    }

    #[test]
    fn test_read_fields() {
        let mock = I2cMock::new(&[
            read(RegAddr::Seconds, 0b1101_1001),
            read(RegAddr::Minutes, 0x37),
            read(RegAddr::Hours, 0x23),
            read(RegAddr::Hours, 0b0111_0010),
        ]);
        let mut dev = DS1307::new(mock);
        assert_eq!(dev.seconds().unwrap(), 59);
        assert_eq!(dev.minutes().unwrap(), 37);
        assert_eq!(dev.hours().unwrap(), 23);
        // 12h mode: the PM bit is not part of the hour
        assert_eq!(dev.hours().unwrap(), 12);
        dev.i2c.done();
    }

    #[test]
    fn test_toggle_oscillator() {
        let mock = I2cMock::new(&[
            read(RegAddr::Seconds, 0x42),
            write(RegAddr::Seconds, 0xC2),
            read(RegAddr::Seconds, 0xC2),
            write(RegAddr::Seconds, 0x42),
        ]);
        let mut dev = DS1307::new(mock);
        dev.toggle_oscillator().unwrap();
        dev.toggle_oscillator().unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_oscillator_state() {
        let mock = I2cMock::new(&[
            read(RegAddr::Seconds, 0x80),
            read(RegAddr::Seconds, 0x80 | 0x17),
            write(RegAddr::Seconds, 0x17),
        ]);
        let mut dev = DS1307::new(mock);
        assert_eq!(dev.oscillator().unwrap(), Oscillator::Halted);
        dev.set_oscillator(Oscillator::Running).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_mode_overwrites_hours_register() {
        let mock = I2cMock::new(&[
            write(RegAddr::Hours, 0b0100_0000),
            read(RegAddr::Hours, 0b0100_0000),
            write(RegAddr::Hours, 0b0000_0000),
            read(RegAddr::Hours, 0b0000_0000),
        ]);
        let mut dev = DS1307::new(mock);
        dev.set_mode(TimeRepresentation::TwelveHour).unwrap();
        assert_eq!(dev.mode().unwrap(), TimeRepresentation::TwelveHour);
        dev.set_mode(TimeRepresentation::TwentyFourHour).unwrap();
        assert_eq!(dev.mode().unwrap().hours(), 24);
        dev.i2c.done();
    }

    #[test]
    fn test_am_pm_read_modify_write() {
        let mock = I2cMock::new(&[
            // 12h, AM, 10 o'clock
            read(RegAddr::Hours, 0b0101_0000),
            write(RegAddr::Hours, 0b0111_0000),
            read(RegAddr::Hours, 0b0111_0000),
            read(RegAddr::Hours, 0b0111_0000),
            write(RegAddr::Hours, 0b0101_0000),
        ]);
        let mut dev = DS1307::new(mock);
        dev.set_am_pm(Meridiem::Pm).unwrap();
        assert_eq!(dev.am_pm().unwrap(), Meridiem::Pm);
        dev.set_am_pm(Meridiem::Am).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_time_burst_read() {
        let mock = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0x30, 0x45, 0b0110_1001],
        )]);
        let mut dev = DS1307::new(mock);
        let time = dev.time().unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(21, 45, 30).unwrap());
        dev.i2c.done();
    }

    #[test]
    fn test_time_invalid_registers() {
        let mock = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0x7F, 0x00, 0x00],
        )]);
        let mut dev = DS1307::new(mock);
        assert!(matches!(
            dev.time(),
            Err(DS1307Error::Time(TimeError::InvalidRegister))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_set_time_of_day_burst_write() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Seconds as u8],
                vec![0x80, 0x00, 0b0100_0001],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::Seconds as u8, 0x80 | 0x05, 0x30, 0b0110_0010],
            ),
        ]);
        let mut dev = DS1307::new(mock);
        let time = NaiveTime::from_hms_opt(14, 30, 5).unwrap();
        dev.set_time_of_day(&time).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_bus_error_propagates() {
        let mock = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Hours as u8],
            vec![0],
        )
        .with_error(ErrorKind::Bus)]);
        let mut dev = DS1307::new(mock);
        assert!(matches!(
            dev.set_time(1, 2, 3),
            Err(DS1307Error::I2c(ErrorKind::Bus))
        ));
        dev.i2c.done();
    }
}
