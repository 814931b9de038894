//! Async implementation of the DS1307 driver.
//!
//! This module provides an async interface to the DS1307 RTC device using
//! `embedded-hal-async` traits. It is only available when the `async` feature
//! is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use ds1307::asynch::DS1307;
//!
//! // Initialize device
//! let mut rtc = DS1307::new(i2c);
//! rtc.init().await?;
//!
//! // Get current time asynchronously
//! let time = rtc.time().await?;
//! ```

use chrono::NaiveTime;
use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::time::DS1307Time;
use crate::{
    DS1307Error, Hours, Meridiem, Minutes, Oscillator, RegAddr, Seconds, TimeRepresentation,
    DEVICE_ADDRESS,
};

/// DS1307 Real-Time Clock async driver.
///
/// This struct provides the async interface to the DS1307 RTC device.
/// Semantics match the blocking [`crate::DS1307`] method for method.
pub struct DS1307<I2C: I2c> {
    i2c: I2C,
}

impl<I2C: I2c> DS1307<I2C> {
    /// Creates a new DS1307 async driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Consumes the driver and hands back the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Checks that the device acknowledges its address.
    ///
    /// # Returns
    /// * `Ok(())` if the device answered
    /// * `Err(DS1307Error::I2c)` with the transport error otherwise
    pub async fn init(&mut self) -> Result<(), DS1307Error<I2C::Error>> {
        debug!("DS1307: probing address {}", DEVICE_ADDRESS);
        self.i2c.write(DEVICE_ADDRESS, &[]).await?;
        Ok(())
    }

    /// Reads one register with a single `write_read`: a repeated start
    /// between the address write and the read, as in the blocking driver.
    async fn read_register(&mut self, reg: RegAddr) -> Result<u8, DS1307Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[reg as u8], &mut data)
            .await?;
        debug!("DS1307: read {:?} = {}", reg, data[0]);
        Ok(data[0])
    }

    async fn write_register(
        &mut self,
        reg: RegAddr,
        value: u8,
    ) -> Result<(), DS1307Error<I2C::Error>> {
        debug!("DS1307: write {:?} = {}", reg, value);
        self.i2c
            .write(DEVICE_ADDRESS, &[reg as u8, value])
            .await?;
        Ok(())
    }

    /// Sets the time of day from separate fields.
    ///
    /// # Arguments
    /// * `hour` - 0-12, in the convention of the current mode
    /// * `minute` - 0-59
    /// * `second` - 0-59
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS1307Error::Time)` for out-of-range values, before any bus access
    /// * `Err(DS1307Error::I2c)` on bus error
    pub async fn set_time(
        &mut self,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<(), DS1307Error<I2C::Error>> {
        DS1307Time::check_time(hour, minute, second).map_err(DS1307Error::Time)?;

        let mut hours = self.hours_register().await?;
        hours.set_hour(hour);
        self.set_hours_register(hours).await?;

        let mut minutes = Minutes::default();
        minutes.set_value(minute);
        self.set_minutes_register(minutes).await?;

        let mut seconds = self.seconds_register().await?;
        seconds.set_value(second);
        self.set_seconds_register(seconds).await?;
        Ok(())
    }

    /// Reads the time of day in a single burst.
    ///
    /// # Returns
    /// * `Ok(NaiveTime)` - The current time of day, 12-hour values converted
    /// * `Err(DS1307Error)` on error
    pub async fn time(&mut self) -> Result<NaiveTime, DS1307Error<I2C::Error>> {
        let mut data = [0; 3];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::Seconds as u8], &mut data)
            .await?;
        DS1307Time::from(data)
            .into_time()
            .map_err(DS1307Error::Time)
    }

    /// Sets the time of day from a `NaiveTime`, encoded in the device's
    /// current mode.
    ///
    /// # Arguments
    /// * `time` - The time of day to set
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS1307Error)` on error
    pub async fn set_time_of_day(
        &mut self,
        time: &NaiveTime,
    ) -> Result<(), DS1307Error<I2C::Error>> {
        let mut data = [0; 3];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::Seconds as u8], &mut data)
            .await?;
        let raw = DS1307Time::from(data)
            .with_time(time)
            .map_err(DS1307Error::Time)?;
        let data: [u8; 3] = (&raw).into();
        self.i2c
            .write(
                DEVICE_ADDRESS,
                &[RegAddr::Seconds as u8, data[0], data[1], data[2]],
            )
            .await?;
        Ok(())
    }

    /// Seconds (0-59), ignoring the clock-halt flag.
    pub async fn seconds(&mut self) -> Result<u8, DS1307Error<I2C::Error>> {
        Ok(self.seconds_register().await?.value())
    }

    /// Minutes (0-59).
    pub async fn minutes(&mut self) -> Result<u8, DS1307Error<I2C::Error>> {
        Ok(self.minutes_register().await?.value())
    }

    /// Hour as stored: 1-12 in 12-hour mode, 0-23 in 24-hour mode.
    pub async fn hours(&mut self) -> Result<u8, DS1307Error<I2C::Error>> {
        Ok(self.hours_register().await?.hour())
    }

    /// AM/PM flag, read whatever the mode.
    pub async fn am_pm(&mut self) -> Result<Meridiem, DS1307Error<I2C::Error>> {
        Ok(self.hours_register().await?.meridiem())
    }

    /// Sets or clears the AM/PM flag, leaving the rest of the hours
    /// register as it is.
    pub async fn set_am_pm(&mut self, meridiem: Meridiem) -> Result<(), DS1307Error<I2C::Error>> {
        let mut hours = self.hours_register().await?;
        hours.set_meridiem(meridiem);
        self.set_hours_register(hours).await
    }

    /// Reads the 12/24 hour mode flag.
    pub async fn mode(&mut self) -> Result<TimeRepresentation, DS1307Error<I2C::Error>> {
        Ok(self.hours_register().await?.time_representation())
    }

    /// Switches between 12- and 24-hour mode, resetting the stored hour and
    /// the AM/PM flag to zero.
    pub async fn set_mode(
        &mut self,
        mode: TimeRepresentation,
    ) -> Result<(), DS1307Error<I2C::Error>> {
        let mut hours = Hours::default();
        hours.set_time_representation(mode);
        self.set_hours_register(hours).await
    }

    /// Reads the clock-halt flag.
    pub async fn oscillator(&mut self) -> Result<Oscillator, DS1307Error<I2C::Error>> {
        Ok(self.seconds_register().await?.clock_halt())
    }

    /// Starts or halts the oscillator, keeping the stored seconds.
    pub async fn set_oscillator(
        &mut self,
        state: Oscillator,
    ) -> Result<(), DS1307Error<I2C::Error>> {
        let mut seconds = self.seconds_register().await?;
        seconds.set_clock_halt(state);
        self.set_seconds_register(seconds).await
    }

    /// Inverts the clock-halt flag, keeping the stored seconds.
    pub async fn toggle_oscillator(&mut self) -> Result<(), DS1307Error<I2C::Error>> {
        let mut seconds = self.seconds_register().await?;
        seconds.set_clock_halt(seconds.clock_halt().toggled());
        self.set_seconds_register(seconds).await
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> DS1307<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the raw ", stringify!($typ), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, DS1307Error<I2C::Error>> {
                        Ok(<$typ>::from(self.read_register($regaddr).await?))
                    }

                    #[doc = concat!("Writes the raw ", stringify!($typ), " register.")]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS1307Error<I2C::Error>> {
                        self.write_register($regaddr, value.into()).await
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (seconds_register, RegAddr::Seconds, Seconds),
    (minutes_register, RegAddr::Minutes, Minutes),
    (hours_register, RegAddr::Hours, Hours)
);
