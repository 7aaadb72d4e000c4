//! The physical transports. The ECX337A control bus is a plain synchronous serial link with an
//! active-low chip-select, plus an active-low reset line (XCLR). It can be driven either by
//! toggling GPIOs (`bitbang`) or by a hardware SPI peripheral (`spi`); everything above this
//! module is written against the `Transport` trait and does not care which.

use hal::digital::v2::PinState;

/// The control lines a transport may be asked to drive directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// Serial data input of the chip (SI).
    Data,
    /// Serial clock (SCLK).
    Clock,
    /// Active-low reset (XCLR).
    Reset,
    /// Active-low chip-select (XCS).
    ChipSelect,
    /// Board-level power control for the panel supplies, active high. Optional.
    PowerControl,
}

/// Timing profile of a transport, in microseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Wait between asserting chip-select and the first clock edge, and between the last clock
    /// edge and releasing chip-select.
    pub settle_us: u32,
    /// Minimum idle time after releasing chip-select before the next transaction, so that the
    /// chip does not treat consecutive transactions as one burst.
    pub idle_us: u32,
}

/// Order in which the bits of each byte are shifted onto the data line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

pub trait Transport {
    type Error;

    /// Drive `line` to `level`. Lines the transport does not own are ignored.
    fn set_line(&mut self, line: Line, level: PinState) -> Result<(), Self::Error>;

    /// Busy-wait for `us` microseconds.
    fn delay_us(&mut self, us: u32);

    /// Busy-wait for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Shift one byte out to the chip, returning the byte clocked back in if the transport has a
    /// receive line.
    fn transfer_byte(&mut self, byte: u8) -> Result<Option<u8>, Self::Error>;

    /// The settle and idle windows this transport needs around a transaction.
    fn timing(&self) -> Timing;

    /// Whether a separate power-control line is wired.
    fn has_power_control(&self) -> bool;
}

pub mod bitbang {
    //! Software-timed transport: data and clock are ordinary GPIO outputs toggled with
    //! microsecond delays between edges. The chip samples SI on the rising edge of SCLK.

    use hal::blocking::delay::{DelayMs, DelayUs};
    use hal::digital::v2::{OutputPin, PinState};

    use super::{BitOrder, Line, Timing, Transport};

    /// Settle and idle windows for the bit-banged bus.
    pub const TIMING: Timing = Timing {
        settle_us: 200,
        idle_us: 200,
    };

    /// Half of one clock period: data setup before the rising edge, and high time after it.
    pub const HALF_CLOCK_US: u32 = 5;

    pub struct BitBangInterface<SI, CLK, XCLR, XCS, PWR, D> {
        /// Serial data output to the chip's SI pin.
        si: SI,
        /// Serial clock output to the chip's SCLK pin.
        clk: CLK,
        /// Reset output to the chip's XCLR pin.
        xclr: XCLR,
        /// Chip-select output to the chip's XCS pin.
        xcs: XCS,
        /// Optional board power-control output (boost converter and LVDS transmitter enable).
        pwrctl: Option<PWR>,
        delay: D,
        bit_order: BitOrder,
    }

    impl<SI, CLK, XCLR, XCS, PWR, D, E> BitBangInterface<SI, CLK, XCLR, XCS, PWR, D>
    where
        SI: OutputPin<Error = E>,
        CLK: OutputPin<Error = E>,
        XCLR: OutputPin<Error = E>,
        XCS: OutputPin<Error = E>,
        PWR: OutputPin<Error = E>,
        D: DelayUs<u32> + DelayMs<u32>,
    {
        /// Create a new bit-banged interface. Bytes are shifted most significant bit first; use
        /// `bit_order` to change that.
        pub fn new(si: SI, clk: CLK, xclr: XCLR, xcs: XCS, pwrctl: Option<PWR>, delay: D) -> Self {
            Self {
                si,
                clk,
                xclr,
                xcs,
                pwrctl,
                delay,
                bit_order: BitOrder::MsbFirst,
            }
        }

        /// Change the order in which bits are shifted out.
        pub fn bit_order(self, bit_order: BitOrder) -> Self {
            Self { bit_order, ..self }
        }

        /// Consume the interface and return its pins and delay provider.
        pub fn release(self) -> (SI, CLK, XCLR, XCS, Option<PWR>, D) {
            (self.si, self.clk, self.xclr, self.xcs, self.pwrctl, self.delay)
        }

        fn shift_bit(&mut self, bit: bool) -> Result<(), E> {
            self.si.set_state(PinState::from(bit))?;
            self.delay.delay_us(HALF_CLOCK_US);
            self.clk.set_high()?;
            self.delay.delay_us(HALF_CLOCK_US);
            self.clk.set_low()
        }
    }

    impl<SI, CLK, XCLR, XCS, PWR, D, E> Transport for BitBangInterface<SI, CLK, XCLR, XCS, PWR, D>
    where
        SI: OutputPin<Error = E>,
        CLK: OutputPin<Error = E>,
        XCLR: OutputPin<Error = E>,
        XCS: OutputPin<Error = E>,
        PWR: OutputPin<Error = E>,
        D: DelayUs<u32> + DelayMs<u32>,
    {
        type Error = E;

        fn set_line(&mut self, line: Line, level: PinState) -> Result<(), E> {
            match line {
                Line::Data => self.si.set_state(level),
                Line::Clock => self.clk.set_state(level),
                Line::Reset => self.xclr.set_state(level),
                Line::ChipSelect => self.xcs.set_state(level),
                Line::PowerControl => match self.pwrctl {
                    Some(ref mut pwr) => pwr.set_state(level),
                    None => Ok(()),
                },
            }
        }

        fn delay_us(&mut self, us: u32) {
            self.delay.delay_us(us);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.delay.delay_ms(ms);
        }

        fn transfer_byte(&mut self, byte: u8) -> Result<Option<u8>, E> {
            for i in 0..8 {
                let bit = match self.bit_order {
                    BitOrder::MsbFirst => byte & (0x80 >> i) != 0,
                    BitOrder::LsbFirst => byte & (0x01 << i) != 0,
                };
                self.shift_bit(bit)?;
            }
            // SO is not wired on this transport.
            Ok(None)
        }

        fn timing(&self) -> Timing {
            TIMING
        }

        fn has_power_control(&self) -> bool {
            self.pwrctl.is_some()
        }
    }
}

pub mod spi {
    //! Hardware-assisted transport: the SPI peripheral generates clock and data, and the driver
    //! only manages chip-select, reset and power control. The peripheral must be configured with
    //! `SPI_MODE`, `SPI_FREQUENCY_HZ` and LSB-first bit order before it is handed over; the
    //! `embedded-hal` SPI traits cannot express bit order, so that part is up to the HAL.

    use hal::blocking::delay::{DelayMs, DelayUs};
    use hal::digital::v2::{OutputPin, PinState};
    use hal::spi::{FullDuplex, Mode, MODE_3};

    use super::{BitOrder, Line, Timing, Transport};
    use crate::error::BusFault;

    /// Clock idles high, data changes on the falling edge and is sampled on the rising edge.
    pub const SPI_MODE: Mode = MODE_3;

    /// Control bus clock rate.
    pub const SPI_FREQUENCY_HZ: u32 = 100_000;

    /// Bit order the peripheral must be configured for.
    pub const SPI_BIT_ORDER: BitOrder = BitOrder::LsbFirst;

    /// Settle and idle windows when the peripheral gates the clock itself.
    pub const TIMING: Timing = Timing {
        settle_us: 1,
        idle_us: 1000,
    };

    pub struct SpiInterface<SPI, XCLR, XCS, PWR, D> {
        /// The SPI master connected to SI/SO/SCLK of the ECX337A.
        spi: SPI,
        /// Reset output to the chip's XCLR pin.
        xclr: XCLR,
        /// Chip-select output to the chip's XCS pin.
        xcs: XCS,
        /// Optional board power-control output.
        pwrctl: Option<PWR>,
        delay: D,
    }

    impl<SPI, XCLR, XCS, PWR, D, SpiE, PinE> SpiInterface<SPI, XCLR, XCS, PWR, D>
    where
        SPI: FullDuplex<u8, Error = SpiE>,
        XCLR: OutputPin<Error = PinE>,
        XCS: OutputPin<Error = PinE>,
        PWR: OutputPin<Error = PinE>,
        D: DelayUs<u32> + DelayMs<u32>,
    {
        /// Create a new SPI interface. `spi` must already be configured as described in the
        /// module documentation.
        pub fn new(spi: SPI, xclr: XCLR, xcs: XCS, pwrctl: Option<PWR>, delay: D) -> Self {
            Self {
                spi,
                xclr,
                xcs,
                pwrctl,
                delay,
            }
        }

        /// Consume the interface and return the peripheral, pins and delay provider.
        pub fn release(self) -> (SPI, XCLR, XCS, Option<PWR>, D) {
            (self.spi, self.xclr, self.xcs, self.pwrctl, self.delay)
        }
    }

    impl<SPI, XCLR, XCS, PWR, D, SpiE, PinE> Transport for SpiInterface<SPI, XCLR, XCS, PWR, D>
    where
        SPI: FullDuplex<u8, Error = SpiE>,
        XCLR: OutputPin<Error = PinE>,
        XCS: OutputPin<Error = PinE>,
        PWR: OutputPin<Error = PinE>,
        D: DelayUs<u32> + DelayMs<u32>,
    {
        type Error = BusFault<SpiE, PinE>;

        fn set_line(&mut self, line: Line, level: PinState) -> Result<(), Self::Error> {
            let result = match line {
                // Owned by the peripheral.
                Line::Data | Line::Clock => Ok(()),
                Line::Reset => self.xclr.set_state(level),
                Line::ChipSelect => self.xcs.set_state(level),
                Line::PowerControl => match self.pwrctl {
                    Some(ref mut pwr) => pwr.set_state(level),
                    None => Ok(()),
                },
            };
            result.map_err(BusFault::Pin)
        }

        fn delay_us(&mut self, us: u32) {
            self.delay.delay_us(us);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.delay.delay_ms(ms);
        }

        fn transfer_byte(&mut self, byte: u8) -> Result<Option<u8>, Self::Error> {
            nb::block!(self.spi.send(byte)).map_err(BusFault::Spi)?;
            let received = nb::block!(self.spi.read()).map_err(BusFault::Spi)?;
            Ok(Some(received))
        }

        fn timing(&self) -> Timing {
            TIMING
        }

        fn has_power_control(&self) -> bool {
            self.pwrctl.is_some()
        }
    }
}
