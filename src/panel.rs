//! The main API to the panel driver. It owns the transport, runs the power-up sequence, and
//! switches the panel between powersave and normal operation.

use hal::digital::v2::PinState;

use crate::command::consts::*;
use crate::command::*;
use crate::config::Config;
use crate::error::Error;
use crate::frame;
use crate::interface::{Line, Transport};

/// Margin around reset assertion and board power switching. Not a chip requirement.
pub const SETTLE_MS: u32 = 16;

/// Minimum time from releasing XCLR until the chip accepts commands (in powersave mode).
pub const RESET_TO_READY_MS: u32 = 16;

/// Where the driver believes the chip is. The chip has no status readout, so this is only ever
/// what the driver last told it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// `initialize` has not run.
    Uninitialized,
    /// XCLR has been pulsed but the init table has not been written.
    Reset,
    /// Registers are programmed and the panel is in powersave, dark.
    Powersave,
    /// The panel is lit.
    Active,
}

/// The panel parameters which persist across power transitions until changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Luminance in units of 10 cd/m², already clamped.
    pub luminance: u8,
    /// Horizontal and vertical orbit offset in pixels, already clamped.
    pub orbit: (i8, i8),
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            luminance: LUMINANCE_DEFAULT,
            orbit: (0, 0),
        }
    }
}

/// A driver for an ECX337A microdisplay.
pub struct Panel<T>
where
    T: Transport,
{
    iface: T,
    state: PowerState,
    settings: Settings,
}

impl<T> Panel<T>
where
    T: Transport,
{
    /// Construct a new panel driver on `iface`. Nothing is sent until `initialize`.
    pub fn new(iface: T) -> Self {
        Panel {
            iface,
            state: PowerState::Uninitialized,
            settings: Settings::default(),
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Give back the transport.
    pub fn release(self) -> T {
        self.iface
    }

    fn set_line(&mut self, line: Line, level: PinState) -> Result<(), Error<T::Error>> {
        self.iface.set_line(line, level).map_err(Error::Transport)
    }

    /// Reset the chip and write the init table, followed by any settings in `config`.
    ///
    /// On return the panel is programmed but still in powersave; call `panel_on` to light it.
    /// Setting luminance or orbit between `initialize` and `panel_on` is expected and takes
    /// effect once the panel is lit.
    /// The steps here are strictly ordered: the chip's behavior is undefined if reset is
    /// released early or if anything is written before it is ready.
    pub fn initialize(&mut self, config: Config) -> Result<(), Error<T::Error>> {
        debug!("initializing panel");
        self.set_line(Line::Data, PinState::Low)?;
        self.set_line(Line::Clock, PinState::Low)?;
        self.set_line(Line::Reset, PinState::Low)?;
        self.set_line(Line::ChipSelect, PinState::High)?;
        self.set_line(Line::PowerControl, PinState::Low)?;
        self.iface.delay_ms(SETTLE_MS);

        self.set_line(Line::Reset, PinState::Low)?;
        self.state = PowerState::Reset;
        self.settings = Settings::default();
        self.iface.delay_ms(SETTLE_MS);
        self.set_line(Line::Reset, PinState::High)?;
        self.iface.delay_ms(RESET_TO_READY_MS);

        if config.probe_bus {
            self.probe_bus()?;
        }

        frame::burst_write(&mut self.iface, &INIT_TABLE)?;
        self.state = PowerState::Powersave;

        config.send(&mut self.iface)?;
        if let Some(Command::SetLuminance(nitsx10)) = config.luminance_cmd {
            self.settings.luminance = clamp_luminance(nitsx10);
        }
        if let Some(Command::SetOrbit(h, v)) = config.orbit_cmd {
            self.settings.orbit = (clamp_orbit(h), clamp_orbit(v));
        }
        debug!("panel initialized, in powersave");
        Ok(())
    }

    /// Leave powersave and light the panel. If board power control is wired it is switched on
    /// first.
    pub fn panel_on(&mut self) -> Result<(), Error<T::Error>> {
        if self.iface.has_power_control() {
            self.set_line(Line::PowerControl, PinState::High)?;
            self.iface.delay_ms(SETTLE_MS);
        }
        // Each word is its own transaction, so the chip gets at least the transport's idle
        // window between mode select and confirm.
        Command::PanelOn.send(&mut self.iface)?;
        debug!("panel on ({} -> Active)", self.state);
        self.state = PowerState::Active;
        Ok(())
    }

    /// Enter powersave. If board power control is wired it is switched off afterwards.
    pub fn panel_off(&mut self) -> Result<(), Error<T::Error>> {
        Command::PanelOff.send(&mut self.iface)?;
        self.state = PowerState::Powersave;
        if self.iface.has_power_control() {
            self.iface.delay_ms(SETTLE_MS);
            self.set_line(Line::PowerControl, PinState::Low)?;
        }
        debug!("panel off");
        Ok(())
    }

    /// Set the luminance in units of 10 cd/m². Values outside 5-100 are clamped.
    pub fn set_luminance(&mut self, nitsx10: u8) -> Result<(), Error<T::Error>> {
        self.warn_if_uninitialized();
        Command::SetLuminance(nitsx10).send(&mut self.iface)?;
        self.settings.luminance = clamp_luminance(nitsx10);
        Ok(())
    }

    /// Set the image orbit offset in pixels. Each axis is clamped to -10..=10.
    pub fn set_orbit(&mut self, horizontal: i8, vertical: i8) -> Result<(), Error<T::Error>> {
        self.warn_if_uninitialized();
        Command::SetOrbit(horizontal, vertical).send(&mut self.iface)?;
        self.settings.orbit = (clamp_orbit(horizontal), clamp_orbit(vertical));
        Ok(())
    }

    /// Run the read-back probe and return what the chip answered, if the transport can receive.
    ///
    /// A healthy part answers `DEVICE_SIGNATURE`. A different answer is logged but is not an
    /// error, since the probe is only a bring-up aid.
    pub fn probe_bus(&mut self) -> Result<Option<u8>, Error<T::Error>> {
        let mut answer = None;
        for (i, &word) in READBACK_PROBE_SEQUENCE.iter().enumerate() {
            let received = frame::write_register(&mut self.iface, word)?;
            if i == READBACK_TRIGGER_INDEX {
                answer = received;
            }
        }
        match answer {
            Some(DEVICE_SIGNATURE) => debug!("bus probe ok"),
            Some(other) => warn!("bus probe read {=u8:#x}", other),
            None => debug!("bus probe sent, transport cannot read back"),
        }
        Ok(answer)
    }

    /// Settings written before the init table are overwritten by it.
    fn warn_if_uninitialized(&self) {
        match self.state {
            PowerState::Uninitialized | PowerState::Reset => {
                warn!("writing panel settings while {}", self.state)
            }
            PowerState::Powersave | PowerState::Active => {}
        }
    }
}
