//! Settings applied once at initialization time.

use crate::command::Command;
use crate::error::Error;
use crate::interface::Transport;

/// A configuration for the panel. Builder methods offer a declarative way to either send a
/// setting at init time, or to leave it at the chip's power-on default. The init table itself is
/// fixed and is always written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub(crate) luminance_cmd: Option<Command>,
    pub(crate) orbit_cmd: Option<Command>,
    pub(crate) probe_bus: bool,
}

impl Config {
    /// Create a configuration which leaves every setting at its power-on default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend this `Config` to set the panel luminance at init time. See
    /// `Command::SetLuminance`.
    pub fn luminance(self, nitsx10: u8) -> Self {
        Self {
            luminance_cmd: Some(Command::SetLuminance(nitsx10)),
            ..self
        }
    }

    /// Extend this `Config` to set the image orbit offset at init time. See
    /// `Command::SetOrbit`.
    pub fn orbit(self, horizontal: i8, vertical: i8) -> Self {
        Self {
            orbit_cmd: Some(Command::SetOrbit(horizontal, vertical)),
            ..self
        }
    }

    /// Extend this `Config` to run the read-back probe after reset, before the init table is
    /// written. Only useful while bringing up new hardware.
    pub fn probe_bus(self, enabled: bool) -> Self {
        Self {
            probe_bus: enabled,
            ..self
        }
    }

    /// Transmit the optional settings encoded in `self`.
    pub(crate) fn send<T>(&self, iface: &mut T) -> Result<(), Error<T::Error>>
    where
        T: Transport,
    {
        self.luminance_cmd.map_or(Ok(()), |c| c.send(iface))?;
        self.orbit_cmd.map_or(Ok(()), |c| c.send(iface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::TestSpyInterface;

    #[test]
    fn defaults_send_nothing() {
        let spy = TestSpyInterface::new();
        let mut iface = spy.split();
        Config::new().send(&mut iface).unwrap();
        assert!(spy.events().is_empty());
    }

    #[test]
    fn luminance_then_orbit() {
        let spy = TestSpyInterface::new();
        let mut iface = spy.split();
        Config::new()
            .orbit(2, -3)
            .luminance(20)
            .send(&mut iface)
            .unwrap();
        assert_eq!(
            spy.transactions(),
            vec![
                vec![0x11, 0x07],
                vec![0x13, 20],
                vec![0x02, 0x02],
                vec![0x03, 0xFD]
            ]
        );
    }
}
