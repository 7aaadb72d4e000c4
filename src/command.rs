//! The register set of the ECX337A that this driver programs, and the encoding of semantic
//! requests into register writes.
//!
//! Every register write is a 16-bit word with the register address in the high byte and the
//! value in the low byte, sent high byte first. The only exception is the init table, which is
//! written as one burst starting at address 0x01.

use crate::error::Error;
use crate::frame;
use crate::interface::Transport;

pub mod consts {
    //! Constant register tables and value limits.

    use super::RegisterWord;

    /// Power-on register settings, written as a single burst. The first byte is the start
    /// address; each following byte goes to the next address.
    #[cfg_attr(rustfmt, rustfmt_skip)]
    pub const INIT_TABLE: [u8; 8] = [
        0x01, // start at address 0x01
        0x02, // T_SLOPE, YCB_P, CALSEL default; LVDS_MAP VESA; MCLKPOL negative
        0x00, // ORBIT_H centered
        0x80, // ORBIT_V centered
        0x03, // PN_POL A=P/B=N; PINSWP, PRTSWP default; IFSW 4 lanes x2
        0x08, // FORMAT_SEL_DATA 4:4:4; DITHEREN on
        0x00, // VD_POL, HD_POL negative; OTP regeneration off
        0x10, // VD_FILTER, HD_FILTER 1 MCLK; C_SLOPE prompt transition
    ];

    /// Mode select, then confirm normal operation (powersave off).
    pub const PANEL_ON_SEQUENCE: [RegisterWord; 2] =
        [RegisterWord::new(0x00, 0x4D), RegisterWord::new(0x00, 0x4F)];

    /// Mode select, then confirm powersave.
    pub const PANEL_OFF_SEQUENCE: [RegisterWord; 2] =
        [RegisterWord::new(0x00, 0x4D), RegisterWord::new(0x00, 0x4C)];

    /// Bus check: enable read-back, select register 0x7F, trigger the read, disable read-back.
    pub const READBACK_PROBE_SEQUENCE: [RegisterWord; 4] = [
        RegisterWord::new(0x80, 0x01),
        RegisterWord::new(0x81, 0x7F),
        RegisterWord::new(0x81, 0x00),
        RegisterWord::new(0x80, 0x00),
    ];

    /// Index in `READBACK_PROBE_SEQUENCE` of the word during which the chip answers.
    pub const READBACK_TRIGGER_INDEX: usize = 2;

    /// Contents of register 0x7F on a healthy part.
    pub const DEVICE_SIGNATURE: u8 = 0x56;

    /// L_AT_CALEN, L_SEAMLESSEN and WB_CALEN all set.
    pub const LUMINANCE_CALIBRATION: RegisterWord = RegisterWord::new(0x11, 0x07);
    pub const LUMINANCE_ADDR: u8 = 0x13;
    pub const ORBIT_H_ADDR: u8 = 0x02;
    pub const ORBIT_V_ADDR: u8 = 0x03;
    /// Fixed tag bit of the ORBIT_V register.
    pub const ORBIT_V_TAG: u8 = 0x80;

    pub const LUMINANCE_MIN: u8 = 5;
    pub const LUMINANCE_MAX: u8 = 100;
    /// Power-on luminance, 150 cd/m².
    pub const LUMINANCE_DEFAULT: u8 = 15;
    pub const ORBIT_MAX: i8 = 10;
    pub const ORBIT_MIN: i8 = -ORBIT_MAX;
}

use self::consts::*;

/// A single register write: address in the high byte, value in the low byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterWord(u16);

impl RegisterWord {
    pub const fn new(address: u8, value: u8) -> Self {
        RegisterWord((address as u16) << 8 | value as u16)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn address(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn value(self) -> u8 {
        self.0 as u8
    }

    /// The two bytes in wire order.
    pub const fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

/// Clamp a requested luminance (in units of 10 cd/m²) into the range the chip accepts.
pub fn clamp_luminance(nitsx10: u8) -> u8 {
    nitsx10.clamp(LUMINANCE_MIN, LUMINANCE_MAX)
}

/// Clamp one axis of a requested orbit offset (in pixels) into the available orbit space.
pub fn clamp_orbit(offset: i8) -> i8 {
    offset.clamp(ORBIT_MIN, ORBIT_MAX)
}

/// Encode a luminance request. Values outside 5..=100 are clamped.
pub fn encode_luminance(nitsx10: u8) -> [RegisterWord; 2] {
    [
        LUMINANCE_CALIBRATION,
        RegisterWord::new(LUMINANCE_ADDR, clamp_luminance(nitsx10)),
    ]
}

/// Encode an orbit request. Each axis is clamped to -10..=10 independently and written as its
/// two's complement byte; the vertical register additionally carries its fixed tag bit.
pub fn encode_orbit(horizontal: i8, vertical: i8) -> [RegisterWord; 2] {
    let h = clamp_orbit(horizontal) as u8;
    let v = clamp_orbit(vertical) as u8;
    [
        RegisterWord::new(ORBIT_H_ADDR, h),
        RegisterWord::new(ORBIT_V_ADDR, ORBIT_V_TAG | v),
    ]
}

/// The register-level commands this driver issues after the init burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Set the panel luminance in units of 10 cd/m². Clamped to 5-100.
    SetLuminance(u8),
    /// Set the horizontal and vertical image orbit offset in pixels. Each clamped to -10..=10.
    SetOrbit(i8, i8),
    /// Leave the powersave modes and light the panel.
    PanelOn,
    /// Enter the powersave modes.
    PanelOff,
    /// Read register 0x7F back to check that the bus works.
    ReadbackProbe,
}

impl Command {
    /// Copy the register words of this command into `buf`, returning the used prefix.
    pub fn words(self, buf: &mut [RegisterWord; 4]) -> &[RegisterWord] {
        fn fill(buf: &mut [RegisterWord; 4], words: &[RegisterWord]) -> usize {
            buf[..words.len()].copy_from_slice(words);
            words.len()
        }

        let len = match self {
            Command::SetLuminance(nitsx10) => fill(buf, &encode_luminance(nitsx10)),
            Command::SetOrbit(h, v) => fill(buf, &encode_orbit(h, v)),
            Command::PanelOn => fill(buf, &PANEL_ON_SEQUENCE),
            Command::PanelOff => fill(buf, &PANEL_OFF_SEQUENCE),
            Command::ReadbackProbe => fill(buf, &READBACK_PROBE_SEQUENCE),
        };
        &buf[..len]
    }

    /// Write this command to the chip, one transaction per register word.
    pub fn send<T>(self, iface: &mut T) -> Result<(), Error<T::Error>>
    where
        T: Transport,
    {
        let mut buf = [RegisterWord::new(0, 0); 4];
        frame::write_registers(iface, self.words(&mut buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::TestSpyInterface;
    use proptest::prelude::*;

    fn words(cmd: Command) -> std::vec::Vec<u16> {
        let mut buf = [RegisterWord::new(0, 0); 4];
        cmd.words(&mut buf).iter().map(|w| w.bits()).collect()
    }

    #[test]
    fn register_word_layout() {
        let w = RegisterWord::new(0x13, 0x64);
        assert_eq!(w.bits(), 0x1364);
        assert_eq!(w.address(), 0x13);
        assert_eq!(w.value(), 0x64);
        assert_eq!(w.to_bytes(), [0x13, 0x64]);
    }

    #[test]
    fn luminance() {
        assert_eq!(words(Command::SetLuminance(15)), [0x1107, 0x130F]);
        assert_eq!(words(Command::SetLuminance(3)), [0x1107, 0x1305]);
        assert_eq!(words(Command::SetLuminance(150)), [0x1107, 0x1364]);
        assert_eq!(words(Command::SetLuminance(0)), [0x1107, 0x1305]);
        assert_eq!(words(Command::SetLuminance(255)), [0x1107, 0x1364]);
    }

    #[test]
    fn orbit() {
        assert_eq!(words(Command::SetOrbit(0, 0)), [0x0200, 0x0380]);
        assert_eq!(words(Command::SetOrbit(3, 7)), [0x0203, 0x0387]);
        assert_eq!(words(Command::SetOrbit(-1, -1)), [0x02FF, 0x03FF]);
        assert_eq!(words(Command::SetOrbit(15, -20)), [0x020A, 0x03F6]);
        assert_eq!(words(Command::SetOrbit(-128, 127)), [0x02F6, 0x038A]);
    }

    #[test]
    fn orbit_axes_are_independent() {
        // Vertical comes from the vertical argument, not the horizontal one.
        assert_eq!(words(Command::SetOrbit(10, 0)), [0x020A, 0x0380]);
        assert_eq!(words(Command::SetOrbit(0, -4)), [0x0200, 0x03FC]);
    }

    #[test]
    fn power_sequences() {
        assert_eq!(words(Command::PanelOn), [0x004D, 0x004F]);
        assert_eq!(words(Command::PanelOff), [0x004D, 0x004C]);
        assert_eq!(
            words(Command::ReadbackProbe),
            [0x8001, 0x817F, 0x8100, 0x8000]
        );
    }

    #[test]
    fn init_table_starts_at_address_one() {
        assert_eq!(INIT_TABLE[0], 0x01);
        assert_eq!(INIT_TABLE.len(), 8);
        // The orbit registers in the table match a centered orbit.
        let centered = encode_orbit(0, 0);
        assert_eq!(INIT_TABLE[ORBIT_H_ADDR as usize], centered[0].value());
        assert_eq!(INIT_TABLE[ORBIT_V_ADDR as usize], centered[1].value());
    }

    #[test]
    fn send_luminance() {
        let spy = TestSpyInterface::new();
        let mut iface = spy.split();
        Command::SetLuminance(42).send(&mut iface).unwrap();
        assert_eq!(spy.transactions(), vec![vec![0x11, 0x07], vec![0x13, 42]]);
    }

    #[test]
    fn send_probe() {
        let spy = TestSpyInterface::new();
        let mut iface = spy.split();
        Command::ReadbackProbe.send(&mut iface).unwrap();
        assert_eq!(
            spy.transactions(),
            vec![
                vec![0x80, 0x01],
                vec![0x81, 0x7F],
                vec![0x81, 0x00],
                vec![0x80, 0x00]
            ]
        );
    }

    #[test]
    fn luminance_every_input() {
        for n in 0..=255u8 {
            let [cal, lum] = encode_luminance(n);
            assert_eq!(cal.bits(), 0x1107);
            assert_eq!(lum.address(), 0x13);
            assert_eq!(lum.value(), n.clamp(5, 100));
        }
    }

    /// Sign-extend the low five bits of `byte`.
    fn low5(byte: u8) -> i8 {
        ((byte << 3) as i8) >> 3
    }

    proptest! {
        #[test]
        fn orbit_is_clamped(h in any::<i8>(), v in any::<i8>()) {
            let [wh, wv] = encode_orbit(h, v);
            prop_assert_eq!(wh.address(), ORBIT_H_ADDR);
            prop_assert_eq!(wv.address(), ORBIT_V_ADDR);
            prop_assert_eq!(low5(wh.value()), h.clamp(-10, 10));
            prop_assert_eq!(low5(wv.value()), v.clamp(-10, 10));
            prop_assert_eq!(wv.value() & 0x80, 0x80);
        }

        #[test]
        fn luminance_is_clamped(n in any::<u8>()) {
            let [_, lum] = encode_luminance(n);
            prop_assert!((5..=100).contains(&lum.value()));
            if (5..=100).contains(&n) {
                prop_assert_eq!(lum.value(), n);
            }
        }
    }
}
