//! The bit-banged transport against mocked `embedded-hal` pins.

use embedded_hal_mock::eh0::delay::NoopDelay;
use embedded_hal_mock::eh0::pin::{Mock as PinMock, State, Transaction as PinTransaction};
use embedded_hal_mock::eh0::MockError;

use ecx337a::{BitBangInterface, BitOrder, Config, Error, Panel, PowerState, Transport};

/// SI levels for shifting `bytes` in `order`.
fn data_bits(bytes: &[u8], order: BitOrder) -> Vec<PinTransaction> {
    let mut out = Vec::new();
    for &b in bytes {
        for i in 0..8 {
            let bit = match order {
                BitOrder::MsbFirst => b & (0x80 >> i) != 0,
                BitOrder::LsbFirst => b & (0x01 << i) != 0,
            };
            out.push(PinTransaction::set(if bit { State::High } else { State::Low }));
        }
    }
    out
}

/// One rising and falling edge per bit.
fn clock_pulses(n_bytes: usize) -> Vec<PinTransaction> {
    (0..n_bytes * 8)
        .flat_map(|_| {
            vec![
                PinTransaction::set(State::High),
                PinTransaction::set(State::Low),
            ]
        })
        .collect()
}

/// Chip-select framing for `n` transactions.
fn frames(n: usize) -> Vec<PinTransaction> {
    (0..n)
        .flat_map(|_| {
            vec![
                PinTransaction::set(State::Low),
                PinTransaction::set(State::High),
            ]
        })
        .collect()
}

#[test]
fn shifts_msb_first_by_default() {
    let mut si = PinMock::new(&data_bits(&[0x00, 0x4D], BitOrder::MsbFirst));
    let mut clk = PinMock::new(&clock_pulses(2));
    let mut xclr = PinMock::new(&[]);
    let mut xcs = PinMock::new(&frames(1));

    let mut iface = BitBangInterface::new(
        si.clone(),
        clk.clone(),
        xclr.clone(),
        xcs.clone(),
        None::<PinMock>,
        NoopDelay::new(),
    );
    ecx337a::frame::write_register(&mut iface, ecx337a::RegisterWord::new(0x00, 0x4D)).unwrap();
    assert!(!iface.has_power_control());

    si.done();
    clk.done();
    xclr.done();
    xcs.done();
}

#[test]
fn shifts_lsb_first_when_asked() {
    let mut si = PinMock::new(&data_bits(&[0x01, 0x02], BitOrder::LsbFirst));
    let mut clk = PinMock::new(&clock_pulses(2));
    let mut xclr = PinMock::new(&[]);
    let mut xcs = PinMock::new(&frames(1));

    let mut iface = BitBangInterface::new(
        si.clone(),
        clk.clone(),
        xclr.clone(),
        xcs.clone(),
        None::<PinMock>,
        NoopDelay::new(),
    )
    .bit_order(BitOrder::LsbFirst);
    ecx337a::frame::burst_write(&mut iface, &[0x01, 0x02]).unwrap();

    si.done();
    clk.done();
    xclr.done();
    xcs.done();
}

#[test]
fn initialize_and_light_panel() {
    let init = ecx337a::consts::INIT_TABLE;

    let mut si_expect = vec![PinTransaction::set(State::Low)];
    si_expect.extend(data_bits(&init, BitOrder::MsbFirst));
    si_expect.extend(data_bits(&[0x00, 0x4D, 0x00, 0x4F], BitOrder::MsbFirst));

    let mut clk_expect = vec![PinTransaction::set(State::Low)];
    clk_expect.extend(clock_pulses(init.len() + 4));

    let xclr_expect = [
        PinTransaction::set(State::Low),
        PinTransaction::set(State::Low),
        PinTransaction::set(State::High),
    ];

    let mut xcs_expect = vec![PinTransaction::set(State::High)];
    xcs_expect.extend(frames(3));

    let pwr_expect = [
        PinTransaction::set(State::Low),
        PinTransaction::set(State::High),
    ];

    let mut si = PinMock::new(&si_expect);
    let mut clk = PinMock::new(&clk_expect);
    let mut xclr = PinMock::new(&xclr_expect);
    let mut xcs = PinMock::new(&xcs_expect);
    let mut pwr = PinMock::new(&pwr_expect);

    let mut panel = Panel::new(BitBangInterface::new(
        si.clone(),
        clk.clone(),
        xclr.clone(),
        xcs.clone(),
        Some(pwr.clone()),
        NoopDelay::new(),
    ));
    panel.initialize(Config::new()).unwrap();
    assert_eq!(panel.state(), PowerState::Powersave);
    panel.panel_on().unwrap();
    assert_eq!(panel.state(), PowerState::Active);

    si.done();
    clk.done();
    xclr.done();
    xcs.done();
    pwr.done();
}

#[test]
fn pin_fault_is_reported() {
    let fault = MockError::Io(std::io::ErrorKind::NotConnected);
    let mut si = PinMock::new(&[PinTransaction::set(State::Low).with_error(fault.clone())]);
    let mut clk = PinMock::new(&[]);
    let mut xclr = PinMock::new(&[]);
    let mut xcs = PinMock::new(&[]);

    let mut panel = Panel::new(BitBangInterface::new(
        si.clone(),
        clk.clone(),
        xclr.clone(),
        xcs.clone(),
        None::<PinMock>,
        NoopDelay::new(),
    ));
    assert_eq!(panel.initialize(Config::new()), Err(Error::Transport(fault)));
    assert_eq!(panel.state(), PowerState::Uninitialized);

    si.done();
    clk.done();
    xclr.done();
    xcs.done();
}
