//! The two transaction shapes understood by the ECX337A control bus.
//!
//! A transaction is everything between asserting XCS and releasing it. Inside one transaction
//! the first byte is a register address and every following byte is written to the next
//! address, so a burst is simply a long transaction and a single register write is a
//! two-byte one. Consecutive register writes must therefore each get their own transaction, and
//! the bus must stay idle for a while between transactions or the chip may join them.

use hal::digital::v2::PinState;

use crate::command::RegisterWord;
use crate::error::Error;
use crate::interface::{Line, Transport};

/// Run `body` inside one chip-select framed transaction.
///
/// If `body` fails, chip-select is still released (and the idle window observed) before the
/// fault is returned.
fn transaction<T, F, R>(iface: &mut T, body: F) -> Result<R, Error<T::Error>>
where
    T: Transport,
    F: FnOnce(&mut T) -> Result<R, T::Error>,
{
    let timing = iface.timing();
    if let Err(e) = iface.set_line(Line::ChipSelect, PinState::Low) {
        // Whatever state XCS was left in, try to leave it released.
        let _ = iface.set_line(Line::ChipSelect, PinState::High);
        return Err(Error::Transport(e));
    }
    iface.delay_us(timing.settle_us);
    let result = body(iface);
    iface.delay_us(timing.settle_us);
    let released = iface.set_line(Line::ChipSelect, PinState::High);
    iface.delay_us(timing.idle_us);

    let value = result.map_err(Error::Transport)?;
    released.map_err(Error::Transport)?;
    Ok(value)
}

/// Write `bytes` in a single burst transaction. The first byte is the start address.
pub fn burst_write<T>(iface: &mut T, bytes: &[u8]) -> Result<(), Error<T::Error>>
where
    T: Transport,
{
    trace!("burst write of {} bytes", bytes.len());
    transaction(iface, |iface| {
        for &b in bytes {
            iface.transfer_byte(b)?;
        }
        Ok(())
    })
}

/// Write one register in its own transaction. Returns the byte clocked in while the value byte
/// was shifted out, if the transport can receive.
pub fn write_register<T>(iface: &mut T, word: RegisterWord) -> Result<Option<u8>, Error<T::Error>>
where
    T: Transport,
{
    trace!("write register {=u8:#x} = {=u8:#x}", word.address(), word.value());
    let [address, value] = word.to_bytes();
    transaction(iface, |iface| {
        iface.transfer_byte(address)?;
        iface.transfer_byte(value)
    })
}

/// Write each of `words` in its own transaction, in order. Stops at the first fault.
pub fn write_registers<T>(iface: &mut T, words: &[RegisterWord]) -> Result<(), Error<T::Error>>
where
    T: Transport,
{
    for &word in words {
        write_register(iface, word)?;
    }
    Ok(())
}
