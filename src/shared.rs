//! A panel which can be driven from more than one place.
//!
//! The control bus has no notion of interleaved transactions, so every operation must run to
//! completion before the next one starts. `SharedPanel` holds the `Panel` behind a blocking
//! mutex and runs each operation entirely inside the lock. Pick the raw mutex to match the
//! callers: `NoopRawMutex` when they all live in one thread of execution,
//! `CriticalSectionRawMutex` when interrupts or other cores are involved.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::Config;
use crate::error::Error;
use crate::interface::Transport;
use crate::panel::{Panel, PowerState, Settings};

pub struct SharedPanel<M, T>
where
    M: RawMutex,
    T: Transport,
{
    inner: Mutex<M, RefCell<Panel<T>>>,
}

impl<M, T> SharedPanel<M, T>
where
    M: RawMutex,
    T: Transport,
{
    pub fn new(panel: Panel<T>) -> Self {
        SharedPanel {
            inner: Mutex::new(RefCell::new(panel)),
        }
    }

    /// Run `f` with exclusive access to the panel.
    ///
    /// # Panics
    ///
    /// Panics if `f` calls back into this `SharedPanel`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Panel<T>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    pub fn initialize(&self, config: Config) -> Result<(), Error<T::Error>> {
        self.lock(|panel| panel.initialize(config))
    }

    pub fn panel_on(&self) -> Result<(), Error<T::Error>> {
        self.lock(|panel| panel.panel_on())
    }

    pub fn panel_off(&self) -> Result<(), Error<T::Error>> {
        self.lock(|panel| panel.panel_off())
    }

    pub fn set_luminance(&self, nitsx10: u8) -> Result<(), Error<T::Error>> {
        self.lock(|panel| panel.set_luminance(nitsx10))
    }

    pub fn set_orbit(&self, horizontal: i8, vertical: i8) -> Result<(), Error<T::Error>> {
        self.lock(|panel| panel.set_orbit(horizontal, vertical))
    }

    pub fn state(&self) -> PowerState {
        self.lock(|panel| panel.state())
    }

    pub fn settings(&self) -> Settings {
        self.lock(|panel| panel.settings())
    }

    pub fn into_inner(self) -> Panel<T> {
        self.inner.into_inner().into_inner()
    }
}
