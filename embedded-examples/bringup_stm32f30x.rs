//! Full example code for bringing up an ECX337A microdisplay. This runs on an STM32F303RE with
//! the control bus bit-banged on PA5 (SCLK) and PA7 (SI), PA8 for XCS, PA9 for XCLR, and PA10
//! switching the panel's boost converter and LVDS transmitter.

#![deny(unsafe_code)]
#![no_main]
#![no_std]

extern crate cortex_m;
extern crate stm32f30x;
extern crate stm32f30x_hal as hal;
#[macro_use]
extern crate cortex_m_rt;
extern crate ecx337a;
extern crate panic_abort;

use cortex_m::asm;
use cortex_m_rt::ExceptionFrame;
use ecx337a as oled;
use hal::prelude::*;

entry!(main);

exception!(*, default_handler);
exception!(HardFault, hard_fault);

fn hard_fault(_ef: &ExceptionFrame) -> ! {
    asm::bkpt();
    loop {}
}

fn default_handler(_irqn: i16) {
    loop {}
}

fn main() -> ! {
    // Get peripherals and set up RCC.
    let cp = cortex_m::Peripherals::take().unwrap();
    let dp = stm32f30x::Peripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze(&mut flash.acr);
    let delay = hal::delay::Delay::new(cp.SYST, clocks);

    // Get GPIO A where the display is connected. All lines are plain push-pull outputs.
    let mut gpioa = dp.GPIOA.split(&mut rcc.ahb);
    let clk = gpioa
        .pa5
        .into_push_pull_output(&mut gpioa.moder, &mut gpioa.otyper);
    let si = gpioa
        .pa7
        .into_push_pull_output(&mut gpioa.moder, &mut gpioa.otyper);
    let xcs = gpioa
        .pa8
        .into_push_pull_output(&mut gpioa.moder, &mut gpioa.otyper);
    let xclr = gpioa
        .pa9
        .into_push_pull_output(&mut gpioa.moder, &mut gpioa.otyper);
    let pwrctl = gpioa
        .pa10
        .into_push_pull_output(&mut gpioa.moder, &mut gpioa.otyper);

    let mut panel = oled::Panel::new(oled::BitBangInterface::new(
        si,
        clk,
        xclr,
        xcs,
        Some(pwrctl),
        delay,
    ));

    // Reset, program the defaults, start slightly brighter than the power-on 150 cd/m², and
    // light the panel.
    panel
        .initialize(oled::Config::new().luminance(20))
        .unwrap();
    panel.panel_on().unwrap();

    // Walk the image orbit around slowly to spread wear.
    let mut step: i8 = 0;
    loop {
        let h = (step % 21) - 10;
        panel.set_orbit(h, -h).unwrap();
        step = step.wrapping_add(1).rem_euclid(42);
        // One minute at 72 MHz.
        for _ in 0..60 {
            asm::delay(72_000_000);
        }
    }
}
