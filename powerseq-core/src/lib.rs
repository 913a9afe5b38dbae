#![no_std]

// Portable logic for the powerseq supervisor.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library: the sequencer, its signal conditioning, and the
// time base compile identically for the STM32 target, the emulator, and the
// host test suite.

pub mod debounce;
pub mod input;
pub mod lines;
pub mod sequencer;
pub mod telemetry;
pub mod time;
