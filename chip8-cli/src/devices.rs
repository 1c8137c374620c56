//! Headless devices for running programs in a terminal.
use std::io::{self, Write};

use chip8::{constants::KEY_COUNT, prelude::*};
use log::{debug, warn};

/// Devices without a window.
///
/// Keys are fixed for the whole run, drawing is only counted, and the
/// buzzer rings the terminal bell.
pub struct HeadlessDevices {
    keys: [bool; KEY_COUNT as usize],
    /// Number of frames to run before asking the VM to stop.
    frame_limit: Option<usize>,
    frames: usize,
    draws: usize,
}

impl HeadlessDevices {
    pub fn new(keys: [bool; KEY_COUNT as usize], frame_limit: Option<usize>) -> Self {
        Self {
            keys,
            frame_limit,
            frames: 0,
            draws: 0,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl Devices for HeadlessDevices {
    fn poll_input(&mut self) -> Input {
        if let Some(limit) = self.frame_limit {
            if self.frames >= limit {
                debug!("frame limit {limit} reached");
                return Input::Quit;
            }
        }

        self.frames += 1;
        Input::Keys(self.keys)
    }

    fn draw(&mut self, _display: &DisplayBuffer) {
        self.draws += 1;
    }

    fn beep(&mut self) {
        let mut stdout = io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            warn!("failed to ring bell: {err}");
        }
    }
}
