//! Delay and sound timers.

/// Two countdown timers that are decremented once per timer tick.
#[derive(Debug, Default, Clone)]
pub struct Timers {
    /// (DT) Delay timer that counts down to 0.
    pub(crate) delay: u8,
    /// (ST) Sound timer that counts down to 0.
    pub(crate) sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline(always)]
    pub fn delay(&self) -> u8 {
        self.delay
    }

    #[inline(always)]
    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Count down both timers, stopping at zero.
    ///
    /// Returns `true` when the sound timer runs out on this tick, which is
    /// the cue for the buzzer.
    #[inline]
    pub fn tick(&mut self) -> bool {
        // The checked_sub implementation uses `unlikely!()` which degrades performance.
        let (val, underflow) = self.delay.overflowing_sub(1);
        if !underflow {
            self.delay = val;
        }

        let cue = self.sound == 1;
        let (val, underflow) = self.sound.overflowing_sub(1);
        if !underflow {
            self.sound = val;
        }

        cue
    }

    pub(crate) fn clear(&mut self) {
        self.delay = 0;
        self.sound = 0;
    }
}
