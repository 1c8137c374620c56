//! Monochrome display buffer.
use crate::constants::*;

/// Buffer of 64x32 pixels, stored row-major. A pixel is either on or off.
///
/// Only the sprite blit writes individual pixels, and it does so with XOR.
#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    pixels: Box<[bool; DISPLAY_BUFFER_SIZE]>,
}

/// What happens to sprite pixels that land outside the 64x32 grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EdgePolicy {
    /// Coordinates wrap around to the opposite edge.
    #[default]
    Wrap,
    /// Pixels outside the grid are dropped, and never collide.
    Clip,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self {
            pixels: Box::new([false; DISPLAY_BUFFER_SIZE]),
        }
    }
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// State of the pixel at the given coordinate.
    ///
    /// Coordinates outside the grid are off.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT {
            self.pixels[x + y * DISPLAY_WIDTH]
        } else {
            false
        }
    }

    #[inline(always)]
    pub fn pixels(&self) -> &[bool; DISPLAY_BUFFER_SIZE] {
        &self.pixels
    }

    /// Iterate the rows of the display, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.pixels.chunks(DISPLAY_WIDTH)
    }

    /// Blit a sprite with its top-left corner at `(x, y)`.
    ///
    /// Each byte in `sprite` is one row of 8 pixels, most significant bit
    /// on the left. Set bits flip the underlying pixel.
    ///
    /// Returns `true` when a pixel that was on has been turned off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8], edge: EdgePolicy) -> bool {
        let mut is_erased = false;

        for (r, row) in sprite.iter().enumerate() {
            // Each row is 8 bits representing the 8 pixels of the sprite.
            for c in 0..8 {
                if (row >> (7 - c)) & 1 == 0 {
                    continue;
                }

                let index = match edge {
                    EdgePolicy::Wrap => {
                        ((x + c) & DISPLAY_WIDTH_MASK)
                            + ((y + r) & DISPLAY_HEIGHT_MASK) * DISPLAY_WIDTH
                    }
                    EdgePolicy::Clip => {
                        if x + c >= DISPLAY_WIDTH || y + r >= DISPLAY_HEIGHT {
                            continue;
                        }
                        (x + c) + (y + r) * DISPLAY_WIDTH
                    }
                };

                // XOR erases a pixel when both the old and new values are both 1.
                is_erased |= self.pixels[index];
                self.pixels[index] ^= true;
            }
        }

        is_erased
    }
}
