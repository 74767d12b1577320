use crate::chip::chip8::constants::{CHIP8_SCREEN_HEIGHT, CHIP8_SCREEN_WIDTH};

/// The 64x32 monochrome display. Pixels are stored row-major.
pub struct Framebuffer {
    pixels: [bool; CHIP8_SCREEN_WIDTH * CHIP8_SCREEN_HEIGHT],

    /// Set whenever the pixels were touched since the renderer last looked.
    dirty: bool,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [false; CHIP8_SCREEN_WIDTH * CHIP8_SCREEN_HEIGHT],
            dirty: false,
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [false; CHIP8_SCREEN_WIDTH * CHIP8_SCREEN_HEIGHT];
        self.dirty = true;
    }

    /// XORs an 8 pixel wide sprite into the display and returns whether any
    /// lit pixel was erased.
    ///
    /// The origin wraps around the screen edges, the sprite itself does not:
    /// pixels that would land beyond the right or bottom edge are clipped.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let origin_x = x as usize % CHIP8_SCREEN_WIDTH;
        let origin_y = y as usize % CHIP8_SCREEN_HEIGHT;

        let mut collision = false;
        for (row, pixel_byte) in sprite.iter().enumerate() {
            let pos_y = origin_y + row;
            if pos_y >= CHIP8_SCREEN_HEIGHT {
                break;
            }

            for col in 0..8 {
                let pos_x = origin_x + col;
                if pos_x >= CHIP8_SCREEN_WIDTH {
                    break;
                }

                if pixel_byte & (0x80 >> col) == 0 {
                    continue;
                }

                let pixel = &mut self.pixels[pos_x + pos_y * CHIP8_SCREEN_WIDTH];
                if *pixel {
                    collision = true;
                }
                *pixel ^= true;
            }
        }

        self.dirty = true;
        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[x + y * CHIP8_SCREEN_WIDTH]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty flag and clears it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Framebuffer::new()
    }
}
