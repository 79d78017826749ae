use std::time::Duration;

use anyhow::{Context, Result};
use chipvm::display::{FrameBuffer, HEIGHT, WIDTH};
use minifb::{Key, Scale, Window, WindowOptions};

const FRAME_TIME: Duration = Duration::from_micros(16600);

const fn from_u8_rgb(r: u8, g: u8, b: u8) -> u32 {
    let (r, g, b) = (r as u32, g as u32, b as u32);
    (r << 16) | (g << 8) | b
}

const PIXEL_ON: u32 = from_u8_rgb(0, 127, 255);
const PIXEL_OFF: u32 = from_u8_rgb(0, 0, 0);

/// Accepts the zoom factors minifb supports.
pub fn parse_scale(s: &str) -> Result<Scale, String> {
    match s {
        "1" => Ok(Scale::X1),
        "2" => Ok(Scale::X2),
        "4" => Ok(Scale::X4),
        "8" => Ok(Scale::X8),
        "16" => Ok(Scale::X16),
        "32" => Ok(Scale::X32),
        _ => Err(format!("{s} is not one of 1, 2, 4, 8, 16, 32")),
    }
}

/// Host key for each keypad slot:
///
/// ```text
/// |1|2|3|4|      |1|2|3|C|
/// |Q|W|E|R|  ->  |4|5|6|D|
/// |A|S|D|F|      |7|8|9|E|
/// |Z|X|C|V|      |A|0|B|F|
/// ```
pub fn key_to_num(key: Key) -> Option<u8> {
    match key {
        Key::Key1 => Some(0x1),
        Key::Key2 => Some(0x2),
        Key::Key3 => Some(0x3),
        Key::Key4 => Some(0xC),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xD),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xE),
        Key::Z => Some(0xA),
        Key::X => Some(0x0),
        Key::C => Some(0xB),
        Key::V => Some(0xF),
        _ => None,
    }
}

pub struct Screen {
    window: Window,
    pixel_buffer: Vec<u32>,
}

impl Screen {
    pub fn new(scale: Scale) -> Result<Self> {
        let mut window = Window::new(
            "chipvm - ESC to exit",
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )
        .context("failed to open window")?;
        // ~60 fps; also paces the frame loop
        window.limit_update_rate(Some(FRAME_TIME));
        Ok(Self {
            window,
            pixel_buffer: vec![PIXEL_OFF; WIDTH * HEIGHT],
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// Current state of all 16 keypad slots.
    pub fn keypad(&self) -> [bool; 16] {
        let mut keys = [false; 16];
        for key in self.window.get_keys() {
            if let Some(n) = key_to_num(key) {
                keys[n as usize] = true;
            }
        }
        keys
    }

    /// Redraws from `fb`. A hi-res buffer is stretched into the same window.
    pub fn present(&mut self, fb: &FrameBuffer) -> Result<()> {
        self.pixel_buffer.clear();
        self.pixel_buffer.extend(
            fb.pixels()
                .iter()
                .map(|&on| if on { PIXEL_ON } else { PIXEL_OFF }),
        );
        self.window
            .update_with_buffer(&self.pixel_buffer, fb.width(), fb.height())
            .context("failed to update window")
    }

    /// Pumps input events without touching the picture.
    pub fn update(&mut self) {
        self.window.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keymap_covers_the_keypad() {
        let hosts = [
            Key::Key1,
            Key::Key2,
            Key::Key3,
            Key::Key4,
            Key::Q,
            Key::W,
            Key::E,
            Key::R,
            Key::A,
            Key::S,
            Key::D,
            Key::F,
            Key::Z,
            Key::X,
            Key::C,
            Key::V,
        ];
        let mut seen: Vec<u8> = hosts.iter().filter_map(|&k| key_to_num(k)).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<u8>>());
        assert_eq!(key_to_num(Key::Escape), None);
    }

    #[test]
    fn scale_accepts_powers_of_two() {
        assert!(matches!(parse_scale("16"), Ok(Scale::X16)));
        assert!(parse_scale("3").is_err());
    }
}
