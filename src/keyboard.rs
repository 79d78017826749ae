/// Hex keypad state as seen by the program.
///
/// ```text
/// |1|2|3|C|
/// |4|5|6|D|
/// |7|8|9|E|
/// |A|0|B|F|
/// ```
pub struct Keyboard {
    keys: [bool; 16],
}

impl Keyboard {
    pub fn new() -> Self {
        Self { keys: [false; 16] }
    }

    pub fn reset(&mut self) {
        self.keys = [false; 16];
    }

    /// Updates one key. Returns false if `key` is not a keypad index.
    pub fn update_key(&mut self, key: u8, pressed: bool) -> bool {
        match self.keys.get_mut(key as usize) {
            Some(slot) => {
                *slot = pressed;
                true
            }
            None => false,
        }
    }

    /// Only the low nibble of `n` selects a key.
    pub fn get_key_status_from_num(&self, n: u8) -> bool {
        self.keys[(n & 0xF) as usize]
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut kb = Keyboard::new();
        assert!(kb.update_key(0xA, true));
        assert!(kb.get_key_status_from_num(0xA));
        assert!(kb.get_key_status_from_num(0x1A));
        assert!(kb.update_key(0xA, false));
        assert!(!kb.get_key_status_from_num(0xA));
    }

    #[test]
    fn out_of_range_keys_are_refused() {
        let mut kb = Keyboard::new();
        assert!(!kb.update_key(0x10, true));
        assert!(!kb.get_key_status_from_num(0x0));
    }

    #[test]
    fn reset_releases_everything() {
        let mut kb = Keyboard::new();
        kb.update_key(0x3, true);
        kb.update_key(0xF, true);
        kb.reset();
        assert!((0..16).all(|k| !kb.get_key_status_from_num(k)));
    }
}
