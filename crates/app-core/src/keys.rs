//! Layout of the 4x4 key grid.
//!
//! Keys are numbered row-major from the top-left corner:
//!
//! ```text
//!  0  1  2  3
//!  4  5  6  7
//!  8  9 10 11
//! 12 13 14 15
//! ```

pub const KEY_COUNT: u8 = 16;
pub const COLUMNS: u8 = 4;

/// Left column: each key selects the layer of its row and can never carry a macro.
pub const NAV_KEYS: [u8; 4] = [0, 4, 8, 12];

/// Wakes the keypad from the screensaver. Also the navigation key for layer 0.
pub const WAKE_KEY: u8 = 0;

/// Shows the result of the last macro registry load.
pub const LOAD_INDICATOR_KEY: u8 = 8;

pub fn all() -> impl Iterator<Item = u8> {
    0..KEY_COUNT
}

pub fn is_valid(key: u8) -> bool {
    key < KEY_COUNT
}

pub fn is_nav_key(key: u8) -> bool {
    NAV_KEYS.contains(&key)
}

/// Layer a navigation key points at, before clamping to the loaded layer count.
pub fn nav_layer(key: u8) -> Option<usize> {
    is_nav_key(key).then(|| usize::from(key / COLUMNS))
}

pub fn nav_key_for_layer(layer: usize) -> Option<u8> {
    NAV_KEYS.get(layer).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_keys_map_to_rows() {
        assert_eq!(nav_layer(0), Some(0));
        assert_eq!(nav_layer(4), Some(1));
        assert_eq!(nav_layer(8), Some(2));
        assert_eq!(nav_layer(12), Some(3));
        assert_eq!(nav_layer(5), None);
        assert_eq!(nav_key_for_layer(2), Some(8));
        assert_eq!(nav_key_for_layer(4), None);
    }

    #[test]
    fn wake_key_is_a_nav_key() {
        assert!(is_nav_key(WAKE_KEY));
        assert!(is_nav_key(LOAD_INDICATOR_KEY));
    }
}
