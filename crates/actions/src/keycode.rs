//! HID usage codes that macros may emit.
//!
//! Names follow the conventions used in macro files (`CONTROL`, `SHIFT`, `GUI`,
//! `PLAY_PAUSE`, ...). Lookup is case-insensitive.

use std::fmt;
use std::str::FromStr;

macro_rules! usage_table {
    (@first $first:literal $(, $rest:literal)*) => { $first };
    (
        $(#[$meta:meta])*
        $vis:vis enum $ty:ident : $repr:ty {
            $( $variant:ident = $usage:literal => [$($name:literal),+ $(,)?] ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $ty {
            $( $variant ),*
        }

        impl $ty {
            pub const ALL: &'static [$ty] = &[ $( $ty::$variant ),* ];

            /// Usage ID on the HID usage page this code belongs to.
            pub const fn usage(self) -> $repr {
                match self {
                    $( $ty::$variant => $usage ),*
                }
            }

            /// Canonical macro-file name.
            pub const fn name(self) -> &'static str {
                match self {
                    $( $ty::$variant => usage_table!(@first $($name),+) ),*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                let name = name.trim().to_ascii_uppercase();
                match name.as_str() {
                    $( $($name)|+ => Some($ty::$variant), )*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s).ok_or_else(|| UnknownCode(s.trim().to_string()))
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key code: {0}")]
pub struct UnknownCode(pub String);

usage_table! {
    /// Keyboard/keypad usage page (0x07).
    pub enum KeyCode: u8 {
        A = 0x04 => ["A"],
        B = 0x05 => ["B"],
        C = 0x06 => ["C"],
        D = 0x07 => ["D"],
        E = 0x08 => ["E"],
        F = 0x09 => ["F"],
        G = 0x0A => ["G"],
        H = 0x0B => ["H"],
        I = 0x0C => ["I"],
        J = 0x0D => ["J"],
        K = 0x0E => ["K"],
        L = 0x0F => ["L"],
        M = 0x10 => ["M"],
        N = 0x11 => ["N"],
        O = 0x12 => ["O"],
        P = 0x13 => ["P"],
        Q = 0x14 => ["Q"],
        R = 0x15 => ["R"],
        S = 0x16 => ["S"],
        T = 0x17 => ["T"],
        U = 0x18 => ["U"],
        V = 0x19 => ["V"],
        W = 0x1A => ["W"],
        X = 0x1B => ["X"],
        Y = 0x1C => ["Y"],
        Z = 0x1D => ["Z"],
        One = 0x1E => ["ONE", "1"],
        Two = 0x1F => ["TWO", "2"],
        Three = 0x20 => ["THREE", "3"],
        Four = 0x21 => ["FOUR", "4"],
        Five = 0x22 => ["FIVE", "5"],
        Six = 0x23 => ["SIX", "6"],
        Seven = 0x24 => ["SEVEN", "7"],
        Eight = 0x25 => ["EIGHT", "8"],
        Nine = 0x26 => ["NINE", "9"],
        Zero = 0x27 => ["ZERO", "0"],
        Enter = 0x28 => ["ENTER", "RETURN"],
        Escape = 0x29 => ["ESCAPE", "ESC"],
        Backspace = 0x2A => ["BACKSPACE"],
        Tab = 0x2B => ["TAB"],
        Space = 0x2C => ["SPACE", "SPACEBAR"],
        Minus = 0x2D => ["MINUS"],
        Equals = 0x2E => ["EQUALS"],
        LeftBracket = 0x2F => ["LEFT_BRACKET"],
        RightBracket = 0x30 => ["RIGHT_BRACKET"],
        Backslash = 0x31 => ["BACKSLASH"],
        Pound = 0x32 => ["POUND"],
        Semicolon = 0x33 => ["SEMICOLON"],
        Quote = 0x34 => ["QUOTE"],
        GraveAccent = 0x35 => ["GRAVE_ACCENT"],
        Comma = 0x36 => ["COMMA"],
        Period = 0x37 => ["PERIOD"],
        ForwardSlash = 0x38 => ["FORWARD_SLASH"],
        CapsLock = 0x39 => ["CAPS_LOCK"],
        F1 = 0x3A => ["F1"],
        F2 = 0x3B => ["F2"],
        F3 = 0x3C => ["F3"],
        F4 = 0x3D => ["F4"],
        F5 = 0x3E => ["F5"],
        F6 = 0x3F => ["F6"],
        F7 = 0x40 => ["F7"],
        F8 = 0x41 => ["F8"],
        F9 = 0x42 => ["F9"],
        F10 = 0x43 => ["F10"],
        F11 = 0x44 => ["F11"],
        F12 = 0x45 => ["F12"],
        PrintScreen = 0x46 => ["PRINT_SCREEN"],
        ScrollLock = 0x47 => ["SCROLL_LOCK"],
        Pause = 0x48 => ["PAUSE"],
        Insert = 0x49 => ["INSERT"],
        Home = 0x4A => ["HOME"],
        PageUp = 0x4B => ["PAGE_UP"],
        Delete = 0x4C => ["DELETE"],
        End = 0x4D => ["END"],
        PageDown = 0x4E => ["PAGE_DOWN"],
        RightArrow = 0x4F => ["RIGHT_ARROW", "RIGHT"],
        LeftArrow = 0x50 => ["LEFT_ARROW", "LEFT"],
        DownArrow = 0x51 => ["DOWN_ARROW", "DOWN"],
        UpArrow = 0x52 => ["UP_ARROW", "UP"],
        KeypadNumlock = 0x53 => ["KEYPAD_NUMLOCK"],
        KeypadForwardSlash = 0x54 => ["KEYPAD_FORWARD_SLASH"],
        KeypadAsterisk = 0x55 => ["KEYPAD_ASTERISK"],
        KeypadMinus = 0x56 => ["KEYPAD_MINUS"],
        KeypadPlus = 0x57 => ["KEYPAD_PLUS"],
        KeypadEnter = 0x58 => ["KEYPAD_ENTER"],
        KeypadOne = 0x59 => ["KEYPAD_ONE"],
        KeypadTwo = 0x5A => ["KEYPAD_TWO"],
        KeypadThree = 0x5B => ["KEYPAD_THREE"],
        KeypadFour = 0x5C => ["KEYPAD_FOUR"],
        KeypadFive = 0x5D => ["KEYPAD_FIVE"],
        KeypadSix = 0x5E => ["KEYPAD_SIX"],
        KeypadSeven = 0x5F => ["KEYPAD_SEVEN"],
        KeypadEight = 0x60 => ["KEYPAD_EIGHT"],
        KeypadNine = 0x61 => ["KEYPAD_NINE"],
        KeypadZero = 0x62 => ["KEYPAD_ZERO"],
        KeypadPeriod = 0x63 => ["KEYPAD_PERIOD"],
        Application = 0x65 => ["APPLICATION"],
        LeftControl = 0xE0 => ["CONTROL", "LEFT_CONTROL", "CTRL"],
        LeftShift = 0xE1 => ["SHIFT", "LEFT_SHIFT"],
        LeftAlt = 0xE2 => ["ALT", "LEFT_ALT", "OPTION"],
        LeftGui = 0xE3 => ["GUI", "LEFT_GUI", "WINDOWS", "COMMAND"],
        RightControl = 0xE4 => ["RIGHT_CONTROL"],
        RightShift = 0xE5 => ["RIGHT_SHIFT"],
        RightAlt = 0xE6 => ["RIGHT_ALT"],
        RightGui = 0xE7 => ["RIGHT_GUI"],
    }
}

impl KeyCode {
    /// Bit in the modifier byte of a boot keyboard report, if this is a modifier.
    pub const fn modifier_bit(self) -> Option<u8> {
        let usage = self.usage();
        if usage >= 0xE0 && usage <= 0xE7 {
            Some(1 << (usage - 0xE0))
        } else {
            None
        }
    }
}

usage_table! {
    /// Consumer usage page (0x0C): media and system control keys.
    pub enum ConsumerCode: u16 {
        BrightnessIncrement = 0x006F => ["BRIGHTNESS_INCREMENT"],
        BrightnessDecrement = 0x0070 => ["BRIGHTNESS_DECREMENT"],
        Record = 0x00B2 => ["RECORD"],
        FastForward = 0x00B3 => ["FAST_FORWARD"],
        Rewind = 0x00B4 => ["REWIND"],
        ScanNextTrack = 0x00B5 => ["SCAN_NEXT_TRACK", "NEXT_TRACK"],
        ScanPreviousTrack = 0x00B6 => ["SCAN_PREVIOUS_TRACK", "PREVIOUS_TRACK"],
        Stop = 0x00B7 => ["STOP"],
        Eject = 0x00B8 => ["EJECT"],
        PlayPause = 0x00CD => ["PLAY_PAUSE"],
        Mute = 0x00E2 => ["MUTE"],
        VolumeIncrement = 0x00E9 => ["VOLUME_INCREMENT"],
        VolumeDecrement = 0x00EA => ["VOLUME_DECREMENT"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_aliases_resolve() {
        assert_eq!("control".parse::<KeyCode>(), Ok(KeyCode::LeftControl));
        assert_eq!("WINDOWS".parse::<KeyCode>(), Ok(KeyCode::LeftGui));
        assert_eq!("1".parse::<KeyCode>(), Ok(KeyCode::One));
        assert_eq!(KeyCode::Escape.usage(), 0x29);
        assert_eq!(KeyCode::LeftGui.name(), "GUI");
        assert_eq!(
            "PLAY_PAUSE".parse::<ConsumerCode>().map(ConsumerCode::usage),
            Ok(0xCD)
        );
        assert_eq!("HYPER".parse::<KeyCode>(), Err(UnknownCode("HYPER".to_string())));
    }

    #[test]
    fn every_canonical_name_round_trips() {
        for &code in KeyCode::ALL {
            assert_eq!(KeyCode::from_name(code.name()), Some(code));
        }
        for &code in ConsumerCode::ALL {
            assert_eq!(ConsumerCode::from_name(code.name()), Some(code));
        }
    }

    #[test]
    fn modifier_bits() {
        assert_eq!(KeyCode::LeftControl.modifier_bit(), Some(0x01));
        assert_eq!(KeyCode::LeftShift.modifier_bit(), Some(0x02));
        assert_eq!(KeyCode::LeftGui.modifier_bit(), Some(0x08));
        assert_eq!(KeyCode::RightGui.modifier_bit(), Some(0x80));
        assert_eq!(KeyCode::A.modifier_bit(), None);
    }
}
