// SPDX-License-Identifier: MIT
//
// Terminal colors.
//
// kiln paints with the terminal's own palette: the 16 ANSI colors that
// every user theme already defines, plus the 256-color cube for the rare
// case that needs more. No color math happens here; a `Color` is exactly
// what gets sent to the terminal.

/// A resolved terminal color.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// The terminal's default foreground or background.
    #[default]
    Default,
    /// ANSI palette index. 0–7 are the standard colors, 8–15 their bright
    /// variants, 16–255 the extended cube and grayscale ramp.
    Ansi(u8),
}

impl Color {
    pub const BLACK: Self = Self::Ansi(0);
    pub const RED: Self = Self::Ansi(1);
    pub const GREEN: Self = Self::Ansi(2);
    pub const YELLOW: Self = Self::Ansi(3);
    pub const BLUE: Self = Self::Ansi(4);
    pub const MAGENTA: Self = Self::Ansi(5);
    pub const CYAN: Self = Self::Ansi(6);
    pub const WHITE: Self = Self::Ansi(7);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_default() {
        assert_eq!(Color::default(), Color::Default);
        assert_ne!(Color::RED, Color::Default);
    }
}
