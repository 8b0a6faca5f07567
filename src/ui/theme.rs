use crossterm::style::Color;

// Catppuccin Mocha palette
pub const OVERLAY0: Color = Color::Rgb {
    r: 108,
    g: 112,
    b: 134,
};
pub const RED: Color = Color::Rgb {
    r: 243,
    g: 139,
    b: 168,
};
pub const GREEN: Color = Color::Rgb {
    r: 166,
    g: 227,
    b: 161,
};
pub const YELLOW: Color = Color::Rgb {
    r: 249,
    g: 226,
    b: 175,
};
pub const TEAL: Color = Color::Rgb {
    r: 148,
    g: 226,
    b: 213,
};
pub const MAUVE: Color = Color::Rgb {
    r: 203,
    g: 166,
    b: 247,
};
