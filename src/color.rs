//! Color literals and the four configurable colors.
//!
//! Two literal forms are accepted:
//!
//! | Form                | Example        | Alpha                    |
//! |---------------------|----------------|--------------------------|
//! | `#RRGGBBAA`         | `#CCAA0080`    | from the literal         |
//! | `(R,G,B)`           | `(0.1,0.2,0.3)`| previous alpha kept      |
//! | `(R,G,B,A)`         | `(0,0,1,0.5)`  | from the literal         |
//!
//! The hex form also accepts any one-character marker in place of `#` when
//! the literal is nine characters long; a literal opening with `(` is always
//! read as a tuple. Tuple components are floats in
//! `[0, 1]`. A literal that fails to parse, or has any component out of
//! range, leaves the color untouched.

use std::fmt;

use crate::error::ColorError;

/// RGBA color with every channel in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color([f32; 4]);

impl Color {
    const fn from_rgba_unchecked(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    /// Build a color, rejecting channels outside `[0, 1]` (and NaN).
    pub fn new(rgba: [f32; 4]) -> Option<Self> {
        rgba.iter()
            .all(|c| (0.0..=1.0).contains(c))
            .then_some(Self(rgba))
    }

    /// Components as `[r, g, b, a]`.
    #[must_use]
    pub fn to_array(self) -> [f32; 4] {
        self.0
    }

    /// The alpha component.
    #[must_use]
    pub fn alpha(self) -> f32 {
        self.0[3]
    }

    /// Parse `literal`, using this color's alpha for three-component tuples.
    ///
    /// # Errors
    ///
    /// [`ColorError::Malformed`] if the literal matches neither form,
    /// [`ColorError::OutOfRange`] if a component lies outside `[0, 1]`.
    pub fn parse_over(self, literal: &str) -> Result<Self, ColorError> {
        let token = literal.trim();
        let rgba = if token.starts_with('(') {
            parse_tuple(token, self.alpha())
        } else if token.starts_with('#') || token.chars().count() == 9 {
            parse_hex(token)
        } else {
            None
        }
        .ok_or_else(|| ColorError::Malformed(token.to_owned()))?;

        Self::new(rgba).ok_or_else(|| ColorError::OutOfRange(token.to_owned()))
    }

    /// Replace this color with `literal`, or keep it on error.
    ///
    /// # Errors
    ///
    /// See [`parse_over`](Self::parse_over).
    pub fn update(&mut self, literal: &str) -> Result<(), ColorError> {
        *self = self.parse_over(literal)?;
        Ok(())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "({r:.3},{g:.3},{b:.3},{a:.3})")
    }
}

/// `#RRGGBBAA`, marker character skipped.
fn parse_hex(token: &str) -> Option<[f32; 4]> {
    let mut chars = token.chars();
    chars.next()?;
    let digits = chars.as_str();
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let mut rgba = [0.0; 4];
    for (channel, pair) in rgba.iter_mut().zip(digits.as_bytes().chunks_exact(2)) {
        let pair = std::str::from_utf8(pair).ok()?;
        *channel = f32::from(u8::from_str_radix(pair, 16).ok()?) / 255.0;
    }
    Some(rgba)
}

/// `(R,G,B)` or `(R,G,B,A)`.
fn parse_tuple(token: &str, previous_alpha: f32) -> Option<[f32; 4]> {
    let inner = token.strip_prefix('(')?.strip_suffix(')')?;
    let components = inner
        .split(',')
        .map(|c| c.trim().parse::<f32>().ok())
        .collect::<Option<Vec<_>>>()?;

    match components[..] {
        [r, g, b] => Some([r, g, b, previous_alpha]),
        [r, g, b, a] => Some([r, g, b, a]),
        _ => None,
    }
}

/// Which color a flag or config line sets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorTarget {
    /// The large driving gear.
    RedGear,
    /// The gear to the right.
    GreenGear,
    /// The gear at the top.
    BlueGear,
    /// The clear color.
    Background,
}

impl ColorTarget {
    /// Every target, in flag order.
    pub const ALL: [Self; 4] = [
        Self::RedGear,
        Self::GreenGear,
        Self::BlueGear,
        Self::Background,
    ];

    /// Flag spelling, also used as the config-file line prefix.
    #[must_use]
    pub fn flag(self) -> &'static str {
        match self {
            Self::RedGear => "-col-red-gear",
            Self::GreenGear => "-col-green-gear",
            Self::BlueGear => "-col-blue-gear",
            Self::Background => "-col-bg",
        }
    }
}

/// The three gear colors and the clear color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GearColors {
    /// Color of the large gear.
    pub red: Color,
    /// Color of the right gear.
    pub green: Color,
    /// Color of the top gear.
    pub blue: Color,
    /// Clear color.
    pub background: Color,
}

impl Default for GearColors {
    fn default() -> Self {
        Self {
            red: Color::from_rgba_unchecked(0.8, 0.1, 0.0, 1.0),
            green: Color::from_rgba_unchecked(0.0, 0.8, 0.2, 1.0),
            blue: Color::from_rgba_unchecked(0.2, 0.2, 1.0, 1.0),
            background: Color::from_rgba_unchecked(0.0, 0.0, 0.0, 1.0),
        }
    }
}

impl GearColors {
    /// The color a flag sets.
    pub fn get_mut(&mut self, target: ColorTarget) -> &mut Color {
        match target {
            ColorTarget::RedGear => &mut self.red,
            ColorTarget::GreenGear => &mut self.green,
            ColorTarget::BlueGear => &mut self.blue,
            ColorTarget::Background => &mut self.background,
        }
    }

    /// Apply one literal. On error the color is kept and the diagnostic is
    /// printed; the error is also returned for callers that count failures.
    ///
    /// # Errors
    ///
    /// The [`ColorError`] from parsing.
    pub fn apply(&mut self, target: ColorTarget, literal: &str) -> Result<(), ColorError> {
        let result = self.get_mut(target).update(literal);
        if let Err(err) = &result {
            tracing::warn!(flag = target.flag(), token = err.token(), "rejected color literal");
            println!("Error: {err}");
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const QUANTUM: f32 = 1.0 / 255.0;

    fn black() -> Color {
        GearColors::default().background
    }

    fn assert_rgba(actual: Color, expected: [f32; 4], tolerance: f32) {
        let a = actual.to_array();
        assert!(
            a.iter()
                .zip(expected)
                .all(|(x, y)| (x - y).abs() <= tolerance),
            "expected {expected:?}, got {a:?}",
        );
    }

    #[test]
    fn hex_literal() {
        let color = black().parse_over("#CCAA0080").unwrap();
        assert_rgba(color, [0.800, 0.667, 0.000, 0.502], QUANTUM);
    }

    #[test]
    fn hex_literal_lowercase_and_other_marker() {
        let color = black().parse_over("xccaa0080").unwrap();
        assert_rgba(color, [0.800, 0.667, 0.000, 0.502], QUANTUM);
    }

    #[test]
    fn hex_literal_rejects_bad_digits() {
        let base = black();
        assert!(matches!(base.parse_over("#CCAA00GG"), Err(ColorError::Malformed(_))));
        assert!(matches!(base.parse_over("#CCAA00"), Err(ColorError::Malformed(_))));
    }

    #[test]
    fn three_tuple_keeps_alpha() {
        let base = Color::new([0.0, 0.0, 0.0, 0.25]).unwrap();
        let color = base.parse_over("(0.1,0.2,0.3)").unwrap();
        assert_rgba(color, [0.1, 0.2, 0.3, 0.25], f32::EPSILON);
    }

    #[test]
    fn four_tuple_sets_all() {
        let color = black().parse_over("(0.1, 0.2, 0.3, 0.9)").unwrap();
        assert_rgba(color, [0.1, 0.2, 0.3, 0.9], f32::EPSILON);
    }

    #[test]
    fn out_of_range_component_keeps_color() {
        let mut color = Color::new([0.5, 0.5, 0.5, 1.0]).unwrap();
        for literal in ["(1.5,0,0)", "(0,-0.1,0)", "(0,0,0,2)"] {
            let err = color.update(literal).unwrap_err();
            assert_eq!(err, ColorError::OutOfRange(literal.into()));
            assert_rgba(color, [0.5, 0.5, 0.5, 1.0], 0.0);
        }
    }

    #[test]
    fn malformed_tuple_keeps_color() {
        let mut color = Color::new([0.5, 0.5, 0.5, 1.0]).unwrap();
        for literal in ["(0.1,0.2)", "0.1,0.2,0.3", "(a,b,c)", "", "(0,0,0,0,0)"] {
            assert!(matches!(color.update(literal), Err(ColorError::Malformed(_))));
        }
        assert_rgba(color, [0.5, 0.5, 0.5, 1.0], 0.0);
    }

    #[test]
    fn trailing_newline_is_ignored() {
        let color = black().parse_over("(1,0,0,1)\n").unwrap();
        assert_rgba(color, [1.0, 0.0, 0.0, 1.0], 0.0);
    }

    #[test]
    fn apply_targets_one_color() {
        let mut colors = GearColors::default();
        colors.apply(ColorTarget::BlueGear, "(0,0,0.5)").unwrap();
        assert_rgba(colors.blue, [0.0, 0.0, 0.5, 1.0], 0.0);
        assert_eq!(colors.red, GearColors::default().red);
    }

    #[test]
    fn flags_are_not_prefixes_of_each_other() {
        for a in ColorTarget::ALL {
            for b in ColorTarget::ALL {
                if a != b {
                    assert!(!a.flag().starts_with(b.flag()));
                }
            }
        }
    }
}
