//! Color collaborator boundary.
//!
//! The `*-adjust` built-ins only need two things from a color model: a
//! syntax test and an HSLA adjustment.  [`ColorModel`] is that seam;
//! [`DefaultColorModel`] covers hex, `rgb[a]()`, `hsl[a]()` and the basic
//! keyword colors so the engine works without an external stylesheet engine.
//! The HSL arithmetic itself is done by [`palette`].

use palette::{FromColor, Hsla, IntoColor, ShiftHue, Srgb, Srgba, WithAlpha};

// ── Deltas ────────────────────────────────────────────────────────────────────

/// A single channel offset.
///
/// Parsed leniently from argument text: the leading number is used and a
/// trailing `%` (or any other suffix) is ignored.  Unparsable text is `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Delta(f64);

impl Delta {
    pub const ZERO: Delta = Delta(0.0);

    pub fn parse(s: &str) -> Self {
        Delta(leading_number(s).unwrap_or(0.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl From<f64> for Delta {
    fn from(v: f64) -> Self {
        Delta(v)
    }
}

impl std::fmt::Display for Delta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hue, saturation, lightness and alpha offsets for one adjustment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deltas {
    pub h: Delta,
    pub s: Delta,
    pub l: Delta,
    pub a: Delta,
}

impl Deltas {
    pub fn new(h: Delta, s: Delta, l: Delta, a: Delta) -> Self {
        Self { h, s, l, a }
    }
}

/// Longest numeric prefix of `s` (after leading whitespace), if any.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    s[..end].trim_end_matches('.').parse().ok()
}

// ── ColorModel ────────────────────────────────────────────────────────────────

/// The color operations the built-ins depend on.
pub trait ColorModel {
    /// `true` if `value` is a color this model understands.
    fn test(&self, value: &str) -> bool;

    /// Apply `deltas` to `value`.  Invalid input is returned unchanged.
    fn adjust(&self, value: &str, deltas: &Deltas) -> String;
}

/// Built-in color model.
///
/// Hue offsets are degrees, saturation and lightness offsets are percentage
/// points, alpha offsets are percentage points of opacity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultColorModel;

impl ColorModel for DefaultColorModel {
    fn test(&self, value: &str) -> bool {
        parse_color(value).is_some()
    }

    fn adjust(&self, value: &str, deltas: &Deltas) -> String {
        let Some(rgba) = parse_color(value) else {
            return value.to_owned();
        };
        let hsla: Hsla = rgba.into_color();
        let mut hsla = hsla.shift_hue(deltas.h.value() as f32);
        hsla.saturation = (hsla.saturation + percent(deltas.s)).clamp(0.0, 1.0);
        hsla.lightness = (hsla.lightness + percent(deltas.l)).clamp(0.0, 1.0);
        hsla.alpha = (hsla.alpha + percent(deltas.a)).clamp(0.0, 1.0);
        to_css(Srgba::from_color(hsla))
    }
}

fn percent(d: Delta) -> f32 {
    (d.value() / 100.0) as f32
}

/// `#rrggbb` when opaque, else `rgba(r,g,b,a)`.
fn to_css(color: Srgba) -> String {
    let rgb: Srgb<u8> = color.color.into_format();
    let (r, g, b) = (rgb.red, rgb.green, rgb.blue);
    if color.alpha >= 1.0 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        let a = (color.alpha * 1000.0).round() / 1000.0;
        format!("rgba({r},{g},{b},{a})")
    }
}

// ── CSS color syntax ──────────────────────────────────────────────────────────

const KEYWORDS: &[(&str, [u8; 3])] = &[
    ("black", [0x00, 0x00, 0x00]),
    ("silver", [0xc0, 0xc0, 0xc0]),
    ("gray", [0x80, 0x80, 0x80]),
    ("grey", [0x80, 0x80, 0x80]),
    ("white", [0xff, 0xff, 0xff]),
    ("maroon", [0x80, 0x00, 0x00]),
    ("red", [0xff, 0x00, 0x00]),
    ("purple", [0x80, 0x00, 0x80]),
    ("fuchsia", [0xff, 0x00, 0xff]),
    ("green", [0x00, 0x80, 0x00]),
    ("lime", [0x00, 0xff, 0x00]),
    ("olive", [0x80, 0x80, 0x00]),
    ("yellow", [0xff, 0xff, 0x00]),
    ("navy", [0x00, 0x00, 0x80]),
    ("blue", [0x00, 0x00, 0xff]),
    ("teal", [0x00, 0x80, 0x80]),
    ("aqua", [0x00, 0xff, 0xff]),
];

fn opaque([r, g, b]: [u8; 3]) -> Srgba {
    Srgb::new(r, g, b).into_format::<f32>().with_alpha(1.0)
}

/// Hex, keyword, `transparent`, `rgb[a]()` or `hsl[a]()`.
fn parse_color(value: &str) -> Option<Srgba> {
    let v = value.trim().to_ascii_lowercase();
    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex(hex);
    }
    if v == "transparent" {
        return Some(Srgba::new(0.0, 0.0, 0.0, 0.0));
    }
    if let Some(&(_, rgb)) = KEYWORDS.iter().find(|(name, _)| *name == v) {
        return Some(opaque(rgb));
    }

    let open = v.find('(')?;
    let inner = v[open + 1..].strip_suffix(')')?;
    let parts: Vec<&str> = inner
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if !(3..=4).contains(&parts.len()) {
        return None;
    }
    let alpha = match parts.get(3) {
        Some(p) => parse_alpha(p)?,
        None => 1.0,
    };
    match v[..open].trim() {
        "rgb" | "rgba" => Some(Srgba::new(
            parse_rgb_channel(parts[0])?,
            parse_rgb_channel(parts[1])?,
            parse_rgb_channel(parts[2])?,
            alpha,
        )),
        "hsl" | "hsla" => {
            let hsla: Hsla = Hsla::new(
                parse_number(parts[0].trim_end_matches("deg"))?,
                (parse_number(parts[1].trim_end_matches('%'))? / 100.0).clamp(0.0, 1.0),
                (parse_number(parts[2].trim_end_matches('%'))? / 100.0).clamp(0.0, 1.0),
                alpha,
            );
            Some(Srgba::from_color(hsla))
        }
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<Srgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|d| d * 17);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let (rgb, alpha) = match hex.len() {
        3 => ([digit(0)?, digit(1)?, digit(2)?], 255),
        4 => ([digit(0)?, digit(1)?, digit(2)?], digit(3)?),
        6 => ([pair(0)?, pair(2)?, pair(4)?], 255),
        8 => ([pair(0)?, pair(2)?, pair(4)?], pair(6)?),
        _ => return None,
    };
    let mut color = opaque(rgb);
    color.alpha = f32::from(alpha) / 255.0;
    Some(color)
}

fn parse_number(s: &str) -> Option<f32> {
    s.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// A `0..=255` or percentage channel, as `0.0..=1.0`.
fn parse_rgb_channel(s: &str) -> Option<f32> {
    let v = match s.strip_suffix('%') {
        Some(pct) => parse_number(pct)? / 100.0,
        None => parse_number(s)? / 255.0,
    };
    Some(v.clamp(0.0, 1.0))
}

fn parse_alpha(s: &str) -> Option<f32> {
    let v = match s.strip_suffix('%') {
        Some(pct) => parse_number(pct)? / 100.0,
        None => parse_number(s)?,
    };
    Some(v.clamp(0.0, 1.0))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn adjust(value: &str, h: f64, s: f64, l: f64, a: f64) -> String {
        let deltas = Deltas::new(h.into(), s.into(), l.into(), a.into());
        DefaultColorModel.adjust(value, &deltas)
    }

    #[test]
    fn delta_parse_is_lenient() {
        assert_eq!(Delta::parse("10").value(), 10.0);
        assert_eq!(Delta::parse("-25%").value(), -25.0);
        assert_eq!(Delta::parse(" 2.5deg").value(), 2.5);
        assert_eq!(Delta::parse("5.").value(), 5.0);
        assert!(Delta::parse("abc").is_zero());
        assert!(Delta::parse("").is_zero());
    }

    #[test]
    fn recognises_color_syntax() {
        let m = DefaultColorModel;
        for ok in ["#f00", "#F00A", "#ff0000", "#ff000080", "red", "Navy", "transparent",
                   "rgb(255, 0, 0)", "rgba(255,0,0,.5)", "hsl(120, 50%, 50%)", "hsla(0 100% 50% / 0.5)"] {
            assert!(m.test(ok), "{ok} should be a color");
        }
        for bad in ["#ff", "#ggg", "notacolor", "rgb(1,2)", "foo(1,2,3)", ""] {
            assert!(!m.test(bad), "{bad} should not be a color");
        }
    }

    #[test]
    fn zero_deltas_round_trip_hex() {
        assert_eq!(adjust("#ff0000", 0.0, 0.0, 0.0, 0.0), "#ff0000");
        assert_eq!(adjust("#336699", 0.0, 0.0, 0.0, 0.0), "#336699");
        assert_eq!(adjust("white", 0.0, 0.0, 0.0, 0.0), "#ffffff");
    }

    #[test]
    fn hue_rotates_and_wraps() {
        assert_eq!(adjust("#ff0000", 120.0, 0.0, 0.0, 0.0), "#00ff00");
        assert_eq!(adjust("#ff0000", 240.0, 0.0, 0.0, 0.0), "#0000ff");
        assert_eq!(adjust("#ff0000", -120.0, 0.0, 0.0, 0.0), "#0000ff");
        assert_eq!(adjust("#ff0000", 480.0, 0.0, 0.0, 0.0), "#00ff00");
    }

    #[test]
    fn lightness_and_saturation_clamp() {
        assert_eq!(adjust("#000", 0.0, 0.0, 100.0, 0.0), "#ffffff");
        assert_eq!(adjust("#fff", 0.0, 0.0, -200.0, 0.0), "#000000");
        assert_eq!(adjust("#ff0000", 0.0, -100.0, 0.0, 0.0), "#808080");
    }

    #[test]
    fn alpha_produces_rgba() {
        assert_eq!(adjust("red", 0.0, 0.0, 0.0, -50.0), "rgba(255,0,0,0.5)");
        assert_eq!(adjust("rgba(0,0,255,0.5)", 0.0, 0.0, 0.0, 50.0), "#0000ff");
        assert_eq!(adjust("transparent", 0.0, 0.0, 0.0, 0.0), "rgba(0,0,0,0)");
    }

    #[test]
    fn hsl_syntax_goes_through_palette() {
        assert_eq!(adjust("hsl(120, 100%, 50%)", 0.0, 0.0, 0.0, 0.0), "#00ff00");
        assert_eq!(adjust("hsl(120, 50%, 75%)", 0.0, 0.0, 0.0, 0.0), "#9fdf9f");
        assert_eq!(adjust("hsl(0, 50%, 75%)", 120.0, 0.0, 0.0, 0.0), "#9fdf9f");
        assert_eq!(adjust("hsla(240deg 100% 50% / 50%)", 0.0, 0.0, 0.0, 0.0), "rgba(0,0,255,0.5)");
    }

    #[test]
    fn invalid_input_is_returned_unchanged() {
        assert_eq!(adjust("nope", 10.0, 0.0, 0.0, 0.0), "nope");
    }
}
