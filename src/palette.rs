// Copyright (c) 2026 rezky_nightky

use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};
use crossterm::Command;
use serde::{Deserialize, Serialize};

use crate::gradient::extend;
use crate::runtime::ColorMode;

/// One color stop of a streak gradient. Only the head stop is expected to
/// carry `bold`; gradient extension drops it everywhere else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default)]
    pub bold: bool,
}

impl Anchor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            bold: false,
        }
    }

    pub const fn bold(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, bold: true }
    }

    pub const NEUTRAL_HEAD: Anchor = Anchor::bold(255, 255, 255);

    /// Darkens the color by `level` (0..1). The result is never bold.
    pub fn scaled(self, level: f64) -> Self {
        let scale = |c: u8| (f64::from(c) * level).round_ties_even().clamp(0.0, 255.0) as u8;
        Self::rgb(scale(self.r), scale(self.g), scale(self.b))
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Green,
    Red,
    Cyan,
    Gold,
    Purple,
    Gray,
    Fire,
}

const SCHEME_STEPS: usize = 9;

const GREEN: [Anchor; 9] = [
    Anchor::bold(64, 255, 64),
    Anchor::rgb(0, 255, 0),
    Anchor::rgb(0, 208, 0),
    Anchor::rgb(0, 176, 0),
    Anchor::rgb(0, 144, 0),
    Anchor::rgb(0, 112, 0),
    Anchor::rgb(0, 80, 0),
    Anchor::rgb(0, 48, 0),
    Anchor::rgb(0, 16, 0),
];

const RED: [Anchor; 9] = [
    Anchor::bold(255, 64, 64),
    Anchor::rgb(255, 0, 0),
    Anchor::rgb(240, 0, 0),
    Anchor::rgb(224, 0, 0),
    Anchor::rgb(208, 0, 0),
    Anchor::rgb(192, 0, 0),
    Anchor::rgb(176, 0, 0),
    Anchor::rgb(160, 0, 0),
    Anchor::rgb(144, 0, 0),
];

const CYAN: [Anchor; 9] = [
    Anchor::bold(64, 255, 255),
    Anchor::rgb(0, 255, 255),
    Anchor::rgb(0, 208, 208),
    Anchor::rgb(0, 176, 176),
    Anchor::rgb(0, 144, 144),
    Anchor::rgb(0, 112, 112),
    Anchor::rgb(0, 80, 80),
    Anchor::rgb(0, 48, 48),
    Anchor::rgb(0, 16, 16),
];

impl ColorScheme {
    /// Brightest-first anchors for the scheme.
    pub fn anchors(self) -> Vec<Anchor> {
        match self {
            ColorScheme::Green => GREEN.to_vec(),
            ColorScheme::Red => RED.to_vec(),
            ColorScheme::Cyan => CYAN.to_vec(),
            ColorScheme::Gold => extend(
                &[
                    Anchor::bold(255, 255, 220),
                    Anchor::rgb(255, 215, 0),
                    Anchor::rgb(200, 140, 0),
                    Anchor::rgb(60, 40, 0),
                ],
                SCHEME_STEPS,
            ),
            ColorScheme::Purple => extend(
                &[
                    Anchor::bold(240, 220, 255),
                    Anchor::rgb(180, 60, 255),
                    Anchor::rgb(90, 0, 160),
                    Anchor::rgb(20, 0, 40),
                ],
                SCHEME_STEPS,
            ),
            ColorScheme::Gray => extend(
                &[
                    Anchor::bold(255, 255, 255),
                    Anchor::rgb(200, 200, 200),
                    Anchor::rgb(110, 110, 110),
                    Anchor::rgb(20, 20, 20),
                ],
                SCHEME_STEPS,
            ),
            ColorScheme::Fire => extend(
                &[
                    Anchor::bold(255, 255, 200),
                    Anchor::rgb(255, 200, 0),
                    Anchor::rgb(255, 80, 0),
                    Anchor::rgb(160, 0, 0),
                    Anchor::rgb(40, 0, 0),
                ],
                SCHEME_STEPS,
            ),
        }
    }
}

/// Replaces the head anchor with bold white.
pub fn with_neutral_head(anchors: &mut [Anchor]) {
    if let Some(head) = anchors.first_mut() {
        *head = Anchor::NEUTRAL_HEAD;
    }
}

/// Derives a dimmed copy of `anchors` for background streaks.
pub fn background_set(anchors: &[Anchor], level: f64) -> Vec<Anchor> {
    anchors.iter().map(|a| a.scaled(level)).collect()
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = i32::from(r0) - i32::from(r1);
    let dg = i32::from(g0) - i32::from(g1);
    let db = i32::from(b0) - i32::from(b1);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |c: u8| ((u16::from(c) * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (level(r), level(g), level(b));
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, 0),
        239..=255 => (231, 255),
        _ => {
            let step = (avg - 8) / 10;
            (232 + step, 8 + 10 * step)
        }
    };

    if dist2(r, g, b, gray, gray, gray) < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, (cr, cg, cb))| dist2(r, g, b, *cr, *cg, *cb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

pub fn terminal_color(anchor: Anchor, mode: ColorMode) -> Option<Color> {
    let Anchor { r, g, b, .. } = anchor;
    match mode {
        ColorMode::Mono => None,
        ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
    }
}

fn push_command(out: &mut String, cmd: impl Command) {
    // Writing into a String cannot fail.
    let _ = cmd.write_ansi(out);
}

/// Appends one styled cell: style tokens, the glyph, then a full reset.
pub fn push_styled_glyph(out: &mut String, glyph: char, anchor: Anchor, mode: ColorMode) {
    if anchor.bold {
        push_command(out, SetAttribute(Attribute::Bold));
    }
    if let Some(fg) = terminal_color(anchor, mode) {
        push_command(out, SetForegroundColor(fg));
    }
    out.push(glyph);
    push_command(out, SetAttribute(Attribute::Reset));
}
