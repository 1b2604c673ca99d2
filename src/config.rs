// Copyright (c) 2026 rezky_nightky

use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use tracing::info;

use crate::charset::{parse_glyphs, CharsetPreset};
use crate::error::{Error, Result};
use crate::palette::{with_neutral_head, ColorScheme};
use crate::runtime::{ColorMode, VisibilityPriority};
use crate::settings::Settings;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphfall --rows 32 --columns 150 --interval 0.06 --chance 0.02 --length 5,20 --speed 0.4,1.2 --mutation 0.01 --charset matrix --color green --background-levels 0.6,0.35 --background-chance 0.3 --priority higher";

pub fn color_enabled_stdout() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        if is_heading {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("  glyphfall") {
            out.push_str("  \x1b[1;34mglyphfall\x1b[0m");
            out.push_str(rest);
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

/// `LOW,HIGH` pair for the length and speed ranges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span<T> {
    pub low: T,
    pub high: T,
}

impl<T> FromStr for Span<T>
where
    T: FromStr + PartialOrd,
{
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| "expected: LOW,HIGH".to_string())?;
        let low: T = a
            .trim()
            .parse()
            .map_err(|_| "invalid low value".to_string())?;
        let high: T = b
            .trim()
            .parse()
            .map_err(|_| "invalid high value".to_string())?;
        if low > high {
            return Err("low must be <= high".to_string());
        }
        Ok(Self { low, high })
    }
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "glyphfall", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        long = "config",
        value_name = "PATH",
        help_heading = "GENERAL",
        help = "Load settings from a JSON file (flags still take precedence)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "save-config",
        value_name = "PATH",
        help_heading = "GENERAL",
        help = "Write the effective settings to a JSON file and exit"
    )]
    pub save_config: Option<PathBuf>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed the random generator for a reproducible run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help_heading = "GENERAL",
        help = "Append logs to this file (level from GLYPHFALL_LOG, default info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "rows",
        help_heading = "LAYOUT",
        help = "Number of rows; disables following the terminal size"
    )]
    pub rows: Option<u16>,

    #[arg(
        long = "columns",
        help_heading = "LAYOUT",
        help = "Number of columns; disables following the terminal size"
    )]
    pub columns: Option<u16>,

    #[arg(
        long = "space-columns",
        help_heading = "LAYOUT",
        help = "Leave every other column blank"
    )]
    pub space_columns: bool,

    #[arg(
        long = "interval",
        help_heading = "MOTION",
        conflicts_with = "fps",
        help = "Seconds between frames (min 0.005 max 2)"
    )]
    pub interval: Option<f64>,

    #[arg(
        short = 'f',
        long = "fps",
        help_heading = "MOTION",
        help = "Frames per second (min 0.5 max 200); alternative to --interval"
    )]
    pub fps: Option<f64>,

    #[arg(
        long = "speed",
        value_name = "LOW,HIGH",
        help_heading = "MOTION",
        help = "Rows per frame a streak falls"
    )]
    pub speed: Option<Span<f64>>,

    #[arg(
        long = "length",
        value_name = "LOW,HIGH",
        help_heading = "MOTION",
        help = "Streak length in glyphs"
    )]
    pub length: Option<Span<usize>>,

    #[arg(
        long = "chance",
        help_heading = "MOTION",
        help = "Chance per column and frame to start a streak (0..1)"
    )]
    pub chance: Option<f64>,

    #[arg(
        long = "mutation",
        help_heading = "MOTION",
        help = "Chance per glyph and frame to change (0..1)"
    )]
    pub mutation: Option<f64>,

    #[arg(
        long = "shift",
        help_heading = "MOTION",
        conflicts_with = "no_shift",
        help = "New glyphs enter at the head as a streak falls"
    )]
    pub shift: bool,

    #[arg(
        long = "no-shift",
        help_heading = "MOTION",
        help = "Glyphs stay fixed within a streak"
    )]
    pub no_shift: bool,

    #[arg(
        long = "priority",
        value_enum,
        help_heading = "MOTION",
        help = "Which of two equally bright overlapping streaks is drawn"
    )]
    pub priority: Option<VisibilityPriority>,

    #[arg(
        short = 'c',
        long = "color",
        value_enum,
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-colors)"
    )]
    pub color: Option<ColorScheme>,

    #[arg(
        long = "white-head",
        help_heading = "APPEARANCE",
        help = "Draw the leading glyph of each streak in bold white"
    )]
    pub white_head: bool,

    #[arg(
        long = "colormode",
        value_enum,
        help_heading = "APPEARANCE",
        help = "Force color mode. Default: truecolor if supported (COLORTERM), else 256"
    )]
    pub colormode: Option<ColorMode>,

    #[arg(
        long = "background-chance",
        help_heading = "APPEARANCE",
        help = "Chance a new streak uses a dimmed color set (0..1)"
    )]
    pub background_chance: Option<f64>,

    #[arg(
        long = "background-levels",
        value_name = "LEVEL,..",
        value_delimiter = ',',
        help_heading = "APPEARANCE",
        help = "Brightness of the dimmed color sets, each in (0,1)"
    )]
    pub background_levels: Option<Vec<f64>>,

    #[arg(
        long = "charset",
        value_enum,
        help_heading = "CHARSET",
        help = "Charset preset (see --list-charsets)"
    )]
    pub charset: Option<CharsetPreset>,

    #[arg(
        long = "chars",
        help_heading = "CHARSET",
        help = "Custom characters override, literal or hex:30,31"
    )]
    pub chars: Option<String>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> Result<f64> {
    if !v.is_finite() {
        return Err(Error::Args(format!(
            "failed to apply {} {} (must be a finite number)",
            name, v
        )));
    }
    if v < min || v > max {
        return Err(Error::Args(format!(
            "failed to apply {} {} (min {} max {})",
            name, v, min, max
        )));
    }
    Ok(v)
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color256
}

pub fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Color16 => "16-color",
        ColorMode::Mono => "mono",
    }
}

/// Stop time in seconds, or `None` when the run is unbounded.
pub fn duration_secs(args: &Args) -> Result<Option<f64>> {
    match args.duration {
        None => Ok(None),
        Some(s) if s.is_finite() && s <= 0.0 => Ok(None),
        Some(s) => require_f64_range("--duration", s, 0.1, 86400.0).map(Some),
    }
}

/// Settings for this run: flags over the `--config` file over defaults.
pub fn build_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => {
            let mut s = Settings::default();
            s.rain.color_mode = detect_color_mode_auto();
            s
        }
    };
    let rain = &mut settings.rain;

    if let Some(rows) = args.rows {
        rain.rows = rows;
        rain.auto_size = false;
    }
    if let Some(columns) = args.columns {
        rain.columns = columns;
        rain.auto_size = false;
    }
    if args.space_columns {
        rain.space_between_columns = true;
    }

    if let Some(interval) = args.interval {
        rain.frame_interval = require_f64_range("--interval", interval, 0.005, 2.0)?;
    }
    if let Some(fps) = args.fps {
        rain.frame_interval = 1.0 / require_f64_range("--fps", fps, 0.5, 200.0)?;
    }
    if let Some(speed) = args.speed {
        rain.min_speed = speed.low;
        rain.max_speed = speed.high;
    }
    if let Some(length) = args.length {
        rain.min_length = length.low;
        rain.max_length = length.high;
    }
    if let Some(chance) = args.chance {
        rain.new_sequence_chance = chance;
    }
    if let Some(mutation) = args.mutation {
        rain.mid_sequence_mutation_chance = mutation;
    }
    if args.shift {
        rain.shift_mode = true;
    }
    if args.no_shift {
        rain.shift_mode = false;
    }
    if let Some(priority) = args.priority {
        rain.visibility_priority = priority;
    }

    if let Some(scheme) = args.color {
        rain.primary_colors = scheme.anchors();
    }
    if args.white_head {
        with_neutral_head(&mut rain.primary_colors);
    }
    if let Some(mode) = args.colormode {
        rain.color_mode = mode;
    }
    if let Some(chance) = args.background_chance {
        rain.background_chance = chance;
    }
    if let Some(levels) = &args.background_levels {
        rain.background_levels = levels.clone();
    }

    if let Some(preset) = args.charset {
        rain.character_set = preset.glyphs();
    }
    if let Some(spec) = &args.chars {
        rain.character_set = parse_glyphs(spec).map_err(Error::Args)?;
    }

    rain.validate()?;
    settings.controls.resolve()?;
    info!(
        rows = rain.rows,
        columns = rain.columns,
        interval = rain.frame_interval,
        glyphs = rain.character_set.len(),
        "settings ready"
    );
    Ok(settings)
}

fn print_heading(title: &str, note: &str) {
    if color_enabled_stdout() {
        println!("\x1b[1;36m{}\x1b[0m", title);
        println!("\x1b[2m{}\x1b[0m", note);
    } else {
        println!("{}", title);
        println!("{}", note);
    }
    println!();
    println!("VALUE        DESCRIPTION");
}

pub fn print_list_charsets() {
    print_heading(
        "AVAILABLE CHARSET PRESETS:",
        "NOTE: Use only the VALUE (left side) with --charset.",
    );
    for preset in CharsetPreset::value_variants() {
        let Some(value) = preset.to_possible_value() else {
            continue;
        };
        let description = match preset {
            CharsetPreset::Matrix => "Halfwidth katakana + digits + symbols (default)",
            CharsetPreset::Binary => "0 and 1",
            CharsetPreset::Digits => "Digits only",
            CharsetPreset::Hex => "0-9 and A-F",
            CharsetPreset::Katakana => "Halfwidth katakana",
            CharsetPreset::Ascii => "Printable ASCII",
            CharsetPreset::Greek => "Greek",
            CharsetPreset::Cyrillic => "Cyrillic",
            CharsetPreset::Blocks => "Block elements (shading blocks)",
            CharsetPreset::Dna => "DNA bases (ACGT)",
        };
        println!("{:<12} {}", value.get_name(), description);
    }
}

pub fn print_list_colors() {
    print_heading(
        "AVAILABLE COLOR THEMES:",
        "NOTE: Use only the VALUE (left side) with --color.",
    );
    for scheme in ColorScheme::value_variants() {
        let Some(value) = scheme.to_possible_value() else {
            continue;
        };
        let description = match scheme {
            ColorScheme::Green => "Green theme (default)",
            ColorScheme::Red => "Red theme",
            ColorScheme::Cyan => "Cyan theme",
            ColorScheme::Gold => "Gold theme",
            ColorScheme::Purple => "Purple theme",
            ColorScheme::Gray => "Gray theme",
            ColorScheme::Fire => "Fire theme",
        };
        println!("{:<12} {}", value.get_name(), description);
    }
}
