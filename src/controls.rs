// Copyright (c) 2026 rezky_nightky

//! Live keyboard tuning. Bindings are plain strings (`"f"`, `"up"`,
//! `"ctrl+s"`) so they can be remapped in the settings file; they are
//! resolved into crossterm key chords once at startup.

use std::collections::BTreeMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::charset::CharsetPreset;
use crate::palette::{with_neutral_head, ColorScheme};
use crate::settings::{ConfigError, RainConfig};

pub const MIN_FRAME_INTERVAL: f64 = 0.005;
pub const MAX_FRAME_INTERVAL: f64 = 2.0;
pub const MIN_SPAWN_CHANCE: f64 = 0.001;
pub const MAX_DIMENSION: u16 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Faster,
    Slower,
    Pause,
    Reset,
    ToggleShift,
    FewerRows,
    MoreRows,
    FewerColumns,
    MoreColumns,
    MoreSpawns,
    FewerSpawns,
    SchemeGreen,
    SchemeRed,
    SchemeCyan,
    NeutralHead,
    BinaryGlyphs,
    DefaultGlyphs,
    FlipPriority,
    ToggleSpacing,
    ToggleAutoSize,
    FewerBackground,
    MoreBackground,
    Save,
    Quit,
}

/// What the driver has to do after an action was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    TogglePause,
    Reset,
    Save,
    Quit,
}

impl Action {
    /// Applies the action to `config`. Every adjustment is clamped so the
    /// result still passes [`RainConfig::validate`].
    pub fn apply(self, config: &mut RainConfig) -> Outcome {
        match self {
            Action::Faster => {
                config.frame_interval =
                    (config.frame_interval * 0.95).clamp(MIN_FRAME_INTERVAL, MAX_FRAME_INTERVAL);
            }
            Action::Slower => {
                config.frame_interval =
                    (config.frame_interval * 1.1).clamp(MIN_FRAME_INTERVAL, MAX_FRAME_INTERVAL);
            }
            Action::Pause => return Outcome::TogglePause,
            Action::Reset => return Outcome::Reset,
            Action::ToggleShift => config.shift_mode = !config.shift_mode,
            Action::FewerRows => config.rows = config.rows.saturating_sub(1).max(1),
            Action::MoreRows => config.rows = config.rows.saturating_add(1).min(MAX_DIMENSION),
            Action::FewerColumns => config.columns = config.columns.saturating_sub(1).max(1),
            Action::MoreColumns => config.columns = config.columns.saturating_add(1).min(MAX_DIMENSION),
            Action::MoreSpawns => {
                let c = config.new_sequence_chance.max(MIN_SPAWN_CHANCE);
                config.new_sequence_chance = (c + c / 20.0).min(1.0);
            }
            Action::FewerSpawns => {
                let c = config.new_sequence_chance;
                config.new_sequence_chance = (c - c / 8.0).max(MIN_SPAWN_CHANCE);
            }
            Action::SchemeGreen => config.primary_colors = ColorScheme::Green.anchors(),
            Action::SchemeRed => config.primary_colors = ColorScheme::Red.anchors(),
            Action::SchemeCyan => config.primary_colors = ColorScheme::Cyan.anchors(),
            Action::NeutralHead => with_neutral_head(&mut config.primary_colors),
            Action::BinaryGlyphs => config.character_set = CharsetPreset::Binary.glyphs(),
            Action::DefaultGlyphs => config.character_set = CharsetPreset::Matrix.glyphs(),
            Action::FlipPriority => {
                config.visibility_priority = config.visibility_priority.flipped()
            }
            Action::ToggleSpacing => {
                config.space_between_columns = !config.space_between_columns
            }
            Action::ToggleAutoSize => config.auto_size = !config.auto_size,
            Action::FewerBackground => {
                config.background_chance = (config.background_chance - 0.05).max(0.0)
            }
            Action::MoreBackground => {
                config.background_chance = (config.background_chance + 0.05).min(1.0)
            }
            Action::Save => return Outcome::Save,
            Action::Quit => return Outcome::Quit,
        }
        Outcome::Updated
    }
}

type BindingTable = BTreeMap<Action, Vec<String>>;

/// Key names per action. Actions missing from a loaded file keep their
/// default keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "BindingTable", into = "BindingTable")]
pub struct Keymap {
    bindings: BindingTable,
}

impl Default for Keymap {
    fn default() -> Self {
        let table: &[(Action, &[&str])] = &[
            (Action::Faster, &["f"]),
            (Action::Slower, &["s"]),
            (Action::Pause, &["p"]),
            (Action::Reset, &["space"]),
            (Action::ToggleShift, &["q"]),
            (Action::FewerRows, &["up"]),
            (Action::MoreRows, &["down"]),
            (Action::FewerColumns, &["left"]),
            (Action::MoreColumns, &["right"]),
            (Action::MoreSpawns, &["+", "shift+="]),
            (Action::FewerSpawns, &["-"]),
            (Action::SchemeGreen, &["g"]),
            (Action::SchemeRed, &["r"]),
            (Action::SchemeCyan, &["b"]),
            (Action::NeutralHead, &["m"]),
            (Action::BinaryGlyphs, &["0"]),
            (Action::DefaultGlyphs, &["1"]),
            (Action::FlipPriority, &["v"]),
            (Action::ToggleSpacing, &["c"]),
            (Action::ToggleAutoSize, &["a"]),
            (Action::FewerBackground, &["["]),
            (Action::MoreBackground, &["]"]),
            (Action::Save, &["ctrl+s"]),
            (Action::Quit, &["esc", "ctrl+c"]),
        ];
        let bindings = table
            .iter()
            .map(|(action, keys)| (*action, keys.iter().map(|k| k.to_string()).collect()))
            .collect();
        Self { bindings }
    }
}

impl From<BindingTable> for Keymap {
    fn from(overrides: BindingTable) -> Self {
        let mut keymap = Keymap::default();
        keymap.bindings.extend(overrides);
        keymap
    }
}

impl From<Keymap> for BindingTable {
    fn from(keymap: Keymap) -> Self {
        keymap.bindings
    }
}

impl Keymap {
    #[allow(dead_code)]
    pub fn keys(&self, action: Action) -> &[String] {
        self.bindings.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    #[allow(dead_code)]
    pub fn bind(&mut self, action: Action, keys: Vec<String>) {
        self.bindings.insert(action, keys);
    }

    /// Parses every key name. Fails on the first one that is not understood.
    pub fn resolve(&self) -> Result<Bindings, ConfigError> {
        let mut chords = Vec::new();
        for (action, keys) in &self.bindings {
            for key in keys {
                let chord = KeyChord::parse(key).map_err(|reason| ConfigError::Invalid {
                    field: "controls",
                    reason,
                })?;
                chords.push((chord, *action));
            }
        }
        Ok(Bindings { chords })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyChord {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyChord {
    pub fn parse(name: &str) -> Result<Self, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("empty key name".to_string());
        }

        let mut modifiers = KeyModifiers::NONE;
        let mut rest = name;
        // A lone "+" is a key, not a separator.
        while let Some((head, tail)) = rest.split_once('+').filter(|(_, t)| !t.is_empty()) {
            modifiers |= match head.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                other => return Err(format!("unknown modifier {other:?} in {name:?}")),
            };
            rest = tail;
        }

        let code = match rest.to_ascii_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "esc" | "escape" => KeyCode::Esc,
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "space" => KeyCode::Char(' '),
            "backspace" => KeyCode::Backspace,
            _ => {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return Err(format!("unknown key {rest:?} in {name:?}")),
                }
            }
        };
        Ok(Self { code, modifiers })
    }

    /// Shift is only compared when the chord names it, since typing
    /// `+` or `[` already needs it on many layouts.
    fn matches(&self, ev: &KeyEvent) -> bool {
        if self.code != ev.code {
            return false;
        }
        let strict = KeyModifiers::CONTROL | KeyModifiers::ALT;
        if (self.modifiers & strict) != (ev.modifiers & strict) {
            return false;
        }
        !self.modifiers.contains(KeyModifiers::SHIFT) || ev.modifiers.contains(KeyModifiers::SHIFT)
    }
}

/// Resolved key chords, ready for lookups in the event loop.
#[derive(Clone, Debug)]
pub struct Bindings {
    chords: Vec<(KeyChord, Action)>,
}

impl Bindings {
    pub fn action_for(&self, ev: &KeyEvent) -> Option<Action> {
        // Chords with modifiers first so "ctrl+s" is not shadowed by "s".
        self.chords
            .iter()
            .filter(|(c, _)| !c.modifiers.is_empty())
            .chain(self.chords.iter().filter(|(c, _)| c.modifiers.is_empty()))
            .find(|(c, _)| c.matches(ev))
            .map(|(_, a)| *a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn default_bindings_resolve() {
        let b = Keymap::default().resolve().unwrap();
        let plain = |c| key(KeyCode::Char(c), KeyModifiers::NONE);
        assert_eq!(b.action_for(&plain('f')), Some(Action::Faster));
        assert_eq!(b.action_for(&plain('s')), Some(Action::Slower));
        assert_eq!(
            b.action_for(&key(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Some(Action::Save)
        );
        assert_eq!(
            b.action_for(&key(KeyCode::Up, KeyModifiers::NONE)),
            Some(Action::FewerRows)
        );
        assert_eq!(
            b.action_for(&key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(Action::Quit)
        );
        assert_eq!(b.action_for(&plain('z')), None);
    }

    #[test]
    fn shift_is_ignored_unless_named() {
        let b = Keymap::default().resolve().unwrap();
        assert_eq!(
            b.action_for(&key(KeyCode::Char('+'), KeyModifiers::SHIFT)),
            Some(Action::MoreSpawns)
        );
        assert_eq!(
            b.action_for(&key(KeyCode::Char('='), KeyModifiers::SHIFT)),
            Some(Action::MoreSpawns)
        );
        assert_eq!(b.action_for(&key(KeyCode::Char('='), KeyModifiers::NONE)), None);
    }

    #[test]
    fn ctrl_must_match_exactly() {
        let b = Keymap::default().resolve().unwrap();
        assert_eq!(
            b.action_for(&key(KeyCode::Char('f'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert!(KeyChord::parse("hyper+x").is_err());
        assert!(KeyChord::parse("pagedown").is_err());
        assert!(KeyChord::parse("").is_err());
        assert_eq!(
            KeyChord::parse("+").unwrap(),
            KeyChord {
                code: KeyCode::Char('+'),
                modifiers: KeyModifiers::NONE
            }
        );
    }

    #[test]
    fn remapped_keys_replace_defaults() {
        let mut km = Keymap::default();
        km.bind(Action::Faster, vec!["ctrl+up".to_string()]);
        let b = km.resolve().unwrap();
        assert_eq!(
            b.action_for(&key(KeyCode::Char('f'), KeyModifiers::NONE)),
            None
        );
        assert_eq!(
            b.action_for(&key(KeyCode::Up, KeyModifiers::CONTROL)),
            Some(Action::Faster)
        );
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let km: Keymap = serde_json::from_str(r#"{ "pause": ["space"] }"#).unwrap();
        assert_eq!(km.keys(Action::Pause), ["space".to_string()]);
        assert_eq!(km.keys(Action::Faster), ["f".to_string()]);
    }

    #[test]
    fn speed_controls_scale_frame_interval() {
        let mut cfg = RainConfig::default();
        Action::Faster.apply(&mut cfg);
        assert!((cfg.frame_interval - 0.06 * 0.95).abs() < 1e-12);
        let mut cfg = RainConfig::default();
        Action::Slower.apply(&mut cfg);
        assert!((cfg.frame_interval - 0.06 * 1.1).abs() < 1e-12);
    }

    #[test]
    fn adjustments_stay_valid_at_the_edges() {
        let mut cfg = RainConfig {
            rows: 1,
            columns: 1,
            new_sequence_chance: 1.0,
            background_chance: 1.0,
            frame_interval: MIN_FRAME_INTERVAL,
            ..RainConfig::default()
        };
        for action in [
            Action::FewerRows,
            Action::FewerColumns,
            Action::MoreSpawns,
            Action::MoreBackground,
            Action::Faster,
        ] {
            for _ in 0..50 {
                action.apply(&mut cfg);
            }
        }
        assert_eq!((cfg.rows, cfg.columns), (1, 1));
        assert_eq!(cfg.new_sequence_chance, 1.0);
        assert_eq!(cfg.background_chance, 1.0);
        assert_eq!(cfg.frame_interval, MIN_FRAME_INTERVAL);
        cfg.validate().unwrap();

        for _ in 0..500 {
            Action::FewerSpawns.apply(&mut cfg);
            Action::FewerBackground.apply(&mut cfg);
        }
        assert_eq!(cfg.new_sequence_chance, MIN_SPAWN_CHANCE);
        assert_eq!(cfg.background_chance, 0.0);
        cfg.validate().unwrap();
    }

    #[test]
    fn scheme_and_glyph_actions() {
        let mut cfg = RainConfig::default();
        Action::SchemeRed.apply(&mut cfg);
        assert_eq!(cfg.primary_colors, ColorScheme::Red.anchors());
        Action::NeutralHead.apply(&mut cfg);
        assert_eq!(cfg.primary_colors[0], crate::palette::Anchor::NEUTRAL_HEAD);
        Action::BinaryGlyphs.apply(&mut cfg);
        assert_eq!(cfg.character_set, vec!['0', '1']);
        assert_eq!(Action::Pause.apply(&mut cfg), Outcome::TogglePause);
        assert_eq!(Action::Quit.apply(&mut cfg), Outcome::Quit);
    }
}
