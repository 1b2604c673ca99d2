// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;
use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::gradient::GradientCache;
use crate::palette::Anchor;
use crate::settings::RainConfig;

/// How bright a streak's color set is relative to the primary colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Brightness {
    Primary,
    /// Dimmed set with its brightness multiplier.
    Background(f64),
}

impl Brightness {
    /// Whether a streak of this brightness is drawn over one of `other`.
    /// Equal brightness never outranks.
    pub fn outranks(self, other: Brightness) -> bool {
        match (self, other) {
            (Brightness::Primary, Brightness::Background(_)) => true,
            (Brightness::Background(a), Brightness::Background(b)) => a > b,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColorSet {
    pub anchors: Arc<[Anchor]>,
    pub brightness: Brightness,
}

impl ColorSet {
    pub fn primary(anchors: &[Anchor]) -> Self {
        Self {
            anchors: anchors.into(),
            brightness: Brightness::Primary,
        }
    }

    pub fn background(anchors: &[Anchor], level: f64) -> Self {
        Self {
            anchors: anchors.into(),
            brightness: Brightness::Background(level),
        }
    }
}

/// Hands out creation-order keys; a larger serial means a newer streak.
#[derive(Debug, Default)]
pub struct SerialCounter(u64);

impl SerialCounter {
    pub fn issue(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

fn random_glyph<R: Rng + ?Sized>(config: &RainConfig, rng: &mut R) -> char {
    *config
        .character_set
        .choose(rng)
        .expect("character set must not be empty")
}

/// One falling streak. `characters[0]` is the head (lowest on screen,
/// brightest); the last entry is the tail.
#[derive(Clone, Debug)]
pub struct Sequence {
    pub characters: VecDeque<char>,
    /// Row of the head. Fractional so slow streaks move every few frames.
    pub position: f64,
    pub speed: f64,
    pub colors: ColorSet,
    pub serial: u64,
    gradient: Option<Arc<[Anchor]>>,
}

impl Sequence {
    pub fn new(characters: impl IntoIterator<Item = char>, speed: f64, colors: ColorSet) -> Self {
        Self {
            characters: characters.into_iter().collect(),
            position: 0.0,
            speed,
            colors,
            serial: 0,
            gradient: None,
        }
    }

    pub fn spawn<R: Rng + ?Sized>(config: &RainConfig, rng: &mut R, serial: u64) -> Self {
        let len = rng.random_range(config.min_length..=config.max_length);
        let characters: VecDeque<char> = (0..len).map(|_| random_glyph(config, rng)).collect();
        let speed = rng.random_range(config.min_speed..=config.max_speed);

        let backgrounds = config.background_color_sets();
        let colors = if !backgrounds.is_empty() && rng.random_bool(config.background_chance) {
            let (level, anchors) = &backgrounds[rng.random_range(0..backgrounds.len())];
            ColorSet::background(anchors, *level)
        } else {
            ColorSet::primary(&config.primary_colors)
        };

        Self {
            characters,
            position: 0.0,
            speed,
            colors,
            serial,
            gradient: None,
        }
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn head_row(&self) -> i64 {
        self.position.round_ties_even() as i64
    }

    pub fn top_row(&self) -> i64 {
        self.head_row() - self.len() as i64 + 1
    }

    pub fn covers(&self, row: i64) -> bool {
        (self.top_row()..=self.head_row()).contains(&row)
    }

    /// Moves the streak down by `speed` rows.
    ///
    /// In shift mode a fresh glyph enters at the head whenever the rounded
    /// head row changes; only one per frame, however many rows were skipped.
    pub fn advance<R: Rng + ?Sized>(&mut self, config: &RainConfig, rng: &mut R) {
        let next = self.position + self.speed;

        if config.shift_mode && self.head_row() != next.round_ties_even() as i64 {
            self.characters.pop_back();
            self.characters.push_front(random_glyph(config, rng));
        }

        if config.mid_sequence_mutation_chance > 0.0 {
            for i in 1..self.characters.len() {
                if rng.random_bool(config.mid_sequence_mutation_chance) {
                    self.characters[i] = random_glyph(config, rng);
                }
            }
        }

        self.position = next;
    }

    /// False once the whole streak has scrolled past the bottom row.
    pub fn is_retained(&self, rows: u16) -> bool {
        self.position <= f64::from(rows) + self.len() as f64
    }

    pub fn gradient(&mut self, cache: &mut GradientCache) -> Arc<[Anchor]> {
        let len = self.characters.len();
        let anchors = &self.colors.anchors;
        Arc::clone(
            self.gradient
                .get_or_insert_with(|| cache.extend(anchors, len)),
        )
    }

    /// Color for the glyph `display_index` cells above the head.
    pub fn color_at(&mut self, display_index: usize, cache: &mut GradientCache) -> Anchor {
        let gradient = self.gradient(cache);
        let span = self.len().saturating_sub(1).max(1);
        let idx = gradient.len().saturating_sub(1) * display_index / span;
        gradient
            .get(idx.min(gradient.len().saturating_sub(1)))
            .copied()
            .unwrap_or(Anchor::NEUTRAL_HEAD)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn still_config() -> RainConfig {
        RainConfig {
            character_set: vec!['Z'],
            shift_mode: false,
            mid_sequence_mutation_chance: 0.0,
            ..RainConfig::default()
        }
    }

    fn abc(speed: f64) -> Sequence {
        Sequence::new(
            ['A', 'B', 'C'],
            speed,
            ColorSet::primary(&RainConfig::default().primary_colors),
        )
    }

    #[test]
    fn spawn_respects_length_and_speed_ranges() {
        let cfg = RainConfig {
            min_length: 3,
            max_length: 7,
            min_speed: 0.25,
            max_speed: 2.0,
            ..RainConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        for serial in 0..200 {
            let seq = Sequence::spawn(&cfg, &mut rng, serial);
            assert!((3..=7).contains(&seq.len()));
            assert!(seq.speed >= 0.25 && seq.speed <= 2.0);
            assert_eq!(seq.position, 0.0);
            assert_eq!(seq.serial, serial);
            assert!(seq.characters.iter().all(|c| cfg.character_set.contains(c)));
        }
    }

    #[test]
    fn spawn_without_background_chance_uses_primary_colors() {
        let cfg = RainConfig {
            background_chance: 0.0,
            ..RainConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        for serial in 0..50 {
            let seq = Sequence::spawn(&cfg, &mut rng, serial);
            assert_eq!(seq.colors.brightness, Brightness::Primary);
        }
    }

    #[test]
    fn spawn_with_full_background_chance_uses_a_dimmed_set() {
        let cfg = RainConfig {
            background_chance: 1.0,
            background_levels: vec![0.5],
            ..RainConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        let seq = Sequence::spawn(&cfg, &mut rng, 1);
        assert_eq!(seq.colors.brightness, Brightness::Background(0.5));
        assert_eq!(
            &*seq.colors.anchors,
            cfg.background_color_sets()[0].1.as_slice()
        );
    }

    #[test]
    fn advance_moves_by_exactly_speed() {
        let cfg = still_config();
        let mut rng = StdRng::seed_from_u64(3);
        let mut seq = abc(0.37);
        seq.position = 4.5;
        seq.advance(&cfg, &mut rng);
        assert_eq!(seq.position, 4.5 + 0.37);
        seq.advance(&cfg, &mut rng);
        assert_eq!(seq.position, 4.5 + 0.37 + 0.37);
    }

    #[test]
    fn shift_mode_inserts_new_head_when_row_changes() {
        let cfg = RainConfig {
            shift_mode: true,
            ..still_config()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let mut seq = abc(1.0);
        seq.advance(&cfg, &mut rng);
        assert_eq!(seq.characters, ['Z', 'A', 'B']);
    }

    #[test]
    fn shift_mode_waits_for_whole_row() {
        let cfg = RainConfig {
            shift_mode: true,
            ..still_config()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut seq = abc(0.3);
        seq.advance(&cfg, &mut rng);
        assert_eq!(seq.characters, ['A', 'B', 'C']);
    }

    #[test]
    fn fast_streak_shifts_only_one_glyph_per_frame() {
        let cfg = RainConfig {
            shift_mode: true,
            ..still_config()
        };
        let mut rng = StdRng::seed_from_u64(6);
        let mut seq = abc(3.0);
        seq.advance(&cfg, &mut rng);
        assert_eq!(seq.characters, ['Z', 'A', 'B']);
    }

    #[test]
    fn fixed_mode_keeps_glyphs() {
        let cfg = still_config();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seq = abc(1.0);
        seq.advance(&cfg, &mut rng);
        assert_eq!(seq.characters, ['A', 'B', 'C']);
    }

    #[test]
    fn mutation_never_touches_head() {
        let cfg = RainConfig {
            mid_sequence_mutation_chance: 1.0,
            ..still_config()
        };
        let mut rng = StdRng::seed_from_u64(8);
        let mut seq = abc(1.0);
        seq.advance(&cfg, &mut rng);
        assert_eq!(seq.characters, ['A', 'Z', 'Z']);
    }

    #[test]
    fn coverage_spans_head_to_tail() {
        let mut seq = abc(1.0);
        seq.position = 2.0;
        assert_eq!(seq.head_row(), 2);
        assert_eq!(seq.top_row(), 0);
        assert!(seq.covers(0) && seq.covers(2));
        assert!(!seq.covers(-1) && !seq.covers(3));
    }

    #[test]
    fn retention_boundary() {
        let mut seq = abc(1.0);
        seq.position = 13.0;
        assert!(seq.is_retained(10));
        seq.position = 13.5;
        assert!(!seq.is_retained(10));
    }

    #[test]
    fn single_glyph_streak_colors_without_dividing_by_zero() {
        let mut cache = GradientCache::default();
        let anchors = [Anchor::bold(1, 2, 3), Anchor::rgb(0, 0, 0)];
        let mut seq = Sequence::new(['X'], 1.0, ColorSet::primary(&anchors));
        assert_eq!(seq.color_at(0, &mut cache), anchors[0]);
    }

    #[test]
    fn gradient_is_computed_once_per_streak() {
        let mut cache = GradientCache::default();
        let mut seq = abc(1.0);
        seq.color_at(0, &mut cache);
        seq.color_at(1, &mut cache);
        seq.color_at(2, &mut cache);
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn brightness_ranking() {
        assert!(Brightness::Primary.outranks(Brightness::Background(0.9)));
        assert!(!Brightness::Background(0.9).outranks(Brightness::Primary));
        assert!(Brightness::Background(0.6).outranks(Brightness::Background(0.3)));
        assert!(!Brightness::Background(0.3).outranks(Brightness::Background(0.3)));
        assert!(!Brightness::Primary.outranks(Brightness::Primary));
    }
}
