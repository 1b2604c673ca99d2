// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::gradient::GradientCache;
use crate::palette::push_styled_glyph;
use crate::runtime::VisibilityPriority;
use crate::sequence::{Brightness, Sequence, SerialCounter};
use crate::settings::RainConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnUpdate {
    pub spawned: bool,
    pub retired: usize,
}

/// The streaks sharing one horizontal slot, kept in ascending serial
/// (creation) order.
#[derive(Clone, Debug, Default)]
pub struct Column {
    sequences: Vec<Sequence>,
}

impl Column {
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[allow(dead_code)]
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn push(&mut self, seq: Sequence) {
        let at = self.sequences.partition_point(|s| s.serial <= seq.serial);
        self.sequences.insert(at, seq);
    }

    /// The newest streak; it gates overlap spawns.
    pub fn leading(&self) -> Option<&Sequence> {
        self.sequences.iter().max_by_key(|s| s.serial)
    }

    /// Advances one frame.
    ///
    /// An empty column spawns with `new_sequence_chance` and does nothing
    /// else. Otherwise every streak advances, streaks that left the screen
    /// are dropped, and once the newest streak has cleared the head
    /// gradient (`position >= primary_colors.len()`) another one may spawn
    /// with the same chance.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        config: &RainConfig,
        rng: &mut R,
        serials: &mut SerialCounter,
    ) -> ColumnUpdate {
        let mut outcome = ColumnUpdate::default();

        if self.sequences.is_empty() {
            if rng.random_bool(config.new_sequence_chance) {
                self.push(Sequence::spawn(config, rng, serials.issue()));
                outcome.spawned = true;
            }
            return outcome;
        }

        let before = self.sequences.len();
        let survivors: Vec<Sequence> = std::mem::take(&mut self.sequences)
            .into_iter()
            .filter_map(|mut seq| {
                seq.advance(config, rng);
                seq.is_retained(config.rows).then_some(seq)
            })
            .collect();
        outcome.retired = before - survivors.len();
        self.sequences = survivors;

        let lead_cleared = self
            .leading()
            .is_some_and(|lead| lead.position >= config.primary_colors.len() as f64);
        if lead_cleared && rng.random_bool(config.new_sequence_chance) {
            self.push(Sequence::spawn(config, rng, serials.issue()));
            outcome.spawned = true;
        }

        outcome
    }

    /// Index of the streak drawn at `row`, if any.
    ///
    /// Primary streaks beat background ones and brighter backgrounds beat
    /// dimmer ones. Equal brightness goes to the newest streak under
    /// `Higher` priority and to the oldest under `Lower`.
    pub fn visible_at(&self, row: i64, priority: VisibilityPriority) -> Option<usize> {
        let mut best: Option<(usize, Brightness)> = None;
        let mut consider = |idx: usize, seq: &Sequence| -> bool {
            if !seq.covers(row) {
                return false;
            }
            let brightness = seq.colors.brightness;
            if best.map_or(true, |(_, b)| brightness.outranks(b)) {
                best = Some((idx, brightness));
            }
            brightness == Brightness::Primary
        };

        match priority {
            VisibilityPriority::Higher => {
                for (idx, seq) in self.sequences.iter().enumerate().rev() {
                    if consider(idx, seq) {
                        break;
                    }
                }
            }
            VisibilityPriority::Lower => {
                for (idx, seq) in self.sequences.iter().enumerate() {
                    if consider(idx, seq) {
                        break;
                    }
                }
            }
        }

        best.map(|(idx, _)| idx)
    }

    /// Appends the cell for `row` to `out`: a styled glyph or one blank.
    pub fn render_cell(
        &mut self,
        row: i64,
        config: &RainConfig,
        cache: &mut GradientCache,
        out: &mut String,
    ) {
        let Some(idx) = self.visible_at(row, config.visibility_priority) else {
            out.push(' ');
            return;
        };
        let seq = &mut self.sequences[idx];
        let display_index = (seq.head_row() - row) as usize;
        let anchor = seq.color_at(display_index, cache);
        push_styled_glyph(out, seq.characters[display_index], anchor, config.color_mode);
    }
}
