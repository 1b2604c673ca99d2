// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, trace};

use crate::column::Column;
use crate::gradient::{CacheStats, GradientCache};
use crate::sequence::SerialCounter;
use crate::settings::RainConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub live: usize,
    pub spawned: usize,
    pub retired: usize,
}

/// The whole rain field. Owns every column and, through them, every streak.
///
/// Nothing about sizes, speeds or chances is stored here; each call reads
/// the config it is given. The column count follows `config.columns` at
/// the start of every `advance`/`render`.
#[derive(Debug)]
pub struct Grid {
    columns: Vec<Column>,
    rng: StdRng,
    gradients: GradientCache,
    serials: SerialCounter,
    stats: FrameStats,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            columns: Vec::new(),
            rng,
            gradients: GradientCache::default(),
            serials: SerialCounter::default(),
            stats: FrameStats::default(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[allow(dead_code)]
    pub fn column_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn gradient_stats(&self) -> CacheStats {
        self.gradients.stats()
    }

    /// Appends empty columns or drops columns from the right.
    pub fn resize(&mut self, columns: u16) {
        let want = usize::from(columns);
        if want == self.columns.len() {
            return;
        }
        debug!(from = self.columns.len(), to = want, "resizing grid");
        self.columns.resize_with(want, Column::default);
    }

    /// Drops every streak.
    pub fn clear(&mut self) {
        for col in &mut self.columns {
            *col = Column::default();
        }
    }

    fn is_spacer(config: &RainConfig, index: usize) -> bool {
        config.space_between_columns && index % 2 == 1
    }

    /// Advances the whole field by one frame.
    pub fn advance(&mut self, config: &RainConfig) {
        self.resize(config.columns);

        let mut stats = FrameStats {
            frame: self.stats.frame + 1,
            ..FrameStats::default()
        };
        for (i, col) in self.columns.iter_mut().enumerate() {
            if Self::is_spacer(config, i) {
                continue;
            }
            let outcome = col.update(config, &mut self.rng, &mut self.serials);
            stats.spawned += usize::from(outcome.spawned);
            stats.retired += outcome.retired;
            stats.live += col.len();
        }
        self.stats = stats;

        trace!(
            frame = stats.frame,
            live = stats.live,
            spawned = stats.spawned,
            retired = stats.retired,
            "advanced"
        );
    }

    /// Rasterizes the field into `config.rows` lines of `config.columns`
    /// cells each, top to bottom.
    pub fn render(&mut self, config: &RainConfig) -> Vec<String> {
        self.resize(config.columns);

        let mut lines = Vec::with_capacity(usize::from(config.rows));
        for row in 0..config.rows {
            let mut line = String::with_capacity(self.columns.len() * 4);
            for (i, col) in self.columns.iter_mut().enumerate() {
                if col.is_empty() || Self::is_spacer(config, i) {
                    line.push(' ');
                    continue;
                }
                col.render_cell(i64::from(row), config, &mut self.gradients, &mut line);
            }
            lines.push(line);
        }
        lines
    }
}
