// Copyright (c) 2026 rezky_nightky

//! Gradient extension: stretches a short list of anchor colors over an
//! arbitrary number of cells, plus a small LRU cache of the results.

use std::collections::HashMap;
use std::sync::Arc;

use crate::palette::Anchor;

pub const DEFAULT_CAPACITY: usize = 250;

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let a = f64::from(a);
    let b = f64::from(b);
    (a * (1.0 - t) + b * t).round_ties_even().clamp(0.0, 255.0) as u8
}

/// Piecewise-linear interpolation of `anchors` into `len` colors.
///
/// Index 0 maps to the first anchor and `len - 1` to the last. Only the
/// first output entry may be bold, and only if the first anchor is.
/// For `len <= 1` the anchors are returned unchanged.
pub fn extend(anchors: &[Anchor], len: usize) -> Vec<Anchor> {
    if len <= 1 || anchors.is_empty() {
        return anchors.to_vec();
    }

    let last = anchors.len() - 1;
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let t = i as f64 / (len - 1) as f64;
        let pos = t * last as f64;
        let idx = (pos.floor() as usize).min(last);
        let frac = if idx < last { pos - idx as f64 } else { 1.0 };
        let a = anchors[idx];
        let b = anchors[(idx + 1).min(last)];
        out.push(Anchor {
            r: lerp_u8(a.r, b.r, frac),
            g: lerp_u8(a.g, b.g, frac),
            b: lerp_u8(a.b, b.b, frac),
            bold: i == 0 && anchors[0].bold,
        });
    }
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    anchors: Vec<Anchor>,
    len: usize,
}

#[derive(Debug)]
struct CachedGradient {
    colors: Arc<[Anchor]>,
    last_used: u64,
}

/// Memoizes [`extend`] keyed by `(anchors, len)`, evicting the least
/// recently used entry once `capacity` is exceeded.
#[derive(Debug)]
pub struct GradientCache {
    entries: HashMap<GradientKey, CachedGradient>,
    capacity: usize,
    clock: u64,
    stats: CacheStats,
}

impl Default for GradientCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl GradientCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(DEFAULT_CAPACITY) + 1),
            capacity: capacity.max(1),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn extend(&mut self, anchors: &[Anchor], len: usize) -> Arc<[Anchor]> {
        self.clock += 1;
        let key = GradientKey {
            anchors: anchors.to_vec(),
            len,
        };

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_used = self.clock;
            self.stats.hits += 1;
            return Arc::clone(&entry.colors);
        }

        self.stats.misses += 1;
        let colors: Arc<[Anchor]> = extend(anchors, len).into();
        self.entries.insert(
            key,
            CachedGradient {
                colors: Arc::clone(&colors),
                last_used: self.clock,
            },
        );
        while self.entries.len() > self.capacity {
            self.evict_lru();
        }
        colors
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.stats.evictions += 1;
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stops() -> Vec<Anchor> {
        vec![Anchor::bold(0, 200, 0), Anchor::rgb(0, 0, 0)]
    }

    #[test]
    fn extend_interpolates_between_stops() {
        let out = extend(&two_stops(), 3);
        assert_eq!(
            out,
            vec![
                Anchor::bold(0, 200, 0),
                Anchor::rgb(0, 100, 0),
                Anchor::rgb(0, 0, 0)
            ]
        );
    }

    #[test]
    fn extend_keeps_bold_only_on_first_entry() {
        let out = extend(&two_stops(), 6);
        assert!(out[0].bold);
        assert!(out[1..].iter().all(|a| !a.bold));
    }

    #[test]
    fn extend_degenerate_lengths_return_anchors() {
        let anchors = two_stops();
        assert_eq!(extend(&anchors, 1), anchors);
        assert_eq!(extend(&anchors, 0), anchors);
    }

    #[test]
    fn extend_same_length_matches_endpoints() {
        let anchors = vec![
            Anchor::bold(255, 255, 255),
            Anchor::rgb(0, 180, 0),
            Anchor::rgb(0, 90, 0),
            Anchor::rgb(0, 10, 0),
        ];
        let out = extend(&anchors, anchors.len());
        assert_eq!(out.len(), anchors.len());
        assert_eq!(out[0], anchors[0]);
        assert_eq!(out[anchors.len() - 1], anchors[anchors.len() - 1]);
        assert_eq!(out, anchors);
    }

    #[test]
    fn extend_single_anchor_repeats_it() {
        let out = extend(&[Anchor::rgb(10, 20, 30)], 4);
        assert_eq!(out, vec![Anchor::rgb(10, 20, 30); 4]);
    }

    #[test]
    fn cache_second_call_is_a_hit() {
        let mut cache = GradientCache::default();
        let first = cache.extend(&two_stops(), 7);
        let second = cache.extend(&two_stops(), 7);
        assert_eq!(first, second);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                evictions: 0
            }
        );
    }

    #[test]
    fn cache_evicts_least_recently_used() {
        let mut cache = GradientCache::new(2);
        let anchors = two_stops();
        cache.extend(&anchors, 2);
        cache.extend(&anchors, 3);
        // Touch len=2 so len=3 becomes the oldest.
        cache.extend(&anchors, 2);
        cache.extend(&anchors, 4);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 1);

        cache.extend(&anchors, 2);
        assert_eq!(cache.stats().hits, 2);
        cache.extend(&anchors, 3);
        assert_eq!(cache.stats().misses, 4);
    }
}
