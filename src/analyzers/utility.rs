use std::collections::HashMap;
use std::hash::Hash;

/// Rounds half up to `decimals` places, the way score sheets do.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

/// Whole-number percentage of `part` in `total`. Returns 0 for an empty total.
pub fn pct(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    round_to(part as f64 / total as f64 * 100.0, 0) as u32
}

/// `(positive - negative) / total` rounded to two decimals. Returns 0.0 for an empty total.
pub fn efficiency(positive: u32, negative: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to((positive as f64 - negative as f64) / total as f64, 2)
}

/// Counts occurrences while remembering the order keys were first seen.
#[derive(Debug, Clone)]
pub struct FrequencyCounter<K> {
    entries: Vec<(K, u32)>,
    index: HashMap<K, usize>,
}

impl<K> Default for FrequencyCounter<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> FrequencyCounter<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn count(&self, key: &K) -> u32 {
        self.index.get(key).map_or(0, |&i| self.entries[i].1)
    }

    /// The `n` most frequent keys; equal counts keep first-seen order.
    pub fn top(&self, n: usize) -> Vec<(K, u32)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
