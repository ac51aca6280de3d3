use serde::Serialize;
use std::collections::BTreeMap;

/// count / mean / sample std / min / max over one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1). Zero when n < 2.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

pub fn summarize(values: &[f64]) -> Option<Summary> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let std = if n < 2 {
        0.0
    } else {
        (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(Summary {
        n,
        mean,
        std,
        min,
        max,
    })
}

pub fn mean(values: &[f64]) -> Option<f64> {
    summarize(values).map(|s| s.mean)
}

/// Share of `true`, None for an empty group.
pub fn proportion(flags: &[bool]) -> Option<f64> {
    if flags.is_empty() {
        return None;
    }
    Some(flags.iter().filter(|b| **b).count() as f64 / flags.len() as f64)
}

/// Pearson correlation, None when either side has no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}

/// Collects values per group key; output is ordered by key.
pub struct Aggregator<K: Ord> {
    values: BTreeMap<K, Vec<f64>>,
}

impl<K: Ord> Default for Aggregator<K> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> Aggregator<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: K, v: f64) {
        self.values.entry(key).or_default().push(v);
    }

    pub fn push_flag(&mut self, key: K, flag: bool) {
        self.push(key, if flag { 1.0 } else { 0.0 });
    }

    pub fn finish(&self) -> Vec<(K, Summary)> {
        self.values
            .iter()
            .filter_map(|(k, vs)| summarize(vs).map(|s| (k.clone(), s)))
            .collect()
    }

    pub fn get(&self, key: &K) -> Option<Summary> {
        self.values.get(key).and_then(|vs| summarize(vs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_and_range() {
        let s = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.n, 8);
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!((s.min, s.max), (2.0, 9.0));
        assert_eq!(summarize(&[3.0]).unwrap().std, 0.0);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn aggregator_orders_by_key() {
        let mut agg = Aggregator::new();
        agg.push("physical", 1.0);
        agg.push("dark", 3.0);
        agg.push_flag("dark", true);
        let out = agg.finish();
        assert_eq!(out[0].0, "dark");
        assert_eq!(out[0].1.mean, 2.0);
        assert_eq!(out[1].0, "physical");
    }

    #[test]
    fn proportions_and_correlation() {
        assert_eq!(proportion(&[true, false, true, true]), Some(0.75));
        assert_eq!(proportion(&[]), None);
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!(pearson(&[1.0, 1.0], &[1.0, 2.0]).is_none());
    }
}
