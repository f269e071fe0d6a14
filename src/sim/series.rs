//! Alignment of demand and renewable profiles onto one interval grid.

use std::collections::BTreeMap;

use super::types::GenerationProfiles;

/// Demand and renewable components for a single interval (kW).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntervalInput {
    pub demand_kw: f64,
    pub pv_kw: f64,
    pub wind_kw: f64,
    /// All additional named sources, summed.
    pub other_kw: f64,
}

impl IntervalInput {
    /// Total renewable power available in the interval.
    pub fn renewables_kw(&self) -> f64 {
        self.pv_kw + self.wind_kw + self.other_kw
    }
}

/// Demand and renewable series padded or truncated to the demand length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedSeries {
    demand_kw: Vec<f64>,
    pv_kw: Vec<f64>,
    wind_kw: Vec<f64>,
    other_kw: Vec<f64>,
}

impl AlignedSeries {
    /// Aligns every profile to `demand_kw.len()` intervals.
    ///
    /// Each source is zero-padded beyond its own length; entries past the
    /// demand length are ignored. Named sources are summed in name order so
    /// repeated runs are bit-identical.
    pub fn align(demand_kw: &[f64], generation: Option<&GenerationProfiles>) -> Self {
        let n = demand_kw.len();
        let pv = generation.and_then(|g| g.pv.as_deref());
        let wind = generation.and_then(|g| g.wind.as_deref());
        let other = generation.and_then(|g| g.other.as_ref());
        Self {
            demand_kw: demand_kw.to_vec(),
            pv_kw: padded(pv, n),
            wind_kw: padded(wind, n),
            other_kw: sum_named(other, n),
        }
    }

    pub fn len(&self) -> usize {
        self.demand_kw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.demand_kw.is_empty()
    }

    /// Inputs for interval `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<IntervalInput> {
        Some(IntervalInput {
            demand_kw: *self.demand_kw.get(i)?,
            pv_kw: self.pv_kw[i],
            wind_kw: self.wind_kw[i],
            other_kw: self.other_kw[i],
        })
    }

    /// Iterates the intervals in order.
    pub fn iter(&self) -> impl Iterator<Item = IntervalInput> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}

fn padded(values: Option<&[f64]>, n: usize) -> Vec<f64> {
    let values = values.unwrap_or_default();
    (0..n).map(|i| values.get(i).copied().unwrap_or(0.0)).collect()
}

fn sum_named(sources: Option<&BTreeMap<String, Vec<f64>>>, n: usize) -> Vec<f64> {
    let mut acc = vec![0.0; n];
    for values in sources.into_iter().flat_map(BTreeMap::values) {
        for (slot, v) in acc.iter_mut().zip(values) {
            *slot += v;
        }
    }
    acc
}
