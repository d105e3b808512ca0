// core/src/distance.rs
use crate::types::GeoSample;

/// Cumulative distance + ordered path of accepted fixes.
/// Incremental running sum, never recomputed from the full path.
///
/// The path may be split into segments (one per resume). No distance is
/// counted between the last fix of one segment and the first of the next.
#[derive(Debug, Clone, Default)]
pub struct DistanceAccumulator {
    distance_m: f64,
    path: Vec<GeoSample>,
    segment_starts: Vec<usize>,
}

impl DistanceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an accepted fix. `segment_m` is the filter's distance to the previous accepted fix.
    pub fn push(&mut self, sample: GeoSample, segment_m: f64) {
        if segment_m.is_finite() && segment_m > 0.0 {
            self.distance_m += segment_m;
        }
        self.path.push(sample);
    }

    /// Start a new path segment at `sample`; it adds no distance.
    pub fn push_segment_start(&mut self, sample: GeoSample) {
        if !self.path.is_empty() {
            self.segment_starts.push(self.path.len());
        }
        self.path.push(sample);
    }

    /// Path indices where a new segment begins (index 0 is implied).
    pub fn segment_starts(&self) -> &[usize] {
        &self.segment_starts
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn path(&self) -> &[GeoSample] {
        &self.path
    }

    pub fn last(&self) -> Option<&GeoSample> {
        self.path.last()
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}
