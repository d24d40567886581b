use super::hit::{FaceHitCount, FaceRef, SurfaceHit};
use crate::engine::assets::selection_config::AggregationSettings;
use std::collections::HashMap;

/// Per-face hit counts and the faces that survived noise rejection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceAggregation {
    /// Every observed face, in first-hit order.
    pub counts: Vec<FaceHitCount>,
    pub max_hits: u32,
    pub threshold: u32,
    /// Retained faces, in first-hit order.
    pub retained: Vec<FaceHitCount>,
    /// Nothing met the threshold, so every observed face was kept.
    pub fell_back: bool,
}

impl FaceAggregation {
    /// Retained faces by descending hit count. Ties keep first-hit order.
    pub fn ranked(&self) -> Vec<&FaceHitCount> {
        let mut ranked: Vec<&FaceHitCount> = self.retained.iter().collect();
        ranked.sort_by(|a, b| b.hits.cmp(&a.hits));
        ranked
    }
}

/// `max(min_hits, floor(max_hits * fraction))` once any face was hit twice, otherwise 1.
pub fn retention_threshold(max_hits: u32, settings: &AggregationSettings) -> u32 {
    if max_hits < 2 {
        return 1;
    }
    let scaled = (max_hits as f32 * settings.retention_fraction).floor() as u32;
    scaled.max(settings.retention_min_hits).max(1)
}

pub fn aggregate_faces(hits: &[SurfaceHit], settings: &AggregationSettings) -> FaceAggregation {
    let mut counts: Vec<FaceHitCount> = Vec::new();
    let mut slots: HashMap<FaceRef, usize> = HashMap::new();
    for hit in hits {
        let face = hit.face();
        match slots.get(&face) {
            Some(&slot) => counts[slot].hits += 1,
            None => {
                slots.insert(face.clone(), counts.len());
                counts.push(FaceHitCount { face, hits: 1 });
            }
        }
    }

    let max_hits = counts.iter().map(|count| count.hits).max().unwrap_or(0);
    let threshold = retention_threshold(max_hits, settings);
    let mut retained: Vec<FaceHitCount> =
        counts.iter().filter(|count| count.hits >= threshold).cloned().collect();
    let fell_back = retained.is_empty() && !counts.is_empty();
    if fell_back {
        retained = counts.clone();
    }

    FaceAggregation {
        counts,
        max_hits,
        threshold,
        retained,
        fell_back,
    }
}
