//! The selection pipeline, from a finalized screen shape to a region summary.
//!
//! ```text
//! SelectionShape
//!   └─> SelectionMatcher        (screen membership)
//!       └─> sample_surface      (jittered grid of camera rays)
//!           └─> aggregate_faces (hit counts, retention threshold)
//!               └─> extract_patch (all three vertices inside the shape, vertex dedup)
//!                   └─> build_summary (classification, downsampling)
//! ```

pub mod aggregator;
pub mod classifier;
pub mod extractor;
pub mod hit;
pub mod matcher;
pub mod pipeline;
pub mod sampler;
pub mod shape;
pub mod summary;
