//! Active-frame derivation.
//!
//! The active frame is never stored; it is recomputed from whatever frame
//! rows the caller currently holds.

use crate::{
    record::FrameRecord,
    types::FrameNo,
};

use super::outcome::is_decided;

/// Returns the frames ordered by frame number, whatever order they arrived in.
pub fn ordered_frames(frames: &[FrameRecord]) -> Vec<&FrameRecord> {
    let mut sorted: Vec<&FrameRecord> = frames.iter().collect();
    sorted.sort_by_key(|f| f.frame_no);
    sorted
}

/// Highest-numbered frame without a determinable winner.
///
/// Lower undecided frames (skipped placeholders) do not block a later one
/// from being active.
pub fn find_active_frame(frames: &[FrameRecord]) -> Option<&FrameRecord> {
    ordered_frames(frames)
        .into_iter()
        .rev()
        .find(|f| !is_decided(f))
}

/// Number for the next frame to create: one past the highest, or 1.
pub fn next_frame_number(frames: &[FrameRecord]) -> FrameNo {
    frames
        .iter()
        .map(|f| f.frame_no)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}
