//! Frame outcome resolution.

use std::cmp::Ordering;

use crate::{record::FrameRecord, types::Player};

/// Winner implied by two scores alone; equal scores (0-0 included) decide nothing.
pub fn score_winner(score_a: u32, score_b: u32) -> Option<Player> {
    match score_a.cmp(&score_b) {
        Ordering::Greater => Some(Player::A),
        Ordering::Less => Some(Player::B),
        Ordering::Equal => None,
    }
}

/// Resolves who won a frame.
///
/// An explicit winner is returned verbatim, even when it contradicts the
/// scores. Without one the higher score wins and a level frame is undecided.
pub fn frame_winner(frame: &FrameRecord) -> Option<Player> {
    frame
        .winner
        .or_else(|| score_winner(frame.score_a, frame.score_b))
}

/// True when [`frame_winner`] names a player.
pub fn is_decided(frame: &FrameRecord) -> bool {
    frame_winner(frame).is_some()
}
