//! Defaults offered to whoever enters the next frame, match, or season.

use crate::{
    record::MatchRecord,
    types::{FrameNo, Player, Season},
};

/// Player expected to break off in `frame_no`: the match's first breaker on
/// odd frames, the opponent on even ones.
pub fn suggested_breaker(m: &MatchRecord, frame_no: FrameNo) -> Option<Player> {
    let first = m.first_breaker?;
    if frame_no % 2 == 1 {
        Some(first)
    } else {
        Some(first.other())
    }
}

/// First breaker for a new match: whoever did not break off in the most
/// recent match that recorded a first breaker.
pub fn suggested_first_breaker(matches: &[MatchRecord]) -> Option<Player> {
    matches
        .iter()
        .filter(|m| m.first_breaker.is_some())
        .max_by_key(|m| (m.date, m.id))
        .and_then(|m| m.first_breaker)
        .map(Player::other)
}

/// Distinct seasons, newest first. When none are known, offers `span`
/// seasons counting down from the year after `current_year`.
pub fn season_choices(
    known: impl IntoIterator<Item = Season>,
    current_year: Season,
    span: u32,
) -> Vec<Season> {
    let mut seasons: Vec<Season> = known.into_iter().collect();
    seasons.sort_unstable_by(|a, b| b.cmp(a));
    seasons.dedup();
    if seasons.is_empty() {
        let top = current_year + 1;
        seasons = (0..span as Season).map(|offset| top - offset).collect();
    }
    seasons
}
