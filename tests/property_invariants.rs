use chrono::NaiveDate;
use proptest::prelude::*;

use snookerlog::{
    engine::{
        active::{find_active_frame, next_frame_number},
        outcome::{frame_winner, score_winner},
        season::compute_season_stats,
        tally::{match_frame_tally, match_outcome},
    },
    record::{BreakRecord, FrameRecord, MatchRecord},
    types::{BestOf, BreakId, FrameId, MatchId, Player},
};

#[derive(Debug, Clone)]
struct Season {
    matches: Vec<MatchRecord>,
    frames: Vec<FrameRecord>,
    breaks: Vec<BreakRecord>,
}

fn player_strategy() -> impl Strategy<Value = Player> {
    prop_oneof![Just(Player::A), Just(Player::B)]
}

fn best_of_strategy() -> impl Strategy<Value = BestOf> {
    prop_oneof![Just(BestOf::Three), Just(BestOf::Five), Just(BestOf::Seven)]
}

type FrameSeed = (u32, u32, Option<Player>);
type MatchSeed = (BestOf, Option<Player>, u32, Vec<FrameSeed>, Vec<(Player, u32)>);

// Small scores keep compact best-of-3 entries reachable.
fn score_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![0u32..4, 0u32..120]
}

fn frame_seed() -> impl Strategy<Value = FrameSeed> {
    (
        score_strategy(),
        score_strategy(),
        proptest::option::weighted(0.2, player_strategy()),
    )
}

fn match_seed() -> impl Strategy<Value = MatchSeed> {
    (
        best_of_strategy(),
        proptest::option::weighted(0.15, player_strategy()),
        1u32..28,
        prop::collection::vec(frame_seed(), 0..7),
        prop::collection::vec((player_strategy(), 0u32..147), 0..5),
    )
}

fn build_season(seeds: Vec<MatchSeed>) -> Season {
    let mut season = Season {
        matches: Vec::new(),
        frames: Vec::new(),
        breaks: Vec::new(),
    };
    for (best_of, winner, day, frames, breaks) in seeds {
        let m = MatchRecord {
            id: MatchId::new(),
            season: 2024,
            date: NaiveDate::from_ymd_opt(2024, 2, day).expect("date"),
            best_of,
            first_breaker: None,
            winner,
            notes: None,
        };
        for (i, (a, b, w)) in frames.into_iter().enumerate() {
            season.frames.push(FrameRecord {
                id: FrameId::new(),
                match_id: m.id,
                season: m.season,
                frame_no: i as u32 + 1,
                score_a: a,
                score_b: b,
                winner: w,
                breaker: None,
            });
        }
        for (player, points) in breaks {
            season.breaks.push(BreakRecord {
                id: BreakId::new(),
                match_id: m.id,
                frame_id: None,
                season: m.season,
                player,
                points,
            });
        }
        season.matches.push(m);
    }
    season
}

fn season_strategy() -> impl Strategy<Value = Season> {
    prop::collection::vec(match_seed(), 0..8).prop_map(build_season)
}

fn shuffled_season() -> impl Strategy<Value = (Season, Season)> {
    season_strategy().prop_flat_map(|season| {
        let matches = Just(season.matches.clone()).prop_shuffle();
        let frames = Just(season.frames.clone()).prop_shuffle();
        let breaks = Just(season.breaks.clone()).prop_shuffle();
        (Just(season), (matches, frames, breaks)).prop_map(|(season, (matches, frames, breaks))| {
            (
                season,
                Season {
                    matches,
                    frames,
                    breaks,
                },
            )
        })
    })
}

proptest! {
    #[test]
    fn season_stats_ignore_arrival_order((original, shuffled) in shuffled_season()) {
        let expected = compute_season_stats(&original.matches, &original.frames, &original.breaks);
        let got = compute_season_stats(&shuffled.matches, &shuffled.frames, &shuffled.breaks);
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn active_frame_ignores_arrival_order((original, shuffled) in shuffled_season()) {
        for m in &original.matches {
            let own: Vec<FrameRecord> = original.frames.iter().filter(|f| f.match_id == m.id).cloned().collect();
            let own_shuffled: Vec<FrameRecord> = shuffled.frames.iter().filter(|f| f.match_id == m.id).cloned().collect();
            prop_assert_eq!(
                find_active_frame(&own).map(|f| f.id),
                find_active_frame(&own_shuffled).map(|f| f.id)
            );
            prop_assert_eq!(next_frame_number(&own), next_frame_number(&own_shuffled));
            prop_assert_eq!(match_outcome(m, &own), match_outcome(m, &shuffled.frames));
        }
    }

    #[test]
    fn season_totals_are_consistent(season in season_strategy()) {
        let stats = compute_season_stats(&season.matches, &season.frames, &season.breaks);
        let decided = season.frames.iter().filter(|f| frame_winner(f).is_some()).count() as u32;
        prop_assert_eq!(stats.a.frames + stats.b.frames, decided);
        prop_assert!(stats.a.matches + stats.b.matches <= season.matches.len() as u32);

        for player in Player::BOTH {
            let own: Vec<u32> = season
                .breaks
                .iter()
                .filter(|b| b.player == player && b.points >= 10)
                .map(|b| b.points)
                .collect();
            prop_assert_eq!(stats[player].ten_plus_breaks, own.len() as u32);
            prop_assert_eq!(stats[player].highest_break, own.iter().copied().max().unwrap_or(0));
        }

        for m in &season.matches {
            let tally = match_frame_tally(m, &season.frames);
            let own = season.frames.iter().filter(|f| f.match_id == m.id).count() as u32;
            prop_assert!(tally.a + tally.b <= own);
        }
    }

    #[test]
    fn score_winner_is_antisymmetric(a in 0u32..200, b in 0u32..200) {
        match score_winner(a, b) {
            None => prop_assert_eq!(a, b),
            Some(p) => prop_assert_eq!(score_winner(b, a), Some(p.other())),
        }
    }

    #[test]
    fn explicit_winner_always_wins(a in 0u32..200, b in 0u32..200, w in player_strategy()) {
        let m = build_season(vec![(BestOf::Five, None, 1, vec![(a, b, Some(w))], vec![])]);
        prop_assert_eq!(frame_winner(&m.frames[0]), Some(w));
    }
}
