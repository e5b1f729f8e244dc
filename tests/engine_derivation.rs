use chrono::NaiveDate;

use snookerlog::{
    engine::{
        active::{find_active_frame, next_frame_number},
        outcome::{frame_winner, score_winner},
        season::{compute_season_stats, summarize_matches, Metrics},
        suggest::{season_choices, suggested_breaker, suggested_first_breaker},
        tally::{compact_best_of_three, match_frame_tally, match_outcome, match_winner},
    },
    record::{BreakRecord, FrameRecord, MatchRecord},
    types::{BestOf, BreakId, FrameId, FrameNo, MatchId, Player},
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).expect("date")
}

fn match_rec(best_of: BestOf, d: u32) -> MatchRecord {
    MatchRecord {
        id: MatchId::new(),
        season: 2024,
        date: day(d),
        best_of,
        first_breaker: None,
        winner: None,
        notes: None,
    }
}

fn frame(m: &MatchRecord, frame_no: FrameNo, a: u32, b: u32) -> FrameRecord {
    FrameRecord {
        id: FrameId::new(),
        match_id: m.id,
        season: m.season,
        frame_no,
        score_a: a,
        score_b: b,
        winner: None,
        breaker: None,
    }
}

fn brk(m: &MatchRecord, player: Player, points: u32) -> BreakRecord {
    BreakRecord {
        id: BreakId::new(),
        match_id: m.id,
        frame_id: None,
        season: m.season,
        player,
        points,
    }
}

#[test]
fn explicit_winner_beats_scores() {
    let m = match_rec(BestOf::Five, 1);
    let mut f = frame(&m, 1, 80, 20);
    f.winner = Some(Player::B);
    assert_eq!(frame_winner(&f), Some(Player::B));
}

#[test]
fn level_scores_are_undecided() {
    assert_eq!(score_winner(0, 0), None);
    assert_eq!(score_winner(47, 47), None);
    assert_eq!(score_winner(48, 47), Some(Player::A));
    assert_eq!(score_winner(3, 70), Some(Player::B));
}

#[test]
fn empty_match_starts_at_frame_one() {
    assert!(find_active_frame(&[]).is_none());
    assert_eq!(next_frame_number(&[]), 1);
}

#[test]
fn active_frame_is_the_highest_undecided_one() {
    let m = match_rec(BestOf::Seven, 1);
    let frames = vec![
        frame(&m, 3, 0, 0),
        frame(&m, 1, 0, 0),
        frame(&m, 2, 60, 10),
    ];
    let active = find_active_frame(&frames).expect("active");
    assert_eq!(active.frame_no, 3);
    assert_eq!(next_frame_number(&frames), 4);
}

#[test]
fn open_frame_after_two_decided_is_active() {
    let m = match_rec(BestOf::Five, 1);
    let frames = vec![frame(&m, 1, 70, 3), frame(&m, 2, 1, 90), frame(&m, 3, 0, 0)];
    assert_eq!(find_active_frame(&frames).map(|f| f.frame_no), Some(3));
}

#[test]
fn decided_frames_leave_nothing_active() {
    let m = match_rec(BestOf::Five, 1);
    let frames = vec![frame(&m, 1, 70, 3), frame(&m, 2, 1, 90)];
    assert!(find_active_frame(&frames).is_none());
    assert_eq!(next_frame_number(&frames), 3);
}

#[test]
fn next_number_follows_gaps() {
    let m = match_rec(BestOf::Seven, 1);
    let frames = vec![frame(&m, 1, 70, 3), frame(&m, 4, 1, 90)];
    assert_eq!(next_frame_number(&frames), 5);
}

#[test]
fn tally_ignores_undecided_and_foreign_frames() {
    let m = match_rec(BestOf::Five, 1);
    let other = match_rec(BestOf::Five, 2);
    let frames = vec![
        frame(&m, 1, 70, 3),
        frame(&m, 2, 50, 50),
        frame(&m, 3, 4, 61),
        frame(&m, 4, 66, 0),
        frame(&other, 1, 0, 99),
    ];
    let tally = match_frame_tally(&m, &frames);
    assert_eq!((tally.a, tally.b), (2, 1));
    assert_eq!(match_winner(&m, &frames), Some(Player::A));
}

#[test]
fn level_tally_has_no_winner_unless_explicit() {
    let mut m = match_rec(BestOf::Five, 1);
    let frames = vec![frame(&m, 1, 70, 3), frame(&m, 2, 3, 70)];
    assert_eq!(match_winner(&m, &frames), None);
    m.winner = Some(Player::B);
    assert_eq!(match_winner(&m, &frames), Some(Player::B));
}

#[test]
fn compact_entry_needs_single_best_of_three_frame_scored_two_one() {
    let m = match_rec(BestOf::Three, 1);
    assert_eq!(compact_best_of_three(&m, &[frame(&m, 1, 2, 1)]), Some(Player::A));
    assert_eq!(compact_best_of_three(&m, &[frame(&m, 1, 1, 2)]), Some(Player::B));
    assert_eq!(compact_best_of_three(&m, &[frame(&m, 1, 3, 0)]), None);
    assert_eq!(compact_best_of_three(&m, &[frame(&m, 1, 0, 3)]), None);
    assert_eq!(compact_best_of_three(&m, &[frame(&m, 1, 2, 2)]), None);
    assert_eq!(compact_best_of_three(&m, &[frame(&m, 1, 60, 30)]), None);
    assert_eq!(
        compact_best_of_three(&m, &[frame(&m, 1, 2, 1), frame(&m, 2, 2, 1)]),
        None
    );

    let five = match_rec(BestOf::Five, 1);
    assert_eq!(compact_best_of_three(&five, &[frame(&five, 1, 2, 1)]), None);

    let mut decided = match_rec(BestOf::Three, 1);
    decided.winner = Some(Player::B);
    assert_eq!(compact_best_of_three(&decided, &[frame(&decided, 1, 2, 1)]), None);

    let mut explicit = frame(&m, 1, 2, 1);
    explicit.winner = Some(Player::A);
    assert_eq!(compact_best_of_three(&m, &[explicit]), None);
}

#[test]
fn outcome_reports_reached_best_of() {
    let m = match_rec(BestOf::Three, 1);
    let frames = vec![
        frame(&m, 1, 70, 3),
        frame(&m, 2, 3, 70),
        frame(&m, 3, 55, 54),
    ];
    let outcome = match_outcome(&m, &frames);
    assert_eq!(outcome.decided_frames, 3);
    assert!(outcome.reached_best_of);
    assert_eq!(outcome.winner, Some(Player::A));
    assert_eq!(outcome.compact_winner, None);
}

#[test]
fn compact_match_season_credit_counts_once() {
    let m = match_rec(BestOf::Three, 1);
    let frames = vec![frame(&m, 1, 2, 1)];
    let breaks = vec![brk(&m, Player::A, 12), brk(&m, Player::B, 9)];

    let stats = compute_season_stats(&[m], &frames, &breaks);
    assert_eq!(stats.a.matches, 1);
    assert_eq!(stats.a.frames, 1);
    assert_eq!(stats.a.highest_break, 12);
    assert_eq!(stats.a.ten_plus_breaks, 1);
    assert_eq!(stats.b.matches, 0);
    assert_eq!(stats.b.frames, 0);
    assert_eq!(stats.b.highest_break, 0);
    assert_eq!(stats.b.ten_plus_breaks, 0);
}

#[test]
fn season_stats_of_nothing_are_zero() {
    let stats = compute_season_stats(&[], &[], &[]);
    assert_eq!(stats.a, Metrics::default());
    assert_eq!(stats.b, Metrics::default());
}

#[test]
fn season_stats_skip_undecided_matches() {
    let level = match_rec(BestOf::Five, 1);
    let won = match_rec(BestOf::Five, 2);
    let frames = vec![
        frame(&level, 1, 70, 3),
        frame(&level, 2, 3, 70),
        frame(&won, 1, 10, 70),
        frame(&won, 2, 10, 70),
        frame(&won, 3, 10, 70),
    ];
    let breaks = vec![
        brk(&won, Player::B, 45),
        brk(&won, Player::B, 31),
        brk(&level, Player::A, 10),
    ];

    let stats = compute_season_stats(&[level, won], &frames, &breaks);
    assert_eq!(stats.a.matches, 0);
    assert_eq!(stats.b.matches, 1);
    assert_eq!(stats.a.frames, 1);
    assert_eq!(stats.b.frames, 4);
    assert_eq!(stats.b.highest_break, 45);
    assert_eq!(stats.b.ten_plus_breaks, 2);
    assert_eq!(stats.a.highest_break, 10);
}

#[test]
fn summaries_are_newest_first() {
    let old = match_rec(BestOf::Three, 1);
    let new = match_rec(BestOf::Three, 9);
    let frames = vec![frame(&new, 1, 70, 3)];
    let summaries = summarize_matches(&[old.clone(), new.clone()], &frames);
    assert_eq!(summaries[0].record.id, new.id);
    assert_eq!(summaries[0].outcome.tally.a, 1);
    assert_eq!(summaries[1].record.id, old.id);
    assert_eq!(summaries[1].outcome.winner, None);
}

#[test]
fn breaker_alternates_from_first_breaker() {
    let mut m = match_rec(BestOf::Five, 1);
    assert_eq!(suggested_breaker(&m, 1), None);
    m.first_breaker = Some(Player::B);
    assert_eq!(suggested_breaker(&m, 1), Some(Player::B));
    assert_eq!(suggested_breaker(&m, 2), Some(Player::A));
    assert_eq!(suggested_breaker(&m, 5), Some(Player::B));
}

#[test]
fn next_match_first_breaker_swaps_latest() {
    let mut older = match_rec(BestOf::Three, 1);
    older.first_breaker = Some(Player::B);
    let mut latest = match_rec(BestOf::Three, 7);
    latest.first_breaker = Some(Player::A);
    let unrecorded = match_rec(BestOf::Three, 20);

    assert_eq!(
        suggested_first_breaker(&[older, unrecorded.clone(), latest]),
        Some(Player::B)
    );
    assert_eq!(suggested_first_breaker(&[unrecorded]), None);
}

#[test]
fn season_choices_fall_back_to_recent_years() {
    assert_eq!(
        season_choices([2022, 2024, 2022], 2030, 7),
        vec![2024, 2022]
    );
    assert_eq!(
        season_choices([], 2024, 7),
        vec![2025, 2024, 2023, 2022, 2021, 2020, 2019]
    );
}
