//! Folding of per-period player stat lines into season totals.

use std::collections::HashMap;

use crate::model::{PlayerSeasonAggregate, PlayerSeasonStat};

/// Fold every stat line of one player into a single totals record.
///
/// Counting stats are summed. The rating is a weighted mean where each line
/// weighs its minutes, or 1 when it has none; lines without a numeric rating
/// carry no weight. The position is the most frequent non-empty label, ties
/// going to the label seen first.
///
/// Returns `None` for an empty slice.
pub fn aggregate(stats: &[PlayerSeasonStat]) -> Option<PlayerSeasonAggregate> {
    let first = stats.first()?;

    let mut totals = PlayerSeasonAggregate {
        player_id: first.player_id(),
        position: None,
        rating: None,
        appearances: 0,
        minutes: 0,
        goals: 0,
        assists: 0,
        yellow_cards: 0,
        red_cards: 0,
    };
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    // (label, count) in first-seen order
    let mut positions: Vec<(String, u32)> = Vec::new();

    for stat in stats {
        let minutes = stat.minutes();
        totals.appearances = totals.appearances.saturating_add(stat.appearances());
        totals.minutes = totals.minutes.saturating_add(minutes);
        totals.goals = totals.goals.saturating_add(stat.goals());
        totals.assists = totals.assists.saturating_add(stat.assists());
        totals.yellow_cards = totals.yellow_cards.saturating_add(stat.yellow_cards());
        totals.red_cards = totals.red_cards.saturating_add(stat.red_cards());

        if let Some(rating) = stat.rating() {
            let weight = if minutes > 0 { f64::from(minutes) } else { 1.0 };
            weighted_sum += rating * weight;
            weight_total += weight;
        }

        if let Some(position) = stat.position() {
            match positions.iter_mut().find(|(p, _)| *p == position) {
                Some((_, count)) => *count += 1,
                None => positions.push((position, 1)),
            }
        }
    }

    totals.rating = (weight_total > 0.0).then(|| weighted_sum / weight_total);
    totals.position = modal_position(positions);
    Some(totals)
}

fn modal_position(positions: Vec<(String, u32)>) -> Option<String> {
    let mut best: Option<(String, u32)> = None;
    for (label, count) in positions {
        // strictly greater keeps the earliest label on ties
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

/// Plain mean of the numeric ratings of every player, used by the leaderboards.
pub fn mean_ratings(stats: &[PlayerSeasonStat]) -> HashMap<u64, f64> {
    let mut sums: HashMap<u64, (f64, u32)> = HashMap::new();
    for stat in stats {
        let (Some(player_id), Some(rating)) = (stat.player_id(), stat.rating()) else {
            continue;
        };
        let entry = sums.entry(player_id).or_insert((0.0, 0));
        entry.0 += rating;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(player_id, (sum, count))| (player_id, sum / f64::from(count.max(1))))
        .collect()
}
