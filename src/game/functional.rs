//! Showdown hand evaluation.
//!
//! Ranks the best five-card poker hand out of a seat's seven cards (two
//! hole cards plus the board). Comparison is purely structural: category
//! first, then a lexicographic tiebreak vector, so `HandRank` derives `Ord`
//! and two equal ranks split the pot.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::Card;

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high_card",
            Self::OnePair => "one_pair",
            Self::TwoPair => "two_pair",
            Self::ThreeOfAKind => "three_of_a_kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full_house",
            Self::FourOfAKind => "four_of_a_kind",
            Self::StraightFlush => "straight_flush",
        };
        write!(f, "{repr}")
    }
}

/// Strength of a five-card hand. The derived ordering compares category
/// first, then the tiebreak ranks left to right.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandRank {
    pub category: HandCategory,
    /// Ranks that break ties within the category, most significant first.
    /// Paired groups come before kickers; a straight carries only its high
    /// card (5 for the wheel).
    pub tiebreak: Vec<u8>,
}

/// Ranks exactly five cards.
#[must_use]
pub fn evaluate_five(cards: &[Card; 5]) -> HandRank {
    let mut ranks: Vec<u8> = cards.iter().map(|card| card.rank()).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|card| card.suit() == cards[0].suit());
    let straight_high = straight_high_card(&ranks);

    if let Some(high) = straight_high {
        let category = if is_flush {
            HandCategory::StraightFlush
        } else {
            HandCategory::Straight
        };
        return HandRank {
            category,
            tiebreak: vec![high],
        };
    }

    // Group by rank, ordered by count then rank, both descending. The
    // grouped ranks are the tiebreak vector for every paired category.
    let mut groups: Vec<(usize, u8)> = Vec::with_capacity(5);
    for &rank in &ranks {
        match groups.iter_mut().find(|(_, r)| *r == rank) {
            Some((count, _)) => *count += 1,
            None => groups.push((1, rank)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));
    let counts: Vec<usize> = groups.iter().map(|(count, _)| *count).collect();
    let tiebreak: Vec<u8> = groups.iter().map(|(_, rank)| *rank).collect();

    let category = match counts.as_slice() {
        [4, 1] => HandCategory::FourOfAKind,
        [3, 2] => HandCategory::FullHouse,
        [3, 1, 1] => HandCategory::ThreeOfAKind,
        [2, 2, 1] => HandCategory::TwoPair,
        [2, 1, 1, 1] => HandCategory::OnePair,
        _ if is_flush => HandCategory::Flush,
        _ => HandCategory::HighCard,
    };
    HandRank { category, tiebreak }
}

/// Best five-card hand out of seven cards, by exhaustive choice of the
/// 21 five-card subsets.
#[must_use]
pub fn evaluate_best_hand(cards: &[Card; 7]) -> HandRank {
    let mut best: Option<HandRank> = None;
    for skip_a in 0..7 {
        for skip_b in (skip_a + 1)..7 {
            let mut five = [cards[0]; 5];
            let mut n = 0;
            for (i, &card) in cards.iter().enumerate() {
                if i != skip_a && i != skip_b {
                    five[n] = card;
                    n += 1;
                }
            }
            let rank = evaluate_five(&five);
            if best.as_ref().is_none_or(|b| rank > *b) {
                best = Some(rank);
            }
        }
    }
    // 21 subsets were evaluated, best is always set.
    best.unwrap_or(HandRank {
        category: HandCategory::HighCard,
        tiebreak: Vec::new(),
    })
}

/// High card of a straight formed by the given descending distinct-or-not
/// ranks, if any. The wheel (A-5-4-3-2) counts with high card 5.
fn straight_high_card(sorted_desc: &[u8]) -> Option<u8> {
    let mut distinct = sorted_desc.to_vec();
    distinct.dedup();
    if distinct.len() != 5 {
        return None;
    }
    if distinct[0] - distinct[4] == 4 {
        return Some(distinct[0]);
    }
    // Ace plays low under the five.
    if distinct == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}
