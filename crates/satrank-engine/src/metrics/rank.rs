//! "Min" ranking of centrality shares.
//!
//! Rank 1 is the highest share. Tied scores all receive the lowest rank
//! available to the tie group; the next distinct score's rank is one plus
//! the number of strictly better subjects. A three-way tie at the top gives
//! ranks `1, 1, 1` and the next subject rank `4`.

/// Assign min-ranks to `scores`, descending. Returns ranks aligned with the
/// input order.
#[must_use]
pub fn min_ranks(scores: &[f64]) -> Vec<u64> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut ranks = vec![0u64; scores.len()];
    let mut current_rank = 0u64;
    let mut prev_score = f64::INFINITY;

    for (position, &idx) in order.iter().enumerate() {
        if scores[idx].total_cmp(&prev_score).is_ne() {
            current_rank = position as u64 + 1;
            prev_score = scores[idx];
        }
        ranks[idx] = current_rank;
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::min_ranks;

    #[test]
    fn distinct_scores_rank_densely() {
        assert_eq!(min_ranks(&[0.2, 0.9, 0.5]), vec![3, 1, 2]);
    }

    #[test]
    fn ties_share_the_lowest_available_rank() {
        // Three-way tie for the top score → all rank 1, next distinct → 4.
        assert_eq!(min_ranks(&[0.9, 0.9, 0.9, 0.1]), vec![1, 1, 1, 4]);
    }

    #[test]
    fn mid_table_tie() {
        // Tie for 2nd and 3rd → both rank 2, not 2 and 3.
        assert_eq!(min_ranks(&[0.9, 0.5, 0.5, 0.1]), vec![1, 2, 2, 4]);
    }

    #[test]
    fn empty_and_singleton() {
        assert!(min_ranks(&[]).is_empty());
        assert_eq!(min_ranks(&[0.0]), vec![1]);
    }
}
