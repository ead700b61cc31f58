//! Running-mean maintenance for a movie's `avg_rating`.
//!
//! The stored average is updated incrementally from the previous average and the
//! number of reviews that contributed to it, so a review write never has to rescan
//! every rating for the movie. Both repository implementations call these helpers
//! inside the same unit of work as the review write itself.

/// Upper bound of the movie-level rating column.
pub const MAX_AVG_RATING: f64 = 10.0;

fn clamp(avg: f64) -> f64 {
    if avg.is_nan() {
        return 0.0;
    }
    avg.clamp(0.0, MAX_AVG_RATING)
}

/// Average after adding `rating` to `count` existing reviews averaging `avg`.
pub fn after_insert(avg: f64, count: i64, rating: i64) -> f64 {
    let count = count.max(0) as f64;
    clamp((avg * count + rating as f64) / (count + 1.0))
}

/// Average after one of `count` reviews changes from `old` to `new`.
///
/// `count` includes the review being changed, so it is at least 1 for a real update.
pub fn after_update(avg: f64, count: i64, old: i64, new: i64) -> f64 {
    if count <= 0 {
        return clamp(new as f64);
    }
    let count = count as f64;
    clamp((avg * count - old as f64 + new as f64) / count)
}

/// Average after removing `rating` from `count` reviews averaging `avg`.
///
/// Removing the last review resets the average to zero, which the API reports as
/// "not yet rated".
pub fn after_delete(avg: f64, count: i64, rating: i64) -> f64 {
    if count <= 1 {
        return 0.0;
    }
    let remaining_total = avg * count as f64 - rating as f64;
    if remaining_total <= 0.0 {
        return 0.0;
    }
    clamp(remaining_total / (count - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn first_review_sets_the_average() {
        assert!(close(after_insert(0.0, 0, 4), 4.0));
    }

    #[test]
    fn insert_is_a_true_mean_not_pairwise() {
        // 5, 5, 2 -> 4.0; pairwise averaging would give 3.5
        let avg = after_insert(0.0, 0, 5);
        let avg = after_insert(avg, 1, 5);
        let avg = after_insert(avg, 2, 2);
        assert!(close(avg, 4.0), "got {avg}");
    }

    #[test]
    fn update_replaces_one_contribution() {
        // ratings 2 and 4 (avg 3); change 4 -> 5 gives 3.5
        assert!(close(after_update(3.0, 2, 4, 5), 3.5));
    }

    #[test]
    fn update_single_review() {
        assert!(close(after_update(1.0, 1, 1, 5), 5.0));
    }

    #[test]
    fn delete_last_review_resets_to_zero() {
        assert_eq!(after_delete(4.0, 1, 4), 0.0);
    }

    #[test]
    fn delete_recovers_previous_mean() {
        // ratings 1, 3, 5 (avg 3); remove 5 -> avg 2
        assert!(close(after_delete(3.0, 3, 5), 2.0));
    }

    #[test]
    fn sequence_matches_recomputed_mean() {
        let ratings = [3_i64, 1, 4, 1, 5];
        let mut avg = 0.0;
        for (i, r) in ratings.iter().enumerate() {
            avg = after_insert(avg, i as i64, *r);
        }
        let expected = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;
        assert!(close(avg, expected));

        // drop the 4
        avg = after_delete(avg, ratings.len() as i64, 4);
        assert!(close(avg, 10.0 / 4.0));
    }

    #[test]
    fn result_never_leaves_bounds() {
        assert_eq!(after_delete(0.5, 2, 5), 0.0);
        assert!(after_insert(10.0, 3, 5) <= MAX_AVG_RATING);
    }
}
