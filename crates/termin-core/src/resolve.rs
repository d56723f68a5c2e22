use crate::error::CoreError;

/// Pick the winning option from per-option reaction tallies.
///
/// An option wins only with full consensus: its reaction count must equal
/// the number of eligible voters in the channel. Ties break toward the
/// lowest option index (the first-listed date). Anything short of a full
/// count is [`CoreError::NoConsensus`], which callers treat as "keep
/// voting", not as a failure.
pub fn winning_option(
    tallies: &[(usize, u64)],
    eligible_voters: u64,
) -> Result<usize, CoreError> {
    if eligible_voters == 0 {
        return Err(CoreError::NoConsensus);
    }
    tallies
        .iter()
        .filter(|(_, count)| *count == eligible_voters)
        .map(|(index, _)| *index)
        .min()
        .ok_or(CoreError::NoConsensus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_index_wins_among_full_counts() {
        let tallies = [(0, 3), (1, 5), (2, 5)];
        assert_eq!(winning_option(&tallies, 5).unwrap(), 1);
    }

    #[test]
    fn no_full_count_means_no_consensus() {
        let tallies = [(0, 3), (1, 4)];
        assert!(matches!(
            winning_option(&tallies, 5),
            Err(CoreError::NoConsensus)
        ));
    }

    #[test]
    fn over_count_does_not_win() {
        // More reactions than voters (stale roster) is not consensus.
        let tallies = [(0, 6)];
        assert!(matches!(
            winning_option(&tallies, 5),
            Err(CoreError::NoConsensus)
        ));
    }

    #[test]
    fn empty_roster_never_resolves() {
        let tallies = [(0, 0)];
        assert!(matches!(
            winning_option(&tallies, 0),
            Err(CoreError::NoConsensus)
        ));
    }

    #[test]
    fn single_option_full_consensus() {
        assert_eq!(winning_option(&[(0, 1)], 1).unwrap(), 0);
    }
}
