//! Kill score

/// Running score for one match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    score: u64,
    kills: u32,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a kill worth `score`. Returns the new total.
    pub fn add_kill(&mut self, score: u32) -> u64 {
        self.kills += 1;
        self.score += u64::from(score);
        self.score
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sums_kill_scores() {
        let mut board = ScoreBoard::new();
        board.add_kill(10);
        assert_eq!(board.add_kill(25), 35);
        assert_eq!(board.kills(), 2);

        board.reset();
        assert_eq!(board.score(), 0);
    }
}
