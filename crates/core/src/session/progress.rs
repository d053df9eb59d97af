/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl QuizProgress {
    /// Completed share of the attempt in percent, for progress bars.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let done = self.total - self.remaining;
        u8::try_from(done * 100 / self.total).unwrap_or(100)
    }
}
