/// The challenge widget rendered while the gate is closed.
pub trait ChallengeWidget {
    /// Discard the current response so the user can solve a new challenge.
    fn reset(&mut self);
}
