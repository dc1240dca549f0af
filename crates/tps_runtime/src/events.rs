//! Session-level events published on the gameplay bus

/// The match clock reached a new whole second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeElapsed {
    pub minutes: u32,
    pub seconds: u32,
}

/// A full minute passed; enemies get `percent` stronger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinutePassed {
    pub minute: u32,
    pub percent: f32,
}

/// The match ended. `won` is true when the player survived the time limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOver {
    pub won: bool,
}
