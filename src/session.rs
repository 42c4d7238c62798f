use std::ops::RangeInclusive;

/// A charging session: the inclusive index range closed by one departure.
///
/// A session always starts right after the previous departure, so it may
/// contain disconnected steps before the truck returns. How those steps are
/// modelled is a [`crate::model::DisconnectPolicy`] decision.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Session {
    pub start: usize,
    pub end: usize,
}

impl Session {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    #[must_use]
    pub const fn range(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Departure indices of the connectivity signal.
///
/// Index `i` is a departure when the truck is connected at `i` and gone at
/// `i + 1`. A series that ends connected closes its last run at the final
/// index, so every connected run terminates a session.
#[must_use]
pub fn departures(connected: &[bool]) -> Vec<usize> {
    let mut departures: Vec<usize> = connected
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] && !pair[1])
        .map(|(index, _)| index)
        .collect();
    if connected.last() == Some(&true) {
        departures.push(connected.len() - 1);
    }
    departures
}

/// Folds departures into disjoint sessions covering the series from index 0;
/// each next session starts right after the previous departure.
#[must_use]
pub fn sessions(connected: &[bool]) -> Vec<Session> {
    let mut sessions = Vec::new();
    let mut start = 0;
    for departure in departures(connected) {
        sessions.push(Session { start, end: departure });
        start = departure + 1;
    }
    sessions
}
