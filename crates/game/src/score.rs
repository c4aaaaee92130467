//! Match score, owned by the session rather than a global manager.

use crate::team::Team;
use log::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    red: u32,
    blue: u32,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Award a capture and return the team's new total.
    pub fn add_point(&mut self, team: Team) -> u32 {
        let slot = match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        };
        *slot += 1;
        let total = *slot;
        info!("{} scores, {} - {}", team, self.red, self.blue);
        total
    }

    pub fn points(&self, team: Team) -> u32 {
        match team {
            Team::Red => self.red,
            Team::Blue => self.blue,
        }
    }

    /// Replicated-total path. Totals only ever grow, so a replayed event
    /// cannot move the score backwards.
    pub fn set_points(&mut self, team: Team, total: u32) {
        let slot = match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        };
        *slot = (*slot).max(total);
    }

    /// First team at or past `limit`, if any.
    pub fn winner(&self, limit: u32) -> Option<Team> {
        if self.red >= limit {
            Some(Team::Red)
        } else if self.blue >= limit {
            Some(Team::Blue)
        } else {
            None
        }
    }
}
