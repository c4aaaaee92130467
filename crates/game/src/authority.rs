//! Single-writer authority and event replication.
//!
//! The session computes all locomotion authoritatively; observers never
//! simulate, they consume terminal [`MatchEvent`]s off an mpsc channel and
//! apply them to a view. Events carry absolute values (new score totals,
//! final positions) so that replaying one is indistinguishable from applying
//! it once.

use crate::score::ScoreBoard;
use crate::team::Team;
use glam::Vec3;

/// Index into the session's player list.
pub type PlayerId = usize;

/// Who currently owns a contested object (a flag). First claim wins; a
/// losing claim is a silent no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorityToken {
    owner: Option<PlayerId>,
}

impl AuthorityToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim ownership. Returns true when `player` holds the token after the
    /// call, false when someone else already does.
    pub fn try_claim(&mut self, player: PlayerId) -> bool {
        match self.owner {
            None => {
                self.owner = Some(player);
                true
            }
            Some(owner) => owner == player,
        }
    }

    pub fn release(&mut self) {
        self.owner = None;
    }
}

/// Terminal match events, fanned out to observers over an mpsc channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchEvent {
    RagdollEnabled { player: PlayerId, impulse: Vec3 },
    RagdollDisabled { player: PlayerId },
    Tackled { victim: PlayerId, by: PlayerId },
    FlagTaken { flag: Team, by: PlayerId },
    FlagDropped { flag: Team, position: Vec3 },
    FlagReturned { flag: Team },
    FlagScored { by: Team, total: u32 },
    PlayerRespawned { player: PlayerId },
}

/// Where a flag is, as an observer sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlagView {
    Home,
    Carried(PlayerId),
    Dropped(Vec3),
}

/// An observer's replicated picture of the match. Applying the same event
/// twice leaves the view unchanged.
#[derive(Debug, Clone)]
pub struct ObserverView {
    pub ragdolled: Vec<bool>,
    pub flags: [FlagView; 2],
    pub score: ScoreBoard,
}

impl ObserverView {
    pub fn new(player_count: usize) -> Self {
        Self {
            ragdolled: vec![false; player_count],
            flags: [FlagView::Home, FlagView::Home],
            score: ScoreBoard::new(),
        }
    }

    pub fn apply(&mut self, event: &MatchEvent) {
        match *event {
            MatchEvent::RagdollEnabled { player, .. } => {
                if let Some(slot) = self.ragdolled.get_mut(player) {
                    *slot = true;
                }
            }
            MatchEvent::RagdollDisabled { player } => {
                if let Some(slot) = self.ragdolled.get_mut(player) {
                    *slot = false;
                }
            }
            MatchEvent::Tackled { .. } => {}
            MatchEvent::FlagTaken { flag, by } => {
                self.flags[flag.index()] = FlagView::Carried(by);
            }
            MatchEvent::FlagDropped { flag, position } => {
                self.flags[flag.index()] = FlagView::Dropped(position);
            }
            MatchEvent::FlagReturned { flag } => {
                self.flags[flag.index()] = FlagView::Home;
            }
            MatchEvent::FlagScored { by, total } => {
                self.score.set_points(by, total);
                self.flags[by.enemy().index()] = FlagView::Home;
            }
            MatchEvent::PlayerRespawned { player } => {
                if let Some(slot) = self.ragdolled.get_mut(player) {
                    *slot = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn losing_a_claim_race_is_a_no_op() {
        let mut token = AuthorityToken::new();
        assert!(token.try_claim(0));
        assert!(!token.try_claim(1));
        // The same owner re-claiming is fine; the loser still gets nothing.
        assert!(token.try_claim(0));
        assert!(!token.try_claim(1));
        token.release();
        assert!(token.try_claim(1));
    }

    #[test]
    fn replayed_events_leave_the_view_unchanged() {
        let mut view = ObserverView::new(2);
        let events = [
            MatchEvent::RagdollEnabled {
                player: 1,
                impulse: Vec3::NEG_Y,
            },
            MatchEvent::FlagTaken {
                flag: Team::Blue,
                by: 0,
            },
            MatchEvent::FlagScored {
                by: Team::Red,
                total: 1,
            },
        ];
        for event in &events {
            view.apply(event);
        }
        let snapshot = view.clone();
        for event in &events {
            view.apply(event);
        }
        assert_eq!(view.ragdolled, snapshot.ragdolled);
        assert_eq!(view.flags, snapshot.flags);
        assert_eq!(view.score, snapshot.score);
    }

    #[test]
    fn scored_flag_goes_home_in_the_view() {
        let mut view = ObserverView::new(1);
        view.apply(&MatchEvent::FlagTaken {
            flag: Team::Red,
            by: 0,
        });
        assert_eq!(view.flags[Team::Red.index()], FlagView::Carried(0));
        view.apply(&MatchEvent::FlagScored {
            by: Team::Blue,
            total: 1,
        });
        assert_eq!(view.flags[Team::Red.index()], FlagView::Home);
        assert_eq!(view.score.points(Team::Blue), 1);
    }
}
