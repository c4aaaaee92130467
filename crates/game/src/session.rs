//! Authoritative match session: players, flags, score, and the per-tick
//! resolution of tackles, pickups, captures and respawns.
//!
//! Tick order per player: locomotion tick with that player's collider
//! excluded from casts, then collider/rig upkeep, then event and contact
//! resolution against the CTF rules, then the flags' own drop simulation.

use crate::authority::{MatchEvent, PlayerId};
use crate::config::GameConfig;
use crate::flag::Flag;
use crate::level::{self, Level};
use crate::score::ScoreBoard;
use crate::team::Team;
use glam::Vec3;
use locomotion::{CharacterController, TickEvent, TickInput, TickOutput};
use log::info;
use physics::{ColliderHandle, RagdollRig};
use std::sync::mpsc::Sender;

pub struct Player {
    pub controller: CharacterController,
    pub rig: RagdollRig,
    pub team: Team,
    collider: ColliderHandle,
}

pub struct MatchSession {
    config: GameConfig,
    level: Level,
    players: Vec<Player>,
    flags: [Flag; 2],
    score: ScoreBoard,
    winner: Option<Team>,
    events: Sender<MatchEvent>,
}

impl MatchSession {
    pub fn new(config: GameConfig, events: Sender<MatchEvent>) -> Self {
        let mut level = Level::arena();
        let red_base = level.flag_base(Team::Red);
        let blue_base = level.flag_base(Team::Blue);
        let flags = [
            Flag::new(&mut level.world, Team::Red, red_base, config.respawn_height),
            Flag::new(
                &mut level.world,
                Team::Blue,
                blue_base,
                config.respawn_height,
            ),
        ];
        level.world.update_query_pipeline();
        Self {
            config,
            level,
            players: Vec::new(),
            flags,
            score: ScoreBoard::new(),
            winner: None,
            events,
        }
    }

    pub fn add_player(&mut self, team: Team) -> PlayerId {
        let id = self.players.len();
        let spawn = self.level.spawn(team);
        let yaw = self.level.spawn_yaw(team);
        let mut movement = self.config.movement.clone();
        movement.mouse_sensitivity *= self.config.sensitivity;
        let controller = CharacterController::new(spawn, yaw, movement);
        let collider =
            self.level
                .world
                .add_capsule(spawn, &controller.state().capsule, level::player_tag(id));
        let rig = RagdollRig::new(self.config.movement.gravity);
        self.players.push(Player {
            controller,
            rig,
            team,
            collider,
        });
        self.level.world.update_query_pipeline();
        info!("player {} joins {}", id, team);
        id
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id]
    }

    pub fn flag(&self, team: Team) -> &Flag {
        &self.flags[team.index()]
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Hand a flag straight to a player (mode setup, tests).
    pub fn give_flag(&mut self, flag: Team, player: PlayerId) -> bool {
        let attached = self.flags[flag.index()].try_attach(&mut self.level.world, player);
        if attached {
            let _ = self.events.send(MatchEvent::FlagTaken { flag, by: player });
        }
        attached
    }

    /// Teleport a player, dropping their motion state.
    pub fn reset_player(&mut self, id: PlayerId, position: Vec3, yaw: f32) {
        self.players[id].controller.reset(position, yaw);
    }

    /// Advance the whole match one fixed tick. `inputs` is indexed by
    /// player id; missing entries mean no input.
    pub fn tick(&mut self, inputs: &[TickInput], dt: f32) -> Vec<MatchEvent> {
        let mut outs: Vec<TickOutput> = Vec::with_capacity(self.players.len());
        for (i, player) in self.players.iter_mut().enumerate() {
            let input = inputs.get(i).copied().unwrap_or_default();
            let caster = self.level.world.caster_excluding(player.collider);
            outs.push(player.controller.tick(&input, &caster, &mut player.rig, dt));
        }

        // Collider and ragdoll upkeep.
        for i in 0..self.players.len() {
            let collider = self.players[i].collider;
            let capsule = self.players[i].controller.state().capsule;
            let position = self.players[i].controller.state().pose.position;
            self.level.world.sync_capsule(collider, &capsule, position);
            let rig = &mut self.players[i].rig;
            if rig.is_active() {
                rig.step(dt);
            } else {
                rig.follow(position);
            }
        }

        let mut events = Vec::new();
        for i in 0..self.players.len() {
            self.resolve(i, &outs[i], &mut events);
        }

        // Flags fall when free, ride their carrier otherwise.
        for f in 0..self.flags.len() {
            match self.flags[f].carrier() {
                Some(carrier) => {
                    let position = self.players[carrier].controller.state().pose.position;
                    self.flags[f].follow(position);
                }
                None => {
                    self.flags[f].tick(&mut self.level.world, self.config.movement.gravity, dt);
                }
            }
        }

        // Everything that moved this tick becomes visible to next tick's casts.
        self.level.world.update_query_pipeline();

        if self.winner.is_none() {
            if let Some(team) = self.score.winner(self.config.score_limit) {
                info!("{} wins the match", team);
                self.winner = Some(team);
            }
        }

        for event in &events {
            let _ = self.events.send(*event);
        }
        events
    }

    fn resolve(&mut self, i: PlayerId, out: &TickOutput, events: &mut Vec<MatchEvent>) {
        for event in &out.events {
            match *event {
                TickEvent::RagdollEnabled { impulse } => {
                    events.push(MatchEvent::RagdollEnabled { player: i, impulse });
                }
                TickEvent::RagdollDisabled => {
                    // Control comes back where the rig came to rest.
                    let rest = self.players[i].rig.position();
                    let stand = Vec3::new(
                        rest.x,
                        rest.y + self.config.movement.full_height,
                        rest.z,
                    );
                    self.players[i].controller.relocate(stand);
                    events.push(MatchEvent::RagdollDisabled { player: i });
                }
                TickEvent::FellBelowVoid => {
                    self.drop_carried(i, events);
                    let team = self.players[i].team;
                    let spawn = self.level.spawn(team);
                    let yaw = self.level.spawn_yaw(team);
                    self.players[i].controller.reset(spawn, yaw);
                    events.push(MatchEvent::PlayerRespawned { player: i });
                }
                TickEvent::Cue(_) | TickEvent::StartedSliding => {}
            }
        }

        // Dive contacts: tackles and flag pickups.
        if self.players[i].controller.can_tackle() {
            for contact in &out.contacts {
                if let Some(victim) = level::player_from_tag(contact.surface) {
                    if victim != i && victim < self.players.len() {
                        let impulse = Vec3::new(contact.velocity.x, 0.0, contact.velocity.z)
                            * self.config.tackle_force;
                        let player = &mut self.players[victim];
                        let hit = player.controller.force_ragdoll(&mut player.rig, impulse);
                        if !hit.is_empty() {
                            events.push(MatchEvent::Tackled { victim, by: i });
                            events.push(MatchEvent::RagdollEnabled {
                                player: victim,
                                impulse,
                            });
                            self.drop_carried(victim, events);
                        }
                    }
                } else if let Some(team) = level::flag_from_tag(contact.surface) {
                    self.drop_carried(i, events);
                    if self.flags[team.index()].try_attach(&mut self.level.world, i) {
                        events.push(MatchEvent::FlagTaken { flag: team, by: i });
                    }
                }
            }
        }

        // Capture pads, checked while grounded and carrying.
        if let Some(surface) = out.grounded_surface {
            let team = self.players[i].team;
            if surface == level::zone_tag(team) {
                for flag_team in [Team::Red, Team::Blue] {
                    if self.flags[flag_team.index()].carrier() != Some(i) {
                        continue;
                    }
                    self.flags[flag_team.index()].respawn(&mut self.level.world);
                    if flag_team == team {
                        events.push(MatchEvent::FlagReturned { flag: flag_team });
                    } else {
                        let total = self.score.add_point(team);
                        events.push(MatchEvent::FlagScored { by: team, total });
                    }
                }
            }
        }
    }

    /// Drop whatever flag `player` is carrying at their last grounded spot.
    fn drop_carried(&mut self, player: PlayerId, events: &mut Vec<MatchEvent>) {
        for team in [Team::Red, Team::Blue] {
            if self.flags[team.index()].carrier() != Some(player) {
                continue;
            }
            let spot = self.players[player].controller.last_grounded_position();
            self.flags[team.index()].drop_at(
                &mut self.level.world,
                spot,
                self.config.respawn_height,
            );
            events.push(MatchEvent::FlagDropped {
                flag: team,
                position: self.flags[team.index()].position(),
            });
        }
    }
}
