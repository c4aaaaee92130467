//! OpenCTF: first-person capture-the-flag locomotion sandbox.
//!
//! `openctf` opens a window and runs a fixed-tick match with one
//! mouse-and-keyboard player against a bot. `openctf --demo` runs the same
//! match headless with two bots and prints the result, which is handy on
//! machines without a display.

mod authority;
mod config;
mod flag;
mod level;
mod score;
mod session;
mod team;

use anyhow::Result;
use authority::{MatchEvent, ObserverView, PlayerId};
use engine_core::TickClock;
use flag::FlagState;
use glam::{Vec2, Vec3};
use input::InputState;
use locomotion::{CharacterController, TickInput};
use session::MatchSession;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use team::Team;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowId},
};

/// Scripted pilot for flagless machines and the practice opponent.
struct Bot {
    id: PlayerId,
    team: Team,
}

impl Bot {
    fn decide(&self, session: &MatchSession) -> TickInput {
        let controller = &session.player(self.id).controller;
        if session.player(self.id).rig.is_active() {
            // Mash jump until the rig settles enough to get back up.
            return TickInput {
                jump_pressed: true,
                ..TickInput::default()
            };
        }

        let enemy = self.team.enemy();
        let carrying = session.flag(enemy).carrier() == Some(self.id);
        let target = if carrying {
            pad_center(self.team)
        } else {
            session.flag(enemy).position()
        };

        let mut input = steer(controller, target);
        let planar = {
            let to = target - controller.state().pose.position;
            Vec2::new(to.x, to.z).length()
        };
        // Dive onto a free flag when close; it is the only way to grab it.
        if !carrying && planar < 3.0 && session.flag(enemy).state() == FlagState::Free {
            input.dive_pressed = true;
        }
        input
    }
}

fn pad_center(team: Team) -> Vec3 {
    match team {
        Team::Red => Vec3::new(-18.0, 1.0, 0.0),
        Team::Blue => Vec3::new(18.0, 1.0, 0.0),
    }
}

/// Steer a controller toward a world position: full forward input plus the
/// yaw correction expressed as a mouse delta.
fn steer(controller: &CharacterController, target: Vec3) -> TickInput {
    let state = controller.state();
    let to = target - state.pose.position;
    let planar = Vec2::new(to.x, to.z);
    if planar.length_squared() < 0.01 {
        return TickInput::default();
    }
    // Yaw 0 faces -Z.
    let desired = (-planar.x).atan2(-planar.y);
    let mut err = desired - state.pose.yaw;
    while err > std::f32::consts::PI {
        err -= std::f32::consts::TAU;
    }
    while err < -std::f32::consts::PI {
        err += std::f32::consts::TAU;
    }
    let sensitivity = controller.config().mouse_sensitivity.max(1e-6);
    TickInput {
        move_axis: Vec2::new(0.0, 1.0),
        look_delta: Vec2::new(-err / sensitivity, 0.0),
        ..TickInput::default()
    }
}

/// Headless bot-vs-bot match. Runs until somebody wins or time runs out.
fn run_demo(config: config::GameConfig) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut session = MatchSession::new(config.clone(), tx);
    let red = Bot {
        id: session.add_player(Team::Red),
        team: Team::Red,
    };
    let blue = Bot {
        id: session.add_player(Team::Blue),
        team: Team::Blue,
    };
    let mut view = ObserverView::new(2);

    let dt = config.dt();
    let max_ticks = config.tick_rate * 180;
    for tick in 0..max_ticks {
        let inputs = [red.decide(&session), blue.decide(&session)];
        session.tick(&inputs, dt);
        while let Ok(event) = rx.try_recv() {
            log::debug!("event: {:?}", event);
            view.apply(&event);
        }
        if session.winner().is_some() {
            log::info!("match ended after {:.0} s", tick as f32 * dt);
            break;
        }
    }

    println!(
        "final score  red {} - {} blue",
        session.score().points(Team::Red),
        session.score().points(Team::Blue)
    );
    if let Some(team) = session.winner() {
        println!("{} wins", team);
    } else {
        println!("time limit reached");
    }
    // The replicated view must agree with the authoritative score.
    debug_assert_eq!(
        view.score.points(Team::Red),
        session.score().points(Team::Red)
    );
    Ok(())
}

/// Interactive state: one local player, one bot, no renderer yet. Positions
/// and match events land in the log.
struct PlayState {
    session: MatchSession,
    events: Receiver<MatchEvent>,
    view: ObserverView,
    input: InputState,
    clock: TickClock,
    local: PlayerId,
    bot: Bot,
    window: Arc<Window>,
    running: bool,
}

impl PlayState {
    fn new(config: config::GameConfig, window: Arc<Window>) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut session = MatchSession::new(config.clone(), tx);
        let local = session.add_player(Team::Red);
        let bot = Bot {
            id: session.add_player(Team::Blue),
            team: Team::Blue,
        };
        Self {
            session,
            events: rx,
            view: ObserverView::new(2),
            input: InputState::new(),
            clock: TickClock::new(config.tick_rate as f64),
            local,
            bot,
            window,
            running: true,
        }
    }

    fn set_cursor_locked(&mut self, locked: bool) {
        let mode = if locked {
            CursorGrabMode::Locked
        } else {
            CursorGrabMode::None
        };
        if self.window.set_cursor_grab(mode).is_ok() {
            self.window.set_cursor_visible(!locked);
            self.input.set_cursor_locked(locked);
        }
    }

    fn pump(&mut self) {
        self.clock.update();
        let dt = self.clock.dt();
        while self.clock.should_tick() {
            let local_input = if self.input.is_cursor_locked() {
                self.input.sample_tick()
            } else {
                TickInput::default()
            };
            let inputs = [local_input, self.bot.decide(&self.session)];
            self.session.tick(&inputs, dt);
            self.input.begin_frame();
        }
        while let Ok(event) = self.events.try_recv() {
            log::info!("event: {:?}", event);
            self.view.apply(&event);
        }
        if self.session.winner().is_some() {
            let score = self.session.score();
            log::info!(
                "final score red {} - {} blue",
                score.points(Team::Red),
                score.points(Team::Blue)
            );
            self.running = false;
        }
        if self.clock.tick_count() % 100 == 0 {
            let position = self.session.player(self.local).controller.state().pose.position;
            log::debug!("local player at {:.1} {:.1} {:.1}", position.x, position.y, position.z);
        }
    }

    /// Returns true when the window asked to close.
    fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => return true,
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if code == input::KeyCode::Escape && event.state.is_pressed() {
                        self.set_cursor_locked(false);
                    }
                    self.input.process_keyboard(code, event.state);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if state.is_pressed() && !self.input.is_cursor_locked() {
                    self.set_cursor_locked(true);
                }
                self.input.process_mouse_button(button, state);
            }
            WindowEvent::Focused(false) => self.set_cursor_locked(false),
            _ => {}
        }
        false
    }

    fn handle_device_event(&mut self, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.input.is_cursor_locked() {
                self.input.process_mouse_motion(delta);
            }
        }
    }
}

/// Application handler for winit.
struct App {
    state: Option<PlayState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let config = config::GameConfig::load();
            let window_attrs = Window::default_attributes()
                .with_title("OpenCTF")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };
            self.state = Some(PlayState::new(config, window));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let Some(state) = &mut self.state {
            state.handle_device_event(event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.pump();
            if !state.running {
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("OpenCTF");
    println!("  WASD  - move      Mouse - look");
    println!("  Space - jump      Shift - dive");
    println!("  Ctrl  - crouch    Esc   - release cursor");
    println!("  Dive into a flag to grab it; dive into a carrier to tackle.");

    // Write the effective config back so a fresh checkout gets a file to edit.
    let config = config::GameConfig::load();
    config.save();

    if std::env::args().any(|a| a == "--demo") {
        return run_demo(config);
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
