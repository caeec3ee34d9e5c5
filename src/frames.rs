//! Frame stack
//!
//! The game is a stack of frames: menus, dialogs and sessions. Only the top
//! frame runs. Each step yields a `Transition` that the stack applies, so
//! game over, pausing and the next wave are plain values instead of
//! control flow.

use std::thread;
use std::time::{Duration, Instant};

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::VERSION;
use crate::consts::ARENA_CENTER;
use crate::error::SimError;
use crate::renderer::Renderer;
use crate::settings::SimConfig;
use crate::sim::{Entity, InputEvent, InputSource, Session, SessionOutcome};

const HINTS: [&str; 6] = [
    "Gray, steel rocks will never break!",
    "Hitting the walls will never cause damage!",
    "You can capture and fling enemy ships!",
    "Fling captured items by letting go of the mouse!",
    "Ram enemies as a last resort to hurt them!",
    "Captured objects cannot recoil and hit you!",
];

/// What picking a menu option or dismissing a dialog leads to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Close the current frame
    Close,
    Quit,
    About,
    /// About dialog, then a new game
    Intro,
    NewGame { prev_score: f32 },
    Pause,
    GameOver { score: f32 },
    LostMenu,
    WaveCleared { score: f32 },
}

/// Request returned by one step of the top frame
pub enum Transition {
    Continue,
    Pop,
    Push(Frame),
    Replace(Frame),
    Terminate,
}

/// Geometry of a menu box centred in the arena, 20px per option
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuLayout {
    pub width: f32,
    pub options: usize,
}

impl MenuLayout {
    const ROW: f32 = 20.0;
    const OPTION_WIDTH: f32 = 190.0;

    pub fn height(&self) -> f32 {
        40.0 + self.options as f32 * Self::ROW + 10.0
    }

    /// Top-left corner and size of the clickable box for option `i`
    pub fn option_rect(&self, i: usize) -> (f32, f32, f32, f32) {
        let first_row = ARENA_CENTER - self.height() / 2.0 + 10.0 + 40.0;
        let x = ARENA_CENTER - self.width / 2.0 + 5.0;
        let y = first_row + i as f32 * Self::ROW - 2.0;
        (x, y, Self::OPTION_WIDTH, Self::ROW)
    }

    /// Option under `pointer`, if any
    pub fn hit(&self, pointer: glam::Vec2) -> Option<usize> {
        (0..self.options).find(|&i| {
            let (x, y, w, h) = self.option_rect(i);
            pointer.x >= x && pointer.x < x + w && pointer.y >= y && pointer.y < y + h
        })
    }
}

pub struct Menu {
    pub title: String,
    pub options: Vec<(String, Action)>,
    pub width: f32,
    /// Entities drawn behind the menu
    pub backdrop: Vec<Entity>,
}

impl Menu {
    pub fn new(title: &str, options: &[(&str, Action)], width: f32, backdrop: Vec<Entity>) -> Self {
        Self {
            title: title.to_string(),
            options: options.iter().map(|(label, action)| (label.to_string(), *action)).collect(),
            width,
            backdrop,
        }
    }

    pub fn layout(&self) -> MenuLayout {
        MenuLayout {
            width: self.width,
            options: self.options.len(),
        }
    }

    fn step(&self, input: &mut dyn InputSource, renderer: &mut dyn Renderer) -> Option<Action> {
        let hovered = self.layout().hit(input.pointer());
        let labels: Vec<&str> = self.options.iter().map(|(label, _)| label.as_str()).collect();
        renderer.process(&self.backdrop);
        renderer.draw_menu(&self.title, &labels, self.width, hovered);
        renderer.display();

        match input.poll_event() {
            InputEvent::Quit => Some(Action::Quit),
            InputEvent::PointerDown => hovered.map(|i| self.options[i].1),
            _ => None,
        }
    }
}

pub struct Dialog {
    pub title: String,
    pub lines: Vec<String>,
    /// What dismissing the dialog does
    pub next: Action,
    pub backdrop: Vec<Entity>,
}

impl Dialog {
    pub fn new(title: &str, lines: Vec<String>, next: Action, backdrop: Vec<Entity>) -> Self {
        let mut lines = lines;
        lines.push(String::new());
        lines.push("(Press any key to continue)".to_string());
        Self {
            title: title.to_string(),
            lines,
            next,
            backdrop,
        }
    }

    fn step(&self, input: &mut dyn InputSource, renderer: &mut dyn Renderer) -> Option<Action> {
        renderer.process(&self.backdrop);
        renderer.draw_dialog(&self.title, &self.lines);
        renderer.display();

        match input.poll_event() {
            InputEvent::Quit => Some(Action::Quit),
            InputEvent::PointerDown | InputEvent::KeyDown(_) => Some(self.next),
            _ => None,
        }
    }
}

pub enum Frame {
    Menu(Menu),
    Dialog(Dialog),
    Session(Box<Session>),
}

impl Frame {
    pub fn name(&self) -> &str {
        match self {
            Frame::Menu(menu) => &menu.title,
            Frame::Dialog(dialog) => &dialog.title,
            Frame::Session(_) => "session",
        }
    }
}

pub fn start_menu() -> Frame {
    Frame::Menu(Menu::new(
        "ORBITAL SMASH",
        &[
            ("Start game", Action::Intro),
            ("About", Action::About),
            ("Quit", Action::Quit),
        ],
        350.0,
        Vec::new(),
    ))
}

pub fn pause_menu(backdrop: Vec<Entity>) -> Frame {
    Frame::Menu(Menu::new(
        "Pause",
        &[
            ("Resume", Action::Close),
            ("Quit", Action::Quit),
            ("About", Action::About),
        ],
        200.0,
        backdrop,
    ))
}

pub fn about_dialog(next: Action, backdrop: Vec<Entity>) -> Frame {
    let lines = [
        "Orbital Smash",
        "",
        "Objective:",
        "    Smash things before you get smashed!",
        "    How long can you last?",
        "",
        "How to play:",
        "    Move with your mouse",
        "    Attract objects by holding the left mouse button",
        "    Release to fling objects",
        "    Smash and fling objects you're holding",
        "    Try not to get hit",
        "    Press [p] or [esc] to pause",
        "",
    ];
    let mut lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    lines.push(format!("Version {VERSION}"));
    Frame::Dialog(Dialog::new("About", lines, next, backdrop))
}

/// Top-level state machine
pub struct FrameStack {
    frames: Vec<Frame>,
    config: SimConfig,
    /// Seeds sessions and picks hints
    rng: Pcg32,
}

impl FrameStack {
    /// A stack showing the start menu
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self {
            frames: vec![start_menu()],
            config,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn with_frame(config: SimConfig, seed: u64, frame: Frame) -> Self {
        Self {
            frames: vec![frame],
            config,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    fn random_hint(&mut self) -> String {
        HINTS.choose(&mut self.rng).copied().unwrap_or_default().to_string()
    }

    /// Run the top frame once and return what it asked for
    pub fn step(&mut self, input: &mut dyn InputSource, renderer: &mut dyn Renderer) -> Result<Transition, SimError> {
        let Some(top) = self.frames.last_mut() else {
            return Ok(Transition::Terminate);
        };

        let (action, backdrop) = match top {
            Frame::Menu(menu) => (menu.step(input, renderer), menu.backdrop.as_slice()),
            Frame::Dialog(dialog) => (dialog.step(input, renderer), dialog.backdrop.as_slice()),
            Frame::Session(session) => {
                let action = match session.tick(input, renderer)? {
                    SessionOutcome::Continue => None,
                    SessionOutcome::Pause => Some(Action::Pause),
                    SessionOutcome::Quit => Some(Action::Quit),
                    SessionOutcome::GameOver { score } => Some(Action::GameOver { score }),
                    SessionOutcome::WaveCleared { score } => Some(Action::WaveCleared { score }),
                };
                (action, session.world().entities())
            }
        };

        match action {
            None => Ok(Transition::Continue),
            Some(action) => {
                let backdrop = backdrop.to_vec();
                self.resolve(action, backdrop, renderer)
            }
        }
    }

    /// Turn an action into the frame change it implies
    pub fn resolve(&mut self, action: Action, backdrop: Vec<Entity>, renderer: &mut dyn Renderer) -> Result<Transition, SimError> {
        Ok(match action {
            Action::Close => Transition::Pop,
            Action::Quit => Transition::Terminate,
            Action::About => Transition::Push(about_dialog(Action::Close, backdrop)),
            Action::Intro => Transition::Push(about_dialog(Action::NewGame { prev_score: 0.0 }, backdrop)),
            Action::NewGame { prev_score } => {
                let seed = self.rng.random::<u64>();
                let session = Session::new(prev_score, self.config.clone(), seed, renderer)?;
                Transition::Replace(Frame::Session(Box::new(session)))
            }
            Action::Pause => Transition::Push(pause_menu(backdrop)),
            Action::GameOver { score } => {
                let lines = vec![
                    format!("Score: {}", score as i64),
                    String::new(),
                    "Hint!".to_string(),
                    self.random_hint(),
                ];
                Transition::Replace(Frame::Dialog(Dialog::new("You lost.", lines, Action::LostMenu, backdrop)))
            }
            Action::LostMenu => Transition::Replace(Frame::Menu(Menu::new(
                "You lost.",
                &[
                    ("Play again?", Action::NewGame { prev_score: 0.0 }),
                    ("Quit", Action::Quit),
                ],
                200.0,
                backdrop,
            ))),
            Action::WaveCleared { score } => {
                let lines = vec![
                    "Get ready for the next wave".to_string(),
                    format!("Your score so far: {}", score as i64),
                    String::new(),
                    "Hint!".to_string(),
                    self.random_hint(),
                ];
                Transition::Replace(Frame::Dialog(Dialog::new(
                    "You won!",
                    lines,
                    Action::NewGame { prev_score: score },
                    backdrop,
                )))
            }
        })
    }

    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Continue => {}
            Transition::Pop => {
                if let Some(frame) = self.frames.pop() {
                    log::info!("Closed {}", frame.name());
                }
            }
            Transition::Push(frame) => {
                log::info!("Opened {}", frame.name());
                self.frames.push(frame);
            }
            Transition::Replace(frame) => {
                if let Some(old) = self.frames.pop() {
                    log::info!("Closed {}", old.name());
                }
                log::info!("Opened {}", frame.name());
                self.frames.push(frame);
            }
            Transition::Terminate => {
                log::info!("Terminating with {} frames open", self.frames.len());
                self.frames.clear();
            }
        }
    }

    /// Step until the stack empties or `max_ticks` have run.
    ///
    /// Returns the number of ticks run.
    pub fn run(
        &mut self,
        input: &mut dyn InputSource,
        renderer: &mut dyn Renderer,
        max_ticks: Option<u64>,
    ) -> Result<u64, SimError> {
        let throttle = Throttle::new(self.config.throttle.then_some(self.config.ticks_per_second));
        let mut ticks = 0;
        while !self.frames.is_empty() && max_ticks.is_none_or(|max| ticks < max) {
            let started = Instant::now();
            let transition = self.step(input, renderer)?;
            self.apply(transition);
            ticks += 1;
            throttle.wait(started.elapsed());
        }
        Ok(ticks)
    }
}

/// Sleeps out the rest of each tick
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    target: Option<Duration>,
}

impl Throttle {
    pub fn new(ticks_per_second: Option<u32>) -> Self {
        Self {
            target: ticks_per_second
                .filter(|tps| *tps > 0)
                .map(|tps| Duration::from_secs_f64(1.0 / tps as f64)),
        }
    }

    /// Time left in the tick after `elapsed` of work
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        match self.target {
            Some(target) if elapsed < target => target - elapsed,
            _ => Duration::ZERO,
        }
    }

    fn wait(&self, elapsed: Duration) {
        let remaining = self.remaining(elapsed);
        if remaining > Duration::ZERO {
            thread::sleep(remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::HeadlessRenderer;
    use crate::sim::{Key, ScriptedInput};
    use glam::Vec2;

    fn headless_config() -> SimConfig {
        SimConfig {
            throttle: false,
            ..SimConfig::default()
        }
    }

    fn click_at(x: f32, y: f32) -> ScriptedInput {
        let mut input = ScriptedInput::new(Vec2::new(x, y));
        input.push(InputEvent::PointerDown);
        input
    }

    #[test]
    fn test_menu_layout_hit() {
        let layout = MenuLayout {
            width: 350.0,
            options: 3,
        };
        assert_eq!(layout.height(), 110.0);
        assert_eq!(layout.hit(Vec2::new(300.0, 400.0)), Some(0));
        assert_eq!(layout.hit(Vec2::new(300.0, 420.0)), Some(1));
        assert_eq!(layout.hit(Vec2::new(300.0, 440.0)), Some(2));
        assert_eq!(layout.hit(Vec2::new(300.0, 392.0)), None);
        assert_eq!(layout.hit(Vec2::new(425.0, 400.0)), None);
    }

    #[test]
    fn test_start_game_flow() {
        let mut stack = FrameStack::new(headless_config(), 1);
        let mut renderer = HeadlessRenderer::new(1);

        // "Start game" opens the about dialog on top of the menu
        let mut input = click_at(300.0, 400.0);
        let t = stack.step(&mut input, &mut renderer).unwrap();
        stack.apply(t);
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top().map(Frame::name), Some("About"));

        // Any key dismisses it into a session
        input.push(InputEvent::KeyDown(Key::Other));
        let t = stack.step(&mut input, &mut renderer).unwrap();
        stack.apply(t);
        assert_eq!(stack.depth(), 2);
        assert!(matches!(stack.top(), Some(Frame::Session(_))));
    }

    #[test]
    fn test_menu_ignores_click_off_options() {
        let mut stack = FrameStack::new(headless_config(), 1);
        let mut renderer = HeadlessRenderer::new(1);
        let mut input = click_at(10.0, 10.0);
        assert!(matches!(stack.step(&mut input, &mut renderer).unwrap(), Transition::Continue));
        assert_eq!(renderer.last_overlay.as_deref(), Some("ORBITAL SMASH"));
    }

    #[test]
    fn test_quit_from_menu_terminates() {
        let mut stack = FrameStack::new(headless_config(), 1);
        let mut renderer = HeadlessRenderer::new(1);
        let mut input = click_at(300.0, 440.0);
        let t = stack.step(&mut input, &mut renderer).unwrap();
        assert!(matches!(t, Transition::Terminate));
        stack.apply(t);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pause_and_resume() {
        let mut renderer = HeadlessRenderer::new(2);
        let mut stack = FrameStack::new(headless_config(), 2);
        let t = stack
            .resolve(Action::NewGame { prev_score: 0.0 }, Vec::new(), &mut renderer)
            .unwrap();
        stack.apply(t);

        let mut input = ScriptedInput::new(Vec2::splat(400.0));
        input.push(InputEvent::KeyDown(Key::Pause));
        let t = stack.step(&mut input, &mut renderer).unwrap();
        stack.apply(t);
        assert_eq!(stack.top().map(Frame::name), Some("Pause"));
        match stack.top() {
            Some(Frame::Menu(menu)) => assert!(!menu.backdrop.is_empty()),
            _ => panic!("expected pause menu"),
        }

        // "Resume" is the first option of a 200-wide, 3-row menu
        input.set_pointer(Vec2::new(400.0, 400.0));
        input.push(InputEvent::PointerDown);
        let t = stack.step(&mut input, &mut renderer).unwrap();
        stack.apply(t);
        assert!(matches!(stack.top(), Some(Frame::Session(_))));
    }

    #[test]
    fn test_game_over_sequence() {
        let mut renderer = HeadlessRenderer::new(3);
        let mut stack = FrameStack::new(headless_config(), 3);
        let t = stack
            .resolve(Action::GameOver { score: 1234.0 }, Vec::new(), &mut renderer)
            .unwrap();
        stack.apply(t);
        match stack.top() {
            Some(Frame::Dialog(dialog)) => {
                assert_eq!(dialog.title, "You lost.");
                assert_eq!(dialog.lines[0], "Score: 1234");
                assert!(HINTS.contains(&dialog.lines[3].as_str()));
                assert_eq!(dialog.next, Action::LostMenu);
            }
            _ => panic!("expected lost dialog"),
        }

        let mut input = ScriptedInput::new(Vec2::ZERO);
        input.push(InputEvent::PointerDown);
        let t = stack.step(&mut input, &mut renderer).unwrap();
        stack.apply(t);
        match stack.top() {
            Some(Frame::Menu(menu)) => {
                assert_eq!(menu.options[0].0, "Play again?");
                assert_eq!(menu.options[0].1, Action::NewGame { prev_score: 0.0 });
            }
            _ => panic!("expected lost menu"),
        }
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_wave_cleared_carries_score() {
        let mut renderer = HeadlessRenderer::new(4);
        let mut stack = FrameStack::new(headless_config(), 4);
        let t = stack
            .resolve(Action::WaveCleared { score: 900.0 }, Vec::new(), &mut renderer)
            .unwrap();
        stack.apply(t);
        match stack.top() {
            Some(Frame::Dialog(dialog)) => {
                assert_eq!(dialog.title, "You won!");
                assert_eq!(dialog.next, Action::NewGame { prev_score: 900.0 });
            }
            _ => panic!("expected won dialog"),
        }

        let mut input = ScriptedInput::new(Vec2::ZERO);
        input.push(InputEvent::KeyDown(Key::Other));
        let t = stack.step(&mut input, &mut renderer).unwrap();
        stack.apply(t);
        match stack.top() {
            Some(Frame::Session(session)) => {
                assert_eq!(session.prev_score(), 900.0);
                assert_eq!(session.queue().len(), 6);
            }
            _ => panic!("expected next wave"),
        }
    }

    #[test]
    fn test_run_stops_on_quit() {
        let mut stack = FrameStack::new(headless_config(), 5);
        let mut renderer = HeadlessRenderer::new(5);
        let mut input = ScriptedInput::new(Vec2::ZERO);
        input.push(InputEvent::None);
        input.push(InputEvent::Quit);
        let ticks = stack.run(&mut input, &mut renderer, Some(100)).unwrap();
        assert_eq!(ticks, 2);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_run_respects_tick_limit() {
        let mut stack = FrameStack::new(headless_config(), 6);
        let mut renderer = HeadlessRenderer::new(6);
        let mut input = ScriptedInput::new(Vec2::ZERO);
        assert_eq!(stack.run(&mut input, &mut renderer, Some(10)).unwrap(), 10);
        assert_eq!(renderer.frames, 10);
    }

    #[test]
    fn test_throttle_remaining() {
        let throttle = Throttle::new(Some(50));
        assert_eq!(throttle.remaining(Duration::from_millis(25)), Duration::ZERO);
        assert_eq!(throttle.remaining(Duration::from_millis(5)), Duration::from_millis(15));
        assert_eq!(Throttle::new(None).remaining(Duration::ZERO), Duration::ZERO);
        assert_eq!(Throttle::new(Some(0)).remaining(Duration::ZERO), Duration::ZERO);
    }
}
