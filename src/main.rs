//! Orbital Smash entry point
//!
//! Runs the simulation headless with a scripted demo pilot. Usage:
//!
//! ```text
//! orbital-smash [CONFIG.json] [--ticks N] [--seed N] [--orbit unit|inverse-square] [--fast]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::process::ExitCode;

    use glam::Vec2;
    use orbital_smash::consts::ARENA_CENTER;
    use orbital_smash::frames::Frame;
    use orbital_smash::sim::{InputEvent, InputSource, Session};
    use orbital_smash::{FrameStack, HeadlessRenderer, OrbitAttraction, Polar, SimConfig};

    /// Circles the arena and pulses the tractor beam
    pub struct DemoPilot {
        tick: u64,
    }

    impl DemoPilot {
        const BEAM_PERIOD: u64 = 100;
        const BEAM_HOLD: u64 = 60;

        pub fn new() -> Self {
            Self { tick: 0 }
        }
    }

    impl InputSource for DemoPilot {
        fn poll_event(&mut self) -> InputEvent {
            self.tick += 1;
            match self.tick % Self::BEAM_PERIOD {
                0 => InputEvent::PointerDown,
                Self::BEAM_HOLD => InputEvent::PointerUp,
                _ => InputEvent::None,
            }
        }

        fn pointer(&self) -> Vec2 {
            Vec2::splat(ARENA_CENTER) + Polar::new(150.0, self.tick as f32 * 0.02).to_cartesian()
        }
    }

    struct Args {
        config: Option<String>,
        ticks: u64,
        seed: u64,
        fast: bool,
        orbit: Option<OrbitAttraction>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = Args {
            config: None,
            ticks: 3_000,
            seed: 0x5eed,
            fast: false,
            orbit: None,
        };
        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--ticks" => {
                    let value = it.next().ok_or("--ticks needs a value")?;
                    args.ticks = value.parse().map_err(|e| format!("bad --ticks: {e}"))?;
                }
                "--seed" => {
                    let value = it.next().ok_or("--seed needs a value")?;
                    args.seed = value.parse().map_err(|e| format!("bad --seed: {e}"))?;
                }
                "--fast" => args.fast = true,
                "--orbit" => {
                    let value = it.next().ok_or("--orbit needs a value")?;
                    args.orbit = Some(
                        OrbitAttraction::from_str(&value).ok_or(format!("unknown orbit attraction: {value}"))?,
                    );
                }
                path => args.config = Some(path.to_string()),
            }
        }
        Ok(args)
    }

    pub fn run() -> ExitCode {
        env_logger::init();
        log::info!("Orbital Smash {} (headless) starting...", orbital_smash::VERSION);

        let args = match parse_args() {
            Ok(args) => args,
            Err(message) => {
                log::error!("{message}");
                return ExitCode::FAILURE;
            }
        };

        let mut config = match &args.config {
            Some(path) => match SimConfig::load(path) {
                Ok(config) => config,
                Err(e) => {
                    log::error!("{e}");
                    return ExitCode::FAILURE;
                }
            },
            None => SimConfig::default(),
        };
        if args.fast {
            config.throttle = false;
        }
        if let Some(orbit) = args.orbit {
            config.physics.orbit_attraction = orbit;
        }
        log::info!(
            "Seed {}, orbit attraction {}, throttle {}",
            args.seed,
            config.physics.orbit_attraction.as_str(),
            config.throttle
        );

        let mut renderer = HeadlessRenderer::new(args.seed);
        let mut pilot = DemoPilot::new();
        let session = match Session::new(0.0, config.clone(), args.seed, &mut renderer) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Simulation stopped: {e}");
                return ExitCode::FAILURE;
            }
        };
        let mut stack = FrameStack::with_frame(config, args.seed, Frame::Session(Box::new(session)));

        match stack.run(&mut pilot, &mut renderer, Some(args.ticks)) {
            Ok(ticks) => {
                let top = stack.top().map(Frame::name).unwrap_or("nothing");
                log::info!("Ran {} ticks, {} frames drawn, ended on {}", ticks, renderer.frames, top);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Simulation stopped: {e}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is used directly
}
