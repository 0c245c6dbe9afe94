//! AR Hoops headless entry point
//!
//! Runs a scripted session against the in-memory host: place the hoop, take a
//! handful of shots, report the score.

#[cfg(not(target_arch = "wasm32"))]
mod headless_demo {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use anyhow::Result;
    use clap::Parser;
    use glam::{Vec2, Vec3};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use ar_hoops::platform::PlaneHit;
    use ar_hoops::platform::headless::HeadlessHost;
    use ar_hoops::sim::{BallState, Contact, Tag, TouchEvent};
    use ar_hoops::{AudioDispatcher, GameEvent, Session, Settings, TickInput};

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Run a scripted headless AR Hoops session", long_about = None)]
    struct Args {
        /// Settings JSON (defaults are used if missing or invalid)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Number of shots to take
        #[arg(long, default_value_t = 5)]
        shots: u32,
        /// Simulated frame rate
        #[arg(long, default_value_t = 60.0)]
        fps: f32,
        /// Chance that a shot drops through the hoop
        #[arg(long, default_value_t = 0.5)]
        accuracy: f64,
        /// Overrides the settings seed
        #[arg(long)]
        seed: Option<u64>,
        /// Write the effective settings here and exit
        #[arg(long)]
        dump_settings: Option<PathBuf>,
    }

    /// Frames between release and the scripted hoop/ground contact
    const CONTACT_DELAY_FRAMES: u32 = 20;
    /// Safety cap on frames per shot
    const MAX_SHOT_FRAMES: u32 = 600;

    pub fn run() -> Result<()> {
        let args = Args::parse();

        let mut settings = match &args.settings {
            Some(path) => Settings::load_or_default(path),
            None => Settings::default(),
        };
        if let Some(seed) = args.seed {
            settings.seed = seed;
        }
        if let Some(path) = &args.dump_settings {
            return settings.save(path);
        }

        let dt = 1.0 / args.fps.max(1.0);
        let mut rng = Pcg32::seed_from_u64(settings.seed);

        let host = HeadlessHost::new(2);
        host.raycaster.set_hit(Some(PlaneHit {
            position: Vec3::new(0.0, -1.5, -3.0),
            within_polygon: true,
        }));

        let mut session = Session::new(host.host(), settings.clone());
        let dispatcher =
            AudioDispatcher::from_settings(Box::new(host.audio.clone()), &settings.audio, settings.seed);
        if session.register_audio(dispatcher).is_err() {
            log::warn!("Audio dispatcher rejected");
        }

        let thrown = Rc::new(RefCell::new(0u32));
        let thrown_count = thrown.clone();
        session.subscribe(move |event| match event {
            GameEvent::BallThrown { impulse } => {
                *thrown_count.borrow_mut() += 1;
                log::info!("Throw with impulse {:.3}", impulse.length());
            }
            GameEvent::ScoreChanged { score } => log::info!("Score: {}", score),
            GameEvent::HoopPlaced { position } => log::info!("Hoop at {:?}", position),
            _ => {}
        });

        // Tap the floor to place the hoop
        session.tick(
            &TickInput {
                touches: vec![TouchEvent::began(Vec2::new(540.0, 600.0))],
                ..Default::default()
            },
            dt,
        );

        for shot in 0..args.shots {
            let drift = (shot as f32 - args.shots as f32 / 2.0) * 30.0;
            let swish = rng.random_bool(args.accuracy.clamp(0.0, 1.0));
            let pull = rng.random_range(150.0..450.0);

            session.tick(
                &TickInput {
                    touches: vec![
                        TouchEvent::began(Vec2::new(540.0, 300.0)),
                        TouchEvent::ended(Vec2::new(540.0 + drift, 300.0 + pull)),
                    ],
                    ..Default::default()
                },
                dt,
            );

            let mut frames = 0;
            while session.ball_state() == BallState::InFlight && frames < MAX_SHOT_FRAMES {
                host.ball.step(dt);
                frames += 1;

                let mut input = TickInput::default();
                if frames == CONTACT_DELAY_FRAMES {
                    if swish {
                        input.contacts.push(Contact::collision(Tag::HoopSurface));
                        input.contacts.push(Contact::trigger(Tag::Hoop));
                    } else {
                        input.contacts.push(Contact::collision(Tag::Ground));
                        input.contacts.push(Contact::trigger(Tag::Ground));
                    }
                }
                session.tick(&input, dt);
            }
            log::debug!("Shot {} resolved after {} frames", shot + 1, frames);
        }

        // Let the celebration timers run out
        while session.pending_particle_stops() > 0 {
            session.tick(&TickInput::default(), dt);
        }

        session.shutdown();
        println!(
            "Shots: {}  Score: {}  Respawns: {}  Sounds: {}",
            *thrown.borrow(),
            session.score(),
            session.throws(),
            host.audio.played().len()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("AR Hoops (headless) starting...");
    headless_demo::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives `Session` directly
}
