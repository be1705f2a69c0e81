//! Fortune FX entry point
//!
//! The web build is driven from JavaScript through the library exports. The
//! native build plays one spin and celebration headlessly and prints a
//! timeline of the effect state.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use fortune_fx::consts::FRAME_DT;
    use fortune_fx::fx::{AnimationSession, SessionPhase};
    use fortune_fx::settings::Settings;
    use fortune_fx::wheel::{TickTracker, default_items, plan_spin};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    env_logger::init();
    log::info!("Fortune FX (native) starting...");

    // Optional seed as first argument for reproducible runs
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x5eed);
    let mut rng = Pcg32::seed_from_u64(seed);

    let items = default_items();
    let Some(plan) = plan_spin(&items, 0.0, &mut rng) else {
        log::error!("No drawable items");
        return;
    };

    // Replay the spin at 60 fps counting boundary ticks
    let mut ticker = TickTracker::for_items(&items);
    let mut ticks = 0;
    let mut ms = 0.0;
    while !plan.is_done(ms) {
        if ticker.update(plan.angle_at(ms)) {
            ticks += 1;
        }
        ms += 1000.0 / 60.0;
    }
    println!(
        "Spin: {} after {} turns ({} ticks), settled at {:.1} deg",
        items[plan.winner].name,
        plan.extra_turns,
        ticks,
        plan.settled_deg()
    );

    let settings = Settings::load();
    let mut session = AnimationSession::new(
        settings.effective_options(),
        settings.emitter_counts(),
        fortune_fx::consts::DEFAULT_WIDTH,
        fortune_fx::consts::DEFAULT_HEIGHT,
        rng,
    );
    session.tension();
    session.celebrate();

    println!("  t(s)  burst      confetti   shake  zoom  spot");
    let frames_per_second = (1.0 / FRAME_DT).round() as u64;
    let mut time_ms = 0.0;
    loop {
        time_ms += f64::from(FRAME_DT) * 1000.0;
        session.advance(FRAME_DT, time_ms);

        if session.frames() % frames_per_second == 0 {
            let burst = session.burst();
            let confetti = session.confetti();
            println!(
                "{:6.1}  {:<5} {:.2} {:<5} {:.2} {:.2}   {:.2}  {:.2}",
                time_ms / 1000.0,
                burst.visible(),
                burst.opacity(),
                confetti.visible(),
                confetti.opacity(),
                session.camera().shake_budget(),
                session.camera().zoom_budget(),
                session.lighting().spot.light.intensity,
            );
        }
        if session.phase() == SessionPhase::Idle {
            break;
        }
    }
    println!("Celebration finished after {} frames", session.frames());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the library's start function, this is just to satisfy the compiler
}
