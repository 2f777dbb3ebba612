use clap::{Parser, ValueEnum};
use serde::Serialize;
use spin_sim_core::{
    EchoPhase, EchoPolicy, Nucleus, OrientedSegment, Precession, RateLimiter, SceneLayout,
    SimulationConfig, SpinEcho, Tesla, Trail,
};
use std::error::Error;
use std::process::ExitCode;
use std::thread;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Demo {
    /// Larmor precession about the static field
    Precession,
    /// 90° pulse, dephasing, 180° refocusing pulse
    SpinEcho,
}

/// Spin simulation demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "spin-sim-demo")]
#[command(about = "Headless Larmor precession and spin-echo runner", long_about = None)]
struct Args {
    /// Which demo to run
    #[arg(value_enum, default_value_t = Demo::Precession)]
    demo: Demo,

    /// JSON config file (missing fields use defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// B0 field strength in T (precession)
    #[arg(short = 'b', long)]
    field: Option<f64>,

    /// Nucleus (proton, carbon-13, sodium-23, phosphorus-31, helium-3)
    #[arg(short, long)]
    nucleus: Option<Nucleus>,

    /// Number of precession ticks
    #[arg(short, long, default_value_t = 500)]
    ticks: u64,

    /// Report every N ticks (precession) or dephasing ticks (spin echo)
    #[arg(short, long, default_value_t = 50)]
    report_interval: u64,

    /// Number of spin-echo cycles (more than one implies the cyclic policy)
    #[arg(long, default_value_t = 1)]
    cycles: usize,

    /// Honour the loop rate and the spin-echo pauses instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Print the final state as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PrecessionSnapshot<'a> {
    nucleus: Nucleus,
    field_tesla: f64,
    larmor_hz: f64,
    ticks: u64,
    magnetization: &'a OrientedSegment,
    trail: &'a Trail,
}

#[derive(Serialize)]
struct SpinEchoSnapshot<'a> {
    phase: String,
    pulses_90: usize,
    dephase_ticks: usize,
    pulses_180: usize,
    coherence: f64,
    magnetization: &'a OrientedSegment,
    spins: Vec<&'a OrientedSegment>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(nucleus) = args.nucleus {
        config.precession.nucleus = nucleus;
    }
    if args.cycles > 1 {
        config.spin_echo.policy = EchoPolicy::Cyclic;
    }
    config.validate()?;

    let layout = SceneLayout::bootstrap(&config.scene);
    println!("=== Spin Simulation Demo ===\n");
    if let Some(title) = &layout.title {
        println!("{title}");
    }
    println!(
        "Scene: {}x{} canvas, camera at ({:.1}, {:.1}, {:.1}), {} axes\n",
        layout.width,
        layout.height,
        layout.camera.pos.x,
        layout.camera.pos.y,
        layout.camera.pos.z,
        layout.axes.len()
    );

    match args.demo {
        Demo::Precession => run_precession(args, &config),
        Demo::SpinEcho => run_spin_echo(args, &config),
    }
}

/// Yield to the limiter (when pacing), then advance the demo once
fn paced<T>(limiter: Option<&mut RateLimiter>, advance: impl FnOnce() -> T) -> T {
    if let Some(limiter) = limiter {
        limiter.rate();
    }
    advance()
}

fn run_precession(args: &Args, config: &SimulationConfig) -> Result<(), Box<dyn Error>> {
    let mut sim = Precession::new(config.precession.clone())?;
    if let Some(b) = args.field {
        sim.set_field(Tesla::new(b));
    }
    let mut limiter = RateLimiter::new(config.precession.rate_hz);
    let interval = args.report_interval.max(1);

    println!("Nucleus: {}", sim.nucleus().label());
    println!("{}\n", sim.readout());
    println!("  Tick |  Time(s) |    Tip X |    Tip Y |    Tip Z | Trail");
    println!("-------|----------|----------|----------|----------|------");

    for _ in 0..args.ticks {
        paced(args.realtime.then_some(&mut limiter), || sim.tick())?;
        if sim.ticks() % interval == 0 {
            let tip = sim.magnetization().tip();
            println!(
                "{:6} | {:8.2} | {:8.4} | {:8.4} | {:8.4} | {:5}",
                sim.ticks(),
                sim.elapsed(),
                tip.x,
                tip.y,
                tip.z,
                sim.trail().len()
            );
        }
    }

    println!("\n{}", sim.readout());

    if args.json {
        let snapshot = PrecessionSnapshot {
            nucleus: sim.nucleus(),
            field_tesla: *sim.field(),
            larmor_hz: *sim.larmor_frequency(),
            ticks: sim.ticks(),
            magnetization: sim.magnetization(),
            trail: sim.trail(),
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn run_spin_echo(args: &Args, config: &SimulationConfig) -> Result<(), Box<dyn Error>> {
    let mut echo = SpinEcho::new(config.spin_echo.clone());
    let mut limiter = RateLimiter::new(config.spin_echo.rate_hz);
    let interval = args.report_interval.max(1) as usize;
    let cycles = args.cycles.max(1);

    println!(
        "M0 = {}, T2 = {}, {} spins, {} dephasing ticks, {} cycle(s)\n",
        config.spin_echo.m0,
        config.spin_echo.t2,
        echo.ensemble().len(),
        echo.dephase_steps(),
        cycles
    );

    while echo.counters().cycles_completed < cycles && !echo.is_done() {
        let before = echo.phase();
        let step = paced(args.realtime.then_some(&mut limiter), || echo.step())?;

        match before {
            EchoPhase::Idle => println!("Cycle {} starting", echo.counters().cycles_completed + 1),
            EchoPhase::Pulse90 => {
                let m = echo.magnetization().axis();
                println!("  90° pulse  -> M = ({:.3}, {:.3}, {:.3})", m.x, m.y, m.z);
            }
            EchoPhase::Dephasing { tick } if (tick + 1) % interval == 0 => {
                println!(
                    "  tick {:4}  |M| = {:.4}  coherence = {:.4}",
                    tick + 1,
                    echo.magnetization().length(),
                    echo.ensemble().coherence()
                );
            }
            EchoPhase::Pulse180 => {
                let m = echo.magnetization().axis();
                println!("  180° pulse -> M = ({:.3}, {:.3}, {:.3})", m.x, m.y, m.z);
            }
            EchoPhase::Dephasing { .. } | EchoPhase::Done => {}
        }

        if args.realtime && !step.pause.is_zero() {
            thread::sleep(step.pause);
        }
    }

    let counters = echo.counters();
    println!(
        "\nFinished in phase '{}': {} × 90°, {} dephasing ticks, {} × 180°",
        echo.phase(),
        counters.pulses_90,
        counters.dephase_ticks,
        counters.pulses_180
    );

    if args.json {
        let snapshot = SpinEchoSnapshot {
            phase: echo.phase().to_string(),
            pulses_90: counters.pulses_90,
            dephase_ticks: counters.dephase_ticks,
            pulses_180: counters.pulses_180,
            coherence: echo.ensemble().coherence(),
            magnetization: echo.magnetization(),
            spins: echo.ensemble().spins().iter().map(|s| &s.segment).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}
