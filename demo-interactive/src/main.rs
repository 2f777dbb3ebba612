//! Interactive Spin Simulation Demo
//!
//! A terminal-based console for the precession and spin-echo demos.
//! Drives the same callbacks the GUI slider and checkboxes use, steps the
//! animation loops, and prints state for inspection.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package demo-interactive
//! ```
//!
//! # Commands
//!
//! - `field <B>` - Set B0 in tesla (clamped to the slider range)
//! - `nucleus <name>` - Select the gyromagnetic ratio (proton, carbon-13, ...)
//! - `nuclei` - Show the ratio checkboxes
//! - `step [n]` - Advance the precession by n ticks (default 1)
//! - `run <seconds>` - Run the precession in real time at the loop rate
//! - `status` - Show precession state
//! - `trail` - List trail points
//! - `plot [size]` - Top-down plot of the trail and the spin fan
//! - `echo step|run|status|reset` - Drive the spin-echo sequence
//! - `scene` - Show the scene layout
//! - `help` - Show available commands
//! - `quit` - Exit

use nalgebra::Vector2;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use spin_sim_core::{
    EchoPhase, Nucleus, Precession, RateLimiter, SceneLayout, SimulationConfig, SpinEcho, Tesla,
};
use std::thread;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Default plot size in characters
const DEFAULT_PLOT_SIZE: usize = 31;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║        Spin Simulation - Interactive Console              ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();

    let config = SimulationConfig::default();
    let mut precession = match Precession::new(config.precession.clone()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to create precession demo: {}", e);
            return;
        }
    };
    let mut echo = SpinEcho::new(config.spin_echo.clone());

    println!("Nucleus: {}", precession.nucleus().label());
    println!("{}", precession.readout());
    println!(
        "Spin echo: {} spins, {} dephasing ticks",
        echo.ensemble().len(),
        echo.dephase_steps()
    );

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to create readline: {}", e);
            return;
        }
    };

    println!("\nType 'help' for available commands.\n");

    loop {
        let readline = rl.readline("spin> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                let parts: Vec<&str> = line.split_whitespace().collect();

                if parts.is_empty() {
                    continue;
                }

                match parts[0].to_lowercase().as_str() {
                    "field" | "b" => {
                        if let Some(b) = parts.get(1).and_then(|s| s.parse::<f64>().ok()) {
                            let readout = precession.set_field(Tesla::new(b));
                            println!("{}", readout);
                        } else {
                            println!("Usage: field <tesla>");
                        }
                    }
                    "nucleus" | "n" => match parts.get(1).map(|s| s.parse::<Nucleus>()) {
                        Some(Ok(nucleus)) => {
                            let readout = precession.select_nucleus(nucleus).clone();
                            println!("Selected {}", nucleus.label());
                            println!("{}", readout);
                        }
                        Some(Err(e)) => println!("{}", e),
                        None => println!("Usage: nucleus <name>"),
                    },
                    "nuclei" => show_nuclei(&precession),
                    "step" | "s" => {
                        let count = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(1);
                        step_precession(&mut precession, count);
                    }
                    "run" | "r" => {
                        if let Some(secs) = parts.get(1).and_then(|s| s.parse::<f64>().ok()) {
                            run_precession(&mut precession, secs);
                        } else {
                            println!("Usage: run <seconds>");
                        }
                    }
                    "status" | "st" => show_status(&precession),
                    "trail" | "t" => show_trail(&precession),
                    "plot" | "p" => {
                        let size = parts
                            .get(1)
                            .and_then(|s| s.parse().ok())
                            .unwrap_or(DEFAULT_PLOT_SIZE);
                        show_plot(&precession, &echo, size);
                    }
                    "echo" | "e" => match parts.get(1).copied().unwrap_or("status") {
                        "step" | "s" => {
                            let count = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(1);
                            step_echo(&mut echo, count);
                        }
                        "run" | "r" => {
                            let realtime = parts.get(2).is_some_and(|s| *s == "realtime");
                            run_echo(&mut echo, realtime);
                        }
                        "status" | "st" => show_echo(&echo),
                        "reset" => {
                            echo.reset();
                            println!("Spin echo reset to {}", echo.phase());
                        }
                        other => println!(
                            "Unknown echo command: {}. Use step [n], run [realtime], status or reset.",
                            other
                        ),
                    },
                    "scene" => show_scene(&config),
                    "help" | "?" => show_help(),
                    "quit" | "q" | "exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => println!(
                        "Unknown command: {}. Type 'help' for available commands.",
                        parts[0]
                    ),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }
}

fn show_nuclei(sim: &Precession) {
    println!("\n═══════════════ GYROMAGNETIC RATIO ═══════════════");
    for (nucleus, checked) in sim.selection().states() {
        let mark = if checked { "x" } else { " " };
        println!("  [{}] {}", mark, nucleus.label());
    }
    println!("══════════════════════════════════════════════════\n");
}

fn step_precession(sim: &mut Precession, count: u32) {
    println!("Stepping {} tick(s)...", count);
    let start = Instant::now();
    for _ in 0..count {
        if let Err(e) = sim.tick() {
            println!("Tick failed: {}", e);
            return;
        }
    }
    let tip = sim.magnetization().tip();
    println!(
        "  Tick {}: tip = ({:.4}, {:.4}, {:.4}), trail {} point(s), {}µs",
        sim.ticks(),
        tip.x,
        tip.y,
        tip.z,
        sim.trail().len(),
        start.elapsed().as_micros()
    );
}

fn run_precession(sim: &mut Precession, secs: f64) {
    let rate_hz = sim.config().rate_hz;
    let mut limiter = RateLimiter::new(rate_hz);
    let ticks = (secs.max(0.0) * rate_hz).round() as u64;
    let report_every = (rate_hz.round() as u64).max(1);
    println!("Running {} tick(s) at {} Hz...", ticks, rate_hz);

    for i in 1..=ticks {
        limiter.rate();
        if let Err(e) = sim.tick() {
            println!("Tick failed: {}", e);
            return;
        }
        if i % report_every == 0 || i == ticks {
            let tip = sim.magnetization().tip();
            println!(
                "  t = {:6.2}s  tip = ({:7.4}, {:7.4}, {:7.4})",
                sim.elapsed(),
                tip.x,
                tip.y,
                tip.z
            );
        }
    }
    println!("Done.");
}

fn show_status(sim: &Precession) {
    let m = sim.magnetization();
    let pivot = sim.pivot();
    let tip = m.tip();
    let phase = (tip - pivot).y.atan2((tip - pivot).x).to_degrees();

    println!("\n═══════════════ PRECESSION STATUS ═══════════════");
    println!("Nucleus:         {}", sim.nucleus().label());
    println!("{}", sim.readout());
    println!("Ticks:           {}", sim.ticks());
    println!("Elapsed:         {:.2} s", sim.elapsed());
    println!("Step angle:      {:.6} rad/tick", sim.step_angle());
    println!("Pivot:           ({:.3}, {:.3}, {:.3})", pivot.x, pivot.y, pivot.z);
    println!(
        "Arrow base:      ({:.3}, {:.3}, {:.3})",
        m.pos().x,
        m.pos().y,
        m.pos().z
    );
    println!("Tip:             ({:.3}, {:.3}, {:.3})", tip.x, tip.y, tip.z);
    println!("Azimuth:         {:.1}°", phase);
    println!(
        "Trail:           {}/{} point(s)",
        sim.trail().len(),
        sim.trail().capacity()
    );
    println!("══════════════════════════════════════════════════\n");
}

fn show_trail(sim: &Precession) {
    if sim.trail().is_empty() {
        println!("Trail is empty. Use 'step' to advance the precession.");
        return;
    }
    println!("\n═══════════════ TRAIL (oldest first) ═══════════════");
    for (i, p) in sim.trail().iter().enumerate() {
        println!("  {:3}: ({:8.4}, {:8.4}, {:8.4})", i, p.x, p.y, p.z);
    }
    println!("══════════════════════════════════════════════════\n");
}

/// Map a point in the xy-plane onto a `size`×`size` character grid
fn to_cell(p: Vector2<f64>, half_extent: f64, size: usize) -> Option<(usize, usize)> {
    let scale = (size - 1) as f64 / (2.0 * half_extent);
    let col = ((p.x + half_extent) * scale).round();
    let row = ((half_extent - p.y) * scale).round();
    if col < 0.0 || row < 0.0 || col >= size as f64 || row >= size as f64 {
        return None;
    }
    Some((row as usize, col as usize))
}

fn show_plot(sim: &Precession, echo: &SpinEcho, size: usize) {
    let size = size.clamp(11, 81);
    let half_extent = sim.config().arrow_length.max(echo.config().spin_length) * 1.1;
    let mut grid = vec![vec!['.'; size]; size];

    if let Some((r, c)) = to_cell(Vector2::zeros(), half_extent, size) {
        grid[r][c] = '+';
    }
    for p in sim.trail() {
        if let Some((r, c)) = to_cell((p - sim.pivot()).xy(), half_extent, size) {
            grid[r][c] = 'o';
        }
    }
    if echo.ensemble().is_revealed() {
        for spin in echo.ensemble().spins() {
            if let Some((r, c)) = to_cell(spin.segment.tip().xy(), half_extent, size) {
                grid[r][c] = 's';
            }
        }
    }
    if let Some((r, c)) = to_cell((sim.magnetization().tip() - sim.pivot()).xy(), half_extent, size) {
        grid[r][c] = 'M';
    }

    println!("\nTop-down view (x →, y ↑), half-width {:.2}:", half_extent);
    for row in grid {
        println!("  {}", row.into_iter().collect::<String>());
    }
    println!("  M = precessing tip, o = trail, s = spin-echo tips, + = field axis\n");
}

fn step_echo(echo: &mut SpinEcho, count: u32) {
    for _ in 0..count {
        if echo.is_done() {
            println!("Sequence done. Use 'echo reset' to start over.");
            return;
        }
        let before = echo.phase();
        match echo.step() {
            Ok(step) => println!(
                "  {} → {} (pause {} ms)",
                before,
                step.phase,
                step.pause.as_millis()
            ),
            Err(e) => {
                println!("Step failed: {}", e);
                return;
            }
        }
    }
    show_echo(echo);
}

fn run_echo(echo: &mut SpinEcho, realtime: bool) {
    let mut limiter = RateLimiter::new(echo.config().rate_hz);
    let start_cycles = echo.counters().cycles_completed;
    let start = Instant::now();

    while !echo.is_done() && echo.counters().cycles_completed == start_cycles {
        let before = echo.phase();
        let step = match echo.step() {
            Ok(step) => step,
            Err(e) => {
                println!("Step failed: {}", e);
                return;
            }
        };
        if matches!(before, EchoPhase::Pulse90 | EchoPhase::Pulse180) {
            let m = echo.magnetization().axis();
            println!(
                "  {} applied: M = ({:.3}, {:.3}, {:.3})",
                before, m.x, m.y, m.z
            );
        }
        if realtime {
            limiter.rate();
            thread::sleep(step.pause);
        }
    }
    println!(
        "Sequence finished in {:.2}s.",
        start.elapsed().as_secs_f64()
    );
    show_echo(echo);
}

fn show_echo(echo: &SpinEcho) {
    let m = echo.magnetization();
    let counters = echo.counters();
    println!("\n═══════════════ SPIN ECHO STATUS ═══════════════");
    println!("Phase:           {}", echo.phase());
    println!("Policy:          {:?}", echo.config().policy);
    println!(
        "M:               ({:.3}, {:.3}, {:.3}), |M| = {:.4}",
        m.axis().x,
        m.axis().y,
        m.axis().z,
        m.length()
    );
    println!("Spins visible:   {}", echo.ensemble().is_revealed());
    println!("Coherence:       {:.4}", echo.ensemble().coherence());
    println!(
        "Pulses:          {} × 90°, {} × 180°",
        counters.pulses_90, counters.pulses_180
    );
    println!(
        "Dephasing ticks: {}/{}",
        counters.dephase_ticks,
        echo.dephase_steps()
    );
    println!("Cycles:          {}", counters.cycles_completed);
    println!("══════════════════════════════════════════════════\n");
}

fn show_scene(config: &SimulationConfig) {
    let layout = SceneLayout::bootstrap(&config.scene);
    let cam = &layout.camera;
    println!("\n═══════════════ SCENE LAYOUT ═══════════════");
    println!("Canvas:          {}x{}", layout.width, layout.height);
    println!(
        "Camera:          pos ({:.2}, {:.2}, {:.2}), up ({}, {}, {}), forward ({}, {}, {})",
        cam.pos.x, cam.pos.y, cam.pos.z, cam.up.x, cam.up.y, cam.up.z, cam.forward.x, cam.forward.y, cam.forward.z
    );
    println!(
        "Light:           ({:.1}, {:.1}, {:.1})",
        layout.light.pos.x, layout.light.pos.y, layout.light.pos.z
    );
    for (arrow, label) in layout.axes.iter().zip(&layout.labels) {
        println!(
            "Axis {:<3}         → ({:.2}, {:.2}, {:.2}), label at ({:.2}, {:.2}, {:.2})",
            label.text,
            arrow.axis.x,
            arrow.axis.y,
            arrow.axis.z,
            label.pos.x,
            label.pos.y,
            label.pos.z
        );
    }
    if let Some(caption) = layout.caption {
        println!("\n{}", caption.trim_end());
    }
    println!("══════════════════════════════════════════════════\n");
}

fn show_help() {
    println!("\n═══════════════ AVAILABLE COMMANDS ═══════════════");
    println!("  field <B>, b         - Set B0 in tesla (0 to 7)");
    println!("  nucleus <name>, n    - Select nucleus (proton, carbon-13, sodium-23,");
    println!("                         phosphorus-31, helium-3)");
    println!("  nuclei               - Show the ratio checkboxes");
    println!("  step [n], s [n]      - Advance the precession n ticks (default 1)");
    println!("  run <secs>, r        - Run the precession in real time");
    println!("  status, st           - Show precession status");
    println!("  trail, t             - List trail points");
    println!("  plot [size], p       - Top-down plot of trail and spins");
    println!("  echo step [n]        - Advance the spin echo n transitions");
    println!("  echo run [realtime]  - Run one full spin-echo sequence");
    println!("  echo status          - Show spin-echo status");
    println!("  echo reset           - Return the spin echo to its start");
    println!("  scene                - Show scene layout");
    println!("  help, ?              - Show this help");
    println!("  quit, q              - Exit");
    println!("══════════════════════════════════════════════════\n");
}
