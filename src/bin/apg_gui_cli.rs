//! Headless driver for the demo panel.
//!
//! Examples:
//!   apg-gui-cli markup
//!   apg-gui-cli run 120
//!   apg-gui-cli --config gui.json config
//!
//! `run` mounts the demo into the in-memory host, plays a scripted user
//! session over simulated frames and prints the resulting outputs, stats
//! labels and log page.

use std::cell::{Cell, RefCell};
use std::process;
use std::rc::Rc;

use apg_gui::headless::{HeadlessHost, ManualScheduler, NodeId};
use apg_gui::host::AlertHook;
use apg_gui::panels::{DemoPanel, StatsHudPanel};
use apg_gui::stats::{HeapProbe, PanelGeometry, RasterSurface, StatsRegistry};
use apg_gui::time::ManualClock;
use apg_gui::{GuiConfig, GuiError, GuiSession, Logger};
use tracing::info;

/// Simulated frame length.
const FRAME_MS: f64 = 1000.0 / 60.0;

type Demo = DemoPanel<RasterSurface<NodeId>>;

/// Grows by a fixed amount per sample so the MB panel has something to show.
struct SimulatedHeap(Cell<f64>);

impl HeapProbe for SimulatedHeap {
    fn used_mb(&self) -> Option<f64> {
        self.0.set(self.0.get() + 0.25);
        Some(self.0.get())
    }
}

fn usage() -> ! {
    eprintln!("apg-gui-cli (headless demo panel)");
    eprintln!("Usage: apg-gui-cli [--config path] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  markup              Print the demo panel and HUD markup");
    eprintln!("  run [frames]        Mount the demo and simulate frames (default 120)");
    eprintln!("  config              Print the effective configuration");
    process::exit(1);
}

fn parse_args() -> (Option<String>, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = None;
    if args.len() >= 2 && args[0] == "--config" {
        config = Some(args[1].clone());
        args.drain(0..2);
    }
    if args.is_empty() {
        usage();
    }
    (config, args)
}

fn load_config(path: Option<&str>) -> Result<GuiConfig, String> {
    let Some(path) = path else {
        return Ok(GuiConfig::default());
    };
    let raw = std::fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))?;
    GuiConfig::from_json(&raw).map_err(|e| format!("{path}: {e}"))
}

struct Rig {
    host: HeadlessHost,
    session: GuiSession<HeadlessHost>,
    sched: ManualScheduler,
    panel: Demo,
    stats: Rc<RefCell<StatsRegistry<RasterSurface<NodeId>>>>,
    clock: ManualClock,
    hud: NodeId,
}

fn build(config: GuiConfig) -> Result<Rig, GuiError> {
    let mut host = HeadlessHost::new();
    let clock = ManualClock::new(0.0);
    let alert: AlertHook = Rc::new(|msg: &str| eprintln!("alert: {msg}"));
    let logger = Rc::new(RefCell::new(Logger::new(&config, clock.clone(), alert)));

    let (w, h) = PanelGeometry::from_config(&config.stats).surface_size();
    let heap: Box<dyn HeapProbe> = Box::new(SimulatedHeap(Cell::new(32.0)));
    let stats = StatsRegistry::with_standard_panels(
        config.stats.clone(),
        clock.clone(),
        Some(heap),
        |_| Ok(RasterSurface::with_node(host.create_element("canvas"), w, h)),
    )?;
    let stats = Rc::new(RefCell::new(stats));

    let sched = ManualScheduler::new();
    let session = GuiSession::new(config, Rc::new(sched.clone()));
    let flag = session.refresh_flag();
    let hud_panel = StatsHudPanel::new(stats.clone(), flag.clone(), host.alert_hook());
    let panel = DemoPanel::new(logger, hud_panel, flag);
    let hud = host.create_element("div");

    Ok(Rig {
        host,
        session,
        sched,
        panel,
        stats,
        clock,
        hud,
    })
}

fn mount(rig: &mut Rig) -> Result<usize, GuiError> {
    let root = rig.host.root();
    let listeners = rig
        .session
        .refresh(&mut rig.host, &mut rig.panel, &root, Some(&rig.hud))?;
    rig.sched.run_pending();
    Ok(listeners)
}

fn frame(rig: &mut Rig) -> Result<(), GuiError> {
    rig.stats.borrow_mut().begin(None);
    rig.panel.tick();
    rig.clock.advance(FRAME_MS);
    rig.stats.borrow_mut().end(None)?;
    rig.panel.log_panel().sync()?;
    rig.session.update_reactive_controls(&mut rig.host)?;
    Ok(())
}

/// User actions applied at fixed frames.
fn script(rig: &mut Rig, frame: usize) -> Result<(), GuiError> {
    match frame {
        10 => rig.host.input_by_user("demo-gravity", "4.2").map(drop),
        20 => rig.host.toggle_by_user("demo-advanced", true).map(drop),
        30 => rig.host.select_by_user("demo-integrator", "rk4").map(drop),
        40 => rig.host.set_checked_by_user("demo-paused", true).map(drop),
        50 => rig.host.set_checked_by_user("demo-paused", false).map(drop),
        60 => rig.host.select_by_user("stats-select", "1").map(drop),
        _ => Ok(()),
    }
}

fn run(config: GuiConfig, frames: usize) -> Result<(), GuiError> {
    let mut rig = build(config)?;
    let listeners = mount(&mut rig)?;
    info!(controls = rig.session.registry().len(), listeners, "demo mounted");

    for i in 0..frames {
        script(&mut rig, i)?;
        frame(&mut rig)?;
    }

    for id in ["demo-frame", "demo-gravity-out", "log-page"] {
        println!("{id}: {}", rig.host.text(id).unwrap_or_default());
    }
    for panel in rig.stats.borrow().panels() {
        let visible = if panel.surface().is_visible() { "shown" } else { "hidden" };
        println!("{:<4} {visible:<6} {}", panel.name(), panel.label());
    }
    println!("--- log ---");
    println!("{}", rig.host.text("log-text").unwrap_or_default());
    for alert in rig.host.alerts() {
        eprintln!("alert: {alert}");
    }
    Ok(())
}

fn markup(config: GuiConfig) -> Result<(), GuiError> {
    use apg_gui::PanelBuilder;

    let mut rig = build(config)?;
    let mut registry = apg_gui::ControlRegistry::new();
    println!("{}", rig.panel.build_controls(&mut registry)?);
    println!("{}", rig.panel.build_hud_controls(&mut registry)?);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();

    let (config_path, args) = parse_args();
    let config = load_config(config_path.as_deref()).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let result = match args[0].as_str() {
        "markup" => markup(config),
        "run" => {
            let frames = match args.get(1) {
                Some(n) => n.parse().unwrap_or_else(|_| {
                    eprintln!("frames must be a number");
                    process::exit(1);
                }),
                None => 120,
            };
            run(config, frames)
        }
        "config" => config.to_json().map(|json| println!("{json}")),
        _ => usage(),
    };

    if let Err(e) = result {
        eprintln!("{}", e.alert_text());
        process::exit(1);
    }
}
