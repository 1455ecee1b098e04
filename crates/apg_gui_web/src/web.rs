//! Browser app: the demo panel on the live DOM with canvas stats panels.

mod canvas;
mod console;
mod dom;
mod heap;
mod scheduler;
mod storage;

use std::cell::RefCell;
use std::rc::Rc;

use apg_gui::panels::{DemoPanel, StatsHudPanel};
use apg_gui::stats::{HeapProbe, StatsRegistry};
use apg_gui::time::MonotonicClock;
use apg_gui::{GuiError, GuiSession, Logger, Result};
use tracing::{error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use canvas::CanvasSurface;
use dom::DomHost;
use heap::PerformanceHeap;
use scheduler::TimeoutScheduler;

const CONTROLS_ID: &str = "apg-gui-controls";
const HUD_ID: &str = "apg-gui-hud";

type Stats = Rc<RefCell<StatsRegistry<CanvasSurface>>>;

struct App {
    host: DomHost,
    session: GuiSession<DomHost>,
    panel: DemoPanel<CanvasSurface>,
    stats: Stats,
}

impl App {
    fn frame(&mut self) -> Result<()> {
        self.stats.borrow_mut().begin(None);
        self.panel.tick();
        let host = &self.host;
        self.stats.borrow_mut().end(None).map_err(|e| host.surface(e))?;
        self.panel.log_panel().sync().map_err(|e| host.surface(e))?;
        // Alerts on its own.
        self.session.update_reactive_controls(&mut self.host)?;
        Ok(())
    }
}

pub fn start() {
    console::init_tracing();
    match mount() {
        Ok(app) => animate(Rc::new(RefCell::new(app))),
        Err(e) => fail(&e),
    }
}

/// Halt. Callers alert first whenever a window exists.
fn fail(e: &GuiError) -> ! {
    let text = e.alert_text();
    error!("{text}");
    wasm_bindgen::throw_str(&text)
}

fn mount() -> Result<App> {
    let mut host = DomHost::new()?;
    let config = storage::load_config(host.window());
    storage::save_config(&config);

    let clock = MonotonicClock::new();
    let logger = Rc::new(RefCell::new(Logger::new(&config, clock, host.alert_hook())));

    let heap = host
        .window()
        .performance()
        .and_then(PerformanceHeap::detect)
        .map(|h| Box::new(h) as Box<dyn HeapProbe>);
    let document = host.document().clone();
    let stats = StatsRegistry::with_standard_panels(config.stats.clone(), clock, heap, |g| {
        CanvasSurface::new(&document, g)
    })
    .map_err(|e| host.surface(e))?;
    let stats = Rc::new(RefCell::new(stats));

    let scheduler = Rc::new(TimeoutScheduler::new(host.window().clone()));
    let mut session = GuiSession::new(config, scheduler);
    let flag = session.refresh_flag();
    let hud_panel = StatsHudPanel::new(stats.clone(), flag.clone(), host.alert_hook());
    let mut panel = DemoPanel::new(logger, hud_panel, flag);

    let controls = host.container(CONTROLS_ID).map_err(|e| host.surface(e))?;
    let hud = host.container(HUD_ID).map_err(|e| host.surface(e))?;
    // Alerts on its own.
    let listeners = session.refresh(&mut host, &mut panel, &controls, Some(&hud))?;
    info!(controls = session.registry().len(), listeners, "demo mounted");

    Ok(App {
        host,
        session,
        panel,
        stats,
    })
}

fn request_frame(window: &web_sys::Window, cb: &Closure<dyn FnMut(f64)>) -> Result<()> {
    window
        .request_animation_frame(cb.as_ref().unchecked_ref())
        .map(drop)
        .map_err(|e| dom::js_err("requestAnimationFrame", e))
}

/// Drive [`App::frame`] from `requestAnimationFrame` until a frame fails.
fn animate(app: Rc<RefCell<App>>) {
    let window = app.borrow().host.window().clone();
    let slot: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = slot.clone();
    let w = window.clone();

    *slot.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        let result = app.borrow_mut().frame();
        if let Err(e) = result {
            fail(&e);
        }
        if let Some(cb) = next.borrow().as_ref() {
            if let Err(e) = request_frame(&w, cb) {
                error!("{e}");
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(cb) = slot.borrow().as_ref() {
        if let Err(e) = request_frame(&window, cb) {
            let _ = window.alert_with_message(&e.alert_text());
            fail(&e);
        }
    }
}
