//! Whole-session runs on the in-memory host: build, mount, bind, react.

use std::cell::RefCell;
use std::rc::Rc;

use apg_gui::headless::{HeadlessHost, ManualScheduler, NodeId};
use apg_gui::panels::{DemoPanel, LoggerPanel, StatsHudPanel};
use apg_gui::stats::{PanelGeometry, RasterSurface, StatsRegistry};
use apg_gui::time::ManualClock;
use apg_gui::{
    ControlRegistry, GuiConfig, GuiError, GuiSession, Logger, PanelBuilder, RangeSpec,
    RefreshFlag,
};
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
struct Sim {
    x: f64,
    body: Body,
}

#[derive(Debug, Default, Serialize)]
struct Body {
    label: String,
}

struct SliderPanel {
    state: Rc<RefCell<Sim>>,
    flag: RefreshFlag,
}

impl PanelBuilder<NodeId> for SliderPanel {
    fn build_controls(&mut self, reg: &mut ControlRegistry<NodeId>) -> apg_gui::Result<String> {
        let (state, flag) = (self.state.clone(), self.flag.clone());
        let r1 = reg.build_range_control("r1", "X", RangeSpec::new(5.0, 0.0, 10.0, 1.0), {
            move |v| {
                if !flag.is_refreshing() {
                    state.borrow_mut().x = v;
                }
            }
        })?;
        let out = reg.build_output_control("x-out", "x", "5")?;
        reg.add_reactivity("x-out", self.state.clone(), "x")?;
        let label = reg.build_paragraph_control("label", "")?;
        reg.add_reactivity("label", self.state.clone(), "body.label")?;
        Ok(reg.build_panel_control("slider-panel", &[r1, out, label]))
    }
}

fn slider_session() -> (HeadlessHost, GuiSession<HeadlessHost>, ManualScheduler, Rc<RefCell<Sim>>) {
    let mut host = HeadlessHost::new();
    let sched = ManualScheduler::new();
    let mut session = GuiSession::new(GuiConfig::default(), Rc::new(sched.clone()));
    let state = Rc::new(RefCell::new(Sim::default()));
    let mut panel = SliderPanel {
        state: state.clone(),
        flag: session.refresh_flag(),
    };
    let root = host.root();
    session.refresh(&mut host, &mut panel, &root, None).unwrap();
    (host, session, sched, state)
}

#[test]
fn slider_edit_flows_through_state_to_output() {
    let (mut host, mut session, sched, state) = slider_session();
    sched.run_pending();

    assert_eq!(host.value("r1"), Some("5"));
    host.input_by_user("r1", "8").unwrap();
    assert_eq!(state.borrow().x, 8.0);

    state.borrow_mut().body.label = "ball".into();
    assert_eq!(session.update_reactive_controls(&mut host).unwrap(), 2);
    assert_eq!(host.text("x-out").as_deref(), Some("8"));
    assert_eq!(host.text("label").as_deref(), Some("ball"));
}

#[test]
fn edits_during_a_refresh_are_ignored() {
    let (mut host, _session, sched, state) = slider_session();
    host.input_by_user("r1", "3").unwrap();
    assert_eq!(state.borrow().x, 0.0);

    sched.run_pending();
    host.input_by_user("r1", "3").unwrap();
    assert_eq!(state.borrow().x, 3.0);
}

#[test]
fn broken_reactive_path_fails_the_pass() {
    let mut host = HeadlessHost::new();
    let mut reg = ControlRegistry::new();
    let state = Rc::new(RefCell::new(Sim::default()));
    let html = reg.build_output_control("o", "o", "").unwrap();
    reg.add_reactivity("o", state, "x.y").unwrap();
    let root = host.root();
    apg_gui::host::Host::set_inner_html(&mut host, &root, &html).unwrap();
    apg_gui::bind(&mut reg, &mut host).unwrap();

    let err = apg_gui::update_reactive_controls(&reg, &mut host).unwrap_err();
    assert!(matches!(err, GuiError::PathNotComposite { .. }), "{err}");
}

#[test]
fn logger_panel_pages_through_a_stream() {
    let mut cfg = GuiConfig::default();
    cfg.logger.page_size = 2;
    let logger = Rc::new(RefCell::new(Logger::new(
        &cfg,
        ManualClock::new(0.0),
        Rc::new(|_: &str| {}),
    )));
    for i in 0..5 {
        logger.borrow_mut().log_no_time(&format!("line {i}"), "default", false).unwrap();
    }

    let mut host = HeadlessHost::new();
    let sched = ManualScheduler::new();
    let mut session = GuiSession::new(cfg, Rc::new(sched.clone()));
    let mut panel = LoggerPanel::new(logger, session.refresh_flag());
    let root = host.root();
    session.refresh(&mut host, &mut panel, &root, None).unwrap();
    sched.run_pending();

    panel.sync().unwrap();
    session.update_reactive_controls(&mut host).unwrap();
    assert_eq!(host.text("log-page").as_deref(), Some("1/3"));
    assert_eq!(host.text("log-text").as_deref(), Some("line 4\nline 3"));

    host.click("log-older").unwrap();
    host.click("log-older").unwrap();
    session.update_reactive_controls(&mut host).unwrap();
    assert_eq!(host.text("log-page").as_deref(), Some("3/3"));
    assert_eq!(host.text("log-text").as_deref(), Some("line 0"));
}

#[test]
fn demo_stats_selector_hides_other_panels() {
    let cfg = GuiConfig::default();
    let mut host = HeadlessHost::new();
    let clock = ManualClock::new(0.0);
    let logger = Rc::new(RefCell::new(Logger::new(&cfg, clock.clone(), Rc::new(|_: &str| {}))));
    let (w, h) = PanelGeometry::from_config(&cfg.stats).surface_size();
    let stats = StatsRegistry::with_standard_panels(cfg.stats.clone(), clock.clone(), None, |_| {
        Ok(RasterSurface::with_node(host.create_element("canvas"), w, h))
    })
    .unwrap();
    let stats = Rc::new(RefCell::new(stats));

    let sched = ManualScheduler::new();
    let mut session = GuiSession::new(cfg, Rc::new(sched.clone()));
    let flag = session.refresh_flag();
    let hud_panel = StatsHudPanel::new(stats.clone(), flag.clone(), host.alert_hook());
    let mut panel = DemoPanel::new(logger, hud_panel, flag);
    let root = host.root();
    let hud = host.create_element("div");
    session.refresh(&mut host, &mut panel, &root, Some(&hud)).unwrap();
    sched.run_pending();

    host.select_by_user("stats-select", "1").unwrap();
    let stats = stats.borrow();
    let visible: Vec<bool> = stats.panels().iter().map(|p| p.surface().is_visible()).collect();
    assert_eq!(visible, vec![false, true]);
    assert_eq!(host.children(hud).len(), 1);
}

struct BrokenPathPanel(Rc<RefCell<Sim>>);

impl PanelBuilder<NodeId> for BrokenPathPanel {
    fn build_controls(&mut self, reg: &mut ControlRegistry<NodeId>) -> apg_gui::Result<String> {
        let out = reg.build_output_control("o", "o", "")?;
        reg.add_reactivity("o", self.0.clone(), "x.y")?;
        Ok(out)
    }
}

#[test]
fn session_failures_reach_the_host_alert() {
    let mut host = HeadlessHost::new();
    let sched = ManualScheduler::new();
    let mut session = GuiSession::new(GuiConfig::default(), Rc::new(sched.clone()));
    let mut panel = BrokenPathPanel(Rc::new(RefCell::new(Sim::default())));
    let root = host.root();
    session.refresh(&mut host, &mut panel, &root, None).unwrap();
    assert!(host.alerts().is_empty());

    let err = session.update_reactive_controls(&mut host).unwrap_err();
    assert_eq!(host.alerts(), [err.alert_text()]);
}
