//! Showcase panel used by the CLI and the browser app.
//!
//! Every control kind appears once. The logger and stats panels are nested so
//! one refresh mounts the whole page.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use tracing::error;

use crate::error::Result;
use crate::fmt::fmt_fixed;
use crate::logger::Logger;
use crate::refresh::RefreshFlag;
use crate::registry::{ControlRegistry, RangeSpec};
use crate::stats::Surface;

use super::{LoggerPanel, PanelBuilder, StatsHudPanel};

/// State the demo controls edit and the reactive outputs display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoState {
    pub gravity: f64,
    pub paused: bool,
    pub tint: String,
    pub integrator: String,
    pub frame: u64,
    pub help_open: bool,
}

impl Default for DemoState {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            paused: false,
            tint: "#7aa2ff".to_string(),
            integrator: "verlet".to_string(),
            frame: 0,
            help_open: false,
        }
    }
}

pub struct DemoPanel<S: Surface> {
    state: Rc<RefCell<DemoState>>,
    logger: Rc<RefCell<Logger>>,
    log_panel: LoggerPanel,
    stats_panel: StatsHudPanel<S>,
    flag: RefreshFlag,
}

impl<S: Surface> DemoPanel<S> {
    pub fn new(
        logger: Rc<RefCell<Logger>>,
        stats_panel: StatsHudPanel<S>,
        flag: RefreshFlag,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(DemoState::default())),
            log_panel: LoggerPanel::new(logger.clone(), flag.clone()),
            logger,
            stats_panel,
            flag,
        }
    }

    pub fn state(&self) -> Rc<RefCell<DemoState>> {
        self.state.clone()
    }

    pub fn log_panel(&self) -> &LoggerPanel {
        &self.log_panel
    }

    pub fn stats_panel(&self) -> &StatsHudPanel<S> {
        &self.stats_panel
    }

    /// Advance one frame unless paused.
    pub fn tick(&self) {
        let mut s = self.state.borrow_mut();
        if !s.paused {
            s.frame += 1;
        }
    }

    /// Wrap `edit` so it is skipped during a panel swap and logs what changed.
    fn handler<A: 'static>(
        &self,
        edit: impl Fn(&mut DemoState, A) -> String + 'static,
    ) -> impl FnMut(A) + 'static {
        let (state, logger, flag) = (self.state.clone(), self.logger.clone(), self.flag.clone());
        move |arg: A| {
            if flag.is_refreshing() {
                return;
            }
            let line = edit(&mut *state.borrow_mut(), arg);
            let mut logger = logger.borrow_mut();
            let stream = logger.default_logger().to_string();
            if let Err(e) = logger.log(&line, &stream, false) {
                error!("demo: {e}");
                logger.alert(&e.alert_text());
            }
        }
    }
}

impl<S> PanelBuilder<S::Node> for DemoPanel<S>
where
    S: Surface + 'static,
{
    fn build_controls(&mut self, reg: &mut ControlRegistry<S::Node>) -> Result<String> {
        let initial = self.state.borrow().clone();

        let title = reg.build_paragraph_control("demo-title", "apg_gui demo")?;
        let gravity = reg.build_range_control(
            "demo-gravity",
            "Gravity",
            RangeSpec::new(initial.gravity, 0.0, 20.0, 0.1),
            self.handler(|s, g: f64| {
                s.gravity = g;
                format!("gravity = {}", fmt_fixed(g, 1))
            }),
        )?;
        let gravity_out =
            reg.build_output_control("demo-gravity-out", "g", &fmt_fixed(initial.gravity, 1))?;
        reg.add_reactivity("demo-gravity-out", self.state.clone(), "gravity")?;
        let paused = reg.build_check_box_control(
            "demo-paused",
            "Paused",
            initial.paused,
            self.handler(|s, on: bool| {
                s.paused = on;
                (if on { "paused" } else { "resumed" }).to_string()
            }),
        )?;
        reg.add_reactivity("demo-paused", self.state.clone(), "paused")?;
        let frame = reg.build_output_control("demo-frame", "Frame", &initial.frame.to_string())?;
        reg.add_reactivity("demo-frame", self.state.clone(), "frame")?;
        let reset = reg.build_button_control("demo-reset", "Reset", {
            let mut reset = self.handler(|s, ()| {
                s.frame = 0;
                "frame counter reset".to_string()
            });
            move || reset(())
        })?;
        let physics = reg.build_field_set_control(
            "demo-physics",
            "Physics",
            &[gravity, gravity_out, paused, frame, reset],
        );

        let tint = reg.build_color_picker_control(
            "demo-tint",
            "Tint",
            &initial.tint,
            self.handler(|s, c: String| {
                let line = format!("tint = {c}");
                s.tint = c;
                line
            }),
        )?;
        let integrator = reg.build_select_control(
            "demo-integrator",
            "Integrator",
            &initial.integrator,
            &[("euler", "Euler"), ("verlet", "Verlet"), ("rk4", "RK4")],
            self.handler(|s, v: String| {
                let line = format!("integrator = {v}");
                s.integrator = v;
                line
            }),
        )?;
        let advanced =
            reg.build_details_control("demo-advanced", "Advanced", &[tint, integrator], false);
        reg.add_details_toggle(
            "demo-advanced",
            self.handler(|_, open: bool| {
                format!("advanced {}", if open { "opened" } else { "closed" })
            }),
        )?;

        let help_text = reg.build_paragraph_control(
            "demo-help-text",
            "Drag the sliders; the outputs follow the shared state.",
        )?;
        let help_toggle = reg.build_button_control("demo-help-toggle", "Help", {
            let mut toggle = self.handler(|s, ()| {
                s.help_open = !s.help_open;
                format!("help {}", if s.help_open { "shown" } else { "hidden" })
            });
            move || toggle(())
        })?;
        let help = reg.build_dialog_control("demo-help", "Help", &[help_text]);
        reg.add_dialog("demo-help")?;
        reg.add_reactivity("demo-help", self.state.clone(), "help_open")?;

        let log = self.log_panel.build_controls(reg)?;
        let stats = self.stats_panel.build_controls(reg)?;
        Ok(reg.build_panel_control(
            "demo-panel",
            &[title, physics, advanced, help_toggle, help, log, stats],
        ))
    }

    fn build_hud_controls(&mut self, reg: &mut ControlRegistry<S::Node>) -> Result<String> {
        self.stats_panel.build_hud_controls(reg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuiConfig;
    use crate::headless::{HeadlessHost, ManualScheduler, NodeId};
    use crate::refresh::GuiSession;
    use crate::stats::{PanelGeometry, RasterSurface, StatsRegistry};
    use crate::time::ManualClock;

    type Demo = DemoPanel<RasterSurface<NodeId>>;

    fn mounted() -> (HeadlessHost, GuiSession<HeadlessHost>, Demo) {
        let cfg = GuiConfig::default();
        let mut host = HeadlessHost::new();
        let logger = Rc::new(RefCell::new(Logger::new(
            &cfg,
            ManualClock::new(0.0),
            Rc::new(|_: &str| {}),
        )));
        let (w, h) = PanelGeometry::from_config(&cfg.stats).surface_size();
        let stats = StatsRegistry::with_standard_panels(
            cfg.stats.clone(),
            ManualClock::new(0.0),
            None,
            |_| Ok(RasterSurface::with_node(host.create_element("canvas"), w, h)),
        )
        .unwrap();

        let sched = ManualScheduler::new();
        let mut session = GuiSession::new(cfg, Rc::new(sched.clone()));
        let flag = session.refresh_flag();
        let hud_panel =
            StatsHudPanel::new(Rc::new(RefCell::new(stats)), flag.clone(), host.alert_hook());
        let mut panel = DemoPanel::new(logger, hud_panel, flag);

        let root = host.root();
        let hud = host.create_element("div");
        session.refresh(&mut host, &mut panel, &root, Some(&hud)).unwrap();
        sched.run_pending();
        (host, session, panel)
    }

    #[test]
    fn every_control_is_bound() {
        let (host, session, _) = mounted();
        assert!(session.registry().ids().all(|id| session.element(id).is_some()));
        assert_eq!(host.listener_count("demo-gravity"), 1);
        assert_eq!(host.listener_count("demo-advanced"), 1);
        assert_eq!(host.listener_count("demo-help"), 0);
    }

    #[test]
    fn edits_reach_state_outputs_and_the_log() {
        let (mut host, mut session, panel) = mounted();
        host.input_by_user("demo-gravity", "3.5").unwrap();
        host.click("demo-help-toggle").unwrap();
        panel.tick();
        panel.tick();
        panel.log_panel().sync().unwrap();
        session.update_reactive_controls(&mut host).unwrap();

        assert_eq!(host.text("demo-gravity-out").as_deref(), Some("3.5"));
        assert_eq!(host.text("demo-frame").as_deref(), Some("2"));
        assert_eq!(host.is_open("demo-help"), Some(true));
        let log = host.text("log-text").unwrap_or_default();
        assert!(log.contains("gravity = 3.5"), "{log}");
        assert!(log.contains("help shown"), "{log}");
    }

    #[test]
    fn paused_demo_stops_counting() {
        let (mut host, mut session, panel) = mounted();
        host.set_checked_by_user("demo-paused", true).unwrap();
        panel.tick();
        session.update_reactive_controls(&mut host).unwrap();
        assert_eq!(host.text("demo-frame").as_deref(), Some("0"));
        assert_eq!(host.checked("demo-paused"), Some(true));
    }
}
