//! Stats overlay: the panel canvases plus a selector for which one is shown.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::error;

use crate::error::{GuiError, Result};
use crate::host::AlertHook;
use crate::refresh::RefreshFlag;
use crate::registry::ControlRegistry;
use crate::stats::{StatsRegistry, Surface, SHOW_ALL};

use super::PanelBuilder;

pub const SELECT_ID: &str = "stats-select";

/// Div id the canvas of panel `index` is mounted in.
pub fn slot_id(index: usize) -> String {
    format!("stats-{index}")
}

pub struct StatsHudPanel<S: Surface> {
    stats: Rc<RefCell<StatsRegistry<S>>>,
    flag: RefreshFlag,
    alert: AlertHook,
}

impl<S: Surface> StatsHudPanel<S> {
    /// Selection failures raised by the selector are surfaced through `alert`.
    pub fn new(
        stats: Rc<RefCell<StatsRegistry<S>>>,
        flag: RefreshFlag,
        alert: AlertHook,
    ) -> Self {
        Self { stats, flag, alert }
    }

    pub fn stats(&self) -> Rc<RefCell<StatsRegistry<S>>> {
        self.stats.clone()
    }
}

impl<S> PanelBuilder<S::Node> for StatsHudPanel<S>
where
    S: Surface + 'static,
{
    fn build_controls(&mut self, reg: &mut ControlRegistry<S::Node>) -> Result<String> {
        let (names, selected) = {
            let stats = self.stats.borrow();
            let names = stats.panels().iter().map(|p| p.name().to_string()).collect::<Vec<_>>();
            (names, stats.selection().index().to_string())
        };
        let values: Vec<String> = (0..names.len()).map(|i| i.to_string()).collect();
        let all = SHOW_ALL.to_string();
        let mut options = vec![(all.as_str(), "All")];
        options.extend(values.iter().map(String::as_str).zip(names.iter().map(String::as_str)));

        let (stats, flag, alert) = (self.stats.clone(), self.flag.clone(), self.alert.clone());
        let select = reg.build_select_control(SELECT_ID, "Stats", &selected, &options, move |v| {
            if flag.is_refreshing() {
                return;
            }
            let shown = v
                .trim()
                .parse::<isize>()
                .map_err(|_| GuiError::InvalidSelection(v.clone()))
                .and_then(|index| stats.borrow_mut().show_panel(index));
            if let Err(e) = shown {
                error!("stats selection: {e}");
                alert(&e.alert_text());
            }
        })?;
        Ok(reg.build_panel_control("stats-controls", &[select]))
    }

    fn build_hud_controls(&mut self, reg: &mut ControlRegistry<S::Node>) -> Result<String> {
        let nodes: Vec<S::Node> = {
            let stats = self.stats.borrow();
            stats.panels().iter().map(|p| p.surface().node()).collect()
        };
        let mut slots = Vec::with_capacity(nodes.len());
        for (i, node) in nodes.into_iter().enumerate() {
            slots.push(reg.build_div_control(&slot_id(i), Some(node))?);
        }
        Ok(reg.build_panel_control("stats-hud", &slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuiConfig;
    use crate::headless::{HeadlessHost, ManualScheduler, NodeId};
    use crate::refresh::GuiSession;
    use crate::stats::{PanelGeometry, PanelSelection, PanelStyle, RasterSurface};
    use crate::time::ManualClock;

    type Canvas = RasterSurface<NodeId>;

    fn setup() -> (
        HeadlessHost,
        GuiSession<HeadlessHost>,
        ManualScheduler,
        StatsHudPanel<Canvas>,
        Vec<NodeId>,
    ) {
        let mut host = HeadlessHost::new();
        let cfg = GuiConfig::default();
        let (w, h) = PanelGeometry::from_config(&cfg.stats).surface_size();
        let mut stats = StatsRegistry::new(cfg.stats.clone(), ManualClock::new(0.0));
        let mut canvases = Vec::new();
        for style in [PanelStyle::fps(), PanelStyle::ms()] {
            let canvas = host.create_element("canvas");
            canvases.push(canvas);
            stats.add_panel(style, RasterSurface::with_node(canvas, w, h)).unwrap();
        }
        let sched = ManualScheduler::new();
        let session = GuiSession::new(cfg, Rc::new(sched.clone()));
        let panel = StatsHudPanel::new(
            Rc::new(RefCell::new(stats)),
            session.refresh_flag(),
            host.alert_hook(),
        );
        (host, session, sched, panel, canvases)
    }

    #[test]
    fn canvases_are_mounted_in_their_slots() {
        let (mut host, mut session, _, mut panel, canvases) = setup();
        let root = host.root();
        let hud = host.create_element("div");
        session.refresh(&mut host, &mut panel, &root, Some(&hud)).unwrap();

        for (i, canvas) in canvases.iter().enumerate() {
            let slot = *session.element(&slot_id(i)).unwrap();
            assert_eq!(host.children(slot), vec![*canvas]);
        }
        assert_eq!(host.value(SELECT_ID), Some("-1"));
    }

    #[test]
    fn selecting_shows_one_panel() {
        let (mut host, mut session, sched, mut panel, _) = setup();
        let root = host.root();
        let hud = host.create_element("div");
        session.refresh(&mut host, &mut panel, &root, Some(&hud)).unwrap();
        sched.run_pending();

        host.select_by_user(SELECT_ID, "1").unwrap();
        let stats = panel.stats();
        assert_eq!(stats.borrow().selection(), PanelSelection::One(1));
        let visible: Vec<bool> =
            stats.borrow().panels().iter().map(|p| p.surface().is_visible()).collect();
        assert_eq!(visible, [false, true]);

        host.select_by_user(SELECT_ID, "-1").unwrap();
        assert_eq!(stats.borrow().selection(), PanelSelection::All);
    }

    #[test]
    fn rebuild_keeps_the_current_selection() {
        let (mut host, mut session, sched, mut panel, _) = setup();
        let root = host.root();
        let hud = host.create_element("div");
        panel.stats().borrow_mut().show_panel(0).unwrap();
        session.refresh(&mut host, &mut panel, &root, Some(&hud)).unwrap();
        sched.run_pending();
        assert_eq!(host.value(SELECT_ID), Some("0"));
    }

    #[test]
    fn bad_selections_alert_and_keep_the_current_one() {
        let (mut host, mut session, sched, mut panel, _) = setup();
        let root = host.root();
        let hud = host.create_element("div");
        session.refresh(&mut host, &mut panel, &root, Some(&hud)).unwrap();
        sched.run_pending();
        host.select_by_user(SELECT_ID, "0").unwrap();

        host.select_by_user(SELECT_ID, "7").unwrap();
        host.select_by_user(SELECT_ID, "all").unwrap();
        let alerts = host.alerts();
        assert_eq!(alerts.len(), 2);
        assert!(alerts[0].contains("index 7 is out of range"), "{alerts:?}");
        assert!(alerts[1].contains("`all`"), "{alerts:?}");
        assert_eq!(panel.stats().borrow().selection(), PanelSelection::One(0));
    }
}
