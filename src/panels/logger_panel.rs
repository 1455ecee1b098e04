//! Paged view over the logger's streams.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use tracing::error;

use crate::error::Result;
use crate::logger::Logger;
use crate::markup::{attr, class};
use crate::refresh::RefreshFlag;
use crate::registry::ControlRegistry;

use super::PanelBuilder;

pub const STREAM_SELECT_ID: &str = "log-stream";
pub const NEWER_BUTTON_ID: &str = "log-newer";
pub const OLDER_BUTTON_ID: &str = "log-older";
pub const PAGE_OUTPUT_ID: &str = "log-page";
pub const TEXT_ID: &str = "log-text";

/// What the panel shows; the reactive bindings read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogView {
    pub logger: String,
    pub page: usize,
    pub pages: usize,
    pub page_label: String,
    pub text: String,
}

impl LogView {
    /// Re-read the selected page, clamping it to the pages that exist.
    pub fn sync(&mut self, logger: &Logger) -> Result<()> {
        self.pages = logger.page_count(&self.logger)?;
        self.page = self.page.min(self.pages - 1);
        self.text = logger.logs(&self.logger, self.page)?.join("\n");
        self.page_label = format!("{}/{}", self.page + 1, self.pages);
        Ok(())
    }
}

pub struct LoggerPanel {
    logger: Rc<RefCell<Logger>>,
    view: Rc<RefCell<LogView>>,
    flag: RefreshFlag,
}

impl LoggerPanel {
    /// Starts on the first stream, newest page.
    pub fn new(logger: Rc<RefCell<Logger>>, flag: RefreshFlag) -> Self {
        let first = logger.borrow().loggers().next().unwrap_or_default().to_string();
        let view = LogView {
            logger: first,
            ..LogView::default()
        };
        Self {
            logger,
            view: Rc::new(RefCell::new(view)),
            flag,
        }
    }

    pub fn view(&self) -> Rc<RefCell<LogView>> {
        self.view.clone()
    }

    /// Pick up lines logged since the last sync. Call before each reactive pass.
    pub fn sync(&self) -> Result<()> {
        self.view.borrow_mut().sync(&self.logger.borrow())
    }

    /// A callback that edits the view, skipped while a panel swap is in flight.
    fn on_view<A: 'static>(
        &self,
        edit: impl Fn(&mut LogView, A) + 'static,
    ) -> impl FnMut(A) + 'static {
        let (logger, view, flag) = (self.logger.clone(), self.view.clone(), self.flag.clone());
        move |arg: A| {
            if flag.is_refreshing() {
                return;
            }
            let mut v = view.borrow_mut();
            edit(&mut *v, arg);
            if let Err(e) = v.sync(&logger.borrow()) {
                error!("log view: {e}");
                logger.borrow().alert(&e.alert_text());
            }
        }
    }
}

impl<E> PanelBuilder<E> for LoggerPanel {
    fn build_controls(&mut self, reg: &mut ControlRegistry<E>) -> Result<String> {
        self.sync()?;
        let names: Vec<String> = self.logger.borrow().loggers().map(str::to_string).collect();
        let options: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), n.as_str())).collect();
        let view = self.view.borrow().clone();

        let select = reg.build_select_control(
            STREAM_SELECT_ID,
            "Stream",
            &view.logger,
            &options,
            self.on_view(|v, name: String| {
                v.logger = name;
                v.page = 0;
            }),
        )?;
        let newer = reg.build_button_control(NEWER_BUTTON_ID, "Newer", {
            let mut step = self.on_view(|v, ()| v.page = v.page.saturating_sub(1));
            move || step(())
        })?;
        let older = reg.build_button_control(OLDER_BUTTON_ID, "Older", {
            let mut step = self.on_view(|v, ()| v.page += 1);
            move || step(())
        })?;
        let page = reg.build_output_control(PAGE_OUTPUT_ID, "Page", &view.page_label)?;
        reg.add_reactivity(PAGE_OUTPUT_ID, self.view.clone(), "page_label")?;
        let text = reg.build_paragraph_control(TEXT_ID, &view.text)?;
        reg.add_reactivity(TEXT_ID, self.view.clone(), "text")?;

        let log = format!("<div{}>{text}</div>", attr("class", &class("log")));
        Ok(reg.build_panel_control("log-panel", &[select, newer, older, page, log]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GuiConfig, LoggerConfig};
    use crate::headless::{HeadlessHost, ManualScheduler};
    use crate::refresh::GuiSession;
    use crate::time::ManualClock;

    struct Rig {
        host: HeadlessHost,
        session: GuiSession<HeadlessHost>,
        sched: ManualScheduler,
        logger: Rc<RefCell<Logger>>,
        panel: LoggerPanel,
    }

    fn rig() -> Rig {
        let cfg = GuiConfig {
            logger: LoggerConfig {
                capacity: 100,
                page_size: 2,
            },
            ..GuiConfig::default()
        };
        let host = HeadlessHost::new();
        let logger = Rc::new(RefCell::new(Logger::new(
            &cfg,
            ManualClock::new(0.0),
            host.alert_hook(),
        )));
        {
            let mut l = logger.borrow_mut();
            l.add_logger("physics");
            for line in ["a", "b", "c"] {
                l.log_no_time(line, "default", false).unwrap();
            }
            l.log_no_time("step", "physics", false).unwrap();
        }
        let sched = ManualScheduler::new();
        let session = GuiSession::new(cfg, Rc::new(sched.clone()));
        let panel = LoggerPanel::new(logger.clone(), session.refresh_flag());
        Rig {
            host,
            session,
            sched,
            logger,
            panel,
        }
    }

    fn mount(r: &mut Rig) {
        let root = r.host.root();
        r.session.refresh(&mut r.host, &mut r.panel, &root, None).unwrap();
    }

    #[test]
    fn shows_the_newest_page_first() {
        let mut r = rig();
        mount(&mut r);
        assert_eq!(r.host.text(TEXT_ID).as_deref(), Some("c\nb"));
        assert_eq!(r.host.text(PAGE_OUTPUT_ID).as_deref(), Some("1/2"));
        assert_eq!(r.host.value(STREAM_SELECT_ID), Some("default"));
        assert!(r.host.attr("log-panel", "class").is_some());
    }

    #[test]
    fn paging_and_stream_selection_update_the_view() {
        let mut r = rig();
        mount(&mut r);
        r.sched.run_pending();

        r.host.click(OLDER_BUTTON_ID).unwrap();
        r.host.click(OLDER_BUTTON_ID).unwrap();
        r.session.update_reactive_controls(&mut r.host).unwrap();
        assert_eq!(r.host.text(TEXT_ID).as_deref(), Some("a"));
        assert_eq!(r.host.text(PAGE_OUTPUT_ID).as_deref(), Some("2/2"));

        r.host.select_by_user(STREAM_SELECT_ID, "physics").unwrap();
        r.session.update_reactive_controls(&mut r.host).unwrap();
        assert_eq!(r.host.text(TEXT_ID).as_deref(), Some("step"));
        assert_eq!(r.panel.view().borrow().page, 0);
    }

    #[test]
    fn sync_picks_up_new_lines() {
        let mut r = rig();
        mount(&mut r);
        r.logger.borrow_mut().log_no_time("d", "default", false).unwrap();
        r.panel.sync().unwrap();
        r.session.update_reactive_controls(&mut r.host).unwrap();
        assert_eq!(r.host.text(TEXT_ID).as_deref(), Some("d\nc"));
    }

    #[test]
    fn clicks_during_a_refresh_are_ignored() {
        let mut r = rig();
        mount(&mut r);
        // the deferred reset has not run yet
        r.host.click(OLDER_BUTTON_ID).unwrap();
        assert_eq!(r.panel.view().borrow().page, 0);

        r.sched.run_pending();
        r.host.click(OLDER_BUTTON_ID).unwrap();
        assert_eq!(r.panel.view().borrow().page, 1);
    }

    #[test]
    fn selecting_an_unknown_stream_alerts() {
        let mut r = rig();
        mount(&mut r);
        r.sched.run_pending();

        r.host.select_by_user(STREAM_SELECT_ID, "gone").unwrap();
        assert_eq!(r.host.alerts(), ["apg_gui: no logger named `gone`"]);
    }
}
