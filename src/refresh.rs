//! Panel session and the refresh protocol.
//!
//! A [`GuiSession`] owns the control registry and the refresh flag that other
//! toolkits keep in module-level globals. Rebuilding a panel:
//!
//! 1. set the flag, clear the registry, build markup, write it into the
//!    container(s) and bind;
//! 2. schedule a one-shot deferred task that clears the flag once the host had
//!    a tick to lay out the new elements.
//!
//! Handlers holding a [`RefreshFlag`] check it before touching shared state.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, error};

use crate::bind::bind;
use crate::config::GuiConfig;
use crate::error::Result;
use crate::host::Host;
use crate::panels::PanelBuilder;
use crate::reactive::update_reactive_controls;
use crate::registry::ControlRegistry;

pub type DeferredTask = Box<dyn FnOnce()>;

/// Panel markup and, when a HUD container was given, its markup.
type Built = (String, Option<String>);

/// One-shot "next tick" scheduler of the host environment.
pub trait Scheduler {
    fn defer(&self, task: DeferredTask);
}

/// Shared "panel swap in flight" flag.
#[derive(Debug, Clone, Default)]
pub struct RefreshFlag(Rc<Cell<bool>>);

impl RefreshFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_refreshing(&self) -> bool {
        self.0.get()
    }

    fn set(&self, refreshing: bool) {
        self.0.set(refreshing);
    }
}

pub struct GuiSession<H: Host> {
    registry: ControlRegistry<H::Element>,
    flag: RefreshFlag,
    scheduler: Rc<dyn Scheduler>,
    config: GuiConfig,
}

impl<H: Host> GuiSession<H> {
    pub fn new(config: GuiConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            registry: ControlRegistry::new(),
            flag: RefreshFlag::new(),
            scheduler,
            config,
        }
    }

    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    pub fn registry(&self) -> &ControlRegistry<H::Element> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ControlRegistry<H::Element> {
        &mut self.registry
    }

    pub fn refresh_flag(&self) -> RefreshFlag {
        self.flag.clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.flag.is_refreshing()
    }

    pub fn element(&self, id: &str) -> Option<&H::Element> {
        self.registry.element(id)
    }

    /// Bind the currently registered controls; call once per mount.
    pub fn bind(&mut self, host: &mut H) -> Result<usize> {
        bind(&mut self.registry, host).inspect_err(|e| host.alert(&e.alert_text()))
    }

    /// One reactive pass; a failure is alerted through `host` and returned.
    pub fn update_reactive_controls(&mut self, host: &mut H) -> Result<usize> {
        update_reactive_controls(&self.registry, host)
            .inspect_err(|e| host.alert(&e.alert_text()))
    }

    /// Rebuild `builder`'s panel into `controls`, and its HUD into `hud` when
    /// given. Returns the number of listeners attached.
    pub fn refresh<B>(
        &mut self,
        host: &mut H,
        builder: &mut B,
        controls: &H::Element,
        hud: Option<&H::Element>,
    ) -> Result<usize>
    where
        B: PanelBuilder<H::Element> + ?Sized,
    {
        let build = |registry: &mut ControlRegistry<H::Element>| -> Result<Built> {
            let panel = builder.build_controls(registry)?;
            let hud_markup = match hud {
                Some(_) => Some(builder.build_hud_controls(registry)?),
                None => None,
            };
            Ok((panel, hud_markup))
        };
        self.refresh_with(host, build, controls, hud)
    }

    fn refresh_with<F>(
        &mut self,
        host: &mut H,
        build: F,
        controls: &H::Element,
        hud: Option<&H::Element>,
    ) -> Result<usize>
    where
        F: FnOnce(&mut ControlRegistry<H::Element>) -> Result<Built>,
    {
        self.flag.set(true);
        let result = self.swap(host, build, controls, hud);

        let flag = self.flag.clone();
        self.scheduler.defer(Box::new(move || flag.set(false)));

        match &result {
            Ok(listeners) => debug!(controls = self.registry.len(), listeners, "panel refreshed"),
            Err(e) => {
                error!("panel refresh failed: {e}");
                host.alert(&e.alert_text());
            }
        }
        result
    }

    fn swap<F>(
        &mut self,
        host: &mut H,
        build: F,
        controls: &H::Element,
        hud: Option<&H::Element>,
    ) -> Result<usize>
    where
        F: FnOnce(&mut ControlRegistry<H::Element>) -> Result<Built>,
    {
        self.registry.clear();
        let (panel, hud_markup) = build(&mut self.registry)?;
        host.set_inner_html(controls, &panel)?;
        if let (Some(container), Some(markup)) = (hud, hud_markup) {
            host.set_inner_html(container, &markup)?;
        }
        bind(&mut self.registry, host)
    }
}
