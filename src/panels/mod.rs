//! Concrete panels composed from the registry builders.
//!
//! A panel is anything that can write its markup into a registry. The session
//! calls [`PanelBuilder::build_controls`] for the side panel and
//! [`PanelBuilder::build_hud_controls`] for the overlay, then binds both.

pub mod demo;
pub mod logger_panel;
pub mod stats_panel;

pub use demo::{DemoPanel, DemoState};
pub use logger_panel::{LogView, LoggerPanel};
pub use stats_panel::StatsHudPanel;

use crate::error::Result;
use crate::registry::ControlRegistry;

pub trait PanelBuilder<E> {
    fn build_controls(&mut self, registry: &mut ControlRegistry<E>) -> Result<String>;

    /// Overlay markup; most panels have none.
    fn build_hud_controls(&mut self, _registry: &mut ControlRegistry<E>) -> Result<String> {
        Ok(String::new())
    }
}
