//! Named stats panels driven by per-frame `begin`/`end` calls.

use tracing::debug;

use crate::config::StatsConfig;
use crate::error::{GuiError, Result};
use crate::time::Clock;

use super::panel::{PanelGeometry, PanelStyle, StatsPanel};
use super::surface::Surface;

/// `show_panel` index that makes every panel visible.
pub const SHOW_ALL: isize = -1;

/// Heap usage of the host, when it exposes one.
pub trait HeapProbe {
    fn used_mb(&self) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelSelection {
    #[default]
    All,
    One(usize),
}

impl PanelSelection {
    pub fn index(self) -> isize {
        match self {
            PanelSelection::All => SHOW_ALL,
            PanelSelection::One(i) => i as isize,
        }
    }
}

pub struct StatsRegistry<S: Surface> {
    panels: Vec<StatsPanel<S>>,
    selection: PanelSelection,
    config: StatsConfig,
    clock: Box<dyn Clock>,
    heap: Option<Box<dyn HeapProbe>>,
    fps: Option<usize>,
    ms: Option<usize>,
    mem: Option<usize>,
    begin_ms: f64,
    prev_ms: f64,
    frames: u32,
}

impl<S: Surface> StatsRegistry<S> {
    /// An empty registry; panels are added with [`StatsRegistry::add_panel`].
    pub fn new(config: StatsConfig, clock: impl Clock + 'static) -> Self {
        let now = clock.now_ms();
        Self {
            panels: Vec::new(),
            selection: PanelSelection::All,
            config,
            clock: Box::new(clock),
            heap: None,
            fps: None,
            ms: None,
            mem: None,
            begin_ms: now,
            prev_ms: now,
            frames: 0,
        }
    }

    /// FPS and MS panels, plus MB when `heap` is given. `make_surface`
    /// receives each panel's geometry and returns its surface.
    pub fn with_standard_panels<F>(
        config: StatsConfig,
        clock: impl Clock + 'static,
        heap: Option<Box<dyn HeapProbe>>,
        mut make_surface: F,
    ) -> Result<Self>
    where
        F: FnMut(&PanelGeometry) -> Result<S>,
    {
        let mut reg = Self::new(config, clock);
        let geometry = PanelGeometry::from_config(&reg.config);

        reg.fps = Some(reg.add_panel(PanelStyle::fps(), make_surface(&geometry)?)?);
        reg.ms = Some(reg.add_panel(PanelStyle::ms(), make_surface(&geometry)?)?);
        if heap.is_some() {
            reg.mem = Some(reg.add_panel(PanelStyle::mb(), make_surface(&geometry)?)?);
        }
        reg.heap = heap;
        debug!(panels = reg.panels.len(), "stats panels created");
        Ok(reg)
    }

    /// Append a panel and return its index.
    pub fn add_panel(&mut self, style: PanelStyle, surface: S) -> Result<usize> {
        let panel = StatsPanel::new(style, &self.config, surface)?;
        self.panels.push(panel);
        let index = self.panels.len() - 1;
        self.apply_visibility_to(index)?;
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn panels(&self) -> &[StatsPanel<S>] {
        &self.panels
    }

    pub fn panel(&self, name: &str) -> Option<&StatsPanel<S>> {
        self.panels.iter().find(|p| p.name() == name)
    }

    pub fn panel_mut(&mut self, name: &str) -> Option<&mut StatsPanel<S>> {
        self.panels.iter_mut().find(|p| p.name() == name)
    }

    pub fn selection(&self) -> PanelSelection {
        self.selection
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Show panel `index` alone, or every panel for [`SHOW_ALL`].
    pub fn show_panel(&mut self, index: isize) -> Result<()> {
        let count = self.panels.len();
        let selection = match usize::try_from(index) {
            Ok(i) if i < count => PanelSelection::One(i),
            _ if index == SHOW_ALL => PanelSelection::All,
            _ => return Err(GuiError::PanelOutOfRange { index, count }),
        };
        self.selection = selection;
        for i in 0..count {
            self.apply_visibility_to(i)?;
        }
        debug!(index, "stats panel selection changed");
        Ok(())
    }

    fn apply_visibility_to(&mut self, index: usize) -> Result<()> {
        let visible = match self.selection {
            PanelSelection::All => true,
            PanelSelection::One(i) => i == index,
        };
        match self.panels.get_mut(index) {
            Some(panel) => panel.surface_mut().set_visible(visible),
            None => Ok(()),
        }
    }

    /// Start a frame at `t` (ms), or now.
    pub fn begin(&mut self, t: Option<f64>) {
        self.begin_ms = t.unwrap_or_else(|| self.clock.now_ms());
    }

    /// Close the frame begun last and feed the panels. Returns the stamp used.
    pub fn end(&mut self, t: Option<f64>) -> Result<f64> {
        self.frames += 1;
        let time = t.unwrap_or_else(|| self.clock.now_ms());

        if let Some(i) = self.ms {
            self.panels[i].update(time - self.begin_ms)?;
        }

        let window = time - self.prev_ms;
        if window >= self.config.sample_window_ms && window > 0.0 {
            if let Some(i) = self.fps {
                let rate = f64::from(self.frames) * 1000.0 / window;
                self.panels[i].update(rate)?;
            }
            self.prev_ms = time;
            self.frames = 0;

            let used = self.heap.as_ref().and_then(|h| h.used_mb());
            if let (Some(i), Some(mb)) = (self.mem, used) {
                self.panels[i].update(mb)?;
            }
        }
        Ok(time)
    }

    /// `end()` followed by a `begin` at the same stamp.
    pub fn update(&mut self) -> Result<()> {
        let t = self.end(None)?;
        self.begin_ms = t;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::surface::RasterSurface;
    use crate::time::ManualClock;

    struct FixedHeap(f64);

    impl HeapProbe for FixedHeap {
        fn used_mb(&self) -> Option<f64> {
            Some(self.0)
        }
    }

    fn raster(g: &PanelGeometry) -> Result<RasterSurface> {
        let (w, h) = g.surface_size();
        Ok(RasterSurface::new(w, h))
    }

    fn registry(heap: Option<Box<dyn HeapProbe>>) -> (StatsRegistry<RasterSurface>, ManualClock) {
        let clock = ManualClock::new(0.0);
        let reg =
            StatsRegistry::with_standard_panels(StatsConfig::default(), clock.clone(), heap, raster)
                .unwrap();
        (reg, clock)
    }

    #[test]
    fn memory_panel_needs_a_heap_probe() {
        let (reg, _) = registry(None);
        let names: Vec<&str> = reg.panels().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["FPS", "MS"]);

        let (reg, _) = registry(Some(Box::new(FixedHeap(12.5))));
        assert_eq!(reg.len(), 3);
        assert!(reg.panel("MB").is_some());
    }

    #[test]
    fn ms_panel_records_every_frame() {
        let (mut reg, _) = registry(None);
        reg.begin(Some(100.0));
        assert_eq!(reg.end(Some(116.7)).unwrap(), 116.7);
        reg.begin(Some(200.0));
        reg.end(Some(233.3)).unwrap();

        let ms = reg.panel("MS").unwrap();
        assert_eq!(ms.history().len(), 2);
        assert_eq!(ms.value(), 33.3);
        assert_eq!(ms.min(), 16.7);
    }

    #[test]
    fn fps_and_memory_sample_once_per_window() {
        let (mut reg, clock) = registry(Some(Box::new(FixedHeap(42.0))));
        for _ in 0..59 {
            reg.begin(None);
            clock.advance(16.0);
            reg.end(None).unwrap();
        }
        assert!(reg.panel("FPS").unwrap().history().is_empty());

        // 60th frame crosses the one-second window
        reg.begin(None);
        clock.advance(56.0);
        reg.end(None).unwrap();

        let fps = reg.panel("FPS").unwrap();
        assert_eq!(fps.history().len(), 1);
        assert_eq!(fps.value(), 60.0);
        assert_eq!(reg.panel("MB").unwrap().value(), 42.0);
        assert_eq!(reg.panel("MS").unwrap().history().len(), 60);
    }

    #[test]
    fn update_chains_frames_on_the_clock() {
        let (mut reg, clock) = registry(None);
        reg.begin(None);
        clock.advance(20.0);
        reg.update().unwrap();
        clock.advance(30.0);
        reg.update().unwrap();
        let ms: Vec<f64> = reg.panel("MS").unwrap().history().iter().copied().collect();
        assert_eq!(ms, vec![20.0, 30.0]);
    }

    #[test]
    fn show_panel_selects_one_or_all() {
        let (mut reg, _) = registry(Some(Box::new(FixedHeap(1.0))));
        reg.show_panel(1).unwrap();
        assert_eq!(reg.selection(), PanelSelection::One(1));
        let visible: Vec<bool> = reg.panels().iter().map(|p| p.surface().is_visible()).collect();
        assert_eq!(visible, [false, true, false]);

        reg.show_panel(SHOW_ALL).unwrap();
        assert!(reg.panels().iter().all(|p| p.surface().is_visible()));
        assert_eq!(reg.selection().index(), SHOW_ALL);
    }

    #[test]
    fn out_of_range_selection_is_fatal() {
        let (mut reg, _) = registry(None);
        reg.show_panel(0).unwrap();
        let err = reg.show_panel(2).unwrap_err();
        assert!(matches!(err, GuiError::PanelOutOfRange { index: 2, count: 2 }));
        assert!(reg.show_panel(-2).is_err());
        assert_eq!(reg.selection(), PanelSelection::One(0));
    }

    #[test]
    fn custom_panels_follow_the_current_selection() {
        let (mut reg, _) = registry(None);
        reg.show_panel(0).unwrap();
        let (w, h) = PanelGeometry::from_config(reg.config()).surface_size();
        let i = reg
            .add_panel(PanelStyle::new("BODIES", "", "#ff0", "#220", 0), RasterSurface::new(w, h))
            .unwrap();
        assert_eq!(i, 2);
        assert!(!reg.panels()[2].surface().is_visible());
        reg.panel_mut("BODIES").unwrap().update(128.0).unwrap();
        assert_eq!(reg.panel("BODIES").unwrap().label(), "128 (128/128) ");
    }
}
