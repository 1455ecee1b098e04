//! Scrolling telemetry graphs (frame time, frame rate, heap).

pub mod panel;
pub mod registry;
pub mod surface;

pub use panel::{PanelGeometry, PanelStyle, StatsPanel};
pub use registry::{HeapProbe, PanelSelection, StatsRegistry, SHOW_ALL};
pub use surface::{RasterSurface, Rect, Surface};
