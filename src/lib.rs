//! Runtime UI toolkit for browser-hosted simulation demos.
//!
//! Panels are generated as markup strings, swapped into the document by a
//! [`refresh::GuiSession`], then bound to live elements. Bound controls can
//! follow shared state through [`reactive`] bindings. The [`stats`] module
//! draws scrolling frame-time/frame-rate/heap graphs and [`logger`] keeps the
//! ring buffers the logger panel pages through.
//!
//! Nothing here depends on a browser: the DOM, canvas, clock and scheduler are
//! traits. `apg_gui_web` implements them with `web-sys`; [`headless`] does it in
//! memory for tests and the CLI.

pub mod bind;
pub mod config;
pub mod control;
pub mod error;
pub mod fmt;
pub mod headless;
pub mod host;
pub mod logger;
pub mod markup;
pub mod panels;
pub mod reactive;
pub mod refresh;
pub mod registry;
pub mod stats;
pub mod time;

pub use bind::bind;
pub use config::{GuiConfig, RenderMode};
pub use error::{GuiError, Result};
pub use host::Host;
pub use logger::Logger;
pub use panels::PanelBuilder;
pub use reactive::{update_reactive_controls, StateSource};
pub use refresh::{GuiSession, RefreshFlag, Scheduler};
pub use registry::{ControlRegistry, RangeSpec};
