//! One scrolling telemetry graph.

use std::collections::VecDeque;

use crate::config::{RenderMode, StatsConfig};
use crate::error::Result;
use crate::fmt::{fmt_fixed, fmt_number, quantize};

use super::surface::{Rect, Surface};

/// Alpha of the background overlay that dims the unfilled part of a column.
const OVERLAY_ALPHA: f64 = 0.9;

/// Name, unit and colors of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelStyle {
    pub name: String,
    pub unit: String,
    pub fg: String,
    pub bg: String,
    /// Decimals kept when quantizing samples.
    pub precision: usize,
}

impl PanelStyle {
    pub fn new(name: &str, unit: &str, fg: &str, bg: &str, precision: usize) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            fg: fg.to_string(),
            bg: bg.to_string(),
            precision,
        }
    }

    pub fn fps() -> Self {
        Self::new("FPS", "fps", "#0ff", "#002", 0)
    }

    pub fn ms() -> Self {
        Self::new("MS", "ms", "#0f0", "#020", 1)
    }

    pub fn mb() -> Self {
        Self::new("MB", "MB", "#f08", "#201", 1)
    }
}

/// Panel layout in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelGeometry {
    pub pixel_ratio: f64,
    pub width: f64,
    pub height: f64,
    pub text_x: f64,
    pub text_y: f64,
    pub graph_x: f64,
    pub graph_y: f64,
    pub graph_w: f64,
    pub graph_h: f64,
}

impl PanelGeometry {
    pub fn from_config(cfg: &StatsConfig) -> Self {
        let pr = cfg.pixel_ratio;
        let px = |css: f64| (css * pr).round();
        let width = f64::from(cfg.width);
        let height = f64::from(cfg.height);
        Self {
            pixel_ratio: pr,
            width: px(width),
            height: px(height),
            text_x: px(3.0),
            text_y: px(2.0),
            graph_x: px(3.0),
            graph_y: px(15.0),
            graph_w: px((width - 16.0).max(1.0)),
            graph_h: px((height - 18.0).max(1.0)),
        }
    }

    /// Canvas size to allocate, in whole device pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    /// Width of one sample column.
    pub fn column_w(&self) -> f64 {
        self.pixel_ratio.round().max(1.0)
    }

    pub fn font(&self) -> String {
        let size = fmt_number((9.0 * self.pixel_ratio).round());
        format!("bold {size}px Helvetica,Arial,sans-serif")
    }
}

pub struct StatsPanel<S: Surface> {
    style: PanelStyle,
    geometry: PanelGeometry,
    mode: RenderMode,
    surface: S,
    value: f64,
    min: f64,
    max: f64,
    history: VecDeque<f64>,
    capacity: usize,
    label: String,
}

impl<S: Surface> StatsPanel<S> {
    /// Wraps `surface` and paints the empty panel.
    pub fn new(style: PanelStyle, cfg: &StatsConfig, surface: S) -> Result<Self> {
        let mut panel = Self {
            label: style.name.clone(),
            style,
            geometry: PanelGeometry::from_config(cfg),
            mode: cfg.render_mode,
            surface,
            value: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            history: VecDeque::with_capacity(cfg.history_len),
            capacity: cfg.history_len.max(1),
        };
        panel.draw_initial()?;
        Ok(panel)
    }

    pub fn name(&self) -> &str {
        &self.style.name
    }

    pub fn style(&self) -> &PanelStyle {
        &self.style
    }

    pub fn geometry(&self) -> &PanelGeometry {
        &self.geometry
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn history(&self) -> &VecDeque<f64> {
        &self.history
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Record one sample and redraw.
    pub fn update(&mut self, value: f64) -> Result<()> {
        let p = self.style.precision;
        let v = quantize(value, p);
        self.history.push_back(v);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
        self.value = v;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        self.label = format!(
            "{} ({}/{}) {}",
            fmt_fixed(v, p),
            fmt_fixed(self.min, p),
            fmt_fixed(self.max, p),
            self.style.unit
        );

        self.draw_label()?;
        match self.mode {
            RenderMode::ScrollBlit => self.scroll_graph(),
            RenderMode::Redraw => self.redraw_graph(),
        }
    }

    /// Rows of a column left dim for `v`; peaks leave none.
    fn overlay_height(&self, v: f64) -> f64 {
        let ratio = if self.max > 0.0 { (v / self.max).clamp(0.0, 1.0) } else { 1.0 };
        ((1.0 - ratio) * self.geometry.graph_h).round()
    }

    fn graph_rect(&self) -> Rect {
        let g = &self.geometry;
        Rect::new(g.graph_x, g.graph_y, g.graph_w, g.graph_h)
    }

    fn draw_initial(&mut self) -> Result<()> {
        let g = self.geometry;
        let graph = self.graph_rect();
        self.surface.set_font(&g.font());
        self.surface.set_global_alpha(1.0);
        self.surface.set_fill_style(&self.style.bg);
        self.surface.fill_rect(Rect::new(0.0, 0.0, g.width, g.height));

        self.surface.set_fill_style(&self.style.fg);
        self.surface.fill_text(&self.style.name, g.text_x, g.text_y)?;
        self.surface.fill_rect(graph);

        self.surface.set_fill_style(&self.style.bg);
        self.surface.set_global_alpha(OVERLAY_ALPHA);
        self.surface.fill_rect(graph);
        Ok(())
    }

    fn draw_label(&mut self) -> Result<()> {
        let g = self.geometry;
        self.surface.set_fill_style(&self.style.bg);
        self.surface.set_global_alpha(1.0);
        self.surface.fill_rect(Rect::new(0.0, 0.0, g.width, g.graph_y));
        self.surface.set_fill_style(&self.style.fg);
        self.surface.fill_text(&self.label, g.text_x, g.text_y)
    }

    fn scroll_graph(&mut self) -> Result<()> {
        let g = self.geometry;
        let col = g.column_w();
        let right = g.graph_x + g.graph_w - col;
        self.surface.copy_within(
            Rect::new(g.graph_x + col, g.graph_y, g.graph_w - col, g.graph_h),
            g.graph_x,
            g.graph_y,
        )?;
        self.surface.fill_rect(Rect::new(right, g.graph_y, col, g.graph_h));

        let dim = self.overlay_height(self.value);
        self.surface.set_fill_style(&self.style.bg);
        self.surface.set_global_alpha(OVERLAY_ALPHA);
        self.surface.fill_rect(Rect::new(right, g.graph_y, col, dim));
        Ok(())
    }

    fn redraw_graph(&mut self) -> Result<()> {
        let g = self.geometry;
        let col = g.column_w();
        self.surface.fill_rect(self.graph_rect());

        let columns = (g.graph_w / col).floor() as usize;
        let dims: Vec<f64> = (0..columns)
            .map(|i| match self.history.iter().rev().nth(i) {
                Some(&v) => self.overlay_height(v),
                None => g.graph_h,
            })
            .collect();

        self.surface.set_fill_style(&self.style.bg);
        self.surface.set_global_alpha(OVERLAY_ALPHA);
        for (i, dim) in dims.into_iter().enumerate() {
            let x = g.graph_x + g.graph_w - col * (i as f64 + 1.0);
            if dim > 0.0 {
                self.surface.fill_rect(Rect::new(x, g.graph_y, col, dim));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::surface::{parse_hex_color, RasterSurface};

    const RIGHT: u32 = 76;

    fn panel(mode: RenderMode, history_len: usize) -> StatsPanel<RasterSurface> {
        let cfg = StatsConfig {
            history_len,
            render_mode: mode,
            ..StatsConfig::default()
        };
        let (w, h) = PanelGeometry::from_config(&cfg).surface_size();
        StatsPanel::new(PanelStyle::fps(), &cfg, RasterSurface::new(w, h)).unwrap()
    }

    fn column(p: &StatsPanel<RasterSurface>, x: u32) -> Vec<u32> {
        (15..45).map(|y| p.surface().pixel(x, y).unwrap()).collect()
    }

    #[test]
    fn geometry_scales_with_pixel_ratio() {
        let g = PanelGeometry::from_config(&StatsConfig::default());
        assert_eq!(g.surface_size(), (90, 48));
        assert_eq!((g.graph_x, g.graph_y, g.graph_w, g.graph_h), (3.0, 15.0, 74.0, 30.0));
        assert_eq!(g.font(), "bold 9px Helvetica,Arial,sans-serif");

        let g2 = PanelGeometry::from_config(&StatsConfig {
            pixel_ratio: 2.0,
            ..StatsConfig::default()
        });
        assert_eq!(g2.surface_size(), (180, 96));
        assert_eq!((g2.graph_w, g2.graph_h, g2.column_w()), (148.0, 60.0, 2.0));
        assert_eq!(g2.font(), "bold 18px Helvetica,Arial,sans-serif");
    }

    #[test]
    fn initial_draw_shows_the_name_over_a_dimmed_graph() {
        let p = panel(RenderMode::ScrollBlit, 500);
        let bg = parse_hex_color("#002");
        assert_eq!(p.surface().last_text(), Some("FPS"));
        assert_eq!(p.surface().pixel(0, 0), Some(bg));
        let dim = p.surface().pixel(3, 15).unwrap();
        assert_ne!(dim, bg);
        assert_ne!(dim, parse_hex_color("#0ff"));
        assert!(column(&p, RIGHT).iter().all(|&px| px == dim));
    }

    #[test]
    fn new_column_height_follows_value_over_max() {
        let mut p = panel(RenderMode::ScrollBlit, 500);
        let fg = parse_hex_color("#0ff");
        let dim = p.surface().pixel(3, 15).unwrap();

        p.update(10.0).unwrap();
        assert!(column(&p, RIGHT).iter().all(|&px| px == fg));

        p.update(5.0).unwrap();
        let col = column(&p, RIGHT);
        assert!(col[..15].iter().all(|&px| px == dim));
        assert!(col[15..].iter().all(|&px| px == fg));
        // the previous peak scrolled one column left
        assert!(column(&p, RIGHT - 1).iter().all(|&px| px == fg));
        assert_eq!(p.surface().last_text(), Some("5 (5/10) fps"));
    }

    #[test]
    fn redraw_mode_paints_the_same_columns() {
        let mut blit = panel(RenderMode::ScrollBlit, 500);
        let mut redraw = panel(RenderMode::Redraw, 500);
        for v in [3.0, 12.0, 6.0, 9.0] {
            blit.update(v).unwrap();
            redraw.update(v).unwrap();
        }
        // both columns were drawn after the max settled at 12
        assert_eq!(column(&blit, RIGHT), column(&redraw, RIGHT));
        assert_eq!(column(&redraw, RIGHT - 1), column(&blit, RIGHT - 1));
        assert_eq!(column(&redraw, 3), column(&blit, 3));
    }

    #[test]
    fn min_max_only_widen_and_samples_are_quantized() {
        let mut p = panel(RenderMode::ScrollBlit, 500);
        p.update(59.6).unwrap();
        p.update(61.2).unwrap();
        p.update(60.0).unwrap();
        assert_eq!((p.min(), p.max(), p.value()), (60.0, 61.0, 60.0));
        assert_eq!(p.label(), "60 (60/61) fps");
        p.update(12.0).unwrap();
        assert_eq!((p.min(), p.max()), (12.0, 61.0));
    }

    #[test]
    fn history_is_bounded_fifo() {
        let mut p = panel(RenderMode::Redraw, 3);
        for v in 1..=5 {
            p.update(f64::from(v)).unwrap();
        }
        assert_eq!(p.history().iter().copied().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn zero_max_fills_the_column() {
        let mut p = panel(RenderMode::ScrollBlit, 500);
        p.update(0.0).unwrap();
        let fg = parse_hex_color("#0ff");
        assert!(column(&p, RIGHT).iter().all(|&px| px == fg));
    }
}
