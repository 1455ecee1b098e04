use apg_gui::error::{GuiError, Result};
use apg_gui::stats::{PanelGeometry, Rect, Surface};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement};

use super::dom::js_err;

/// A `<canvas>` sized in device pixels and displayed at CSS size.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(document: &Document, geometry: &PanelGeometry) -> Result<Self> {
        let canvas = document
            .create_element("canvas")
            .map_err(|e| js_err("create canvas", e))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| GuiError::host("canvas: not a canvas element"))?;
        let (w, h) = geometry.surface_size();
        canvas.set_width(w);
        canvas.set_height(h);

        let style = canvas.style();
        let css = |px: u32| format!("{}px", px as f64 / geometry.pixel_ratio);
        style
            .set_property("width", &css(w))
            .map_err(|e| js_err("canvas width", e))?;
        style
            .set_property("height", &css(h))
            .map_err(|e| js_err("canvas height", e))?;

        let ctx = canvas
            .get_context("2d")
            .map_err(|e| js_err("canvas: get_context threw", e))?
            .ok_or_else(|| GuiError::host("canvas: missing 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| GuiError::host("canvas: context is not 2d"))?;
        ctx.set_text_baseline("top");
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    type Node = Element;

    fn node(&self) -> Element {
        self.canvas.clone().into()
    }

    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn fill_rect(&mut self, r: Rect) {
        self.ctx.fill_rect(r.x, r.y, r.w, r.h);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        self.ctx
            .fill_text(text, x, y)
            .map_err(|e| js_err("fill_text", e))
    }

    fn copy_within(&mut self, src: Rect, dx: f64, dy: f64) -> Result<()> {
        self.ctx
            .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &self.canvas,
                src.x,
                src.y,
                src.w,
                src.h,
                dx,
                dy,
                src.w,
                src.h,
            )
            .map_err(|e| js_err("drawImage", e))
    }

    fn set_visible(&mut self, visible: bool) -> Result<()> {
        let display = if visible { "block" } else { "none" };
        self.canvas
            .style()
            .set_property("display", display)
            .map_err(|e| js_err("canvas display", e))
    }
}
