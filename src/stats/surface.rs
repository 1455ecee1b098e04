//! Drawing surface a stats panel paints on.

use crate::error::Result;

/// Pixel rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// The subset of a canvas 2D context the panels use.
pub trait Surface {
    /// Handle the surface is mounted by (a canvas element in the browser).
    type Node: Clone;

    fn node(&self) -> Self::Node;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn set_fill_style(&mut self, color: &str);

    fn set_global_alpha(&mut self, alpha: f64);

    /// CSS font; text is drawn with a `top` baseline.
    fn set_font(&mut self, font: &str);

    fn fill_rect(&mut self, rect: Rect);

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<()>;

    /// Copy `src` of this surface onto itself with its top-left at `(dx, dy)`.
    fn copy_within(&mut self, src: Rect, dx: f64, dy: f64) -> Result<()>;

    fn set_visible(&mut self, visible: bool) -> Result<()>;
}

/// `#rgb` / `#rrggbb` to `0xRRGGBB`; anything else is black.
pub fn parse_hex_color(color: &str) -> u32 {
    let Some(hex) = color.strip_prefix('#') else {
        return 0;
    };
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return 0,
    };
    u32::from_str_radix(&expanded, 16).unwrap_or(0)
}

fn blend(src: u32, dst: u32, alpha: f64) -> u32 {
    let a = alpha.clamp(0.0, 1.0);
    let ch = |shift: u32| {
        let s = ((src >> shift) & 0xff) as f64;
        let d = ((dst >> shift) & 0xff) as f64;
        ((s * a + d * (1.0 - a)).round() as u32) & 0xff
    };
    (ch(16) << 16) | (ch(8) << 8) | ch(0)
}

/// Software surface: an RGB raster plus the last label drawn on it.
#[derive(Debug, Clone)]
pub struct RasterSurface<N = ()> {
    node: N,
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    fill: u32,
    alpha: f64,
    font: String,
    last_text: Option<String>,
    visible: bool,
}

impl RasterSurface<()> {
    pub fn new(width: u32, height: u32) -> Self {
        RasterSurface::with_node((), width, height)
    }
}

impl<N: Clone> RasterSurface<N> {
    pub fn with_node(node: N, width: u32, height: u32) -> Self {
        Self {
            node,
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize)],
            fill: 0,
            alpha: 1.0,
            font: String::new(),
            last_text: None,
            visible: true,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Clip a float rect to integer pixel bounds.
    fn span(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.x.round().max(0.0) as u32;
        let y0 = rect.y.round().max(0.0) as u32;
        let x1 = ((rect.x + rect.w).round().max(0.0) as u32).min(self.width);
        let y1 = ((rect.y + rect.h).round().max(0.0) as u32).min(self.height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }
}

impl<N: Clone> Surface for RasterSurface<N> {
    type Node = N;

    fn node(&self) -> N {
        self.node.clone()
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_fill_style(&mut self, color: &str) {
        self.fill = parse_hex_color(color);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    fn set_font(&mut self, font: &str) {
        self.font = font.to_string();
    }

    fn fill_rect(&mut self, rect: Rect) {
        let Some((x0, y0, x1, y1)) = self.span(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let i = (y * self.width + x) as usize;
                self.pixels[i] = blend(self.fill, self.pixels[i], self.alpha);
            }
        }
    }

    fn fill_text(&mut self, text: &str, _x: f64, _y: f64) -> Result<()> {
        self.last_text = Some(text.to_string());
        Ok(())
    }

    fn copy_within(&mut self, src: Rect, dx: f64, dy: f64) -> Result<()> {
        let Some((x0, y0, x1, y1)) = self.span(src) else {
            return Ok(());
        };
        let (w, h) = (x1 - x0, y1 - y0);
        let mut block = Vec::with_capacity((w * h) as usize);
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            block.extend_from_slice(&self.pixels[row + x0 as usize..row + x1 as usize]);
        }
        let (dx, dy) = (dx.round() as i64, dy.round() as i64);
        for y in 0..h {
            for x in 0..w {
                let tx = dx + x as i64;
                let ty = dy + y as i64;
                if tx < 0 || ty < 0 || tx >= self.width as i64 || ty >= self.height as i64 {
                    continue;
                }
                let dst = (ty as u32 * self.width + tx as u32) as usize;
                self.pixels[dst] = block[(y * w + x) as usize];
            }
        }
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> Result<()> {
        self.visible = visible;
        Ok(())
    }
}
