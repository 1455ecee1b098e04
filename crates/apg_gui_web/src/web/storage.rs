use apg_gui::GuiConfig;
use tracing::warn;
use web_sys::Window;

pub(super) const CONFIG_KEY: &str = "apg_gui.config.v1";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(super) fn local_storage_get_string(key: &str) -> Option<String> {
    local_storage().and_then(|s| s.get_item(key).ok().flatten())
}

pub(super) fn local_storage_set_string(key: &str, value: &str) {
    if let Some(s) = local_storage() {
        let _ = s.set_item(key, value);
    }
}

/// Saved overrides (or defaults), with the pixel ratio taken from the window.
pub(super) fn load_config(window: &Window) -> GuiConfig {
    let mut cfg = match local_storage_get_string(CONFIG_KEY) {
        Some(raw) => GuiConfig::from_json(&raw).unwrap_or_else(|e| {
            warn!("ignoring saved config: {e}");
            GuiConfig::default()
        }),
        None => GuiConfig::default(),
    };
    let ratio = window.device_pixel_ratio();
    if ratio.is_finite() && ratio > 0.0 {
        cfg.stats.pixel_ratio = ratio;
    }
    cfg
}

pub(super) fn save_config(cfg: &GuiConfig) {
    match cfg.to_json() {
        Ok(raw) => local_storage_set_string(CONFIG_KEY, &raw),
        Err(e) => warn!("config not saved: {e}"),
    }
}
