use apg_gui::stats::HeapProbe;
use js_sys::Reflect;
use wasm_bindgen::JsValue;
use web_sys::Performance;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// `performance.memory.usedJSHeapSize`, where the browser exposes it.
pub struct PerformanceHeap {
    performance: Performance,
}

impl PerformanceHeap {
    /// `None` unless the non-standard `performance.memory` object exists.
    pub fn detect(performance: Performance) -> Option<Self> {
        let probe = Self { performance };
        probe.used_mb().map(|_| probe)
    }
}

impl HeapProbe for PerformanceHeap {
    fn used_mb(&self) -> Option<f64> {
        let memory = Reflect::get(&self.performance, &JsValue::from_str("memory")).ok()?;
        if memory.is_undefined() || memory.is_null() {
            return None;
        }
        let used = Reflect::get(&memory, &JsValue::from_str("usedJSHeapSize")).ok()?;
        used.as_f64().map(|bytes| bytes / BYTES_PER_MB)
    }
}
