use std::str::FromStr;

use js_sys::{Float32Array, Function};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

use crate::application::ChartView;
use crate::domain::chart::{ChartSettings, ChartStyle, Color, Point, Size};
use crate::domain::errors::AppError;
use crate::domain::events::{ChartEvent, DomainEvent};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Symbol, TimeInterval};
use crate::infrastructure::rendering::{GesturePhase, HLine, HLineStyle};
use crate::infrastructure::wire::parse_quotes;
use crate::{log_error, log_info};

fn js_error(error: AppError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error(e.into()))
}

/// JSON shape handed to JS event callbacks.
pub fn event_payload(event: &ChartEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|_| format!("{{\"type\":\"{}\"}}", event.event_type()))
}

/// JavaScript facade: a thin bridge to `ChartView` with no logic of its own.
#[wasm_bindgen]
pub struct ChartApi {
    view: ChartView,
}

#[wasm_bindgen]
impl ChartApi {
    /// `settings_json` may be empty, defaults are used then.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, settings_json: Option<String>) -> Result<ChartApi, JsValue> {
        let settings = match settings_json.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => ChartSettings::from_json(json).map_err(|e| {
                log_error!(
                    LogComponent::Presentation("ChartApi"),
                    "invalid settings: {}",
                    e
                );
                js_error(e)
            })?,
            _ => ChartSettings::default(),
        };
        let view = ChartView::new(settings, Size::new(width, height)).map_err(js_error)?;
        log_info!(
            LogComponent::Presentation("ChartApi"),
            "chart created {}x{}",
            width,
            height
        );
        Ok(ChartApi { view })
    }

    #[wasm_bindgen(js_name = setSettings)]
    pub fn set_settings(&mut self, settings_json: &str) -> Result<(), JsValue> {
        let settings = ChartSettings::from_json(settings_json).map_err(js_error)?;
        self.view.set_settings(settings).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setSymbol)]
    pub fn set_symbol(&mut self, symbol: &str) -> Result<(), JsValue> {
        let symbol = Symbol::new(symbol).map_err(js_error)?;
        self.view.set_symbol(symbol);
        Ok(())
    }

    /// Accepts "1m", "1h"... as well as a number of seconds.
    #[wasm_bindgen(js_name = setInterval)]
    pub fn set_interval(&mut self, interval: &str) -> Result<(), JsValue> {
        let seconds = match interval.trim().parse::<u32>() {
            Ok(seconds) if seconds > 0 => seconds,
            _ => TimeInterval::parse(interval).map_err(js_error)?.seconds(),
        };
        self.view.set_interval(seconds);
        Ok(())
    }

    #[wasm_bindgen(js_name = setDecimals)]
    pub fn set_decimals(&mut self, decimals: u32) {
        self.view.set_decimals(decimals);
    }

    #[wasm_bindgen(js_name = setSize)]
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.view.set_size(Size::new(width, height));
    }

    /// Returns the number of quotes accepted.
    #[wasm_bindgen(js_name = addQuotesJson)]
    pub fn add_quotes_json(&mut self, json: &str) -> Result<usize, JsValue> {
        let quotes = parse_quotes(json).map_err(|e| {
            log_error!(
                LogComponent::Presentation("ChartApi"),
                "rejected batch: {}",
                e
            );
            js_error(e)
        })?;
        Ok(self.view.add_quotes(quotes).added)
    }

    #[wasm_bindgen(js_name = updateLastPrice)]
    pub fn update_last_price(&mut self, price: f64) -> bool {
        self.view.update_last_price(price)
    }

    #[wasm_bindgen(js_name = changeStyle)]
    pub fn change_style(&mut self, style: &str) -> Result<(), JsValue> {
        let style = ChartStyle::from_str(&style.trim().to_lowercase())
            .map_err(|_| js_error(AppError::ValidationError(format!("unknown chart style '{}'", style))))?;
        self.view.change_style(style);
        Ok(())
    }

    pub fn style(&self) -> String {
        self.view.style().as_ref().to_string()
    }

    pub fn zoom(&mut self, scale: f64) -> bool {
        self.view.zoom(scale)
    }

    #[wasm_bindgen(js_name = zoomAt)]
    pub fn zoom_at(&mut self, factor: f64, anchor_x: f64) -> bool {
        self.view.zoom_at(factor, anchor_x)
    }

    #[wasm_bindgen(js_name = resetZoom)]
    pub fn reset_zoom(&mut self) {
        self.view.reset_zoom();
    }

    #[wasm_bindgen(js_name = scrollTo)]
    pub fn scroll_to(&mut self, offset: f64) {
        self.view.scroll_to(offset);
    }

    #[wasm_bindgen(js_name = scrollBy)]
    pub fn scroll_by(&mut self, delta: f64) {
        self.view.scroll_by(delta);
    }

    #[wasm_bindgen(js_name = scrollToFirst)]
    pub fn scroll_to_first(&mut self) {
        self.view.scroll_to_first();
    }

    #[wasm_bindgen(js_name = scrollToLast)]
    pub fn scroll_to_last(&mut self) {
        self.view.scroll_to_last();
    }

    #[wasm_bindgen(js_name = isLastPointVisible)]
    pub fn is_last_point_visible(&self) -> bool {
        self.view.is_last_point_visible()
    }

    /// `phase`: 0 began, 1 changed, 2 ended, anything else cancelled.
    /// Returns the selected quote as JSON, or `undefined`.
    pub fn select(&mut self, phase: u8, x: f64, y: f64) -> Result<Option<String>, JsValue> {
        let phase = match phase {
            0 => GesturePhase::Began,
            1 => GesturePhase::Changed,
            2 => GesturePhase::Ended,
            _ => GesturePhase::Cancelled,
        };
        self.view
            .handle_selection(phase, Point::new(x, y))
            .map(|quote| to_json(&quote))
            .transpose()
    }

    #[wasm_bindgen(js_name = addHLine)]
    pub fn add_hline(
        &mut self,
        id: &str,
        value: f64,
        style: &str,
        color: &str,
        label: Option<String>,
    ) -> Result<(), JsValue> {
        let style = match style {
            "dashed" => HLineStyle::Dashed,
            "dotted" => HLineStyle::Dotted,
            _ => HLineStyle::Solid,
        };
        let color = Color::parse(color).map_err(js_error)?;
        self.view.add_hline(HLine::new(id, value, style, color, label));
        Ok(())
    }

    #[wasm_bindgen(js_name = removeHLine)]
    pub fn remove_hline(&mut self, id: &str) -> usize {
        self.view.remove_hline(id)
    }

    #[wasm_bindgen(js_name = removeHLines)]
    pub fn remove_hlines(&mut self) {
        self.view.remove_hlines();
    }

    #[wasm_bindgen(js_name = toggleVerticalScale)]
    pub fn toggle_vertical_scale(&mut self) -> bool {
        self.view.toggle_vertical_scale()
    }

    /// Registers `callback(type, payloadJson)` for every chart event.
    pub fn subscribe(&mut self, callback: Function) {
        self.view.subscribe(move |event| {
            let _ = callback.call2(
                &JsValue::NULL,
                &JsValue::from_str(event.event_type()),
                &JsValue::from_str(&event_payload(event)),
            );
        });
    }

    /// Interleaved `[x, y, element, r, g, b, a]` per vertex.
    pub fn vertices(&self) -> Float32Array {
        let flat: Vec<f32> = self
            .view
            .vertices()
            .iter()
            .flat_map(|v| {
                [
                    v.position_x,
                    v.position_y,
                    v.element_type,
                    v.color[0],
                    v.color[1],
                    v.color[2],
                    v.color[3],
                ]
            })
            .collect();
        Float32Array::from(flat.as_slice())
    }

    /// Axis labels and grid as JSON, for DOM text overlays.
    pub fn labels(&self) -> Result<String, JsValue> {
        let x: Vec<_> = self.view.x_axis().labels().collect();
        let payload = serde_json::json!({
            "x": x,
            "percent": self.view.percent_axis().labels(),
            "value": self.view.value_axis().labels(),
            "reference": self.view.percent_axis().reference(),
            "current": self.view.value_axis().current(),
            "hlines": self.view.hlines().placed(),
        });
        to_json(&payload)
    }

    #[wasm_bindgen(js_name = metricsJson)]
    pub fn metrics_json(&self) -> Result<String, JsValue> {
        to_json(self.view.metrics_y())
    }

    #[wasm_bindgen(js_name = quoteCount)]
    pub fn quote_count(&self) -> usize {
        self.view.store().count()
    }

    #[wasm_bindgen(js_name = isScaleButtonVisible)]
    pub fn is_scale_button_visible(&self) -> bool {
        self.view.is_scale_button_visible()
    }
}
