//! Page widgets: visitor counter and current weather
//!
//! Both are a single GET whose JSON fills one element. Failures never
//! reach the games; the element gets a fallback text instead.

use serde::Deserialize;

use crate::error::Result;

pub const COUNTER_URL: &str = "https://abacus.jasoncameron.dev/hit/shankapotamus88/visitor";
pub const WEATHER_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";

/// Used when `#weather` carries no usable `data-lat`/`data-lon`
pub const DEFAULT_LAT: f64 = 51.5074;
pub const DEFAULT_LON: f64 = -0.1278;

pub const VISITS_FALLBACK: &str = "Visits unavailable";
pub const WEATHER_FALLBACK: &str = "Weather unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
struct HitCounter {
    value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CurrentWeather {
    /// Degrees Celsius
    pub temperature: f64,
    /// km/h
    pub windspeed: f64,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    current_weather: CurrentWeather,
}

pub fn weather_url(lat: f64, lon: f64) -> String {
    format!("{WEATHER_ENDPOINT}?latitude={lat}&longitude={lon}&current_weather=true")
}

/// Parse a coordinate attribute, falling back on anything non-finite
pub fn parse_coord(raw: Option<&str>, default: f64) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

pub fn parse_visits(body: &str) -> Result<u64> {
    let counter: HitCounter = serde_json::from_str(body)?;
    Ok(counter.value)
}

pub fn parse_weather(body: &str) -> Result<CurrentWeather> {
    let forecast: Forecast = serde_json::from_str(body)?;
    Ok(forecast.current_weather)
}

pub fn visits_text(visits: Result<u64>) -> String {
    match visits {
        Ok(n) => format!("Total visits: {n}"),
        Err(e) => {
            log::error!("Visit counter error: {e}");
            VISITS_FALLBACK.to_string()
        }
    }
}

pub fn weather_text(weather: Result<CurrentWeather>) -> String {
    match weather {
        Ok(w) => format!("Weather: {:.1}°C, wind {:.1} km/h", w.temperature, w.windspeed),
        Err(e) => {
            log::error!("Weather error: {e}");
            WEATHER_FALLBACK.to_string()
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::start;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::{JsFuture, spawn_local};
    use web_sys::{Element, Response};

    use super::*;
    use crate::error::ArcadeError;

    async fn fetch_text(url: &str) -> Result<String> {
        let window = web_sys::window().ok_or(ArcadeError::MissingElement("window"))?;
        let resp: Response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| ArcadeError::Fetch(format!("{e:?}")))?
            .dyn_into()?;
        if !resp.ok() {
            return Err(ArcadeError::Http {
                status: resp.status(),
            });
        }
        let body = JsFuture::from(resp.text()?).await?;
        body.as_string()
            .ok_or_else(|| ArcadeError::Fetch("response body is not text".into()))
    }

    fn show_visits(el: Element) {
        spawn_local(async move {
            let visits = match fetch_text(COUNTER_URL).await {
                Ok(body) => parse_visits(&body),
                Err(e) => Err(e),
            };
            el.set_text_content(Some(&visits_text(visits)));
        });
    }

    fn show_weather(el: Element) {
        let lat = parse_coord(el.get_attribute("data-lat").as_deref(), DEFAULT_LAT);
        let lon = parse_coord(el.get_attribute("data-lon").as_deref(), DEFAULT_LON);
        let url = weather_url(lat, lon);
        spawn_local(async move {
            let weather = match fetch_text(&url).await {
                Ok(body) => parse_weather(&body),
                Err(e) => Err(e),
            };
            el.set_text_content(Some(&weather_text(weather)));
        });
    }

    /// Fill whichever widgets the page has; fire-and-forget
    pub fn start() {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("visit-count") {
            show_visits(el);
        }
        if let Some(el) = document.get_element_by_id("weather") {
            show_weather(el);
        }
    }
}
