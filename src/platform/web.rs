//! Browser glue (wasm32 only)
//!
//! Permission prompt, `deviceorientation` subscription and small DOM helpers.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{DeviceOrientationEvent, Window};

use super::orientation::{RawOrientation, SensorAccess};

// iOS 13+ gates orientation events behind a promise-returning prompt that
// must run inside a user gesture. Elsewhere events just flow.
#[wasm_bindgen(inline_js = "
    export function request_orientation_permission() {
        if (typeof DeviceOrientationEvent === 'undefined') {
            return Promise.resolve('unsupported');
        }
        if (typeof DeviceOrientationEvent.requestPermission === 'function') {
            return DeviceOrientationEvent.requestPermission()
                .then((state) => state === 'granted' ? 'granted' : 'denied')
                .catch((e) => { console.error(e); return 'denied'; });
        }
        return Promise.resolve('granted');
    }
")]
extern "C" {
    fn request_orientation_permission() -> js_sys::Promise;
}

/// Prompt for orientation access. Call from a tap/click handler.
pub async fn request_permission() -> SensorAccess {
    match JsFuture::from(request_orientation_permission()).await {
        Ok(value) => match value.as_string().as_deref() {
            Some("granted") => SensorAccess::Granted,
            Some("unsupported") => SensorAccess::Unsupported,
            _ => SensorAccess::Denied,
        },
        Err(e) => {
            log::warn!("Orientation permission failed: {:?}", e);
            SensorAccess::Denied
        }
    }
}

/// Live `deviceorientation` listener. Dropping it removes the listener.
pub struct OrientationSubscription {
    window: Window,
    closure: Closure<dyn FnMut(DeviceOrientationEvent)>,
}

impl OrientationSubscription {
    pub fn subscribe(mut on_reading: impl FnMut(RawOrientation) + 'static) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
            on_reading(RawOrientation {
                beta: event.beta(),
                gamma: event.gamma(),
                timestamp_ms: event.time_stamp().max(0.0) as u64,
            });
        });
        window.add_event_listener_with_callback(
            "deviceorientation",
            closure.as_ref().unchecked_ref(),
        )?;
        log::info!("Listening for device orientation");
        Ok(Self { window, closure })
    }
}

impl Drop for OrientationSubscription {
    fn drop(&mut self) {
        let _ = self.window.remove_event_listener_with_callback(
            "deviceorientation",
            self.closure.as_ref().unchecked_ref(),
        );
        log::info!("Stopped listening for device orientation");
    }
}

/// Set an element's text by id
pub fn set_text(id: &str, text: &str) {
    if let Some(el) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
    {
        el.set_text_content(Some(text));
    }
}

/// Set an element's class attribute by id
pub fn set_class(id: &str, class: &str) {
    if let Some(el) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
    {
        let _ = el.set_attribute("class", class);
    }
}
