//! Volume Slider Component
//!
//! Alert volume control, persisted so the preference survives reloads.

use leptos::prelude::*;

use crate::session::{self, use_session, SessionStoreFields};

#[component]
pub fn VolumeSlider() -> impl IntoView {
    let session = use_session();
    let volume = session.volume();

    view! {
        <label class="volume-slider">
            "Volume"
            <input
                type="range"
                min="0"
                max="1"
                step="0.1"
                prop:value=move || volume.get().to_string()
                on:input=move |ev| {
                    if let Ok(level) = event_target_value(&ev).parse::<f64>() {
                        volume.set(level);
                        session::persist_volume(level);
                    }
                }
            />
        </label>
    }
}
