use std::time::Duration;

use folio_client::api::Time;

pub async fn sleep(d: Duration) {
    if let Err(e) = wasm_timer::Delay::new(d).await {
        tracing::warn!(error = ?e, "timer failed");
    }
}

pub fn now() -> Time {
    chrono::Utc::now()
}

/// Origin the app was served from, used as the default backend
pub fn origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

pub fn current_url() -> Option<String> {
    web_sys::window().and_then(|w| w.location().href().ok())
}

/// Drops the OAuth2 query parameters from the address bar
pub fn reset_url() {
    if let Some(w) = web_sys::window() {
        if let Ok(path) = w.location().pathname() {
            if let Err(e) = w.location().replace(&path) {
                tracing::debug!(?e, %path, "failed to reset url");
            }
        }
    }
}

pub fn redirect(url: &str) {
    if let Some(w) = web_sys::window() {
        if let Err(e) = w.location().set_href(url) {
            tracing::error!(?e, %url, "failed to redirect");
        }
    }
}

pub fn format_time(t: Option<Time>) -> String {
    match t {
        Some(t) => t
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => String::new(),
    }
}

pub async fn read_file(file: web_sys::File) -> anyhow::Result<Vec<u8>> {
    let buf = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| anyhow::anyhow!("reading file: {e:?}"))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn missing_times_are_blank() {
        assert_eq!(format_time(None), "");
        let t = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(format_time(Some(t)).len(), "2024-03-09 14:05".len());
    }
}
