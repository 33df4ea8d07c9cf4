//! The production renderer: libwkhtmltox driven through its C settings API.
//!
//! ## Why capture error strings through callbacks?
//!
//! `wkhtmltopdf_convert` reports only success/failure; the human-readable
//! cause arrives earlier, through the registered error/warning callbacks.
//! The callbacks land on the render thread (the engine is single-threaded),
//! so a thread-local buffer is enough to collect them per conversion and
//! fold them into the [`RenderError`] detail.
//!
//! ## Lifecycle
//!
//! One [`WkhtmltoxRenderer`] exists per process, confined to the render
//! worker thread. `wkhtmltopdf_init` runs once at construction,
//! `wkhtmltopdf_deinit` on drop. Per job: global settings → converter
//! (consumes them) → object settings → `add_object` (consumes them) →
//! convert → copy output → destroy converter. The output buffer is owned by
//! the converter, so it is copied out before destruction.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_uchar};
use std::path::Path;
use std::ptr;
use std::slice;

use tracing::{info, warn};
use wkhtmltox_auto::{Api, Converter, Wkhtmltox};

use crate::error::StartupError;
use crate::render::{HtmlRenderer, RenderError, RenderJobSpec};

thread_local! {
    /// Engine error strings for the conversion currently in flight.
    static ENGINE_ERRORS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

unsafe extern "C" fn capture_error(_converter: *mut Converter, message: *const c_char) {
    if message.is_null() {
        return;
    }
    let text = CStr::from_ptr(message).to_string_lossy().into_owned();
    ENGINE_ERRORS.with(|buf| buf.borrow_mut().push(text));
}

unsafe extern "C" fn capture_warning(_converter: *mut Converter, message: *const c_char) {
    if message.is_null() {
        return;
    }
    let text = CStr::from_ptr(message).to_string_lossy();
    warn!(engine = %text, "wkhtmltox warning");
}

/// [`HtmlRenderer`] implementation over a loaded wkhtmltox library.
pub struct WkhtmltoxRenderer {
    lib: Wkhtmltox,
}

impl WkhtmltoxRenderer {
    /// Load the library at `path` and initialize the engine.
    ///
    /// Must be called on the thread that will run every subsequent
    /// [`HtmlRenderer::render`] call — the engine binds to its init thread.
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let lib = Wkhtmltox::load(path)?;
        if unsafe { (lib.api().init)(0) } != 1 {
            return Err(StartupError::InitFailed {
                path: path.to_path_buf(),
            });
        }
        let renderer = Self { lib };
        info!(
            path = %path.display(),
            version = %renderer.version(),
            "wkhtmltox engine initialized"
        );
        Ok(renderer)
    }

    /// Engine version string, e.g. `0.12.6`.
    pub fn version(&self) -> String {
        let ptr = unsafe { (self.lib.api().version)() };
        if ptr.is_null() {
            return "unknown".into();
        }
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

impl Drop for WkhtmltoxRenderer {
    fn drop(&mut self) {
        unsafe {
            (self.lib.api().deinit)();
        }
    }
}

impl HtmlRenderer for WkhtmltoxRenderer {
    fn render(&mut self, spec: &RenderJobSpec) -> Result<Vec<u8>, RenderError> {
        let api = *self.lib.api();
        ENGINE_ERRORS.with(|buf| buf.borrow_mut().clear());

        // CString conversion up front: after this point nothing else fails
        // before the converter takes ownership of both settings objects.
        let html = c_string(&spec.html)?;

        unsafe {
            let globals = (api.create_global_settings)();
            if globals.is_null() {
                return Err(RenderError::Engine(
                    "could not allocate global settings".into(),
                ));
            }
            apply_global_settings(&api, globals, spec);

            let converter = (api.create_converter)(globals);
            if converter.is_null() {
                return Err(RenderError::Engine("could not create converter".into()));
            }
            (api.set_error_callback)(converter, Some(capture_error));
            (api.set_warning_callback)(converter, Some(capture_warning));

            let objects = (api.create_object_settings)();
            if objects.is_null() {
                (api.destroy_converter)(converter);
                return Err(RenderError::Engine(
                    "could not allocate object settings".into(),
                ));
            }
            apply_object_settings(&api, objects, spec);

            (api.add_object)(converter, objects, html.as_ptr());

            if (api.convert)(converter) != 1 {
                let http_code = (api.http_error_code)(converter);
                (api.destroy_converter)(converter);
                let mut detail = ENGINE_ERRORS.with(|buf| buf.borrow_mut().join("; "));
                if detail.is_empty() {
                    detail = "engine reported no detail".into();
                }
                if http_code != 0 {
                    detail = format!("{detail} (http error code {http_code})");
                }
                return Err(RenderError::Engine(detail));
            }

            let mut data: *const c_uchar = ptr::null();
            let len = (api.get_output)(converter, &mut data);
            let bytes = if len > 0 && !data.is_null() {
                slice::from_raw_parts(data, len as usize).to_vec()
            } else {
                Vec::new()
            };
            (api.destroy_converter)(converter);

            Ok(bytes)
        }
    }
}

// ── Settings application ─────────────────────────────────────────────────────

unsafe fn apply_global_settings(
    api: &Api,
    settings: *mut wkhtmltox_auto::GlobalSettings,
    spec: &RenderJobSpec,
) {
    let margin = spec.margin();
    let dpi = spec.dpi.to_string();
    let image_dpi = spec.image_dpi.to_string();
    let image_quality = spec.image_quality.to_string();
    let pairs: [(&str, &str); 11] = [
        ("colorMode", "Color"),
        ("orientation", spec.orientation),
        ("size.paperSize", spec.paper_size),
        ("margin.top", &margin),
        ("margin.bottom", &margin),
        ("margin.left", &margin),
        ("margin.right", &margin),
        ("dpi", &dpi),
        ("imageDPI", &image_dpi),
        ("imageQuality", &image_quality),
        ("documentTitle", spec.document_title),
    ];
    for (name, value) in pairs {
        let Some((n, v)) = setting_cstrings(name, value) else {
            continue;
        };
        if (api.set_global_setting)(settings, n.as_ptr(), v.as_ptr()) != 1 {
            warn!(setting = name, value, "engine rejected global setting");
        }
    }
}

unsafe fn apply_object_settings(
    api: &Api,
    settings: *mut wkhtmltox_auto::ObjectSettings,
    spec: &RenderJobSpec,
) {
    let min_font = spec.minimum_font_size.to_string();
    let header_font = spec.header_font_size.to_string();
    let footer_font = spec.footer_font_size.to_string();
    let pairs: [(&str, &str); 14] = [
        ("pagesCount", "true"),
        ("web.defaultEncoding", spec.default_encoding),
        ("web.enableJavascript", bool_value(spec.enable_javascript)),
        ("web.loadImages", bool_value(spec.load_images)),
        (
            "web.enableIntelligentShrinking",
            bool_value(spec.enable_intelligent_shrinking),
        ),
        ("web.printMediaType", bool_value(spec.print_media_type)),
        ("web.minimumFontSize", &min_font),
        ("header.right", spec.header_right),
        ("header.fontSize", &header_font),
        ("header.line", "false"),
        ("footer.center", &spec.footer_center),
        ("footer.fontSize", &footer_font),
        ("footer.line", "false"),
        ("load.blockLocalFileAccess", "true"),
    ];
    for (name, value) in pairs {
        let Some((n, v)) = setting_cstrings(name, value) else {
            continue;
        };
        if (api.set_object_setting)(settings, n.as_ptr(), v.as_ptr()) != 1 {
            warn!(setting = name, value, "engine rejected object setting");
        }
    }
}

fn bool_value(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

/// Name/value as C strings; `None` (with a log line) if either contains an
/// interior NUL. An unknown or rejected setting is logged, not fatal — the
/// engine falls back to its default for that knob.
fn setting_cstrings(name: &str, value: &str) -> Option<(CString, CString)> {
    match (CString::new(name), CString::new(value)) {
        (Ok(n), Ok(v)) => Some((n, v)),
        _ => {
            warn!(setting = name, "setting contains NUL; skipped");
            None
        }
    }
}

/// Content as a C string. Interior NULs cannot cross the FFI boundary; they
/// only occur in garbage input, which the engine would reject anyway, so
/// they are stripped rather than failing the job.
fn c_string(value: &str) -> Result<CString, RenderError> {
    let cleaned = if value.contains('\0') {
        value.replace('\0', "")
    } else {
        value.to_string()
    };
    CString::new(cleaned).map_err(|e| RenderError::BadJob(format!("content not representable: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_string_strips_interior_nuls() {
        let s = c_string("a\0b").unwrap();
        assert_eq!(s.as_bytes(), b"ab");
    }

    #[test]
    fn c_string_passes_clean_content() {
        let s = c_string("<html></html>").unwrap();
        assert_eq!(s.as_bytes(), b"<html></html>");
    }

    #[test]
    fn bool_values_match_engine_syntax() {
        assert_eq!(bool_value(true), "true");
        assert_eq!(bool_value(false), "false");
    }
}
