//! # wkhtmltox-auto
//!
//! Locate and load the [wkhtmltox](https://wkhtmltopdf.org/) shared library
//! at runtime, so that services embedding the engine do not need to link
//! against it at build time.
//!
//! ## How it works
//!
//! On a call to [`locate_library`]:
//!
//! 1. If `WKHTMLTOX_LIB_PATH` points to an existing file, that path wins.
//! 2. Otherwise the platform library name (`libwkhtmltox.so`,
//!    `libwkhtmltox.dylib`, `wkhtmltox.dll`) is probed in the well-known
//!    install locations of the official wkhtmltopdf packages.
//! 3. If nothing is found, the error lists every path that was probed so the
//!    operator can see exactly what to install or point the env var at.
//!
//! [`Wkhtmltox::load`] then opens the library with `libloading` and resolves
//! the full `wkhtmltopdf_*` symbol table once. The returned handle owns the
//! library for its whole lifetime; the raw function pointers in [`Api`] stay
//! valid for exactly as long as the handle is alive.
//!
//! Unlike engines distributed as bare archives, wkhtmltox ships through OS
//! installer packages, so there is no download step here — resolution stops
//! at locating an installed copy.
//!
//! ## Safety
//!
//! Everything reachable through [`Api`] calls directly into C with no
//! Rust-side validation. The engine is single-threaded by design:
//! `wkhtmltopdf_init` and every subsequent call must happen on the same
//! thread, and no two conversions may overlap. Callers are expected to
//! confine the handle to one dedicated thread.
//!
//! ## Environment variable overrides
//!
//! - `WKHTMLTOX_LIB_PATH` — path to an existing wkhtmltox library; skips
//!   the well-known-location probe entirely.

use std::os::raw::{c_char, c_int, c_long, c_uchar};
use std::path::{Path, PathBuf};

use libloading::Library;
use thiserror::Error;

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by wkhtmltox-auto operations.
#[derive(Error, Debug)]
pub enum WkhtmltoxAutoError {
    /// No library file was found at the override path or any probed location.
    #[error(
        "wkhtmltox library not found. Probed:\n{}\n\
         Install wkhtmltopdf (with libwkhtmltox) or set WKHTMLTOX_LIB_PATH.",
        format_probed(.searched)
    )]
    NotFound { searched: Vec<PathBuf> },

    /// The dynamic loader refused the file at `path`.
    #[error("Failed to load wkhtmltox from '{path}': {reason}")]
    Load { path: PathBuf, reason: String },

    /// The library loaded but a required symbol is absent — wrong library or
    /// an incompatible wkhtmltox build.
    #[error("wkhtmltox is missing symbol '{name}': {reason}")]
    MissingSymbol { name: &'static str, reason: String },
}

fn format_probed(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Platform metadata ────────────────────────────────────────────────────────

/// Shared-library file names to probe for, most specific first.
fn platform_lib_names() -> &'static [&'static str] {
    match std::env::consts::OS {
        "macos" => &["libwkhtmltox.dylib"],
        "windows" => &["wkhtmltox.dll"],
        // The official Linux packages install a versioned soname next to the
        // plain one; probe both.
        _ => &["libwkhtmltox.so", "libwkhtmltox.so.0"],
    }
}

/// Directories the official wkhtmltopdf packages install into.
fn platform_search_dirs() -> Vec<PathBuf> {
    match std::env::consts::OS {
        "macos" => vec![
            PathBuf::from("/usr/local/lib"),
            PathBuf::from("/opt/homebrew/lib"),
        ],
        "windows" => vec![
            PathBuf::from(r"C:\Program Files\wkhtmltopdf\bin"),
            PathBuf::from(r"C:\Program Files (x86)\wkhtmltopdf\bin"),
        ],
        _ => vec![
            PathBuf::from("/usr/local/lib"),
            PathBuf::from("/usr/lib"),
            PathBuf::from("/usr/lib/x86_64-linux-gnu"),
            PathBuf::from("/usr/lib/aarch64-linux-gnu"),
            PathBuf::from("/opt/wkhtmltox/lib"),
        ],
    }
}

// ── Path resolution ──────────────────────────────────────────────────────────

/// Resolve the on-disk path of the wkhtmltox shared library.
///
/// Resolution order:
/// 1. `WKHTMLTOX_LIB_PATH` (if it names an existing file)
/// 2. The platform library name in each well-known install directory
///
/// # Errors
/// [`WkhtmltoxAutoError::NotFound`] listing every probed path when no
/// candidate exists.
pub fn locate_library() -> Result<PathBuf, WkhtmltoxAutoError> {
    let mut searched = Vec::new();

    if let Ok(env_path) = std::env::var("WKHTMLTOX_LIB_PATH") {
        if !env_path.is_empty() {
            let p = PathBuf::from(&env_path);
            if p.is_file() {
                return Ok(p);
            }
            // Env var set but file missing: keep probing, but record it so
            // the NotFound message shows the stale override.
            searched.push(p);
        }
    }

    for dir in platform_search_dirs() {
        for name in platform_lib_names() {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
            searched.push(candidate);
        }
    }

    Err(WkhtmltoxAutoError::NotFound { searched })
}

// ── Opaque engine handles ────────────────────────────────────────────────────

/// Opaque `wkhtmltopdf_global_settings` handle.
#[repr(C)]
pub struct GlobalSettings {
    _private: [u8; 0],
}

/// Opaque `wkhtmltopdf_object_settings` handle.
#[repr(C)]
pub struct ObjectSettings {
    _private: [u8; 0],
}

/// Opaque `wkhtmltopdf_converter` handle.
#[repr(C)]
pub struct Converter {
    _private: [u8; 0],
}

/// C callback receiving converter progress/error strings.
///
/// The `*const c_char` argument is a NUL-terminated UTF-8 string owned by
/// the engine; it must be copied before the callback returns.
pub type StrCallback = unsafe extern "C" fn(converter: *mut Converter, message: *const c_char);

// ── Symbol table ─────────────────────────────────────────────────────────────

/// The resolved `wkhtmltopdf_*` C symbol table.
///
/// Every pointer stays valid while the owning [`Wkhtmltox`] is alive. All
/// calls are `unsafe`: they go straight into C and inherit the engine's
/// single-thread discipline (see the crate docs).
#[derive(Clone, Copy)]
pub struct Api {
    /// Initialize the engine. `use_graphics` selects the patched-Qt
    /// graphics mode; pass `0`. Returns 1 on success.
    pub init: unsafe extern "C" fn(use_graphics: c_int) -> c_int,
    /// Tear down the engine. Call once, after all converters are destroyed.
    pub deinit: unsafe extern "C" fn() -> c_int,
    /// Engine version string, e.g. `0.12.6`. Static storage, do not free.
    pub version: unsafe extern "C" fn() -> *const c_char,
    /// Allocate a global (per-document) settings object.
    pub create_global_settings: unsafe extern "C" fn() -> *mut GlobalSettings,
    /// Set a named global setting. Returns 1 on success, 0 on unknown name.
    pub set_global_setting:
        unsafe extern "C" fn(*mut GlobalSettings, name: *const c_char, value: *const c_char) -> c_int,
    /// Allocate an object (per-input) settings object.
    pub create_object_settings: unsafe extern "C" fn() -> *mut ObjectSettings,
    /// Set a named object setting. Returns 1 on success, 0 on unknown name.
    pub set_object_setting:
        unsafe extern "C" fn(*mut ObjectSettings, name: *const c_char, value: *const c_char) -> c_int,
    /// Build a converter. Takes ownership of the global settings.
    pub create_converter: unsafe extern "C" fn(*mut GlobalSettings) -> *mut Converter,
    /// Destroy a converter and everything it owns, including the output
    /// buffer returned by [`Api::get_output`].
    pub destroy_converter: unsafe extern "C" fn(*mut Converter),
    /// Add an input object with inline HTML `data`. Takes ownership of the
    /// object settings.
    pub add_object:
        unsafe extern "C" fn(*mut Converter, *mut ObjectSettings, data: *const c_char),
    /// Run the conversion. Returns 1 on success.
    pub convert: unsafe extern "C" fn(*mut Converter) -> c_int,
    /// Borrow the output buffer. The pointer is owned by the converter and
    /// is invalidated by [`Api::destroy_converter`]; returns the byte count.
    pub get_output: unsafe extern "C" fn(*mut Converter, *mut *const c_uchar) -> c_long,
    /// Last HTTP error code seen while loading content, or 0.
    pub http_error_code: unsafe extern "C" fn(*mut Converter) -> c_int,
    /// Register an error-string callback (may be `None` to clear).
    pub set_error_callback: unsafe extern "C" fn(*mut Converter, Option<StrCallback>),
    /// Register a warning-string callback (may be `None` to clear).
    pub set_warning_callback: unsafe extern "C" fn(*mut Converter, Option<StrCallback>),
    /// Current conversion phase — used only by progress reporting.
    pub current_phase: unsafe extern "C" fn(*mut Converter) -> c_int,
}

/// A loaded wkhtmltox library with its resolved symbol table.
///
/// Dropping this unloads the library; callers must not retain [`Api`]
/// pointers past that point. The handle is `Send` so it can be moved onto a
/// dedicated render thread; confining all calls to that one thread is the
/// caller's responsibility.
pub struct Wkhtmltox {
    api: Api,
    _lib: Library,
}

impl Wkhtmltox {
    /// Open the shared library at `path` and resolve the symbol table.
    ///
    /// # Errors
    /// [`WkhtmltoxAutoError::Load`] when the dynamic loader rejects the
    /// file; [`WkhtmltoxAutoError::MissingSymbol`] when a `wkhtmltopdf_*`
    /// entry point is absent.
    pub fn load(path: &Path) -> Result<Self, WkhtmltoxAutoError> {
        let lib = unsafe { Library::new(path) }.map_err(|e| WkhtmltoxAutoError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let api = unsafe {
            Api {
                init: sym(&lib, "wkhtmltopdf_init")?,
                deinit: sym(&lib, "wkhtmltopdf_deinit")?,
                version: sym(&lib, "wkhtmltopdf_version")?,
                create_global_settings: sym(&lib, "wkhtmltopdf_create_global_settings")?,
                set_global_setting: sym(&lib, "wkhtmltopdf_set_global_setting")?,
                create_object_settings: sym(&lib, "wkhtmltopdf_create_object_settings")?,
                set_object_setting: sym(&lib, "wkhtmltopdf_set_object_setting")?,
                create_converter: sym(&lib, "wkhtmltopdf_create_converter")?,
                destroy_converter: sym(&lib, "wkhtmltopdf_destroy_converter")?,
                add_object: sym(&lib, "wkhtmltopdf_add_object")?,
                convert: sym(&lib, "wkhtmltopdf_convert")?,
                get_output: sym(&lib, "wkhtmltopdf_get_output")?,
                http_error_code: sym(&lib, "wkhtmltopdf_http_error_code")?,
                set_error_callback: sym(&lib, "wkhtmltopdf_set_error_callback")?,
                set_warning_callback: sym(&lib, "wkhtmltopdf_set_warning_callback")?,
                current_phase: sym(&lib, "wkhtmltopdf_current_phase")?,
            }
        };

        Ok(Self { api, _lib: lib })
    }

    /// Locate the platform library and load it in one step.
    pub fn load_default() -> Result<Self, WkhtmltoxAutoError> {
        Self::load(&locate_library()?)
    }

    /// The resolved symbol table.
    pub fn api(&self) -> &Api {
        &self.api
    }
}

/// Resolve one symbol into a bare (Copy) function pointer.
unsafe fn sym<T: Copy>(lib: &Library, name: &'static str) -> Result<T, WkhtmltoxAutoError> {
    let symbol = lib
        .get::<T>(name.as_bytes())
        .map_err(|e| WkhtmltoxAutoError::MissingSymbol {
            name,
            reason: e.to_string(),
        })?;
    Ok(*symbol)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
