//! C ABI for hosts that load the module from a shared library.
//!
//! The host owns the returned handle and must release it with
//! [`newplus_module_destroy`] exactly once.

use crate::module::{ModuleConfig, ModuleController, PowerModule, WriteOutcome};
use crate::monitoring::init_logging;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::sync::OnceLock;

/// Opaque module handle handed to the host.
pub struct NewPlusHandle {
    module: Box<ModuleController>,
    name: OnceLock<CString>,
    key: CString,
}

impl NewPlusHandle {
    fn new(module: ModuleController) -> Self {
        let key = CString::new(module.key()).unwrap_or_default();
        Self {
            module: Box::new(module),
            name: OnceLock::new(),
            key,
        }
    }
}

/// `newplus_module_set_config`: a tracked field changed.
pub const CONFIG_CHANGED: c_int = 1;
/// `newplus_module_set_config`: document accepted, nothing changed.
pub const CONFIG_UNCHANGED: c_int = 0;
/// `newplus_module_set_config`: document ignored.
pub const CONFIG_IGNORED: c_int = -1;

unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Create the module.
///
/// Installs the module's tracing subscriber unless the host already set one.
///
/// `settings_root` may be null, in which case the relative directory
/// `settings` is used. It resolves against the host process's working
/// directory, so hosts should pass an absolute root. Returns null if the
/// module cannot be configured.
///
/// # Safety
/// `settings_root` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_create(settings_root: *const c_char) -> *mut NewPlusHandle {
    let config = match unsafe { str_arg(settings_root) } {
        Some(root) => ModuleConfig::with_settings_root(root),
        None => ModuleConfig::default(),
    };
    init_logging(&config.logging);

    match ModuleController::from_config(&config) {
        Ok(module) => Box::into_raw(Box::new(NewPlusHandle::new(module))),
        Err(e) => {
            tracing::error!(error = %e, "module creation failed");
            std::ptr::null_mut()
        }
    }
}

/// Destroy the module. Null is ignored.
///
/// # Safety
/// `handle` must come from [`newplus_module_create`] and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_destroy(handle: *mut NewPlusHandle) {
    if handle.is_null() {
        return;
    }
    let handle = unsafe { Box::from_raw(handle) };
    handle.module.destroy();
}

/// Localized display name; valid until the handle is destroyed.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_name(handle: *const NewPlusHandle) -> *const c_char {
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return std::ptr::null();
    };
    handle
        .name
        .get_or_init(|| CString::new(handle.module.name()).unwrap_or_default())
        .as_ptr()
}

/// Machine key; valid until the handle is destroyed.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_key(handle: *const NewPlusHandle) -> *const c_char {
    match unsafe { handle.as_ref() } {
        Some(handle) => handle.key.as_ptr(),
        None => std::ptr::null(),
    }
}

/// Policy state: 1 forced on, 0 forced off, -1 not configured.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_gpo_state(handle: *const NewPlusHandle) -> c_int {
    match unsafe { handle.as_ref() } {
        Some(handle) => handle.module.policy_state().as_raw(),
        None => -1,
    }
}

/// Configuration is not served here; always reports nothing written.
///
/// # Safety
/// `buffer_size` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_get_config(
    _handle: *const NewPlusHandle,
    _buffer: *mut c_char,
    buffer_size: *mut c_int,
) -> bool {
    if let Some(size) = unsafe { buffer_size.as_mut() } {
        *size = 0;
    }
    false
}

/// Hand a saved configuration document to the module.
///
/// # Safety
/// `handle` must be a live handle; `config` null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_set_config(
    handle: *mut NewPlusHandle,
    config: *const c_char,
) -> c_int {
    let Some(handle) = (unsafe { handle.as_mut() }) else {
        return CONFIG_IGNORED;
    };
    if config.is_null() {
        return CONFIG_IGNORED;
    }
    let document = unsafe { CStr::from_ptr(config) };
    match handle.module.write_config_bytes(document.to_bytes()) {
        WriteOutcome::Applied { changed: true } => CONFIG_CHANGED,
        WriteOutcome::Applied { changed: false } => CONFIG_UNCHANGED,
        WriteOutcome::Ignored(_) => CONFIG_IGNORED,
    }
}

/// Enable the module.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_enable(handle: *mut NewPlusHandle) {
    if let Some(handle) = unsafe { handle.as_mut() } {
        handle.module.enable();
    }
}

/// Disable the module.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_disable(handle: *mut NewPlusHandle) {
    if let Some(handle) = unsafe { handle.as_mut() } {
        handle.module.disable();
    }
}

/// Whether the module is enabled.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_is_enabled(handle: *const NewPlusHandle) -> bool {
    unsafe { handle.as_ref() }
        .map(|h| h.module.is_enabled())
        .unwrap_or(false)
}

/// Whether the host should enable the module on first run.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_is_enabled_by_default(handle: *const NewPlusHandle) -> bool {
    unsafe { handle.as_ref() }
        .map(|h| h.module.is_enabled_by_default())
        .unwrap_or(false)
}

/// Forward the "hide file extension" hint.
///
/// # Safety
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_hide_file_extension(handle: *const NewPlusHandle, hide: bool) {
    if let Some(handle) = unsafe { handle.as_ref() } {
        handle.module.on_hide_extension_hint(hide);
    }
}

/// Forward the template location hint.
///
/// # Safety
/// `handle` must be a live handle; `path` null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn newplus_module_template_location(
    handle: *const NewPlusHandle,
    path: *const c_char,
) {
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return;
    };
    if let Some(path) = unsafe { str_arg(path) } {
        handle.module.on_template_location_hint(path);
    }
}
