use newplus::host::ffi::*;
use std::ffi::{CStr, CString};
use std::os::raw::c_int;

fn settings_root(dir: &tempfile::TempDir) -> CString {
    CString::new(dir.path().to_str().unwrap()).unwrap()
}

#[test]
fn test_create_query_destroy() {
    let dir = tempfile::tempdir().unwrap();
    let root = settings_root(&dir);

    unsafe {
        let handle = newplus_module_create(root.as_ptr());
        assert!(!handle.is_null());

        let name = CStr::from_ptr(newplus_module_name(handle)).to_str().unwrap();
        assert_eq!(name, "New+");
        let key = CStr::from_ptr(newplus_module_key(handle)).to_str().unwrap();
        assert_eq!(key, "NewPlus");

        assert!(!newplus_module_is_enabled(handle));
        assert!(!newplus_module_is_enabled_by_default(handle));
        assert_eq!(newplus_module_gpo_state(handle), -1);

        newplus_module_enable(handle);
        assert!(newplus_module_is_enabled(handle));
        newplus_module_disable(handle);
        assert!(!newplus_module_is_enabled(handle));

        newplus_module_hide_file_extension(handle, true);
        let path = CString::new("D:\\Templates").unwrap();
        newplus_module_template_location(handle, path.as_ptr());

        newplus_module_destroy(handle);
    }
}

#[test]
fn test_create_installs_logging() {
    let dir = tempfile::tempdir().unwrap();
    let root = settings_root(&dir);

    unsafe {
        let handle = newplus_module_create(root.as_ptr());
        assert!(!handle.is_null());
        assert!(tracing::dispatcher::has_been_set());

        let garbage = CString::new("not json").unwrap();
        assert_eq!(newplus_module_set_config(handle, garbage.as_ptr()), CONFIG_IGNORED);
        newplus_module_destroy(handle);
    }
}

#[test]
fn test_set_config_codes() {
    let dir = tempfile::tempdir().unwrap();
    let root = settings_root(&dir);
    std::fs::create_dir_all(dir.path().join("NewPlus")).unwrap();
    std::fs::write(
        dir.path().join("NewPlus").join("settings.json"),
        r#"{"properties": {"template_location": {"value": "C:\\Templates"}}}"#,
    )
    .unwrap();

    unsafe {
        let handle = newplus_module_create(root.as_ptr());

        let same = CString::new(r#"{"template_location": "c:\\templates"}"#).unwrap();
        assert_eq!(newplus_module_set_config(handle, same.as_ptr()), CONFIG_UNCHANGED);

        let changed = CString::new(r#"{"template_location": "C:\\New"}"#).unwrap();
        assert_eq!(newplus_module_set_config(handle, changed.as_ptr()), CONFIG_CHANGED);

        let garbage = CString::new("not json").unwrap();
        assert_eq!(newplus_module_set_config(handle, garbage.as_ptr()), CONFIG_IGNORED);
        assert_eq!(newplus_module_set_config(handle, std::ptr::null()), CONFIG_IGNORED);

        newplus_module_destroy(handle);
    }
}

#[test]
fn test_get_config_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let root = settings_root(&dir);

    unsafe {
        let handle = newplus_module_create(root.as_ptr());
        let mut size: c_int = 64;
        assert!(!newplus_module_get_config(handle, std::ptr::null_mut(), &mut size));
        assert_eq!(size, 0);
        newplus_module_destroy(handle);
    }
}

#[test]
fn test_create_without_root_uses_relative_default() {
    unsafe {
        let handle = newplus_module_create(std::ptr::null());
        assert!(!handle.is_null());
        assert!(!newplus_module_is_enabled(handle));
        newplus_module_destroy(handle);
    }
}

#[test]
fn test_null_handles_are_tolerated() {
    unsafe {
        assert!(newplus_module_name(std::ptr::null()).is_null());
        assert!(newplus_module_key(std::ptr::null()).is_null());
        assert!(!newplus_module_is_enabled(std::ptr::null()));
        assert_eq!(newplus_module_gpo_state(std::ptr::null()), -1);
        newplus_module_enable(std::ptr::null_mut());
        newplus_module_destroy(std::ptr::null_mut());
    }
}
