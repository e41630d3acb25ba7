//! C FFI bindings for csvsplit-core
//!
//! This crate provides a C-compatible API so a desktop shell can collect the
//! four split parameters and hand them to the core in a single call.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::PathBuf;
use std::ptr;

/// A pointer argument was null or not valid UTF-8
pub const CSVSPLIT_ERR_ARGUMENT: i64 = -1;
/// A parameter was rejected by validation
pub const CSVSPLIT_ERR_INVALID_INPUT: i64 = -2;
/// Reading the source or writing an output failed
pub const CSVSPLIT_ERR_IO: i64 = -3;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn set_last_error(message: String) {
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(message));
}

unsafe fn path_arg(s: *const c_char) -> Option<PathBuf> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok().map(PathBuf::from)
}

/// Split a CSV column into numbered files
///
/// Returns the number of files written, or a negative `CSVSPLIT_ERR_*` code.
/// On failure the message is available from `csvsplit_last_error`.
///
/// # Safety
/// - `source` and `output_dir` must be valid C strings
#[no_mangle]
pub unsafe extern "C" fn csvsplit_split(
    source: *const c_char,
    column_index: i64,
    max_rows_per_file: i64,
    output_dir: *const c_char,
) -> i64 {
    let (Some(source), Some(output_dir)) = (path_arg(source), path_arg(output_dir)) else {
        set_last_error("source and output_dir must be valid UTF-8 strings".to_string());
        return CSVSPLIT_ERR_ARGUMENT;
    };

    match csvsplit_core::split_with(source, column_index, max_rows_per_file, output_dir) {
        Ok(report) => report.file_count() as i64,
        Err(e) => {
            let code = if e.is_invalid_input() {
                CSVSPLIT_ERR_INVALID_INPUT
            } else {
                CSVSPLIT_ERR_IO
            };
            set_last_error(e.to_string());
            code
        }
    }
}

/// Message of the last failed call on this thread
///
/// # Safety
/// - Returns null if no call has failed
/// - Caller must free the returned string with `csvsplit_free_string`
#[no_mangle]
pub unsafe extern "C" fn csvsplit_last_error() -> *mut c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_deref()
            .and_then(|msg| CString::new(msg).ok())
            .map(|s| s.into_raw())
            .unwrap_or(ptr::null_mut())
    })
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a csvsplit_* function or null
#[no_mangle]
pub unsafe extern "C" fn csvsplit_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
