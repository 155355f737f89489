// file: src/geom/libgeom.rs
// version: 1.0.0
// guid: b47d09e2-3a6f-4c18-b5d2-8e1f6a7c9043

//! Native backend driving FreeBSD's `libgeom` control API
//!
//! The library is opened at runtime on first use, so the binary links and
//! runs everywhere; on systems without `libgeom.so.5` the load failure is
//! reported as a backend error instead.

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::marker::PhantomData;

use libloading::Library;
use tracing::{debug, info};

use super::control::Control;
use super::request::{Access, ParamValue, Request};
use crate::error::AgentError;
use crate::Result;

/// Shared object shipped with FreeBSD base
pub const DEFAULT_LIBRARY: &str = "libgeom.so.5";

/// Opaque `struct gctl_req`
#[repr(C)]
struct GctlReq {
    _private: [u8; 0],
}

type GetHandleFn = unsafe extern "C" fn() -> *mut GctlReq;
type RoParamFn = unsafe extern "C" fn(*mut GctlReq, *const c_char, c_int, *const c_void);
type RwParamFn = unsafe extern "C" fn(*mut GctlReq, *const c_char, c_int, *mut c_void);
type IssueFn = unsafe extern "C" fn(*mut GctlReq) -> *const c_char;
type FreeFn = unsafe extern "C" fn(*mut GctlReq);

/// Resolved `gctl_*` entry points
struct GctlApi {
    get_handle: GetHandleFn,
    ro_param: RoParamFn,
    rw_param: RwParamFn,
    issue: IssueFn,
    free: FreeFn,
    // The function pointers above stay valid only while this is loaded
    _library: Library,
}

impl GctlApi {
    fn load(path: &str) -> Result<Self> {
        debug!("Loading {}", path);
        let library = unsafe { Library::new(path) }
            .map_err(|e| AgentError::backend(format!("failed to load {}: {}", path, e)))?;

        let (get_handle, ro_param, rw_param, issue, free) = unsafe {
            let get_handle = *library
                .get::<GetHandleFn>(b"gctl_get_handle\0")
                .map_err(|e| missing_symbol("gctl_get_handle", e))?;
            let ro_param = *library
                .get::<RoParamFn>(b"gctl_ro_param\0")
                .map_err(|e| missing_symbol("gctl_ro_param", e))?;
            let rw_param = *library
                .get::<RwParamFn>(b"gctl_rw_param\0")
                .map_err(|e| missing_symbol("gctl_rw_param", e))?;
            let issue = *library
                .get::<IssueFn>(b"gctl_issue\0")
                .map_err(|e| missing_symbol("gctl_issue", e))?;
            let free = *library
                .get::<FreeFn>(b"gctl_free\0")
                .map_err(|e| missing_symbol("gctl_free", e))?;
            (get_handle, ro_param, rw_param, issue, free)
        };

        Ok(Self {
            get_handle,
            ro_param,
            rw_param,
            issue,
            free,
            _library: library,
        })
    }
}

fn missing_symbol(name: &str, err: libloading::Error) -> AgentError {
    AgentError::backend(format!("libgeom has no {}: {}", name, err))
}

/// Owned `gctl_req` handle, freed on drop
struct Handle<'a> {
    raw: *mut GctlReq,
    free: FreeFn,
    _api: PhantomData<&'a GctlApi>,
}

impl<'a> Handle<'a> {
    fn new(api: &'a GctlApi) -> Result<Self> {
        let raw = unsafe { (api.get_handle)() };
        if raw.is_null() {
            return Err(AgentError::backend("gctl_get_handle returned NULL"));
        }
        Ok(Self {
            raw,
            free: api.free,
            _api: PhantomData,
        })
    }
}

impl Drop for Handle<'_> {
    fn drop(&mut self) {
        unsafe { (self.free)(self.raw) };
    }
}

/// Backend that talks to the kernel through `libgeom`
pub struct LibGeom {
    path: String,
    api: Option<GctlApi>,
}

impl LibGeom {
    /// Backend that will load the library at `path` on first issue
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            api: None,
        }
    }

    /// Library path this backend loads
    pub fn path(&self) -> &str {
        &self.path
    }

    fn api(&mut self) -> Result<&GctlApi> {
        if self.api.is_none() {
            self.api = Some(GctlApi::load(&self.path)?);
        }
        self.api
            .as_ref()
            .ok_or_else(|| AgentError::backend("libgeom not loaded"))
    }
}

impl Default for LibGeom {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY)
    }
}

impl Control for LibGeom {
    fn name(&self) -> &str {
        "libgeom"
    }

    fn issue(&mut self, request: &Request) -> Result<Option<String>> {
        // Convert before taking a handle so a bad parameter cannot leak one
        let mut names = Vec::with_capacity(request.params().len());
        let mut values = Vec::with_capacity(request.params().len());
        for param in request.params() {
            let name = CString::new(param.name()).map_err(|_| {
                AgentError::invalid_parameter(format!("NUL byte in name {:?}", param.name()))
            })?;
            if let ParamValue::Ascii(text) = param.value() {
                if text.contains('\0') {
                    return Err(AgentError::invalid_parameter(format!(
                        "NUL byte in value of {:?}",
                        param.name()
                    )));
                }
            }
            names.push(name);
            values.push(param.value().to_c_bytes());
        }

        let api = self.api()?;
        let handle = Handle::new(api)?;

        // libgeom keeps the name and value pointers until gctl_issue
        for ((param, name), value) in request.params().iter().zip(&names).zip(values.iter_mut()) {
            let len = match param.value() {
                ParamValue::Ascii(_) => -1,
                ParamValue::Int(_) => value.len() as c_int,
            };
            match param.access() {
                Access::ReadOnly => unsafe {
                    (api.ro_param)(handle.raw, name.as_ptr(), len, value.as_ptr().cast())
                },
                Access::ReadWrite => unsafe {
                    (api.rw_param)(handle.raw, name.as_ptr(), len, value.as_mut_ptr().cast())
                },
            }
        }

        info!("Issuing gctl request: {}", request);
        let error = unsafe { (api.issue)(handle.raw) };
        // The error string lives inside the handle
        let error = if error.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(error) }.to_string_lossy().into_owned())
        };
        drop(handle);

        debug!("gctl_issue returned {:?}", error);
        Ok(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_library_path() {
        assert_eq!(LibGeom::default().path(), "libgeom.so.5");
    }

    #[test]
    fn test_missing_library_is_backend_error() {
        let mut control = LibGeom::new("/nonexistent/libgeom-missing.so.5");
        let mut request = Request::new();
        request.ro_param("class", "PART");

        let err = control.issue(&request).unwrap_err();

        assert!(matches!(err, AgentError::Backend(_)));
        assert!(err.to_string().contains("/nonexistent/libgeom-missing.so.5"));
    }

    #[test]
    fn test_nul_in_value_rejected_before_loading() {
        let mut control = LibGeom::new("/nonexistent/libgeom-missing.so.5");
        let mut request = Request::new();
        request.ro_param("geom", "ada\01");

        let err = control.issue(&request).unwrap_err();

        assert!(matches!(err, AgentError::InvalidParameter(_)));
    }
}
