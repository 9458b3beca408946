use crate::client::NpApi;
use crate::protocol::{self, TirData, TirSignature};
use crate::types::{DataFields, Signature};
use crate::window::WindowHandle;
use crate::{Result, TrackIrError};
use libloading::Library;
use std::ffi::c_void;
use std::path::Path;

// NPClient entry points
type NpGetSignature = unsafe extern "system" fn(*mut TirSignature) -> i32;
type NpQueryVersion = unsafe extern "system" fn(*mut u16) -> i32;
type NpRegisterWindowHandle = unsafe extern "system" fn(*mut c_void) -> i32;
type NpUnregisterWindowHandle = unsafe extern "system" fn() -> i32;
type NpRegisterProgramProfileId = unsafe extern "system" fn(u16) -> i32;
type NpRequestData = unsafe extern "system" fn(u16) -> i32;
type NpGetData = unsafe extern "system" fn(*mut TirData) -> i32;
type NpVoidCall = unsafe extern "system" fn() -> i32;

/// The vendor client library with its entry points resolved.
///
/// Every symbol is resolved up front so a partial library fails at load
/// time rather than halfway through the start sequence.
pub struct NpClientLibrary {
    get_signature: NpGetSignature,
    query_version: NpQueryVersion,
    register_window_handle: NpRegisterWindowHandle,
    unregister_window_handle: NpUnregisterWindowHandle,
    register_program_profile_id: NpRegisterProgramProfileId,
    request_data: NpRequestData,
    get_data: NpGetData,
    stop_cursor: NpVoidCall,
    start_cursor: NpVoidCall,
    start_data_transmission: NpVoidCall,
    stop_data_transmission: NpVoidCall,
    recenter: NpVoidCall,
    // Must outlive the function pointers above.
    _lib: Library,
}

impl NpClientLibrary {
    /// Load the library at `path` and resolve its NP entry points.
    pub fn load(path: &Path) -> Result<NpClientLibrary> {
        log::info!("Loading NPClient library: {}", path.display());

        // SAFETY: loading runs the vendor's DllMain, which has no preconditions
        // on our side. The resolved pointers are only used while `lib` lives.
        unsafe {
            let lib = Library::new(path)?;

            let get_signature = resolve::<NpGetSignature>(&lib, "NP_GetSignature")?;
            let query_version = resolve::<NpQueryVersion>(&lib, "NP_QueryVersion")?;
            let register_window_handle =
                resolve::<NpRegisterWindowHandle>(&lib, "NP_RegisterWindowHandle")?;
            let unregister_window_handle =
                resolve::<NpUnregisterWindowHandle>(&lib, "NP_UnregisterWindowHandle")?;
            let register_program_profile_id =
                resolve::<NpRegisterProgramProfileId>(&lib, "NP_RegisterProgramProfileID")?;
            let request_data = resolve::<NpRequestData>(&lib, "NP_RequestData")?;
            let get_data = resolve::<NpGetData>(&lib, "NP_GetData")?;
            let stop_cursor = resolve::<NpVoidCall>(&lib, "NP_StopCursor")?;
            let start_cursor = resolve::<NpVoidCall>(&lib, "NP_StartCursor")?;
            let start_data_transmission = resolve::<NpVoidCall>(&lib, "NP_StartDataTransmission")?;
            let stop_data_transmission = resolve::<NpVoidCall>(&lib, "NP_StopDataTransmission")?;
            let recenter = resolve::<NpVoidCall>(&lib, "NP_ReCenter")?;

            log::debug!("Resolved all NP entry points");

            Ok(NpClientLibrary {
                get_signature,
                query_version,
                register_window_handle,
                unregister_window_handle,
                register_program_profile_id,
                request_data,
                get_data,
                stop_cursor,
                start_cursor,
                start_data_transmission,
                stop_data_transmission,
                recenter,
                _lib: lib,
            })
        }
    }
}

unsafe fn resolve<T: Copy>(lib: &Library, name: &'static str) -> Result<T> {
    let symbol = format!("{}\0", name);
    match lib.get::<T>(symbol.as_bytes()) {
        Ok(sym) => Ok(*sym),
        Err(e) => {
            log::warn!("Failed to resolve {}: {}", name, e);
            Err(TrackIrError::MissingSymbol(name))
        }
    }
}

impl NpApi for NpClientLibrary {
    fn get_signature(&mut self) -> Result<Signature> {
        let mut sig = TirSignature::default();
        protocol::check("NP_GetSignature", unsafe { (self.get_signature)(&mut sig) })?;
        Ok(sig.to_signature())
    }

    fn query_version(&mut self) -> Result<u16> {
        let mut version = 0u16;
        protocol::check("NP_QueryVersion", unsafe { (self.query_version)(&mut version) })?;
        Ok(version)
    }

    fn register_window_handle(&mut self, hwnd: WindowHandle) -> Result<()> {
        protocol::check("NP_RegisterWindowHandle", unsafe {
            (self.register_window_handle)(hwnd.as_ptr())
        })
    }

    fn unregister_window_handle(&mut self) -> Result<()> {
        protocol::check("NP_UnregisterWindowHandle", unsafe {
            (self.unregister_window_handle)()
        })
    }

    fn register_program_profile_id(&mut self, id: u16) -> Result<()> {
        protocol::check("NP_RegisterProgramProfileID", unsafe {
            (self.register_program_profile_id)(id)
        })
    }

    fn request_data(&mut self, fields: DataFields) -> Result<()> {
        protocol::check("NP_RequestData", unsafe { (self.request_data)(fields.bits()) })
    }

    fn get_data(&mut self) -> Result<TirData> {
        let mut data = TirData::default();
        protocol::check("NP_GetData", unsafe { (self.get_data)(&mut data) })?;
        Ok(data)
    }

    fn stop_cursor(&mut self) -> Result<()> {
        protocol::check("NP_StopCursor", unsafe { (self.stop_cursor)() })
    }

    fn start_cursor(&mut self) -> Result<()> {
        protocol::check("NP_StartCursor", unsafe { (self.start_cursor)() })
    }

    fn start_data_transmission(&mut self) -> Result<()> {
        protocol::check("NP_StartDataTransmission", unsafe {
            (self.start_data_transmission)()
        })
    }

    fn stop_data_transmission(&mut self) -> Result<()> {
        protocol::check("NP_StopDataTransmission", unsafe {
            (self.stop_data_transmission)()
        })
    }

    fn recenter(&mut self) -> Result<()> {
        protocol::check("NP_ReCenter", unsafe { (self.recenter)() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_library_fails() {
        let err = NpClientLibrary::load(Path::new("definitely-not-a-trackir-client.dll"))
            .err()
            .unwrap();
        assert!(matches!(err, TrackIrError::Load(_)));
    }
}
