use crate::config::Config;
use crate::library::NpClientLibrary;
use crate::locate;
use crate::protocol::{self, TirData};
use crate::types::{DataFields, PoseSample, Signature};
use crate::window::WindowHandle;
use crate::{Result, TrackIrError};

/// The NP entry points used by a session, one method per vendor call.
///
/// [`NpClientLibrary`] implements this over the loaded DLL. Every method
/// maps a non-zero vendor result to [`TrackIrError::Np`].
pub trait NpApi {
    fn get_signature(&mut self) -> Result<Signature>;
    fn query_version(&mut self) -> Result<u16>;
    fn register_window_handle(&mut self, hwnd: WindowHandle) -> Result<()>;
    fn unregister_window_handle(&mut self) -> Result<()>;
    fn register_program_profile_id(&mut self, id: u16) -> Result<()>;
    fn request_data(&mut self, fields: DataFields) -> Result<()>;
    fn get_data(&mut self) -> Result<TirData>;
    fn stop_cursor(&mut self) -> Result<()>;
    fn start_cursor(&mut self) -> Result<()>;
    fn start_data_transmission(&mut self) -> Result<()>;
    fn stop_data_transmission(&mut self) -> Result<()>;
    fn recenter(&mut self) -> Result<()>;
}

impl<T: NpApi + ?Sized> NpApi for &mut T {
    fn get_signature(&mut self) -> Result<Signature> {
        (**self).get_signature()
    }
    fn query_version(&mut self) -> Result<u16> {
        (**self).query_version()
    }
    fn register_window_handle(&mut self, hwnd: WindowHandle) -> Result<()> {
        (**self).register_window_handle(hwnd)
    }
    fn unregister_window_handle(&mut self) -> Result<()> {
        (**self).unregister_window_handle()
    }
    fn register_program_profile_id(&mut self, id: u16) -> Result<()> {
        (**self).register_program_profile_id(id)
    }
    fn request_data(&mut self, fields: DataFields) -> Result<()> {
        (**self).request_data(fields)
    }
    fn get_data(&mut self) -> Result<TirData> {
        (**self).get_data()
    }
    fn stop_cursor(&mut self) -> Result<()> {
        (**self).stop_cursor()
    }
    fn start_cursor(&mut self) -> Result<()> {
        (**self).start_cursor()
    }
    fn start_data_transmission(&mut self) -> Result<()> {
        (**self).start_data_transmission()
    }
    fn stop_data_transmission(&mut self) -> Result<()> {
        (**self).stop_data_transmission()
    }
    fn recenter(&mut self) -> Result<()> {
        (**self).recenter()
    }
}

/// A running TrackIR session: registered against a window and transmitting.
///
/// Dropping the client runs the stop sequence so the TrackIR software does
/// not consider the window still registered.
pub struct Client<A: NpApi = NpClientLibrary> {
    api: A,
    hwnd: WindowHandle,
    signature: Signature,
    version: Option<u16>,
    active: bool,
}

impl Client<NpClientLibrary> {
    /// Locate and load the vendor library, then start a session on `hwnd`.
    pub fn open(hwnd: WindowHandle, config: &Config) -> Result<Client> {
        let path = locate::find_library(config)?;
        let lib = NpClientLibrary::load(&path)?;
        Client::start(lib, hwnd, config)
    }

    /// Like [`Client::open`], using the configured window or the console window.
    pub fn open_from_config(config: &Config) -> Result<Client> {
        let hwnd = match config.hwnd {
            Some(hwnd) => hwnd,
            None => WindowHandle::console()?,
        };
        Client::open(hwnd, config)
    }
}

impl<A: NpApi> Client<A> {
    /// Run the start sequence against an already loaded API.
    ///
    /// Order: GetSignature, QueryVersion, RegisterWindowHandle, RequestData,
    /// RegisterProgramProfileID, StopCursor, StartDataTransmission.
    pub fn start(mut api: A, hwnd: WindowHandle, config: &Config) -> Result<Client<A>> {
        let signature = api.get_signature()?;
        log::info!("NPClient DLL signature: {}", signature.dll);
        log::info!("NPClient app signature: {}", signature.app);

        let version = match api.query_version() {
            Ok(version) => {
                let (major, minor) = protocol::split_version(version);
                log::info!("NPClient version {}.{:02}", major, minor);
                Some(version)
            }
            Err(e) => {
                log::warn!("{} (continuing)", e);
                None
            }
        };

        log::debug!("Registering window handle {}", hwnd);
        api.register_window_handle(hwnd)?;

        if let Err(e) = Self::start_transmission(&mut api, config) {
            // Leaving the window registered makes the next session fail with
            // ALREADY_REGISTERED until the TrackIR software is restarted.
            if let Err(unregister_err) = api.unregister_window_handle() {
                log::warn!("Cleanup after failed start: {}", unregister_err);
            }
            return Err(e);
        }

        log::info!(
            "TrackIR session started: hwnd={} profile={} fields={:?}",
            hwnd,
            config.profile_id,
            config.data_fields
        );

        Ok(Client {
            api,
            hwnd,
            signature,
            version,
            active: true,
        })
    }

    fn start_transmission(api: &mut A, config: &Config) -> Result<()> {
        log::debug!("Requesting data fields {:#06x}", config.data_fields.bits());
        api.request_data(config.data_fields)?;
        log::debug!("Registering program profile {}", config.profile_id);
        api.register_program_profile_id(config.profile_id)?;
        api.stop_cursor()?;
        api.start_data_transmission()
    }

    /// Poll the latest 6DOF sample.
    pub fn get_data(&mut self) -> Result<PoseSample> {
        if !self.active {
            return Err(TrackIrError::SessionStopped);
        }
        Ok(self.api.get_data()?.to_sample())
    }

    /// Reset the TrackIR center to the current head position.
    pub fn recenter(&mut self) -> Result<()> {
        if !self.active {
            return Err(TrackIrError::SessionStopped);
        }
        log::info!("Recentering");
        self.api.recenter()
    }

    /// Run the stop sequence: StopDataTransmission, StartCursor,
    /// UnregisterWindowHandle.
    ///
    /// All three calls are attempted; the first failure is returned.
    /// Stopping an already stopped session is a no-op.
    pub fn stop(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        log::info!("Stopping TrackIR session");

        let results = [
            self.api.stop_data_transmission(),
            self.api.start_cursor(),
            self.api.unregister_window_handle(),
        ];

        let mut first_err = None;
        for result in results {
            if let Err(e) = result {
                log::warn!("{}", e);
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn hwnd(&self) -> WindowHandle {
        self.hwnd
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Packed version word, if `NP_QueryVersion` succeeded.
    pub fn version(&self) -> Option<u16> {
        self.version
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

impl<A: NpApi> Drop for Client<A> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("TrackIR stop on drop failed: {}", e);
        }
    }
}
