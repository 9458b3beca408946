use crate::config::Config;
use crate::protocol::{DLL_NAME, REGISTRY_KEY, REGISTRY_VALUE};
use crate::{Result, TrackIrError};
use std::path::{Path, PathBuf};

/// Find the NPClient library to load.
///
/// An explicit `dll_path` in the config wins. Otherwise the install folder is
/// read from the registry key the TrackIR software writes on install.
pub fn find_library(config: &Config) -> Result<PathBuf> {
    if let Some(path) = &config.dll_path {
        log::info!("Using NPClient library from config: {}", path.display());
        return Ok(path.clone());
    }

    let dir = registry_install_dir()?;
    log::debug!("NPClient install folder: {}", dir.display());

    let path = library_path_in(&dir);
    if !path.is_file() {
        log::warn!("{} does not exist", path.display());
        return Err(TrackIrError::LibraryNotFound);
    }
    Ok(path)
}

/// Join the architecture-specific library name onto an install folder.
pub fn library_path_in(dir: &Path) -> PathBuf {
    dir.join(DLL_NAME)
}

#[cfg(windows)]
fn registry_install_dir() -> Result<PathBuf> {
    read_hkcu_string(REGISTRY_KEY, REGISTRY_VALUE)
}

/// Read a `REG_SZ` value under `HKEY_CURRENT_USER`.
///
/// A missing key or value means the TrackIR software is not installed.
#[cfg(windows)]
fn read_hkcu_string(sub_key: &str, value: &str) -> Result<PathBuf> {
    use std::ffi::{OsStr, OsString};
    use std::os::windows::ffi::{OsStrExt, OsStringExt};
    use winapi::shared::minwindef::DWORD;
    use winapi::shared::winerror::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
    use winapi::um::winreg::{RegGetValueW, HKEY_CURRENT_USER, RRF_RT_REG_SZ};

    fn wide(s: &str) -> Vec<u16> {
        OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
    }

    let sub_key_w = wide(sub_key);
    let value_w = wide(value);

    // First call sizes the buffer, second fills it.
    let mut len: DWORD = 0;
    let status = unsafe {
        RegGetValueW(
            HKEY_CURRENT_USER,
            sub_key_w.as_ptr(),
            value_w.as_ptr(),
            RRF_RT_REG_SZ,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            &mut len,
        )
    } as DWORD;
    if status == ERROR_FILE_NOT_FOUND {
        log::debug!("HKCU\\{}\\{} not present", sub_key, value);
        return Err(TrackIrError::LibraryNotFound);
    }
    if status != ERROR_SUCCESS {
        return Err(TrackIrError::Registry(format!(
            "sizing HKCU\\{}\\{} failed with status {}",
            sub_key, value, status
        )));
    }

    let mut buf = vec![0u16; (len as usize).div_ceil(2)];
    let status = unsafe {
        RegGetValueW(
            HKEY_CURRENT_USER,
            sub_key_w.as_ptr(),
            value_w.as_ptr(),
            RRF_RT_REG_SZ,
            std::ptr::null_mut(),
            buf.as_mut_ptr().cast(),
            &mut len,
        )
    } as DWORD;
    if status != ERROR_SUCCESS {
        return Err(TrackIrError::Registry(format!(
            "reading HKCU\\{}\\{} failed with status {}",
            sub_key, value, status
        )));
    }

    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    Ok(PathBuf::from(OsString::from_wide(&buf[..end])))
}

#[cfg(not(windows))]
fn registry_install_dir() -> Result<PathBuf> {
    log::debug!("No registry on this platform; set TRACKIR_DLL_PATH");
    Err(TrackIrError::LibraryNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let config = Config {
            dll_path: Some(PathBuf::from("/opt/trackir/NPClient64.dll")),
            ..Config::default()
        };
        assert_eq!(
            find_library(&config).unwrap(),
            PathBuf::from("/opt/trackir/NPClient64.dll")
        );
    }

    #[cfg(windows)]
    #[test]
    fn missing_registry_key_means_not_installed() {
        let err = read_hkcu_string(r"Software\trackir-tests\no such key", "Path").unwrap_err();
        assert!(matches!(err, TrackIrError::LibraryNotFound));
    }

    #[test]
    fn library_name_is_appended() {
        let path = library_path_in(Path::new("install"));
        assert_eq!(path.file_name().unwrap(), DLL_NAME);
        assert!(path.starts_with("install"));
    }
}
