//! Byte-addressed settings store.
//!
//! Implements [`ByteStore`] with EEPROM semantics: fixed capacity, erased
//! cells read back as `0xFF`, writes of an unchanged value are skipped by
//! the port's `update`.
//!
//! - **ESP-IDF**: each cell is an NVS `u8` entry (`c<addr>`) in the
//!   `envnode` namespace.  A missing key reads as erased.  Every write is
//!   committed immediately.
//! - **Host**: an in-memory array, optionally mirrored to a backing file
//!   so settings survive restarts of the simulation.

use log::info;
#[cfg(not(target_os = "espidf"))]
use log::warn;

use crate::app::ports::ByteStore;
use crate::error::StorageError;
#[cfg(not(target_os = "espidf"))]
use crate::persistence::ERASED;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Addressable bytes, matching the classic 512-byte EEPROM.
pub const CAPACITY: u16 = 512;

#[cfg(target_os = "espidf")]
const NAMESPACE: &[u8] = b"envnode\0";

pub struct EepromAdapter {
    #[cfg(not(target_os = "espidf"))]
    cells: Vec<u8>,
    #[cfg(not(target_os = "espidf"))]
    backing: Option<std::path::PathBuf>,
}

impl EepromAdapter {
    /// Initialise NVS flash and open the store.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, StorageError> {
        // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
        // single main-task context before any other NVS access.
        let ret = unsafe { nvs_flash_init() };
        if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
            log::warn!("eeprom: erasing and re-initialising NVS partition");
            if unsafe { nvs_flash_erase() } != ESP_OK as i32 || unsafe { nvs_flash_init() } != ESP_OK as i32 {
                return Err(StorageError::Io);
            }
        } else if ret != ESP_OK as i32 {
            return Err(StorageError::Io);
        }
        info!("eeprom: NVS backend ready");
        Ok(Self {})
    }

    /// Fresh, fully erased in-memory store.
    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, StorageError> {
        info!("eeprom: in-memory backend");
        Ok(Self {
            cells: vec![ERASED; usize::from(CAPACITY)],
            backing: None,
        })
    }

    /// Store mirrored to `path`.  A missing file starts erased; a short
    /// file is padded with erased cells.
    #[cfg(not(target_os = "espidf"))]
    pub fn with_backing_file(path: impl Into<std::path::PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let mut cells = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("eeprom: cannot read {}: {e}", path.display());
                return Err(StorageError::Io);
            }
        };
        cells.resize(usize::from(CAPACITY), ERASED);
        info!("eeprom: file backend at {}", path.display());
        Ok(Self {
            cells,
            backing: Some(path),
        })
    }

    fn check(addr: u16) -> Result<(), StorageError> {
        if addr < CAPACITY {
            Ok(())
        } else {
            Err(StorageError::AddressOutOfRange(addr))
        }
    }

    /// NUL-terminated NVS key for a cell address.
    #[cfg(target_os = "espidf")]
    fn key(addr: u16) -> [u8; 8] {
        let mut key = [0u8; 8];
        key[0] = b'c';
        let digits = [
            (addr / 100 % 10) as u8,
            (addr / 10 % 10) as u8,
            (addr % 10) as u8,
        ];
        for (slot, d) in key[1..4].iter_mut().zip(digits) {
            *slot = b'0' + d;
        }
        key
    }

    /// Open the namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        // SAFETY: NAMESPACE is NUL-terminated; handle is a valid out-pointer.
        let ret = unsafe { nvs_open(NAMESPACE.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }
        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }
}

impl ByteStore for EepromAdapter {
    fn capacity(&self) -> u16 {
        CAPACITY
    }

    #[cfg(not(target_os = "espidf"))]
    fn read(&self, addr: u16) -> Result<u8, StorageError> {
        Self::check(addr)?;
        Ok(self.cells[usize::from(addr)])
    }

    #[cfg(not(target_os = "espidf"))]
    fn write(&mut self, addr: u16, value: u8) -> Result<(), StorageError> {
        Self::check(addr)?;
        self.cells[usize::from(addr)] = value;
        if let Some(path) = &self.backing {
            std::fs::write(path, &self.cells).map_err(|e| {
                warn!("eeprom: cannot write {}: {e}", path.display());
                StorageError::Io
            })?;
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn read(&self, addr: u16) -> Result<u8, StorageError> {
        Self::check(addr)?;
        let key = Self::key(addr);
        let result = Self::with_nvs_handle(false, |handle| {
            let mut value: u8 = 0;
            // SAFETY: key is NUL-terminated; value is a valid out-pointer.
            let ret = unsafe { nvs_get_u8(handle, key.as_ptr().cast(), &mut value) };
            if ret == ESP_OK as i32 { Ok(value) } else { Err(ret) }
        });
        match result {
            Ok(value) => Ok(value),
            // Namespace or key never created: the cell is erased.
            Err(rc) if rc == ESP_ERR_NVS_NOT_FOUND as i32 => Ok(crate::persistence::ERASED),
            Err(_) => Err(StorageError::Io),
        }
    }

    #[cfg(target_os = "espidf")]
    fn write(&mut self, addr: u16, value: u8) -> Result<(), StorageError> {
        Self::check(addr)?;
        let key = Self::key(addr);
        Self::with_nvs_handle(true, |handle| {
            // SAFETY: key is NUL-terminated; handle is open read-write.
            let ret = unsafe { nvs_set_u8(handle, key.as_ptr().cast(), value) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
        })
        .map_err(|_| StorageError::Io)
    }
}
