//! NVS (Non-Volatile Storage) config adapter.
//!
//! Implements [`ConfigPort`]: the [`SystemConfig`] is stored as a single
//! `postcard` blob under `weathermon::syscfg`.  Every save is range-checked
//! with [`config::validate`](crate::config::validate) first, and so is every
//! load, so a blob written by an older firmware with looser limits is
//! reported rather than silently used.
//!
//! On host the backend is an in-memory map.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::{self, SystemConfig};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "weathermon";
const CONFIG_KEY: &str = "syscfg";
#[cfg(target_os = "espidf")]
const CONFIG_KEY_C: &[u8] = b"syscfg\0";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsConfigStore {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsConfigStore {
    /// Initialise NVS flash.  On first boot or after a layout change the
    /// partition is erased and re-initialised.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called from the main task before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsConfigStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsConfigStore: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    fn composite_key() -> String {
        format!("{}::{}", CONFIG_NAMESPACE, CONFIG_KEY)
    }

    /// Overwrite the stored blob without validation (host only; used to
    /// simulate corrupted or stale flash contents).
    #[cfg(not(target_os = "espidf"))]
    pub fn put_raw(&self, bytes: Vec<u8>) {
        self.store.borrow_mut().insert(Self::composite_key(), bytes);
    }

    /// Open the namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns = CONFIG_NAMESPACE.as_bytes();
        let len = ns.len().min(15);
        ns_buf[..len].copy_from_slice(&ns[..len]);

        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        // SAFETY: ns_buf is NUL-terminated; handle is closed below.
        let ret = unsafe { nvs_open(ns_buf.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob() -> Result<Option<Vec<u8>>, ConfigError> {
        let result = Self::with_nvs_handle(false, |handle| {
            let mut size: usize = 0;
            // SAFETY: a null buffer asks NVS for the blob size only.
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY_C.as_ptr().cast(), core::ptr::null_mut(), &mut size)
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            if size == 0 || size > MAX_BLOB_SIZE {
                return Err(ESP_ERR_NVS_INVALID_LENGTH);
            }
            let mut buf = vec![0u8; size];
            // SAFETY: buf holds exactly `size` bytes.
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY_C.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(buf)
        });

        match result {
            Ok(bytes) => Ok(Some(bytes)),
            // A never-written namespace fails to open read-only.
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Ok(None),
            Err(e) => {
                warn!("NvsConfigStore: NVS read error {}", e);
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        Ok(self.store.borrow().get(&Self::composite_key()).cloned())
    }
}

impl ConfigPort for NvsConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        #[cfg(target_os = "espidf")]
        let blob = Self::read_blob()?;
        #[cfg(not(target_os = "espidf"))]
        let blob = self.read_blob()?;

        let Some(bytes) = blob else {
            return Err(ConfigError::NotFound);
        };
        let cfg: SystemConfig = postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
        config::validate(&cfg)?;
        info!("NvsConfigStore: loaded config ({} bytes)", bytes.len());
        Ok(cfg)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config::validate(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            self.store.borrow_mut().insert(Self::composite_key(), bytes);
            info!("NvsConfigStore: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(true, |handle| {
                // SAFETY: bytes outlives the call; key is NUL-terminated.
                let ret = unsafe {
                    nvs_set_blob(handle, CONFIG_KEY_C.as_ptr().cast(), bytes.as_ptr().cast(), bytes.len())
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsConfigStore: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsConfigStore: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}
