//! Compute devices.
//!
//! Devices are logical CPU workers. A device list selects worker slots out
//! of the machine's available parallelism; the engine runs one worker per
//! selected device on a dedicated thread pool. Selection errors (no devices,
//! index out of range) surface as device errors before any work starts.

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Device {
    index: usize,
}

impl Device {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> String {
        format!("cpu:{}", self.index)
    }
}

#[derive(Clone, Debug)]
pub struct DeviceSet {
    devices: Vec<Device>,
}

impl DeviceSet {
    /// Number of usable workers on this machine.
    pub fn available() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Every available device.
    pub fn detect() -> Self {
        Self {
            devices: (0..Self::available()).map(|index| Device { index }).collect(),
        }
    }

    /// Select devices by index.
    pub fn select(indices: &[usize]) -> Result<Self> {
        if indices.is_empty() {
            return Err(Error::device("no compute device specified"));
        }
        let available = Self::available();
        let mut devices = Vec::with_capacity(indices.len());
        for &index in indices {
            if index >= available {
                return Err(Error::device(format!(
                    "device index {index} out of range, {available} device(s) present"
                )));
            }
            devices.push(Device { index });
        }
        Ok(Self { devices })
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Dedicated pool with one worker per device.
    pub(crate) fn build_pool(&self) -> Result<ThreadPool> {
        if self.devices.is_empty() {
            return Err(Error::device("no compute device specified"));
        }
        ThreadPoolBuilder::new()
            .num_threads(self.devices.len())
            .thread_name(|index| format!("rqa-worker-{index}"))
            .build()
            .map_err(|e| Error::device(format!("worker pool construction failed: {e}")))
    }
}

impl Default for DeviceSet {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_finds_at_least_one_device() {
        let set = DeviceSet::detect();
        assert!(!set.is_empty());
        assert_eq!(set.devices()[0].name(), "cpu:0");
    }

    #[test]
    fn test_empty_selection_is_a_device_error() {
        assert!(matches!(
            DeviceSet::select(&[]),
            Err(Error::Device { .. })
        ));
    }

    #[test]
    fn test_out_of_range_selection_is_a_device_error() {
        assert!(matches!(
            DeviceSet::select(&[usize::MAX]),
            Err(Error::Device { .. })
        ));
    }

    #[test]
    fn test_pool_sized_to_selection() {
        let set = DeviceSet::select(&[0]).unwrap();
        let pool = set.build_pool().unwrap();
        assert_eq!(pool.current_num_threads(), 1);
    }
}
