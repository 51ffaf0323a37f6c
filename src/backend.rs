//! Tensor backend selection
//!
//! The backend is fixed at compile time by cargo feature: `cuda` wins when
//! enabled, otherwise NdArray on the CPU. There is no autodiff wrapper since
//! this crate only runs inference, which also keeps dropout inert.

// --------------------------------------------------------------------------------
// BACKEND SELECTION: CUDA (preferred) or NdArray (fallback)
// --------------------------------------------------------------------------------

#[cfg(feature = "cuda")]
pub type DefaultBackend = burn_cuda::Cuda;

#[cfg(all(not(feature = "cuda"), feature = "ndarray"))]
pub type DefaultBackend = burn_ndarray::NdArray;

#[cfg(all(not(feature = "cuda"), not(feature = "ndarray")))]
compile_error!("At least one backend (cuda, ndarray, or cpu) must be enabled!");

/// Device type of the selected backend
pub type DefaultDevice = <DefaultBackend as burn::tensor::backend::Backend>::Device;

/// Get the default device
pub fn default_device() -> DefaultDevice {
    DefaultDevice::default()
}

/// Get a human-readable name for the current backend
pub fn backend_name() -> &'static str {
    #[cfg(feature = "cuda")]
    {
        "CUDA (GPU)"
    }

    #[cfg(all(not(feature = "cuda"), feature = "ndarray"))]
    {
        "NdArray (CPU)"
    }
}

/// Serializes tests that initialize weights. The backend RNG is global, so
/// concurrent tests would otherwise draw from each other's seeded stream.
#[cfg(test)]
pub(crate) fn rng_guard() -> std::sync::MutexGuard<'static, ()> {
    static RNG_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    RNG_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name_matches_feature() {
        let name = backend_name();
        if cfg!(feature = "cuda") {
            assert!(name.contains("CUDA"));
        } else {
            assert!(name.contains("CPU"));
        }
    }
}
