//! Feature-gated diagnostics.
//!
//! `diag!` forwards to `log::trace!` under the `log` feature and to
//! `defmt::trace!` under the `defmt` feature. With neither enabled it
//! expands to a no-op that still type-checks its arguments. Call sites are
//! kept off the per-pulse hot path.

macro_rules! diag {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        ::log::trace!($($arg)*);
        #[cfg(feature = "defmt")]
        ::defmt::trace!($($arg)*);
        #[cfg(not(any(feature = "log", feature = "defmt")))]
        {
            let _ = ($($arg)*,);
        }
    }};
}

pub(crate) use diag;
