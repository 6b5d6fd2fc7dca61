// thermodma - DMA-driven temperature sampler
// Copyright (C) 2026 thermodma contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

// Logging that vanishes in no_std builds.

#[cfg(feature = "std")]
macro_rules! log_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(feature = "std")]
macro_rules! log_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "std"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        if false {
            ::core::mem::drop(::core::format_args!($($arg)*));
        }
    }};
}

#[cfg(not(feature = "std"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        if false {
            ::core::mem::drop(::core::format_args!($($arg)*));
        }
    }};
}
