#![no_std]

//! Logging macros that forward to `defmt` or `log`, depending on which feature the calling crate
//! enables. With neither backend the arguments are still type-checked, so call sites compile the
//! same way in every configuration.

#[doc(hidden)]
#[macro_export]
macro_rules! __dispatch {
    ($level:ident, $($args:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::$level!($($args)*);
        #[cfg(feature = "log")]
        log::$level!($($args)*);
        #[cfg(not(any(feature = "defmt", feature = "log")))]
        {
            let _ = ::core::format_args!($($args)*);
        }
    };
}

#[macro_export]
macro_rules! trace {
    ($($args:tt)*) => {
        $crate::__dispatch!(trace, $($args)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($args:tt)*) => {
        $crate::__dispatch!(debug, $($args)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($args:tt)*) => {
        $crate::__dispatch!(info, $($args)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($args:tt)*) => {
        $crate::__dispatch!(warn, $($args)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($args:tt)*) => {
        $crate::__dispatch!(error, $($args)*)
    };
}
