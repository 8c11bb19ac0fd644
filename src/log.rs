//! Boot console diagnostics.
//!
//! `info!` and `warn!` take defmt-compatible format strings (positional `{}`
//! only). They go to defmt when that feature is on and to the U-Boot console
//! in the `uboot` build.

#[cfg(any(feature = "uboot", test))]
use core::fmt;

macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::info!($($arg)*);
        $crate::log::console!($($arg)*);
    }};
}

macro_rules! warn_ {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
        $crate::log::console!($($arg)*);
    }};
}

macro_rules! console {
    ($($arg:tt)*) => {{
        #[cfg(all(feature = "uboot", not(test)))]
        $crate::uboot::console_line(format_args!($($arg)*));
        #[cfg(test)]
        $crate::log::capture(format_args!($($arg)*));
        #[cfg(not(any(feature = "uboot", test)))]
        let _ = format_args!($($arg)*);
    }};
}

pub(crate) use {console, info, warn_ as warn};

/// Writes one console line.
#[cfg(any(feature = "uboot", test))]
pub(crate) fn write_line<W: fmt::Write>(out: &mut W, args: fmt::Arguments<'_>) -> fmt::Result {
    out.write_fmt(args)?;
    out.write_char('\n')
}

#[cfg(test)]
std::thread_local! {
    static LINES: core::cell::RefCell<std::vec::Vec<std::string::String>> =
        const { core::cell::RefCell::new(std::vec::Vec::new()) };
}

#[cfg(test)]
pub(crate) fn capture(args: fmt::Arguments<'_>) {
    let mut line = std::string::String::new();
    write_line(&mut line, args).expect("formatting into a String");
    LINES.with(|lines| lines.borrow_mut().push(line));
}

/// Lines logged on this thread since the last call.
#[cfg(test)]
pub(crate) fn take_lines() -> std::vec::Vec<std::string::String> {
    LINES.with(|lines| lines.take())
}
