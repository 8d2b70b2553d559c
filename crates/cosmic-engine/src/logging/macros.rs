// Channel macros. `notice` sits between info and warn; `log` has no such level,
// so it is emitted at info with a marker. `panic` logs at error, then panics.

#[macro_export]
macro_rules! core_debug {
    ($($arg:tt)+) => { $crate::__log::debug!(target: $crate::logging::CORE_TARGET, $($arg)+) };
}

#[macro_export]
macro_rules! core_info {
    ($($arg:tt)+) => { $crate::__log::info!(target: $crate::logging::CORE_TARGET, $($arg)+) };
}

#[macro_export]
macro_rules! core_notice {
    ($($arg:tt)+) => {
        $crate::__log::info!(target: $crate::logging::CORE_TARGET, "NOTICE {}", format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! core_warn {
    ($($arg:tt)+) => { $crate::__log::warn!(target: $crate::logging::CORE_TARGET, $($arg)+) };
}

#[macro_export]
macro_rules! core_error {
    ($($arg:tt)+) => { $crate::__log::error!(target: $crate::logging::CORE_TARGET, $($arg)+) };
}

#[macro_export]
macro_rules! core_panic {
    ($($arg:tt)+) => {{
        let message = format!($($arg)+);
        $crate::__log::error!(target: $crate::logging::CORE_TARGET, "{}", message);
        panic!("{}", message)
    }};
}

#[macro_export]
macro_rules! app_debug {
    ($($arg:tt)+) => { $crate::__log::debug!(target: $crate::logging::APP_TARGET, $($arg)+) };
}

#[macro_export]
macro_rules! app_info {
    ($($arg:tt)+) => { $crate::__log::info!(target: $crate::logging::APP_TARGET, $($arg)+) };
}

#[macro_export]
macro_rules! app_notice {
    ($($arg:tt)+) => {
        $crate::__log::info!(target: $crate::logging::APP_TARGET, "NOTICE {}", format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! app_warn {
    ($($arg:tt)+) => { $crate::__log::warn!(target: $crate::logging::APP_TARGET, $($arg)+) };
}

#[macro_export]
macro_rules! app_error {
    ($($arg:tt)+) => { $crate::__log::error!(target: $crate::logging::APP_TARGET, $($arg)+) };
}

#[macro_export]
macro_rules! app_panic {
    ($($arg:tt)+) => {{
        let message = format!($($arg)+);
        $crate::__log::error!(target: $crate::logging::APP_TARGET, "{}", message);
        panic!("{}", message)
    }};
}
