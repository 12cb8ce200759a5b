/// Get the version string for regcopy and libregcopy
pub fn get_version_string() -> String {
    format!(
        "regcopy {}\nlibregcopy {}",
        env!("CARGO_PKG_VERSION"),
        libregcopy::version()
    )
}

/// Print version information to stdout
pub fn print_version() {
    println!("{}", get_version_string());
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
