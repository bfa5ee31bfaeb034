fn main() {
    // Host builds (no `espidf` feature) have no ESP-IDF toolchain to
    // describe; only the firmware build needs the sysenv exports.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
