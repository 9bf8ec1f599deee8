fn main() {
    // Only the firmware build needs the ESP-IDF environment exported; host
    // builds (tests, the vttouchw CLI) have no embuild dependency.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
