pub mod http;
pub mod schemas;
pub mod settings;
pub mod storage;

/// Crate version derived from git tags at build time.
pub fn version() -> &'static str {
    env!("GMONITOR_LIB_VERSION")
}
