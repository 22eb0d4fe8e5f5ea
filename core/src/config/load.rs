use super::types::{ExtractConfig, LoggingConfig, DEFAULT_LOG_FILTER};

impl LoggingConfig {
    /// Logging setup for one run: destination from the parsed config, filter from `RUST_LOG`.
    pub fn from_env(config: &ExtractConfig) -> Self {
        Self::resolve(
            config,
            std::env::var("RUST_LOG").ok(),
            atty::is(atty::Stream::Stderr),
        )
    }

    pub(crate) fn resolve(
        config: &ExtractConfig,
        rust_log: Option<String>,
        stderr_is_tty: bool,
    ) -> Self {
        let filter = rust_log
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let file = config.log_path().map(|p| p.to_path_buf());
        let ansi = file.is_none() && stderr_is_tty;

        Self { file, filter, ansi }
    }
}
