use std::ffi::OsString;

use dbextract_core::{
    fault, ContextHandle, Coordinator, DumpRunner, ExecutionContext, ExtractError, LoggingConfig,
    TracingLog,
};

use crate::args;

/// Everything in this tool runs on one cooperative worker.
const WORKERS: usize = 1;

/// Run one extraction. Failures inside the worker exit the process directly.
pub fn run(tokens: Vec<OsString>) -> Result<(), ExtractError> {
    let context = ExecutionContext::new(WORKERS)?;
    context.post_initial(move |handle| async move {
        if let Err(err) = bootstrap(tokens, handle).await {
            fault::fail_fast(&err);
        }
    })?;
    context.run()
}

async fn bootstrap(tokens: Vec<OsString>, handle: ContextHandle) -> Result<(), ExtractError> {
    let config = args::parse_args(tokens)?;
    let log = TracingLog::new(LoggingConfig::from_env(&config));
    let runner = Box::new(DumpRunner::new(config));

    Coordinator::new(handle, runner, log).start().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_run_with_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.db");
        let output = dir.path().join("dump.out");
        let log = dir.path().join("extract.log");
        std::fs::write(&input, vec![0x5au8; 3 * 4096]).unwrap();

        let tokens = vec![
            OsString::from("dbextract"),
            "-f".into(),
            input.into_os_string(),
            "-o".into(),
            output.clone().into_os_string(),
            "-l".into(),
            log.clone().into_os_string(),
        ];
        run(tokens).unwrap();

        assert!(output.exists());
        let written = std::fs::read_to_string(&log).unwrap();
        assert!(written.contains("extraction finished"), "{written}");
        assert!(written.contains("\"blocks\":3"), "{written}");
    }
}
