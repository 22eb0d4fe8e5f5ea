use std::num::NonZeroU32;

use crate::error::ExtractError;

use super::types::ExtractConfig;

pub(crate) fn validate(config: &ExtractConfig) -> Result<(), ExtractError> {
    if config.input_path().as_os_str().is_empty() {
        return Err(ExtractError::Usage(
            "You must explicitly specify a path with -f.".to_string(),
        ));
    }

    let overrides = config.overrides();
    if let (Some(block), Some(extent)) = (overrides.block_size, overrides.extent_size) {
        check_extent_multiple(block, extent)?;
    }

    Ok(())
}

fn check_extent_multiple(block: NonZeroU32, extent: NonZeroU32) -> Result<(), ExtractError> {
    if extent.get() % block.get() != 0 {
        return Err(ExtractError::Validation(format!(
            "The forced extent size ({extent}) is not a multiple of the forced block size ({block})."
        )));
    }
    Ok(())
}

/// Parse an operator-supplied override. `what` names the value in the message.
///
/// Leading whitespace is skipped; anything after the digits is rejected.
pub fn parse_positive(raw: &str, what: &str) -> Result<NonZeroU32, String> {
    raw.trim_start()
        .parse::<i64>()
        .ok()
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
        .and_then(NonZeroU32::new)
        .ok_or_else(|| format!("{what} must be a positive integer."))
}
