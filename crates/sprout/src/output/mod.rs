//! Error message formatting with actionable suggestions.

use std::error::Error;

use sprout_core::error::SproutError;

/// Format an error with its suggestion and source chain
pub fn format_error(error: &SproutError) -> String {
    let mut output = format!("error[{}]: {}\n", error.kind(), error);

    if let Some(suggestion) = error.suggestion() {
        output.push_str("help: ");
        output.push_str(suggestion);
        output.push('\n');
    }

    let mut source = error.source();
    while let Some(err) = source {
        output.push_str("caused by: ");
        output.push_str(&err.to_string());
        output.push('\n');
        source = err.source();
    }

    output
}
