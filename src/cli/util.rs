use crate::errors::OplogError;
use crate::types::QueryDescriptor;

use super::command::QuerySource;
use super::runner::OutputMode;

/// Parse `--format`; `None` means human output.
///
/// # Errors
/// Returns `OplogError::Config` for anything other than `human`, `plain` or `json`.
pub fn parse_output_mode(s: Option<&str>) -> Result<OutputMode, OplogError> {
    match s.map(str::to_ascii_lowercase).as_deref() {
        None | Some("human") => Ok(OutputMode::Human),
        Some("json") => Ok(OutputMode::Json),
        Some("plain") => Ok(OutputMode::Plain),
        Some(other) => Err(OplogError::Config(format!("unknown output format: {other} (expected human|plain|json)"))),
    }
}

/// Load a query descriptor. A bare selector (no `selector` key) is accepted as shorthand.
///
/// # Errors
/// Returns an error if the file cannot be read or the JSON is not a query.
pub fn read_query(source: &QuerySource) -> Result<QueryDescriptor, OplogError> {
    let text = match source {
        QuerySource::Inline(s) => s.clone(),
        QuerySource::File(p) => std::fs::read_to_string(p)
            .map_err(|e| OplogError::Io(format!("{}: {e}", p.display())))?,
    };
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let is_descriptor = value
        .as_object()
        .is_some_and(|m| m.contains_key("selector") || m.contains_key("options"));
    if is_descriptor {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(QueryDescriptor::new(serde_json::from_value(value)?))
    }
}
