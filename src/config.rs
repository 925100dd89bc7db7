//! Typed loader for the dashboard configuration.
//!
//! The dashboard keeps its settings in a generated script of the form
//! `const CONFIG = { ... };` whose body is JSON. Plain JSON files are accepted
//! too. Only the `TIMEZONE` block matters to the statistics core; map tokens,
//! signature lines and navigation links are ignored.
//!
//! ## Example
//! ```rust
//! use fitflow::config::DashboardConfig;
//!
//! let script = r#"const CONFIG = { "TIMEZONE": { "offset": -5, "name": "America/New_York" } };"#;
//! let config = DashboardConfig::parse(script).unwrap();
//! assert_eq!(config.timezone.unwrap().offset, Some(-5));
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{OptionExt, Result};

/// Marker that opens the JSON body in a generated config script.
const SCRIPT_START_MARKER: &str = "const CONFIG = ";

/// Marker that closes the JSON body (the brace is kept, the semicolon dropped).
const SCRIPT_END_MARKER: &str = "};";

/// The parts of the dashboard configuration the core understands.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    /// Local timezone used to interpret activity timestamps
    #[serde(rename = "TIMEZONE", default)]
    pub timezone: Option<TimezoneSection>,
}

/// Raw `TIMEZONE` block. Fields stay optional so a partial block can still
/// contribute whatever it does specify.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimezoneSection {
    /// Hours east of UTC
    #[serde(default)]
    pub offset: Option<i64>,
    /// Display name, usually an IANA zone such as `Asia/Shanghai`
    #[serde(default)]
    pub name: Option<String>,
}

impl DashboardConfig {
    /// Parse config content, either plain JSON or a `const CONFIG = {...};` script.
    pub fn parse(content: &str) -> Result<Self> {
        let body = extract_json_body(content)?;
        Ok(serde_json::from_str(body)?)
    }

    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }
}

/// Locate the JSON object inside the content.
fn extract_json_body(content: &str) -> Result<&str> {
    let Some(start) = content.find(SCRIPT_START_MARKER) else {
        return Ok(content.trim());
    };
    let start = start + SCRIPT_START_MARKER.len();
    let end = content[start..]
        .find(SCRIPT_END_MARKER)
        .ok_or_config("config script is missing the closing '};'")?;
    // Keep the closing brace
    Ok(content[start..start + end + 1].trim())
}
