//! Text rewrite of a component launch script's default JVM options.
//!
//! Start scripts generated by Gradle carry a line such as
//!
//! ```text
//! DEFAULT_JVM_OPTS='"-Xms512m" "-Xmx2g"'
//! ```
//!
//! where the outer quotes delimit the shell value and each option is quoted
//! with the other quote character. The configuration-location directive is
//! inserted as the first option, quoted the same way.

use std::path::PathBuf;

use crate::error::ScriptShapeError;

pub const DEFAULT_OPTS_VAR: &str = "DEFAULT_JVM_OPTS";
pub const CONFIG_LOCATION_FLAG: &str = "-Dspring.config.location=";

/// Directories a component reads configuration from, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    /// Configuration shipped with the release.
    pub system_dir: PathBuf,
    /// The operator's overrides.
    pub user_dir: PathBuf,
}

impl ConfigLocation {
    pub fn new(system_dir: impl Into<PathBuf>, user_dir: impl Into<PathBuf>) -> Self {
        Self {
            system_dir: system_dir.into(),
            user_dir: user_dir.into(),
        }
    }

    /// `-Dspring.config.location=<system>/,<user>/`
    pub fn directive(&self) -> String {
        format!(
            "{}{}/,{}/",
            CONFIG_LOCATION_FLAG,
            self.system_dir.to_string_lossy().trim_end_matches('/'),
            self.user_dir.to_string_lossy().trim_end_matches('/')
        )
    }
}

/// The one line assigning the default options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptsAssignment<'a> {
    /// Whole line without its terminator.
    pub line: &'a str,
    /// Text after the `=`.
    pub value: &'a str,
    /// Byte offset of `value` within the script.
    pub value_offset: usize,
}

/// Result of rewriting a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    Rewritten(String),
    /// A directive is already present; the script must be left alone.
    Unchanged { existing_line: String },
}

/// Find the single `DEFAULT_JVM_OPTS=<value>` line with a non-empty value.
pub fn locate_default_opts(content: &str) -> Result<OptsAssignment<'_>, ScriptShapeError> {
    let prefix_len = DEFAULT_OPTS_VAR.len() + 1;
    let mut found = Vec::new();
    let mut offset = 0;

    for raw in content.split_inclusive('\n') {
        let line = raw.trim_end_matches(['\n', '\r']);
        if let Some(value) = line
            .strip_prefix(DEFAULT_OPTS_VAR)
            .and_then(|rest| rest.strip_prefix('='))
            && !value.is_empty()
        {
            found.push(OptsAssignment {
                line,
                value,
                value_offset: offset + prefix_len,
            });
        }
        offset += raw.len();
    }

    match found.len() {
        0 => Err(ScriptShapeError::MissingAssignment {
            var: DEFAULT_OPTS_VAR,
        }),
        1 => Ok(found.remove(0)),
        count => Err(ScriptShapeError::AmbiguousAssignment {
            var: DEFAULT_OPTS_VAR,
            count,
        }),
    }
}

/// Insert the configuration-location directive into the default options.
///
/// The value's outer quote is kept and the directive goes right after it;
/// everything else in the script is preserved byte for byte.
pub fn insert_config_location(
    content: &str,
    location: &ConfigLocation,
) -> Result<Rewrite, ScriptShapeError> {
    let assignment = locate_default_opts(content)?;
    if assignment.value.contains(CONFIG_LOCATION_FLAG) {
        return Ok(Rewrite::Unchanged {
            existing_line: assignment.line.to_string(),
        });
    }

    let (outer_len, option_quote) = match assignment.value.as_bytes()[0] {
        b'\'' => (1, '"'),
        b'"' => (1, '\''),
        _ => (0, '\''),
    };
    let insert_at = assignment.value_offset + outer_len;
    let directive = location.directive();

    let mut patched = String::with_capacity(content.len() + directive.len() + 3);
    patched.push_str(&content[..insert_at]);
    patched.push(option_quote);
    patched.push_str(&directive);
    patched.push(option_quote);
    patched.push(' ');
    patched.push_str(&content[insert_at..]);

    Ok(Rewrite::Rewritten(patched))
}
