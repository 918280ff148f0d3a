//! GRASS module invocations and parsing of their shell-style output.
//!
//! GRASS modules take their parameters as `key=value` pairs plus single-letter
//! flags (`-g`, `-f`). A [`ModuleCall`] collects those so a runner can turn
//! them into a process invocation, and so tests can inspect what would have
//! been executed.

use std::collections::BTreeMap;
use std::fmt;

/// A single GRASS module invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCall {
    name: String,
    flags: String,
    options: Vec<(String, String)>,
    overwrite: bool,
    quiet: bool,
}

impl ModuleCall {
    /// Start building an invocation of `name` (e.g. `r.import`).
    pub fn new(name: impl Into<String>) -> Self {
        ModuleCall {
            name: name.into(),
            flags: String::new(),
            options: Vec::new(),
            overwrite: false,
            quiet: false,
        }
    }

    /// Add single-letter flags, e.g. `"g"` or `"f"`.
    pub fn flags(mut self, flags: &str) -> Self {
        for c in flags.chars() {
            if !self.flags.contains(c) {
                self.flags.push(c);
            }
        }
        self
    }

    /// Set an option. A later value for the same key replaces the earlier one.
    pub fn option(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        match self.options.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.options.push((key.to_string(), value)),
        }
        self
    }

    /// Set a multi-valued option; values are joined with commas.
    pub fn option_list<I, S>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.option(key, joined)
    }

    /// Allow the module to replace existing output maps.
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Suppress module progress output.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of an option, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a flag is set.
    pub fn has_flag(&self, flag: char) -> bool {
        self.flags.contains(flag)
    }

    /// Whether `--overwrite` will be passed.
    pub fn is_overwrite(&self) -> bool {
        self.overwrite
    }

    /// Whether `--quiet` will be passed.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Command-line arguments, excluding the module name.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.options.len() + 3);
        if !self.flags.is_empty() {
            args.push(format!("-{}", self.flags));
        }
        for (key, value) in &self.options {
            args.push(format!("{}={}", key, value));
        }
        if self.overwrite {
            args.push("--overwrite".to_string());
        }
        if self.quiet {
            args.push("--quiet".to_string());
        }
        args
    }
}

impl fmt::Display for ModuleCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in self.args() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Parse `key=value` lines as printed by `g.region -g`, `g.proj -g`,
/// `g.gisenv -n` and `g.findfile`.
///
/// Surrounding single or double quotes and a trailing `;` are stripped from
/// values. Lines without a separator are ignored.
pub fn parse_key_value(output: &str) -> BTreeMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once('=')?;
            let value = value.trim().trim_end_matches(';');
            let value = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
                .unwrap_or(value);
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Parse a delimited attribute table (`v.db.select separator=pipe`).
///
/// The first line is the column header and is skipped. Empty lines are dropped.
pub fn parse_table(output: &str, separator: char) -> Vec<Vec<String>> {
    output
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(separator).map(|s| s.trim().to_string()).collect())
        .collect()
}
