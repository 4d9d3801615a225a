//! Key/value group file reader.
//!
//! Reads the `[Group]` / `Key=Value` descriptor syntax used by plugin
//! manifests. Values are stored raw and decoded on access, so one bad value
//! only affects the key that holds it.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static LOCALIZED_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>[^\[\]]+)\[(?P<locale>[^\[\]]+)\]$").expect("localized key pattern")
});

/// Syntax error raised while reading a group file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct KeyFileError {
    pub line: usize,
    pub reason: String,
}

impl KeyFileError {
    fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Group {
    name: String,
    // File order is kept; a repeated key replaces the earlier value in place.
    entries: Vec<(String, String)>,
}

impl Group {
    fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    fn raw(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Parsed group file.
#[derive(Debug, Clone, Default)]
pub struct KeyFile {
    groups: Vec<Group>,
}

impl KeyFile {
    /// Parses group file text.
    ///
    /// # Errors
    /// - A key line before the first group header.
    /// - A line that is neither blank, a `#` comment, a header nor `key=value`.
    /// - A header with an empty or bracket-containing name, or an empty key.
    pub fn parse(source: &str) -> Result<Self, KeyFileError> {
        let mut file = KeyFile::default();
        let mut current: Option<usize> = None;

        for (index, raw_line) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = raw_line.trim_start();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') {
                let header = line.trim_end();
                let name = header
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .ok_or_else(|| KeyFileError::new(line_no, "unterminated group header"))?;
                if name.is_empty() || name.contains(['[', ']']) {
                    return Err(KeyFileError::new(line_no, "invalid group name"));
                }
                current = Some(file.group_index_or_insert(name));
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(KeyFileError::new(line_no, "expected `key=value`"));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(KeyFileError::new(line_no, "empty key"));
            }
            let Some(group) = current else {
                return Err(KeyFileError::new(line_no, "key outside of any group"));
            };
            file.groups[group].insert(key.to_string(), value.trim().to_string());
        }

        Ok(file)
    }

    fn group_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(index) = self.groups.iter().position(|group| group.name == name) {
            return index;
        }
        self.groups.push(Group {
            name: name.to_string(),
            entries: Vec::new(),
        });
        self.groups.len() - 1
    }

    fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.group(group).is_some()
    }

    pub fn has_key(&self, group: &str, key: &str) -> bool {
        self.raw(group, key).is_some()
    }

    /// Keys of `group` in file order. Empty when the group is absent.
    pub fn keys(&self, group: &str) -> Vec<&str> {
        self.group(group)
            .map(|group| group.entries.iter().map(|(key, _)| key.as_str()).collect())
            .unwrap_or_default()
    }

    /// Undecoded value text.
    pub fn raw(&self, group: &str, key: &str) -> Option<&str> {
        self.group(group)?.raw(key)
    }

    /// Unescaped string value. `None` when absent or badly escaped.
    pub fn string(&self, group: &str, key: &str) -> Option<String> {
        unescape(self.raw(group, key)?)
    }

    /// Translated string value for the first matching locale, falling back to
    /// the untranslated key.
    pub fn locale_string(&self, group: &str, key: &str, locales: &[String]) -> Option<String> {
        locales
            .iter()
            .filter(|locale| locale.as_str() != "C")
            .find_map(|locale| self.string(group, &format!("{key}[{locale}]")))
            .or_else(|| self.string(group, key))
    }

    /// `true`/`1` or `false`/`0`. `None` for anything else.
    pub fn boolean(&self, group: &str, key: &str) -> Option<bool> {
        parse_boolean(self.raw(group, key)?)
    }

    /// Decimal integer, or `None` when absent or unparsable.
    pub fn integer(&self, group: &str, key: &str) -> Option<i64> {
        self.raw(group, key)?.trim().parse::<i64>().ok()
    }

    /// `;` separated list. A trailing separator does not add an empty item.
    pub fn string_list(&self, group: &str, key: &str) -> Option<Vec<String>> {
        split_list(self.raw(group, key)?)
    }
}

/// Splits `Name[fr]` into `("Name", "fr")`.
pub fn split_localized_key(key: &str) -> Option<(&str, &str)> {
    let captures = LOCALIZED_KEY.captures(key)?;
    let base = captures.name("base")?.as_str();
    let locale = captures.name("locale")?.as_str();
    Some((base, locale))
}

fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            's' => out.push(' '),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '\\' => out.push('\\'),
            ';' => out.push(';'),
            _ => return None,
        }
    }
    Some(out)
}

fn split_list(raw: &str) -> Option<Vec<String>> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            ';' => items.push(unescape(&std::mem::take(&mut current))?),
            '\\' => {
                let escaped = chars.next()?;
                if escaped == ';' {
                    current.push(';');
                } else {
                    current.push('\\');
                    current.push(escaped);
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        items.push(unescape(&current)?);
    }
    Some(items)
}
