use std::{
    error::Error,
    fmt::Display,
    path::Path,
    sync::LazyLock,
};

use regex::{Captures, Regex};

pub mod gaussian;
pub mod molpro;

#[derive(Debug, PartialEq, Eq)]
pub enum ProgramError {
    FileNotFound(String),
    ReadFileError(String, std::io::ErrorKind),
    WriteFileError(String, std::io::ErrorKind),
    EnergyNotFound(String),
    EnergyParseError(String),
    InvalidInput(String),
}

impl ProgramError {
    /// Returns `true` if the program error is [`FileNotFound`].
    ///
    /// [`FileNotFound`]: ProgramError::FileNotFound
    #[must_use]
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound(..))
    }

    /// Returns `true` if the program error is [`EnergyNotFound`].
    ///
    /// [`EnergyNotFound`]: ProgramError::EnergyNotFound
    #[must_use]
    pub fn is_energy_not_found(&self) -> bool {
        matches!(self, Self::EnergyNotFound(..))
    }
}

impl Display for ProgramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for ProgramError {}

/// matches `{{.key}}` directives, capturing `key`
static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\.(\w+)\}\}").unwrap());

/// A text template for an input file or script. In line with [Go
/// templates](https://pkg.go.dev/text/template), `{{.key}}` directives are
/// replaced with values by [Template::fill]. Everything else, including any
/// other braces, is copied through untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub header: String,
}

impl Template {
    pub fn from(s: &str) -> Self {
        Self {
            header: s.to_string(),
        }
    }

    /// read a template from the file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let path = path.as_ref();
        read_file(path).map(|header| Self { header })
    }

    /// concatenate `self` and `other`, as for a queue header followed by the
    /// program invocation
    pub fn join(&self, other: &Template) -> Self {
        Self {
            header: format!("{}{}", self.header, other.header),
        }
    }

    /// the keys of all of the directives in `self`, in order of appearance
    pub fn directives(&self) -> Vec<&str> {
        DIRECTIVE
            .captures_iter(&self.header)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// replace each `{{.key}}` directive with the value paired with `key` in
    /// `subs`. directives without a value are left in place and logged.
    /// substituted values are not themselves expanded
    pub fn fill(&self, subs: &[(&str, String)]) -> String {
        DIRECTIVE
            .replace_all(&self.header, |caps: &Captures| {
                let key = &caps[1];
                match subs.iter().find(|(k, _)| *k == key) {
                    Some((_, v)) => v.clone(),
                    None => {
                        log::warn!("no value for template directive {key}");
                        caps[0].to_owned()
                    }
                }
            })
            .into_owned()
    }
}

impl From<String> for Template {
    fn from(header: String) -> Self {
        Self { header }
    }
}

/// read `path` to a string, mapping a missing file to
/// [ProgramError::FileNotFound]
pub(crate) fn read_file(path: &Path) -> Result<String, ProgramError> {
    let name = path.display().to_string();
    if !path.exists() {
        return Err(ProgramError::FileNotFound(name));
    }
    std::fs::read_to_string(path)
        .map_err(|e| ProgramError::ReadFileError(name, e.kind()))
}

/// write `contents` to `path`, creating its parent directory if needed
pub(crate) fn write_file(
    path: &Path,
    contents: &str,
) -> Result<(), ProgramError> {
    let err = |e: std::io::Error| {
        ProgramError::WriteFileError(path.display().to_string(), e.kind())
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(err)?;
    }
    std::fs::write(path, contents).map_err(err)
}

/// parses the `nth` field of `line` into a float and returns
/// [ProgramError::EnergyParseError] containing `outname` if it fails. a string
/// containing `outname` is allocated in the Err case
#[inline]
pub(crate) fn parse_energy(
    line: &str,
    nth: usize,
    outname: &str,
) -> Result<Option<f64>, ProgramError> {
    line.split_whitespace()
        .nth(nth)
        .map(str::parse::<f64>)
        .transpose()
        .map_err(|_| ProgramError::EnergyParseError(outname.to_owned()))
}
