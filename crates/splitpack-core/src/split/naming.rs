use lazy_static::lazy_static;
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const SPLIT_DIR_SUFFIX: &str = "-split";
pub const PART_MARKER: &str = "-part";
pub const MERGED_SUFFIX: &str = "-merged";

lazy_static! {
    static ref PART_FILE_NAME: Regex =
        Regex::new(r"^(?P<base>.*)-part(?P<index>\d{4,})(?P<ext>\.[^.]*)?$")
            .expect("part file pattern is valid");
}

/// Base name and extension (with its dot, or empty) of a file name.
pub fn name_parts(path: &Path) -> Option<(String, String)> {
    let base = path.file_stem()?.to_str()?.to_string();
    let ext = match path.extension() {
        Some(ext) => format!(".{}", ext.to_str()?),
        None => String::new(),
    };
    Some((base, ext))
}

/// `<file name>-split`, beside the file.
pub fn split_dir_for(file: &Path) -> PathBuf {
    let mut name: OsString = file
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(SPLIT_DIR_SUFFIX);
    file.with_file_name(name)
}

pub fn part_file_name(base: &str, ext: &str, index: u32) -> String {
    format!("{}{}{:04}{}", base, PART_MARKER, index, ext)
}

/// A part file name taken apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartName {
    pub base: String,
    pub index: u32,
    pub ext: String,
}

/// Recognise `<base>-part<digits><.ext>`. Indices are compared numerically,
/// so `-part0010` and `-part10000` order correctly.
pub fn parse_part_file_name(name: &str) -> Option<PartName> {
    let captures = PART_FILE_NAME.captures(name)?;
    let index: u32 = captures["index"].parse().ok()?;
    if index == 0 {
        return None;
    }
    Some(PartName {
        base: captures["base"].to_string(),
        index,
        ext: captures
            .name("ext")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    })
}

/// True for directory names of the form `<something>-split`.
pub fn is_split_dir_name(name: &str) -> bool {
    name.len() > SPLIT_DIR_SUFFIX.len() && name.ends_with(SPLIT_DIR_SUFFIX)
}

/// Where a split directory is merged back to: `<base>-merged<.ext>` beside
/// the split directory, derived from the original name it encodes.
pub fn merged_path_for(split_dir: &Path) -> Option<PathBuf> {
    let dir_name = split_dir.file_name()?.to_str()?;
    if !is_split_dir_name(dir_name) {
        return None;
    }
    let original = dir_name.strip_suffix(SPLIT_DIR_SUFFIX)?;
    let (base, ext) = name_parts(Path::new(original))?;
    Some(split_dir.with_file_name(format!("{}{}{}", base, MERGED_SUFFIX, ext)))
}
