//! The "Message Template" resource: a boilerplate routing envelope that supplies the intro/outro
//! text every wire message is wrapped in, created on first use with a generic default.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::Result;

const SENTINEL_LINE: &str = "<message>";

/// The default routing envelope, written out the first time a caller asks for the Message
/// Template resource and none exists yet.
fn default_contents() -> String {
    [
        "R XXXXXXZ MMM YY",
        "FM COMSUBPAC PEARL HARBOR HI",
        "TO SSBN PAC",
        "BT",
        "UNCLAS",
        "SUBJ/VLF WEATHER GIF//",
        "RMKS/REACH OUT TO ISIC FOR INSTRUCTIONS ON HOW TO USE THIS MESSAGE.",
        SENTINEL_LINE,
        "BT",
        "#0001",
        "NNNN",
    ]
    .join("\n")
        + "\n"
}

/// Reads the Message Template resource at `path`, creating it with [`default_contents`] if it
/// does not exist yet, and splits it on the `<message>` sentinel line into `(intro, outro)`.
pub fn load(path: &Path) -> Result<(String, String)> {
    if !path.is_file() {
        debug!("message template resource missing, writing default at {path:?}");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, default_contents())?;
    }

    let contents = fs::read_to_string(path)?;
    split(&contents)
}

fn split(contents: &str) -> Result<(String, String)> {
    let marker = format!("{SENTINEL_LINE}\n");
    match contents.split_once(&marker) {
        Some((intro, outro)) => Ok((intro.to_string(), outro.to_string())),
        None => Ok((contents.to_string(), String::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_contents_contains_sentinel_line() {
        assert!(default_contents().contains(SENTINEL_LINE));
    }

    #[test]
    fn split_separates_intro_and_outro() {
        let text = "A\nB\n<message>\nC\nD\n";
        let (intro, outro) = split(text).unwrap();
        assert_eq!(intro, "A\nB\n");
        assert_eq!(outro, "C\nD\n");
    }

    #[test]
    fn load_creates_default_resource_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message_template.txt");
        assert!(!path.is_file());

        let (intro, outro) = load(&path).unwrap();
        assert!(path.is_file());
        assert!(intro.contains("UNCLAS"));
        assert!(outro.contains("NNNN"));
    }

    #[test]
    fn load_reuses_existing_resource() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message_template.txt");
        fs::write(&path, "INTRO\n<message>\nOUTRO\n").unwrap();

        let (intro, outro) = load(&path).unwrap();
        assert_eq!(intro, "INTRO\n");
        assert_eq!(outro, "OUTRO\n");
    }
}
