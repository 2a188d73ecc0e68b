//! Game properties and the `properties.txt` codec.
//!
//! The file format is line oriented UTF-8 text. Each non-blank line that does
//! not start with `#` is `key: value`. Recognised keys are `name` (the
//! tagline), `width`, `height`, `msPerFrame` and `debug`; unknown keys are
//! ignored so older servers can read files written by newer ones. Keys absent
//! from the file take the defaults of [`GameProperties::default`].

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const KEY_TAGLINE: &str = "name";
const KEY_WIDTH: &str = "width";
const KEY_HEIGHT: &str = "height";
const KEY_FRAME_INTERVAL: &str = "msPerFrame";
const KEY_DEBUG: &str = "debug";

/// Per-page game settings handed to the compiler and the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProperties {
    /// One-line description shown above the game. Stored under `name`.
    pub tagline: String,
    pub width: i64,
    pub height: i64,
    /// Milliseconds between frames. Stored under `msPerFrame`.
    pub frame_interval_ms: i64,
    pub debug: bool,
}

impl Default for GameProperties {
    fn default() -> Self {
        GameProperties {
            tagline: String::new(),
            width: 256,
            height: 256,
            frame_interval_ms: 40,
            debug: false,
        }
    }
}

impl GameProperties {
    /// Parses the contents of a `properties.txt` file.
    ///
    /// Fails with [`CoreError::MalformedProperties`] when a meaningful line has
    /// no colon, and with [`CoreError::InvalidPropertyValue`] when a recognised
    /// key carries a value of the wrong type.
    pub fn decode(text: &str) -> Result<Self, CoreError> {
        let mut props = GameProperties::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(CoreError::MalformedProperties {
                    line: line.to_string(),
                });
            };
            let value = value.trim();
            match key {
                KEY_TAGLINE => props.tagline = value.to_string(),
                KEY_WIDTH => props.width = parse_int(key, value)?,
                KEY_HEIGHT => props.height = parse_int(key, value)?,
                KEY_FRAME_INTERVAL => props.frame_interval_ms = parse_int(key, value)?,
                KEY_DEBUG => props.debug = parse_bool(key, value)?,
                _ => {}
            }
        }
        Ok(props)
    }

    /// Renders the canonical file contents: every key, in fixed order, no
    /// comments.
    ///
    /// The tagline is written on a single line, so line breaks in it are
    /// folded to spaces and surrounding whitespace is dropped. Any tagline
    /// without line breaks or surrounding whitespace survives a round trip.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{KEY_TAGLINE}: {}", single_line(&self.tagline));
        let _ = writeln!(out, "{KEY_WIDTH}: {}", self.width);
        let _ = writeln!(out, "{KEY_HEIGHT}: {}", self.height);
        let _ = writeln!(out, "{KEY_FRAME_INTERVAL}: {}", self.frame_interval_ms);
        let _ = writeln!(out, "{KEY_DEBUG}: {}", self.debug);
        out
    }
}

fn parse_int(key: &str, value: &str) -> Result<i64, CoreError> {
    value.parse().map_err(|_| CoreError::InvalidPropertyValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, CoreError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(CoreError::InvalidPropertyValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_file_yields_defaults() {
        let props = GameProperties::decode("").unwrap();
        assert_eq!(props, GameProperties::default());
        assert_eq!(props.width, 256);
        assert_eq!(props.height, 256);
        assert_eq!(props.frame_interval_ms, 40);
        assert!(!props.debug);
        assert_eq!(props.tagline, "");
    }

    #[test]
    fn encode_uses_fixed_key_order() {
        let props = GameProperties {
            tagline: "Dodge the rocks".to_string(),
            width: 320,
            height: 200,
            frame_interval_ms: 20,
            debug: true,
        };
        assert_eq!(
            props.encode(),
            "name: Dodge the rocks\nwidth: 320\nheight: 200\nmsPerFrame: 20\ndebug: true\n"
        );
    }

    #[test]
    fn comments_blank_lines_and_unknown_keys_are_ignored() {
        let text = "# written by hand\n\n  width: 100  \ncolour: blue\n# height: 1\ndebug: true\n";
        let props = GameProperties::decode(text).unwrap();
        assert_eq!(props.width, 100);
        assert_eq!(props.height, 256);
        assert!(props.debug);
    }

    #[test]
    fn value_may_contain_colons() {
        let props = GameProperties::decode("name: Level 2: the return\n").unwrap();
        assert_eq!(props.tagline, "Level 2: the return");
    }

    #[test]
    fn colonless_line_is_malformed() {
        let err = GameProperties::decode("width: 10\njust some words\n").unwrap_err();
        assert_eq!(
            err,
            CoreError::MalformedProperties {
                line: "just some words".to_string()
            }
        );
        assert_eq!(err.to_string(), "Colon missing from 'just some words'");
    }

    #[test]
    fn mistyped_values_are_rejected() {
        assert!(matches!(
            GameProperties::decode("width: wide"),
            Err(CoreError::InvalidPropertyValue { .. })
        ));
        assert!(matches!(
            GameProperties::decode("debug: yes"),
            Err(CoreError::InvalidPropertyValue { .. })
        ));
    }

    #[test]
    fn tagline_line_breaks_are_folded() {
        let props = GameProperties {
            tagline: "two\nlines ".to_string(),
            ..GameProperties::default()
        };
        let back = GameProperties::decode(&props.encode()).unwrap();
        assert_eq!(back.tagline, "two lines");
        assert_eq!(back.width, props.width);
    }

    prop_compose! {
        fn representable()(
            tagline in "([A-Za-z0-9#][A-Za-z0-9 :#!?.,'-]{0,30}[A-Za-z0-9.!?])?",
            width in any::<i64>(),
            height in any::<i64>(),
            frame_interval_ms in any::<i64>(),
            debug in any::<bool>(),
        ) -> GameProperties {
            GameProperties { tagline, width, height, frame_interval_ms, debug }
        }
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(props in representable()) {
            let back = GameProperties::decode(&props.encode()).unwrap();
            prop_assert_eq!(back, props);
        }
    }
}
