//! Parsing and data model for the 10ft, 1hr shooting challenge.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod clock;
pub mod player;

pub use clock::{elapsed_from_remaining, parse_elapsed, parse_time_remaining, SESSION_SECONDS};
pub use player::{parse_row, PlayerRecord, Sample, DISTANCE_STEP_FT};

/// Lines starting with this character are ignored by the loader.
pub const COMMENT_MARKER: char = '#';

/// Problems with a single data row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("invalid time remaining {0:?} (expected MM:SS)")]
    InvalidTime(String),
    #[error("invalid transition distance {0:?}")]
    InvalidTransition(String),
}

#[derive(Error, Debug)]
pub enum TenftError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },
}

/// Parse every data row of `text`, skipping comment lines.
///
/// Either every row parses or nothing is returned.
pub fn parse_players(text: &str) -> Result<Vec<PlayerRecord>, TenftError> {
    let mut players = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.starts_with(COMMENT_MARKER) {
            continue;
        }
        let record = parse_row(line.trim_end()).map_err(|source| TenftError::Parse {
            line: idx + 1,
            source,
        })?;
        players.push(record);
    }
    Ok(players)
}

/// Read and parse a results file.
pub fn load_players(path: &Path) -> Result<Vec<PlayerRecord>, TenftError> {
    let text = fs::read_to_string(path).map_err(|source| TenftError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_players(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "\
# name,starts throwing at,10ft,20ft,30ft
Simon,,44:01,,30:00
# a comment, 12:00
Ana,20,59:54,59:40,58:02\r
Bo,,59:00   \n";

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tenft-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_players_in_file_order() {
        let players = parse_players(DATA).unwrap();
        let names: Vec<&str> = players.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Simon", "Ana", "Bo"]);
        assert_eq!(players[0].distances(), vec![10, 30]);
        assert_eq!(players[1].starts_throwing_at(), Some(20));
        assert_eq!(players[1].times(), vec![6, 20, 118]);
        assert_eq!(players[2].samples().len(), 1);
    }

    #[test]
    fn test_comment_lines_never_become_records() {
        let players = parse_players("#Simon,,44:01\n#,,\n#\n").unwrap();
        assert!(players.is_empty());
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        let players = parse_players("Bo,,59:00 \t\r\n").unwrap();
        assert_eq!(players[0].times(), vec![60]);
    }

    #[test]
    fn test_malformed_row_aborts_load() {
        let err = parse_players("Simon,,44:01\nAna,,abc:01\nBo,,59:00\n").unwrap_err();
        match err {
            TenftError::Parse { line, source } => {
                assert_eq!(line, 2);
                assert_eq!(source, ParseError::InvalidTime("abc:01".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_line_is_missing_fields() {
        let err = parse_players("Simon,,44:01\n\nBo,,59:00\n").unwrap_err();
        assert!(matches!(
            err,
            TenftError::Parse {
                line: 2,
                source: ParseError::MissingField(_)
            }
        ));
    }

    #[test]
    fn test_load_players_from_file() {
        let path = temp_path("load.csv");
        fs::write(&path, DATA).unwrap();
        let players = load_players(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(players.unwrap().len(), 3);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = temp_path("does-not-exist.csv");
        let err = load_players(&path).unwrap_err();
        match err {
            TenftError::Io { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_messages() {
        let err = parse_players("Ana,x,59:54\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 1: invalid transition distance \"x\""
        );
    }
}
