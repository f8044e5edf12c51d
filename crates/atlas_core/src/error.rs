use std::path::PathBuf;

/// Failure while reading one delimited table out of a feed.
#[derive(Debug, thiserror::Error)]
#[error("{file}{}: {message}", match .line { Some(l) => format!(" line {l}"), None => String::new() })]
pub struct CsvParseError {
    pub file: String,
    pub line: Option<u64>,
    pub message: String,
}

impl CsvParseError {
    pub fn new(file: impl Into<String>, line: Option<u64>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

/// Every way an export run can fail. All variants abort the whole batch; the
/// catalogue is only ever written after a fully successful run.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no agency feed urls configured")]
    NoAgencies,

    #[error("invalid agency feed url {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build http client")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to fetch feed from {url}")]
    Acquire {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("feed from {url} is not a readable zip archive")]
    Archive {
        url: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("feed archive is missing required table {0}")]
    MissingTable(&'static str),

    #[error("failed to read archive entry {file}")]
    ArchiveEntry {
        file: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] CsvParseError),

    #[error("{file}: missing required column {column}")]
    MissingColumn {
        file: &'static str,
        column: &'static str,
    },

    #[error("{file} line {line}: bad {column} value")]
    BadScalar {
        file: &'static str,
        line: u64,
        column: &'static str,
        #[source]
        source: gtfs_atlas_model::ScalarParseError,
    },

    #[error("stop {stop_id}: unparseable {field} value {value:?}")]
    StopCoordinate {
        stop_id: String,
        field: &'static str,
        value: String,
    },

    #[error("no route coordinates to compute bounds from")]
    EmptyBounds,

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {artifact}")]
    Serialize {
        artifact: String,
        #[source]
        source: serde_json::Error,
    },
}
