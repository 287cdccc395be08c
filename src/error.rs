use thiserror::Error;

/// Structural problems with a dataset document. Anything that is not listed
/// here is absorbed during ingestion with a default value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetShapeError {
    #[error("dataset is not valid json: {0}")]
    InvalidJson(String),
    #[error("dataset root must be a json object")]
    NotAnObject,
    #[error("missing required collection `{0}`")]
    MissingCollection(&'static str),
    #[error("collection `{field}` must be {expected}")]
    WrongCollectionType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("match entry #{index} is not an object")]
    MatchNotAnObject { index: usize },
    #[error("match entry #{index} has no match_id")]
    MissingMatchId { index: usize },
    #[error("duplicate match_id `{0}`")]
    DuplicateMatchId(String),
    #[error("referee record `{0}` is not an object")]
    RefereeNotAnObject(String),
}
