use surrealdb::Response;

use crate::middleware::error::{AppError, AppResult};

pub const THROW_POST_NOT_FOUND: &str = "POST_NOT_FOUND";
pub const THROW_PARENT_NOT_FOUND: &str = "PARENT_NOT_FOUND";
pub const THROW_MAX_DEPTH_EXCEEDED: &str = "MAX_DEPTH_EXCEEDED";
pub const THROW_REPLY_NOT_FOUND: &str = "REPLY_NOT_FOUND";
pub const THROW_REPLY_DELETED: &str = "REPLY_DELETED";

/// Identifies the record a failed transaction was about, so thrown codes can be turned
/// into errors that name it.
#[derive(Debug, Clone, Default)]
pub struct TxSubject<'a> {
    pub post_id: &'a str,
    pub parent_id: Option<&'a str>,
    pub reply_id: Option<&'a str>,
    pub max_depth: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Severity {
    NotExecuted,
    Database,
    Conflict,
    Business,
}

pub const REPLY_PATH_INDEX: &str = "post_path_idx";

/// A duplicate on the path index means a concurrent writer claimed the same segment first.
fn is_conflict_message(msg: &str) -> bool {
    msg.contains("can be retried")
        || msg.contains(REPLY_PATH_INDEX)
        || msg.contains("read or write conflict")
        || msg.contains("Transaction conflict")
}

fn from_thrown(code: &str, subject: &TxSubject) -> Option<AppError> {
    let err = if code.contains(THROW_POST_NOT_FOUND) {
        AppError::PostNotFound {
            id: subject.post_id.to_string(),
        }
    } else if code.contains(THROW_PARENT_NOT_FOUND) {
        AppError::ParentNotFound {
            id: subject.parent_id.unwrap_or_default().to_string(),
        }
    } else if code.contains(THROW_MAX_DEPTH_EXCEEDED) {
        AppError::MaxDepthExceeded {
            max_depth: subject.max_depth,
        }
    } else if code.contains(THROW_REPLY_NOT_FOUND) {
        AppError::ReplyNotFound {
            id: subject.reply_id.unwrap_or_default().to_string(),
        }
    } else if code.contains(THROW_REPLY_DELETED) {
        AppError::ReplyDeleted {
            id: subject.reply_id.unwrap_or_default().to_string(),
        }
    } else {
        return None;
    };
    Some(err)
}

fn classify(error: &surrealdb::Error, subject: &TxSubject) -> (Severity, AppError) {
    let thrown = match error {
        surrealdb::Error::Db(surrealdb::error::Db::Thrown(code)) => from_thrown(code, subject),
        surrealdb::Error::Api(surrealdb::error::Api::Query(msg)) => from_thrown(msg, subject),
        _ => None,
    };
    if let Some(err) = thrown {
        return (Severity::Business, err);
    }

    let msg = error.to_string();
    if is_conflict_message(&msg) {
        return (Severity::Conflict, AppError::TransactionConflict { attempts: 1 });
    }
    let severity = match error {
        surrealdb::Error::Db(surrealdb::error::Db::QueryNotExecuted) => Severity::NotExecuted,
        _ if msg.contains("not executed") || msg.contains("cancelled") => Severity::NotExecuted,
        _ => Severity::Database,
    };
    (severity, AppError::SurrealDb { source: msg })
}

/// Maps an error returned before any statement ran, e.g. a commit rejected by the engine.
pub fn map_query_error(error: surrealdb::Error, subject: &TxSubject) -> AppError {
    classify(&error, subject).1
}

/// Inspects every statement result of a transactional query. A failed transaction marks all
/// of its statements as failed, so the most specific error wins: a thrown business code,
/// then a write conflict, then any other database error.
pub fn check_transaction_custom_error(
    query_response: &mut Response,
    subject: &TxSubject,
) -> AppResult<()> {
    let query_err = query_response
        .take_errors()
        .values()
        .map(|error| classify(error, subject))
        .max_by_key(|(severity, _)| *severity)
        .map(|(_, err)| err);

    match query_err {
        None => Ok(()),
        Some(err) => Err(err),
    }
}
