// Code generated by richerror-gen. DO NOT EDIT.
// Module: errors::notfound

use richerror::{ReadOnlyRichError, RichError};

/// resource missing
pub const ERR_CODE_NOT_FOUND: &str = "NotFound";

/// Creates a `NotFound` error.
///
/// Tags: http.
pub fn new_not_found_error(id: &str, include_stack: bool) -> RichError {
    let mut err = RichError::new(ERR_CODE_NOT_FOUND, "resource missing")
        .add_meta_data("id", id)
        .with_tags(["http"]);
    if include_stack {
        err = err.with_stack(1);
    }
    err
}

/// Reports whether `err` is a `NotFound` error.
pub fn is_not_found_error(err: &dyn ReadOnlyRichError) -> bool {
    err.error_code() == ERR_CODE_NOT_FOUND
}
