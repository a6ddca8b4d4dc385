// Code generated by richerror-gen. DO NOT EDIT.
// Module: errors::upstreamfailed

use richerror::{InnerError, MetaData, ReadOnlyRichError, RichError};

/// upstream call failed
pub const ERR_CODE_UPSTREAM_FAILED: &str = "UpstreamFailed";

/// Creates a `UpstreamFailed` error.
///
/// Tags: HTTP, upstream.
pub fn new_upstream_failed_error(
    service: &str,
    cause: Option<InnerError>,
    fields: MetaData,
    include_stack: bool,
) -> RichError {
    let mut err = RichError::new(ERR_CODE_UPSTREAM_FAILED, "upstream call failed")
        .with_meta_data(fields)
        .add_meta_data("service", service)
        .add_error(cause)
        .with_tags(["HTTP", "upstream"]);
    if include_stack {
        err = err.with_stack(1);
    }
    err
}

/// Reports whether `err` is a `UpstreamFailed` error.
pub fn is_upstream_failed_error(err: &dyn ReadOnlyRichError) -> bool {
    err.error_code() == ERR_CODE_UPSTREAM_FAILED
}
