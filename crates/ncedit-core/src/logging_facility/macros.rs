//! Operation boundary macros
//!
//! Field and event names come from `ncedit_core_types::schema`, reached through
//! the `core_types` re-export so callers need no direct dependency on it.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use ncedit_core::log_op_start;
/// log_op_start!("aggregate_edit_payloads");
/// log_op_start!("aggregate_edit_payloads", payload_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use ncedit_core::log_op_end;
/// log_op_end!("aggregate_edit_payloads", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation failure
///
/// `$err` is anything convertible into `ExError`; the offending node path is
/// logged as `err_path` when the error carries one.
///
/// # Example
///
/// ```
/// # use ncedit_core::log_op_error;
/// # use ncedit_core::errors::EditError;
/// let err = EditError::Internal { message: "boom".to_string() };
/// log_op_error!("aggregate_edit_payloads", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        let err_path = ex_err
            .error_path()
            .map(|p| p.xpath.clone())
            .unwrap_or_default();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_path = %err_path,
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        let err_path = ex_err
            .error_path()
            .map(|p| p.xpath.clone())
            .unwrap_or_default();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_path = %err_path,
            $($field)*
        );
    }};
}
