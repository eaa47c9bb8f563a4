//! Overload ambiguity detection.

use crate::db::TypeDatabase;
use crate::hierarchy::find_methods;
use crate::members::MethodRef;
use std::sync::Arc;
use tracing::trace;

/// Would a call to `method` need its arguments checked against overloads?
///
/// Collects the non-bridge methods of the declaring type's hierarchy with the
/// same name that a call with `method`'s parameter count could reach:
/// - a varargs `method` reaches any varargs candidate and any candidate with
///   at least as many parameters;
/// - otherwise a candidate must take exactly as many parameters, or fewer if
///   the candidate is varargs.
///
/// Returns `true` when more than one candidate remains.
pub fn is_overload_checking_required(db: &dyn TypeDatabase, method: &Arc<MethodRef>) -> bool {
    let declaration = method.resolve();
    let is_var_args = declaration.is_var_args();
    let parameter_count = declaration.parameters.len();

    let candidates = find_methods(db, declaration.declaring_type, |candidate| {
        if candidate.name != declaration.name || candidate.is_bridge() {
            return false;
        }
        let count = candidate.parameters.len();
        if is_var_args {
            return candidate.is_var_args() || count >= parameter_count;
        }
        if count < parameter_count {
            return candidate.is_var_args();
        }
        count == parameter_count
    });

    trace!(
        method = %declaration.name,
        candidates = candidates.len(),
        "overload candidates"
    );
    candidates.len() > 1
}

#[cfg(test)]
#[path = "../tests/overload_tests.rs"]
mod tests;
