pub mod cover;
pub mod edit;
pub mod extract;
pub mod merge;
pub mod plan;
pub mod text;
pub mod unlock;

/// Logs one line per processed unit while long operations run.
pub(crate) fn log_progress(current: usize, total: usize, label: &str) {
    log::debug!("[{}/{}] {}", current, total, label);
}
