//! Default values and functions for configuration

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.greptile.com/v2";
pub(crate) const DEFAULT_REMOTE: &str = "github";
pub(crate) const DEFAULT_BRANCH: &str = "main";

pub(crate) fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    60
}

pub(crate) fn default_max_messages_per_session() -> usize {
    200
}

pub(crate) fn default_idle_ttl_secs() -> u64 {
    60 * 60 * 24
}

pub(crate) fn default_sweep_interval_secs() -> u64 {
    300
}

pub(crate) fn default_remote() -> String {
    DEFAULT_REMOTE.to_string()
}

pub(crate) fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}
