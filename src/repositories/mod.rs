pub(crate) mod attempt_state;
pub(crate) mod profile_cache;
