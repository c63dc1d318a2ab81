use std::path::PathBuf;

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

pub(crate) fn default_build_dir() -> PathBuf {
    PathBuf::from(".nuxt")
}

pub(crate) fn default_entry() -> PathBuf {
    PathBuf::from(".nuxt/dist/server/server.js")
}

pub(crate) fn default_target_dir() -> PathBuf {
    PathBuf::from(".output")
}

pub(crate) fn default_out_name() -> String {
    "server.js".to_string()
}

pub(crate) fn default_router_base() -> String {
    "/".to_string()
}

pub(crate) fn default_public_path() -> String {
    "/_nuxt/".to_string()
}
