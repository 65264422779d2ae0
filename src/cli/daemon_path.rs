use std::path::PathBuf;

pub const DAEMON_BINARY: &str = "hydrate-daemon";

/// The daemon binary is installed next to the CLI.
pub fn to_daemon_path(mut path: PathBuf) -> PathBuf {
    path.set_file_name(DAEMON_BINARY);
    #[cfg(windows)]
    {
        path.set_extension("exe");
    }
    path
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::to_daemon_path;

    #[cfg(unix)]
    #[test]
    fn test_daemon_path_is_sibling() {
        assert_eq!(
            to_daemon_path(PathBuf::from("/usr/local/bin/hydrate")),
            PathBuf::from("/usr/local/bin/hydrate-daemon")
        );
    }
}
