//! Build identification stamped by `build.rs`

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    /// Short commit hash, `-dirty` suffixed for modified trees
    pub commit: &'static str,
    /// RFC 3339, UTC
    pub built_at: &'static str,
    pub profile: &'static str,
}

/// Identification of the running binary
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        commit: env!("GIT_HASH"),
        built_at: env!("BUILD_TIMESTAMP"),
        profile: env!("BUILD_PROFILE"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kotoba-ap {} ({}, built {}, {})",
            self.version, self.commit, self.built_at, self.profile
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_stamp_is_present() {
        let info = build_info();
        assert!(!info.commit.is_empty());
        assert!(!info.profile.is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(info.built_at).is_ok());
    }

    #[test]
    fn test_display() {
        let info = BuildInfo {
            version: "0.1.0",
            commit: "1a2b3c4d-dirty",
            built_at: "2024-05-01T12:00:00Z",
            profile: "release",
        };
        assert_eq!(
            info.to_string(),
            "kotoba-ap 0.1.0 (1a2b3c4d-dirty, built 2024-05-01T12:00:00Z, release)"
        );
    }
}
