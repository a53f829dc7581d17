//! Retrieval of descriptors and resources by location.

use std::fs;

use crate::errors::FrictionlessError;

/// Source of data package bytes.
pub trait Fetcher {
    /// Returns the contents stored at `location`.
    ///
    /// # Errors
    /// Returns [`FrictionlessError`] if the location cannot be read.
    fn fetch(&self, location: &str) -> Result<Vec<u8>, FrictionlessError>;
}

/// Fetches `http(s)://` locations with `ureq`; `file://` locations and bare
/// paths are read from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqFetcher;

impl Fetcher for UreqFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, FrictionlessError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let mut response =
                ureq::get(location)
                    .call()
                    .map_err(|error| FrictionlessError::Fetch {
                        location: location.to_owned(),
                        message: error.to_string(),
                    })?;
            return response
                .body_mut()
                .read_to_vec()
                .map_err(|error| FrictionlessError::Fetch {
                    location: location.to_owned(),
                    message: error.to_string(),
                });
        }
        let path = location.strip_prefix("file://").unwrap_or(location);
        fs::read(path).map_err(|source| FrictionlessError::Io {
            path: path.into(),
            source,
        })
    }
}

/// Location of `datapackage.json` for a user-supplied URL, which may name the
/// descriptor itself or the directory holding it.
pub(crate) fn descriptor_location(url: &str) -> String {
    let url = url.trim();
    if url.ends_with(".json") {
        url.to_owned()
    } else {
        format!("{}/datapackage.json", url.trim_end_matches('/'))
    }
}

/// Resolves a resource path against the descriptor location.
pub(crate) fn resolve(descriptor: &str, path: &str) -> String {
    if path.contains("://") || path.starts_with('/') {
        return path.to_owned();
    }
    match descriptor.rsplit_once('/') {
        Some((directory, _)) => format!("{directory}/{path}"),
        None => path.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("https://example.org/pkg/datapackage.json", "https://example.org/pkg/datapackage.json")]
    #[case("https://example.org/pkg/", "https://example.org/pkg/datapackage.json")]
    #[case("data/pkg", "data/pkg/datapackage.json")]
    fn descriptor_location_appends_the_file_name(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(descriptor_location(url), expected);
    }

    #[rstest]
    #[case("https://example.org/pkg/datapackage.json", "data/rain.csv", "https://example.org/pkg/data/rain.csv")]
    #[case("https://example.org/pkg/datapackage.json", "https://cdn.example.org/rain.csv", "https://cdn.example.org/rain.csv")]
    #[case("pkg/datapackage.json", "/srv/rain.csv", "/srv/rain.csv")]
    #[case("datapackage.json", "rain.csv", "rain.csv")]
    fn resource_paths_resolve_against_the_descriptor(
        #[case] descriptor: &str,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(resolve(descriptor, path), expected);
    }

    #[test]
    fn local_files_are_read_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("datapackage.json");
        fs::write(&path, b"{}").expect("write descriptor");
        let location = format!("file://{}", path.display());
        assert_eq!(UreqFetcher.fetch(&location).expect("reads"), b"{}");
        let missing = dir.path().join("absent.json");
        let err = UreqFetcher
            .fetch(&missing.display().to_string())
            .expect_err("file is absent");
        assert!(matches!(err, FrictionlessError::Io { .. }));
    }
}
