use snafu::{OptionExt, ResultExt, Snafu};
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, PartialEq, Snafu)]
pub enum FileNameError {
    #[snafu(display("Not a valid url: {}", source))]
    UrlParse { source: url::ParseError },

    #[snafu(display("The url has no file name"))]
    NoFileName,
}

/// Returns the last path segment of `url`, which is used as the local
/// file name. Query and fragment are not part of it.
pub fn file_name_from_url(url: &str) -> Result<String, FileNameError> {
    let url = Url::parse(url).context(UrlParseSnafu)?;
    url.path_segments()
        .and_then(|mut segs| segs.next_back())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
        .context(NoFileNameSnafu)
}

/// The directory holding all files of one observation.
pub fn observation_dir(root: &Path, observation_id: u64) -> PathBuf {
    root.join(observation_id.to_string())
}

#[test]
fn file_name_is_last_segment() {
    assert_eq!(
        file_name_from_url("http://x/data.bin").unwrap(),
        "data.bin"
    );
    assert_eq!(
        file_name_from_url("https://network.satnogs.org/media/data_obs/12345/waterfall_12345.png")
            .unwrap(),
        "waterfall_12345.png"
    );
    assert_eq!(
        file_name_from_url("https://s3.example.com/bucket/audio.ogg?X-Amz-Expires=60#frag").unwrap(),
        "audio.ogg"
    );
}

#[test]
fn file_name_missing() {
    assert_eq!(
        file_name_from_url("http://x/media/"),
        Err(FileNameError::NoFileName)
    );
    assert_eq!(file_name_from_url("http://x"), Err(FileNameError::NoFileName));
    assert!(matches!(
        file_name_from_url("data.bin"),
        Err(FileNameError::UrlParse { .. })
    ));
}

#[test]
fn observation_dir_is_named_by_id() {
    assert_eq!(
        observation_dir(Path::new("out"), 12345),
        PathBuf::from("out/12345")
    );
}
