use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
pub const API_URL_ENV: &str = "SATNOGS_FETCH_API_URL";
pub const SATNOGS_NETWORK: &str = "https://network.satnogs.org";

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Unable to read config file {}: {}", path.display(), source))]
    ReadFile {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Unable to parse file {}: {}", path.display(), source))]
    ParseFile {
        source: toml::de::Error,
        path: PathBuf,
    },
}

/// Settings that can be kept in a config file instead of being given
/// on every invocation.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// The base url to the SatNOGS Network.
    pub api_url: Option<String>,

    /// The directory where observation folders are created.
    pub output_dir: Option<PathBuf>,
}

impl FetchConfig {
    pub fn read(file: &Path) -> Result<FetchConfig, ConfigError> {
        let cnt = std::fs::read_to_string(file).context(ReadFileSnafu { path: file })?;
        toml::from_str(&cnt).context(ParseFileSnafu { path: file })
    }

    /// Reads the given file, or the default config file if it exists.
    /// Without any file, an empty config is returned.
    pub fn load(explicit: Option<&Path>) -> Result<FetchConfig, ConfigError> {
        match explicit {
            Some(file) => {
                log::debug!("Reading config file {}", file.display());
                FetchConfig::read(file)
            }
            None => match default_config_file() {
                Some(file) if file.exists() => {
                    log::debug!("Reading default config file {}", file.display());
                    FetchConfig::read(&file)
                }
                _ => {
                    log::debug!("No config file found, using defaults");
                    Ok(FetchConfig::default())
                }
            },
        }
    }

    /// Returns the api url: the argument if given, else the
    /// environment variable, else the config value, else the public
    /// SatNOGS Network.
    pub fn api_url(&self, arg: Option<&str>) -> String {
        self.resolve_api_url(arg, std::env::var(API_URL_ENV).ok())
    }

    fn resolve_api_url(&self, arg: Option<&str>, env: Option<String>) -> String {
        match (arg, env, &self.api_url) {
            (Some(u), _, _) => {
                log::debug!("Use api url from arguments: {}", u);
                u.to_string()
            }
            (None, Some(u), _) => {
                log::debug!("Use api url from env {}: {}", API_URL_ENV, u);
                u
            }
            (None, None, Some(u)) => {
                log::debug!("Use api url from config file: {}", u);
                u.clone()
            }
            (None, None, None) => {
                log::debug!("Use api url: {}", SATNOGS_NETWORK);
                SATNOGS_NETWORK.to_string()
            }
        }
    }

    /// Returns the output directory: the argument if given, else the
    /// config value, else the current directory.
    pub fn output_dir(&self, arg: Option<&Path>) -> PathBuf {
        arg.map(Path::to_path_buf)
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("org", "satnogs", "satnogs-fetch").map(|p| p.config_dir().join(CONFIG_FILE))
}

#[test]
fn read_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(
        &file,
        "api_url = \"https://network-dev.satnogs.org\"\noutput_dir = \"/data/satnogs\"\n",
    )
    .unwrap();

    let cfg = FetchConfig::load(Some(&file)).unwrap();
    assert_eq!(
        cfg,
        FetchConfig {
            api_url: Some("https://network-dev.satnogs.org".into()),
            output_dir: Some(PathBuf::from("/data/satnogs")),
        }
    );
}

#[test]
fn explicit_config_must_exist_and_parse() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        FetchConfig::load(Some(&missing)),
        Err(ConfigError::ReadFile { .. })
    ));

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "api_uri = 1\n").unwrap();
    assert!(matches!(
        FetchConfig::load(Some(&bad)),
        Err(ConfigError::ParseFile { .. })
    ));
}

#[test]
fn api_url_precedence() {
    let empty = FetchConfig::default();
    assert_eq!(empty.resolve_api_url(None, None), SATNOGS_NETWORK);

    let cfg = FetchConfig {
        api_url: Some("http://from-config".into()),
        output_dir: None,
    };
    assert_eq!(cfg.resolve_api_url(None, None), "http://from-config");
    assert_eq!(
        cfg.resolve_api_url(None, Some("http://from-env".into())),
        "http://from-env"
    );
    assert_eq!(
        cfg.resolve_api_url(Some("http://from-arg"), Some("http://from-env".into())),
        "http://from-arg"
    );
}

#[test]
fn output_dir_precedence() {
    let empty = FetchConfig::default();
    assert_eq!(empty.output_dir(None), PathBuf::from("."));

    let cfg = FetchConfig {
        api_url: None,
        output_dir: Some(PathBuf::from("/srv/obs")),
    };
    assert_eq!(cfg.output_dir(None), PathBuf::from("/srv/obs"));
    assert_eq!(
        cfg.output_dir(Some(Path::new("here"))),
        PathBuf::from("here")
    );
}
