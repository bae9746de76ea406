use assert_cmd::Command;
use std::path::Path;

pub type Result<A> = std::result::Result<A, Box<dyn std::error::Error>>;

pub fn mk_cmd() -> Result<Command> {
    let mut cmd = Command::cargo_bin("satnogs-fetch")?;
    cmd.env_remove("SATNOGS_FETCH_API_URL").env_remove("RUST_LOG");
    Ok(cmd)
}

/// A command that talks to `api_url`, saves below `dir` and reads an
/// empty config file from there.
#[allow(dead_code)]
pub fn mk_cmd_in(api_url: &str, dir: &Path) -> Result<Command> {
    let config = dir.join("config.toml");
    std::fs::write(&config, "")?;
    let mut cmd = mk_cmd()?;
    cmd.arg("--api-url")
        .arg(api_url)
        .arg("--output-dir")
        .arg(dir)
        .arg("--config")
        .arg(config);
    Ok(cmd)
}
