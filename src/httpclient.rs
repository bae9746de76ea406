//! A http client for the SatNOGS Network
//!
//! Provides a http client to the observations API based on reqwest.
//!
//! # Usage
//!
//! ```rust
//! use satnogs_fetch::httpclient;
//! let client = httpclient::Client::new("https://network.satnogs.org").unwrap();
//! async {
//!   println!("{:?}", client.fetch_by_id(13, 12345, false).await);
//! };
//! ```
//!
//! The API is queried anonymously. Requests are sent one after the
//! other, there are no retries and no timeouts.

pub mod data;

use self::data::*;
use crate::data::date_range::DateRange;
use crate::util::file;
use reqwest::ClientBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use snafu::{ResultExt, Snafu};
use std::path::{Path, PathBuf};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const OBSERVATIONS_PATH: &str = "/api/observations/";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("An error was received from {}: {}", url, source))]
    Http { source: reqwest::Error, url: String },

    #[snafu(display("An error occurred creating the http client: {}", source))]
    ClientCreate { source: reqwest::Error },

    #[snafu(display("An error occured reading the response: {}", source))]
    DeserializeResp { source: reqwest::Error },

    #[snafu(display("An error occured reading the response: {}", source))]
    DeserializeJson { source: serde_json::Error },

    #[snafu(display("Cannot determine a file name for '{}': {}", url, source))]
    FileName {
        source: file::FileNameError,
        url: String,
    },

    #[snafu(display("Error creating directory '{}': {}", path.display(), source))]
    CreateDir {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("Error writing file '{}': {}", path.display(), source))]
    WriteFile {
        source: std::io::Error,
        path: PathBuf,
    },
}

/// The observations http client.
///
/// This wraps a reqwest client with methods corresponding to the
/// observation api endpoints and a method for downloading data files.
pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new<S: Into<String>>(api_url: S) -> Result<Client, Error> {
        let url = api_url.into().trim_end_matches('/').to_string();
        log::debug!("Create observations client for: {}", url);
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .build()
            .context(ClientCreateSnafu)?;
        Ok(Client {
            client,
            base_url: url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs a GET request to the given path and classifies the JSON
    /// body. The status code is not checked, because the API sends its
    /// error replies with 404. When `debug` is true, the response is
    /// first decoded into utf8 chars and logged at debug level.
    async fn json_get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        debug: bool,
    ) -> Result<ApiReply<R>, Error> {
        let url = &format!("{}{}", self.base_url, path);
        log::debug!("GET {} {:?}", url, query);
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context(HttpSnafu { url })?;
        let body = if debug {
            let text = resp.text().await.context(DeserializeRespSnafu)?;
            log::debug!("GET {} -> {}", url, text);
            serde_json::from_str::<Value>(&text).context(DeserializeJsonSnafu)?
        } else {
            resp.json::<Value>().await.context(DeserializeRespSnafu)?
        };
        Ok(ApiReply::classify(body))
    }

    /// Queries one page of the observations of a station within a
    /// date range. Pages start at 1.
    pub async fn fetch_by_date(
        &self,
        station_id: u32,
        range: &DateRange,
        page: u32,
        debug: bool,
    ) -> Result<ApiReply<Vec<Observation>>, Error> {
        let query = [
            ("ground_station", station_id.to_string()),
            ("start", range.start_timestamp()),
            ("end", range.end_timestamp()),
            ("format", "json".to_string()),
            ("page", page.to_string()),
        ];
        self.json_get(OBSERVATIONS_PATH, &query, debug).await
    }

    /// Queries a single observation of a station.
    pub async fn fetch_by_id(
        &self,
        station_id: u32,
        observation_id: u64,
        debug: bool,
    ) -> Result<ApiReply<Observation>, Error> {
        let path = format!("{}{}/", OBSERVATIONS_PATH, observation_id);
        let query = [
            ("ground_station", station_id.to_string()),
            ("format", "json".to_string()),
        ];
        self.json_get(&path, &query, debug).await
    }

    /// Downloads `url` into `dir`, naming the file after the last path
    /// segment of the url. The directory is created if necessary and
    /// an existing file is overwritten. Returns the path of the file.
    pub async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf, Error> {
        let name = file::file_name_from_url(url).context(FileNameSnafu { url })?;
        tokio::fs::create_dir_all(dir)
            .await
            .context(CreateDirSnafu { path: dir })?;
        let target = dir.join(name);

        log::debug!("Downloading {} -> {}", url, target.display());
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context(HttpSnafu { url })?;
        if !resp.status().is_success() {
            log::warn!("Got status {} for {}", resp.status(), url);
        }
        let bytes = resp.bytes().await.context(DeserializeRespSnafu)?;
        tokio::fs::write(&target, &bytes)
            .await
            .context(WriteFileSnafu { path: &target })?;
        log::info!("Saved {} ({} bytes)", target.display(), bytes.len());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_by_date_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/observations/"))
            .and(query_param("ground_station", "13"))
            .and(query_param("start", "2018-08-01T00:00:00Z"))
            .and(query_param("end", "2018-08-31T00:00:00Z"))
            .and(query_param("format", "json"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(server.uri()).unwrap();
        let range = DateRange::parse("2018-08-01/2018-08-31").unwrap();
        let reply = client.fetch_by_date(13, &range, 2, false).await.unwrap();
        match reply {
            ApiReply::Data(obs) => assert_eq!(obs[0].id, 7),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_by_id_reads_error_reply() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/observations/99/"))
            .and(query_param("ground_station", "13"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(format!("{}/", server.uri())).unwrap();
        let reply = client.fetch_by_id(13, 99, true).await.unwrap();
        assert_eq!(reply, ApiReply::Known(ApiError::NotFound));
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = Client::new(server.uri()).unwrap();
        let result = client.fetch_by_id(13, 1, true).await;
        assert!(matches!(result, Err(Error::DeserializeJson { .. })));
    }

    #[tokio::test]
    async fn download_creates_dir_and_overwrites() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/data.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x00\x01binary".to_vec()))
            .expect(2)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("12345");
        let client = Client::new(server.uri()).unwrap();
        let url = format!("{}/media/data.bin", server.uri());

        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("data.bin"), b"some much longer stale content").unwrap();

        let first = client.download(&url, &dir).await.unwrap();
        assert_eq!(first, dir.join("data.bin"));
        assert_eq!(std::fs::read(&first).unwrap(), b"\x00\x01binary");

        let second = client.download(&url, &dir).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(std::fs::read(&second).unwrap(), b"\x00\x01binary");
    }

    #[tokio::test]
    async fn download_writes_body_of_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/gone.ogg"))
            .respond_with(ResponseTemplate::new(404).set_body_string("file is gone"))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let client = Client::new(server.uri()).unwrap();
        let url = format!("{}/media/gone.ogg", server.uri());
        let file = client.download(&url, tmp.path()).await.unwrap();
        assert_eq!(file, tmp.path().join("gone.ogg"));
        assert_eq!(std::fs::read_to_string(file).unwrap(), "file is gone");
    }

    #[tokio::test]
    async fn download_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old/waterfall.png"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/new/w.png", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new/w.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let client = Client::new(server.uri()).unwrap();
        let url = format!("{}/old/waterfall.png", server.uri());
        let file = client.download(&url, tmp.path()).await.unwrap();
        assert_eq!(file, tmp.path().join("waterfall.png"));
        assert_eq!(std::fs::read(file).unwrap(), b"png");
    }
}
