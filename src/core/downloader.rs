//! Dataset fetching
//!
//! Raw HTTP downloads stream straight to disk and resume with `Range`
//! requests after an interrupted body. Named sources are assembled in
//! memory and written out as CSV.

use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::dataset::{write_csv, UNITED_STATES};
use crate::core::entity::{Entity, EntityKind};
use crate::core::error::{Error, Result};
use crate::core::geo::GeoPoint;
use crate::core::source::{resolve_source, FetchSource, SourceConfig};
use crate::core::stream::{
    create_http_stream, create_memory_stream, DownloadStream, FetchOptions, OverwriteBehavior,
};

/// Retries after the first attempt; only `NetworkError` is retried
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// First backoff delay in milliseconds, doubled on each retry
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Page size requested from the NPS API, large enough for every park
const NPS_PAGE_LIMIT: &str = "1000";

/// Descriptions from the NPS API are cut to this many characters
const NPS_DESCRIPTION_CHARS: usize = 200;

/// Global HTTP client
static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(format!("park-atlas/{}", env!("PARK_ATLAS_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {e}");
            Client::new()
        })
});

/// Run `operation`, retrying transient network failures with backoff
async fn retry_on_network_error<F, Fut, T>(operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(Error::NetworkError(msg)) if attempt < MAX_RETRY_ATTEMPTS => {
                attempt += 1;
                let delay = BASE_RETRY_DELAY_MS * (1 << (attempt - 1));
                warn!("Network error (attempt {attempt}): {msg}. Retrying in {delay}ms...");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Decide whether `file_path` may be written
async fn check_overwrite_permission(file_path: &str, behavior: &OverwriteBehavior) -> Result<bool> {
    if !Path::new(file_path).exists() {
        return Ok(true);
    }

    match behavior {
        OverwriteBehavior::Force => {
            warn!("Overwriting existing file: {file_path}");
            Ok(true)
        }
        OverwriteBehavior::NeverOverwrite => Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("File already exists: {file_path} (use --force to overwrite)"),
        ))),
        OverwriteBehavior::Prompt => {
            eprintln!("⚠️  File already exists: {file_path}");
            eprint!("Overwrite? [y/N]: ");

            use std::io::Write;
            std::io::stderr().flush()?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            match input.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(true),
                _ => Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Interrupted,
                    "Fetch cancelled by user",
                ))),
            }
        }
    }
}

/// Envelope of an NPS `/parks` response
#[derive(Debug, Deserialize)]
struct NpsResponse {
    #[serde(default)]
    data: Vec<NpsPark>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct NpsPark {
    park_code: String,
    full_name: String,
    designation: String,
    states: String,
    latitude: String,
    longitude: String,
    description: String,
    url: String,
}

impl NpsPark {
    fn is_national_park(&self) -> bool {
        self.designation.contains("National Park")
    }

    fn into_entity(self) -> Entity {
        Entity {
            location: GeoPoint::parse(&self.latitude, &self.longitude),
            identifier: self.park_code,
            name: self.full_name,
            kind: EntityKind::Park,
            states: self.states,
            country: UNITED_STATES.to_string(),
            designation: self.designation,
            city: String::new(),
            description: self.description.chars().take(NPS_DESCRIPTION_CHARS).collect(),
            url: self.url,
        }
    }
}

/// High-level fetcher that handles all source types
pub struct Downloader {
    config: SourceConfig,
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

impl Downloader {
    /// Downloader for the public NPS endpoint with the demo key
    pub fn new() -> Self {
        Self {
            config: SourceConfig::default(),
        }
    }

    /// Downloader with explicit source URLs and API key
    pub fn with_config(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Fetch a source to a file
    pub async fn fetch_to_file(&self, source: &str, file_path: &str, options: &FetchOptions) -> Result<()> {
        let fetch_source = resolve_source(source, &self.config)?;

        check_overwrite_permission(file_path, &options.overwrite).await?;

        match fetch_source {
            FetchSource::Http { url } => self.download_http_to_file(&url, file_path, options).await,
            FetchSource::NpsParks { url, api_key } => {
                let parks = self.fetch_nps_parks(&url, &api_key).await?;
                write_bytes(file_path, &entities_to_csv(&parks)?, options).await
            }
            FetchSource::Builtin(table) => write_bytes(file_path, table.csv().as_bytes(), options).await,
        }
    }

    /// Fetch a source and return a stream with its size (0 when unknown)
    pub async fn fetch_stream(&self, source: &str) -> Result<(DownloadStream, u64)> {
        match resolve_source(source, &self.config)? {
            FetchSource::Http { url } => self.open_http_stream(&url).await,
            FetchSource::NpsParks { url, api_key } => {
                let parks = self.fetch_nps_parks(&url, &api_key).await?;
                let data = entities_to_csv(&parks)?;
                let len = data.len() as u64;
                Ok((create_memory_stream(data), len))
            }
            FetchSource::Builtin(table) => {
                let data = table.csv().as_bytes().to_vec();
                let len = data.len() as u64;
                Ok((create_memory_stream(data), len))
            }
        }
    }

    /// Query the NPS parks API and keep the national parks
    pub async fn fetch_nps_parks(&self, url: &str, api_key: &str) -> Result<Vec<Entity>> {
        let client = &*GLOBAL_CLIENT;
        info!("Fetching parks from {url}");

        let body = retry_on_network_error(|| async {
            let response = client
                .get(url)
                .query(&[("limit", NPS_PAGE_LIMIT), ("api_key", api_key)])
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(create_helpful_http_error(url, response.status()));
            }
            Ok(response.bytes().await?)
        })
        .await?;

        let response: NpsResponse = serde_json::from_slice(&body)?;
        let received = response.data.len();
        let parks: Vec<Entity> = response
            .data
            .into_iter()
            .filter(NpsPark::is_national_park)
            .map(NpsPark::into_entity)
            .collect();

        info!("Kept {} national parks out of {received} API records", parks.len());
        Ok(parks)
    }

    /// Open a streaming GET, with the size from a HEAD request when available
    async fn open_http_stream(&self, url: &str) -> Result<(DownloadStream, u64)> {
        let client = &*GLOBAL_CLIENT;
        let (total_size, _) = probe(client, url).await?;

        let response = retry_on_network_error(|| async {
            let response = client.get(url).send().await?;
            if !response.status().is_success() {
                return Err(create_helpful_http_error(url, response.status()));
            }
            Ok(response)
        })
        .await?;

        Ok((create_http_stream(response), total_size.unwrap_or(0)))
    }

    /// Raw URL download into `file_path`
    ///
    /// A failed download removes the file so that no partial CSV is left
    /// for a later `--no-clobber` run to trip over.
    async fn download_http_to_file(&self, url: &str, file_path: &str, options: &FetchOptions) -> Result<()> {
        let client = &*GLOBAL_CLIENT;
        let (total_size, supports_ranges) = probe(client, url).await?;

        let file = tokio::fs::File::create(file_path).await?;
        let result = self
            .download_single_resilient(client, url, Box::new(file), total_size, supports_ranges, options)
            .await;

        if let Err(e) = result {
            warn!("Removing incomplete {file_path}");
            if let Err(remove_err) = tokio::fs::remove_file(file_path).await {
                debug!("Could not remove {file_path}: {remove_err}");
            }
            return Err(e);
        }

        info!("Saved {url} to {file_path}");
        Ok(())
    }

    /// One connection, resumed with `Range` requests after a short read
    async fn download_single_resilient(
        &self,
        client: &Client,
        url: &str,
        mut writer: Box<dyn AsyncWrite + Send + Unpin>,
        total_size: Option<u64>,
        supports_ranges: bool,
        options: &FetchOptions,
    ) -> Result<()> {
        let mut downloaded = 0u64;
        let mut resumes = 0;

        loop {
            let stream = if downloaded == 0 {
                retry_on_network_error(|| async {
                    let response = client.get(url).send().await?;
                    if !response.status().is_success() {
                        return Err(create_helpful_http_error(url, response.status()));
                    }
                    Ok(create_http_stream(response))
                })
                .await?
            } else if supports_ranges {
                retry_on_network_error(|| async {
                    let range_header = format!("bytes={downloaded}-");
                    let response = client.get(url).header("Range", range_header).send().await?;
                    if response.status() != StatusCode::PARTIAL_CONTENT {
                        return Err(Error::HttpError(format!(
                            "Range request failed: {}",
                            response.status()
                        )));
                    }
                    Ok(create_http_stream(response))
                })
                .await?
            } else {
                return Err(Error::NetworkError(
                    "Cannot resume download - server doesn't support ranges".to_string(),
                ));
            };

            match self
                .stream_to_writer_resilient(stream, &mut writer, total_size, &mut downloaded, options)
                .await
            {
                Ok(()) => break,
                Err(Error::NetworkError(msg)) if resumes < MAX_RETRY_ATTEMPTS => {
                    resumes += 1;
                    warn!("Stream interrupted at {downloaded} bytes ({msg}), resuming...");
                }
                Err(e) => return Err(e),
            }
        }

        writer.flush().await?;
        Ok(())
    }

    /// Copy a stream into the writer; a short or failed read is a network error
    async fn stream_to_writer_resilient(
        &self,
        mut stream: DownloadStream,
        writer: &mut Box<dyn AsyncWrite + Send + Unpin>,
        total_size: Option<u64>,
        downloaded: &mut u64,
        options: &FetchOptions,
    ) -> Result<()> {
        let mut buffer = vec![0u8; options.buffer_size];

        loop {
            let bytes_read = stream
                .read(&mut buffer)
                .await
                .map_err(|e| Error::NetworkError(format!("Stream read error: {e}")))?;

            if bytes_read == 0 {
                break;
            }

            writer.write_all(&buffer[..bytes_read]).await?;
            *downloaded += bytes_read as u64;

            if let Some(ref progress) = options.progress {
                progress(*downloaded, total_size.unwrap_or(*downloaded));
            }
        }

        match total_size {
            Some(total) if *downloaded < total => Err(Error::NetworkError(format!(
                "Stream ended after {downloaded} of {total} bytes"
            ))),
            _ => Ok(()),
        }
    }
}

/// HEAD request for size and range support
///
/// Servers that reject HEAD are downloaded without size or resume.
async fn probe(client: &Client, url: &str) -> Result<(Option<u64>, bool)> {
    let head_response =
        retry_on_network_error(|| async { Ok::<_, Error>(client.head(url).send().await?) }).await?;

    let status = head_response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(create_helpful_http_error(url, status));
    }
    if !status.is_success() {
        debug!("HEAD {url} returned {status}, continuing without size");
        return Ok((None, false));
    }

    let total_size = head_response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let supports_ranges = head_response
        .headers()
        .get("accept-ranges")
        .is_some_and(|v| v.to_str().unwrap_or("") == "bytes");

    Ok((total_size, supports_ranges && total_size.is_some()))
}

fn entities_to_csv(entities: &[Entity]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(&mut buf, entities)?;
    Ok(buf)
}

async fn write_bytes(file_path: &str, data: &[u8], options: &FetchOptions) -> Result<()> {
    tokio::fs::write(file_path, data).await?;
    if let Some(ref progress) = options.progress {
        let len = data.len() as u64;
        progress(len, len);
    }
    info!("Wrote {} bytes to {file_path}", data.len());
    Ok(())
}

/// Create a helpful HTTP error, pointing at the likely cause
fn create_helpful_http_error(url: &str, status: StatusCode) -> Error {
    let message = match status {
        StatusCode::NOT_FOUND => format!("Not found ({status}): {url}. Check the URL"),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => format!(
            "Access denied ({status}): {url}. Check nps_api_key in the [sources] configuration"
        ),
        StatusCode::TOO_MANY_REQUESTS => format!(
            "Rate limited ({status}): {url}. DEMO_KEY is heavily rate limited, configure your own nps_api_key"
        ),
        _ => format!("Request failed ({status}): {url}"),
    };
    Error::HttpError(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;
    use tempfile::{tempdir, NamedTempFile};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::core::dataset::{load_canadian_parks, load_us_parks, BuiltinTable, CANADA};

    fn nps_payload() -> serde_json::Value {
        serde_json::json!({
            "total": "3",
            "limit": "1000",
            "start": "0",
            "data": [
                {
                    "parkCode": "yell",
                    "fullName": "Yellowstone National Park",
                    "designation": "National Park",
                    "states": "ID,MT,WY",
                    "latitude": "44.59824417",
                    "longitude": "-110.5471695",
                    "description": "x".repeat(300),
                    "url": "https://www.nps.gov/yell/index.htm"
                },
                {
                    "parkCode": "deto",
                    "fullName": "Devils Tower National Monument",
                    "designation": "National Monument",
                    "states": "WY",
                    "latitude": "44.59",
                    "longitude": "-104.71",
                    "description": "Tower",
                    "url": "https://www.nps.gov/deto/index.htm"
                },
                {
                    "parkCode": "wrst",
                    "fullName": "Wrangell - St Elias National Park & Preserve",
                    "designation": "National Park & Preserve",
                    "states": "AK",
                    "latitude": "",
                    "longitude": "",
                    "url": "https://www.nps.gov/wrst/index.htm"
                }
            ]
        })
    }

    async fn mount_nps(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/parks"))
            .and(query_param("api_key", "TEST_KEY"))
            .and(query_param("limit", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(nps_payload()))
            .mount(server)
            .await;
    }

    fn nps_downloader(server: &MockServer) -> Downloader {
        Downloader::with_config(SourceConfig {
            nps_api_url: format!("{}/parks", server.uri()),
            nps_api_key: "TEST_KEY".to_string(),
        })
    }

    #[tokio::test]
    async fn test_resilient_download() {
        let mock_server = MockServer::start().await;
        let test_data = b"Id,Name\n".repeat(128);
        let total_size = test_data.len() as u64;

        let get_call_count = Arc::new(AtomicUsize::new(0));

        Mock::given(method("HEAD"))
            .and(path("/parks.csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-length", total_size.to_string().as_str())
                    .insert_header("accept-ranges", "bytes"),
            )
            .mount(&mock_server)
            .await;

        let get_count_clone = Arc::clone(&get_call_count);
        let body = test_data.clone();
        Mock::given(method("GET"))
            .and(path("/parks.csv"))
            .respond_with(move |_: &wiremock::Request| {
                get_count_clone.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(200).set_body_raw(body.clone(), "text/csv")
            })
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("parks.csv");
        let file_path = file_path.to_str().unwrap();

        let last_progress = Arc::new(AtomicU64::new(0));
        let progress_clone = Arc::clone(&last_progress);
        let options = FetchOptions {
            progress: Some(Arc::new(move |done, _total| {
                progress_clone.store(done, Ordering::SeqCst);
            })),
            ..Default::default()
        };

        let url = format!("{}/parks.csv", mock_server.uri());
        Downloader::new()
            .fetch_to_file(&url, file_path, &options)
            .await
            .unwrap();

        assert_eq!(std::fs::read(file_path).unwrap(), test_data);
        assert_eq!(get_call_count.load(Ordering::SeqCst), 1);
        assert_eq!(last_progress.load(Ordering::SeqCst), total_size);
    }

    #[tokio::test]
    async fn test_resume_with_range_request() {
        let mock_server = MockServer::start().await;
        let full = b"0123456789abcdefghij".to_vec();

        Mock::given(method("HEAD"))
            .and(path("/data.csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-length", "20")
                    .insert_header("accept-ranges", "bytes"),
            )
            .mount(&mock_server)
            .await;

        // The ranged mock is mounted first so it takes precedence
        Mock::given(method("GET"))
            .and(path("/data.csv"))
            .and(header("Range", "bytes=10-"))
            .respond_with(ResponseTemplate::new(206).set_body_raw(full[10..].to_vec(), "text/csv"))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/data.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(full[..10].to_vec(), "text/csv"))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("data.csv");
        let file_path = file_path.to_str().unwrap();

        let url = format!("{}/data.csv", mock_server.uri());
        Downloader::new()
            .fetch_to_file(&url, file_path, &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(std::fs::read(file_path).unwrap(), full);
    }

    #[tokio::test]
    async fn test_not_found_is_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/missing.csv"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing.csv");
        let url = format!("{}/missing.csv", mock_server.uri());

        let err = Downloader::new()
            .fetch_to_file(&url, file_path.to_str().unwrap(), &FetchOptions::default())
            .await
            .unwrap_err();
        match err {
            Error::HttpError(msg) => assert!(msg.contains("Not found")),
            other => panic!("Expected HttpError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_nps_parks_filters_and_maps() {
        let mock_server = MockServer::start().await;
        mount_nps(&mock_server).await;

        let url = format!("{}/parks", mock_server.uri());
        let parks = Downloader::new().fetch_nps_parks(&url, "TEST_KEY").await.unwrap();

        let codes: Vec<&str> = parks.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(codes, vec!["yell", "wrst"]);

        let yell = &parks[0];
        assert_eq!(yell.name, "Yellowstone National Park");
        assert_eq!(yell.states, "ID,MT,WY");
        assert_eq!(yell.country, UNITED_STATES);
        assert_eq!(yell.description.chars().count(), NPS_DESCRIPTION_CHARS);
        assert!(yell.location.is_some());

        assert!(parks[1].location.is_none());
        assert_eq!(parks[1].description, "");
    }

    #[tokio::test]
    async fn test_fetch_nps_parks_to_csv_file() {
        let mock_server = MockServer::start().await;
        mount_nps(&mock_server).await;

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("national_parks.csv");

        nps_downloader(&mock_server)
            .fetch_to_file("nps-parks", file_path.to_str().unwrap(), &FetchOptions::default())
            .await
            .unwrap();

        let parks = load_us_parks(&file_path).unwrap();
        assert_eq!(parks.len(), 2);
        assert_eq!(parks[0].identifier, "yell");
        assert_eq!(parks[0].designation, "National Park");
        assert_eq!(parks[0].url, "https://www.nps.gov/yell/index.htm");
    }

    #[tokio::test]
    async fn test_fetch_nps_rejects_bad_key() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/parks"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let url = format!("{}/parks", mock_server.uri());
        let err = Downloader::new().fetch_nps_parks(&url, "WRONG").await.unwrap_err();
        assert!(err.to_string().contains("nps_api_key"));
    }

    #[tokio::test]
    async fn test_fetch_builtin_airports() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("major_airports.csv");

        Downloader::new()
            .fetch_to_file("airports", file_path.to_str().unwrap(), &FetchOptions::default())
            .await
            .unwrap();

        let written = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(written, BuiltinTable::MajorAirports.csv());
    }

    #[tokio::test]
    async fn test_fetch_canadian_parks_reads_back() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("canadian_parks.csv");

        Downloader::new()
            .fetch_to_file("canada-parks", file_path.to_str().unwrap(), &FetchOptions::default())
            .await
            .unwrap();

        let parks = load_canadian_parks(&file_path).unwrap();
        assert_eq!(parks.len(), 43);
        assert!(parks.iter().all(|p| p.country == CANADA));
        assert_eq!(parks[0].identifier, "banff");
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_file() {
        let mock_server = MockServer::start().await;
        let full = b"0123456789abcdefghij".to_vec();

        // Advertised size without range support, so the short body cannot resume
        Mock::given(method("HEAD"))
            .and(path("/short.csv"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-length", "20"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/short.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(full[..10].to_vec(), "text/csv"))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("short.csv");
        let url = format!("{}/short.csv", mock_server.uri());

        let err = Downloader::new()
            .fetch_to_file(&url, file_path.to_str().unwrap(), &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NetworkError(_)));
        assert!(!file_path.exists());

        // Nothing left behind for no-clobber to refuse
        let options = FetchOptions {
            overwrite: OverwriteBehavior::NeverOverwrite,
            ..Default::default()
        };
        Downloader::new()
            .fetch_to_file("airports", file_path.to_str().unwrap(), &options)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fetch_stream_builtin_airports() {
        let (mut stream, len) = Downloader::new()
            .fetch_stream("airports")
            .await
            .unwrap();

        let mut out = String::new();
        stream.read_to_string(&mut out).await.unwrap();
        assert_eq!(len, out.len() as u64);
        assert!(out.starts_with("IATA,Name,City,State,Country,Latitude,Longitude"));
    }

    #[tokio::test]
    async fn test_unknown_source_fails_before_touching_disk() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("out.csv");

        let err = Downloader::new()
            .fetch_to_file("airprots", file_path.to_str().unwrap(), &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SourceNotFound { .. }));
        assert!(!file_path.exists());
    }

    #[tokio::test]
    async fn test_network_errors_back_off_then_succeed() {
        let start_time = Instant::now();
        let call_count = Arc::new(AtomicUsize::new(0));

        let result = retry_on_network_error(|| {
            let count_clone = Arc::clone(&call_count);
            async move {
                let call_num = count_clone.fetch_add(1, Ordering::SeqCst) + 1;
                if call_num <= 2 {
                    Err(Error::NetworkError("Simulated network failure".to_string()))
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff
        assert!(start_time.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_retry_does_not_repeat_http_errors() {
        let call_count = Arc::new(AtomicUsize::new(0));

        let result: Result<()> = retry_on_network_error(|| {
            let count_clone = Arc::clone(&call_count);
            async move {
                count_clone.fetch_add(1, Ordering::SeqCst);
                Err(Error::HttpError("418".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(Error::HttpError(_))));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_allows_existing_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let file_path = temp_file.path().to_str().unwrap();
        std::fs::write(file_path, "existing content").unwrap();

        let result = check_overwrite_permission(file_path, &OverwriteBehavior::Force).await;
        assert!(result.unwrap());
    }

    #[tokio::test]
    async fn test_no_clobber_rejects_existing_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let file_path = temp_file.path().to_str().unwrap();
        std::fs::write(file_path, "existing content").unwrap();

        let error = check_overwrite_permission(file_path, &OverwriteBehavior::NeverOverwrite)
            .await
            .unwrap_err();
        match error {
            Error::Io(io_err) => {
                assert_eq!(io_err.kind(), std::io::ErrorKind::AlreadyExists);
                assert!(io_err.to_string().contains("use --force to overwrite"));
            }
            other => panic!("Expected Io error with AlreadyExists kind, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_file_needs_no_permission() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("nonexistent.csv");
        let file_path_str = file_path.to_str().unwrap();

        for behavior in [
            OverwriteBehavior::Force,
            OverwriteBehavior::NeverOverwrite,
            OverwriteBehavior::Prompt,
        ] {
            assert!(check_overwrite_permission(file_path_str, &behavior).await.unwrap());
        }
    }
}
