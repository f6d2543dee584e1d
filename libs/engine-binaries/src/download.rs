use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::binary::Binary;
use crate::error::BinaryError;

/// Fetch `binary` and persist it at its cached path.
///
/// `.gz` payloads are decompressed. The file is written next to the target
/// and renamed into place, so an interrupted download never leaves a
/// truncated binary behind.
pub(crate) async fn download(http: &reqwest::Client, binary: &Binary) -> Result<(), BinaryError> {
    let url = binary.url();
    tracing::debug!(binary = binary.name(), url, "downloading binary");

    let resp = http
        .get(url)
        .send()
        .await
        .map_err(|e| BinaryError::download(binary.name(), format!("request {url}: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(BinaryError::download(binary.name(), format!("{url} responded {status}")));
    }

    let body = resp
        .bytes()
        .await
        .map_err(|e| BinaryError::download(binary.name(), format!("read {url}: {e}")))?;

    let payload = if url.ends_with(".gz") {
        gunzip(&body).map_err(|e| BinaryError::download(binary.name(), format!("gzip decompress: {e}")))?
    } else {
        body.to_vec()
    };

    write_executable(binary.cached_path(), &payload).await?;
    tracing::info!(
        binary = binary.name(),
        path = %binary.cached_path().display(),
        bytes = payload.len(),
        "downloaded binary"
    );
    Ok(())
}

fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

/// Write `data` to `{path}.part`, mark it executable and rename it onto `path`.
/// The partial file is removed if any step fails.
async fn write_executable(path: &Path, data: &[u8]) -> Result<(), BinaryError> {
    let partial = partial_path(path);
    let result = persist(&partial, path, data).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    result
}

async fn persist(partial: &Path, path: &Path, data: &[u8]) -> Result<(), BinaryError> {
    tokio::fs::write(partial, data)
        .await
        .map_err(|e| BinaryError::io(partial, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(partial, std::fs::Permissions::from_mode(0o755))
            .await
            .map_err(|e| BinaryError::io(partial, e))?;
    }

    tokio::fs::rename(partial, path)
        .await
        .map_err(|e| BinaryError::io(path, e))
}

/// `{path}.part`. Appended rather than swapped in: platform names contain dots.
fn partial_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
