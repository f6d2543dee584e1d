use crate::binary::Binary;

/// Observer for a batch of downloads. Presentation only.
pub trait DownloadProgress {
    /// A batch of `total` downloads is about to start.
    fn start(&mut self, _total: usize) {}

    /// `binary` is about to be downloaded.
    fn advance(&mut self, _binary: &Binary) {}

    /// Every download of the batch succeeded.
    fn finish(&mut self) {}
}

/// Reports nothing.
#[derive(Debug, Default)]
pub struct NoProgress;

impl DownloadProgress for NoProgress {}

/// Reports through `tracing` at info level.
#[derive(Debug, Default)]
pub struct LogProgress {
    done: usize,
    total: usize,
}

impl DownloadProgress for LogProgress {
    fn start(&mut self, total: usize) {
        self.done = 0;
        self.total = total;
        tracing::info!(total, "downloading binaries");
    }

    fn advance(&mut self, binary: &Binary) {
        self.done += 1;
        tracing::info!(
            binary = binary.name(),
            step = self.done,
            total = self.total,
            "downloading"
        );
    }

    fn finish(&mut self) {
        tracing::info!(total = self.total, "binaries downloaded");
    }
}
