use std::io::Write;

use engine_binaries::{Binary, BinaryCache, BinaryStatus, DownloadProgress};

use crate::config::{CacheArgs, FetchArgs, effective_config};
use crate::error::CliError;

pub async fn fetch(cache_args: &CacheArgs, args: &FetchArgs) -> Result<(), CliError> {
    let cfg = effective_config(cache_args)?;
    let cache = BinaryCache::new(&cfg)?;
    tracing::debug!(dir = %cache.cache_dir().display(), force = args.force, "fetching binaries");

    let mut bar = ProgressBar::new(std::io::stderr());
    let dir = cache.fetch(args.force, &mut bar).await?;
    println!("Downloaded binaries to {}", dir.display());
    Ok(())
}

pub fn remove(cache_args: &CacheArgs) -> Result<(), CliError> {
    let cfg = effective_config(cache_args)?;
    let cache = BinaryCache::new(&cfg)?;
    cache.remove_all()?;
    println!("Removed cached binaries from {}", cache.cache_dir().display());
    Ok(())
}

pub fn status(cache_args: &CacheArgs) -> Result<(), CliError> {
    let cfg = effective_config(cache_args)?;
    let cache = BinaryCache::new(&cfg)?;
    println!("cache: {}", cache.cache_dir().display());
    for entry in cache.status()? {
        println!("{}", status_line(&entry));
    }
    Ok(())
}

fn status_line(entry: &BinaryStatus) -> String {
    match &entry.override_path {
        Some(path) => format!("{:<22} override  {}", entry.name, path.display()),
        None if entry.cached => format!("{:<22} cached    {}", entry.name, entry.cached_path.display()),
        None => format!("{:<22} missing   {}", entry.name, entry.cached_path.display()),
    }
}

// ═══════════════════════════════════════════════════════════════
//  Progress bar
// ═══════════════════════════════════════════════════════════════

const BAR_WIDTH: usize = 30;

/// `Downloading binaries [######      ] 2/5 migration-engine`, redrawn in place.
struct ProgressBar<W: Write> {
    out: W,
    done: usize,
    total: usize,
}

impl<W: Write> ProgressBar<W> {
    fn new(out: W) -> Self {
        Self { out, done: 0, total: 0 }
    }

    fn draw(&mut self, label: &str) {
        let filled = if self.total == 0 { BAR_WIDTH } else { BAR_WIDTH * self.done / self.total };
        let bar = format!("{}{}", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled));
        // Write errors are ignored, the bar never fails a download.
        let _ = write!(self.out, "\rDownloading binaries [{bar}] {}/{} {label:<22}", self.done, self.total);
        let _ = self.out.flush();
    }
}

impl<W: Write> DownloadProgress for ProgressBar<W> {
    fn start(&mut self, total: usize) {
        self.done = 0;
        self.total = total;
        self.draw("");
    }

    fn advance(&mut self, binary: &Binary) {
        self.done += 1;
        self.draw(binary.name());
    }

    fn finish(&mut self) {
        let _ = writeln!(self.out);
    }
}
