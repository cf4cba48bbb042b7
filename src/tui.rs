use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::LazyLock;
use std::time::Duration;

static BARS: LazyLock<MultiProgress> = LazyLock::new(MultiProgress::new);

/// Console log sink that hides the progress bars while a line is printed, so
/// log output and bar redraws never interleave.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleWriter;

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BARS.suspend(|| io::stderr().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Per-brand progress line: a bar when the page count is known, a spinner
/// otherwise.
pub struct BrandProgress {
    bar: ProgressBar,
    listings: usize,
}

impl BrandProgress {
    pub fn counted(brand: &str, total_pages: u32, visible: bool) -> Self {
        let bar = if visible {
            BARS.add(ProgressBar::new(u64::from(total_pages)))
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template("{prefix:>12} [{bar:30.cyan/blue}] {pos}/{len} pages {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self::start(bar, brand)
    }

    pub fn open_ended(brand: &str, visible: bool) -> Self {
        let bar = if visible {
            BARS.add(ProgressBar::new_spinner())
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template("{prefix:>12} {spinner} page {pos} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self::start(bar, brand)
    }

    fn start(bar: ProgressBar, brand: &str) -> Self {
        bar.set_prefix(brand.to_string());
        bar.set_message("0 listings");
        Self { bar, listings: 0 }
    }

    pub fn page_done(&mut self, listings: usize) {
        self.listings += listings;
        self.bar.inc(1);
        self.bar.set_message(format!("{} listings", self.listings));
    }

    /// Stops the bar and drops it from the display; the brand summary is
    /// logged by the caller.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
        BARS.remove(&self.bar);
    }
}
