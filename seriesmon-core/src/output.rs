//! Output backends for emitting registry snapshots after each tick.

use std::path::PathBuf;

use seriesmon_types::SeriesSnapshot;

/// Destination for the snapshots taken after every collection tick.
#[derive(Debug)]
pub enum Output {
    /// Write snapshots to a JSON file.
    ///
    /// The file is overwritten with each tick's snapshots.
    File(PathBuf),

    /// Send snapshots through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    #[cfg(feature = "tokio")]
    Channel(tokio::sync::mpsc::Sender<Vec<SeriesSnapshot>>),
}

impl Output {
    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use seriesmon_core::Output;
    ///
    /// let output = Output::file("series.json");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use seriesmon_core::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive snapshots
    /// // while let Some(snapshots) = rx.recv().await {
    /// //     println!("Got {} series", snapshots.len());
    /// // }
    /// ```
    #[cfg(feature = "tokio")]
    pub fn channel(
        buffer: usize,
    ) -> (Self, tokio::sync::mpsc::Receiver<Vec<SeriesSnapshot>>) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Emit snapshots to this output.
    #[cfg(feature = "tokio")]
    pub(crate) async fn emit(&self, snapshots: &[SeriesSnapshot]) -> std::io::Result<()> {
        match self {
            Output::File(path) => {
                let json = serde_json::to_string_pretty(snapshots)?;
                tokio::fs::write(path, json).await?;
            }
            Output::Channel(tx) => {
                // Best effort send (don't block if channel is full)
                let _ = tx.try_send(snapshots.to_vec());
            }
        }
        Ok(())
    }
}
