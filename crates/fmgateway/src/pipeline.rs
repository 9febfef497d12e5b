//! the file-integration pipeline.
//!
//! a tick-driven worker that drains a drop directory of invoice XML files:
//!
//! ```text
//! discovered -> inprogress -> (parsed -> stamped -> artifacts-saved -> done)
//!                       \-> errored (quarantined)
//! ```
//!
//! moving a file out of `source/` is the serialization point; a file that
//! left `source/` is never picked up again, and every such file ends up in
//! exactly one of `destination/` or `errors/`.

use std::path::Path;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use fmgateway_types::ProcessorConfig;

use crate::blob_store::BlobStore;
use crate::document_service::DocumentService;
use crate::error::ServiceError;

/// disposition of one source file after a tick.
pub struct FileOutcome {
    /// original file name.
    pub file: String,
    /// `Ok` when the artifacts reached `destination/`.
    pub result: Result<(), ServiceError>,
}

/// ticker-driven worker over the source/inprogress/destination/errors
/// directory quartet.
#[derive(Clone)]
pub struct FileWorker<B> {
    config: ProcessorConfig,
    documents: DocumentService<B>,
}

impl<B: BlobStore> FileWorker<B> {
    /// create a worker. directories are created on the first tick (and can
    /// be pre-created with [`FileWorker::ensure_directories`]).
    pub fn new(config: ProcessorConfig, documents: DocumentService<B>) -> Self {
        Self { config, documents }
    }

    /// create the four pipeline directories if missing, mode 0755.
    pub async fn ensure_directories(&self) -> Result<(), ServiceError> {
        for dir in [
            &self.config.source_dir,
            &self.config.inprogress_dir,
            &self.config.destination_dir,
            &self.config.error_dir,
        ] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ServiceError::Pipeline(format!("creating {}: {e}", dir.display())))?;
            // the operator drops files here from another account; don't let
            // a restrictive umask lock them out
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                tokio::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o755))
                    .await
                    .map_err(|e| {
                        ServiceError::Pipeline(format!(
                            "setting permissions on {}: {e}",
                            dir.display()
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// run the worker until `shutdown` flips, spawning one task per tick.
    ///
    /// ticks overlap: a slow batch never delays the next tick, and at-most-
    /// once pickup is guaranteed by the move out of `source/`, not by task
    /// exclusion. on shutdown the worker stops ticking and drains every
    /// in-flight tick task before returning.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        debug!(
            source = %self.config.source_dir.display(),
            inprogress = %self.config.inprogress_dir.display(),
            destination = %self.config.destination_dir.display(),
            errors = %self.config.error_dir.display(),
            interval = ?self.config.interval,
            "file integration worker starting"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut ticks: JoinSet<()> = JoinSet::new();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let worker = self.clone();
                    ticks.spawn(async move {
                        worker.tick().await;
                    });
                    // reap completed tick tasks as we go
                    while ticks.try_join_next().is_some() {}
                }
                _ = shutdown.changed() => {
                    info!("file integration worker cancelled, waiting for active processing to complete");
                    break;
                }
            }
        }

        while ticks.join_next().await.is_some() {}
        info!("file integration worker stopped");
    }

    async fn tick(&self) {
        let outcomes = self.process_pending().await;
        if outcomes.is_empty() {
            debug!("file integration tick completed, no files to process");
            return;
        }

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(
            files_processed = outcomes.len(),
            files_failed = failed,
            "batch complete"
        );
    }

    /// run one full tick: discover eligible files and process them
    /// sequentially. exposed so tests (and operators) can drive a single
    /// pass without the ticker.
    pub async fn process_pending(&self) -> Vec<FileOutcome> {
        if let Err(e) = self.ensure_directories().await {
            error!(error = %e, "cannot prepare pipeline directories");
            return Vec::new();
        }

        let files = match self.source_files().await {
            Ok(files) => files,
            Err(e) => {
                error!(error = %e, source = %self.config.source_dir.display(), "cannot list source directory");
                return Vec::new();
            }
        };

        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let result = self.process_file(&file).await;
            match &result {
                Ok(()) => info!(file, "processed document"),
                Err(e) => error!(file, error = %e, "document processing failed"),
            }
            outcomes.push(FileOutcome { file, result });
        }
        outcomes
    }

    /// list eligible files: direct children of `source/` whose name ends
    /// in `.xml`, case-insensitive.
    async fn source_files(&self) -> Result<Vec<String>, ServiceError> {
        let mut entries = tokio::fs::read_dir(&self.config.source_dir)
            .await
            .map_err(|e| ServiceError::Pipeline(format!("reading source directory: {e}")))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ServiceError::Pipeline(format!("reading directory entry: {e}")))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ServiceError::Pipeline(format!("stat source entry: {e}")))?;
            if file_type.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.to_lowercase().ends_with(".xml") {
                files.push(name);
            }
        }
        files.sort();
        Ok(files)
    }

    /// drive one file through the state machine.
    async fn process_file(&self, name: &str) -> Result<(), ServiceError> {
        let source = self.config.source_dir.join(name);
        let inprogress = self.config.inprogress_dir.join(name);

        // the move out of source/ is the at-most-once point; if it fails
        // the file stays where it is and the tick moves on
        move_file(&source, &inprogress)
            .await
            .map_err(|e| ServiceError::Pipeline(format!("moving {name} to inprogress: {e}")))?;

        match self.handle_inprogress(&inprogress, name).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.quarantine(&inprogress, name, &e).await;
                Err(e)
            }
        }
    }

    async fn handle_inprogress(&self, inprogress: &Path, name: &str) -> Result<(), ServiceError> {
        let bytes = tokio::fs::read(inprogress)
            .await
            .map_err(|e| ServiceError::Pipeline(format!("reading {name}: {e}")))?;

        let invoice = fmgateway_dte::parse_dte(&bytes)?.to_invoice();
        debug!(
            file = name,
            document_type = invoice.document_type,
            issuer = %invoice.issuer.code,
            "parsed invoice"
        );

        let processed = self.documents.process_invoice(&invoice).await?;

        let base = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let dest = &self.config.destination_dir;

        write_artifact(&dest.join(format!("{base}_stamp.xml")), processed.stamp_xml.as_bytes())
            .await?;
        write_artifact(&dest.join(format!("{base}_pdf417.png")), &processed.pdf417_png).await?;
        write_artifact(&dest.join(format!("{base}_thermal.pdf")), &processed.thermal_pdf).await?;

        // the original moves last; its presence in destination/ means the
        // document completed
        move_file(inprogress, &dest.join(name))
            .await
            .map_err(|e| ServiceError::Pipeline(format!("moving {name} to destination: {e}")))?;

        Ok(())
    }

    /// move a failed in-progress file to `errors/`. when even that fails,
    /// remove it - a zombie in `inprogress/` would block nothing, but it
    /// would never be retried either, and it must not look half-processed.
    async fn quarantine(&self, inprogress: &Path, name: &str, cause: &ServiceError) {
        let target = self.config.error_dir.join(name);
        match move_file(inprogress, &target).await {
            Ok(()) => {
                warn!(file = name, error = %cause, "moved failed file to error directory");
            }
            Err(move_err) => {
                error!(
                    file = name,
                    original_error = %cause,
                    move_error = %move_err,
                    "could not quarantine file, removing it"
                );
                if let Err(remove_err) = tokio::fs::remove_file(inprogress).await {
                    error!(file = name, error = %remove_err, "could not remove in-progress file");
                }
            }
        }
    }
}

async fn write_artifact(path: &Path, data: &[u8]) -> Result<(), ServiceError> {
    tokio::fs::write(path, data)
        .await
        .map_err(|e| ServiceError::Pipeline(format!("writing {}: {e}", path.display())))
}

/// move a file, preferring an atomic rename and falling back to
/// copy-then-delete for cross-device moves.
async fn move_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    if tokio::fs::rename(src, dst).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(src, dst).await?;
    tokio::fs::remove_file(src).await
}
