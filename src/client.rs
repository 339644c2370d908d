use std::{
    fs, io,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::{
    container::Assembler,
    domain::{Config, Extension, Header, Topic},
    schema::{HeaderRecord, TopicRecord},
    worker::{BuildFailure, Request, Response, Transport, TransportError},
};

/// Somewhere finished containers can be written to.
pub trait Saver {
    /// Saves `bytes` under `file_name`, returning where they ended up.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be written.
    fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Saves containers into a directory, replacing any file of the same name.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    root: PathBuf,
}

impl DirectorySaver {
    /// A saver writing into `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The target directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Saver for DirectorySaver {
    fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(file_name);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// A container that has been written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedContainer {
    /// Where the container was saved.
    pub path: PathBuf,
    /// Size of the archive in bytes.
    pub size: usize,
    /// Hex-encoded SHA-256 digest of the archive.
    pub sha256: String,
}

/// Errors creating a container.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The worker could not be reached.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The worker rejected the build.
    #[error("failed to build container: {0}")]
    Build(#[from] BuildFailure),

    /// The container was built but could not be saved.
    #[error("failed to save container: {0}")]
    Save(#[source] io::Error),
}

/// Builds containers on a background worker and saves them.
///
/// The worker lives as long as the client.
#[derive(Debug)]
pub struct Client<S = DirectorySaver> {
    transport: Transport,
    saver: S,
    extension: Extension,
}

impl<S: Saver> Client<S> {
    /// Starts a worker configured by `config` and checks it is alive.
    ///
    /// # Errors
    ///
    /// Fails if the worker cannot be started or does not answer the
    /// handshake.
    #[instrument(skip_all)]
    pub fn new(config: &Config, saver: S) -> Result<Self, ClientError> {
        let transport = Transport::spawn(Assembler::new(config.clone()))?;
        transport.handshake()?;
        tracing::info!("worker handshake confirmed");

        Ok(Self {
            transport,
            saver,
            extension: config.extension,
        })
    }

    /// The file name containers are saved under.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.extension.download_name()
    }

    /// Builds a container from `topics` and saves it.
    ///
    /// The topics are copied before they are handed to the worker, so the
    /// caller's state is never shared with a build.
    ///
    /// # Errors
    ///
    /// Fails if the worker rejects the build or the archive cannot be saved.
    #[instrument(skip_all, fields(topics = topics.len()))]
    pub fn create_container(
        &self,
        topics: &[Topic],
        header: &Header,
    ) -> Result<SavedContainer, ClientError> {
        let records = topics.iter().map(TopicRecord::from).collect();
        self.create_container_from_records(records, HeaderRecord::from(header))
    }

    /// Builds a container from unvalidated records and saves it.
    ///
    /// # Errors
    ///
    /// Fails if the worker rejects the build or the archive cannot be saved.
    pub fn create_container_from_records(
        &self,
        topics: Vec<TopicRecord>,
        header: HeaderRecord,
    ) -> Result<SavedContainer, ClientError> {
        let data = self.build(topics, header)?;

        let path = self
            .saver
            .save(&self.file_name(), &data)
            .map_err(ClientError::Save)?;
        let sha256 = format!("{:x}", Sha256::digest(&data));
        tracing::info!(path = %path.display(), size = data.len(), "saved container");

        Ok(SavedContainer {
            path,
            size: data.len(),
            sha256,
        })
    }

    /// Builds a container without saving it.
    ///
    /// # Errors
    ///
    /// Fails if the worker rejects the build.
    pub fn build(
        &self,
        topics: Vec<TopicRecord>,
        header: HeaderRecord,
    ) -> Result<Vec<u8>, ClientError> {
        match self.transport.request(Request::Begin { topics, header })? {
            Response::Begin { data } => Ok(data),
            Response::Error { error } => Err(error.into()),
            other @ Response::Test { .. } => Err(TransportError::UnexpectedReply {
                expected: "begin",
                actual: other.tag(),
            }
            .into()),
        }
    }
}
