//! Discovery of the Discord IPC endpoint.
//!
//! Discord listens on `discord-ipc-<n>` for `n` in `0..=9`; when several
//! client instances run, each takes the lowest free index. Endpoints are
//! probed in index order so the lowest live index always wins.
//!
//! Two endpoint families exist, selected once by [`Platform::detect`]:
//!
//! - **Socket files** (Linux/macOS): `<dir>/discord-ipc-<n>` for each
//!   candidate directory taken from `XDG_RUNTIME_DIR`, `TMPDIR`, `TMP`,
//!   `TEMP` and `/tmp`, each also probed under the Snap and Flatpak
//!   sandbox subdirectories. A path is only dialled when it exists.
//! - **Named pipes** (Windows): `\\.\pipe\discord-ipc-<n>`. There is no
//!   existence pre-check; the connect attempt is the probe.
//!
//! Both families are dialled through `interprocess` local sockets and handed
//! back as a boxed [`Channel`], so the rest of the crate never sees which
//! family was used.

use std::path::{Path, PathBuf};

use interprocess::local_socket::tokio::Stream as LocalSocketStream;
use interprocess::local_socket::traits::tokio::Stream as _;
use interprocess::local_socket::{GenericFilePath, ToFsName};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::{AppError, Result};

/// Number of endpoint indices probed (`discord-ipc-0` … `discord-ipc-9`).
pub const ENDPOINT_COUNT: u8 = 10;

/// Environment variables naming candidate socket directories, in priority order.
pub const SOCKET_DIR_VARS: [&str; 4] = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"];

/// Last-resort socket directory.
const FALLBACK_SOCKET_DIR: &str = "/tmp";

/// Sub-directories probed under each socket directory: plain, Snap, Flatpak.
pub const SANDBOX_SUBPATHS: [&str; 3] = ["", "snap.discord", "app/com.discordapp.Discord"];

/// Bidirectional byte channel to the peer.
///
/// Reading, writing and closing (`AsyncWriteExt::shutdown`) are all the
/// crate needs; any tokio duplex stream qualifies.
pub trait Channel: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Channel for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Owned, type-erased channel.
pub type BoxedChannel = Box<dyn Channel>;

/// Endpoint naming convention of the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    /// Unix-domain socket files under the listed directories.
    SocketFile {
        /// Candidate directories in probe order.
        dirs: Vec<PathBuf>,
    },
    /// Windows named pipes.
    NamedPipe,
}

impl Platform {
    /// Select the endpoint family for the current target.
    #[must_use]
    pub fn detect() -> Self {
        if cfg!(windows) {
            Self::NamedPipe
        } else {
            Self::SocketFile {
                dirs: socket_dirs_from_env(),
            }
        }
    }
}

/// Collect candidate socket directories from the environment.
///
/// Unset or empty variables are skipped, duplicates are dropped while keeping
/// the first occurrence, and `/tmp` is always last.
#[must_use]
pub fn socket_dirs_from_env() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    let from_env = SOCKET_DIR_VARS
        .iter()
        .filter_map(|var| std::env::var_os(var))
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);

    for dir in from_env.chain(std::iter::once(PathBuf::from(FALLBACK_SOCKET_DIR))) {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

/// Endpoint file name for an index.
#[must_use]
pub fn endpoint_name(index: u8) -> String {
    format!("discord-ipc-{index}")
}

/// Finds and opens the IPC channel to the peer.
#[derive(Debug, Clone)]
pub struct TransportResolver {
    platform: Platform,
}

impl TransportResolver {
    /// Create a resolver for an explicit platform.
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Create a resolver for the host platform.
    #[must_use]
    pub fn detect() -> Self {
        Self::new(Platform::detect())
    }

    /// All candidate paths for one index, in probe order.
    #[must_use]
    pub fn candidates(&self, index: u8) -> Vec<PathBuf> {
        let name = endpoint_name(index);
        let name = name.as_str();
        match &self.platform {
            Platform::SocketFile { dirs } => dirs
                .iter()
                .flat_map(|dir| {
                    SANDBOX_SUBPATHS.iter().map(move |sub| {
                        if sub.is_empty() {
                            dir.join(name)
                        } else {
                            dir.join(sub).join(name)
                        }
                    })
                })
                .collect(),
            Platform::NamedPipe => vec![PathBuf::from(format!(r"\\.\pipe\{name}"))],
        }
    }

    /// Probe every candidate of every index and return the first live channel.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransportNotFound`] once all ten indices are
    /// exhausted on every candidate path.
    pub async fn resolve_and_connect(&self) -> Result<BoxedChannel> {
        for index in 0..ENDPOINT_COUNT {
            for path in self.candidates(index) {
                if matches!(self.platform, Platform::SocketFile { .. }) && !path.exists() {
                    continue;
                }

                match dial(&path).await {
                    Ok(stream) => {
                        info!(endpoint = %path.display(), "connected to discord ipc endpoint");
                        return Ok(Box::new(stream));
                    }
                    Err(err) => {
                        debug!(endpoint = %path.display(), %err, "ipc endpoint not connectable");
                    }
                }
            }
        }

        Err(AppError::TransportNotFound(
            "no discord ipc endpoint found; make sure Discord is running".into(),
        ))
    }
}

async fn dial(path: &Path) -> std::io::Result<LocalSocketStream> {
    let name = path.to_fs_name::<GenericFilePath>()?;
    LocalSocketStream::connect(name).await
}
