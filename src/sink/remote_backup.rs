use std::io::Write;
use std::net::TcpStream;

use crate::error::RemoteSendError;

const MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Ships one formatted record to the remote backup server over TCP.
///
/// Grounded in `original_source`'s `SendBackupLog`: connects with up to
/// [`MAX_CONNECT_ATTEMPTS`] retries, writes the record bytes, and closes.
/// Invoked only from a [`crate::pool::WorkerPool`] task, never directly
/// from a producer thread.
#[derive(Clone)]
pub struct RemoteBackup {
    addr: String,
    port: u16,
}

impl RemoteBackup {
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
        }
    }

    pub fn send(&self, record_bytes: &[u8]) -> Result<(), RemoteSendError> {
        let mut last_err = None;
        for _ in 0..MAX_CONNECT_ATTEMPTS {
            match TcpStream::connect((self.addr.as_str(), self.port)) {
                Ok(mut stream) => {
                    return stream.write_all(record_bytes).map_err(|e| {
                        eprintln!("asynclog: remote backup write failed: {e}");
                        RemoteSendError::Io(e)
                    });
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(RemoteSendError::RetriesExhausted {
            attempts: MAX_CONNECT_ATTEMPTS,
        })
        .map_err(|e| {
            if let Some(io_err) = last_err {
                eprintln!("asynclog: remote backup connect failed: {io_err}");
            }
            e
        })
    }
}
