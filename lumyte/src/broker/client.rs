use std::io::{self, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{info, warn};

use crate::broker::resp::{self, Reply};
use crate::foundation::error::{LumyteError, LumyteResult};

/// Default Unix socket path of the broker.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/redis/redis-server.sock";

/// Broker keys and channels shared by the pipeline processes.
pub mod keys {
    /// FIFO list of raw BGRA frames (orchestrator pushes, transport pops).
    pub const FRAMES: &str = "player:frames";
    /// Hardware brightness 0–255, consumed by the transport.
    pub const SENDER_BRIGHTNESS: &str = "sender:brightness";
    /// Persisted perceptual brightness 1–100, read by the orchestrator.
    pub const PLAYER_BRIGHTNESS: &str = "player:brightness";
    /// Pub/sub channel carrying perceptual brightness updates.
    pub const BRIGHTNESS_CHANNEL: &str = "player:brightness:channel";
}

/// Delay between reconnect attempts after the broker connection drops.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Read timeout headroom on top of the longest blocking command.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Request/reply connection to the broker.
///
/// One command (or one explicit pipeline) in flight at a time; pub/sub
/// lives on its own [`Subscriber`] connection.
pub struct BrokerClient {
    stream: BufReader<UnixStream>,
    path: PathBuf,
}

impl BrokerClient {
    /// Connect to the broker's Unix socket.
    pub fn connect(path: impl AsRef<Path>) -> LumyteResult<Self> {
        let path = path.as_ref().to_path_buf();
        let stream = UnixStream::connect(&path).map_err(LumyteError::broker)?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(LumyteError::broker)?;
        Ok(Self {
            stream: BufReader::new(stream),
            path,
        })
    }

    /// Connect, retrying every second until the broker accepts or the
    /// running flag clears. Returns `None` when interrupted.
    pub fn connect_with_backoff(
        path: impl AsRef<Path>,
        running: &AtomicBool,
    ) -> Option<Self> {
        let path = path.as_ref();
        while running.load(Ordering::Relaxed) {
            match Self::connect(path) {
                Ok(client) => return Some(client),
                Err(err) => {
                    warn!("broker connect failed ({err}); retrying in 1s");
                    std::thread::sleep(RECONNECT_BACKOFF);
                }
            }
        }
        None
    }

    /// Drop the broken connection and dial again with 1 s backoff until it
    /// succeeds or the running flag clears. Returns `false` on shutdown.
    pub fn reconnect(&mut self, running: &AtomicBool) -> bool {
        info!("reconnecting to broker at {}", self.path.display());
        match Self::connect_with_backoff(&self.path, running) {
            Some(client) => {
                *self = client;
                true
            }
            None => false,
        }
    }

    /// `GET key` → value bytes, `None` when unset.
    pub fn get(&mut self, key: &str) -> LumyteResult<Option<Vec<u8>>> {
        let reply = self.request(&[b"GET", key.as_bytes()])?;
        reply.into_bulk().map_err(LumyteError::broker)
    }

    /// `SET key value`.
    pub fn set(&mut self, key: &str, value: &[u8]) -> LumyteResult<()> {
        let reply = self.request(&[b"SET", key.as_bytes(), value])?;
        reply.into_ack().map_err(LumyteError::broker)
    }

    /// `DEL key`.
    pub fn del(&mut self, key: &str) -> LumyteResult<()> {
        let reply = self.request(&[b"DEL", key.as_bytes()])?;
        reply.into_ack().map_err(LumyteError::broker)
    }

    /// `RPUSH key value` → resulting list length.
    pub fn rpush(&mut self, key: &str, value: &[u8]) -> LumyteResult<i64> {
        let reply = self.request(&[b"RPUSH", key.as_bytes(), value])?;
        reply.into_int().map_err(LumyteError::broker)
    }

    /// `LLEN key` → list length.
    pub fn llen(&mut self, key: &str) -> LumyteResult<i64> {
        let reply = self.request(&[b"LLEN", key.as_bytes()])?;
        reply.into_int().map_err(LumyteError::broker)
    }

    /// `PUBLISH channel payload`.
    pub fn publish(&mut self, channel: &str, payload: &[u8]) -> LumyteResult<()> {
        let reply = self.request(&[b"PUBLISH", channel.as_bytes(), payload])?;
        reply.into_ack().map_err(LumyteError::broker)
    }

    /// Pipelined `BLPOP queue timeout` + `GET key` in one round trip.
    ///
    /// Returns the popped element (if the queue produced one within the
    /// timeout) and the value under `key`. This is the transport's hot
    /// read: the pairing keeps the latency between wake-up and transmit
    /// down to a single socket exchange.
    pub fn blpop_with_get(
        &mut self,
        queue: &str,
        key: &str,
        timeout_secs: u32,
    ) -> LumyteResult<(Option<Vec<u8>>, Option<Vec<u8>>)> {
        let timeout = timeout_secs.to_string();
        {
            let stream = self.stream.get_mut();
            resp::write_command(stream, &[b"BLPOP", queue.as_bytes(), timeout.as_bytes()])
                .map_err(LumyteError::broker)?;
            resp::write_command(stream, &[b"GET", key.as_bytes()])
                .map_err(LumyteError::broker)?;
            stream.flush().map_err(LumyteError::broker)?;
        }

        let popped = match Reply::read_from(&mut self.stream).map_err(LumyteError::broker)? {
            Reply::Nil => None,
            // BLPOP returns [key, element].
            Reply::Array(mut items) if items.len() == 2 => match items.pop() {
                Some(Reply::Bulk(data)) => Some(data),
                _ => {
                    return Err(LumyteError::protocol(
                        "BLPOP array did not end with a bulk element",
                    ));
                }
            },
            Reply::Error(msg) => {
                return Err(LumyteError::broker(io::Error::other(msg)));
            }
            other => {
                return Err(LumyteError::protocol(format!(
                    "unexpected BLPOP reply: {other:?}"
                )));
            }
        };

        let value = Reply::read_from(&mut self.stream)
            .map_err(LumyteError::broker)?
            .into_bulk()
            .map_err(LumyteError::broker)?;

        Ok((popped, value))
    }

    fn request(&mut self, args: &[&[u8]]) -> LumyteResult<Reply> {
        let stream = self.stream.get_mut();
        resp::write_command(stream, args).map_err(LumyteError::broker)?;
        stream.flush().map_err(LumyteError::broker)?;
        Reply::read_from(&mut self.stream).map_err(LumyteError::broker)
    }
}

/// Pub/sub connection subscribed to one channel.
pub struct Subscriber {
    stream: BufReader<UnixStream>,
    path: PathBuf,
    channel: String,
}

impl Subscriber {
    /// Connect and subscribe to `channel`.
    pub fn connect(path: impl AsRef<Path>, channel: &str) -> LumyteResult<Self> {
        let path = path.as_ref().to_path_buf();
        let stream = UnixStream::connect(&path).map_err(LumyteError::broker)?;
        let mut sub = Self {
            stream: BufReader::new(stream),
            path,
            channel: channel.to_owned(),
        };

        {
            let stream = sub.stream.get_mut();
            resp::write_command(stream, &[b"SUBSCRIBE", channel.as_bytes()])
                .map_err(LumyteError::broker)?;
            stream.flush().map_err(LumyteError::broker)?;
        }
        // Subscription acknowledgement: ["subscribe", channel, count].
        sub.set_timeout(Some(READ_TIMEOUT))?;
        Reply::read_from(&mut sub.stream).map_err(LumyteError::broker)?;
        Ok(sub)
    }

    /// Reconnect and resubscribe with 1 s backoff. Returns `false` on
    /// shutdown.
    pub fn reconnect(&mut self, running: &AtomicBool) -> bool {
        while running.load(Ordering::Relaxed) {
            match Self::connect(&self.path, &self.channel) {
                Ok(sub) => {
                    *self = sub;
                    return true;
                }
                Err(err) => {
                    warn!("subscriber reconnect failed ({err}); retrying in 1s");
                    std::thread::sleep(RECONNECT_BACKOFF);
                }
            }
        }
        false
    }

    /// Non-blocking poll for the next published payload.
    ///
    /// Peeks with a tiny read timeout; once the broker has started writing
    /// a message record the remainder is read with a generous timeout (the
    /// broker writes each record in one burst).
    pub fn try_message(&mut self) -> LumyteResult<Option<Vec<u8>>> {
        use std::io::BufRead as _;

        if self.stream.buffer().is_empty() {
            self.set_timeout(Some(Duration::from_millis(1)))?;
            match self.stream.fill_buf() {
                Ok([]) => {
                    return Err(LumyteError::broker(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "broker closed the pub/sub connection",
                    )));
                }
                Ok(_) => {}
                Err(err)
                    if err.kind() == io::ErrorKind::WouldBlock
                        || err.kind() == io::ErrorKind::TimedOut =>
                {
                    return Ok(None);
                }
                Err(err) => return Err(LumyteError::broker(err)),
            }
        }

        self.set_timeout(Some(READ_TIMEOUT))?;
        match Reply::read_from(&mut self.stream).map_err(LumyteError::broker)? {
            // Push records: ["message", channel, payload].
            Reply::Array(items) => match items.into_iter().nth(2) {
                Some(Reply::Bulk(payload)) => Ok(Some(payload)),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) -> LumyteResult<()> {
        self.stream
            .get_ref()
            .set_read_timeout(timeout)
            .map_err(LumyteError::broker)
    }
}
