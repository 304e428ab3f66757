//! fluentd forward client
//!
//! Sends each record as a msgpack `[tag, unix_time, record]` array over TCP, the
//! Message Mode of the forward protocol spoken by fluentd and Fluent Bit.

use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{Record, RemoteSink};
use crate::error::{LogError, Result};

/// A connected fluentd forward client
#[derive(Debug)]
pub struct FluentClient {
    addr: SocketAddr,
    stream: Mutex<TcpStream>,
}

impl FluentClient {
    /// Connect to `host:port`, trying each resolved address in turn
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let target = format!("{}:{}", host, port);
        let connect_err = |source: io::Error| LogError::Connect {
            addr: target.clone(),
            source,
        };

        let addrs = (host, port).to_socket_addrs().map_err(connect_err)?;

        let mut last_err =
            io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses");
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_write_timeout(Some(timeout)).map_err(connect_err)?;
                    stream.set_nodelay(true).map_err(connect_err)?;
                    return Ok(Self {
                        addr,
                        stream: Mutex::new(stream),
                    });
                }
                Err(e) => last_err = e,
            }
        }

        Err(connect_err(last_err))
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

/// Encode one forward-protocol entry
///
/// The record is written as a map keyed by field name.
pub fn encode_entry(tag: &str, time: DateTime<Utc>, record: &Record) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(&(tag, time.timestamp(), record))?)
}

impl RemoteSink for FluentClient {
    fn post_with_time(&self, tag: &str, time: DateTime<Utc>, record: &Record) -> Result<()> {
        let entry = encode_entry(tag, time, record)?;
        let mut stream = match self.stream.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        stream.write_all(&entry)?;
        stream.flush()?;
        Ok(())
    }
}
