//! NetworkSink - UDP fire-and-forget snapshot streaming
//!
//! One datagram per snapshot. Receivers that only drive an alarm panel can
//! ask for the `digest` payload, which leaves out the per-worker statuses.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use contracts::{ContractError, FleetSnapshot, SnapshotSink, WorkerId};
use serde::Serialize;
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument, warn};

/// Largest payload that fits a UDP datagram over IPv4 with room to spare
pub const DEFAULT_MAX_PACKET_SIZE: usize = 65_000;

/// Wire encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    #[default]
    Json,
    Bincode,
}

impl FromStr for NetworkFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "bincode" => Ok(Self::Bincode),
            other => Err(format!("unknown format '{other}' (expected json or bincode)")),
        }
    }
}

/// What each datagram carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkPayload {
    /// The whole snapshot
    #[default]
    Full,
    /// Tick, time, danger rate and the non-compliant / missing lists
    Digest,
}

impl FromStr for NetworkPayload {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "digest" => Ok(Self::Digest),
            other => Err(format!("unknown payload '{other}' (expected full or digest)")),
        }
    }
}

/// Compact view sent for [`NetworkPayload::Digest`]
#[derive(Debug, Serialize)]
struct SnapshotDigest<'a> {
    tick: u64,
    timestamp: DateTime<Utc>,
    fleet_size: usize,
    danger_rate: f64,
    non_compliant: &'a [WorkerId],
    missing: &'a [WorkerId],
}

impl<'a> From<&'a FleetSnapshot> for SnapshotDigest<'a> {
    fn from(snapshot: &'a FleetSnapshot) -> Self {
        Self {
            tick: snapshot.tick,
            timestamp: snapshot.timestamp,
            fleet_size: snapshot.fleet_size(),
            danger_rate: snapshot.danger_rate,
            non_compliant: &snapshot.non_compliant,
            missing: &snapshot.missing,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    pub addr: SocketAddr,
    pub format: NetworkFormat,
    pub payload: NetworkPayload,
    /// Larger encodings are reported as write failures, never fragmented
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            format: NetworkFormat::default(),
            payload: NetworkPayload::default(),
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
        }
    }

    /// Read `addr`, `format`, `payload` and `max_packet_size` from sink params
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let raw_addr = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;
        let addr = raw_addr
            .parse()
            .map_err(|e| format!("invalid address '{raw_addr}': {e}"))?;

        let mut config = Self::new(addr);
        if let Some(format) = params.get("format") {
            config.format = format.parse()?;
        }
        if let Some(payload) = params.get("payload") {
            config.payload = payload.parse()?;
        }
        if let Some(size) = params.get("max_packet_size") {
            config.max_packet_size = size
                .parse()
                .map_err(|e| format!("invalid max_packet_size '{size}': {e}"))?;
        }
        Ok(config)
    }
}

/// Sink that sends snapshots over UDP
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    #[instrument(name = "network_sink_new", skip(name, config), fields(target = %config.addr))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let local: SocketAddr = if config.addr.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(config.addr).await?;

        debug!(sink = %name, target = %config.addr, payload = ?config.payload, "NetworkSink connected");
        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::sink_write(&name, e))?;

        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::SinkConnection {
                sink_name: name,
                message: e.to_string(),
            })
    }

    fn encode(&self, snapshot: &FleetSnapshot) -> Result<Vec<u8>, ContractError> {
        let encoded = match (self.config.payload, self.config.format) {
            (NetworkPayload::Full, NetworkFormat::Json) => {
                serde_json::to_vec(snapshot).map_err(|e| e.to_string())
            }
            (NetworkPayload::Full, NetworkFormat::Bincode) => {
                bincode::serialize(snapshot).map_err(|e| e.to_string())
            }
            (NetworkPayload::Digest, NetworkFormat::Json) => {
                serde_json::to_vec(&SnapshotDigest::from(snapshot)).map_err(|e| e.to_string())
            }
            (NetworkPayload::Digest, NetworkFormat::Bincode) => {
                bincode::serialize(&SnapshotDigest::from(snapshot)).map_err(|e| e.to_string())
            }
        };
        let data = encoded.map_err(|e| {
            ContractError::sink_write(&self.name, format!("{:?} encode error: {e}", self.config.format))
        })?;

        if data.len() > self.config.max_packet_size {
            warn!(
                sink = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "Snapshot exceeds max packet size"
            );
            return Err(ContractError::sink_write(
                &self.name,
                format!(
                    "snapshot of {} bytes exceeds max packet size {}",
                    data.len(),
                    self.config.max_packet_size
                ),
            ));
        }
        Ok(data)
    }
}

impl SnapshotSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_write",
        skip(self, snapshot),
        fields(sink = %self.name, tick = snapshot.tick)
    )]
    async fn write(&mut self, snapshot: &FleetSnapshot) -> Result<(), ContractError> {
        let Some(socket) = self.socket.as_ref() else {
            return Err(ContractError::sink_write(&self.name, "socket closed"));
        };
        let data = self.encode(snapshot)?;

        // best-effort: a lost datagram is not a sink failure
        match socket.send(&data).await {
            Ok(sent) => debug!(bytes = sent, "Datagram sent"),
            Err(e) => error!(sink = %self.name, error = %e, "UDP send failed"),
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        if self.socket.take().is_some() {
            debug!(sink = %self.name, "NetworkSink closed");
        }
        Ok(())
    }
}
