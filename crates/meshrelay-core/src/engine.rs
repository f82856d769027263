//! Envelope decode engine.
//!
//! `decode(envelope_bytes, key) -> Event` is a pure transform: it reads only
//! its arguments and the read-only registry, so it can run concurrently on any
//! delivery thread. Every failure is folded into a `MalformedPayload` event;
//! nothing here panics or returns early without an event.

use prost::Message;

use crate::crypto::{build_nonce, decrypt, ChannelKey};
use crate::dispatch::registry::{standard_registry, PortRegistry};
use crate::dispatch::{DecodeStage, Event, PacketHeader};
use crate::error::{MeshRelayError, Result};
use crate::protocol::{mesh_packet::PayloadVariant, Data, MeshPacket, ServiceEnvelope};

/// Decoder bound to a port registry.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'r> {
    registry: &'r PortRegistry,
}

impl Engine<'static> {
    /// Engine over the process-wide standard registry.
    pub fn standard() -> Self {
        Self {
            registry: standard_registry(),
        }
    }
}

impl Default for Engine<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'r> Engine<'r> {
    pub fn with_registry(registry: &'r PortRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r PortRegistry {
        self.registry
    }

    /// Decode one pub/sub delivery into an event.
    ///
    /// `key` may be `None`; unencrypted packets (map reports) still decode.
    pub fn decode(&self, envelope_bytes: &[u8], key: Option<&ChannelKey>) -> Event {
        let envelope = match parse_envelope(envelope_bytes) {
            Ok(env) => env,
            Err(e) => return diagnostic(None, e),
        };
        self.decode_envelope(envelope, key)
    }

    /// Decode an already parsed envelope.
    pub fn decode_envelope(&self, mut envelope: ServiceEnvelope, key: Option<&ChannelKey>) -> Event {
        let Some(packet) = envelope.packet.take() else {
            return Event::MalformedPayload {
                header: None,
                stage: DecodeStage::Envelope,
                portnum: None,
                reason: "envelope carries no packet".into(),
            };
        };
        self.decode_packet(&envelope, packet, key)
    }

    fn decode_packet(
        &self,
        envelope: &ServiceEnvelope,
        mut packet: MeshPacket,
        key: Option<&ChannelKey>,
    ) -> Event {
        let variant = packet.payload_variant.take();
        let encrypted = matches!(variant, Some(PayloadVariant::Encrypted(_)));
        let header = PacketHeader::new(envelope, &packet, encrypted);

        let data = match variant {
            Some(PayloadVariant::Decoded(data)) => data,
            Some(PayloadVariant::Encrypted(ciphertext)) => {
                match open_encrypted(&packet, &ciphertext, key) {
                    Ok(data) => data,
                    Err(e) => return diagnostic(Some(header), e),
                }
            }
            None => {
                return Event::MalformedPayload {
                    header: Some(header),
                    stage: DecodeStage::Envelope,
                    portnum: None,
                    reason: "packet carries neither decoded nor encrypted payload".into(),
                }
            }
        };

        self.dispatch(header, &data)
    }

    /// Classify a decoded payload by its port tag.
    pub fn dispatch(&self, header: PacketHeader, data: &Data) -> Event {
        let portnum = data.portnum;
        match self.registry.lookup(portnum) {
            Some(entry) => match (entry.decode)(header.clone(), &data.payload) {
                Ok(event) => event,
                Err(e) => {
                    tracing::debug!(portnum, port = entry.label, error = %e, "type decode failed");
                    Event::MalformedPayload {
                        header: Some(header),
                        stage: DecodeStage::TypeDecode,
                        portnum: Some(portnum),
                        reason: e.to_string(),
                    }
                }
            },
            None => Event::UnrecognizedPort {
                header,
                portnum,
                raw: data.payload.clone(),
            },
        }
    }
}

/// Decode with the standard registry.
pub fn decode(envelope_bytes: &[u8], key: Option<&ChannelKey>) -> Event {
    Engine::standard().decode(envelope_bytes, key)
}

/// Outer envelope parse.
pub fn parse_envelope(bytes: &[u8]) -> Result<ServiceEnvelope> {
    ServiceEnvelope::decode(bytes).map_err(|e| MeshRelayError::EnvelopeParse(e.to_string()))
}

/// Decrypt an encrypted packet body and parse it as `Data`.
pub fn open_encrypted(
    packet: &MeshPacket,
    ciphertext: &[u8],
    key: Option<&ChannelKey>,
) -> Result<Data> {
    let key = key.ok_or_else(|| {
        MeshRelayError::malformed(DecodeStage::Decrypt, None, "no channel key configured")
    })?;
    let nonce = build_nonce(packet.id, packet.from);
    let plaintext = decrypt(key, &nonce, ciphertext);
    Data::decode(plaintext.as_slice())
        .map_err(|e| MeshRelayError::malformed(DecodeStage::PayloadDecode, None, e.to_string()))
}

fn diagnostic(header: Option<PacketHeader>, err: MeshRelayError) -> Event {
    match err {
        MeshRelayError::MalformedPayload {
            stage,
            portnum,
            reason,
        } => Event::MalformedPayload {
            header,
            stage,
            portnum,
            reason,
        },
        MeshRelayError::EnvelopeParse(reason) => Event::MalformedPayload {
            header,
            stage: DecodeStage::Envelope,
            portnum: None,
            reason,
        },
        other => Event::MalformedPayload {
            header,
            stage: DecodeStage::Envelope,
            portnum: None,
            reason: other.to_string(),
        },
    }
}
