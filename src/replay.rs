//! Text trace replay through a [`ReassemblySession`].
//!
//! Each non-empty line describes one already-decoded unit:
//!
//! ```text
//! clnp <frame> <src> <dst> <du-id> <offset> <total> <more:0|1> <payload>
//! cotp <frame> <src> <dst> <dst-ref|-> <eot:0|1> <payload>
//! ```
//!
//! Addresses and payloads are literal text; a payload of `-` is empty. CLNP
//! lengths count data bytes only. `#` starts a comment.

use std::{fmt, io::BufRead, str::FromStr};

use bytes::Bytes;
use thiserror::Error;

use crate::{
    clnp::{ChecksumStatus, ClnpSegment},
    cotp::CotpDataUnit,
    disposition::Disposition,
    reassembly::{EndpointAddress, FrameId},
    session::ReassemblySession,
};

/// Errors raised while replaying a trace.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The trace could not be read.
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),
    /// A line could not be parsed.
    #[error("line {line}: {message}")]
    Syntax {
        /// One-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },
}

/// One decoded trace line.
#[derive(Clone, Debug)]
pub enum TraceUnit {
    /// A CLNP data unit.
    Clnp(ClnpSegment),
    /// A COTP data unit.
    Cotp(CotpDataUnit),
}

impl TraceUnit {
    /// Frame the unit claims to have arrived in.
    #[must_use]
    pub fn frame(&self) -> FrameId {
        match self {
            Self::Clnp(segment) => segment.frame,
            Self::Cotp(unit) => unit.frame,
        }
    }

    /// Protocol label.
    #[must_use]
    pub const fn protocol(&self) -> &'static str {
        match self {
            Self::Clnp(_) => "clnp",
            Self::Cotp(_) => "cotp",
        }
    }

    /// Parse one trace line; `Ok(None)` for blank and comment lines.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Syntax`] for unknown protocols, missing fields,
    /// or unparsable numbers.
    pub fn parse(line_no: usize, line: &str) -> Result<Option<Self>, ReplayError> {
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            return Ok(None);
        }
        let mut fields = Fields {
            line: line_no,
            tokens: content.split_whitespace(),
        };
        let unit = match fields.text("protocol")? {
            "clnp" => Self::Clnp(parse_clnp(&mut fields)?),
            "cotp" => Self::Cotp(parse_cotp(&mut fields)?),
            other => return Err(fields.error(format!("unknown protocol {other:?}"))),
        };
        if let Some(extra) = fields.tokens.next() {
            return Err(fields.error(format!("unexpected trailing field {extra:?}")));
        }
        Ok(Some(unit))
    }
}

/// Disposition produced for one replayed line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayRecord {
    /// One-based line number.
    pub line: usize,
    /// Protocol label of the unit.
    pub protocol: &'static str,
    /// Frame the unit arrived in.
    pub frame: FrameId,
    /// What the decoder should render.
    pub disposition: Disposition,
}

impl fmt::Display for ReplayRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {} {}: {}", self.frame, self.protocol, self.disposition)
    }
}

/// Replay every unit of `reader` through `session`, in trace order.
///
/// # Errors
///
/// Returns [`ReplayError`] on the first unreadable or malformed line.
pub fn replay<R: BufRead>(
    session: &mut ReassemblySession,
    reader: R,
) -> Result<Vec<ReplayRecord>, ReplayError> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let Some(unit) = TraceUnit::parse(line_no, &line?)? else {
            continue;
        };
        let protocol = unit.protocol();
        let frame = unit.frame();
        let disposition = match unit {
            TraceUnit::Clnp(segment) => session.clnp_mut().process(segment),
            TraceUnit::Cotp(unit) => session.cotp_mut().process(unit),
        };
        records.push(ReplayRecord {
            line: line_no,
            protocol,
            frame,
            disposition,
        });
    }
    Ok(records)
}

struct Fields<'a> {
    line: usize,
    tokens: std::str::SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn error(&self, message: String) -> ReplayError {
        ReplayError::Syntax {
            line: self.line,
            message,
        }
    }

    fn text(&mut self, name: &str) -> Result<&'a str, ReplayError> {
        self.tokens
            .next()
            .ok_or_else(|| self.error(format!("missing {name}")))
    }

    fn number<T: FromStr>(&mut self, name: &str) -> Result<T, ReplayError> {
        let token = self.text(name)?;
        token
            .parse()
            .map_err(|_| self.error(format!("invalid {name} {token:?}")))
    }

    fn flag(&mut self, name: &str) -> Result<bool, ReplayError> {
        match self.text(name)? {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(self.error(format!("invalid {name} {other:?}, expected 0 or 1"))),
        }
    }

    fn address(&mut self, name: &str) -> Result<EndpointAddress, ReplayError> {
        let token = self.text(name)?;
        Ok(EndpointAddress::new(Bytes::copy_from_slice(token.as_bytes())))
    }

    fn payload(&mut self) -> Result<Bytes, ReplayError> {
        Ok(match self.text("payload")? {
            "-" => Bytes::new(),
            text => Bytes::copy_from_slice(text.as_bytes()),
        })
    }
}

fn parse_clnp(fields: &mut Fields<'_>) -> Result<ClnpSegment, ReplayError> {
    let frame = FrameId::new(fields.number("frame")?);
    let source = fields.address("source")?;
    let destination = fields.address("destination")?;
    let data_unit_id = fields.number("du-id")?;
    let segment_offset = fields.number("offset")?;
    let total_length = fields.number("total")?;
    let more_segments = fields.flag("more")?;
    let payload = fields.payload()?;
    let segment_length = u16::try_from(payload.len())
        .map_err(|_| fields.error("payload longer than a CLNP segment".to_owned()))?;
    Ok(ClnpSegment {
        frame,
        source,
        destination,
        data_unit_id,
        segment_offset,
        total_length,
        header_length: 0,
        segment_length,
        more_segments,
        segmentation_permitted: true,
        checksum: ChecksumStatus::Absent,
        payload,
    })
}

fn parse_cotp(fields: &mut Fields<'_>) -> Result<CotpDataUnit, ReplayError> {
    let frame = FrameId::new(fields.number("frame")?);
    let source = fields.address("source")?;
    let destination = fields.address("destination")?;
    let destination_ref = match fields.text("dst-ref")? {
        "-" => None,
        token => Some(
            token
                .parse()
                .map_err(|_| fields.error(format!("invalid dst-ref {token:?}")))?,
        ),
    };
    let end_of_tsdu = fields.flag("eot")?;
    let payload = fields.payload()?;
    Ok(CotpDataUnit {
        frame,
        source,
        destination,
        destination_ref,
        end_of_tsdu,
        payload,
    })
}
