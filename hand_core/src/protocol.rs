//! ASCII wire protocol understood by the hand firmware.
//!
//! - Multi-joint: `P-T:<n>,I:<n>,M:<n>,R:<n>,P:<n>` (five fingers, wrist excluded)
//! - Single-joint: `S-<J>:<n>` with `<J>` in `T,I,M,R,P,W`
//!
//! One message per write, no terminator. Values are base-10 and already clamped.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;
use crate::joint::{Finger, FingerAngles, Joint};

/// Coalescing key of the dispatcher. The composite finger write is its own
/// channel and never merges with single-joint writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Fingers,
    Joint(Joint),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Fingers => f.write_str("P"),
            Channel::Joint(j) => write!(f, "S-{}", j.wire_code()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireCommand {
    Fingers(FingerAngles),
    Single(Joint, u16),
}

impl WireCommand {
    /// Single-joint write with the angle clamped to the joint's range.
    pub fn single(joint: Joint, value: i64) -> Self {
        WireCommand::Single(joint, joint.clamp(value))
    }

    pub fn channel(&self) -> Channel {
        match self {
            WireCommand::Fingers(_) => Channel::Fingers,
            WireCommand::Single(j, _) => Channel::Joint(*j),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for WireCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireCommand::Fingers(angles) => {
                f.write_str("P-")?;
                for (i, finger) in Finger::ALL.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", finger.joint().wire_code(), angles.get(finger))?;
                }
                Ok(())
            }
            WireCommand::Single(joint, value) => {
                write!(f, "S-{}:{value}", joint.wire_code())
            }
        }
    }
}

fn parse_field(field: &str) -> Result<(Joint, i64), ProtocolError> {
    let (code, value) = field
        .split_once(':')
        .ok_or_else(|| ProtocolError::MalformedField(field.to_string()))?;
    let mut chars = code.chars();
    let joint = match (chars.next(), chars.next()) {
        (Some(c), None) => Joint::from_wire_code(c),
        _ => None,
    }
    .ok_or_else(|| ProtocolError::UnknownJoint(code.to_string()))?;
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::MalformedField(field.to_string()));
    }
    // Digit-only strings only fail on overflow; saturate so clamping still applies.
    let n = value.parse::<i64>().unwrap_or(i64::MAX);
    Ok((joint, n))
}

/// Decodes a frame as the firmware would, clamping values into range.
impl FromStr for WireCommand {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ProtocolError::Empty);
        }
        if let Some(body) = s.strip_prefix("S-") {
            let (joint, n) = parse_field(body)?;
            return Ok(WireCommand::single(joint, n));
        }
        if let Some(body) = s.strip_prefix("P-") {
            let fields: Vec<&str> = body.split(',').collect();
            if fields.len() != Finger::ALL.len() {
                return Err(ProtocolError::FieldOrder(body.to_string()));
            }
            let mut values = [0i64; 5];
            for (finger, field) in Finger::ALL.into_iter().zip(fields) {
                let (joint, n) = parse_field(field)?;
                if joint != finger.joint() {
                    return Err(ProtocolError::FieldOrder(body.to_string()));
                }
                values[finger.idx()] = n;
            }
            return Ok(WireCommand::Fingers(FingerAngles::new(values)));
        }
        Err(ProtocolError::UnknownPrefix(s.to_string()))
    }
}
