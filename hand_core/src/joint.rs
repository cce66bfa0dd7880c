//! Joints, their angle ranges, and clamped position snapshots.
//!
//! Every angle that leaves this module is already inside its joint's range:
//! out-of-range inputs are clamped, never rejected.

use std::fmt;
use std::str::FromStr;

/// One independently actuated degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Joint {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
    Wrist,
}

impl Joint {
    pub const ALL: [Joint; 6] = [
        Joint::Thumb,
        Joint::Index,
        Joint::Middle,
        Joint::Ring,
        Joint::Pinky,
        Joint::Wrist,
    ];

    /// Valid angle range in degrees, inclusive.
    #[inline]
    pub const fn range(self) -> (u16, u16) {
        match self {
            Joint::Thumb | Joint::Pinky => (0, 150),
            Joint::Index | Joint::Middle | Joint::Ring | Joint::Wrist => (0, 180),
        }
    }

    /// Clamp an arbitrary integer into this joint's range.
    #[inline]
    pub fn clamp(self, value: i64) -> u16 {
        let (lo, hi) = self.range();
        value.clamp(i64::from(lo), i64::from(hi)) as u16
    }

    /// Single-letter code used on the wire.
    pub const fn wire_code(self) -> char {
        match self {
            Joint::Thumb => 'T',
            Joint::Index => 'I',
            Joint::Middle => 'M',
            Joint::Ring => 'R',
            Joint::Pinky => 'P',
            Joint::Wrist => 'W',
        }
    }

    pub fn from_wire_code(code: char) -> Option<Joint> {
        Joint::ALL.into_iter().find(|j| j.wire_code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Joint::Thumb => "thumb",
            Joint::Index => "index",
            Joint::Middle => "middle",
            Joint::Ring => "ring",
            Joint::Pinky => "pinky",
            Joint::Wrist => "wrist",
        }
    }

    pub const fn finger(self) -> Option<Finger> {
        match self {
            Joint::Thumb => Some(Finger::Thumb),
            Joint::Index => Some(Finger::Index),
            Joint::Middle => Some(Finger::Middle),
            Joint::Ring => Some(Finger::Ring),
            Joint::Pinky => Some(Finger::Pinky),
            Joint::Wrist => None,
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts joint names (`index`) or wire codes (`I`), case-insensitive.
impl FromStr for Joint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let mut chars = t.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && let Some(j) = Joint::from_wire_code(c.to_ascii_uppercase())
        {
            return Ok(j);
        }
        let lower = t.to_ascii_lowercase();
        Joint::ALL
            .into_iter()
            .find(|j| j.name() == lower)
            .ok_or_else(|| format!("unknown joint {t:?} (expected thumb|index|middle|ring|pinky|wrist)"))
    }
}

/// The five non-wrist joints, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Position in `ALL` and in per-finger arrays.
    #[inline]
    pub const fn idx(self) -> usize {
        self as usize
    }

    pub const fn joint(self) -> Joint {
        match self {
            Finger::Thumb => Joint::Thumb,
            Finger::Index => Joint::Index,
            Finger::Middle => Joint::Middle,
            Finger::Ring => Joint::Ring,
            Finger::Pinky => Joint::Pinky,
        }
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.joint().name())
    }
}

/// Five clamped finger angles; payload of the multi-joint write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FingerAngles([u16; 5]);

impl FingerAngles {
    /// Clamp each value into its finger's range.
    pub fn new(values: [i64; 5]) -> Self {
        let mut out = [0u16; 5];
        for f in Finger::ALL {
            out[f.idx()] = f.joint().clamp(values[f.idx()]);
        }
        Self(out)
    }

    #[inline]
    pub fn get(&self, finger: Finger) -> u16 {
        self.0[finger.idx()]
    }

    #[inline]
    pub fn as_array(&self) -> [u16; 5] {
        self.0
    }
}

/// Immutable snapshot of all six joint angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetPositions {
    fingers: FingerAngles,
    wrist: u16,
}

impl TargetPositions {
    pub fn new(thumb: i64, index: i64, middle: i64, ring: i64, pinky: i64, wrist: i64) -> Self {
        Self {
            fingers: FingerAngles::new([thumb, index, middle, ring, pinky]),
            wrist: Joint::Wrist.clamp(wrist),
        }
    }

    pub fn get(&self, joint: Joint) -> u16 {
        match joint.finger() {
            Some(f) => self.fingers.get(f),
            None => self.wrist,
        }
    }

    /// Copy with one joint replaced (clamped).
    #[must_use]
    pub fn with(&self, joint: Joint, value: i64) -> Self {
        let mut next = *self;
        match joint.finger() {
            Some(f) => next.fingers.0[f.idx()] = f.joint().clamp(value),
            None => next.wrist = Joint::Wrist.clamp(value),
        }
        next
    }

    #[inline]
    pub fn fingers(&self) -> FingerAngles {
        self.fingers
    }

    #[inline]
    pub fn wrist(&self) -> u16 {
        self.wrist
    }
}

/// Open hand with the wrist centred.
impl Default for TargetPositions {
    fn default() -> Self {
        Self::new(0, 0, 0, 0, 0, 90)
    }
}
