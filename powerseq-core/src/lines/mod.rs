//! Logical signal catalog shared by firmware and host targets.
//!
//! The supervisor never deals in pin numbers; everything above the hardware
//! layer names lines by role. Concrete pin assignment happens once, in the
//! firmware's board map, keyed by these identifiers.

/// Identifier for the logical lines the supervisor touches.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LineId {
    /// Momentary power button.
    Power,
    /// Upstream power presence sense.
    Usb,
    /// Boost converter enable.
    En,
    /// Host boot handshake, driven low by the host once booted.
    Boot,
    /// Shutdown request to the host.
    Shutdown,
}

impl LineId {
    /// Deterministic index for lookups into [`ALL_LINES`].
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            LineId::Power => 0,
            LineId::Usb => 1,
            LineId::En => 2,
            LineId::Boot => 3,
            LineId::Shutdown => 4,
        }
    }

    /// Attempts to construct a [`LineId`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(LineId::Power),
            1 => Some(LineId::Usb),
            2 => Some(LineId::En),
            3 => Some(LineId::Boot),
            4 => Some(LineId::Shutdown),
            _ => None,
        }
    }
}

/// Direction of a line as seen from the supervisor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LineDirection {
    Input,
    InputPullUp,
    Output,
}

/// Metadata describing how a logical line behaves.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LineSpec {
    pub id: LineId,
    pub name: &'static str,
    pub direction: LineDirection,
    /// Level the line rests at when nothing drives it.
    pub idle_high: bool,
}

impl LineSpec {
    pub const fn new(
        id: LineId,
        name: &'static str,
        direction: LineDirection,
        idle_high: bool,
    ) -> Self {
        Self {
            id,
            name,
            direction,
            idle_high,
        }
    }
}

/// Compile-time catalog of every line.
pub const ALL_LINES: [LineSpec; 5] = [
    LineSpec::new(LineId::Power, "POWER", LineDirection::InputPullUp, true),
    LineSpec::new(LineId::Usb, "USB", LineDirection::Input, false),
    LineSpec::new(LineId::En, "EN", LineDirection::Output, false),
    LineSpec::new(LineId::Boot, "BOOT", LineDirection::InputPullUp, true),
    LineSpec::new(LineId::Shutdown, "SHUTDOWN", LineDirection::Output, false),
];

/// Retrieve line metadata by identifier.
#[must_use]
pub const fn line_by_id(id: LineId) -> LineSpec {
    ALL_LINES[id.as_index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_indices_round_trip() {
        for (index, spec) in ALL_LINES.iter().enumerate() {
            assert_eq!(spec.id.as_index(), index);
            assert_eq!(LineId::from_index(index), Some(spec.id));
        }
        assert_eq!(LineId::from_index(ALL_LINES.len()), None);
    }

    #[test]
    fn lookup_returns_expected_metadata() {
        let button = line_by_id(LineId::Power);
        assert_eq!(button.name, "POWER");
        assert_eq!(button.direction, LineDirection::InputPullUp);
        assert!(button.idle_high);

        let enable = line_by_id(LineId::En);
        assert_eq!(enable.direction, LineDirection::Output);
        assert!(!enable.idle_high);
    }
}
