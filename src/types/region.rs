//! The fixed set of Jeju regions a widget can be bound to.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A region of Jeju Island for which weather series can be requested.
///
/// The display name (Korean) is what is shown to users, embedded in the
/// query sent to the data service and used in export file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// 제주시
    JejuCity,
    /// 서귀포시
    Seogwipo,
    /// 한라산
    Hallasan,
    /// 우도
    Udo,
    /// 성산
    Seongsan,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown region '{0}'")]
pub struct UnknownRegion(pub String);

impl Region {
    /// All regions in the order they are offered to the user.
    pub const ALL: [Region; 5] = [
        Region::JejuCity,
        Region::Seogwipo,
        Region::Hallasan,
        Region::Udo,
        Region::Seongsan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Region::JejuCity => "제주시",
            Region::Seogwipo => "서귀포시",
            Region::Hallasan => "한라산",
            Region::Udo => "우도",
            Region::Seongsan => "성산",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|region| region.name() == s.trim())
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_names_round_trip() {
        for region in Region::ALL {
            assert_eq!(region.name().parse::<Region>(), Ok(region));
        }
    }

    #[test]
    fn test_unknown_region_rejected() {
        let err = "부산".parse::<Region>().unwrap_err();
        assert_eq!(err, UnknownRegion("부산".to_string()));
    }
}
