use serde::{Deserialize, Serialize};

/// Closed vocabularies stored as VARCHAR and sent as SCREAMING_SNAKE_CASE.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("unknown ", stringify!($name), ": {}"), s)),
                }
            }
        }
    };
}

wire_enum!(
    /// Severity of a disciplinary incident.
    ActionType {
        Warning => "WARNING",
        Fine => "FINE",
        Suspension => "SUSPENSION",
        Expulsion => "EXPULSION",
    }
);

wire_enum!(
    /// Free-form lifecycle of an action; any status may follow any other.
    ActionStatus {
        Active => "ACTIVE",
        Resolved => "RESOLVED",
        Appealed => "APPEALED",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_enums_match_exact_names() {
        assert_eq!("FINE".parse::<ActionType>().unwrap(), ActionType::Fine);
        assert!("fine".parse::<ActionType>().is_err());
        assert_eq!("APPEALED".parse::<ActionStatus>().unwrap(), ActionStatus::Appealed);
        assert!("PENDING".parse::<ActionStatus>().is_err());
        assert_eq!(serde_json::to_value(ActionType::Suspension).unwrap(), "SUSPENSION");
    }
}
