//! The prebuilt voice catalog for speech generation.
//!
//! The provider exposes a fixed set of named voices; the name is also part
//! of the audio cache key, so the canonical capitalized spelling matters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A prebuilt provider voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VoiceName {
    #[default]
    Charon,
    Puck,
    Kore,
    Zephyr,
    Aoede,
    Fenrir,
    Leda,
    Orus,
    Callirrhoe,
    Autonoe,
    Enceladus,
    Iapetus,
    Umbriel,
    Algieba,
    Despina,
    Erinome,
    Algenib,
    Rasalgethi,
    Laomedeia,
    Achernar,
    Alnilam,
    Schedar,
    Gacrux,
    Pulcherrima,
    Achird,
    Zubenelgenubi,
    Vindemiatrix,
    Sadachbia,
    Sadaltager,
    Sulafat,
}

impl VoiceName {
    /// Every voice the provider accepts.
    pub const ALL: [VoiceName; 30] = [
        VoiceName::Charon,
        VoiceName::Puck,
        VoiceName::Kore,
        VoiceName::Zephyr,
        VoiceName::Aoede,
        VoiceName::Fenrir,
        VoiceName::Leda,
        VoiceName::Orus,
        VoiceName::Callirrhoe,
        VoiceName::Autonoe,
        VoiceName::Enceladus,
        VoiceName::Iapetus,
        VoiceName::Umbriel,
        VoiceName::Algieba,
        VoiceName::Despina,
        VoiceName::Erinome,
        VoiceName::Algenib,
        VoiceName::Rasalgethi,
        VoiceName::Laomedeia,
        VoiceName::Achernar,
        VoiceName::Alnilam,
        VoiceName::Schedar,
        VoiceName::Gacrux,
        VoiceName::Pulcherrima,
        VoiceName::Achird,
        VoiceName::Zubenelgenubi,
        VoiceName::Vindemiatrix,
        VoiceName::Sadachbia,
        VoiceName::Sadaltager,
        VoiceName::Sulafat,
    ];

    /// Canonical provider spelling (capitalized), as used in cache keys and
    /// API requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceName::Charon => "Charon",
            VoiceName::Puck => "Puck",
            VoiceName::Kore => "Kore",
            VoiceName::Zephyr => "Zephyr",
            VoiceName::Aoede => "Aoede",
            VoiceName::Fenrir => "Fenrir",
            VoiceName::Leda => "Leda",
            VoiceName::Orus => "Orus",
            VoiceName::Callirrhoe => "Callirrhoe",
            VoiceName::Autonoe => "Autonoe",
            VoiceName::Enceladus => "Enceladus",
            VoiceName::Iapetus => "Iapetus",
            VoiceName::Umbriel => "Umbriel",
            VoiceName::Algieba => "Algieba",
            VoiceName::Despina => "Despina",
            VoiceName::Erinome => "Erinome",
            VoiceName::Algenib => "Algenib",
            VoiceName::Rasalgethi => "Rasalgethi",
            VoiceName::Laomedeia => "Laomedeia",
            VoiceName::Achernar => "Achernar",
            VoiceName::Alnilam => "Alnilam",
            VoiceName::Schedar => "Schedar",
            VoiceName::Gacrux => "Gacrux",
            VoiceName::Pulcherrima => "Pulcherrima",
            VoiceName::Achird => "Achird",
            VoiceName::Zubenelgenubi => "Zubenelgenubi",
            VoiceName::Vindemiatrix => "Vindemiatrix",
            VoiceName::Sadachbia => "Sadachbia",
            VoiceName::Sadaltager => "Sadaltager",
            VoiceName::Sulafat => "Sulafat",
        }
    }
}

impl fmt::Display for VoiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceName {
    type Err = UnknownVoice;

    /// Case-insensitive lookup against the canonical spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VoiceName::ALL
            .iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| UnknownVoice(s.to_string()))
    }
}

/// Error for a voice name outside the provider's fixed set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown voice: {0}")]
pub struct UnknownVoice(pub String);

/// A curated voice with a one-word tone description, surfaced by UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceOption {
    /// The voice.
    pub name: VoiceName,
    /// Short tone description (e.g., "Informative").
    pub tone: &'static str,
}

/// The curated subset shown in voice pickers.
pub const VOICE_OPTIONS: [VoiceOption; 10] = [
    VoiceOption { name: VoiceName::Charon, tone: "Informative" },
    VoiceOption { name: VoiceName::Puck, tone: "Upbeat" },
    VoiceOption { name: VoiceName::Kore, tone: "Firm" },
    VoiceOption { name: VoiceName::Zephyr, tone: "Bright" },
    VoiceOption { name: VoiceName::Aoede, tone: "Breezy" },
    VoiceOption { name: VoiceName::Fenrir, tone: "Excitable" },
    VoiceOption { name: VoiceName::Leda, tone: "Youthful" },
    VoiceOption { name: VoiceName::Orus, tone: "Firm" },
    VoiceOption { name: VoiceName::Callirrhoe, tone: "Easy-going" },
    VoiceOption { name: VoiceName::Autonoe, tone: "Bright" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_voice_is_charon() {
        assert_eq!(VoiceName::default(), VoiceName::Charon);
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("charon".parse::<VoiceName>().unwrap(), VoiceName::Charon);
        assert_eq!("PUCK".parse::<VoiceName>().unwrap(), VoiceName::Puck);
        assert_eq!(
            "zubenelgenubi".parse::<VoiceName>().unwrap(),
            VoiceName::Zubenelgenubi
        );
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("HAL9000".parse::<VoiceName>().is_err());
    }

    #[test]
    fn test_all_names_are_unique() {
        let mut names: Vec<&str> = VoiceName::ALL.iter().map(|v| v.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 30);
    }

    #[test]
    fn test_serde_uses_canonical_spelling() {
        let json = serde_json::to_string(&VoiceName::Callirrhoe).unwrap();
        assert_eq!(json, "\"Callirrhoe\"");
        let back: VoiceName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, VoiceName::Callirrhoe);
    }

    #[test]
    fn test_voice_options_are_a_subset() {
        for option in VOICE_OPTIONS {
            assert!(VoiceName::ALL.contains(&option.name));
        }
    }
}
