use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Cosmetic popularity tier shown on every card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChaosLevel {
    Legendary,
    Viral,
    Popular,
    Technical,
    Creative,
    Analytical,
    Dangerous,
    Standard,
}

/// View-count thresholds for the top three chaos tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ChaosThresholds {
    pub legendary: u64,
    pub viral: u64,
    pub popular: u64,
}

impl Default for ChaosThresholds {
    fn default() -> Self {
        Self {
            legendary: 15_000,
            viral: 8_000,
            popular: 1_000,
        }
    }
}

// Checked in order against the lowercased title once no view tier applies.
const KEYWORD_TIERS: &[(&[&str], ChaosLevel)] = &[
    (&["fix", "error"], ChaosLevel::Technical),
    (&["diy", "make"], ChaosLevel::Creative),
    (&["test", "review"], ChaosLevel::Analytical),
    (&["security", "hack"], ChaosLevel::Dangerous),
];

impl ChaosLevel {
    /// Tier for an entry: view thresholds first, then title keywords
    pub fn classify(view_count: u64, title: &str, thresholds: &ChaosThresholds) -> Self {
        if view_count >= thresholds.legendary {
            return ChaosLevel::Legendary;
        }
        if view_count >= thresholds.viral {
            return ChaosLevel::Viral;
        }
        if view_count >= thresholds.popular {
            return ChaosLevel::Popular;
        }

        let title = title.to_lowercase();
        KEYWORD_TIERS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| title.contains(k)))
            .map(|(_, level)| *level)
            .unwrap_or(ChaosLevel::Standard)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChaosLevel::Legendary => "LEGENDARY",
            ChaosLevel::Viral => "VIRAL",
            ChaosLevel::Popular => "POPULAR",
            ChaosLevel::Technical => "TECHNICAL",
            ChaosLevel::Creative => "CREATIVE",
            ChaosLevel::Analytical => "ANALYTICAL",
            ChaosLevel::Dangerous => "DANGEROUS",
            ChaosLevel::Standard => "STANDARD",
        }
    }
}

impl fmt::Display for ChaosLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic bucket used by the category filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Networking,
    Hardware,
    Software,
    Diy,
    Mobile,
    Security,
    General,
}

impl Category {
    /// Display order of the category filters
    pub const ALL: [Category; 7] = [
        Category::Networking,
        Category::Hardware,
        Category::Software,
        Category::Diy,
        Category::Mobile,
        Category::Security,
        Category::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Networking => "NETWORKING CHAOS",
            Category::Hardware => "HARDWARE HACKS",
            Category::Software => "SOFTWARE SOLUTIONS",
            Category::Diy => "DIY DESTRUCTION",
            Category::Mobile => "MOBILE MAYHEM",
            Category::Security => "SECURITY CHAOS",
            Category::General => "TECH GENERAL",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// First match wins, so the order here is significant.
static CATEGORY_PATTERNS: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    [
        (
            Category::Networking,
            "ethernet|wifi|network|port|forwarding|speed|test|bsnl|fiber",
        ),
        (
            Category::Hardware,
            "usb|adapter|hardware|cable|storage|laptop|desktop",
        ),
        (
            Category::Software,
            "eclipse|docker|wordpress|software|programming|jvm",
        ),
        (
            Category::Diy,
            "diy|battery|thermal|paste|maintenance|inverter|water",
        ),
        (Category::Mobile, "5g|mobile|phone|android|smartphone|airtel"),
        (
            Category::Security,
            "security|privacy|surveillance|spying|protection",
        ),
    ]
    .into_iter()
    .map(|(category, pattern)| {
        let regex = Regex::new(pattern).expect("category pattern is valid");
        (category, regex)
    })
    .collect()
});

/// Category for an entry by keyword match over its title and description
pub fn categorize(title: &str, description: &str) -> Category {
    let content = format!("{} {}", title, description).to_lowercase();
    CATEGORY_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(&content))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_tiers_take_precedence() {
        let t = ChaosThresholds::default();
        assert_eq!(ChaosLevel::classify(20_000, "fix it", &t), ChaosLevel::Legendary);
        assert_eq!(ChaosLevel::classify(15_000, "", &t), ChaosLevel::Legendary);
        assert_eq!(ChaosLevel::classify(8_000, "", &t), ChaosLevel::Viral);
        assert_eq!(ChaosLevel::classify(1_000, "hack", &t), ChaosLevel::Popular);
    }

    #[test]
    fn keyword_tiers_in_order() {
        let t = ChaosThresholds::default();
        assert_eq!(ChaosLevel::classify(0, "Fix Eclipse Errors", &t), ChaosLevel::Technical);
        assert_eq!(ChaosLevel::classify(0, "Make a cable", &t), ChaosLevel::Creative);
        assert_eq!(ChaosLevel::classify(0, "Speed TEST", &t), ChaosLevel::Analytical);
        assert_eq!(ChaosLevel::classify(0, "Security basics", &t), ChaosLevel::Dangerous);
        assert_eq!(ChaosLevel::classify(0, "Unboxing", &t), ChaosLevel::Standard);
        // "make" is checked before "test"
        assert_eq!(ChaosLevel::classify(0, "make and test", &t), ChaosLevel::Creative);
    }

    #[test]
    fn custom_thresholds() {
        let t = ChaosThresholds {
            legendary: 100,
            viral: 50,
            popular: 10,
        };
        assert_eq!(ChaosLevel::classify(100, "", &t), ChaosLevel::Legendary);
        assert_eq!(ChaosLevel::classify(9, "", &t), ChaosLevel::Standard);
    }

    #[test]
    fn chaos_level_serializes_upper_case() {
        let json = serde_json::to_string(&ChaosLevel::Legendary).unwrap();
        assert_eq!(json, "\"LEGENDARY\"");
        assert_eq!(ChaosLevel::Standard.to_string(), "STANDARD");
    }

    #[test]
    fn categorizes_first_match() {
        assert_eq!(
            categorize("Make RJ45 Ethernet Cable at Home", ""),
            Category::Networking
        );
        assert_eq!(
            categorize("Fix Eclipse Errors | Incompatible JVM", ""),
            Category::Software
        );
        assert_eq!(
            categorize("Increase storage space in old laptop", ""),
            Category::Hardware
        );
        assert_eq!(
            categorize("Unlimited 5G on Ground Floor", "signal trick"),
            Category::Mobile
        );
        assert_eq!(
            categorize("Someone Spying On Me", "privacy tips"),
            Category::Security
        );
        assert_eq!(categorize("Vlog", "a day out"), Category::General);
    }

    #[test]
    fn description_participates_in_matching() {
        assert_eq!(categorize("Quick tip", "home battery care"), Category::Diy);
    }

    #[test]
    fn category_labels() {
        assert_eq!(Category::Networking.label(), "NETWORKING CHAOS");
        assert_eq!(Category::General.to_string(), "TECH GENERAL");
        assert_eq!(serde_json::to_string(&Category::Diy).unwrap(), "\"diy\"");
    }
}
