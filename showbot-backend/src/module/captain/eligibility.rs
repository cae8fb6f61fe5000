use showbot_common::{Captain, Item};

/// Full club names as they appear in item `team` fields and ability text.
pub const MLB_TEAMS: [&str; 30] = [
    "Arizona Diamondbacks",
    "Atlanta Braves",
    "Baltimore Orioles",
    "Boston Red Sox",
    "Chicago Cubs",
    "Chicago White Sox",
    "Cincinnati Reds",
    "Cleveland Guardians",
    "Colorado Rockies",
    "Detroit Tigers",
    "Houston Astros",
    "Kansas City Royals",
    "Los Angeles Angels",
    "Los Angeles Dodgers",
    "Miami Marlins",
    "Milwaukee Brewers",
    "Minnesota Twins",
    "New York Mets",
    "New York Yankees",
    "Oakland Athletics",
    "Philadelphia Phillies",
    "Pittsburgh Pirates",
    "San Diego Padres",
    "San Francisco Giants",
    "Seattle Mariners",
    "St. Louis Cardinals",
    "Tampa Bay Rays",
    "Texas Rangers",
    "Toronto Blue Jays",
    "Washington Nationals",
];

/// One independent reason a player can be slotted under a captain.
pub trait EligibilityRule: Send + Sync {
    fn name(&self) -> &str;

    fn is_eligible(&self, item: &Item, captain: &Captain) -> bool;
}

/// Captains whose ability mentions switch hitters take any switch hitter.
pub struct SwitchHitterRule;

impl EligibilityRule for SwitchHitterRule {
    fn name(&self) -> &str {
        "switch hitter"
    }

    fn is_eligible(&self, item: &Item, captain: &Captain) -> bool {
        item.is_switch_hitter() && captain.ability_desc.to_lowercase().contains("switch hitter")
    }
}

/// Captains whose ability names a club take that club's players.
pub struct TeamRule {
    team: String,
    needle: String,
}

impl TeamRule {
    pub fn new(team: impl Into<String>) -> Self {
        let team = team.into();
        let needle = team.to_lowercase();
        Self { team, needle }
    }
}

impl EligibilityRule for TeamRule {
    fn name(&self) -> &str {
        &self.team
    }

    fn is_eligible(&self, item: &Item, captain: &Captain) -> bool {
        item.team.eq_ignore_ascii_case(&self.team) && captain.ability_desc.to_lowercase().contains(&self.needle)
    }
}

/// Registered rules; a player qualifies when any one of them matches.
#[derive(Default)]
pub struct EligibilityRules {
    rules: Vec<Box<dyn EligibilityRule>>,
}

impl EligibilityRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch hitters plus one team rule per club.
    pub fn standard() -> Self {
        let mut rules = Self::new().with(SwitchHitterRule);
        for team in MLB_TEAMS {
            rules.register(TeamRule::new(team));
        }
        rules
    }

    pub fn with(mut self, rule: impl EligibilityRule + 'static) -> Self {
        self.register(rule);
        self
    }

    pub fn register(&mut self, rule: impl EligibilityRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Name of the first rule that admits `item` under `captain`.
    pub fn matching_rule(&self, item: &Item, captain: &Captain) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.is_eligible(item, captain))
            .map(|rule| rule.name())
    }

    pub fn is_eligible(&self, item: &Item, captain: &Captain) -> bool {
        self.matching_rule(item, captain).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(team: &str, bat_hand: &str) -> Item {
        Item {
            uuid: "i".to_string(),
            name: "Player".to_string(),
            team: team.to_string(),
            bat_hand: bat_hand.to_string(),
            ..Default::default()
        }
    }

    fn captain(desc: &str) -> Captain {
        Captain {
            uuid: "c".to_string(),
            ability_desc: desc.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_switch_hitter_rule() {
        let rule = SwitchHitterRule;
        let cap = captain("Every Switch Hitter in the lineup gains +5 Power");

        assert!(rule.is_eligible(&item("Cleveland Guardians", "S"), &cap));
        assert!(!rule.is_eligible(&item("Cleveland Guardians", "R"), &cap));
        assert!(!rule.is_eligible(&item("Cleveland Guardians", "S"), &captain("Lefties gain +5")));
    }

    #[test]
    fn test_team_rule() {
        let rule = TeamRule::new("New York Yankees");
        let cap = captain("New York Yankees hitters gain +3 Vision");

        assert!(rule.is_eligible(&item("New York Yankees", "R"), &cap));
        assert!(!rule.is_eligible(&item("New York Mets", "R"), &cap));
        assert!(!rule.is_eligible(&item("New York Yankees", "R"), &captain("Mets hitters gain +3")));
    }

    #[test]
    fn test_standard_rules_or_semantics() {
        let rules = EligibilityRules::standard();
        assert_eq!(rules.len(), 1 + MLB_TEAMS.len());

        let cap = captain("Switch hitters and Houston Astros gain +2 Speed");
        assert_eq!(rules.matching_rule(&item("Boston Red Sox", "S"), &cap), Some("switch hitter"));
        assert_eq!(rules.matching_rule(&item("Houston Astros", "L"), &cap), Some("Houston Astros"));
        assert!(!rules.is_eligible(&item("Boston Red Sox", "L"), &cap));
    }

    #[test]
    fn test_custom_rule_registration() {
        struct Lefty;
        impl EligibilityRule for Lefty {
            fn name(&self) -> &str {
                "lefty"
            }
            fn is_eligible(&self, item: &Item, captain: &Captain) -> bool {
                item.bat_hand == "L" && captain.ability_desc.contains("lefties")
            }
        }

        let rules = EligibilityRules::new().with(Lefty);
        assert!(rules.is_eligible(&item("Any", "L"), &captain("all lefties +1")));
        assert!(EligibilityRules::new().is_empty());
    }
}
