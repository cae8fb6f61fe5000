///! Chat command handling
///!
///! Turns `!verb player name` messages into reply lines, one per matching
///! card, or a single "not found" line when the lookup comes back empty.

use regex::Regex;
use showbot_common::{ChatReply, Item, Listing};
use std::sync::{Arc, LazyLock};

use super::lookup::LookupService;

static COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*!(\S+)\s+(.*\S)\s*$").expect("command pattern is valid"));

/// Attribute lookups answered from the item catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Contact,
    HitsPer9,
    WalksPer9,
    Power,
    Speed,
    Vision,
    HittingClutch,
    PitchingClutch,
    Fielding,
    Arm,
    ArmAccuracy,
    Reaction,
    StrikeoutsPer9,
}

impl Stat {
    fn tag(&self) -> &'static str {
        match self {
            Stat::Contact => "CONTACT",
            Stat::HitsPer9 => "HITS PER 9",
            Stat::WalksPer9 => "WALKS PER 9",
            Stat::Power => "POWER",
            Stat::Speed => "SPEED",
            Stat::Vision => "VISION",
            Stat::HittingClutch => "CLUTCH",
            Stat::PitchingClutch => "PITCHING CLUTCH",
            Stat::Fielding => "FIELDING",
            Stat::Arm => "ARM",
            Stat::ArmAccuracy => "ARM ACCURACY",
            Stat::Reaction => "REACTION",
            Stat::StrikeoutsPer9 => "STRIKEOUTS PER 9",
        }
    }

    /// Name used in the "not available" reply.
    fn subject(&self) -> &'static str {
        match self {
            Stat::Contact => "Contact",
            Stat::HitsPer9 => "Hits per 9",
            Stat::WalksPer9 => "Walks per 9",
            Stat::Power => "Power",
            Stat::Speed => "Speed",
            Stat::Vision => "Vision",
            Stat::HittingClutch => "Clutch",
            Stat::PitchingClutch => "Pitching Clutch",
            Stat::Fielding => "Fielding",
            Stat::Arm => "Arm",
            Stat::ArmAccuracy => "Arm Accuracy",
            Stat::Reaction => "Reaction",
            Stat::StrikeoutsPer9 => "Strikeouts per 9",
        }
    }

    fn fields(&self, item: &Item) -> Vec<(&'static str, i32)> {
        match self {
            Stat::Contact => vec![
                ("Contact vs Left", item.contact_left),
                ("Contact vs Right", item.contact_right),
            ],
            Stat::Power => vec![
                ("Power vs Left", item.power_left),
                ("Power vs Right", item.power_right),
            ],
            Stat::HitsPer9 => vec![(self.subject(), item.hits_per_9)],
            Stat::WalksPer9 => vec![(self.subject(), item.walks_per_9)],
            Stat::Speed => vec![(self.subject(), item.speed)],
            Stat::Vision => vec![(self.subject(), item.vision)],
            Stat::HittingClutch => vec![(self.subject(), item.clutch)],
            Stat::PitchingClutch => vec![(self.subject(), item.pitching_clutch)],
            Stat::Fielding => vec![(self.subject(), item.fielding)],
            Stat::Arm => vec![(self.subject(), item.arm)],
            Stat::ArmAccuracy => vec![(self.subject(), item.arm_accuracy)],
            Stat::Reaction => vec![(self.subject(), item.reaction)],
            Stat::StrikeoutsPer9 => vec![(self.subject(), item.strikeouts_per_9)],
        }
    }

    pub fn format(&self, item: &Item) -> String {
        let values: Vec<String> = self
            .fields(item)
            .into_iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect();
        format!("[{}] {} ({}) | {}", self.tag(), item.name, item.ovr, values.join(" | "))
    }

    pub fn not_found(&self) -> String {
        format!("{} information not available.", self.subject())
    }
}

/// Recognized command verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Price,
    Theme,
    Stat(Stat),
}

impl Command {
    pub fn from_verb(verb: &str) -> Option<Self> {
        let command = match verb.to_lowercase().as_str() {
            "price" => Command::Price,
            "theme" => Command::Theme,
            "contact" => Command::Stat(Stat::Contact),
            "hitsper9" => Command::Stat(Stat::HitsPer9),
            "walksper9" => Command::Stat(Stat::WalksPer9),
            "power" => Command::Stat(Stat::Power),
            "speed" => Command::Stat(Stat::Speed),
            "vision" => Command::Stat(Stat::Vision),
            "hittingclutch" => Command::Stat(Stat::HittingClutch),
            "pitchingclutch" => Command::Stat(Stat::PitchingClutch),
            "fielding" => Command::Stat(Stat::Fielding),
            "arm" => Command::Stat(Stat::Arm),
            "armaccuracy" => Command::Stat(Stat::ArmAccuracy),
            "reaction" => Command::Stat(Stat::Reaction),
            "strikeoutsper9" => Command::Stat(Stat::StrikeoutsPer9),
            _ => return None,
        };
        Some(command)
    }

    pub fn not_found(&self) -> String {
        match self {
            Command::Price => "Player Card not found".to_string(),
            Command::Theme => "No matching themes found for the player.".to_string(),
            Command::Stat(stat) => stat.not_found(),
        }
    }
}

pub fn format_listing(listing: &Listing) -> String {
    let item = &listing.item;
    format!(
        "[PRICE] {} ({}) | {} {} | Buy now: {} | Sell now: {}",
        item.name, item.ovr, item.team, item.rarity, listing.best_sell_price, listing.best_buy_price
    )
}

/// Split `!verb args` into its verb and trimmed argument text.
pub fn parse_command(content: &str) -> Option<(String, String)> {
    let caps = COMMAND_RE.captures(content)?;
    let verb = caps.get(1).map_or("", |m| m.as_str()).to_string();
    let args = caps.get(2).map_or("", |m| m.as_str()).to_string();
    Some((verb, args))
}

pub struct MessageHandler {
    lookup: Arc<LookupService>,
}

impl MessageHandler {
    pub fn new(lookup: Arc<LookupService>) -> Self {
        Self { lookup }
    }

    /// Handle one raw chat message. Non-commands produce no replies.
    pub async fn handle_message(&self, channel: &str, content: &str) -> Vec<ChatReply> {
        match parse_command(content) {
            Some((verb, args)) => self.dispatch(channel, &verb, &args).await,
            None => Vec::new(),
        }
    }

    /// Answer `verb` for the player named in `args`.
    pub async fn dispatch(&self, channel: &str, verb: &str, args: &str) -> Vec<ChatReply> {
        let Some(command) = Command::from_verb(verb) else {
            return Vec::new();
        };
        let name = args.trim();
        if name.is_empty() {
            return Vec::new();
        }

        tracing::info!("{} !{} {}", channel, verb, name);

        let lines: Vec<String> = match command {
            Command::Price => self
                .lookup
                .find_listings(name)
                .await
                .iter()
                .map(format_listing)
                .collect(),
            Command::Theme => self
                .lookup
                .find_eligible_captains(name)
                .await
                .iter()
                .map(|captain| {
                    format!(
                        "[THEME] {} is eligible for Captain {}: {}",
                        name, captain.name, captain.ability_desc
                    )
                })
                .collect(),
            Command::Stat(stat) => self
                .lookup
                .find_items(name)
                .await
                .iter()
                .map(|item| stat.format(item))
                .collect(),
        };

        if lines.is_empty() {
            return vec![ChatReply::new(channel, command.not_found())];
        }
        lines
            .into_iter()
            .map(|text| ChatReply::new(channel, text))
            .collect()
    }
}
