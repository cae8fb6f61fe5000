use serde::{Deserialize, Serialize};

use crate::lenient::{int_or_zero, string_or_empty};

/// One card from the item catalog.
///
/// Only `uuid` and `name` are required; every other field decodes to its
/// zero value when the API omits it or sends `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    pub uuid: String,
    pub name: String,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub ovr: i32,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub rarity: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub team: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub team_short_name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub series: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub display_position: String,
    /// "L", "R" or "S"
    #[serde(default, deserialize_with = "string_or_empty")]
    pub bat_hand: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub throw_hand: String,

    #[serde(default, deserialize_with = "int_or_zero")]
    pub contact_left: i32,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub contact_right: i32,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub power_left: i32,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub power_right: i32,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub speed: i32,
    #[serde(rename = "plate_vision", default, deserialize_with = "int_or_zero")]
    pub vision: i32,
    #[serde(rename = "batting_clutch", default, deserialize_with = "int_or_zero")]
    pub clutch: i32,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub pitching_clutch: i32,
    #[serde(rename = "fielding_ability", default, deserialize_with = "int_or_zero")]
    pub fielding: i32,
    #[serde(rename = "arm_strength", default, deserialize_with = "int_or_zero")]
    pub arm: i32,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub arm_accuracy: i32,
    #[serde(rename = "reaction_time", default, deserialize_with = "int_or_zero")]
    pub reaction: i32,
    #[serde(rename = "hits_per_bf", default, deserialize_with = "int_or_zero")]
    pub hits_per_9: i32,
    #[serde(rename = "bb_per_bf", default, deserialize_with = "int_or_zero")]
    pub walks_per_9: i32,
    #[serde(rename = "k_per_bf", default, deserialize_with = "int_or_zero")]
    pub strikeouts_per_9: i32,
}

impl Item {
    pub fn is_switch_hitter(&self) -> bool {
        self.bat_hand.eq_ignore_ascii_case("S") || self.bat_hand.eq_ignore_ascii_case("switch")
    }
}

/// A marketplace offer for one card.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub listing_name: String,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub best_sell_price: i32,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub best_buy_price: i32,
    pub item: Item,
}

/// A named attribute modifier granted by a captain boost tier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoostAttribute {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CaptainBoost {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub tier: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub description: String,
    #[serde(default)]
    pub attributes: Vec<BoostAttribute>,
}

/// Team captain card; its ability text decides which players qualify.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Captain {
    pub uuid: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub display_position: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub team: String,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub ovr: i32,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub ability_name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub ability_desc: String,
    #[serde(default)]
    pub boosts: Vec<CaptainBoost>,
}

/// A message the bot wants said in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatReply {
    pub channel: String,
    pub text: String,
}

impl ChatReply {
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
        }
    }
}

impl std::fmt::Display for ChatReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.channel, self.text)
    }
}
