//! Event catalog data types.
//!
//! Field names follow the catalog file format (`desc`, `minStage`,
//! `maxStage`, effect `type`/`value`/`duration`).

use serde::{Deserialize, Serialize};

/// What picking a choice does to the player.
///
/// Amounts and ratios come from `value`, durations (seconds) from
/// `duration`. Missing numbers read as zero; unknown effect types read as
/// [`EffectDefinition::Nothing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectDefinition {
    GainQi {
        #[serde(default)]
        value: f64,
    },
    LoseQi {
        #[serde(default)]
        value: f64,
    },
    #[serde(rename = "gain_tap_ratio_temp")]
    GainTapBoost {
        #[serde(default)]
        value: f64,
        #[serde(default)]
        duration: f64,
    },
    #[serde(rename = "gain_auto_temp")]
    GainAutoBoost {
        #[serde(default)]
        value: f64,
        #[serde(default)]
        duration: f64,
    },
    /// Grants one protection charm.
    GrantItem,
    /// Coin flip on a qi stake.
    Gamble {
        #[serde(default)]
        value: f64,
    },
    GambleTap {
        #[serde(default)]
        value: f64,
        #[serde(default)]
        duration: f64,
    },
    GambleAuto {
        #[serde(default)]
        value: f64,
        #[serde(default)]
        duration: f64,
    },
    #[serde(other)]
    Nothing,
}

impl EffectDefinition {
    /// Choosing this effect counts as declining the event.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDefinition {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub effect: EffectDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "desc")]
    pub description: String,
    pub choices: Vec<ChoiceDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    /// Inclusive lower tier bound, by tier name.
    #[serde(default, rename = "minStage", skip_serializing_if = "Option::is_none")]
    pub min_tier: Option<String>,
    /// Inclusive upper tier bound, by tier name.
    #[serde(default, rename = "maxStage", skip_serializing_if = "Option::is_none")]
    pub max_tier: Option<String>,
}

impl EventDefinition {
    /// No tier bound declared at all. Such events form the fallback pool.
    pub fn is_unbounded(&self) -> bool {
        self.min_tier.is_none() && self.max_tier.is_none()
    }

    pub fn choice(&self, choice_id: &str) -> Option<&ChoiceDefinition> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_catalog_entry() {
        let json = r#"{
            "id": "ev_spring",
            "title": "山间灵泉",
            "desc": "你发现了一汪灵泉。",
            "rarity": "common",
            "minStage": "筑基",
            "maxStage": "金丹",
            "choices": [
                { "id": "a", "text": "饮用", "effect": { "type": "gain_qi", "value": 120 } },
                { "id": "b", "text": "离开", "effect": { "type": "nothing" } },
                { "id": "c", "text": "静坐", "effect": { "type": "gain_tap_ratio_temp", "value": 0.5, "duration": 60 } }
            ]
        }"#;
        let event: EventDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(event.min_tier.as_deref(), Some("筑基"));
        assert_eq!(event.max_tier.as_deref(), Some("金丹"));
        assert!(!event.is_unbounded());
        assert_eq!(
            event.choice("a").unwrap().effect,
            EffectDefinition::GainQi { value: 120.0 }
        );
        assert!(event.choice("b").unwrap().effect.is_noop());
        assert_eq!(
            event.choice("c").unwrap().effect,
            EffectDefinition::GainTapBoost {
                value: 0.5,
                duration: 60.0
            }
        );
        assert!(event.choice("z").is_none());
    }

    #[test]
    fn test_unknown_effect_type_reads_as_nothing() {
        let effect: EffectDefinition =
            serde_json::from_str(r#"{ "type": "summon_dragon", "value": 3 }"#).unwrap();
        assert_eq!(effect, EffectDefinition::Nothing);
    }

    #[test]
    fn test_grant_item_ignores_value() {
        let effect: EffectDefinition =
            serde_json::from_str(r#"{ "type": "grant_item", "value": 1 }"#).unwrap();
        assert_eq!(effect, EffectDefinition::GrantItem);
    }
}
