//! Map NLU intents to page transitions.
//!
//! Used only after the local page rules failed. Results are always plain
//! prompts and never start a pending action.

use crate::rules::rule_for;
use crate::transition::{Transition, TIME_ENTITY};
use crate::{Entities, Page, SlotValue};
use nlu_client::NluReply;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

/// How the NLU parameters turn into response entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityPlan {
    /// Forward the non-empty parameters unchanged
    PassThrough,
    /// Name the order type, plus the address if the agent resolved one
    OrderType(&'static str),
    /// Pickup time as `h:mm AM/PM`, plus the payment type
    PickupAndPayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IntentTarget {
    page: Page,
    /// Fixed prompt; `None` speaks the agent's own reply
    prompt: Option<&'static str>,
    entities: EntityPlan,
}

impl IntentTarget {
    fn fixed(page: Page) -> Self {
        Self {
            page,
            prompt: Some(page.prompt()),
            entities: EntityPlan::PassThrough,
        }
    }

    fn spoken(page: Page) -> Self {
        Self {
            page,
            prompt: None,
            entities: EntityPlan::PassThrough,
        }
    }

    fn with(mut self, entities: EntityPlan) -> Self {
        self.entities = entities;
        self
    }
}

fn item_order_type(intent: &str) -> Option<&'static str> {
    match intent {
        "chipotle.burrito" => Some("burrito"),
        "chipotle.bowl" => Some("burrito bowl"),
        "chipotle.salad" => Some("salad"),
        "chipotle.tacos" => Some("tacos"),
        _ => None,
    }
}

/// Intents whose reply text names the next step of an item build
fn build_step(order_type: &'static str, key: &str) -> Option<IntentTarget> {
    let target = match key {
        "address" => IntentTarget::fixed(Page::Address).with(EntityPlan::OrderType(order_type)),
        "fillings" => IntentTarget::fixed(Page::Fillings).with(EntityPlan::OrderType(order_type)),
        "number" => IntentTarget::fixed(Page::SelectItem).with(EntityPlan::OrderType(order_type)),
        "rice" | "beans" => IntentTarget::fixed(Page::RiceBeans),
        "salsa" => IntentTarget::fixed(Page::Salsa),
        "toppings" => IntentTarget::fixed(Page::Toppings),
        "tortilla" | "sides" => IntentTarget::fixed(Page::BreadChips),
        "drinks" => IntentTarget::fixed(Page::Drinks),
        "Done" => IntentTarget::fixed(Page::ConfirmAdd),
        _ => return None,
    };
    Some(target)
}

fn lookup(intent: &str, key: &str) -> Option<IntentTarget> {
    if let Some(order_type) = item_order_type(intent) {
        return build_step(order_type, key);
    }
    match intent {
        "Default Welcome Intent" => Some(IntentTarget::spoken(Page::Start)),
        "chipotle.kids" => match key {
            "address" => Some(
                IntentTarget::fixed(Page::Address).with(EntityPlan::OrderType("kid's meal")),
            ),
            "choose" => Some(IntentTarget {
                prompt: Some("build your own or quesadilla?"),
                ..IntentTarget::fixed(Page::SelectItem).with(EntityPlan::OrderType("kid's meal"))
            }),
            _ => None,
        },
        "chipotle.kids - buildyourown" | "chipotle.kids - quesadilla" => match key {
            "tortilla" | "kidsides" => Some(IntentTarget::fixed(Page::BreadChips)),
            "fillings" => Some(IntentTarget::fixed(Page::Fillings)),
            "rice" | "beans" => Some(IntentTarget::fixed(Page::RiceBeans)),
            "kidsdrinks" => Some(IntentTarget::fixed(Page::Drinks)),
            "Done" => Some(IntentTarget::fixed(Page::ConfirmAdd)),
            _ => None,
        },
        "chipotle.sides&drinks" => match key {
            "address" => Some(
                IntentTarget::fixed(Page::Address).with(EntityPlan::OrderType("sides & drinks")),
            ),
            "sides" => Some(IntentTarget::fixed(Page::BreadChips)),
            "drinks" => Some(IntentTarget::fixed(Page::Drinks)),
            "Done" => Some(IntentTarget::fixed(Page::ConfirmAdd)),
            _ => None,
        },
        "chipotle.confirm" => match key {
            "time" => Some(IntentTarget::fixed(Page::PickupTime)),
            "payment" => {
                Some(IntentTarget::fixed(Page::Payment).with(EntityPlan::PickupAndPayment))
            }
            "Done" => Some(IntentTarget::fixed(Page::ConfirmSubmit)),
            _ => None,
        },
        "chipotle.confirm - yes" => Some(IntentTarget::spoken(Page::OrderPlaced)),
        "chipotle.addtobag" => Some(IntentTarget::spoken(Page::AddedToBag)),
        "chipotle.cart" => Some(IntentTarget::spoken(Page::Bag)),
        "chipotle.recents" => Some(IntentTarget::spoken(Page::RecentOrders)),
        "chipotle.recents - select.number" => Some(IntentTarget::spoken(Page::Bag)),
        other if other.ends_with(" - yes") => Some(IntentTarget::spoken(Page::AddedToBag)),
        _ => None,
    }
}

/// Turn an NLU reply into the transition for `current_page`
pub fn apply(current_page: u32, reply: &NluReply) -> Transition {
    let key = reply.reply_text.as_str();
    let Some(target) = lookup(&reply.intent_name, key) else {
        tracing::debug!(intent = %reply.intent_name, "no intent rule, speaking reply as-is");
        return if key.trim().is_empty() {
            Transition::not_understood()
        } else {
            Transition::spoken(Page::NoMatch.code(), key)
        };
    };

    let prompt = if target.page.code() == current_page {
        rule_for(current_page).prompt()
    } else {
        match target.prompt {
            Some(prompt) => prompt,
            None if key.trim().is_empty() => target.page.prompt(),
            None => key,
        }
    };

    let entities = match target.entities {
        EntityPlan::PassThrough => pass_through(&reply.entities),
        EntityPlan::OrderType(order_type) => {
            let mut entities = Entities::new();
            entities.insert(
                "ordertype".to_string(),
                SlotValue::One(order_type.to_string()),
            );
            if let Some(address) = reply.entities.get("address").filter(|v| !is_blank(v)) {
                entities.insert("address".to_string(), SlotValue::from_json(address));
            }
            entities
        }
        EntityPlan::PickupAndPayment => {
            let mut entities = Entities::new();
            if let Some(time) = reply.entities.get(TIME_ENTITY).filter(|v| !is_blank(v)) {
                let value = match time.as_str() {
                    Some(raw) => SlotValue::One(clock_time(raw).unwrap_or_else(|| raw.to_string())),
                    None => SlotValue::from_json(time),
                };
                entities.insert(TIME_ENTITY.to_string(), value);
            }
            if let Some(payment) = reply.entities.get("payment").filter(|v| !is_blank(v)) {
                entities.insert("payment".to_string(), SlotValue::from_json(payment));
            }
            entities
        }
    };

    tracing::debug!(
        intent = %reply.intent_name,
        next = %target.page,
        "intent mapped"
    );
    Transition::spoken(target.page.code(), prompt).with_entities(entities)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn pass_through(parameters: &serde_json::Map<String, Value>) -> Entities {
    parameters
        .iter()
        .filter(|(_, v)| !is_blank(v))
        .map(|(k, v)| (k.clone(), SlotValue::from_json(v)))
        .collect()
}

/// Format an RFC 3339 timestamp as wall-clock `h:mm AM/PM` in its own offset
pub fn clock_time(raw: &str) -> Option<String> {
    let parsed = OffsetDateTime::parse(raw, &Rfc3339).ok()?;
    parsed
        .format(format_description!(
            "[hour repr:12 padding:none]:[minute] [period]"
        ))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResponseKind;
    use serde_json::json;

    fn one(value: &str) -> SlotValue {
        SlotValue::One(value.to_string())
    }

    #[test]
    fn test_item_address_step() {
        let reply = NluReply::new("chipotle.burrito", "address").with_entity("address", json!("recent"));
        let t = apply(100, &reply);
        assert_eq!(t.next_page, 2000);
        assert_eq!(t.kind, ResponseKind::Prompt);
        assert_eq!(
            t.prompt,
            "please select address, you can say recent, favorite, or nearby"
        );
        assert_eq!(t.entities.get("ordertype"), Some(&one("burrito")));
        assert_eq!(t.entities.get("address"), Some(&one("recent")));
    }

    #[test]
    fn test_item_fillings_step_without_address() {
        let reply = NluReply::new("chipotle.bowl", "fillings").with_entity("address", json!(""));
        let t = apply(100, &reply);
        assert_eq!(t.next_page, 1100);
        assert_eq!(t.prompt, "which fillings do you want?");
        assert_eq!(t.entities.len(), 1);
        assert_eq!(t.entities.get("ordertype"), Some(&one("burrito bowl")));
    }

    #[test]
    fn test_build_steps_collapse_onto_canonical_pages() {
        let cases = [
            ("chipotle.tacos", "number", 1000),
            ("chipotle.salad", "rice", 1110),
            ("chipotle.burrito", "salsa", 1120),
            ("chipotle.burrito", "toppings", 1130),
            ("chipotle.tacos", "tortilla", 1150),
            ("chipotle.bowl", "drinks", 1160),
            ("chipotle.burrito", "Done", 1170),
            ("chipotle.kids - quesadilla", "kidsides", 1150),
            ("chipotle.kids - buildyourown", "fillings", 1100),
            ("chipotle.kids - quesadilla", "kidsdrinks", 1160),
            ("chipotle.sides&drinks", "address", 2000),
            ("chipotle.sides&drinks", "sides", 1150),
            ("chipotle.sides&drinks", "Done", 1170),
            ("chipotle.confirm", "time", 6000),
            ("chipotle.confirm", "Done", 6200),
        ];
        for (intent, key, page) in cases {
            let t = apply(100, &NluReply::new(intent, key));
            assert_eq!(t.next_page, page, "{} / {}", intent, key);
            assert_eq!(t.kind, ResponseKind::Prompt);
        }
    }

    #[test]
    fn test_kids_choose_prompt() {
        let t = apply(100, &NluReply::new("chipotle.kids", "choose"));
        assert_eq!(t.next_page, 1000);
        assert_eq!(t.prompt, "build your own or quesadilla?");
        assert_eq!(t.entities.get("ordertype"), Some(&one("kid's meal")));
    }

    #[test]
    fn test_direct_intents_speak_agent_reply() {
        let t = apply(100, &NluReply::new("chipotle.cart", "Here is your bag."));
        assert_eq!(t.next_page, 5000);
        assert_eq!(t.prompt, "Here is your bag.");

        let t = apply(1170, &NluReply::new("chipotle.tacos - yes", "Added!"));
        assert_eq!(t.next_page, 1900);

        let t = apply(6200, &NluReply::new("chipotle.confirm - yes", ""));
        assert_eq!(t.next_page, 7000);
        assert_eq!(t.prompt, Page::OrderPlaced.prompt());

        assert_eq!(apply(0, &NluReply::new("chipotle.recents", "ok")).next_page, 3000);
        assert_eq!(
            apply(3000, &NluReply::new("chipotle.recents - select.number", "ok")).next_page,
            5000
        );
    }

    #[test]
    fn test_same_page_speaks_page_prompt() {
        let t = apply(100, &NluReply::new("Default Welcome Intent", "Hey there!"));
        assert_eq!(t.next_page, 100);
        assert_eq!(t.prompt, Page::Start.prompt());
        let t = apply(0, &NluReply::new("Default Welcome Intent", "Hey there!"));
        assert_eq!(t.prompt, "Hey there!");
    }

    #[test]
    fn test_payment_step_formats_pickup_time() {
        let reply = NluReply::new("chipotle.confirm", "payment")
            .with_entity("time", json!("2026-10-19T12:30:00-07:00"))
            .with_entity("payment", json!("credit card"));
        let t = apply(6000, &reply);
        assert_eq!(t.next_page, 6100);
        assert_eq!(t.entities.get("time"), Some(&one("12:30 PM")));
        assert_eq!(t.entities.get("payment"), Some(&one("credit card")));
    }

    #[test]
    fn test_unknown_intent_speaks_reply() {
        let t = apply(3000, &NluReply::new("smalltalk.weather", "I can only help with food."));
        assert_eq!(t.next_page, 9999);
        assert_eq!(t.prompt, "I can only help with food.");

        let t = apply(3000, &NluReply::default());
        assert_eq!(t.next_page, 9999);
        assert_eq!(t.prompt, "Sorry, I didn't catch that. Please try again.");

        // unknown build key falls back to the reply text
        let t = apply(100, &NluReply::new("chipotle.burrito", "What size?"));
        assert_eq!(t.next_page, 9999);
        assert_eq!(t.prompt, "What size?");
    }

    #[test]
    fn test_clock_time() {
        assert_eq!(clock_time("2026-10-19T09:05:00+00:00").as_deref(), Some("9:05 AM"));
        assert_eq!(clock_time("2026-10-19T18:00:00-07:00").as_deref(), Some("6:00 PM"));
        assert_eq!(clock_time("noon"), None);
    }
}
