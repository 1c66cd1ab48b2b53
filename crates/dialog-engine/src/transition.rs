//! Evaluate one utterance against a page rule.

use crate::rules::{
    CaseMode, Fallback, MatchMode, PageRule, Step, CANCEL_PROMPT, CANCEL_TRIGGERS, NEGATION_WORDS,
};
use crate::{Entities, Page, ResponseKind, SlotValue};
use regex::Regex;
use slot_matcher::{
    contains_any, contains_word, find_any, find_word, match_multiple, match_single,
    match_single_word, SlotCatalog,
};
use std::sync::OnceLock;

/// Entity key for an extracted pickup time
pub const TIME_ENTITY: &str = "time";

/// The page-level result of an utterance, before it becomes a wire response
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next_page: u32,
    pub kind: ResponseKind,
    pub prompt: String,
    pub entities: Entities,
}

impl Transition {
    /// Stay put and ask the page question again
    pub fn repeat(rule: &PageRule) -> Self {
        Self::spoken(Page::NoMatch.code(), rule.prompt())
    }

    pub fn advance(step: Step, entities: Entities) -> Self {
        Self {
            next_page: step.next.code(),
            kind: step.kind,
            prompt: step.next.prompt().to_string(),
            entities,
        }
    }

    pub fn cancelled() -> Self {
        Self::spoken(Page::Home.code(), CANCEL_PROMPT)
    }

    /// Local re-prompt used when the NLU service gave nothing usable
    pub fn not_understood() -> Self {
        Self::spoken(Page::NoMatch.code(), Page::NoMatch.prompt())
    }

    /// No-op answer with empty speech
    pub fn silent() -> Self {
        Self::spoken(Page::NoMatch.code(), "")
    }

    /// A plain prompt proposing `next_page`
    pub fn spoken(next_page: u32, prompt: &str) -> Self {
        Self {
            next_page,
            kind: ResponseKind::Prompt,
            prompt: prompt.to_string(),
            entities: Entities::new(),
        }
    }

    pub fn with_entities(mut self, entities: Entities) -> Self {
        self.entities = entities;
        self
    }
}

/// How the local rules disposed of an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Slot bindings matched
    Matched,
    /// The user declined the page's optional slots
    Negated,
    /// A keyword route fired
    Routed,
    Cancelled,
    /// Empty query on a page that stays quiet
    Silent,
    /// Empty query elsewhere
    Empty,
    Unmatched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub transition: Transition,
    pub resolution: Resolution,
}

impl Evaluation {
    fn new(transition: Transition, resolution: Resolution) -> Self {
        Self {
            transition,
            resolution,
        }
    }

    /// True when the page hands unresolved utterances to the NLU service
    pub fn needs_fallback(&self, rule: &PageRule) -> bool {
        self.resolution == Resolution::Unmatched && rule.fallback == Fallback::Nlu
    }
}

/// Run the page rule over `query`.
///
/// Slot bindings are tried first, then negation and keyword routes. When
/// both a negation word and a route trigger occur, the earlier one in the
/// utterance wins ("yes, no problem" confirms, "no more" declines). A cancel
/// phrase overrides all of them on every page.
pub fn evaluate(rule: &PageRule, query: &str, catalog: &SlotCatalog) -> Evaluation {
    let folded = query.to_lowercase();
    if contains_any(&folded, CANCEL_TRIGGERS) {
        return Evaluation::new(Transition::cancelled(), Resolution::Cancelled);
    }

    if query.trim().is_empty() {
        return if rule.silent_when_empty {
            Evaluation::new(Transition::silent(), Resolution::Silent)
        } else {
            Evaluation::new(Transition::repeat(rule), Resolution::Empty)
        };
    }

    let text = match rule.case {
        CaseMode::Folded => folded.as_str(),
        CaseMode::Raw => query,
    };
    let negated_at = rule.negation.and(find_word(text, NEGATION_WORDS));

    if let Some(matched) = match_slots(rule, text, catalog, negated_at.is_some()) {
        return matched;
    }

    let routed = rule
        .routes
        .iter()
        .find_map(|route| find_any(text, route.triggers).map(|at| (route.step, at)));

    match (rule.negation.zip(negated_at), routed) {
        (Some((_, no_at)), Some((step, at))) if at < no_at => route_to(step),
        (Some((step, _)), _) => {
            let mut entities = Entities::new();
            for binding in rule.bindings {
                entities.insert(binding.slot.key().to_string(), SlotValue::Many(Vec::new()));
            }
            Evaluation::new(Transition::advance(step, entities), Resolution::Negated)
        }
        (None, Some((step, _))) => route_to(step),
        (None, None) => Evaluation::new(Transition::repeat(rule), Resolution::Unmatched),
    }
}

fn route_to(step: Step) -> Evaluation {
    Evaluation::new(
        Transition::advance(step, Entities::new()),
        Resolution::Routed,
    )
}

fn match_slots(
    rule: &PageRule,
    text: &str,
    catalog: &SlotCatalog,
    negated: bool,
) -> Option<Evaluation> {
    let on_match = rule.on_match?;
    let mut entities = Entities::new();
    let mut next = on_match.next;
    let mut required_hit = false;
    let mut unmatched = Vec::new();

    for binding in rule.bindings {
        let dictionary = catalog.dictionary(binding.slot);
        let value = match binding.mode {
            MatchMode::Single | MatchMode::Word => {
                let found = if binding.mode == MatchMode::Word {
                    match_single_word(text, dictionary)
                } else {
                    match_single(text, dictionary)
                };
                found.map(|v| {
                    if let Some(route) = rule
                        .value_routes
                        .iter()
                        .find(|r| r.slot == binding.slot && r.value == v)
                    {
                        next = route.next;
                    }
                    SlotValue::One(v.to_string())
                })
            }
            MatchMode::Multiple => {
                let values = match_multiple(text, dictionary);
                (!values.is_empty())
                    .then(|| SlotValue::Many(values.into_iter().map(str::to_string).collect()))
            }
        };
        match value {
            Some(value) => {
                required_hit |= binding.required;
                entities.insert(binding.slot.key().to_string(), value);
            }
            None => unmatched.push(binding.slot),
        }
    }

    if rule.capture_time {
        if let Some(time) = pickup_time(text) {
            required_hit = true;
            entities.insert(TIME_ENTITY.to_string(), SlotValue::One(time));
        }
    }

    if entities.is_empty() || (rule.has_required_slot() && !required_hit) {
        return None;
    }

    // "white rice, no beans" declines what it did not pick
    if negated {
        for slot in unmatched {
            entities.insert(slot.key().to_string(), SlotValue::Many(Vec::new()));
        }
    }

    tracing::debug!(page = %rule.page, next = %next, slots = entities.len(), "slots matched");
    let step = Step {
        next,
        kind: on_match.kind,
    };
    Some(Evaluation::new(
        Transition::advance(step, entities),
        Resolution::Matched,
    ))
}

fn clock_regex() -> &'static Regex {
    static CLOCK_REGEX: OnceLock<Regex> = OnceLock::new();
    CLOCK_REGEX.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(a\.?m\.?|p\.?m\.?)")
            .expect("Invalid regex pattern - this is a bug")
    })
}

/// Extract a spoken pickup time as `h:mm AM/PM`, or `ASAP`
pub fn pickup_time(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    if let Some(caps) = clock_regex().captures(&lower) {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        if (1..=12).contains(&hour) && minute < 60 {
            let meridiem = if caps.get(3)?.as_str().starts_with('a') {
                "AM"
            } else {
                "PM"
            };
            return Some(format!("{}:{:02} {}", hour, minute, meridiem));
        }
    }
    if contains_word(&lower, &["noon"]) {
        return Some("12:00 PM".to_string());
    }
    if contains_word(&lower, &["asap", "now"]) || lower.contains("as soon as possible") {
        return Some("ASAP".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{rule_for, SlotBinding};
    use slot_matcher::{Dictionary, Slot};

    fn eval(code: u32, query: &str) -> Evaluation {
        evaluate(rule_for(code), query, &SlotCatalog::builtin())
    }

    fn many(values: &[&str]) -> SlotValue {
        SlotValue::Many(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_menu_from_start_selects_item() {
        let e = eval(100, "menu");
        assert_eq!(e.resolution, Resolution::Routed);
        assert_eq!(e.transition.next_page, 1000);
        assert_eq!(e.transition.kind, ResponseKind::Selecting);
        assert_eq!(e.transition.prompt, Page::SelectItem.prompt());
    }

    #[test]
    fn test_start_routes_first_hit_wins() {
        assert_eq!(eval(100, "show my bag").transition.next_page, 5000);
        assert_eq!(eval(0, "change the address").transition.next_page, 2000);
        // "recent" is listed before "order"
        let e = eval(100, "my recent order");
        assert_eq!(e.transition.next_page, 3000);
        assert_eq!(e.transition.kind, ResponseKind::Performing);
    }

    #[test]
    fn test_fillings_multiple() {
        let e = eval(1100, "chicken and steak please");
        assert_eq!(e.resolution, Resolution::Matched);
        assert_eq!(e.transition.next_page, 1110);
        assert_eq!(e.transition.kind, ResponseKind::Selecting);
        assert_eq!(
            e.transition.entities.get("fillings"),
            Some(&many(&["chicken", "steak"]))
        );
        assert_eq!(e.transition.entities.len(), 1);
    }

    #[test]
    fn test_case_is_folded_before_matching() {
        let e = eval(1100, "Chicken");
        assert_eq!(e.transition.entities.get("fillings"), Some(&many(&["chicken"])));
    }

    #[test]
    fn test_cancel_overrides_everything() {
        for (code, query) in [
            (1100, "chicken, actually cancel"),
            (100, "cancel"),
            (6200, "Cancel my order"),
            (4321, "please cancel"),
        ] {
            let e = eval(code, query);
            assert_eq!(e.resolution, Resolution::Cancelled, "page {}", code);
            assert_eq!(e.transition.next_page, 0);
            assert_eq!(e.transition.prompt, "Okay, Cancel ordering");
            assert_eq!(e.transition.kind, ResponseKind::Prompt);
            assert!(e.transition.entities.is_empty());
        }
    }

    #[test]
    fn test_empty_query_on_start_is_silent() {
        let e = eval(100, "");
        assert_eq!(e.resolution, Resolution::Silent);
        assert_eq!(e.transition.next_page, 9999);
        assert_eq!(e.transition.prompt, "");
        assert!(!e.needs_fallback(rule_for(100)));
    }

    #[test]
    fn test_empty_query_elsewhere_repeats() {
        let e = eval(1100, "   ");
        assert_eq!(e.resolution, Resolution::Empty);
        assert_eq!(e.transition.next_page, 9999);
        assert_eq!(e.transition.prompt, Page::Fillings.prompt());
    }

    #[test]
    fn test_unmatched_slot_page_repeats_without_fallback() {
        let e = eval(1100, "what do you recommend");
        assert_eq!(e.resolution, Resolution::Unmatched);
        assert_eq!(e.transition.next_page, 9999);
        assert_eq!(e.transition.prompt, "which fillings do you want?");
        assert!(!e.needs_fallback(rule_for(1100)));
    }

    #[test]
    fn test_unmatched_leaf_page_needs_fallback() {
        assert!(eval(100, "i want a burrito").needs_fallback(rule_for(100)));
        assert!(eval(3000, "the second one").needs_fallback(rule_for(3000)));
        assert!(eval(4321, "hello").needs_fallback(rule_for(4321)));
    }

    #[test]
    fn test_negation_declines_optional_slots() {
        let e = eval(1110, "no thanks");
        assert_eq!(e.resolution, Resolution::Negated);
        assert_eq!(e.transition.next_page, 1120);
        assert_eq!(e.transition.kind, ResponseKind::Performing);
        assert_eq!(e.transition.entities.get("rice"), Some(&many(&[])));
        assert_eq!(e.transition.entities.get("beans"), Some(&many(&[])));
    }

    #[test]
    fn test_partial_match_with_negation() {
        let e = eval(1110, "white rice, no beans");
        assert_eq!(e.resolution, Resolution::Matched);
        assert_eq!(e.transition.kind, ResponseKind::Selecting);
        assert_eq!(
            e.transition.entities.get("rice"),
            Some(&SlotValue::One("white rice".to_string()))
        );
        assert_eq!(e.transition.entities.get("beans"), Some(&many(&[])));
    }

    #[test]
    fn test_negation_is_whole_word() {
        let e = eval(1120, "i don't know");
        assert_eq!(e.resolution, Resolution::Unmatched);
    }

    #[test]
    fn test_negation_ignored_on_required_pages() {
        let e = eval(1100, "no");
        assert_eq!(e.resolution, Resolution::Unmatched);
    }

    #[test]
    fn test_sides_and_drinks_skip_to_bread_chips() {
        let e = eval(1000, "just sides and drinks");
        assert_eq!(e.transition.next_page, 1150);
        assert_eq!(
            e.transition.entities.get("ordertype"),
            Some(&SlotValue::One("sides & drinks".to_string()))
        );
    }

    #[test]
    fn test_quantity_alone_does_not_advance() {
        let e = eval(1000, "two please");
        assert_eq!(e.resolution, Resolution::Unmatched);
        let e = eval(1000, "two burritos");
        assert_eq!(e.transition.next_page, 1100);
        assert_eq!(
            e.transition.entities.get("quantity"),
            Some(&SlotValue::One("2".to_string()))
        );
    }

    #[test]
    fn test_confirm_add_routes() {
        assert_eq!(eval(1170, "yes please").transition.next_page, 1900);
        let e = eval(1170, "no");
        assert_eq!(e.transition.next_page, 1000);
        assert_eq!(e.transition.kind, ResponseKind::Performing);
        assert!(e.transition.entities.is_empty());
    }

    #[test]
    fn test_affirmative_before_negation_word_confirms() {
        for query in ["yes, no problem", "sure, no worries add it", "yes please, nothing else"] {
            let e = eval(1170, query);
            assert_eq!(e.resolution, Resolution::Routed, "{:?}", query);
            assert_eq!(e.transition.next_page, 1900, "{:?}", query);
            assert_eq!(e.transition.kind, ResponseKind::Performing);
        }

        let e = eval(6200, "yes, no changes, submit it");
        assert_eq!(e.resolution, Resolution::Routed);
        assert_eq!(e.transition.next_page, 7000);
        assert_eq!(eval(6200, "yes, no problem").transition.next_page, 7000);
    }

    #[test]
    fn test_leading_negation_still_declines() {
        assert_eq!(eval(1170, "no, don't add it").transition.next_page, 1000);
        assert_eq!(eval(6200, "nope, not yet").transition.next_page, 5000);
        // "more" is a route on 1900 but the refusal comes first
        let e = eval(1900, "no more");
        assert_eq!(e.resolution, Resolution::Negated);
        assert_eq!(e.transition.next_page, 5000);
    }

    #[test]
    fn test_quantity_is_matched_as_whole_words() {
        let e = eval(1000, "a burrito, just one");
        assert_eq!(e.transition.next_page, 1100);
        assert_eq!(
            e.transition.entities.get("quantity"),
            Some(&SlotValue::One("1".to_string()))
        );

        let e = eval(1000, "11 burritos");
        assert_eq!(e.transition.next_page, 1100);
        assert_eq!(e.transition.entities.get("quantity"), None);

        let e = eval(1000, "a burrito for someone");
        assert_eq!(e.transition.entities.get("quantity"), None);

        let e = eval(1000, "3 tacos");
        assert_eq!(
            e.transition.entities.get("quantity"),
            Some(&SlotValue::One("3".to_string()))
        );
    }

    #[test]
    fn test_pickup_time_page() {
        let e = eval(6000, "at 12:30 pm");
        assert_eq!(e.transition.next_page, 6100);
        assert_eq!(
            e.transition.entities.get(TIME_ENTITY),
            Some(&SlotValue::One("12:30 PM".to_string()))
        );
        assert!(eval(6000, "tomorrow maybe").needs_fallback(rule_for(6000)));
    }

    #[test]
    fn test_pickup_time_formats() {
        assert_eq!(pickup_time("5 pm").as_deref(), Some("5:00 PM"));
        assert_eq!(pickup_time("11:05a.m.").as_deref(), Some("11:05 AM"));
        assert_eq!(pickup_time("around noon").as_deref(), Some("12:00 PM"));
        assert_eq!(pickup_time("right now").as_deref(), Some("ASAP"));
        assert_eq!(pickup_time("as soon as possible").as_deref(), Some("ASAP"));
        assert_eq!(pickup_time("13:00 pm"), None);
        assert_eq!(pickup_time("i know"), None);
    }

    #[test]
    fn test_raw_case_mode_matches_as_received() {
        static BINDINGS: [SlotBinding; 1] = [SlotBinding {
            slot: Slot::Payment,
            mode: MatchMode::Single,
            required: true,
        }];
        let rule = PageRule {
            case: CaseMode::Raw,
            bindings: &BINDINGS,
            ..*rule_for(6100)
        };
        let mut catalog = SlotCatalog::empty();
        catalog.insert(
            Slot::Payment,
            Dictionary::new().with_entry("PayPal", &["PayPal"]),
        );
        assert_eq!(evaluate(&rule, "PayPal", &catalog).resolution, Resolution::Matched);
        assert_eq!(evaluate(&rule, "paypal", &catalog).resolution, Resolution::Unmatched);
    }
}
